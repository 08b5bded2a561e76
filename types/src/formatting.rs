//! Centralized number formatting utilities.
//!
//! All numeric display formatting goes through this module so the chat
//! reports, the live overlay and the CLI agree, and so European-style number
//! formatting (swapping `.` and `,`) is applied in one place.

/// Largest integer that converts to `f64` without losing precision (2^53).
pub const MAX_EXACT_F64: u128 = 1 << 53;

/// Apply European number format by swapping `.` and `,` in a formatted string.
fn europeanize(s: &str) -> String {
    // Formatted strings here are purely numeric with an optional k/m suffix,
    // so a global swap is safe.
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '.' => result.push(','),
            ',' => result.push('.'),
            _ => result.push(c),
        }
    }
    result
}

/// Apply European formatting conditionally.
#[inline]
fn maybe_eu(s: String, european: bool) -> String {
    if european { europeanize(&s) } else { s }
}

/// Format a per-second rate with cascading k/m scaling.
///
/// - Values above 1,000 are divided by 1,000 and suffixed with `k`
/// - If the result is still above 1,000 it is divided again and suffixed with `m`
/// - Scaled values use three decimals, unscaled values are plain integers
///
/// Returns `None` when the value cannot be converted to `f64` exactly
/// (see [`MAX_EXACT_F64`]).
///
/// # Examples
/// ```
/// use dps_meter_types::formatting::format_rate;
/// assert_eq!(format_rate(666, false).as_deref(), Some("666"));
/// assert_eq!(format_rate(1_000, false).as_deref(), Some("1000"));
/// assert_eq!(format_rate(1_500, false).as_deref(), Some("1.500k"));
/// assert_eq!(format_rate(1_500_000, false).as_deref(), Some("1.500m"));
/// assert_eq!(format_rate(1_500, true).as_deref(), Some("1,500k"));
/// assert_eq!(format_rate(u128::MAX, false), None);
/// ```
pub fn format_rate(n: u128, european: bool) -> Option<String> {
    if n > MAX_EXACT_F64 {
        return None;
    }
    if n <= 1_000 {
        return Some(n.to_string());
    }

    let mut scaled = n as f64 / 1_000.0;
    let mut unit = "k";
    if scaled > 1_000.0 {
        scaled /= 1_000.0;
        unit = "m";
    }
    Some(maybe_eu(format!("{:.3}{}", scaled, unit), european))
}

/// Format a duration as `M:SS` from whole seconds.
///
/// # Examples
/// ```
/// use dps_meter_types::formatting::format_duration;
/// assert_eq!(format_duration(125), "2:05");
/// assert_eq!(format_duration(0), "0:00");
/// ```
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
