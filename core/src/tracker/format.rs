use dps_meter_types::formatting::format_rate;
use tracing::error;

use super::error::FormatError;
use super::fight::DpsInfo;

/// Render `"<name>: <rate>/s (<duration>s)"`, e.g. `"Dragon: 1.500m/s (10s)"`.
pub fn format_dps_info(info: &DpsInfo, european: bool) -> Result<String, FormatError> {
    let rate = format_rate(info.dps, european).ok_or_else(|| FormatError::DpsOutOfRange {
        name: info.name.clone(),
        dps: info.dps,
    })?;
    Ok(format!("{}: {}/s ({}s)", info.name, rate, info.duration_secs))
}

/// Live overlay text: reportable fights sorted by DPS, highest first, one per line.
///
/// Entries that fail to format are logged and left out.
pub fn format_live_snapshot<I>(infos: I, european: bool) -> String
where
    I: IntoIterator<Item = Option<DpsInfo>>,
{
    let mut infos: Vec<DpsInfo> = infos.into_iter().flatten().collect();
    infos.sort_by(|a, b| b.dps.cmp(&a.dps));

    infos
        .iter()
        .filter_map(|info| match format_dps_info(info, european) {
            Ok(line) => Some(line),
            Err(e) => {
                error!(error = %e, "dropping unformattable overlay line");
                None
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
