//! Error types for fight summary formatting

use thiserror::Error;

/// Errors while rendering a DPS summary for display
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The rate is too large to convert to a display float without losing
    /// precision, which means the damage accumulation upstream is corrupt.
    #[error("dps {dps} for '{name}' is outside the exactly displayable range")]
    DpsOutOfRange { name: String, dps: u128 },
}
