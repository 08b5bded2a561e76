//! Shared configuration types for dps-meter
//!
//! This crate contains serializable types shared between the core tracker
//! (dps-meter-core) and the command line front end.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod formatting;

// ─────────────────────────────────────────────────────────────────────────────
// Contract Policy
// ─────────────────────────────────────────────────────────────────────────────

/// What the tracker does when a caller records damage against, or completes,
/// a fight that is not open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractPolicy {
    /// Panic with a descriptive message.
    #[default]
    Panic,
    /// Log at error level and leave the table untouched.
    LogAndIgnore,
}

// ─────────────────────────────────────────────────────────────────────────────
// Meter Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted meter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    /// Delay between completing a fight and dropping it from the table.
    /// Zero removes completed fights immediately.
    pub grace_period_ms: u64,

    /// Interval of the live overlay snapshot while in combat.
    pub refresh_interval_ms: u64,

    /// Sender name used for completed fight reports.
    pub report_name: String,

    /// Swap `.` and `,` in formatted numbers.
    pub european_format: bool,

    pub contract_policy: ContractPolicy,

    /// Entity id of the local player, if known ahead of the event stream.
    pub self_id: Option<u64>,

    /// TOML file mapping (zone, template) pairs to creature names.
    pub names_file: Option<PathBuf>,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 3_000,
            refresh_interval_ms: 1_000,
            report_name: "dps report".to_string(),
            european_format: false,
            contract_policy: ContractPolicy::default(),
            self_id: None,
            names_file: None,
        }
    }
}
