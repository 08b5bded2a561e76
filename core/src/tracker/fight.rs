use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque combat target identifier supplied by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// State of one fight, owned by the tracker's table.
#[derive(Debug, Clone)]
pub struct FightRecord {
    /// Identity of this record instance. A restarted fight gets a new one.
    pub fight_id: u64,
    pub target_name: String,
    pub total_damage: u128,
    pub combat_start_ms: u64,
    /// Set once the fight was completed; the record is dropped at this time.
    pub closing_at_ms: Option<u64>,
}

impl FightRecord {
    pub(crate) fn new(fight_id: u64, target_name: String, initial_damage: u64, now_ms: u64) -> Self {
        Self {
            fight_id,
            target_name,
            total_damage: u128::from(initial_damage),
            combat_start_ms: now_ms,
            closing_at_ms: None,
        }
    }

    pub fn is_closing(&self) -> bool {
        self.closing_at_ms.is_some()
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.closing_at_ms.is_some_and(|at| now_ms >= at)
    }

    /// Whole seconds since the fight started, partial seconds rounded up.
    pub fn elapsed_secs(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.combat_start_ms).div_ceil(1_000)
    }

    /// Add damage, returning false if the accumulator saturated.
    pub(crate) fn add_damage(&mut self, amount: u64) -> bool {
        match self.total_damage.checked_add(u128::from(amount)) {
            Some(total) => {
                self.total_damage = total;
                true
            }
            None => {
                self.total_damage = u128::MAX;
                false
            }
        }
    }

    /// DPS summary at `now_ms`.
    ///
    /// Returns `None` for fights with no damage or lasting one second or less;
    /// those are trailing-event noise rather than fights worth reporting.
    pub fn dps_info(&self, now_ms: u64) -> Option<DpsInfo> {
        let duration_secs = self.elapsed_secs(now_ms);
        if self.total_damage == 0 || duration_secs <= 1 {
            return None;
        }

        Some(DpsInfo {
            name: self.target_name.clone(),
            dps: self.total_damage / u128::from(duration_secs),
            total_damage: self.total_damage,
            duration_secs,
        })
    }
}

/// Derived DPS result for one fight. Never stored by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpsInfo {
    pub name: String,
    pub dps: u128,
    pub total_damage: u128,
    pub duration_secs: u64,
}
