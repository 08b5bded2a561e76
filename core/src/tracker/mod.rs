//! Per-target fight tracking and DPS computation.
//!
//! A [`FightTracker`] owns the table of active fights, keyed by [`TargetId`]:
//!
//! ```text
//!   NoFight ──start_fight──▶ Active ──complete_fight──▶ Closing ──grace──▶ NoFight
//!                             │  ▲                          │
//!                             └──┘ record_damage            └─ trailing damage ignored
//! ```
//!
//! Completed fights stay in the table for a configurable grace window so that
//! damage events trailing a death signal do not open a phantom second fight.
//! With a zero grace period the Closing state is skipped.

mod error;
mod fight;
mod format;


pub use error::FormatError;
pub use fight::{DpsInfo, FightRecord, TargetId};
pub use format::{format_dps_info, format_live_snapshot};

use std::collections::BTreeMap;
use std::time::Duration;

use dps_meter_types::{ContractPolicy, MeterConfig};
use tracing::{debug, error, warn};

use crate::clock::Clock;

/// Tracker behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Delay between completing a fight and removing it from the table.
    pub grace_period: Duration,
    pub contract_policy: ContractPolicy,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            grace_period: Duration::ZERO,
            contract_policy: ContractPolicy::Panic,
        }
    }
}

impl TrackerSettings {
    pub fn from_config(config: &MeterConfig) -> Self {
        Self {
            grace_period: Duration::from_millis(config.grace_period_ms),
            contract_policy: config.contract_policy,
        }
    }
}

/// Table of active fights against individual targets.
#[derive(Debug)]
pub struct FightTracker<C: Clock> {
    clock: C,
    settings: TrackerSettings,
    fights: BTreeMap<TargetId, FightRecord>,
    next_fight_id: u64,
}

impl<C: Clock> FightTracker<C> {
    pub fn new(clock: C, settings: TrackerSettings) -> Self {
        Self {
            clock,
            settings,
            fights: BTreeMap::new(),
            next_fight_id: 0,
        }
    }

    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.settings.grace_period = grace_period;
        self
    }

    // --- Queries ---

    /// True if `target` has an open fight or one still inside its grace window.
    pub fn is_fighting(&self, target: TargetId) -> bool {
        let now = self.clock.now_ms();
        self.fights
            .get(&target)
            .is_some_and(|fight| !fight.is_expired(now))
    }

    /// Current DPS for `target` without touching the table.
    pub fn compute_dps_info(&self, target: TargetId) -> Option<DpsInfo> {
        let now = self.clock.now_ms();
        self.fights
            .get(&target)
            .filter(|fight| !fight.is_expired(now))
            .and_then(|fight| fight.dps_info(now))
    }

    /// Snapshot of every open fight, in table order. Does not modify the table.
    pub fn all_dps_messages(&self) -> Vec<Option<DpsInfo>> {
        let now = self.clock.now_ms();
        self.fights
            .values()
            .filter(|fight| !fight.is_closing())
            .map(|fight| fight.dps_info(now))
            .collect()
    }

    pub fn get(&self, target: TargetId) -> Option<&FightRecord> {
        let now = self.clock.now_ms();
        self.fights.get(&target).filter(|fight| !fight.is_expired(now))
    }

    pub fn total_damage(&self, target: TargetId) -> Option<u128> {
        self.get(target).map(|fight| fight.total_damage)
    }

    /// Number of records in the table, including ones inside their grace window.
    pub fn len(&self) -> usize {
        self.fights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fights.is_empty()
    }

    pub fn grace_period(&self) -> Duration {
        self.settings.grace_period
    }

    // --- Lifecycle ---

    /// Open a fight against `target`.
    ///
    /// The caller checks [`is_fighting`](Self::is_fighting) first. Starting over
    /// an open fight replaces it. Starting over a closing fight replaces the
    /// record, which also cancels its pending removal.
    pub fn start_fight(&mut self, target: TargetId, name: impl Into<String>, initial_damage: u64) {
        self.sweep_expired();

        let now = self.clock.now_ms();
        let fight_id = self.next_fight_id;
        self.next_fight_id += 1;

        let record = FightRecord::new(fight_id, name.into(), initial_damage, now);
        debug!(
            target_id = %target,
            fight_id,
            name = %record.target_name,
            initial_damage,
            "fight started"
        );

        if let Some(previous) = self.fights.insert(target, record) {
            if previous.is_closing() {
                debug!(
                    target_id = %target,
                    previous_fight_id = previous.fight_id,
                    "fight restarted inside grace window"
                );
            } else {
                warn!(
                    target_id = %target,
                    previous_fight_id = previous.fight_id,
                    "replaced an open fight; caller did not check is_fighting"
                );
            }
        }
    }

    /// Add `amount` to the fight against `target`.
    ///
    /// Damage against a fight inside its grace window is a trailing event and
    /// is dropped.
    pub fn record_damage(&mut self, target: TargetId, amount: u64) {
        self.sweep_expired();

        let policy = self.settings.contract_policy;
        let Some(fight) = self.fights.get_mut(&target) else {
            contract_violation(policy, "record_damage", target);
            return;
        };

        if fight.is_closing() {
            debug!(
                target_id = %target,
                fight_id = fight.fight_id,
                amount,
                "ignoring trailing damage after fight completion"
            );
            return;
        }

        if !fight.add_damage(amount) {
            error!(
                target_id = %target,
                fight_id = fight.fight_id,
                amount,
                "damage accumulator saturated"
            );
        }
    }

    /// Finish the fight against `target` and return its DPS summary.
    ///
    /// The summary is computed immediately. The record is removed right away
    /// when the grace period is zero, otherwise once the grace window passes.
    /// Completing a fight that is already closing returns `None`.
    pub fn complete_fight(&mut self, target: TargetId) -> Option<DpsInfo> {
        self.sweep_expired();

        let now = self.clock.now_ms();
        let grace_ms = u64::try_from(self.settings.grace_period.as_millis()).unwrap_or(u64::MAX);
        let policy = self.settings.contract_policy;

        let Some(fight) = self.fights.get_mut(&target) else {
            contract_violation(policy, "complete_fight", target);
            return None;
        };

        if fight.is_closing() {
            debug!(target_id = %target, fight_id = fight.fight_id, "fight already completed");
            return None;
        }

        let info = fight.dps_info(now);
        debug!(
            target_id = %target,
            fight_id = fight.fight_id,
            total_damage = %fight.total_damage,
            reported = info.is_some(),
            grace_ms,
            "fight completed"
        );

        if grace_ms == 0 {
            self.fights.remove(&target);
        } else {
            fight.closing_at_ms = Some(now.saturating_add(grace_ms));
        }

        info
    }

    /// Summaries for every open fight, then clear the whole table.
    pub fn complete_all_fights(&mut self) -> Vec<Option<DpsInfo>> {
        let results = self.all_dps_messages();
        debug!(
            fights = results.len(),
            records = self.fights.len(),
            "completing all fights"
        );
        self.fights.clear();
        results
    }

    /// Drop records whose grace window has passed. Returns how many were removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.fights.len();
        self.fights.retain(|_, fight| !fight.is_expired(now));
        before - self.fights.len()
    }
}

fn contract_violation(policy: ContractPolicy, operation: &str, target: TargetId) {
    match policy {
        ContractPolicy::Panic => {
            panic!("{operation} called for target {target} which has no active fight")
        }
        ContractPolicy::LogAndIgnore => {
            error!(target_id = %target, operation, "no active fight for target; ignoring");
        }
    }
}
