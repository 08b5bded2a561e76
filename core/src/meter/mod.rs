//! Event glue between the upstream event source, the fight tracker and the
//! display sinks.

mod sink;

#[cfg(test)]
mod meter_tests;

pub use sink::{DisplaySink, MeterOutput, StdoutSink};

use dps_meter_types::MeterConfig;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::events::MeterEvent;
use crate::events::codes::{npc_status, skill_kind, user_status};
use crate::names::{NameCache, NameResolver};
use crate::tracker::{
    DpsInfo, FightTracker, TargetId, TrackerSettings, format_dps_info, format_live_snapshot,
};

/// Drives a [`FightTracker`] from [`MeterEvent`]s and produces display output.
pub struct DpsMeter<C: Clock, R: NameResolver> {
    tracker: FightTracker<C>,
    names: NameCache<R>,
    self_id: Option<u64>,
    in_combat: bool,
    report_name: String,
    european: bool,
    sinks: Vec<Box<dyn DisplaySink + Send>>,
}

impl<C: Clock, R: NameResolver> DpsMeter<C, R> {
    pub fn new(clock: C, resolver: R, config: &MeterConfig) -> Self {
        Self {
            tracker: FightTracker::new(clock, TrackerSettings::from_config(config)),
            names: NameCache::new(resolver),
            self_id: config.self_id,
            in_combat: false,
            report_name: config.report_name.clone(),
            european: config.european_format,
            sinks: Vec::new(),
        }
    }

    /// Register a sink to receive every output
    pub fn add_sink(&mut self, sink: Box<dyn DisplaySink + Send>) {
        self.sinks.push(sink);
    }

    pub fn tracker(&self) -> &FightTracker<C> {
        &self.tracker
    }

    pub fn in_combat(&self) -> bool {
        self.in_combat
    }

    pub fn self_id(&self) -> Option<u64> {
        self.self_id
    }

    // --- Dispatching entry points ---

    /// Handle one event and deliver the resulting output to the sinks.
    pub fn process_event(&mut self, event: MeterEvent) {
        let outputs = self.handle_event(event);
        self.dispatch(&outputs);
    }

    /// Refresh the live overlay and deliver it to the sinks.
    pub fn tick(&mut self) {
        if let Some(output) = self.refresh() {
            self.dispatch(std::slice::from_ref(&output));
        }
    }

    /// Complete every remaining fight and deliver the reports to the sinks.
    pub fn shutdown(&mut self) {
        let outputs = self.finish();
        self.dispatch(&outputs);
    }

    fn dispatch(&mut self, outputs: &[MeterOutput]) {
        for sink in &mut self.sinks {
            for output in outputs {
                sink.deliver(output);
            }
        }
    }

    // --- Event handling ---

    /// Handle one event and return the output it produced.
    pub fn handle_event(&mut self, event: MeterEvent) -> Vec<MeterOutput> {
        match event {
            MeterEvent::SelfIdentified { entity_id } => {
                info!(entity_id, "local player identified");
                self.self_id = Some(entity_id);
                Vec::new()
            }
            MeterEvent::SkillResult {
                target,
                source,
                owner,
                kind,
                value,
            } => {
                self.on_skill_result(target, source, owner, kind, value);
                Vec::new()
            }
            MeterEvent::UserStatus { entity_id, status } => self.on_user_status(entity_id, status),
            MeterEvent::NpcSpawned {
                entity_id,
                zone_id,
                template_id,
            } => {
                self.names.record_spawn(entity_id, zone_id, template_id);
                Vec::new()
            }
            MeterEvent::NpcStatus {
                entity_id,
                status,
                hp_level,
            } => {
                if status == npc_status::DEAD || hp_level == 0 {
                    self.on_target_died(entity_id)
                } else {
                    Vec::new()
                }
            }
            MeterEvent::HpChanged { target, cur_hp } => {
                if cur_hp == 0 {
                    self.on_target_died(target)
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn on_skill_result(&mut self, target: TargetId, source: u64, owner: u64, kind: u32, value: u64) {
        let real_source = if owner != 0 { owner } else { source };
        if self.self_id != Some(real_source) || kind != skill_kind::DAMAGE {
            return;
        }

        if self.tracker.is_fighting(target) {
            self.tracker.record_damage(target, value);
        } else {
            let name = self
                .names
                .name_for(target)
                .map(str::to_string)
                .unwrap_or_else(|| target.to_string());
            self.tracker.start_fight(target, name, value);
        }
    }

    fn on_user_status(&mut self, entity_id: u64, status: u32) -> Vec<MeterOutput> {
        if self.self_id != Some(entity_id) {
            return Vec::new();
        }

        if !self.in_combat && status == user_status::IN_COMBAT {
            info!("entered combat");
            self.in_combat = true;
            Vec::new()
        } else if self.in_combat && status == user_status::OUT_OF_COMBAT {
            // Targets reset when the player drops combat
            info!("left combat");
            self.in_combat = false;
            self.complete_all()
        } else {
            Vec::new()
        }
    }

    fn on_target_died(&mut self, target: TargetId) -> Vec<MeterOutput> {
        if !self.tracker.is_fighting(target) {
            return Vec::new();
        }
        let info = self.tracker.complete_fight(target);
        info.and_then(|info| self.report(&info)).into_iter().collect()
    }

    /// Live overlay snapshot while in combat. Also drops expired fights.
    pub fn refresh(&mut self) -> Option<MeterOutput> {
        let swept = self.tracker.sweep_expired();
        if swept > 0 {
            debug!(swept, "dropped completed fights after grace window");
        }
        if !self.in_combat {
            return None;
        }

        let message = format_live_snapshot(self.tracker.all_dps_messages(), self.european);
        Some(MeterOutput::Overlay { message })
    }

    /// Complete every remaining fight, e.g. when the event stream ends.
    pub fn finish(&mut self) -> Vec<MeterOutput> {
        self.in_combat = false;
        self.complete_all()
    }

    fn complete_all(&mut self) -> Vec<MeterOutput> {
        self.tracker
            .complete_all_fights()
            .into_iter()
            .flatten()
            .filter_map(|info| self.report(&info))
            .collect()
    }

    fn report(&self, info: &DpsInfo) -> Option<MeterOutput> {
        match format_dps_info(info, self.european) {
            Ok(message) => Some(MeterOutput::Report {
                sender: self.report_name.clone(),
                message,
            }),
            Err(e) => {
                error!(error = %e, "dropping unformattable fight report");
                None
            }
        }
    }
}
