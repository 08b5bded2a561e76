//! Tests for the event glue
//!
//! Events are fed through `handle_event` with a `ManualClock`; sink dispatch
//! is checked with a recording sink.

use std::sync::{Arc, Mutex};

use dps_meter_types::MeterConfig;

use super::{DisplaySink, DpsMeter, MeterOutput};
use crate::clock::ManualClock;
use crate::events::MeterEvent;
use crate::names::CreatureNames;
use crate::tracker::TargetId;

const ME: u64 = 100;
const PARTY_MEMBER: u64 = 200;
const GOBLIN: TargetId = TargetId(7);
const TROLL: TargetId = TargetId(8);

fn make_meter(grace_ms: u64) -> (DpsMeter<ManualClock, CreatureNames>, ManualClock) {
    let clock = ManualClock::new(0);
    let mut names = CreatureNames::new();
    names.insert(13, 1002, "Goblin");
    names.insert(13, 1003, "Troll");

    let config = MeterConfig {
        grace_period_ms: grace_ms,
        self_id: Some(ME),
        ..MeterConfig::default()
    };
    (DpsMeter::new(clock.clone(), names, &config), clock)
}

fn spawn(entity_id: TargetId, template_id: u32) -> MeterEvent {
    MeterEvent::NpcSpawned {
        entity_id,
        zone_id: 13,
        template_id,
    }
}

fn hit(target: TargetId, source: u64, value: u64) -> MeterEvent {
    MeterEvent::SkillResult {
        target,
        source,
        owner: 0,
        kind: 1,
        value,
    }
}

fn npc_status(entity_id: TargetId, status: u32, hp_level: u32) -> MeterEvent {
    MeterEvent::NpcStatus {
        entity_id,
        status,
        hp_level,
    }
}

fn user_status(status: u32) -> MeterEvent {
    MeterEvent::UserStatus {
        entity_id: ME,
        status,
    }
}

fn report(message: &str) -> MeterOutput {
    MeterOutput::Report {
        sender: "dps report".to_string(),
        message: message.to_string(),
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    outputs: Arc<Mutex<Vec<MeterOutput>>>,
}

impl DisplaySink for RecordingSink {
    fn report(&mut self, sender: &str, message: &str) {
        self.outputs.lock().unwrap().push(MeterOutput::Report {
            sender: sender.to_string(),
            message: message.to_string(),
        });
    }

    fn overlay(&mut self, message: &str) {
        self.outputs.lock().unwrap().push(MeterOutput::Overlay {
            message: message.to_string(),
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Damage attribution
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_damage_from_other_sources_is_ignored() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, PARTY_MEMBER, 500));
    assert!(!meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_damage_owned_by_self_is_counted() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(MeterEvent::SkillResult {
        target: GOBLIN,
        source: 555,
        owner: ME,
        kind: 1,
        value: 300,
    });
    assert_eq!(meter.tracker().total_damage(GOBLIN), Some(300));
}

#[test]
fn test_own_pet_owned_by_someone_else_is_ignored() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(MeterEvent::SkillResult {
        target: GOBLIN,
        source: ME,
        owner: PARTY_MEMBER,
        kind: 1,
        value: 300,
    });
    assert!(!meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_non_damage_results_are_ignored() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(MeterEvent::SkillResult {
        target: GOBLIN,
        source: ME,
        owner: 0,
        kind: 2,
        value: 300,
    });
    assert!(!meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_nothing_is_tracked_before_self_is_known() {
    let clock = ManualClock::new(0);
    let mut meter = DpsMeter::new(clock, CreatureNames::new(), &MeterConfig::default());
    meter.handle_event(hit(GOBLIN, ME, 500));
    assert!(!meter.tracker().is_fighting(GOBLIN));

    meter.handle_event(MeterEvent::SelfIdentified { entity_id: ME });
    assert_eq!(meter.self_id(), Some(ME));
    meter.handle_event(hit(GOBLIN, ME, 500));
    assert!(meter.tracker().is_fighting(GOBLIN));
}

// ─────────────────────────────────────────────────────────────────────────────
// Names
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fight_uses_spawn_name() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(spawn(GOBLIN, 1002));
    meter.handle_event(hit(GOBLIN, ME, 1));
    assert_eq!(meter.tracker().get(GOBLIN).unwrap().target_name, "Goblin");
}

#[test]
fn test_unresolved_spawn_uses_fallback_name() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(MeterEvent::NpcSpawned {
        entity_id: GOBLIN,
        zone_id: 4,
        template_id: 77,
    });
    meter.handle_event(hit(GOBLIN, ME, 1));
    assert_eq!(meter.tracker().get(GOBLIN).unwrap().target_name, "4-77");
}

#[test]
fn test_unspawned_target_is_named_by_id() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 1));
    assert_eq!(meter.tracker().get(GOBLIN).unwrap().target_name, "7");
}

// ─────────────────────────────────────────────────────────────────────────────
// Fight completion
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_death_status_reports_fight() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(spawn(GOBLIN, 1002));
    meter.handle_event(hit(GOBLIN, ME, 500));
    clock.set_ms(2_500);
    meter.handle_event(hit(GOBLIN, ME, 1_500));

    let outputs = meter.handle_event(npc_status(GOBLIN, 4, 50));
    assert_eq!(outputs, vec![report("Goblin: 666/s (3s)")]);
    assert!(!meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_zero_hp_level_completes_fight() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 1_000));
    clock.set_ms(2_000);

    let outputs = meter.handle_event(npc_status(GOBLIN, 1, 0));
    assert_eq!(outputs, vec![report("7: 500/s (2s)")]);
}

#[test]
fn test_living_npc_status_keeps_fight_open() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 4_000));
    clock.set_ms(2_000);

    assert!(meter.handle_event(npc_status(GOBLIN, 1, 60)).is_empty());
    assert!(meter.handle_event(npc_status(GOBLIN, 0, 100)).is_empty());
    assert!(meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_status_of_untracked_npc_is_ignored() {
    let (mut meter, _clock) = make_meter(0);
    assert!(meter.handle_event(npc_status(TROLL, 4, 0)).is_empty());
    assert!(
        meter
            .handle_event(MeterEvent::HpChanged {
                target: TROLL,
                cur_hp: 0,
            })
            .is_empty()
    );
}

#[test]
fn test_short_fight_is_not_reported() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 9_000));
    clock.set_ms(900);

    let outputs = meter.handle_event(MeterEvent::HpChanged {
        target: GOBLIN,
        cur_hp: 0,
    });
    assert!(outputs.is_empty());
    assert!(!meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_trailing_events_after_death_do_not_start_phantom_fight() {
    let (mut meter, clock) = make_meter(3_000);
    meter.handle_event(spawn(GOBLIN, 1002));
    meter.handle_event(hit(GOBLIN, ME, 2_700));
    clock.set_ms(3_000);

    let outputs = meter.handle_event(MeterEvent::HpChanged {
        target: GOBLIN,
        cur_hp: 0,
    });
    assert_eq!(outputs, vec![report("Goblin: 900/s (3s)")]);

    // The killing blow's result arrives after the death notification.
    clock.set_ms(3_050);
    meter.handle_event(hit(GOBLIN, ME, 900));
    assert_eq!(meter.tracker().len(), 1);
    assert_eq!(meter.tracker().total_damage(GOBLIN), Some(2_700));

    // Death status trailing the hp change does not report twice.
    assert!(meter.handle_event(npc_status(GOBLIN, 4, 0)).is_empty());

    clock.set_ms(6_000);
    assert!(!meter.tracker().is_fighting(GOBLIN));
}

// ─────────────────────────────────────────────────────────────────────────────
// Combat state and overlay
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_overlay_only_refreshes_in_combat() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 900));
    clock.set_ms(3_000);
    assert_eq!(meter.refresh(), None);

    meter.handle_event(user_status(1));
    assert!(meter.in_combat());
    assert_eq!(
        meter.refresh(),
        Some(MeterOutput::Overlay {
            message: "7: 300/s (3s)".to_string(),
        })
    );
}

#[test]
fn test_overlay_sorts_fights_by_dps() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(user_status(1));
    meter.handle_event(spawn(GOBLIN, 1002));
    meter.handle_event(spawn(TROLL, 1003));
    meter.handle_event(hit(GOBLIN, ME, 900));
    meter.handle_event(hit(TROLL, ME, 9_000));
    clock.set_ms(3_000);

    let Some(MeterOutput::Overlay { message }) = meter.refresh() else {
        panic!("expected overlay output");
    };
    assert_eq!(message, "Troll: 3.000k/s (3s)\nGoblin: 300/s (3s)");

    // Refreshing does not consume the fights.
    assert_eq!(meter.tracker().len(), 2);
}

#[test]
fn test_leaving_combat_reports_all_fights() {
    let (mut meter, clock) = make_meter(3_000);
    meter.handle_event(user_status(1));
    meter.handle_event(spawn(GOBLIN, 1002));
    meter.handle_event(spawn(TROLL, 1003));
    meter.handle_event(hit(GOBLIN, ME, 900));
    meter.handle_event(hit(TROLL, ME, 9_000));
    meter.handle_event(hit(TargetId(9), ME, 0));
    clock.set_ms(3_000);

    let outputs = meter.handle_event(user_status(0));
    assert_eq!(
        outputs,
        vec![report("Goblin: 300/s (3s)"), report("Troll: 3.000k/s (3s)")]
    );
    assert!(!meter.in_combat());
    assert!(meter.tracker().is_empty());
}

#[test]
fn test_other_players_status_is_ignored() {
    let (mut meter, _clock) = make_meter(0);
    meter.handle_event(MeterEvent::UserStatus {
        entity_id: PARTY_MEMBER,
        status: 1,
    });
    assert!(!meter.in_combat());
}

#[test]
fn test_repeated_out_of_combat_status_reports_nothing() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 900));
    clock.set_ms(3_000);

    // Never entered combat, so there is nothing to leave.
    assert!(meter.handle_event(user_status(0)).is_empty());
    assert!(meter.tracker().is_fighting(GOBLIN));
}

#[test]
fn test_refresh_sweeps_expired_fights() {
    let (mut meter, clock) = make_meter(1_000);
    meter.handle_event(hit(GOBLIN, ME, 900));
    clock.set_ms(3_000);
    meter.handle_event(npc_status(GOBLIN, 4, 0));
    assert_eq!(meter.tracker().len(), 1);

    clock.set_ms(4_000);
    meter.refresh();
    assert!(meter.tracker().is_empty());
}

#[test]
fn test_finish_reports_remaining_fights() {
    let (mut meter, clock) = make_meter(0);
    meter.handle_event(hit(GOBLIN, ME, 900));
    clock.set_ms(3_000);
    assert_eq!(meter.finish(), vec![report("7: 300/s (3s)")]);
    assert!(meter.tracker().is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Sink dispatch
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_process_event_and_tick_deliver_to_sinks() {
    let (mut meter, clock) = make_meter(0);
    let sink = RecordingSink::default();
    meter.add_sink(Box::new(sink.clone()));

    meter.process_event(user_status(1));
    meter.process_event(spawn(GOBLIN, 1002));
    meter.process_event(hit(GOBLIN, ME, 900));
    clock.set_ms(3_000);
    meter.tick();
    meter.process_event(npc_status(GOBLIN, 4, 0));
    meter.process_event(user_status(0));
    meter.tick();

    let outputs = sink.outputs.lock().unwrap().clone();
    assert_eq!(
        outputs,
        vec![
            MeterOutput::Overlay {
                message: "Goblin: 300/s (3s)".to_string(),
            },
            report("Goblin: 300/s (3s)"),
        ]
    );
}

#[test]
fn test_shutdown_delivers_final_reports() {
    let (mut meter, clock) = make_meter(0);
    let sink = RecordingSink::default();
    meter.add_sink(Box::new(sink.clone()));

    meter.process_event(hit(GOBLIN, ME, 900));
    clock.set_ms(3_000);
    meter.shutdown();

    assert_eq!(
        *sink.outputs.lock().unwrap(),
        vec![report("7: 300/s (3s)")]
    );
}
