use serde::{Deserialize, Serialize};

use crate::tracker::TargetId;

/// Domain events delivered by the upstream event source.
///
/// Serialized as internally tagged JSON, e.g.
/// `{"type":"skill_result","target":7,"source":1,"owner":0,"kind":1,"value":500}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeterEvent {
    /// The local player's entity id became known.
    SelfIdentified { entity_id: u64 },

    /// A skill landed on `target`. `owner` is non-zero when `source` is a
    /// pet or projectile acting for another entity.
    SkillResult {
        target: TargetId,
        source: u64,
        #[serde(default)]
        owner: u64,
        kind: u32,
        value: u64,
    },

    /// Combat status of a player.
    UserStatus { entity_id: u64, status: u32 },

    /// An NPC entered view; `zone_id`/`template_id` identify its name.
    NpcSpawned {
        entity_id: TargetId,
        zone_id: u32,
        template_id: u32,
    },

    /// Status update for an NPC.
    NpcStatus {
        entity_id: TargetId,
        status: u32,
        hp_level: u32,
    },

    /// Hit point change for any creature.
    HpChanged { target: TargetId, cur_hp: u64 },
}

/// An event stamped with its offset into a recorded stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    pub event: MeterEvent,
}
