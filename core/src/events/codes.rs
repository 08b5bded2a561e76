//! Numeric codes carried by upstream events.

/// `SkillResult::kind` values.
pub mod skill_kind {
    pub const DAMAGE: u32 = 1;
}

/// `UserStatus::status` values for the local player.
pub mod user_status {
    pub const OUT_OF_COMBAT: u32 = 0;
    pub const IN_COMBAT: u32 = 1;
}

/// `NpcStatus::status` values.
pub mod npc_status {
    pub const DEAD: u32 = 4;
}
