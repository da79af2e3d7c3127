//! Wire-stable codes shared between simulation and snapshots.
//!
//! Gameplay tunables live in [`crate::balance`]; only values that clients
//! decode structurally (bit positions, type codes) belong here.

/// Player status flags, packed into a single `u32` per player.
pub mod flags {
    /// Player is dead and waiting to respawn
    pub const DEAD: u32 = 1 << 0;
    /// Post-respawn protection window
    pub const RESPAWN_SHIELD: u32 = 1 << 1;
    /// Short invulnerability after taking a hit
    pub const INVULNERABLE: u32 = 1 << 2;
    /// Last-breath window: at minimum mass, cannot drop below it
    pub const LAST_BREATH: u32 = 1 << 3;
    /// Drift turn in progress
    pub const DRIFTING: u32 = 1 << 4;
    /// Marked as the current rebel (mass leader)
    pub const REBEL: u32 = 1 << 5;
    /// Inside a safe zone
    pub const IN_SAFE_ZONE: u32 = 1 << 6;
    /// Dash ability active
    pub const ABILITY_DASH: u32 = 1 << 7;
    /// Shield ability active (reflects bite damage)
    pub const ABILITY_SHIELD: u32 = 1 << 8;
    /// Magnet ability active (pulls orbs)
    pub const ABILITY_MAGNET: u32 = 1 << 9;
    /// Poison stack ticking
    pub const POISONED: u32 = 1 << 10;
    /// Frost slow active
    pub const FROZEN: u32 = 1 << 11;
    /// Stunned: no movement or attacks
    pub const STUNNED: u32 = 1 << 12;
}

/// Environmental zone type codes
pub mod zone_type {
    pub const NECTAR: u8 = 1;
    pub const ICE: u8 = 2;
    pub const SLIME: u8 = 3;
    pub const LAVA: u8 = 4;
    pub const TURBO: u8 = 5;
}

/// Obstacle type codes
pub mod obstacle_type {
    pub const PILLAR: u8 = 1;
    pub const SPIKES: u8 = 2;
}

/// Slime class ids
pub mod class_id {
    pub const BASE: u8 = 0;
    pub const HUNTER: u8 = 1;
    pub const WARRIOR: u8 = 2;
    pub const COLLECTOR: u8 = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_are_distinct_bits() {
        let all = [
            flags::DEAD,
            flags::RESPAWN_SHIELD,
            flags::INVULNERABLE,
            flags::LAST_BREATH,
            flags::DRIFTING,
            flags::REBEL,
            flags::IN_SAFE_ZONE,
            flags::ABILITY_DASH,
            flags::ABILITY_SHIELD,
            flags::ABILITY_MAGNET,
            flags::POISONED,
            flags::FROZEN,
            flags::STUNNED,
        ];
        let mut seen = 0u32;
        for flag in all {
            assert_eq!(flag.count_ones(), 1);
            assert_eq!(seen & flag, 0, "duplicate bit {:#b}", flag);
            seen |= flag;
        }
    }
}
