//! Balance configuration: every gameplay tunable in one resolved, read-only
//! record.
//!
//! A room receives a `ResolvedBalanceConfig` once at creation (usually behind
//! an `Arc` shared across rooms) and never mutates it. Untrusted partial JSON
//! is merged against the defaults below by [`resolve::resolve_balance_config`].

pub mod resolve;

use serde::{Deserialize, Serialize};

pub use resolve::{resolve_balance_config, BalanceConfigError};

/// Match phases in play order. `Results` is terminal until restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Spawn,
    Collect,
    Hunt,
    Chaos,
    Final,
    Results,
}

impl MatchPhase {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Spawn" => Some(Self::Spawn),
            "Collect" => Some(Self::Collect),
            "Hunt" => Some(Self::Hunt),
            "Chaos" => Some(Self::Chaos),
            "Final" => Some(Self::Final),
            "Results" => Some(Self::Results),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spawn => "Spawn",
            Self::Collect => "Collect",
            Self::Hunt => "Hunt",
            Self::Chaos => "Chaos",
            Self::Final => "Final",
            Self::Results => "Results",
        }
    }
}

/// Per-bucket value selected by map size (small <= 900 < medium <= 1400 < large).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSizeTable {
    pub small: f32,
    pub medium: f32,
    pub large: f32,
}

/// Map size bucket key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapSizeKey {
    Small,
    Medium,
    Large,
}

impl MapSizeTable {
    pub const fn uniform(value: f32) -> Self {
        Self {
            small: value,
            medium: value,
            large: value,
        }
    }

    pub fn get(&self, key: MapSizeKey) -> f32 {
        match key {
            MapSizeKey::Small => self.small,
            MapSizeKey::Medium => self.medium,
            MapSizeKey::Large => self.large,
        }
    }
}

pub fn map_size_key(map_size: f32) -> MapSizeKey {
    if map_size <= 900.0 {
        MapSizeKey::Small
    } else if map_size <= 1400.0 {
        MapSizeKey::Medium
    } else {
        MapSizeKey::Large
    }
}

#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub map_size: f32,
}

/// World boundary shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldShape {
    Circle,
    Rect,
}

#[derive(Debug, Clone)]
pub struct WorldPhysicsConfig {
    pub world_shape: WorldShape,
    /// Circle radius; falls back to `map_size / 2` when absent
    pub radius: Option<f32>,
    /// Rect extents; fall back to `map_size` when absent
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub restitution: f32,
    pub max_position_correction: f32,
}

#[derive(Debug, Clone)]
pub struct ServerTuning {
    pub max_players: usize,
    pub tick_rate: f32,
    pub simulation_interval_ms: f32,
    pub global_cooldown_ms: f32,
    pub ability_queue_size: usize,
    /// Derived: `max(1, round(global_cooldown_ms / ms_per_tick))`.
    /// Recomputed by the resolver, never read from raw input.
    pub global_cooldown_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct MatchPhaseConfig {
    pub id: MatchPhase,
    pub start_sec: f32,
    pub end_sec: f32,
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub duration_sec: f32,
    pub results_duration_sec: f32,
    pub restart_delay_sec: f32,
    pub phases: Vec<MatchPhaseConfig>,
}

#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    pub environment_drag: f32,
    pub collision_restitution: f32,
    pub collision_impulse_cap: f32,
    pub slime_linear_damping: f32,
    pub orb_linear_damping: f32,
    pub speed_damping_rate: f32,
    pub min_slime_mass: f32,
    pub max_slime_speed: f32,
    pub max_orb_speed: f32,
}

#[derive(Debug, Clone)]
pub struct ControlsConfig {
    pub joystick_deadzone: f32,
    pub input_timeout_ms: f32,
}

#[derive(Debug, Clone)]
pub struct SlimeConfig {
    pub initial_mass: f32,
    pub initial_level: u32,
    pub initial_class_id: u8,
    /// Mass thresholds for levels 2, 3, ... Beyond the table thresholds grow by x1.5.
    pub level_thresholds: Vec<f32>,
    /// Index = ability slot, value = unlock level (slot 0 is the class ability).
    pub slot_unlock_levels: Vec<u32>,
    pub talent_grant_levels: Vec<u32>,
    /// Fraction of (capped) player mass taken per orb bite
    pub orb_bite_pct_of_mass: f32,
}

#[derive(Debug, Clone)]
pub struct MovementConfig {
    pub base_speed: f32,
    pub base_turn_rate_deg: f32,
    pub turn_divisor: f32,
    pub friction: f32,
    pub drift_turn_rate_deg: f32,
    pub drift_threshold_angle_deg: f32,
    pub drift_duration_sec: f32,
    pub drift_speed_loss: f32,
    pub drift_cooldown_sec: f32,
}

#[derive(Debug, Clone)]
pub struct CombatConfig {
    pub mouth_arc_deg: f32,
    pub tail_arc_deg: f32,
    pub tail_damage_multiplier: f32,
    pub attack_cooldown_sec: f32,
    pub damage_invuln_sec: f32,
    pub bite_cooldown_sec: f32,
    pub respawn_shield_sec: f32,
    pub last_breath_duration_sec: f32,
    pub last_breath_damage_mult: f32,
    pub last_breath_speed_mult: f32,
    /// Attacker gains this fraction of their OWN mass per bite
    pub pvp_bite_attacker_gain_pct: f32,
    /// Defender additionally loses this fraction of their OWN mass as orbs
    pub pvp_bite_scatter_pct: f32,
    pub pvp_bite_scatter_orb_count: u32,
    pub pvp_bite_scatter_speed: f32,
    pub scatter_orb_min_mass: f32,
}

#[derive(Debug, Clone)]
pub struct DeathConfig {
    pub respawn_delay_sec: f32,
    pub mass_lost_percent: f32,
    pub mass_to_orbs_percent: f32,
    pub orbs_count: u32,
    pub min_respawn_mass: f32,
}

#[derive(Debug, Clone)]
pub struct OrbTypeConfig {
    pub id: String,
    pub weight: f32,
    pub density: f32,
    pub mass_range: [f32; 2],
}

#[derive(Debug, Clone)]
pub struct OrbsConfig {
    pub initial_count: usize,
    pub max_count: usize,
    pub respawn_interval_sec: f32,
    pub min_mass: f32,
    pub min_radius: f32,
    pub push_force: f32,
    /// Orbs below this mass cannot be bitten at all (GCD is still consumed)
    pub bite_min_mass: f32,
    /// Player mass is capped at this value when computing the swallow threshold
    pub bite_max_mass: f32,
    pub types: Vec<OrbTypeConfig>,
}

#[derive(Debug, Clone, Copy)]
pub struct FormulaConfig {
    pub base: f32,
    pub scale: f32,
    pub divisor: f32,
}

#[derive(Debug, Clone)]
pub struct FormulasConfig {
    pub hp: FormulaConfig,
    pub damage: FormulaConfig,
    pub speed: FormulaConfig,
    pub radius: FormulaConfig,
}

/// Per-class stat block. `Base` uses the neutral values.
#[derive(Debug, Clone)]
pub struct ClassConfig {
    pub speed_mult: f32,
    pub hp_mult: f32,
    pub damage_mult: f32,
    pub radius_mult: f32,
    pub eating_power_mult: f32,
    pub swallow_limit: f32,
    pub bite_fraction: f32,
    pub bite_resist_pct: f32,
}

#[derive(Debug, Clone)]
pub struct ClassesConfig {
    pub base: ClassConfig,
    pub hunter: ClassConfig,
    pub warrior: ClassConfig,
    pub collector: ClassConfig,
}

#[derive(Debug, Clone)]
pub struct ChestsConfig {
    pub max_count: usize,
    pub spawn_interval_sec: f32,
    pub mass: f32,
    pub radius: f32,
    pub armor_rings: u32,
    pub reward_mass_percent: Vec<f32>,
    pub reward_talent_chance: f32,
}

#[derive(Debug, Clone)]
pub struct HotZonesConfig {
    pub chaos_count: usize,
    pub final_count: usize,
    pub radius: f32,
    pub spawn_multiplier_chaos: f32,
    pub spawn_multiplier_final: f32,
}

#[derive(Debug, Clone)]
pub struct HungerConfig {
    pub base_drain_per_sec: f32,
    pub scaling_per_mass: f32,
    pub max_drain_per_sec: f32,
    pub min_mass: f32,
}

#[derive(Debug, Clone)]
pub struct RebelConfig {
    pub update_interval_sec: f32,
    pub mass_threshold_multiplier: f32,
}

#[derive(Debug, Clone)]
pub struct ObstaclesConfig {
    pub count_by_map_size: MapSizeTable,
    pub passage_count_by_map_size: MapSizeTable,
    pub spacing: f32,
    pub placement_retries: u32,
    pub pillar_radius: f32,
    pub spike_radius: f32,
    pub spike_chance: f32,
    pub spike_damage_pct: f32,
    pub passage_pillar_radius: f32,
    pub passage_gap_width: f32,
}

#[derive(Debug, Clone)]
pub struct SafeZonesConfig {
    pub count_by_map_size: MapSizeTable,
    pub radius_by_map_size: MapSizeTable,
    pub min_distance: f32,
    pub placement_retries: u32,
    /// Burn applied to players caught outside a safe zone while the
    /// pressure window is on
    pub damage_pct_per_sec: f32,
}

#[derive(Debug, Clone)]
pub struct ZoneTypeWeights {
    pub nectar: f32,
    pub ice: f32,
    pub slime: f32,
    pub lava: f32,
    pub turbo: f32,
}

#[derive(Debug, Clone)]
pub struct ZonesConfig {
    pub count_by_map_size: MapSizeTable,
    pub radius_by_map_size: MapSizeTable,
    pub min_distance: f32,
    pub placement_retries: u32,
    pub lava_min_distance_from_spawn: f32,
    pub type_weights: ZoneTypeWeights,
    pub nectar_mass_gain_pct_per_sec: f32,
    pub lava_damage_pct_per_sec: f32,
    pub lava_scatter_pct: f32,
    pub ice_speed_mult: f32,
    pub turbo_speed_mult: f32,
}

#[derive(Debug, Clone)]
pub struct DashConfig {
    pub duration_sec: f32,
    pub speed_mult: f32,
    pub cooldown_sec: f32,
    pub cost_pct: f32,
}

#[derive(Debug, Clone)]
pub struct ShieldConfig {
    pub duration_sec: f32,
    pub reflect_damage_pct: f32,
    pub cooldown_sec: f32,
    pub cost_pct: f32,
}

#[derive(Debug, Clone)]
pub struct MagnetConfig {
    pub duration_sec: f32,
    pub radius: f32,
    pub pull_speed: f32,
    pub cooldown_sec: f32,
    pub cost_pct: f32,
}

#[derive(Debug, Clone)]
pub struct ProjectileAbilityConfig {
    pub speed: f32,
    pub damage_pct: f32,
    pub radius: f32,
    pub max_range: f32,
    pub cooldown_sec: f32,
    pub cost_pct: f32,
}

#[derive(Debug, Clone)]
pub struct BombConfig {
    pub speed: f32,
    pub damage_pct: f32,
    pub radius: f32,
    pub explosion_radius: f32,
    pub fuse_sec: f32,
    pub cooldown_sec: f32,
    pub cost_pct: f32,
}

#[derive(Debug, Clone)]
pub struct AbilitiesConfig {
    pub dash: DashConfig,
    pub shield: ShieldConfig,
    pub magnet: MagnetConfig,
    pub projectile: ProjectileAbilityConfig,
    pub bomb: BombConfig,
}

/// The fully resolved configuration consumed by every simulation system.
#[derive(Debug, Clone)]
pub struct ResolvedBalanceConfig {
    pub world: WorldConfig,
    pub world_physics: WorldPhysicsConfig,
    pub server: ServerTuning,
    pub match_cfg: MatchConfig,
    pub physics: PhysicsConfig,
    pub controls: ControlsConfig,
    pub slime: SlimeConfig,
    pub movement: MovementConfig,
    pub combat: CombatConfig,
    pub death: DeathConfig,
    pub orbs: OrbsConfig,
    pub formulas: FormulasConfig,
    pub classes: ClassesConfig,
    pub chests: ChestsConfig,
    pub hot_zones: HotZonesConfig,
    pub hunger: HungerConfig,
    pub rebel: RebelConfig,
    pub obstacles: ObstaclesConfig,
    pub safe_zones: SafeZonesConfig,
    pub zones: ZonesConfig,
    pub abilities: AbilitiesConfig,
}

impl ResolvedBalanceConfig {
    /// Milliseconds per simulation tick
    pub fn ms_per_tick(&self) -> f32 {
        1000.0 / self.server.tick_rate
    }

    /// Convert a duration in seconds to a whole tick count (at least 1 for
    /// positive durations)
    pub fn seconds_to_ticks(&self, seconds: f32) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        ((seconds * self.server.tick_rate).round() as u64).max(1)
    }

    /// Class stat block for a class id (unknown ids fall back to base)
    pub fn class_config(&self, class_id: u8) -> &ClassConfig {
        match class_id {
            1 => &self.classes.hunter,
            2 => &self.classes.warrior,
            3 => &self.classes.collector,
            _ => &self.classes.base,
        }
    }
}

impl Default for ResolvedBalanceConfig {
    fn default() -> Self {
        let mut cfg = Self {
            world: WorldConfig { map_size: 2000.0 },
            world_physics: WorldPhysicsConfig {
                world_shape: WorldShape::Rect,
                radius: None,
                width: None,
                height: None,
                restitution: 0.5,
                max_position_correction: 6.0,
            },
            server: ServerTuning {
                max_players: 20,
                tick_rate: 30.0,
                simulation_interval_ms: 1000.0 / 30.0,
                global_cooldown_ms: 100.0,
                ability_queue_size: 1,
                global_cooldown_ticks: 1,
            },
            match_cfg: MatchConfig {
                duration_sec: 150.0,
                results_duration_sec: 10.0,
                restart_delay_sec: 3.0,
                phases: vec![
                    MatchPhaseConfig {
                        id: MatchPhase::Spawn,
                        start_sec: 0.0,
                        end_sec: 15.0,
                    },
                    MatchPhaseConfig {
                        id: MatchPhase::Collect,
                        start_sec: 15.0,
                        end_sec: 60.0,
                    },
                    MatchPhaseConfig {
                        id: MatchPhase::Hunt,
                        start_sec: 60.0,
                        end_sec: 90.0,
                    },
                    MatchPhaseConfig {
                        id: MatchPhase::Chaos,
                        start_sec: 90.0,
                        end_sec: 120.0,
                    },
                    MatchPhaseConfig {
                        id: MatchPhase::Final,
                        start_sec: 120.0,
                        end_sec: 150.0,
                    },
                ],
            },
            physics: PhysicsConfig {
                environment_drag: 0.03,
                collision_restitution: 0.5,
                collision_impulse_cap: 10_000.0,
                slime_linear_damping: 0.02,
                orb_linear_damping: 0.08,
                speed_damping_rate: 0.2,
                min_slime_mass: 50.0,
                max_slime_speed: 500.0,
                max_orb_speed: 1000.0,
            },
            controls: ControlsConfig {
                joystick_deadzone: 0.1,
                input_timeout_ms: 3000.0,
            },
            slime: SlimeConfig {
                initial_mass: 100.0,
                initial_level: 1,
                initial_class_id: 0,
                level_thresholds: vec![150.0, 250.0, 400.0, 600.0, 900.0, 1350.0, 2000.0],
                slot_unlock_levels: vec![0, 3, 5],
                talent_grant_levels: vec![2, 4, 6],
                orb_bite_pct_of_mass: 0.35,
            },
            movement: MovementConfig {
                base_speed: 300.0,
                base_turn_rate_deg: 180.0,
                turn_divisor: 200.0,
                friction: 0.98,
                drift_turn_rate_deg: 720.0,
                drift_threshold_angle_deg: 120.0,
                drift_duration_sec: 0.3,
                drift_speed_loss: 0.5,
                drift_cooldown_sec: 0.5,
            },
            combat: CombatConfig {
                mouth_arc_deg: 120.0,
                tail_arc_deg: 120.0,
                tail_damage_multiplier: 1.5,
                attack_cooldown_sec: 0.2,
                damage_invuln_sec: 0.2,
                bite_cooldown_sec: 0.1,
                respawn_shield_sec: 5.0,
                last_breath_duration_sec: 0.5,
                last_breath_damage_mult: 0.5,
                last_breath_speed_mult: 0.8,
                pvp_bite_attacker_gain_pct: 0.10,
                pvp_bite_scatter_pct: 0.10,
                pvp_bite_scatter_orb_count: 3,
                pvp_bite_scatter_speed: 150.0,
                scatter_orb_min_mass: 5.0,
            },
            death: DeathConfig {
                respawn_delay_sec: 2.0,
                mass_lost_percent: 0.5,
                mass_to_orbs_percent: 0.3,
                orbs_count: 4,
                min_respawn_mass: 50.0,
            },
            orbs: OrbsConfig {
                initial_count: 100,
                max_count: 150,
                respawn_interval_sec: 0.5,
                min_mass: 3.0,
                min_radius: 5.0,
                push_force: 100.0,
                bite_min_mass: 3.0,
                bite_max_mass: 1000.0,
                types: vec![
                    OrbTypeConfig {
                        id: "green".to_string(),
                        weight: 40.0,
                        density: 0.8,
                        mass_range: [5.0, 15.0],
                    },
                    OrbTypeConfig {
                        id: "blue".to_string(),
                        weight: 30.0,
                        density: 1.0,
                        mass_range: [20.0, 40.0],
                    },
                    OrbTypeConfig {
                        id: "red".to_string(),
                        weight: 20.0,
                        density: 1.0,
                        mass_range: [20.0, 40.0],
                    },
                    OrbTypeConfig {
                        id: "gold".to_string(),
                        weight: 10.0,
                        density: 1.5,
                        mass_range: [50.0, 100.0],
                    },
                ],
            },
            formulas: FormulasConfig {
                hp: FormulaConfig {
                    base: 50.0,
                    scale: 50.0,
                    divisor: 100.0,
                },
                damage: FormulaConfig {
                    base: 10.0,
                    scale: 10.0,
                    divisor: 100.0,
                },
                speed: FormulaConfig {
                    base: 1.0,
                    scale: 1.0,
                    divisor: 500.0,
                },
                radius: FormulaConfig {
                    base: 10.0,
                    scale: 1.0,
                    divisor: 50.0,
                },
            },
            classes: ClassesConfig {
                base: ClassConfig {
                    speed_mult: 1.0,
                    hp_mult: 1.0,
                    damage_mult: 1.0,
                    radius_mult: 1.0,
                    eating_power_mult: 1.0,
                    swallow_limit: 40.0,
                    bite_fraction: 0.3,
                    bite_resist_pct: 0.0,
                },
                hunter: ClassConfig {
                    speed_mult: 1.15,
                    hp_mult: 0.9,
                    damage_mult: 1.0,
                    radius_mult: 1.0,
                    eating_power_mult: 1.0,
                    swallow_limit: 50.0,
                    bite_fraction: 0.3,
                    bite_resist_pct: 0.0,
                },
                warrior: ClassConfig {
                    speed_mult: 0.9,
                    hp_mult: 1.15,
                    damage_mult: 1.1,
                    radius_mult: 1.0,
                    eating_power_mult: 1.0,
                    swallow_limit: 45.0,
                    bite_fraction: 0.35,
                    bite_resist_pct: 0.1,
                },
                collector: ClassConfig {
                    speed_mult: 1.0,
                    hp_mult: 1.0,
                    damage_mult: 1.0,
                    radius_mult: 1.25,
                    eating_power_mult: 1.15,
                    swallow_limit: 70.0,
                    bite_fraction: 0.5,
                    bite_resist_pct: 0.0,
                },
            },
            chests: ChestsConfig {
                max_count: 3,
                spawn_interval_sec: 20.0,
                mass: 200.0,
                radius: 28.0,
                armor_rings: 2,
                reward_mass_percent: vec![0.1, 0.2, 0.3],
                reward_talent_chance: 0.3,
            },
            hot_zones: HotZonesConfig {
                chaos_count: 2,
                final_count: 1,
                radius: 220.0,
                spawn_multiplier_chaos: 3.0,
                spawn_multiplier_final: 5.0,
            },
            hunger: HungerConfig {
                base_drain_per_sec: 2.0,
                scaling_per_mass: 0.01,
                max_drain_per_sec: 12.0,
                min_mass: 50.0,
            },
            rebel: RebelConfig {
                update_interval_sec: 5.0,
                mass_threshold_multiplier: 1.2,
            },
            obstacles: ObstaclesConfig {
                count_by_map_size: MapSizeTable {
                    small: 6.0,
                    medium: 10.0,
                    large: 14.0,
                },
                passage_count_by_map_size: MapSizeTable {
                    small: 1.0,
                    medium: 2.0,
                    large: 3.0,
                },
                spacing: 60.0,
                placement_retries: 25,
                pillar_radius: 35.0,
                spike_radius: 25.0,
                spike_chance: 0.35,
                spike_damage_pct: 0.05,
                passage_pillar_radius: 30.0,
                passage_gap_width: 90.0,
            },
            safe_zones: SafeZonesConfig {
                count_by_map_size: MapSizeTable {
                    small: 1.0,
                    medium: 2.0,
                    large: 2.0,
                },
                radius_by_map_size: MapSizeTable {
                    small: 90.0,
                    medium: 110.0,
                    large: 130.0,
                },
                min_distance: 400.0,
                placement_retries: 25,
                damage_pct_per_sec: 0.05,
            },
            zones: ZonesConfig {
                count_by_map_size: MapSizeTable {
                    small: 3.0,
                    medium: 5.0,
                    large: 7.0,
                },
                radius_by_map_size: MapSizeTable {
                    small: 100.0,
                    medium: 120.0,
                    large: 140.0,
                },
                min_distance: 80.0,
                placement_retries: 25,
                lava_min_distance_from_spawn: 500.0,
                type_weights: ZoneTypeWeights {
                    nectar: 30.0,
                    ice: 25.0,
                    slime: 15.0,
                    lava: 15.0,
                    turbo: 15.0,
                },
                nectar_mass_gain_pct_per_sec: 0.02,
                lava_damage_pct_per_sec: 0.06,
                lava_scatter_pct: 0.5,
                ice_speed_mult: 0.7,
                turbo_speed_mult: 1.4,
            },
            abilities: AbilitiesConfig {
                dash: DashConfig {
                    duration_sec: 0.4,
                    speed_mult: 2.5,
                    cooldown_sec: 5.0,
                    cost_pct: 0.02,
                },
                shield: ShieldConfig {
                    duration_sec: 1.5,
                    reflect_damage_pct: 0.5,
                    cooldown_sec: 8.0,
                    cost_pct: 0.03,
                },
                magnet: MagnetConfig {
                    duration_sec: 3.0,
                    radius: 200.0,
                    pull_speed: 250.0,
                    cooldown_sec: 10.0,
                    cost_pct: 0.02,
                },
                projectile: ProjectileAbilityConfig {
                    speed: 600.0,
                    damage_pct: 0.10,
                    radius: 8.0,
                    max_range: 300.0,
                    cooldown_sec: 4.0,
                    cost_pct: 0.02,
                },
                bomb: BombConfig {
                    speed: 350.0,
                    damage_pct: 0.15,
                    radius: 12.0,
                    explosion_radius: 120.0,
                    fuse_sec: 1.2,
                    cooldown_sec: 12.0,
                    cost_pct: 0.04,
                },
            },
        };
        cfg.server.global_cooldown_ticks = resolve::derive_global_cooldown_ticks(
            cfg.server.global_cooldown_ms,
            cfg.server.tick_rate,
        );
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gcd_ticks() {
        let cfg = ResolvedBalanceConfig::default();
        // 100ms at 30Hz = 3 ticks
        assert_eq!(cfg.server.global_cooldown_ticks, 3);
    }

    #[test]
    fn test_seconds_to_ticks() {
        let cfg = ResolvedBalanceConfig::default();
        assert_eq!(cfg.seconds_to_ticks(1.0), 30);
        assert_eq!(cfg.seconds_to_ticks(0.0), 0);
        // Sub-tick durations round up to one tick
        assert_eq!(cfg.seconds_to_ticks(0.001), 1);
    }

    #[test]
    fn test_map_size_key_buckets() {
        assert_eq!(map_size_key(800.0), MapSizeKey::Small);
        assert_eq!(map_size_key(900.0), MapSizeKey::Small);
        assert_eq!(map_size_key(901.0), MapSizeKey::Medium);
        assert_eq!(map_size_key(1400.0), MapSizeKey::Medium);
        assert_eq!(map_size_key(2000.0), MapSizeKey::Large);
    }

    #[test]
    fn test_class_config_fallback() {
        let cfg = ResolvedBalanceConfig::default();
        assert_eq!(cfg.class_config(1).speed_mult, cfg.classes.hunter.speed_mult);
        assert_eq!(cfg.class_config(99).swallow_limit, cfg.classes.base.swallow_limit);
    }

    #[test]
    fn test_phase_parse_roundtrip() {
        for phase in [
            MatchPhase::Spawn,
            MatchPhase::Collect,
            MatchPhase::Hunt,
            MatchPhase::Chaos,
            MatchPhase::Final,
            MatchPhase::Results,
        ] {
            assert_eq!(MatchPhase::parse(phase.as_str()), Some(phase));
        }
        assert_eq!(MatchPhase::parse("Growth"), None);
    }
}
