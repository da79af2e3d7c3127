//! Per-leaf resolution of untrusted balance JSON against built-in defaults.
//!
//! Resolution is field-by-field, not document-by-document: a config file that
//! only overrides `combat.mouthArcDeg` keeps every other default. A field that
//! is present but of the wrong type is a hard error naming the exact path, so
//! a typo in a deployed config fails room creation instead of silently playing
//! with defaults.

use serde_json::Value;

use super::{
    MapSizeTable, MatchPhase, MatchPhaseConfig, OrbTypeConfig, ResolvedBalanceConfig, WorldShape,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceConfigError {
    #[error("balance config: expected a number at `{0}`")]
    InvalidNumber(String),
    #[error("balance config: expected a string at `{0}`")]
    InvalidString(String),
    #[error("balance config: expected an array at `{0}`")]
    InvalidArray(String),
    #[error("balance config: expected an object at `{0}`")]
    InvalidObject(String),
    #[error("balance config: unknown match phase `{1}` at `{0}`")]
    InvalidPhase(String, String),
    #[error("balance config: unknown world shape `{1}` at `{0}`")]
    InvalidShape(String, String),
}

/// Derived GCD length: at least one tick even for very short cooldowns.
pub fn derive_global_cooldown_ticks(global_cooldown_ms: f32, tick_rate: f32) -> u64 {
    let ms_per_tick = 1000.0 / tick_rate;
    ((global_cooldown_ms / ms_per_tick).round() as u64).max(1)
}

/// A cursor into the raw JSON carrying its dotted path for error reporting.
/// `value: None` means "absent, use defaults all the way down".
struct Node<'a> {
    value: Option<&'a Value>,
    path: String,
}

impl<'a> Node<'a> {
    fn root(value: &'a Value) -> Result<Self, BalanceConfigError> {
        if !value.is_object() {
            return Err(BalanceConfigError::InvalidObject("<root>".to_string()));
        }
        Ok(Self {
            value: Some(value),
            path: String::new(),
        })
    }

    fn join(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn child(&self, key: &str) -> Result<Node<'a>, BalanceConfigError> {
        let path = self.join(key);
        match self.value.and_then(|v| v.get(key)) {
            None | Some(Value::Null) => Ok(Node { value: None, path }),
            Some(v) if v.is_object() => Ok(Node { value: Some(v), path }),
            Some(_) => Err(BalanceConfigError::InvalidObject(path)),
        }
    }

    fn leaf(&self, key: &str) -> (Option<&'a Value>, String) {
        let path = self.join(key);
        let v = match self.value.and_then(|v| v.get(key)) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v),
        };
        (v, path)
    }

    fn f32_or(&self, key: &str, default: f32) -> Result<f32, BalanceConfigError> {
        let (v, path) = self.leaf(key);
        match v {
            None => Ok(default),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(f) => Ok(f as f32),
                None => Err(BalanceConfigError::InvalidNumber(path)),
            },
            Some(_) => Err(BalanceConfigError::InvalidNumber(path)),
        }
    }

    fn u32_or(&self, key: &str, default: u32) -> Result<u32, BalanceConfigError> {
        let (v, path) = self.leaf(key);
        match v {
            None => Ok(default),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(u) if u <= u32::MAX as u64 => Ok(u as u32),
                _ => Err(BalanceConfigError::InvalidNumber(path)),
            },
            Some(_) => Err(BalanceConfigError::InvalidNumber(path)),
        }
    }

    fn usize_or(&self, key: &str, default: usize) -> Result<usize, BalanceConfigError> {
        Ok(self.u32_or(key, default as u32)? as usize)
    }

    fn u8_or(&self, key: &str, default: u8) -> Result<u8, BalanceConfigError> {
        let v = self.u32_or(key, default as u32)?;
        if v > u8::MAX as u32 {
            return Err(BalanceConfigError::InvalidNumber(self.join(key)));
        }
        Ok(v as u8)
    }

    fn string_or(&self, key: &str, default: &str) -> Result<String, BalanceConfigError> {
        let (v, path) = self.leaf(key);
        match v {
            None => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(BalanceConfigError::InvalidString(path)),
        }
    }

    fn f32_array_or(&self, key: &str, default: &[f32]) -> Result<Vec<f32>, BalanceConfigError> {
        let (v, path) = self.leaf(key);
        match v {
            None => Ok(default.to_vec()),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item.as_f64() {
                        Some(f) => out.push(f as f32),
                        None => {
                            return Err(BalanceConfigError::InvalidNumber(format!(
                                "{}[{}]",
                                path, i
                            )))
                        }
                    }
                }
                Ok(out)
            }
            Some(_) => Err(BalanceConfigError::InvalidArray(path)),
        }
    }

    fn u32_array_or(&self, key: &str, default: &[u32]) -> Result<Vec<u32>, BalanceConfigError> {
        let (v, path) = self.leaf(key);
        match v {
            None => Ok(default.to_vec()),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    match item.as_u64() {
                        Some(u) if u <= u32::MAX as u64 => out.push(u as u32),
                        _ => {
                            return Err(BalanceConfigError::InvalidNumber(format!(
                                "{}[{}]",
                                path, i
                            )))
                        }
                    }
                }
                Ok(out)
            }
            Some(_) => Err(BalanceConfigError::InvalidArray(path)),
        }
    }

    fn map_size_table_or(
        &self,
        key: &str,
        default: MapSizeTable,
    ) -> Result<MapSizeTable, BalanceConfigError> {
        let node = self.child(key)?;
        Ok(MapSizeTable {
            small: node.f32_or("small", default.small)?,
            medium: node.f32_or("medium", default.medium)?,
            large: node.f32_or("large", default.large)?,
        })
    }
}

/// Resolve a raw JSON document into a complete [`ResolvedBalanceConfig`].
///
/// `raw` must be a JSON object. Any subset of fields may be present; absent
/// fields keep their defaults, present fields must have the right type.
pub fn resolve_balance_config(raw: &Value) -> Result<ResolvedBalanceConfig, BalanceConfigError> {
    let mut cfg = ResolvedBalanceConfig::default();
    let root = Node::root(raw)?;

    let world = root.child("world")?;
    cfg.world.map_size = world.f32_or("mapSize", cfg.world.map_size)?;

    let wp = root.child("worldPhysics")?;
    {
        let (shape, path) = wp.leaf("worldShape");
        cfg.world_physics.world_shape = match shape {
            None => cfg.world_physics.world_shape,
            Some(Value::String(s)) => match s.as_str() {
                "circle" => WorldShape::Circle,
                "rect" => WorldShape::Rect,
                other => {
                    return Err(BalanceConfigError::InvalidShape(path, other.to_string()))
                }
            },
            Some(_) => return Err(BalanceConfigError::InvalidString(path)),
        };
    }
    if wp.value.map_or(false, |v| v.get("radius").is_some()) {
        cfg.world_physics.radius = Some(wp.f32_or("radius", 0.0)?);
    }
    if wp.value.map_or(false, |v| v.get("width").is_some()) {
        cfg.world_physics.width = Some(wp.f32_or("width", 0.0)?);
    }
    if wp.value.map_or(false, |v| v.get("height").is_some()) {
        cfg.world_physics.height = Some(wp.f32_or("height", 0.0)?);
    }
    cfg.world_physics.restitution = wp.f32_or("restitution", cfg.world_physics.restitution)?;
    cfg.world_physics.max_position_correction =
        wp.f32_or("maxPositionCorrectionM", cfg.world_physics.max_position_correction)?;

    let server = root.child("server")?;
    cfg.server.max_players = server.usize_or("maxPlayers", cfg.server.max_players)?;
    cfg.server.tick_rate = server.f32_or("tickRate", cfg.server.tick_rate)?;
    cfg.server.simulation_interval_ms =
        server.f32_or("simulationIntervalMs", 1000.0 / cfg.server.tick_rate)?;
    cfg.server.global_cooldown_ms =
        server.f32_or("globalCooldownMs", cfg.server.global_cooldown_ms)?;
    cfg.server.ability_queue_size =
        server.usize_or("abilityQueueSize", cfg.server.ability_queue_size)?;
    cfg.server.global_cooldown_ticks =
        derive_global_cooldown_ticks(cfg.server.global_cooldown_ms, cfg.server.tick_rate);

    let match_node = root.child("match")?;
    cfg.match_cfg.duration_sec = match_node.f32_or("durationSec", cfg.match_cfg.duration_sec)?;
    cfg.match_cfg.results_duration_sec =
        match_node.f32_or("resultsDurationSec", cfg.match_cfg.results_duration_sec)?;
    cfg.match_cfg.restart_delay_sec =
        match_node.f32_or("restartDelaySec", cfg.match_cfg.restart_delay_sec)?;
    {
        let (phases, path) = match_node.leaf("phases");
        match phases {
            None => {}
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let node = Node {
                        value: if item.is_object() { Some(item) } else { None },
                        path: format!("{}[{}]", path, i),
                    };
                    if !item.is_object() {
                        return Err(BalanceConfigError::InvalidObject(node.path));
                    }
                    let id_str = node.string_or("id", "")?;
                    let id = MatchPhase::parse(&id_str).ok_or_else(|| {
                        BalanceConfigError::InvalidPhase(node.join("id"), id_str.clone())
                    })?;
                    out.push(MatchPhaseConfig {
                        id,
                        start_sec: node.f32_or("startSec", 0.0)?,
                        end_sec: node.f32_or("endSec", 0.0)?,
                    });
                }
                cfg.match_cfg.phases = out;
            }
            Some(_) => return Err(BalanceConfigError::InvalidArray(path)),
        }
    }

    let physics = root.child("physics")?;
    cfg.physics.environment_drag =
        physics.f32_or("environmentDrag", cfg.physics.environment_drag)?;
    cfg.physics.collision_restitution =
        physics.f32_or("collisionRestitution", cfg.physics.collision_restitution)?;
    cfg.physics.collision_impulse_cap =
        physics.f32_or("collisionImpulseCap", cfg.physics.collision_impulse_cap)?;
    cfg.physics.slime_linear_damping =
        physics.f32_or("slimeLinearDamping", cfg.physics.slime_linear_damping)?;
    cfg.physics.orb_linear_damping =
        physics.f32_or("orbLinearDamping", cfg.physics.orb_linear_damping)?;
    cfg.physics.speed_damping_rate =
        physics.f32_or("speedDampingRate", cfg.physics.speed_damping_rate)?;
    cfg.physics.min_slime_mass = physics.f32_or("minSlimeMass", cfg.physics.min_slime_mass)?;
    cfg.physics.max_slime_speed = physics.f32_or("maxSlimeSpeed", cfg.physics.max_slime_speed)?;
    cfg.physics.max_orb_speed = physics.f32_or("maxOrbSpeed", cfg.physics.max_orb_speed)?;

    let controls = root.child("controls")?;
    cfg.controls.joystick_deadzone =
        controls.f32_or("joystickDeadzone", cfg.controls.joystick_deadzone)?;
    cfg.controls.input_timeout_ms =
        controls.f32_or("inputTimeoutMs", cfg.controls.input_timeout_ms)?;

    let slime = root.child("slime")?;
    cfg.slime.initial_mass = slime.f32_or("initialMass", cfg.slime.initial_mass)?;
    cfg.slime.initial_level = slime.u32_or("initialLevel", cfg.slime.initial_level)?;
    cfg.slime.initial_class_id = slime.u8_or("initialClassId", cfg.slime.initial_class_id)?;
    cfg.slime.level_thresholds =
        slime.f32_array_or("levelThresholds", &cfg.slime.level_thresholds)?;
    cfg.slime.slot_unlock_levels =
        slime.u32_array_or("slotUnlockLevels", &cfg.slime.slot_unlock_levels)?;
    cfg.slime.talent_grant_levels =
        slime.u32_array_or("talentGrantLevels", &cfg.slime.talent_grant_levels)?;
    cfg.slime.orb_bite_pct_of_mass =
        slime.f32_or("orbBitePctOfMass", cfg.slime.orb_bite_pct_of_mass)?;

    let movement = root.child("movement")?;
    cfg.movement.base_speed = movement.f32_or("baseSpeed", cfg.movement.base_speed)?;
    cfg.movement.base_turn_rate_deg =
        movement.f32_or("baseTurnRateDeg", cfg.movement.base_turn_rate_deg)?;
    cfg.movement.turn_divisor = movement.f32_or("turnDivisor", cfg.movement.turn_divisor)?;
    cfg.movement.friction = movement.f32_or("friction", cfg.movement.friction)?;
    cfg.movement.drift_turn_rate_deg =
        movement.f32_or("driftTurnRateDeg", cfg.movement.drift_turn_rate_deg)?;
    cfg.movement.drift_threshold_angle_deg =
        movement.f32_or("driftThresholdAngleDeg", cfg.movement.drift_threshold_angle_deg)?;
    cfg.movement.drift_duration_sec =
        movement.f32_or("driftDurationSec", cfg.movement.drift_duration_sec)?;
    cfg.movement.drift_speed_loss =
        movement.f32_or("driftSpeedLoss", cfg.movement.drift_speed_loss)?;
    cfg.movement.drift_cooldown_sec =
        movement.f32_or("driftCooldownSec", cfg.movement.drift_cooldown_sec)?;

    let combat = root.child("combat")?;
    cfg.combat.mouth_arc_deg = combat.f32_or("mouthArcDeg", cfg.combat.mouth_arc_deg)?;
    cfg.combat.tail_arc_deg = combat.f32_or("tailArcDeg", cfg.combat.tail_arc_deg)?;
    cfg.combat.tail_damage_multiplier =
        combat.f32_or("tailDamageMultiplier", cfg.combat.tail_damage_multiplier)?;
    cfg.combat.attack_cooldown_sec =
        combat.f32_or("attackCooldownSec", cfg.combat.attack_cooldown_sec)?;
    cfg.combat.damage_invuln_sec =
        combat.f32_or("damageInvulnSec", cfg.combat.damage_invuln_sec)?;
    cfg.combat.bite_cooldown_sec =
        combat.f32_or("biteCooldownSec", cfg.combat.bite_cooldown_sec)?;
    cfg.combat.respawn_shield_sec =
        combat.f32_or("respawnShieldSec", cfg.combat.respawn_shield_sec)?;
    cfg.combat.last_breath_duration_sec =
        combat.f32_or("lastBreathDurationSec", cfg.combat.last_breath_duration_sec)?;
    cfg.combat.last_breath_damage_mult =
        combat.f32_or("lastBreathDamageMult", cfg.combat.last_breath_damage_mult)?;
    cfg.combat.last_breath_speed_mult =
        combat.f32_or("lastBreathSpeedPenalty", cfg.combat.last_breath_speed_mult)?;
    cfg.combat.pvp_bite_attacker_gain_pct =
        combat.f32_or("pvpBiteAttackerGainPct", cfg.combat.pvp_bite_attacker_gain_pct)?;
    cfg.combat.pvp_bite_scatter_pct =
        combat.f32_or("pvpBiteScatterPct", cfg.combat.pvp_bite_scatter_pct)?;
    cfg.combat.pvp_bite_scatter_orb_count = combat.u32_or(
        "pvpBiteScatterOrbCount",
        cfg.combat.pvp_bite_scatter_orb_count,
    )?;
    cfg.combat.pvp_bite_scatter_speed =
        combat.f32_or("pvpBiteScatterSpeed", cfg.combat.pvp_bite_scatter_speed)?;
    cfg.combat.scatter_orb_min_mass =
        combat.f32_or("scatterOrbMinMass", cfg.combat.scatter_orb_min_mass)?;

    let death = root.child("death")?;
    cfg.death.respawn_delay_sec = death.f32_or("respawnDelaySec", cfg.death.respawn_delay_sec)?;
    cfg.death.mass_lost_percent = death.f32_or("massLostPercent", cfg.death.mass_lost_percent)?;
    cfg.death.mass_to_orbs_percent =
        death.f32_or("massToOrbsPercent", cfg.death.mass_to_orbs_percent)?;
    cfg.death.orbs_count = death.u32_or("orbsCount", cfg.death.orbs_count)?;
    cfg.death.min_respawn_mass = death.f32_or("minRespawnMass", cfg.death.min_respawn_mass)?;

    let orbs = root.child("orbs")?;
    cfg.orbs.initial_count = orbs.usize_or("initialCount", cfg.orbs.initial_count)?;
    cfg.orbs.max_count = orbs.usize_or("maxCount", cfg.orbs.max_count)?;
    cfg.orbs.respawn_interval_sec =
        orbs.f32_or("respawnIntervalSec", cfg.orbs.respawn_interval_sec)?;
    cfg.orbs.min_mass = orbs.f32_or("minMass", cfg.orbs.min_mass)?;
    cfg.orbs.min_radius = orbs.f32_or("minRadius", cfg.orbs.min_radius)?;
    cfg.orbs.push_force = orbs.f32_or("pushForce", cfg.orbs.push_force)?;
    cfg.orbs.bite_min_mass = orbs.f32_or("orbBiteMinMass", cfg.orbs.bite_min_mass)?;
    cfg.orbs.bite_max_mass = orbs.f32_or("orbBiteMaxMass", cfg.orbs.bite_max_mass)?;
    {
        let (types, path) = orbs.leaf("types");
        match types {
            None => {}
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let node = Node {
                        value: if item.is_object() { Some(item) } else { None },
                        path: format!("{}[{}]", path, i),
                    };
                    if !item.is_object() {
                        return Err(BalanceConfigError::InvalidObject(node.path));
                    }
                    let mass_range = node.f32_array_or("massRange", &[5.0, 15.0])?;
                    let mass_range = match mass_range.as_slice() {
                        [lo, hi] => [*lo, *hi],
                        _ => {
                            return Err(BalanceConfigError::InvalidArray(node.join("massRange")))
                        }
                    };
                    out.push(OrbTypeConfig {
                        id: node.string_or("id", "orb")?,
                        weight: node.f32_or("weight", 1.0)?,
                        density: node.f32_or("density", 1.0)?,
                        mass_range,
                    });
                }
                cfg.orbs.types = out;
            }
            Some(_) => return Err(BalanceConfigError::InvalidArray(path)),
        }
    }

    let formulas = root.child("formulas")?;
    for (key, slot) in [
        ("hp", &mut cfg.formulas.hp),
        ("damage", &mut cfg.formulas.damage),
        ("speed", &mut cfg.formulas.speed),
        ("radius", &mut cfg.formulas.radius),
    ] {
        let node = formulas.child(key)?;
        slot.base = node.f32_or("base", slot.base)?;
        slot.scale = node.f32_or("scale", slot.scale)?;
        slot.divisor = node.f32_or("divisor", slot.divisor)?;
    }

    let classes = root.child("classes")?;
    for (key, slot) in [
        ("base", &mut cfg.classes.base),
        ("hunter", &mut cfg.classes.hunter),
        ("warrior", &mut cfg.classes.warrior),
        ("collector", &mut cfg.classes.collector),
    ] {
        let node = classes.child(key)?;
        slot.speed_mult = node.f32_or("speedMult", slot.speed_mult)?;
        slot.hp_mult = node.f32_or("hpMult", slot.hp_mult)?;
        slot.damage_mult = node.f32_or("damageMult", slot.damage_mult)?;
        slot.radius_mult = node.f32_or("radiusMult", slot.radius_mult)?;
        slot.eating_power_mult = node.f32_or("eatingPowerMult", slot.eating_power_mult)?;
        slot.swallow_limit = node.f32_or("swallowLimit", slot.swallow_limit)?;
        slot.bite_fraction = node.f32_or("biteFraction", slot.bite_fraction)?;
        slot.bite_resist_pct = node.f32_or("biteResistPct", slot.bite_resist_pct)?;
    }

    let chests = root.child("chests")?;
    cfg.chests.max_count = chests.usize_or("maxCount", cfg.chests.max_count)?;
    cfg.chests.spawn_interval_sec =
        chests.f32_or("spawnIntervalSec", cfg.chests.spawn_interval_sec)?;
    cfg.chests.mass = chests.f32_or("mass", cfg.chests.mass)?;
    cfg.chests.radius = chests.f32_or("radius", cfg.chests.radius)?;
    cfg.chests.armor_rings = chests.u32_or("armorRings", cfg.chests.armor_rings)?;
    let rewards = chests.child("rewards")?;
    cfg.chests.reward_mass_percent =
        rewards.f32_array_or("massPercent", &cfg.chests.reward_mass_percent)?;
    cfg.chests.reward_talent_chance =
        rewards.f32_or("talentChance", cfg.chests.reward_talent_chance)?;

    let hot_zones = root.child("hotZones")?;
    cfg.hot_zones.chaos_count = hot_zones.usize_or("chaosCount", cfg.hot_zones.chaos_count)?;
    cfg.hot_zones.final_count = hot_zones.usize_or("finalCount", cfg.hot_zones.final_count)?;
    cfg.hot_zones.radius = hot_zones.f32_or("radius", cfg.hot_zones.radius)?;
    cfg.hot_zones.spawn_multiplier_chaos =
        hot_zones.f32_or("spawnMultiplierChaos", cfg.hot_zones.spawn_multiplier_chaos)?;
    cfg.hot_zones.spawn_multiplier_final =
        hot_zones.f32_or("spawnMultiplierFinal", cfg.hot_zones.spawn_multiplier_final)?;

    let hunger = root.child("hunger")?;
    cfg.hunger.base_drain_per_sec =
        hunger.f32_or("baseDrainPerSec", cfg.hunger.base_drain_per_sec)?;
    cfg.hunger.scaling_per_mass = hunger.f32_or("scalingPerMass", cfg.hunger.scaling_per_mass)?;
    cfg.hunger.max_drain_per_sec =
        hunger.f32_or("maxDrainPerSec", cfg.hunger.max_drain_per_sec)?;
    cfg.hunger.min_mass = hunger.f32_or("minMass", cfg.hunger.min_mass)?;

    let rebel = root.child("rebel")?;
    cfg.rebel.update_interval_sec =
        rebel.f32_or("updateIntervalSec", cfg.rebel.update_interval_sec)?;
    cfg.rebel.mass_threshold_multiplier =
        rebel.f32_or("massThresholdMultiplier", cfg.rebel.mass_threshold_multiplier)?;

    let obstacles = root.child("obstacles")?;
    cfg.obstacles.count_by_map_size =
        obstacles.map_size_table_or("countByMapSize", cfg.obstacles.count_by_map_size)?;
    cfg.obstacles.passage_count_by_map_size = obstacles.map_size_table_or(
        "passageCountByMapSize",
        cfg.obstacles.passage_count_by_map_size,
    )?;
    cfg.obstacles.spacing = obstacles.f32_or("spacing", cfg.obstacles.spacing)?;
    cfg.obstacles.placement_retries =
        obstacles.u32_or("placementRetries", cfg.obstacles.placement_retries)?;
    cfg.obstacles.pillar_radius = obstacles.f32_or("pillarRadius", cfg.obstacles.pillar_radius)?;
    cfg.obstacles.spike_radius = obstacles.f32_or("spikeRadius", cfg.obstacles.spike_radius)?;
    cfg.obstacles.spike_chance = obstacles.f32_or("spikeChance", cfg.obstacles.spike_chance)?;
    cfg.obstacles.spike_damage_pct =
        obstacles.f32_or("spikeDamagePct", cfg.obstacles.spike_damage_pct)?;
    cfg.obstacles.passage_pillar_radius =
        obstacles.f32_or("passagePillarRadius", cfg.obstacles.passage_pillar_radius)?;
    cfg.obstacles.passage_gap_width =
        obstacles.f32_or("passageGapWidth", cfg.obstacles.passage_gap_width)?;

    let safe_zones = root.child("safeZones")?;
    cfg.safe_zones.count_by_map_size =
        safe_zones.map_size_table_or("countByMapSize", cfg.safe_zones.count_by_map_size)?;
    cfg.safe_zones.radius_by_map_size =
        safe_zones.map_size_table_or("radiusByMapSize", cfg.safe_zones.radius_by_map_size)?;
    cfg.safe_zones.min_distance = safe_zones.f32_or("minDistance", cfg.safe_zones.min_distance)?;
    cfg.safe_zones.placement_retries =
        safe_zones.u32_or("placementRetries", cfg.safe_zones.placement_retries)?;
    cfg.safe_zones.damage_pct_per_sec =
        safe_zones.f32_or("damagePctPerSec", cfg.safe_zones.damage_pct_per_sec)?;

    let zones = root.child("zones")?;
    cfg.zones.count_by_map_size =
        zones.map_size_table_or("countByMapSize", cfg.zones.count_by_map_size)?;
    cfg.zones.radius_by_map_size =
        zones.map_size_table_or("radiusByMapSize", cfg.zones.radius_by_map_size)?;
    cfg.zones.min_distance = zones.f32_or("minDistance", cfg.zones.min_distance)?;
    cfg.zones.placement_retries =
        zones.u32_or("placementRetries", cfg.zones.placement_retries)?;
    cfg.zones.lava_min_distance_from_spawn = zones.f32_or(
        "lavaMinDistanceFromSpawn",
        cfg.zones.lava_min_distance_from_spawn,
    )?;
    let weights = zones.child("typeWeights")?;
    cfg.zones.type_weights.nectar = weights.f32_or("nectar", cfg.zones.type_weights.nectar)?;
    cfg.zones.type_weights.ice = weights.f32_or("ice", cfg.zones.type_weights.ice)?;
    cfg.zones.type_weights.slime = weights.f32_or("slime", cfg.zones.type_weights.slime)?;
    cfg.zones.type_weights.lava = weights.f32_or("lava", cfg.zones.type_weights.lava)?;
    cfg.zones.type_weights.turbo = weights.f32_or("turbo", cfg.zones.type_weights.turbo)?;
    let nectar = zones.child("nectar")?;
    cfg.zones.nectar_mass_gain_pct_per_sec =
        nectar.f32_or("massGainPctPerSec", cfg.zones.nectar_mass_gain_pct_per_sec)?;
    let lava = zones.child("lava")?;
    cfg.zones.lava_damage_pct_per_sec =
        lava.f32_or("damagePctPerSec", cfg.zones.lava_damage_pct_per_sec)?;
    cfg.zones.lava_scatter_pct = lava.f32_or("scatterPct", cfg.zones.lava_scatter_pct)?;
    let ice = zones.child("ice")?;
    cfg.zones.ice_speed_mult = ice.f32_or("speedMult", cfg.zones.ice_speed_mult)?;
    let turbo = zones.child("turbo")?;
    cfg.zones.turbo_speed_mult = turbo.f32_or("speedMult", cfg.zones.turbo_speed_mult)?;

    let abilities = root.child("abilities")?;
    let dash = abilities.child("dash")?;
    cfg.abilities.dash.duration_sec =
        dash.f32_or("durationSec", cfg.abilities.dash.duration_sec)?;
    cfg.abilities.dash.speed_mult = dash.f32_or("speedMult", cfg.abilities.dash.speed_mult)?;
    cfg.abilities.dash.cooldown_sec =
        dash.f32_or("cooldownSec", cfg.abilities.dash.cooldown_sec)?;
    cfg.abilities.dash.cost_pct = dash.f32_or("costPct", cfg.abilities.dash.cost_pct)?;
    let shield = abilities.child("shield")?;
    cfg.abilities.shield.duration_sec =
        shield.f32_or("durationSec", cfg.abilities.shield.duration_sec)?;
    cfg.abilities.shield.reflect_damage_pct =
        shield.f32_or("reflectDamagePct", cfg.abilities.shield.reflect_damage_pct)?;
    cfg.abilities.shield.cooldown_sec =
        shield.f32_or("cooldownSec", cfg.abilities.shield.cooldown_sec)?;
    cfg.abilities.shield.cost_pct = shield.f32_or("costPct", cfg.abilities.shield.cost_pct)?;
    let magnet = abilities.child("magnet")?;
    cfg.abilities.magnet.duration_sec =
        magnet.f32_or("durationSec", cfg.abilities.magnet.duration_sec)?;
    cfg.abilities.magnet.radius = magnet.f32_or("radius", cfg.abilities.magnet.radius)?;
    cfg.abilities.magnet.pull_speed =
        magnet.f32_or("pullSpeed", cfg.abilities.magnet.pull_speed)?;
    cfg.abilities.magnet.cooldown_sec =
        magnet.f32_or("cooldownSec", cfg.abilities.magnet.cooldown_sec)?;
    cfg.abilities.magnet.cost_pct = magnet.f32_or("costPct", cfg.abilities.magnet.cost_pct)?;
    let projectile = abilities.child("projectile")?;
    cfg.abilities.projectile.speed =
        projectile.f32_or("speed", cfg.abilities.projectile.speed)?;
    cfg.abilities.projectile.damage_pct =
        projectile.f32_or("damagePct", cfg.abilities.projectile.damage_pct)?;
    cfg.abilities.projectile.radius =
        projectile.f32_or("radius", cfg.abilities.projectile.radius)?;
    cfg.abilities.projectile.max_range =
        projectile.f32_or("maxRange", cfg.abilities.projectile.max_range)?;
    cfg.abilities.projectile.cooldown_sec =
        projectile.f32_or("cooldownSec", cfg.abilities.projectile.cooldown_sec)?;
    cfg.abilities.projectile.cost_pct =
        projectile.f32_or("costPct", cfg.abilities.projectile.cost_pct)?;
    let bomb = abilities.child("bomb")?;
    cfg.abilities.bomb.speed = bomb.f32_or("speed", cfg.abilities.bomb.speed)?;
    cfg.abilities.bomb.damage_pct = bomb.f32_or("damagePct", cfg.abilities.bomb.damage_pct)?;
    cfg.abilities.bomb.radius = bomb.f32_or("radius", cfg.abilities.bomb.radius)?;
    cfg.abilities.bomb.explosion_radius =
        bomb.f32_or("explosionRadius", cfg.abilities.bomb.explosion_radius)?;
    cfg.abilities.bomb.fuse_sec = bomb.f32_or("fuseSec", cfg.abilities.bomb.fuse_sec)?;
    cfg.abilities.bomb.cooldown_sec =
        bomb.f32_or("cooldownSec", cfg.abilities.bomb.cooldown_sec)?;
    cfg.abilities.bomb.cost_pct = bomb.f32_or("costPct", cfg.abilities.bomb.cost_pct)?;

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_resolves_to_defaults() {
        let cfg = resolve_balance_config(&json!({})).unwrap();
        let defaults = ResolvedBalanceConfig::default();
        assert_eq!(cfg.world.map_size, defaults.world.map_size);
        assert_eq!(cfg.combat.mouth_arc_deg, defaults.combat.mouth_arc_deg);
        assert_eq!(cfg.orbs.types.len(), defaults.orbs.types.len());
        assert_eq!(cfg.match_cfg.phases.len(), 5);
        assert_eq!(cfg.server.global_cooldown_ticks, 3);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let raw = json!({
            "combat": { "mouthArcDeg": 90.0 },
            "world": { "mapSize": 800.0 }
        });
        let cfg = resolve_balance_config(&raw).unwrap();
        assert_eq!(cfg.combat.mouth_arc_deg, 90.0);
        assert_eq!(cfg.world.map_size, 800.0);
        // Untouched leaves keep defaults
        assert_eq!(cfg.combat.tail_arc_deg, 120.0);
        assert_eq!(cfg.physics.min_slime_mass, 50.0);
    }

    #[test]
    fn test_malformed_number_names_the_path() {
        let raw = json!({ "combat": { "mouthArcDeg": "wide" } });
        let err = resolve_balance_config(&raw).unwrap_err();
        assert_eq!(
            err,
            BalanceConfigError::InvalidNumber("combat.mouthArcDeg".to_string())
        );
    }

    #[test]
    fn test_malformed_section_rejected() {
        let raw = json!({ "physics": 42 });
        let err = resolve_balance_config(&raw).unwrap_err();
        assert_eq!(err, BalanceConfigError::InvalidObject("physics".to_string()));
    }

    #[test]
    fn test_malformed_array_element_names_the_index() {
        let raw = json!({ "slime": { "levelThresholds": [150.0, "x"] } });
        let err = resolve_balance_config(&raw).unwrap_err();
        assert_eq!(
            err,
            BalanceConfigError::InvalidNumber("slime.levelThresholds[1]".to_string())
        );
    }

    #[test]
    fn test_non_object_root_rejected() {
        let err = resolve_balance_config(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err, BalanceConfigError::InvalidObject("<root>".to_string()));
    }

    #[test]
    fn test_gcd_ticks_derived_from_overrides() {
        let raw = json!({ "server": { "globalCooldownMs": 500.0, "tickRate": 20.0 } });
        let cfg = resolve_balance_config(&raw).unwrap();
        // 500ms at 20Hz (50ms per tick) = 10 ticks
        assert_eq!(cfg.server.global_cooldown_ticks, 10);
    }

    #[test]
    fn test_gcd_ticks_at_least_one() {
        assert_eq!(derive_global_cooldown_ticks(1.0, 30.0), 1);
        assert_eq!(derive_global_cooldown_ticks(0.0, 30.0), 1);
    }

    #[test]
    fn test_custom_phase_table() {
        let raw = json!({
            "match": {
                "durationSec": 60.0,
                "phases": [
                    { "id": "Spawn", "startSec": 0.0, "endSec": 10.0 },
                    { "id": "Final", "startSec": 10.0, "endSec": 60.0 }
                ]
            }
        });
        let cfg = resolve_balance_config(&raw).unwrap();
        assert_eq!(cfg.match_cfg.phases.len(), 2);
        assert_eq!(cfg.match_cfg.phases[1].id, MatchPhase::Final);
        assert_eq!(cfg.match_cfg.phases[1].end_sec, 60.0);
    }

    #[test]
    fn test_unknown_phase_id_rejected() {
        let raw = json!({
            "match": { "phases": [{ "id": "Growth", "startSec": 0.0, "endSec": 1.0 }] }
        });
        let err = resolve_balance_config(&raw).unwrap_err();
        assert_eq!(
            err,
            BalanceConfigError::InvalidPhase("match.phases[0].id".to_string(), "Growth".to_string())
        );
    }

    #[test]
    fn test_orb_types_replaced_wholesale() {
        let raw = json!({
            "orbs": {
                "types": [
                    { "id": "pink", "weight": 1.0, "density": 2.0, "massRange": [1.0, 2.0] }
                ]
            }
        });
        let cfg = resolve_balance_config(&raw).unwrap();
        assert_eq!(cfg.orbs.types.len(), 1);
        assert_eq!(cfg.orbs.types[0].id, "pink");
        assert_eq!(cfg.orbs.types[0].mass_range, [1.0, 2.0]);
    }

    #[test]
    fn test_world_shape_parse() {
        let cfg =
            resolve_balance_config(&json!({ "worldPhysics": { "worldShape": "circle" } })).unwrap();
        assert_eq!(cfg.world_physics.world_shape, WorldShape::Circle);

        let err = resolve_balance_config(&json!({ "worldPhysics": { "worldShape": "donut" } }))
            .unwrap_err();
        assert_eq!(
            err,
            BalanceConfigError::InvalidShape(
                "worldPhysics.worldShape".to_string(),
                "donut".to_string()
            )
        );
    }

    #[test]
    fn test_map_size_table_partial_override() {
        let raw = json!({ "obstacles": { "countByMapSize": { "large": 20 } } });
        let cfg = resolve_balance_config(&raw).unwrap();
        assert_eq!(cfg.obstacles.count_by_map_size.large, 20.0);
        assert_eq!(cfg.obstacles.count_by_map_size.small, 6.0);
    }
}
