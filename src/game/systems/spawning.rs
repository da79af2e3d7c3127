//! Periodic spawners and orb/chest placement.

use std::f32::consts::TAU;

use crate::balance::ResolvedBalanceConfig;
use crate::game::arena::{random_point_with_margin, WorldBounds};
use crate::game::state::{Chest, GameState, HotZone, Orb, ORB_TYPE_SCATTER};
use crate::game::systems::SimContext;
use crate::util::rng::Rng;
use crate::util::vec2::Vec2;

/// Spawn an orb without consulting the orb-count cap. Used for scatter mass,
/// which must always land in the world.
pub fn force_spawn_orb(state: &mut GameState, position: Vec2, velocity: Vec2, mass: f32) {
    let id = state.alloc_entity_id();
    state.orbs.insert(
        id,
        Orb {
            id,
            position,
            velocity,
            mass,
            density: 1.0,
            type_index: ORB_TYPE_SCATTER,
        },
    );
}

/// Scatter `total_mass` into a ring of orbs around `position`.
///
/// Spawns fewer, larger orbs when the per-orb share would fall below the
/// minimum viable scatter mass; skips entirely (mass is lost) when even one
/// orb cannot reach it. Returns the mass actually spawned.
pub fn spawn_scatter_orbs(
    ctx: &mut impl SimContext,
    position: Vec2,
    total_mass: f32,
    requested_count: u32,
    speed: f32,
) -> f32 {
    let min_orb = ctx.balance().combat.scatter_orb_min_mass;
    if total_mass < min_orb || requested_count == 0 {
        return 0.0;
    }

    let mut count = requested_count;
    if total_mass / (count as f32) < min_orb {
        count = (total_mass / min_orb).floor() as u32;
    }
    if count == 0 {
        return 0.0;
    }

    let per_orb = total_mass / count as f32;
    let angle_step = TAU / count as f32;
    for i in 0..count {
        let angle = i as f32 * angle_step + ctx.rng().range(-0.3, 0.3);
        let velocity = Vec2::from_angle(angle) * speed;
        ctx.force_spawn_orb(position, velocity, per_orb);
    }
    total_mass
}

fn pick_orb_type(rng: &mut Rng, cfg: &ResolvedBalanceConfig) -> usize {
    let total: f32 = cfg.orbs.types.iter().map(|t| t.weight.max(0.0)).sum();
    if total <= 0.0 {
        return 0;
    }
    let mut roll = rng.range(0.0, total);
    for (i, t) in cfg.orbs.types.iter().enumerate() {
        let w = t.weight.max(0.0);
        if roll < w {
            return i;
        }
        roll -= w;
    }
    cfg.orbs.types.len() - 1
}

/// Spawn one orb of a weighted-random type at a random position.
/// Respects nothing; callers enforce the cap.
fn spawn_typed_orb(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng, at: Option<(Vec2, f32)>) {
    if cfg.orbs.types.is_empty() {
        return;
    }
    let type_index = pick_orb_type(rng, cfg);
    let t = &cfg.orbs.types[type_index];
    let mass = rng.range(t.mass_range[0], t.mass_range[1]);

    let bounds = WorldBounds::from_config(cfg);
    let position = match at {
        // Inside a disc (hot zone spawns)
        Some((center, radius)) => {
            let angle = rng.range(0.0, TAU);
            let r = rng.next().sqrt() * radius;
            center + Vec2::from_angle(angle) * r
        }
        None => random_point_with_margin(rng, &bounds, cfg.orbs.min_radius),
    };

    let id = state.alloc_entity_id();
    state.orbs.insert(
        id,
        Orb {
            id,
            position,
            velocity: Vec2::ZERO,
            mass,
            density: t.density,
            type_index: type_index as u8,
        },
    );
}

/// Fill the arena with the initial orb population at match start
pub fn spawn_initial_orbs(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    for _ in 0..cfg.orbs.initial_count {
        spawn_typed_orb(state, cfg, rng, None);
    }
}

/// Periodic spawners: orbs at the respawn interval (boosted inside hot
/// zones), chests at their own interval.
pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let orb_interval = cfg.seconds_to_ticks(cfg.orbs.respawn_interval_sec).max(1);
    let elapsed = state.tick.saturating_sub(state.match_start_tick);

    if elapsed % orb_interval == 0 && state.orbs.len() < cfg.orbs.max_count {
        spawn_typed_orb(state, cfg, rng, None);

        // Hot zones multiply spawn density within their radius
        let hot_zones: Vec<(Vec2, f32, f32)> = state
            .hot_zones
            .values()
            .map(|hz| (hz.position, hz.radius, hz.spawn_multiplier))
            .collect();
        for (center, radius, multiplier) in hot_zones {
            let extra = multiplier.max(1.0) as usize - 1;
            for _ in 0..extra {
                if state.orbs.len() >= cfg.orbs.max_count {
                    break;
                }
                spawn_typed_orb(state, cfg, rng, Some((center, radius)));
            }
        }
    }

    let chest_interval = cfg.seconds_to_ticks(cfg.chests.spawn_interval_sec).max(1);
    if elapsed % chest_interval == 0 && elapsed > 0 && state.chests.len() < cfg.chests.max_count {
        spawn_chest(state, cfg, rng);
    }
}

fn spawn_chest(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let bounds = WorldBounds::from_config(cfg);
    let margin = cfg.chests.radius + cfg.obstacles.spacing;
    for _ in 0..cfg.obstacles.placement_retries {
        let position = random_point_with_margin(rng, &bounds, margin);
        let clear = state
            .obstacles
            .iter()
            .all(|o| position.distance_to(o.position) >= o.radius + cfg.chests.radius);
        if clear {
            let id = state.alloc_entity_id();
            state.chests.insert(
                id,
                Chest {
                    id,
                    position,
                    remaining_mass: cfg.chests.mass,
                    armor_rings: cfg.chests.armor_rings,
                    radius: cfg.chests.radius,
                },
            );
            return;
        }
    }
}

/// Place hot zones for a late match phase, replacing any existing set.
/// With `center_first` the first zone sits at the arena center, pulling the
/// endgame inward.
pub fn spawn_hot_zones(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    count: usize,
    spawn_multiplier: f32,
    center_first: bool,
) {
    state.hot_zones.clear();
    let bounds = WorldBounds::from_config(cfg);
    for i in 0..count {
        let position = if center_first && i == 0 {
            Vec2::ZERO
        } else {
            random_point_with_margin(rng, &bounds, cfg.hot_zones.radius)
        };
        let id = state.alloc_entity_id();
        state.hot_zones.insert(
            id,
            HotZone {
                id,
                position,
                radius: cfg.hot_zones.radius,
                spawn_multiplier,
            },
        );
    }
}

/// Random spawn position for a player, keeping clear of obstacles.
/// Falls back to the last candidate when retries run out.
pub fn find_spawn_point(
    state: &GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    player_radius: f32,
) -> Vec2 {
    let bounds = WorldBounds::from_config(cfg);
    let margin = player_radius + cfg.obstacles.spacing;
    let mut candidate = Vec2::ZERO;
    for _ in 0..cfg.obstacles.placement_retries {
        candidate = random_point_with_margin(rng, &bounds, margin);
        let clear = state.obstacles.iter().all(|o| {
            candidate.distance_to(o.position) >= o.radius + player_radius + cfg.obstacles.spacing
        });
        if clear {
            return candidate;
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::RoomContext;

    fn setup() -> (GameState, ResolvedBalanceConfig, Rng) {
        (GameState::new(), ResolvedBalanceConfig::default(), Rng::new(99))
    }

    #[test]
    fn test_scatter_spawns_requested_count() {
        let (mut state, cfg, mut rng) = setup();
        let mut ctx = RoomContext {
            state: &mut state,
            cfg: &cfg,
            rng: &mut rng,
        };
        let spawned = spawn_scatter_orbs(&mut ctx, Vec2::ZERO, 30.0, 3, 150.0);
        assert_eq!(spawned, 30.0);
        assert_eq!(state.orbs.len(), 3);
        let total: f32 = state.orbs.values().map(|o| o.mass).sum();
        assert!((total - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_scatter_merges_below_min_per_orb() {
        let (mut state, cfg, mut rng) = setup();
        let mut ctx = RoomContext {
            state: &mut state,
            cfg: &cfg,
            rng: &mut rng,
        };
        // 12 mass over 4 orbs would be 3 each, below the minimum of 5
        let spawned = spawn_scatter_orbs(&mut ctx, Vec2::ZERO, 12.0, 4, 150.0);
        assert_eq!(spawned, 12.0);
        assert_eq!(state.orbs.len(), 2);
    }

    #[test]
    fn test_scatter_skips_below_min_total() {
        let (mut state, cfg, mut rng) = setup();
        let mut ctx = RoomContext {
            state: &mut state,
            cfg: &cfg,
            rng: &mut rng,
        };
        let spawned = spawn_scatter_orbs(&mut ctx, Vec2::ZERO, 4.0, 3, 150.0);
        assert_eq!(spawned, 0.0);
        assert!(state.orbs.is_empty());
    }

    #[test]
    fn test_initial_orbs_count_and_bounds() {
        let (mut state, cfg, mut rng) = setup();
        spawn_initial_orbs(&mut state, &cfg, &mut rng);
        assert_eq!(state.orbs.len(), cfg.orbs.initial_count);
        let bounds = WorldBounds::from_config(&cfg);
        for orb in state.orbs.values() {
            assert!(bounds.contains(orb.position, 0.0));
            assert!(orb.mass > 0.0);
            assert!((orb.type_index as usize) < cfg.orbs.types.len());
        }
    }

    #[test]
    fn test_periodic_spawn_respects_cap() {
        let (mut state, cfg, mut rng) = setup();
        for _ in 0..cfg.orbs.max_count {
            force_spawn_orb(&mut state, Vec2::ZERO, Vec2::ZERO, 5.0);
        }
        update(&mut state, &cfg, &mut rng);
        assert_eq!(state.orbs.len(), cfg.orbs.max_count);
    }

    #[test]
    fn test_chest_spawn_after_interval() {
        let (mut state, cfg, mut rng) = setup();
        state.tick = cfg.seconds_to_ticks(cfg.chests.spawn_interval_sec);
        update(&mut state, &cfg, &mut rng);
        assert_eq!(state.chests.len(), 1);
        let chest = state.chests.values().next().unwrap();
        assert_eq!(chest.remaining_mass, cfg.chests.mass);
        assert_eq!(chest.armor_rings, cfg.chests.armor_rings);
    }

    #[test]
    fn test_hot_zones_replace_previous_set() {
        let (mut state, cfg, mut rng) = setup();
        spawn_hot_zones(&mut state, &cfg, &mut rng, 2, 3.0, false);
        assert_eq!(state.hot_zones.len(), 2);
        spawn_hot_zones(&mut state, &cfg, &mut rng, 1, 5.0, false);
        assert_eq!(state.hot_zones.len(), 1);
        assert_eq!(
            state.hot_zones.values().next().unwrap().spawn_multiplier,
            5.0
        );
    }

    #[test]
    fn test_center_first_hot_zone_sits_at_origin() {
        let (mut state, cfg, mut rng) = setup();
        spawn_hot_zones(&mut state, &cfg, &mut rng, 1, 5.0, true);
        let hz = state.hot_zones.values().next().unwrap();
        assert_eq!(hz.position, Vec2::ZERO);
    }

    #[test]
    fn test_spawn_point_clears_obstacles() {
        let (mut state, cfg, mut rng) = setup();
        state.obstacles.push(crate::game::state::Obstacle {
            position: Vec2::ZERO,
            radius: 35.0,
            kind: crate::game::constants::obstacle_type::PILLAR,
        });
        for _ in 0..20 {
            let p = find_spawn_point(&state, &cfg, &mut rng, 15.0);
            // Retries may theoretically fall back, but with one obstacle on a
            // large map every draw should clear it
            assert!(p.distance_to(Vec2::ZERO) >= 35.0 + 15.0);
        }
    }
}
