//! Seeded arena layout generation.
//!
//! All placement randomness comes from the caller's [`Rng`], so two rooms with
//! the same seed and config produce byte-identical layouts. Candidates that
//! exhaust their retry budget are dropped: configured counts are ceilings, not
//! guarantees.

use std::f32::consts::{PI, TAU};

use tracing::warn;

use crate::balance::{map_size_key, ResolvedBalanceConfig, WorldShape};
use crate::game::constants::{obstacle_type, zone_type};
use crate::game::state::{Obstacle, SafeZone, Zone};
use crate::util::rng::Rng;
use crate::util::vec2::Vec2;

/// Extra clearance between a zone edge and the world edge
const ZONE_EDGE_MARGIN: f32 = 10.0;

/// World boundary, origin-centered
#[derive(Debug, Clone, Copy)]
pub struct WorldBounds {
    pub shape: WorldShape,
    pub half_width: f32,
    pub half_height: f32,
    pub radius: f32,
}

impl WorldBounds {
    pub fn from_config(cfg: &ResolvedBalanceConfig) -> Self {
        let map_size = cfg.world.map_size;
        Self {
            shape: cfg.world_physics.world_shape,
            half_width: cfg.world_physics.width.unwrap_or(map_size) / 2.0,
            half_height: cfg.world_physics.height.unwrap_or(map_size) / 2.0,
            radius: cfg.world_physics.radius.unwrap_or(map_size / 2.0),
        }
    }

    /// Whether a circle of `radius` at `pos` lies fully inside the world
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        match self.shape {
            WorldShape::Circle => pos.length() <= self.radius - radius,
            WorldShape::Rect => {
                pos.x.abs() <= self.half_width - radius
                    && pos.y.abs() <= self.half_height - radius
            }
        }
    }
}

/// Uniform random point keeping `margin` clearance from the world edge.
///
/// Circle sampling uses `sqrt(next())` for the radial coordinate so density
/// stays uniform by area rather than bunching at the center.
pub fn random_point_with_margin(rng: &mut Rng, bounds: &WorldBounds, margin: f32) -> Vec2 {
    match bounds.shape {
        WorldShape::Circle => {
            let angle = rng.range(0.0, TAU);
            let r = rng.next().sqrt() * (bounds.radius - margin).max(0.0);
            Vec2::from_angle(angle) * r
        }
        WorldShape::Rect => {
            let x_max = (bounds.half_width - margin).max(0.0);
            let y_max = (bounds.half_height - margin).max(0.0);
            Vec2::new(rng.range(-x_max, x_max), rng.range(-y_max, y_max))
        }
    }
}

fn can_place_obstacle(
    pos: Vec2,
    radius: f32,
    bounds: &WorldBounds,
    spacing: f32,
    placed: &[Obstacle],
) -> bool {
    if !bounds.contains(pos, radius) {
        return false;
    }
    placed
        .iter()
        .all(|o| pos.distance_to(o.position) >= radius + o.radius + spacing)
}

/// Pillar and spike placement. Passages (pillar pairs forming a gap) go first,
/// then the remaining budget is filled with single obstacles.
pub fn generate_obstacle_seeds(rng: &mut Rng, cfg: &ResolvedBalanceConfig) -> Vec<Obstacle> {
    let key = map_size_key(cfg.world.map_size);
    let bounds = WorldBounds::from_config(cfg);
    let oc = &cfg.obstacles;
    let total = oc.count_by_map_size.get(key).max(0.0) as usize;
    let passages = oc.passage_count_by_map_size.get(key).max(0.0) as usize;

    let mut placed: Vec<Obstacle> = Vec::with_capacity(total);

    let half_gap = oc.passage_gap_width / 2.0 + oc.passage_pillar_radius;
    for _ in 0..passages {
        if placed.len() + 2 > total {
            break;
        }
        let margin = oc.passage_pillar_radius + oc.spacing + half_gap;
        for _ in 0..oc.placement_retries {
            let center = random_point_with_margin(rng, &bounds, margin);
            let angle = rng.range(0.0, PI);
            let offset = Vec2::from_angle(angle) * half_gap;
            let a = center + offset;
            let b = center - offset;
            if can_place_obstacle(a, oc.passage_pillar_radius, &bounds, oc.spacing, &placed)
                && can_place_obstacle(b, oc.passage_pillar_radius, &bounds, oc.spacing, &placed)
            {
                placed.push(Obstacle {
                    position: a,
                    radius: oc.passage_pillar_radius,
                    kind: obstacle_type::PILLAR,
                });
                placed.push(Obstacle {
                    position: b,
                    radius: oc.passage_pillar_radius,
                    kind: obstacle_type::PILLAR,
                });
                break;
            }
        }
    }

    let singles = total.saturating_sub(placed.len());
    for _ in 0..singles {
        let is_spike = rng.next() < oc.spike_chance;
        let (radius, kind) = if is_spike {
            (oc.spike_radius, obstacle_type::SPIKES)
        } else {
            (oc.pillar_radius, obstacle_type::PILLAR)
        };
        for _ in 0..oc.placement_retries {
            let pos = random_point_with_margin(rng, &bounds, radius + oc.spacing);
            if can_place_obstacle(pos, radius, &bounds, oc.spacing, &placed) {
                placed.push(Obstacle {
                    position: pos,
                    radius,
                    kind,
                });
                break;
            }
        }
    }

    placed
}

/// Safe zone placement. Zones keep a center-to-center minimum distance from
/// each other.
pub fn generate_safe_zone_seeds(rng: &mut Rng, cfg: &ResolvedBalanceConfig) -> Vec<SafeZone> {
    let key = map_size_key(cfg.world.map_size);
    let bounds = WorldBounds::from_config(cfg);
    let sc = &cfg.safe_zones;
    let count = sc.count_by_map_size.get(key).max(0.0) as usize;
    let radius = sc.radius_by_map_size.get(key);

    let mut placed: Vec<SafeZone> = Vec::with_capacity(count);
    for _ in 0..count {
        for _ in 0..sc.placement_retries {
            let pos = random_point_with_margin(rng, &bounds, radius + ZONE_EDGE_MARGIN);
            let clear = placed
                .iter()
                .all(|z| pos.distance_to(z.position) >= sc.min_distance);
            if clear {
                placed.push(SafeZone { position: pos, radius });
                break;
            }
        }
    }
    placed
}

fn pick_zone_kind(rng: &mut Rng, cfg: &ResolvedBalanceConfig) -> u8 {
    let w = &cfg.zones.type_weights;
    // Fixed evaluation order keeps the roll deterministic
    let entries = [
        (zone_type::NECTAR, w.nectar),
        (zone_type::ICE, w.ice),
        (zone_type::SLIME, w.slime),
        (zone_type::LAVA, w.lava),
        (zone_type::TURBO, w.turbo),
    ];
    let total: f32 = entries.iter().map(|(_, w)| w.max(0.0)).sum();
    if total <= 0.0 {
        return zone_type::NECTAR;
    }
    let mut roll = rng.range(0.0, total);
    for (kind, weight) in entries {
        let weight = weight.max(0.0);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    zone_type::TURBO
}

/// Hazard/feature zone placement. Zones avoid safe zones, each other, and for
/// lava additionally the spawn area around the origin.
pub fn generate_zone_seeds(
    rng: &mut Rng,
    cfg: &ResolvedBalanceConfig,
    safe_zones: &[SafeZone],
) -> Vec<Zone> {
    let key = map_size_key(cfg.world.map_size);
    let bounds = WorldBounds::from_config(cfg);
    let zc = &cfg.zones;
    let count = zc.count_by_map_size.get(key).max(0.0) as usize;
    let radius = zc.radius_by_map_size.get(key);

    let mut placed: Vec<Zone> = Vec::with_capacity(count);
    let mut dropped = 0usize;

    for _ in 0..count {
        let kind = pick_zone_kind(rng, cfg);
        let mut ok = false;
        for _ in 0..zc.placement_retries {
            let pos = random_point_with_margin(rng, &bounds, radius + ZONE_EDGE_MARGIN);

            let clear_of_safe = safe_zones
                .iter()
                .all(|s| pos.distance_to(s.position) >= s.radius + radius + zc.min_distance);
            if !clear_of_safe {
                continue;
            }
            if kind == zone_type::LAVA
                && pos.length() < zc.lava_min_distance_from_spawn + radius
            {
                continue;
            }
            let clear_of_zones = placed
                .iter()
                .all(|z| pos.distance_to(z.position) >= z.radius + radius + zc.min_distance);
            if !clear_of_zones {
                continue;
            }

            placed.push(Zone {
                position: pos,
                radius,
                kind,
            });
            ok = true;
            break;
        }
        if !ok {
            dropped += 1;
        }
    }

    if dropped > 0 {
        warn!(dropped, requested = count, "zone placement retries exhausted");
    }
    placed
}

/// Full layout for a fresh match, in fixed generation order
pub fn generate_arena(
    rng: &mut Rng,
    cfg: &ResolvedBalanceConfig,
) -> (Vec<Obstacle>, Vec<SafeZone>, Vec<Zone>) {
    let obstacles = generate_obstacle_seeds(rng, cfg);
    let safe_zones = generate_safe_zone_seeds(rng, cfg);
    let zones = generate_zone_seeds(rng, cfg, &safe_zones);
    (obstacles, safe_zones, zones)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ResolvedBalanceConfig {
        ResolvedBalanceConfig::default()
    }

    #[test]
    fn test_obstacle_generation_is_deterministic() {
        let cfg = cfg();
        let a = generate_obstacle_seeds(&mut Rng::new(12345), &cfg);
        let b = generate_obstacle_seeds(&mut Rng::new(12345), &cfg);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_full_arena_is_deterministic() {
        let cfg = cfg();
        let a = generate_arena(&mut Rng::new(777), &cfg);
        let b = generate_arena(&mut Rng::new(777), &cfg);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_different_seeds_differ() {
        let cfg = cfg();
        let a = generate_obstacle_seeds(&mut Rng::new(1), &cfg);
        let b = generate_obstacle_seeds(&mut Rng::new(2), &cfg);
        assert_ne!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_obstacles_inside_world_and_spaced() {
        let cfg = cfg();
        let bounds = WorldBounds::from_config(&cfg);
        let obstacles = generate_obstacle_seeds(&mut Rng::new(42), &cfg);
        assert!(!obstacles.is_empty());
        let key = map_size_key(cfg.world.map_size);
        assert!(obstacles.len() <= cfg.obstacles.count_by_map_size.get(key) as usize);

        for o in &obstacles {
            assert!(bounds.contains(o.position, o.radius), "outside: {:?}", o);
        }
        for (i, a) in obstacles.iter().enumerate() {
            for b in obstacles.iter().skip(i + 1) {
                let dist = a.position.distance_to(b.position);
                // Passage pillar pairs are intentionally closer than spacing
                let gap = cfg.obstacles.passage_gap_width + 2.0 * cfg.obstacles.passage_pillar_radius;
                assert!(
                    dist >= a.radius + b.radius + cfg.obstacles.spacing - 1e-3
                        || (dist - gap).abs() < 1e-2,
                    "overlap: {} vs {}+{}+{}",
                    dist,
                    a.radius,
                    b.radius,
                    cfg.obstacles.spacing
                );
            }
        }
    }

    #[test]
    fn test_passages_come_in_pairs() {
        let cfg = cfg();
        let obstacles = generate_obstacle_seeds(&mut Rng::new(9), &cfg);
        let gap = cfg.obstacles.passage_gap_width + 2.0 * cfg.obstacles.passage_pillar_radius;
        let paired = obstacles
            .iter()
            .filter(|o| o.radius == cfg.obstacles.passage_pillar_radius)
            .count();
        // Every passage pillar has exactly one partner at the gap distance
        for o in obstacles
            .iter()
            .filter(|o| o.radius == cfg.obstacles.passage_pillar_radius)
        {
            let partners = obstacles
                .iter()
                .filter(|p| (p.position.distance_to(o.position) - gap).abs() < 1e-2)
                .count();
            assert!(partners >= 1);
        }
        assert_eq!(paired % 2, 0);
    }

    #[test]
    fn test_zones_respect_constraints() {
        let cfg = cfg();
        let bounds = WorldBounds::from_config(&cfg);
        let mut rng = Rng::new(2024);
        let safe_zones = generate_safe_zone_seeds(&mut rng, &cfg);
        let zones = generate_zone_seeds(&mut rng, &cfg, &safe_zones);

        let key = map_size_key(cfg.world.map_size);
        assert!(zones.len() <= cfg.zones.count_by_map_size.get(key) as usize);

        for z in &zones {
            assert!(bounds.contains(z.position, z.radius));
            for s in &safe_zones {
                assert!(
                    z.position.distance_to(s.position)
                        >= s.radius + z.radius + cfg.zones.min_distance - 1e-3
                );
            }
            if z.kind == zone_type::LAVA {
                assert!(
                    z.position.length() >= cfg.zones.lava_min_distance_from_spawn + z.radius - 1e-3
                );
            }
        }
        for (i, a) in zones.iter().enumerate() {
            for b in zones.iter().skip(i + 1) {
                assert!(
                    a.position.distance_to(b.position)
                        >= a.radius + b.radius + cfg.zones.min_distance - 1e-3
                );
            }
        }
    }

    #[test]
    fn test_safe_zones_spread_apart() {
        let cfg = cfg();
        let safe_zones = generate_safe_zone_seeds(&mut Rng::new(5), &cfg);
        let key = map_size_key(cfg.world.map_size);
        assert!(safe_zones.len() <= cfg.safe_zones.count_by_map_size.get(key) as usize);
        for (i, a) in safe_zones.iter().enumerate() {
            for b in safe_zones.iter().skip(i + 1) {
                assert!(a.position.distance_to(b.position) >= cfg.safe_zones.min_distance - 1e-3);
            }
        }
    }

    #[test]
    fn test_small_map_uses_small_bucket() {
        let mut cfg = cfg();
        cfg.world.map_size = 800.0;
        let obstacles = generate_obstacle_seeds(&mut Rng::new(3), &cfg);
        assert!(obstacles.len() <= cfg.obstacles.count_by_map_size.small as usize);
    }

    #[test]
    fn test_circle_world_sampling_stays_inside() {
        let mut cfg = cfg();
        cfg.world_physics.world_shape = WorldShape::Circle;
        let bounds = WorldBounds::from_config(&cfg);
        let mut rng = Rng::new(11);
        for _ in 0..1000 {
            let p = random_point_with_margin(&mut rng, &bounds, 50.0);
            assert!(p.length() <= bounds.radius - 50.0 + 1e-3);
        }
    }
}
