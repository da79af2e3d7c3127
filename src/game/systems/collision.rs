//! Contact resolution: player-obstacle pushout, player-player separation and
//! the bites that contact triggers.
//!
//! Pairs resolve in sorted key order. Room populations are small (tens of
//! players), so the O(n²) sweep costs less than maintaining a broad phase.

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::obstacle_type;
use crate::game::state::{GameState, Player, PlayerId};
use crate::game::systems::{combat, RoomContext};
use crate::util::rng::Rng;
use crate::util::vec2::Vec2;

pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    resolve_obstacles(state, cfg, rng);
    resolve_player_pairs(state, cfg, rng);
}

fn resolve_obstacles(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        let Some(mut player) = state.players.remove(id) else {
            continue;
        };
        if player.is_dead() {
            state.players.insert(id.clone(), player);
            continue;
        }

        let r = player.radius(cfg);
        let mut spiked = false;
        for obstacle in &state.obstacles {
            let to_player = player.position - obstacle.position;
            let dist = to_player.length();
            let min_dist = obstacle.radius + r;
            if dist >= min_dist {
                continue;
            }
            let normal = if dist > 0.0 {
                to_player * (1.0 / dist)
            } else {
                Vec2::new(1.0, 0.0)
            };
            player.position = obstacle.position + normal * min_dist;
            let vn = player.velocity.dot(normal);
            if vn < 0.0 {
                player.velocity -= normal * (vn * (1.0 + cfg.physics.collision_restitution));
            }
            if obstacle.kind == obstacle_type::SPIKES {
                spiked = true;
            }
        }

        if spiked {
            let mut ctx = RoomContext {
                state,
                cfg,
                rng,
            };
            combat::apply_direct_damage(
                &mut ctx,
                &mut player,
                cfg.obstacles.spike_damage_pct,
                None,
                0.5,
            );
        }
        state.players.insert(id.clone(), player);
    }
}

fn resolve_player_pairs(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let Some(mut a) = state.players.remove(&ids[i]) else {
                continue;
            };
            let Some(mut b) = state.players.remove(&ids[j]) else {
                state.players.insert(ids[i].clone(), a);
                continue;
            };

            if !a.is_dead() && !b.is_dead() {
                let delta = b.position - a.position;
                let dist = delta.length();
                let min_dist = a.radius(cfg) + b.radius(cfg);
                if dist < min_dist {
                    separate(&mut a, &mut b, cfg, delta, dist, min_dist);
                    let mut ctx = RoomContext {
                        state,
                        cfg,
                        rng,
                    };
                    combat::resolve_bite(&mut ctx, &mut a, &mut b);
                    combat::resolve_bite(&mut ctx, &mut b, &mut a);
                }
            }

            state.players.insert(ids[i].clone(), a);
            state.players.insert(ids[j].clone(), b);
        }
    }
}

/// Positional correction split by inverse mass share, plus an elastic impulse
/// when the pair is closing. Separating pairs get no impulse, so a bounce is
/// never amplified across consecutive ticks.
fn separate(
    a: &mut Player,
    b: &mut Player,
    cfg: &ResolvedBalanceConfig,
    delta: Vec2,
    dist: f32,
    min_dist: f32,
) {
    let normal = if dist > 0.0 {
        delta * (1.0 / dist)
    } else {
        Vec2::new(1.0, 0.0)
    };

    let overlap = min_dist - dist;
    let total_mass = a.mass + b.mass;
    let max_correction = cfg.world_physics.max_position_correction;
    // The heavier slime shoves; the lighter one yields
    let a_share = b.mass / total_mass;
    let b_share = a.mass / total_mass;
    a.position -= normal * (overlap * a_share).min(max_correction);
    b.position += normal * (overlap * b_share).min(max_correction);

    let relative = b.velocity - a.velocity;
    let vn = relative.dot(normal);
    if vn < 0.0 {
        let restitution = cfg.physics.collision_restitution;
        let impulse = (-(1.0 + restitution) * vn / (1.0 / a.mass + 1.0 / b.mass))
            .min(cfg.physics.collision_impulse_cap);
        a.velocity -= normal * (impulse / a.mass);
        b.velocity += normal * (impulse / b.mass);
    }
}
