//! Orb physics: magnet pull, body push, damped integration, wall bounce.
//!
//! Player-to-orb interactions run sequentially in sorted player order (they
//! are order-sensitive), then the independent per-orb integration fans out
//! over rayon.

use rayon::prelude::*;

use crate::balance::{ResolvedBalanceConfig, WorldShape};
use crate::game::arena::WorldBounds;
use crate::game::constants::flags;
use crate::game::modifiers::ModifierKind;
use crate::game::state::GameState;
use crate::util::vec2::Vec2;

pub fn update_orbs(state: &mut GameState, cfg: &ResolvedBalanceConfig) {
    let tick = state.tick;
    let dt = 1.0 / cfg.server.tick_rate;
    let bounds = WorldBounds::from_config(cfg);

    let GameState { players, orbs, .. } = state;

    // Magnet pull and body push, player by player in key order
    for player in players.values() {
        if player.is_dead() {
            continue;
        }

        let talent_radius = player.modifiers.get(ModifierKind::MagnetRadius);
        let ability_active =
            player.has_flag(flags::ABILITY_MAGNET) && tick < player.magnet_until_tick;
        let magnet_radius = if ability_active {
            cfg.abilities.magnet.radius.max(talent_radius)
        } else {
            talent_radius
        };
        let magnet_speed = if ability_active {
            cfg.abilities
                .magnet
                .pull_speed
                .max(player.modifiers.get(ModifierKind::MagnetSpeed))
        } else {
            player.modifiers.get(ModifierKind::MagnetSpeed)
        };

        let body_radius = player.radius(cfg);

        for orb in orbs.values_mut() {
            let to_player = player.position - orb.position;
            let dist = to_player.length();

            if magnet_radius > 0.0 && dist > 0.0 && dist <= magnet_radius {
                orb.velocity += to_player.normalize() * (magnet_speed * dt * 10.0);
            }

            // Body contact shoves orbs outward so they do not tunnel through
            let contact = body_radius + orb.radius(cfg);
            if dist < contact && dist > 0.0 {
                orb.velocity -= to_player.normalize() * (cfg.orbs.push_force * dt * 10.0);
            }
        }
    }

    // Independent integration per orb
    orbs.par_iter_mut().for_each(|(_, orb)| {
        orb.velocity *= 1.0 - cfg.physics.orb_linear_damping;
        orb.velocity = orb.velocity.clamp_length(cfg.physics.max_orb_speed);
        orb.position += orb.velocity * dt;

        let r = crate::game::formulas::orb_radius(&cfg.orbs, orb.mass, orb.density);
        bounce(
            &mut orb.position,
            &mut orb.velocity,
            r,
            &bounds,
            cfg.world_physics.restitution,
        );
    });
}

/// Reflect a body elastically off the world boundary
pub fn bounce(
    position: &mut Vec2,
    velocity: &mut Vec2,
    radius: f32,
    bounds: &WorldBounds,
    restitution: f32,
) {
    match bounds.shape {
        WorldShape::Rect => {
            let max_x = bounds.half_width - radius;
            let max_y = bounds.half_height - radius;
            if position.x < -max_x {
                position.x = -max_x;
                velocity.x = -velocity.x * restitution;
            } else if position.x > max_x {
                position.x = max_x;
                velocity.x = -velocity.x * restitution;
            }
            if position.y < -max_y {
                position.y = -max_y;
                velocity.y = -velocity.y * restitution;
            } else if position.y > max_y {
                position.y = max_y;
                velocity.y = -velocity.y * restitution;
            }
        }
        WorldShape::Circle => {
            let max_r = bounds.radius - radius;
            let dist = position.length();
            if dist > max_r && dist > 0.0 {
                let normal = *position * (1.0 / dist);
                *position = normal * max_r;
                let vn = velocity.dot(normal);
                if vn > 0.0 {
                    *velocity -= normal * (vn * (1.0 + restitution));
                }
            }
        }
    }
}
