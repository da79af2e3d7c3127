//! Player steering, drift, and position integration.

use crate::balance::ResolvedBalanceConfig;
use crate::game::arena::WorldBounds;
use crate::game::constants::{flags, zone_type};
use crate::game::formulas;
use crate::game::modifiers::ModifierKind;
use crate::game::state::{GameState, Player, Zone};
use crate::util::vec2::{wrap_angle, Vec2};

/// Per-tick steering and integration for every living player.
pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig) {
    let tick = state.tick;
    let dt = 1.0 / cfg.server.tick_rate;
    let bounds = WorldBounds::from_config(cfg);
    let input_timeout = cfg.seconds_to_ticks(cfg.controls.input_timeout_ms / 1000.0);

    let GameState { players, zones, .. } = state;

    for player in players.values_mut() {
        if player.is_dead() {
            continue;
        }

        let stunned = player.is_stunned(tick);
        let idle = tick.saturating_sub(player.last_input_tick) > input_timeout;
        let input = if stunned || idle { Vec2::ZERO } else { player.input };
        let input_mag = input.length().min(1.0);
        let moving = input_mag > cfg.controls.joystick_deadzone;

        steer(player, cfg, tick, input, moving, dt);

        // Desired velocity along the facing direction; the player approaches
        // it exponentially, which doubles as friction when input drops to zero
        let desired = if moving && !stunned {
            Vec2::from_angle(player.heading) * (speed_target(player, cfg, tick, zones) * input_mag)
        } else {
            Vec2::ZERO
        };
        let blend = cfg.physics.speed_damping_rate;
        player.velocity += (desired - player.velocity) * blend;
        player.velocity = player.velocity.clamp_length(cfg.physics.max_slime_speed);

        player.position += player.velocity * dt;
        bounce_off_walls(player, cfg, &bounds);
    }
}

/// Rotate the facing angle toward the input direction, entering and leaving
/// the drift state as the angular delta demands.
fn steer(
    player: &mut Player,
    cfg: &ResolvedBalanceConfig,
    tick: u64,
    input: Vec2,
    moving: bool,
    dt: f32,
) {
    // Drift window expiry starts the cooldown
    if player.has_flag(flags::DRIFTING) && tick >= player.drift_until_tick {
        player.clear_flag(flags::DRIFTING);
        player.drift_ready_tick = tick + cfg.seconds_to_ticks(cfg.movement.drift_cooldown_sec);
    }

    if !moving {
        return;
    }

    let target = input.angle();
    let delta = wrap_angle(target - player.heading);
    let threshold = cfg.movement.drift_threshold_angle_deg.to_radians();

    if delta.abs() >= threshold
        && !player.has_flag(flags::DRIFTING)
        && tick >= player.drift_ready_tick
    {
        player.set_flag(flags::DRIFTING);
        player.drift_until_tick = tick + cfg.seconds_to_ticks(cfg.movement.drift_duration_sec);
        // Hard turns bleed speed
        player.velocity *= 1.0 - cfg.movement.drift_speed_loss;
    }

    let turn_bonus = 1.0 + player.modifiers.get(ModifierKind::TurnBonus);
    let rate_deg = if player.has_flag(flags::DRIFTING) {
        cfg.movement.drift_turn_rate_deg
    } else {
        formulas::turn_rate_deg(&cfg.movement, player.mass)
    } * turn_bonus;

    let max_step = rate_deg.to_radians() * dt;
    let step = delta.clamp(-max_step, max_step);
    player.heading = wrap_angle(player.heading + step);
}

/// Effective top speed for this player right now, all multipliers applied
fn speed_target(player: &Player, cfg: &ResolvedBalanceConfig, tick: u64, zones: &[Zone]) -> f32 {
    let mut speed = cfg.movement.base_speed
        * formulas::speed_multiplier(&cfg.formulas.speed, player.mass)
        * cfg.class_config(player.class_id).speed_mult
        * (1.0 + player.modifiers.get(ModifierKind::SpeedBonus));

    if player.has_flag(flags::DRIFTING) {
        speed *= 1.0 - cfg.movement.drift_speed_loss;
    }
    if player.is_last_breath() {
        speed *= cfg.combat.last_breath_speed_mult;
    }
    if tick < player.dash_until_tick {
        speed *= cfg.abilities.dash.speed_mult;
    }
    if tick < player.frost_until_tick {
        speed *= 1.0 - player.frost_slow_pct.clamp(0.0, 0.9);
    }

    for zone in zones {
        if player.position.distance_to(zone.position) <= zone.radius {
            match zone.kind {
                zone_type::ICE => speed *= cfg.zones.ice_speed_mult,
                zone_type::TURBO => speed *= cfg.zones.turbo_speed_mult,
                _ => {}
            }
        }
    }

    speed
}

fn bounce_off_walls(player: &mut Player, cfg: &ResolvedBalanceConfig, bounds: &WorldBounds) {
    let restitution = cfg.world_physics.restitution;
    let r = player.radius(cfg);
    match bounds.shape {
        crate::balance::WorldShape::Rect => {
            let max_x = bounds.half_width - r;
            let max_y = bounds.half_height - r;
            if player.position.x < -max_x {
                player.position.x = -max_x;
                player.velocity.x = -player.velocity.x * restitution;
            } else if player.position.x > max_x {
                player.position.x = max_x;
                player.velocity.x = -player.velocity.x * restitution;
            }
            if player.position.y < -max_y {
                player.position.y = -max_y;
                player.velocity.y = -player.velocity.y * restitution;
            } else if player.position.y > max_y {
                player.position.y = max_y;
                player.velocity.y = -player.velocity.y * restitution;
            }
        }
        crate::balance::WorldShape::Circle => {
            let max_r = bounds.radius - r;
            let dist = player.position.length();
            if dist > max_r && dist > 0.0 {
                let normal = player.position * (1.0 / dist);
                player.position = normal * max_r;
                let vn = player.velocity.dot(normal);
                if vn > 0.0 {
                    player.velocity -= normal * (vn * (1.0 + restitution));
                }
            }
        }
    }
}
