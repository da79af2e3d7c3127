//! Status upkeep: timer expiry, damage over time, zone and safe-zone effects.

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::{flags, zone_type};
use crate::game::state::{GameState, Player, PlayerId};
use crate::game::systems::{combat, spawning, RoomContext, SimContext};
use crate::util::rng::Rng;

pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let tick = state.tick;
    let dt = 1.0 / cfg.server.tick_rate;

    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        let Some(mut player) = state.players.remove(id) else {
            continue;
        };
        if player.is_dead() {
            state.players.insert(id.clone(), player);
            continue;
        }

        expire_statuses(&mut player, cfg, tick);
        apply_safe_zone(state, cfg, rng, &mut player, tick, dt);
        apply_poison(state, cfg, rng, &mut player, tick, dt);
        apply_zones(state, cfg, rng, &mut player, dt);

        state.players.insert(id.clone(), player);
    }
}

fn expire_statuses(player: &mut Player, cfg: &ResolvedBalanceConfig, tick: u64) {
    if player.has_flag(flags::RESPAWN_SHIELD) && tick >= player.invulnerable_until_tick {
        player.clear_flag(flags::RESPAWN_SHIELD);
    }
    if player.has_flag(flags::ABILITY_DASH) && tick >= player.dash_until_tick {
        player.clear_flag(flags::ABILITY_DASH);
    }
    if player.has_flag(flags::ABILITY_SHIELD) && tick >= player.shield_until_tick {
        player.clear_flag(flags::ABILITY_SHIELD);
    }
    if player.has_flag(flags::ABILITY_MAGNET) && tick >= player.magnet_until_tick {
        player.clear_flag(flags::ABILITY_MAGNET);
    }
    if player.has_flag(flags::FROZEN) && tick >= player.frost_until_tick {
        player.clear_flag(flags::FROZEN);
        player.frost_slow_pct = 0.0;
    }
    if player.has_flag(flags::STUNNED) && tick >= player.stunned_until_tick {
        player.clear_flag(flags::STUNNED);
    }
    // Surviving the grace window with mass above the floor is a recovery
    if player.is_last_breath()
        && tick >= player.last_breath_end_tick
        && player.mass > cfg.physics.min_slime_mass
    {
        player.clear_flag(flags::LAST_BREATH);
    }
}

/// While safe-zone pressure is on, everyone caught outside a safe zone
/// burns. Standing inside only pauses the burn; it is no shield against
/// combat.
fn apply_safe_zone(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    player: &mut Player,
    tick: u64,
    dt: f32,
) {
    let inside = state
        .safe_zones
        .iter()
        .any(|z| player.position.distance_to(z.position) <= z.radius);
    if inside {
        player.set_flag(flags::IN_SAFE_ZONE);
    } else {
        player.clear_flag(flags::IN_SAFE_ZONE);
    }

    if !state.safe_zones_active() || state.safe_zones.is_empty() {
        return;
    }
    let damage_per_sec = cfg.safe_zones.damage_pct_per_sec.max(0.0);
    if damage_per_sec <= 0.0 {
        return;
    }
    if inside || player.is_last_breath() || tick < player.invulnerable_until_tick {
        return;
    }

    let loss = player.mass * damage_per_sec * dt * combat::damage_taken_multiplier(player);
    let mut ctx = RoomContext {
        state,
        cfg,
        rng,
    };
    if loss > 0.0 && !ctx.try_consume_guard(player) {
        ctx.apply_mass_delta(player, -loss);
    }
}

/// Poison ticks down mass every frame; it bypasses hit invulnerability but
/// never scatters orbs.
fn apply_poison(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    player: &mut Player,
    tick: u64,
    dt: f32,
) {
    if tick < player.poison_until_tick {
        let loss = player.mass * player.poison_pct_per_sec * dt;
        let mut ctx = RoomContext {
            state,
            cfg,
            rng,
        };
        ctx.apply_mass_delta(player, -loss);
    } else if player.has_flag(flags::POISONED) {
        player.clear_flag(flags::POISONED);
        player.poison_pct_per_sec = 0.0;
    }
}

fn apply_zones(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    player: &mut Player,
    dt: f32,
) {
    let zones: Vec<(crate::util::vec2::Vec2, f32, u8)> = state
        .zones
        .iter()
        .map(|z| (z.position, z.radius, z.kind))
        .collect();

    for (position, radius, kind) in zones {
        if player.position.distance_to(position) > radius {
            continue;
        }
        match kind {
            zone_type::NECTAR => {
                let gain = player.mass * cfg.zones.nectar_mass_gain_pct_per_sec * dt;
                let mut ctx = RoomContext {
                    state,
                    cfg,
                    rng,
                };
                ctx.apply_mass_delta(player, gain);
            }
            zone_type::LAVA => {
                let loss = player.mass * cfg.zones.lava_damage_pct_per_sec * dt;
                let position = player.position;
                let mut ctx = RoomContext {
                    state,
                    cfg,
                    rng,
                };
                let actual = -ctx.apply_mass_delta(player, -loss);
                if actual > 0.0 {
                    spawning::spawn_scatter_orbs(
                        &mut ctx,
                        position,
                        actual * cfg.zones.lava_scatter_pct,
                        cfg.combat.pvp_bite_scatter_orb_count,
                        cfg.combat.pvp_bite_scatter_speed,
                    );
                }
            }
            // Ice and turbo act on speed in the movement pass; slime zones
            // are plain terrain
            _ => {}
        }
    }
}
