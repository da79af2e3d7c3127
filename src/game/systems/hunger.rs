//! Passive mass drain in the late match.
//!
//! Hunger bites during Hunt and Final, but only once hot zones exist to
//! shelter in, and never while safe-zone pressure is on: the endgame funnels
//! players toward contested ground with exactly one drain at a time. The
//! drain floors above the death threshold, so starvation never kills.

use crate::balance::{MatchPhase, ResolvedBalanceConfig};
use crate::game::state::{GameState, PlayerId};
use crate::game::systems::{RoomContext, SimContext};
use crate::util::rng::Rng;

pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    if !matches!(state.phase, MatchPhase::Hunt | MatchPhase::Final) {
        return;
    }
    if state.safe_zones_active() && !state.safe_zones.is_empty() {
        return;
    }
    if state.hot_zones.is_empty() {
        return;
    }

    let dt = 1.0 / cfg.server.tick_rate;
    let floor = cfg.hunger.min_mass.max(cfg.physics.min_slime_mass);

    let hot_zones: Vec<(crate::util::vec2::Vec2, f32)> = state
        .hot_zones
        .values()
        .map(|hz| (hz.position, hz.radius))
        .collect();

    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        let Some(mut player) = state.players.remove(id) else {
            continue;
        };
        if player.is_dead() {
            state.players.insert(id.clone(), player);
            continue;
        }
        let sheltered = hot_zones
            .iter()
            .any(|(center, radius)| player.position.distance_to(*center) <= *radius);
        if sheltered {
            state.players.insert(id.clone(), player);
            continue;
        }

        let per_sec = (cfg.hunger.base_drain_per_sec
            + cfg.hunger.scaling_per_mass * player.mass / 100.0)
            .min(cfg.hunger.max_drain_per_sec);
        // Pre-floored target, so the drain can never push a slime into death
        let target = (player.mass - per_sec * dt).max(floor);
        let delta = target - player.mass;
        if delta < 0.0 {
            let mut ctx = RoomContext {
                state,
                cfg,
                rng,
            };
            ctx.apply_mass_delta(&mut player, delta);
        }

        state.players.insert(id.clone(), player);
    }
}
