//! Simulation systems, invoked in a fixed order by the room tick loop.

pub mod abilities;
pub mod collision;
pub mod combat;
pub mod effects;
pub mod feeding;
pub mod hunger;
pub mod movement;
pub mod physics;
pub mod player_state;
pub mod rebel;
pub mod spawning;

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::flags;
use crate::game::state::{GameState, Player};
use crate::util::rng::Rng;
use crate::util::vec2::Vec2;

/// Capability interface handed to combat and player-state code.
///
/// These systems frequently operate on players temporarily removed from the
/// entity map (to hold two `&mut Player` at once), so they cannot receive the
/// whole state. The trait exposes exactly what they are allowed to touch:
/// mass mutation, orb spawning, the deterministic RNG, the tick counter and
/// the balance config. Nothing else.
pub trait SimContext {
    fn tick(&self) -> u64;
    fn balance(&self) -> &ResolvedBalanceConfig;
    fn rng(&mut self) -> &mut Rng;

    /// Spawn an orb unconditionally, ignoring the orb-count cap.
    /// Scatter mass must never be silently destroyed by a full arena.
    fn force_spawn_orb(&mut self, position: Vec2, velocity: Vec2, mass: f32);

    /// Single point of player mass mutation. Clamps at `minSlimeMass` and
    /// returns the delta actually applied; a negative delta that would cross
    /// the floor while the player's last-breath window has already elapsed
    /// marks the player dead instead.
    fn apply_mass_delta(&mut self, player: &mut Player, delta: f32) -> f32;

    /// Consume one guard charge if available; a consumed guard fully absorbs
    /// the triggering hit.
    fn try_consume_guard(&mut self, player: &mut Player) -> bool;
}

/// The production [`SimContext`]: borrows the room's parts disjointly so a
/// removed player can be mutated alongside the rest of the state.
pub struct RoomContext<'a> {
    pub state: &'a mut GameState,
    pub cfg: &'a ResolvedBalanceConfig,
    pub rng: &'a mut Rng,
}

impl SimContext for RoomContext<'_> {
    fn tick(&self) -> u64 {
        self.state.tick
    }

    fn balance(&self) -> &ResolvedBalanceConfig {
        self.cfg
    }

    fn rng(&mut self) -> &mut Rng {
        self.rng
    }

    fn force_spawn_orb(&mut self, position: Vec2, velocity: Vec2, mass: f32) {
        spawning::force_spawn_orb(self.state, position, velocity, mass);
    }

    fn apply_mass_delta(&mut self, player: &mut Player, delta: f32) -> f32 {
        let min = self.cfg.physics.min_slime_mass;
        let before = player.mass;
        let wanted = before + delta;
        if wanted <= min && delta < 0.0 {
            player.mass = min;
            // A clamped loss after the grace window has run out is lethal
            if player.is_last_breath() && self.state.tick >= player.last_breath_end_tick {
                player.set_flag(flags::DEAD);
            }
        } else {
            player.mass = wanted;
        }
        player.mass - before
    }

    fn try_consume_guard(&mut self, player: &mut Player) -> bool {
        if player.guard_charges > 0 {
            player.guard_charges -= 1;
            return true;
        }
        false
    }
}
