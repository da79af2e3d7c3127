//! A room hosts one match: the authoritative state, the seeded RNG, the
//! input buffer and the fixed-order tick loop.

use std::f32::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, info};
use uuid::Uuid;

use crate::balance::{MatchPhase, ResolvedBalanceConfig};
use crate::game::arena;
use crate::game::constants::flags;
use crate::game::input_buffer::{InputBuffer, InputSender};
use crate::game::state::{GameState, Player, PlayerId};
use crate::game::systems::{
    abilities, collision, combat, effects, feeding, hunger, movement, physics, player_state,
    rebel, spawning,
};
use crate::util::{names, nickname, rng::Rng};
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room is full ({0} players)")]
    Full(usize),
    #[error("player already joined: {0}")]
    AlreadyJoined(PlayerId),
}

pub struct Room {
    match_id: Uuid,
    cfg: Arc<ResolvedBalanceConfig>,
    state: GameState,
    rng: Rng,
    inputs: InputBuffer,
}

impl Room {
    pub fn new(cfg: Arc<ResolvedBalanceConfig>, seed: u32) -> Self {
        let mut rng = Rng::new(seed);
        let mut state = GameState::new();
        let (obstacles, safe_zones, zones) = arena::generate_arena(&mut rng, &cfg);
        state.obstacles = obstacles;
        state.safe_zones = safe_zones;
        state.zones = zones;
        spawning::spawn_initial_orbs(&mut state, &cfg, &mut rng);

        let capacity = cfg.server.ability_queue_size.max(64);
        let match_id = Uuid::new_v4();
        info!(%match_id, seed, "room created");
        Self {
            match_id,
            cfg,
            state,
            rng,
            inputs: InputBuffer::new(capacity),
        }
    }

    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &ResolvedBalanceConfig {
        &self.cfg
    }

    /// Handle for the transport edge to push inputs through
    pub fn input_sender(&self) -> InputSender {
        self.inputs.sender()
    }

    /// Add a player. An unusable display name falls back to a generated
    /// guest name derived from the player id.
    pub fn join(
        &mut self,
        id: PlayerId,
        requested_name: &str,
        class: u8,
    ) -> Result<(), RoomError> {
        if self.state.players.len() >= self.cfg.server.max_players {
            return Err(RoomError::Full(self.state.players.len()));
        }
        if self.state.players.contains_key(&id) {
            return Err(RoomError::AlreadyJoined(id));
        }

        let name = match nickname::validate_and_normalize(requested_name) {
            Ok(name) => name,
            Err(reason) => {
                debug!(player = %id, %reason, "display name rejected, assigning guest name");
                let seed = id.bytes().fold(0u32, |acc, b| {
                    acc.wrapping_mul(31).wrapping_add(b as u32)
                });
                names::generate_name(seed)
            }
        };

        let mut player = Player::new(id.clone(), name, &self.cfg);
        if class <= 3 {
            player.class_id = class;
        }
        player.position =
            spawning::find_spawn_point(&self.state, &self.cfg, &mut self.rng, player.radius(&self.cfg));
        player.heading = self.rng.range(0.0, TAU);
        player.set_flag(flags::RESPAWN_SHIELD);
        player.invulnerable_until_tick = self.state.tick
            + self.cfg.seconds_to_ticks(self.cfg.combat.respawn_shield_sec);
        player_state::init_unlocks(&mut player, &self.cfg);

        info!(player = %id, name = %player.name, class = player.class_id, "player joined");
        self.state.players.insert(id, player);
        Ok(())
    }

    pub fn leave(&mut self, id: &PlayerId) {
        if self.state.players.remove(id).is_some() {
            info!(player = %id, "player left");
            if self.state.rebel_id.as_ref() == Some(id) {
                self.state.rebel_id = None;
            }
        }
    }

    /// One fixed step of the simulation.
    pub fn tick(&mut self) {
        self.update_phase();
        self.apply_inputs();

        let Self {
            cfg, state, rng, ..
        } = self;
        spawning::update(state, cfg, rng);
        movement::update(state, cfg);
        physics::update_orbs(state, cfg);
        collision::update(state, cfg, rng);
        combat::update_projectiles(state, cfg, rng);
        feeding::update(state, cfg, rng);
        effects::update(state, cfg, rng);
        player_state::update(state, cfg, rng);
        hunger::update(state, cfg, rng);
        rebel::update(state, cfg);

        state.tick += 1;
    }

    /// Drive the room on a fixed wall-clock interval until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let period = Duration::from_secs_f64(1.0 / self.cfg.server.tick_rate as f64);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(match_id = %self.match_id, "room loop started");
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(match_id = %self.match_id, tick = self.state.tick, "room loop stopped");
                        return;
                    }
                }
            }
        }
    }

    fn update_phase(&mut self) {
        let elapsed = self.state.match_elapsed_sec(&self.cfg);

        if self.state.phase == MatchPhase::Results {
            if self.state.tick >= self.state.restart_at_tick {
                self.restart_match();
            }
            return;
        }

        if elapsed >= self.cfg.match_cfg.duration_sec {
            self.state.phase = MatchPhase::Results;
            self.state.restart_at_tick = self.state.tick
                + self.cfg.seconds_to_ticks(
                    self.cfg.match_cfg.results_duration_sec + self.cfg.match_cfg.restart_delay_sec,
                );
            info!(match_id = %self.match_id, tick = self.state.tick, "match over, showing results");
            return;
        }

        let target = phase_for_elapsed(&self.cfg, elapsed);
        if target != self.state.phase {
            self.enter_phase(target);
        }
    }

    fn enter_phase(&mut self, phase: MatchPhase) {
        self.state.phase = phase;
        info!(match_id = %self.match_id, phase = phase.as_str(), tick = self.state.tick, "phase change");
        match phase {
            MatchPhase::Chaos => spawning::spawn_hot_zones(
                &mut self.state,
                &self.cfg,
                &mut self.rng,
                self.cfg.hot_zones.chaos_count,
                self.cfg.hot_zones.spawn_multiplier_chaos,
                false,
            ),
            MatchPhase::Final => spawning::spawn_hot_zones(
                &mut self.state,
                &self.cfg,
                &mut self.rng,
                self.cfg.hot_zones.final_count,
                self.cfg.hot_zones.spawn_multiplier_final,
                true,
            ),
            _ => {}
        }
    }

    /// Tear the arena down and start a fresh match with the same roster.
    fn restart_match(&mut self) {
        self.match_id = Uuid::new_v4();
        info!(match_id = %self.match_id, tick = self.state.tick, "match restart");

        self.state.orbs.clear();
        self.state.chests.clear();
        self.state.projectiles.clear();
        self.state.hot_zones.clear();
        self.state.leaderboard.clear();
        self.state.rebel_id = None;

        let (obstacles, safe_zones, zones) = arena::generate_arena(&mut self.rng, &self.cfg);
        self.state.obstacles = obstacles;
        self.state.safe_zones = safe_zones;
        self.state.zones = zones;

        self.state.match_start_tick = self.state.tick;
        self.state.restart_at_tick = 0;
        self.state.phase = MatchPhase::Spawn;

        let ids: Vec<PlayerId> = self.state.players.keys().cloned().collect();
        for id in &ids {
            let Some(old) = self.state.players.remove(id) else {
                continue;
            };
            let mut player = Player::new(old.id, old.name, &self.cfg);
            player.class_id = old.class_id;
            player.position = spawning::find_spawn_point(
                &self.state,
                &self.cfg,
                &mut self.rng,
                player.radius(&self.cfg),
            );
            player.heading = self.rng.range(0.0, TAU);
            player.set_flag(flags::RESPAWN_SHIELD);
            player.invulnerable_until_tick = self.state.tick
                + self.cfg.seconds_to_ticks(self.cfg.combat.respawn_shield_sec);
            player_state::init_unlocks(&mut player, &self.cfg);
            self.state.players.insert(id.clone(), player);
        }

        spawning::spawn_initial_orbs(&mut self.state, &self.cfg, &mut self.rng);
    }

    /// Drain the input channel and apply movement inputs; ability and talent
    /// requests are collected and resolved afterwards so they see the
    /// post-input state.
    fn apply_inputs(&mut self) {
        let tick = self.state.tick;
        let in_results = self.state.phase == MatchPhase::Results;
        let mut ability_requests: SmallVec<[(PlayerId, u8); 8]> = SmallVec::new();
        let mut talent_requests: SmallVec<[(PlayerId, u8); 8]> = SmallVec::new();

        for message in self.inputs.drain() {
            let Some(player) = self.state.players.get_mut(&message.player_id) else {
                continue;
            };
            let command = message.command;
            // Stale or replayed packets are dropped outright
            if command.seq <= player.input_seq {
                continue;
            }
            player.input_seq = command.seq;

            let x = if command.move_x.is_finite() { command.move_x } else { 0.0 };
            let y = if command.move_y.is_finite() { command.move_y } else { 0.0 };
            let mut input = Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
            let len = input.length();
            if len > 1.0 {
                input = input * (1.0 / len);
            }
            if in_results {
                input = Vec2::ZERO;
            }
            player.input = input;
            player.last_input_tick = tick;

            if let Some(slot) = command.ability_slot {
                ability_requests.push((message.player_id.clone(), slot));
            }
            if let Some(choice) = command.talent_choice {
                talent_requests.push((message.player_id.clone(), choice));
            }
        }

        if in_results {
            return;
        }

        for (id, slot) in ability_requests {
            let Some(mut player) = self.state.players.remove(&id) else {
                continue;
            };
            abilities::try_activate(&mut self.state, &self.cfg, &mut player, slot);
            self.state.players.insert(id, player);
        }
        for (id, choice) in talent_requests {
            if let Some(player) = self.state.players.get_mut(&id) {
                player_state::apply_talent_choice(player, choice);
            }
        }
    }
}

/// Resolve the phase for an elapsed time from the config table; gaps fall
/// through to Final.
fn phase_for_elapsed(cfg: &ResolvedBalanceConfig, elapsed: f32) -> MatchPhase {
    cfg.match_cfg
        .phases
        .iter()
        .find(|p| elapsed >= p.start_sec && elapsed < p.end_sec)
        .map(|p| p.id)
        .unwrap_or(MatchPhase::Final)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input_buffer::InputCommand;

    fn test_room() -> Room {
        Room::new(Arc::new(ResolvedBalanceConfig::default()), 12345)
    }

    fn send(room: &Room, player: &str, seq: u32, x: f32, y: f32) {
        room.input_sender()
            .try_send(
                player.to_string(),
                InputCommand {
                    seq,
                    move_x: x,
                    move_y: y,
                    ability_slot: None,
                    talent_choice: None,
                },
            )
            .unwrap();
    }

    #[test]
    fn test_new_room_generates_arena_and_orbs() {
        let room = test_room();
        assert!(!room.state().obstacles.is_empty());
        assert!(!room.state().safe_zones.is_empty());
        assert_eq!(room.state().orbs.len(), room.config().orbs.initial_count);
        assert_eq!(room.state().phase, MatchPhase::Spawn);
    }

    #[test]
    fn test_join_spawns_shielded_player_with_slot() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 1).unwrap();
        let p = &room.state().players["p1"];
        assert_eq!(p.name, "Blob");
        assert_eq!(p.class_id, 1);
        assert!(p.has_flag(flags::RESPAWN_SHIELD));
        assert_eq!(p.slots.len(), 1);
    }

    #[test]
    fn test_bad_name_gets_guest_name() {
        let mut room = test_room();
        room.join("p1".to_string(), "x", 0).unwrap();
        let p = &room.state().players["p1"];
        assert!(p.name.len() >= 2);
        assert_ne!(p.name, "x");
    }

    #[test]
    fn test_room_capacity_enforced() {
        let mut room = test_room();
        for i in 0..room.config().server.max_players {
            room.join(format!("p{i}"), "Player One", 0).unwrap();
        }
        assert!(matches!(
            room.join("late".to_string(), "Player One", 0),
            Err(RoomError::Full(_))
        ));
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        assert!(matches!(
            room.join("p1".to_string(), "Blob", 0),
            Err(RoomError::AlreadyJoined(_))
        ));
    }

    #[test]
    fn test_input_moves_player() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        let start = room.state().players["p1"].position;
        for seq in 1..=60 {
            send(&room, "p1", seq, 1.0, 0.0);
            room.tick();
        }
        let end = room.state().players["p1"].position;
        assert!(start.distance_to(end) > 10.0);
    }

    #[test]
    fn test_stale_sequence_dropped() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        send(&room, "p1", 5, 1.0, 0.0);
        room.tick();
        send(&room, "p1", 5, -1.0, 0.0);
        send(&room, "p1", 4, -1.0, 0.0);
        room.tick();
        // Replays did not overwrite the stored direction
        assert!(room.state().players["p1"].input.x > 0.0);
    }

    #[test]
    fn test_non_finite_input_zeroed() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        send(&room, "p1", 1, f32::NAN, f32::INFINITY);
        room.tick();
        assert_eq!(room.state().players["p1"].input, Vec2::ZERO);
    }

    #[test]
    fn test_oversized_input_clamped_to_unit() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        send(&room, "p1", 1, 1.0, 1.0);
        room.tick();
        assert!(room.state().players["p1"].input.length() <= 1.0 + 1e-4);
    }

    #[test]
    fn test_phase_table_progression() {
        let cfg = ResolvedBalanceConfig::default();
        assert_eq!(phase_for_elapsed(&cfg, 0.0), MatchPhase::Spawn);
        assert_eq!(phase_for_elapsed(&cfg, 30.0), MatchPhase::Collect);
        assert_eq!(phase_for_elapsed(&cfg, 70.0), MatchPhase::Hunt);
        assert_eq!(phase_for_elapsed(&cfg, 100.0), MatchPhase::Chaos);
        assert_eq!(phase_for_elapsed(&cfg, 130.0), MatchPhase::Final);
        assert_eq!(phase_for_elapsed(&cfg, 100_000.0), MatchPhase::Final);
    }

    #[test]
    fn test_chaos_entry_spawns_hot_zones() {
        let mut room = test_room();
        // Jump time to the Chaos window
        let ticks = room.config().seconds_to_ticks(100.0);
        room.state.tick = ticks;
        room.tick();
        assert_eq!(room.state().phase, MatchPhase::Chaos);
        assert_eq!(
            room.state().hot_zones.len(),
            room.config().hot_zones.chaos_count
        );
    }

    #[test]
    fn test_final_hot_zone_centered() {
        let mut room = test_room();
        let ticks = room.config().seconds_to_ticks(130.0);
        room.state.tick = ticks;
        room.tick();
        assert_eq!(room.state().phase, MatchPhase::Final);
        let first = room.state().hot_zones.values().next().unwrap();
        assert_eq!(first.position, Vec2::ZERO);
    }

    #[test]
    fn test_match_end_and_restart() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        room.state.players.get_mut("p1").unwrap().mass = 5000.0;
        let old_match = room.match_id();

        let end = room.config().seconds_to_ticks(room.config().match_cfg.duration_sec);
        room.state.tick = end;
        room.tick();
        assert_eq!(room.state().phase, MatchPhase::Results);

        room.state.tick = room.state().restart_at_tick;
        room.tick();
        assert_eq!(room.state().phase, MatchPhase::Spawn);
        assert_ne!(room.match_id(), old_match);
        // Roster kept, progress reset
        let p = &room.state().players["p1"];
        assert_eq!(p.mass, room.config().slime.initial_mass);
        assert_eq!(p.level, room.config().slime.initial_level);
        assert_eq!(room.state().match_start_tick, room.state().tick - 1);
    }

    #[test]
    fn test_results_phase_zeroes_input() {
        let mut room = test_room();
        room.join("p1".to_string(), "Blob", 0).unwrap();
        let end = room.config().seconds_to_ticks(room.config().match_cfg.duration_sec);
        room.state.tick = end;
        room.tick();
        assert_eq!(room.state().phase, MatchPhase::Results);
        send(&room, "p1", 1, 1.0, 0.0);
        room.tick();
        assert_eq!(room.state().players["p1"].input, Vec2::ZERO);
    }
}
