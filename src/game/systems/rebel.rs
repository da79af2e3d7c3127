//! Rebel designation and the leaderboard.
//!
//! The rebel is the runaway leader: whoever holds more than a configured
//! multiple of the average alive mass, marked for everyone to hunt.

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::flags;
use crate::game::state::{GameState, LeaderboardEntry, PlayerId};

const LEADERBOARD_SIZE: usize = 10;

pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig) {
    let interval = cfg.seconds_to_ticks(cfg.rebel.update_interval_sec).max(1);
    if state.tick % interval == 0 {
        reassign_rebel(state, cfg);
    }
    rebuild_leaderboard(state);
}

fn reassign_rebel(state: &mut GameState, cfg: &ResolvedBalanceConfig) {
    let mut total = 0.0_f32;
    let mut count = 0_usize;
    let mut leader: Option<(&PlayerId, f32)> = None;
    for (id, player) in &state.players {
        if player.is_dead() {
            continue;
        }
        total += player.mass;
        count += 1;
        // Strictly-greater keeps the first leader on ties, in key order
        if leader.map_or(true, |(_, mass)| player.mass > mass) {
            leader = Some((id, player.mass));
        }
    }

    let new_rebel = match leader {
        Some((id, mass)) if count >= 2 => {
            let avg = total / count as f32;
            (mass > avg * cfg.rebel.mass_threshold_multiplier).then(|| id.clone())
        }
        _ => None,
    };

    if new_rebel == state.rebel_id {
        return;
    }
    if let Some(old) = state.rebel_id.take() {
        if let Some(player) = state.players.get_mut(&old) {
            player.clear_flag(flags::REBEL);
        }
    }
    if let Some(id) = &new_rebel {
        if let Some(player) = state.players.get_mut(id) {
            player.set_flag(flags::REBEL);
        }
    }
    state.rebel_id = new_rebel;
}

fn rebuild_leaderboard(state: &mut GameState) {
    let mut entries: Vec<LeaderboardEntry> = state
        .players
        .values()
        .map(|p| LeaderboardEntry {
            player_id: p.id.clone(),
            name: p.name.clone(),
            mass: p.mass,
            kill_count: p.kill_count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.mass
            .total_cmp(&a.mass)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    entries.truncate(LEADERBOARD_SIZE);
    state.leaderboard = entries;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Player;

    fn setup() -> (GameState, ResolvedBalanceConfig) {
        (GameState::new(), ResolvedBalanceConfig::default())
    }

    fn add_player(state: &mut GameState, cfg: &ResolvedBalanceConfig, id: &str, mass: f32) {
        let mut p = Player::new(id.to_string(), id.to_uppercase(), cfg);
        p.mass = mass;
        state.players.insert(p.id.clone(), p);
    }

    #[test]
    fn test_runaway_leader_becomes_rebel() {
        let (mut state, cfg) = setup();
        add_player(&mut state, &cfg, "a", 1000.0);
        add_player(&mut state, &cfg, "b", 100.0);
        add_player(&mut state, &cfg, "c", 100.0);
        update(&mut state, &cfg);
        assert_eq!(state.rebel_id.as_deref(), Some("a"));
        assert!(state.players["a"].has_flag(flags::REBEL));
    }

    #[test]
    fn test_balanced_masses_have_no_rebel() {
        let (mut state, cfg) = setup();
        add_player(&mut state, &cfg, "a", 110.0);
        add_player(&mut state, &cfg, "b", 100.0);
        add_player(&mut state, &cfg, "c", 105.0);
        update(&mut state, &cfg);
        assert!(state.rebel_id.is_none());
    }

    #[test]
    fn test_rebel_flag_moves_with_the_lead() {
        let (mut state, cfg) = setup();
        add_player(&mut state, &cfg, "a", 1000.0);
        add_player(&mut state, &cfg, "b", 100.0);
        update(&mut state, &cfg);
        assert_eq!(state.rebel_id.as_deref(), Some("a"));

        state.players.get_mut("a").unwrap().mass = 100.0;
        state.players.get_mut("b").unwrap().mass = 1000.0;
        state.tick = cfg.seconds_to_ticks(cfg.rebel.update_interval_sec);
        update(&mut state, &cfg);
        assert_eq!(state.rebel_id.as_deref(), Some("b"));
        assert!(!state.players["a"].has_flag(flags::REBEL));
        assert!(state.players["b"].has_flag(flags::REBEL));
    }

    #[test]
    fn test_lone_player_is_never_rebel() {
        let (mut state, cfg) = setup();
        add_player(&mut state, &cfg, "a", 10_000.0);
        update(&mut state, &cfg);
        assert!(state.rebel_id.is_none());
    }

    #[test]
    fn test_off_interval_tick_keeps_assignment() {
        let (mut state, cfg) = setup();
        add_player(&mut state, &cfg, "a", 1000.0);
        add_player(&mut state, &cfg, "b", 100.0);
        update(&mut state, &cfg);
        assert_eq!(state.rebel_id.as_deref(), Some("a"));

        // Masses flip, but the next check has not come due
        state.players.get_mut("a").unwrap().mass = 100.0;
        state.players.get_mut("b").unwrap().mass = 1000.0;
        state.tick = 1;
        update(&mut state, &cfg);
        assert_eq!(state.rebel_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_leaderboard_sorted_by_mass() {
        let (mut state, cfg) = setup();
        add_player(&mut state, &cfg, "a", 100.0);
        add_player(&mut state, &cfg, "b", 300.0);
        add_player(&mut state, &cfg, "c", 200.0);
        update(&mut state, &cfg);
        let ids: Vec<&str> = state
            .leaderboard
            .iter()
            .map(|e| e.player_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_leaderboard_is_capped() {
        let (mut state, cfg) = setup();
        for i in 0..15 {
            add_player(&mut state, &cfg, &format!("p{i:02}"), 100.0 + i as f32);
        }
        update(&mut state, &cfg);
        assert_eq!(state.leaderboard.len(), LEADERBOARD_SIZE);
    }
}
