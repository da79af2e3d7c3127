//! Deterministic world snapshots.
//!
//! Entity collections serialize in id order (they live in ordered maps) and
//! every float is quantized, so two rooms running the same seed and inputs
//! produce byte-identical encodings.

use serde::{Deserialize, Serialize};

use crate::balance::{MatchPhase, ResolvedBalanceConfig};
use crate::game::formulas;
use crate::game::state::{EntityId, GameState, LeaderboardEntry, PlayerId};
use crate::util::vec2::Vec2;

/// Quantization step for snapshot floats
const PRECISION: f32 = 1.0e6;

fn q(value: f32) -> f32 {
    (value * PRECISION).round() / PRECISION
}

fn qv(value: Vec2) -> Vec2 {
    Vec2::new(q(value.x), q(value.y))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: f32,
    pub mass: f32,
    pub radius: f32,
    /// Mass-derived vitality, for client health bars
    pub max_hp: f32,
    pub flags: u32,
    pub level: u32,
    pub kill_count: u32,
    pub class_id: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbView {
    pub id: EntityId,
    pub position: Vec2,
    pub mass: f32,
    pub type_index: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChestView {
    pub id: EntityId,
    pub position: Vec2,
    pub remaining_mass: f32,
    pub armor_rings: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotZoneView {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
}

/// Everything a client needs to render one tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: MatchPhase,
    pub match_elapsed_sec: f32,
    pub players: Vec<PlayerView>,
    pub orbs: Vec<OrbView>,
    pub chests: Vec<ChestView>,
    pub projectiles: Vec<ProjectileView>,
    pub hot_zones: Vec<HotZoneView>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub rebel_id: Option<PlayerId>,
}

pub fn snapshot(state: &GameState, cfg: &ResolvedBalanceConfig) -> Snapshot {
    Snapshot {
        tick: state.tick,
        phase: state.phase,
        match_elapsed_sec: q(state.match_elapsed_sec(cfg)),
        players: state
            .players
            .values()
            .map(|p| PlayerView {
                id: p.id.clone(),
                name: p.name.clone(),
                position: qv(p.position),
                velocity: qv(p.velocity),
                heading: q(p.heading),
                mass: q(p.mass),
                radius: q(p.radius(cfg)),
                max_hp: q(formulas::log_stat(&cfg.formulas.hp, p.mass)
                    * cfg.class_config(p.class_id).hp_mult),
                flags: p.flags,
                level: p.level,
                kill_count: p.kill_count,
                class_id: p.class_id,
            })
            .collect(),
        orbs: state
            .orbs
            .values()
            .map(|o| OrbView {
                id: o.id,
                position: qv(o.position),
                mass: q(o.mass),
                type_index: o.type_index,
            })
            .collect(),
        chests: state
            .chests
            .values()
            .map(|c| ChestView {
                id: c.id,
                position: qv(c.position),
                remaining_mass: q(c.remaining_mass),
                armor_rings: c.armor_rings,
            })
            .collect(),
        projectiles: state
            .projectiles
            .values()
            .map(|p| ProjectileView {
                id: p.id,
                owner_id: p.owner_id.clone(),
                position: qv(p.position),
                radius: q(p.radius),
            })
            .collect(),
        hot_zones: state
            .hot_zones
            .values()
            .map(|hz| HotZoneView {
                id: hz.id,
                position: qv(hz.position),
                radius: q(hz.radius),
            })
            .collect(),
        leaderboard: state.leaderboard.clone(),
        rebel_id: state.rebel_id.clone(),
    }
}

/// Encode a snapshot with the standard bincode configuration.
pub fn encode(state: &GameState, cfg: &ResolvedBalanceConfig) -> Result<Vec<u8>, bincode::error::EncodeError> {
    bincode::serde::encode_to_vec(snapshot(state, cfg), bincode::config::standard())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Player;

    #[test]
    fn test_quantization_collapses_noise() {
        assert_eq!(q(1.000_000_04), q(1.000_000_06));
        assert_ne!(q(1.0), q(1.001));
    }

    #[test]
    fn test_snapshot_orders_players_by_id() {
        let cfg = ResolvedBalanceConfig::default();
        let mut state = GameState::new();
        for id in ["zeta", "alpha", "mid"] {
            let p = Player::new(id.to_string(), id.to_uppercase(), &cfg);
            state.players.insert(p.id.clone(), p);
        }
        let snap = snapshot(&state, &cfg);
        let ids: Vec<&str> = snap.players.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_player_view_carries_derived_vitality() {
        let cfg = ResolvedBalanceConfig::default();
        let mut state = GameState::new();
        let mut light = Player::new("light".to_string(), "L".to_string(), &cfg);
        light.mass = 100.0;
        let mut heavy = Player::new("heavy".to_string(), "H".to_string(), &cfg);
        heavy.mass = 5_000.0;
        state.players.insert(light.id.clone(), light);
        state.players.insert(heavy.id.clone(), heavy);

        let snap = snapshot(&state, &cfg);
        let hp_of = |id: &str| snap.players.iter().find(|p| p.id == id).unwrap().max_hp;
        assert!(hp_of("light") > 0.0);
        assert!(hp_of("heavy") > hp_of("light"));
    }

    #[test]
    fn test_identical_states_encode_identically() {
        let cfg = ResolvedBalanceConfig::default();
        let mut state = GameState::new();
        let p = Player::new("p1".to_string(), "Blob".to_string(), &cfg);
        state.players.insert(p.id.clone(), p);

        let a = encode(&state, &cfg).unwrap();
        let b = encode(&state.clone(), &cfg).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
