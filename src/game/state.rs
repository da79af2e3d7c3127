//! Entity and match state definitions.
//!
//! All entity collections are `BTreeMap`s keyed by id: iteration order is the
//! sorted key order, never insertion or hash order, so a replayed match visits
//! entities in exactly the same sequence. Order-independent lookups may use
//! hash maps, tick loops must not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::flags;
use crate::game::modifiers::{Modifiers, TalentId, TalentPick};
use crate::util::vec2::Vec2;

pub use crate::balance::MatchPhase;

/// Session-scoped player identifier (assigned at join)
pub type PlayerId = String;

/// Identifier for non-player entities, unique per room lifetime
pub type EntityId = u64;

/// Orb type index marking a scatter orb (combat/death debris, not a spawned
/// type from the orb table)
pub const ORB_TYPE_SCATTER: u8 = u8::MAX;

/// Ability kinds assignable to slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityKind {
    Dash,
    Shield,
    Magnet,
    Bolt,
    Bomb,
}

/// One unlocked ability slot with its cooldown state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub kind: AbilityKind,
    /// Tick at which the slot may fire again
    pub ready_tick: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    // Hot: integrated every tick
    pub position: Vec2,
    pub velocity: Vec2,
    /// Facing direction in radians
    pub heading: f32,
    pub mass: f32,
    /// Packed status bits, see [`crate::game::constants::flags`]
    pub flags: u32,

    // Input
    /// Desired movement direction (zero when idle), deadzone already applied
    pub input: Vec2,
    /// Highest input sequence number applied so far
    pub input_seq: u32,
    /// Tick the last fresh input arrived (idle timeout)
    pub last_input_tick: u64,

    // Combat timers, absolute ticks
    pub last_attack_tick: u64,
    pub gcd_ready_tick: u64,
    pub invulnerable_until_tick: u64,
    pub last_breath_end_tick: u64,
    pub respawn_at_tick: u64,
    pub last_damaged_by: Option<PlayerId>,
    pub last_damaged_at_tick: u64,

    // Status effects
    pub poison_until_tick: u64,
    /// Poison strength, fraction of mass per second
    pub poison_pct_per_sec: f32,
    pub frost_until_tick: u64,
    pub frost_slow_pct: f32,
    pub stunned_until_tick: u64,
    /// Cloak window granted by dashing with the right talent; any attack or
    /// non-dash ability drops it early
    pub invisible_until_tick: u64,

    // Drift
    pub drift_until_tick: u64,
    pub drift_ready_tick: u64,

    // Abilities
    pub slots: SmallVec<[AbilitySlot; 3]>,
    pub dash_until_tick: u64,
    pub shield_until_tick: u64,
    pub magnet_until_tick: u64,
    /// Armor charges that each absorb one bite entirely
    pub guard_charges: u32,

    // Progression
    pub level: u32,
    pub kill_count: u32,
    /// Talent card choices waiting for player picks
    pub pending_card_slots: u32,
    /// The currently offered card choices, empty when none pending
    pub offered_cards: SmallVec<[TalentId; 3]>,
    /// Tick the current offer was made; drives the auto-pick deadline
    pub card_offer_tick: u64,
    pub talents: Vec<TalentPick>,
    /// Aggregated talent effects, recomputed whenever `talents` changes
    pub modifiers: Modifiers,

    // Cold
    pub id: PlayerId,
    pub name: String,
    pub class_id: u8,
}

impl Player {
    pub fn new(id: PlayerId, name: String, cfg: &ResolvedBalanceConfig) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            heading: 0.0,
            mass: cfg.slime.initial_mass,
            flags: 0,
            input: Vec2::ZERO,
            input_seq: 0,
            last_input_tick: 0,
            last_attack_tick: 0,
            gcd_ready_tick: 0,
            invulnerable_until_tick: 0,
            last_breath_end_tick: 0,
            respawn_at_tick: 0,
            last_damaged_by: None,
            last_damaged_at_tick: 0,
            poison_until_tick: 0,
            poison_pct_per_sec: 0.0,
            frost_until_tick: 0,
            frost_slow_pct: 0.0,
            stunned_until_tick: 0,
            invisible_until_tick: 0,
            drift_until_tick: 0,
            drift_ready_tick: 0,
            slots: SmallVec::new(),
            dash_until_tick: 0,
            shield_until_tick: 0,
            magnet_until_tick: 0,
            guard_charges: 0,
            level: cfg.slime.initial_level,
            kill_count: 0,
            pending_card_slots: 0,
            offered_cards: SmallVec::new(),
            card_offer_tick: 0,
            talents: Vec::new(),
            modifiers: Modifiers::default(),
            id,
            name,
            class_id: cfg.slime.initial_class_id,
        }
    }

    #[inline]
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    #[inline]
    pub fn set_flag(&mut self, flag: u32) {
        self.flags |= flag;
    }

    #[inline]
    pub fn clear_flag(&mut self, flag: u32) {
        self.flags &= !flag;
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.has_flag(flags::DEAD)
    }

    #[inline]
    pub fn is_last_breath(&self) -> bool {
        self.has_flag(flags::LAST_BREATH)
    }

    pub fn is_invulnerable(&self, tick: u64) -> bool {
        tick < self.invulnerable_until_tick || self.has_flag(flags::RESPAWN_SHIELD)
    }

    #[inline]
    pub fn is_invisible(&self, tick: u64) -> bool {
        tick < self.invisible_until_tick
    }

    pub fn is_stunned(&self, tick: u64) -> bool {
        tick < self.stunned_until_tick
    }

    pub fn radius(&self, cfg: &ResolvedBalanceConfig) -> f32 {
        crate::game::formulas::slime_radius(&cfg.formulas.radius, self.mass)
            * cfg.class_config(self.class_id).radius_mult
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub density: f32,
    /// Index into the configured orb type table, or [`ORB_TYPE_SCATTER`]
    pub type_index: u8,
}

impl Orb {
    pub fn radius(&self, cfg: &ResolvedBalanceConfig) -> f32 {
        crate::game::formulas::orb_radius(&cfg.orbs, self.mass, self.density)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chest {
    pub id: EntityId,
    pub position: Vec2,
    /// Mass remaining before the chest breaks open
    pub remaining_mass: f32,
    /// Bites absorbed for free before mass starts dropping
    pub armor_rings: u32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bolt,
    Bomb,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub owner_id: PlayerId,
    pub kind: ProjectileKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    /// Fraction of the victim's mass lost on hit
    pub damage_pct: f32,
    /// Where the projectile was fired from (range cutoff)
    pub origin: Vec2,
    pub max_range: f32,
    /// Bombs detonate at this tick even without a hit
    pub explode_at_tick: u64,
}

/// Orb spawn multiplier area active in late phases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotZone {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
    pub spawn_multiplier: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Vec2,
    pub radius: f32,
    /// See [`crate::game::constants::obstacle_type`]
    pub kind: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub position: Vec2,
    pub radius: f32,
    /// See [`crate::game::constants::zone_type`]
    pub kind: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeZone {
    pub position: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub mass: f32,
    pub kill_count: u32,
}

/// The complete authoritative match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub tick: u64,
    pub phase: MatchPhase,
    /// Tick the current match (re)started at
    pub match_start_tick: u64,
    /// Set when the phase is `Results`; the room restarts after this tick
    pub restart_at_tick: u64,

    pub players: BTreeMap<PlayerId, Player>,
    pub orbs: BTreeMap<EntityId, Orb>,
    pub chests: BTreeMap<EntityId, Chest>,
    pub projectiles: BTreeMap<EntityId, Projectile>,
    pub hot_zones: BTreeMap<EntityId, HotZone>,

    // Static per-match layout, generated from the seed
    pub obstacles: Vec<Obstacle>,
    pub zones: Vec<Zone>,
    pub safe_zones: Vec<SafeZone>,

    pub rebel_id: Option<PlayerId>,
    pub leaderboard: Vec<LeaderboardEntry>,

    next_entity_id: EntityId,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            phase: MatchPhase::Spawn,
            match_start_tick: 0,
            restart_at_tick: 0,
            players: BTreeMap::new(),
            orbs: BTreeMap::new(),
            chests: BTreeMap::new(),
            projectiles: BTreeMap::new(),
            hot_zones: BTreeMap::new(),
            obstacles: Vec::new(),
            zones: Vec::new(),
            safe_zones: Vec::new(),
            rebel_id: None,
            leaderboard: Vec::new(),
            next_entity_id: 1,
        }
    }

    /// Allocate a fresh entity id. Ids are never reused within a room.
    pub fn alloc_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Seconds elapsed in the current match
    pub fn match_elapsed_sec(&self, cfg: &ResolvedBalanceConfig) -> f32 {
        (self.tick.saturating_sub(self.match_start_tick)) as f32 / cfg.server.tick_rate
    }

    /// Players that are present and not dead
    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| !p.is_dead())
    }

    /// Safe-zone pressure window: during Hunt, everyone caught outside a
    /// safe zone burns, and hunger pauses until the pressure lifts
    pub fn safe_zones_active(&self) -> bool {
        self.phase == MatchPhase::Hunt
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
