//! Talents and the modifier table they feed.
//!
//! Combat and movement never look at individual talents. Every talent level
//! folds into a flat per-player [`Modifiers`] table that is recomputed when a
//! talent is taken, so the hot paths read one array slot instead of walking a
//! talent list.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::util::rng::Rng;

/// Everything a talent can change. Values are additive across talents;
/// a kind nobody picked reads as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(usize)]
pub enum ModifierKind {
    SpeedBonus,
    TurnBonus,
    DamageBonus,
    BiteDamageBonus,
    DamageTakenBonus,
    AllDamageReduction,
    OrbMassBonus,
    KillMassBonus,
    /// Floor for respawn mass (flat, not a percentage)
    RespawnMass,
    CooldownReduction,
    BiteResistPct,
    PoisonPctPerSec,
    PoisonDurationSec,
    FrostSlowPct,
    FrostDurationSec,
    StunDurationSec,
    /// Dashing also cloaks for this many seconds
    InvisibleDurationSec,
    /// Side/tail bites convert scatter into attacker gain
    VampireSideGainPct,
    VampireTailGainPct,
    /// Fraction of received bite damage reflected back
    ThornsDamage,
    /// Bonus damage fraction when biting side or tail
    AmbushDamage,
    /// Fraction of dealt bite damage additionally absorbed
    ParasiteMass,
    MagnetRadius,
    MagnetSpeed,
}

impl ModifierKind {
    pub const COUNT: usize = 24;

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Flat aggregated talent effects for one player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Modifiers {
    values: Vec<f32>,
}

impl Modifiers {
    #[inline]
    pub fn get(&self, kind: ModifierKind) -> f32 {
        self.values.get(kind.index()).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, kind: ModifierKind, value: f32) {
        if self.values.is_empty() {
            self.values = vec![0.0; ModifierKind::COUNT];
        }
        self.values[kind.index()] += value;
    }

    pub fn reset(&mut self) {
        self.values.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    fn weight(self) -> f32 {
        match self {
            Rarity::Common => 60.0,
            Rarity::Rare => 30.0,
            Rarity::Epic => 10.0,
        }
    }
}

/// Stable talent identifier, index into [`CATALOG`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TalentId(pub u16);

/// A talent a player has taken, with its current level (1-based)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TalentPick {
    pub id: TalentId,
    pub level: u8,
}

pub struct TalentDef {
    pub key: &'static str,
    pub rarity: Rarity,
    pub max_level: u8,
    /// Restricted to one class, or open to all
    pub class_id: Option<u8>,
    /// Effect values per level, `[level1, level2, level3]`
    pub effects: &'static [(ModifierKind, [f32; 3])],
}

use crate::game::constants::class_id;

pub const CATALOG: &[TalentDef] = &[
    TalentDef {
        key: "fast_legs",
        rarity: Rarity::Common,
        max_level: 3,
        class_id: None,
        effects: &[(ModifierKind::SpeedBonus, [0.05, 0.10, 0.15])],
    },
    TalentDef {
        key: "sharp_teeth",
        rarity: Rarity::Common,
        max_level: 3,
        class_id: None,
        effects: &[(ModifierKind::BiteDamageBonus, [0.10, 0.20, 0.30])],
    },
    TalentDef {
        key: "thick_skin",
        rarity: Rarity::Common,
        max_level: 3,
        class_id: None,
        effects: &[(ModifierKind::AllDamageReduction, [0.05, 0.10, 0.15])],
    },
    TalentDef {
        key: "scavenger",
        rarity: Rarity::Common,
        max_level: 3,
        class_id: None,
        effects: &[(ModifierKind::OrbMassBonus, [0.10, 0.20, 0.30])],
    },
    TalentDef {
        key: "tight_turns",
        rarity: Rarity::Common,
        max_level: 3,
        class_id: None,
        effects: &[(ModifierKind::TurnBonus, [0.10, 0.20, 0.30])],
    },
    TalentDef {
        key: "kill_instinct",
        rarity: Rarity::Rare,
        max_level: 2,
        class_id: None,
        effects: &[(ModifierKind::KillMassBonus, [0.10, 0.20, 0.20])],
    },
    TalentDef {
        key: "hardened_core",
        rarity: Rarity::Rare,
        max_level: 2,
        class_id: None,
        effects: &[(ModifierKind::BiteResistPct, [0.10, 0.15, 0.15])],
    },
    TalentDef {
        key: "venom_fangs",
        rarity: Rarity::Rare,
        max_level: 2,
        class_id: None,
        effects: &[
            (ModifierKind::PoisonPctPerSec, [0.02, 0.03, 0.03]),
            (ModifierKind::PoisonDurationSec, [2.0, 2.5, 2.5]),
        ],
    },
    TalentDef {
        key: "frost_bite",
        rarity: Rarity::Rare,
        max_level: 2,
        class_id: None,
        effects: &[
            (ModifierKind::FrostSlowPct, [0.20, 0.30, 0.30]),
            (ModifierKind::FrostDurationSec, [1.5, 1.5, 1.5]),
        ],
    },
    TalentDef {
        key: "quick_reflexes",
        rarity: Rarity::Rare,
        max_level: 2,
        class_id: None,
        effects: &[(ModifierKind::CooldownReduction, [0.10, 0.20, 0.20])],
    },
    TalentDef {
        key: "vampire_strike",
        rarity: Rarity::Epic,
        max_level: 2,
        class_id: None,
        effects: &[
            (ModifierKind::VampireSideGainPct, [0.15, 0.25, 0.25]),
            (ModifierKind::VampireTailGainPct, [0.20, 0.30, 0.30]),
        ],
    },
    TalentDef {
        key: "second_wind",
        rarity: Rarity::Epic,
        max_level: 2,
        class_id: None,
        effects: &[(ModifierKind::RespawnMass, [150.0, 250.0, 250.0])],
    },
    TalentDef {
        key: "shadow_dash",
        rarity: Rarity::Epic,
        max_level: 2,
        class_id: None,
        effects: &[(ModifierKind::InvisibleDurationSec, [1.5, 2.5, 2.5])],
    },
    TalentDef {
        key: "stunning_blow",
        rarity: Rarity::Epic,
        max_level: 1,
        class_id: None,
        effects: &[(ModifierKind::StunDurationSec, [0.4, 0.4, 0.4])],
    },
    TalentDef {
        key: "thorns",
        rarity: Rarity::Rare,
        max_level: 3,
        class_id: Some(class_id::WARRIOR),
        effects: &[(ModifierKind::ThornsDamage, [0.15, 0.25, 0.35])],
    },
    TalentDef {
        key: "ambush",
        rarity: Rarity::Rare,
        max_level: 3,
        class_id: Some(class_id::HUNTER),
        effects: &[(ModifierKind::AmbushDamage, [0.20, 0.35, 0.50])],
    },
    TalentDef {
        key: "magnet_field",
        rarity: Rarity::Rare,
        max_level: 3,
        class_id: Some(class_id::COLLECTOR),
        effects: &[
            (ModifierKind::MagnetRadius, [120.0, 160.0, 200.0]),
            (ModifierKind::MagnetSpeed, [200.0, 200.0, 200.0]),
        ],
    },
    TalentDef {
        key: "parasite",
        rarity: Rarity::Epic,
        max_level: 3,
        class_id: Some(class_id::COLLECTOR),
        effects: &[(ModifierKind::ParasiteMass, [0.05, 0.10, 0.15])],
    },
];

pub fn talent_def(id: TalentId) -> Option<&'static TalentDef> {
    CATALOG.get(id.0 as usize)
}

/// Look up a talent by its stable string key
pub fn talent_id_by_key(key: &str) -> Option<TalentId> {
    static INDEX: OnceLock<FxHashMap<&'static str, TalentId>> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        CATALOG
            .iter()
            .enumerate()
            .map(|(i, def)| (def.key, TalentId(i as u16)))
            .collect()
    });
    index.get(key).copied()
}

/// Rebuild the flat modifier table from a talent list
pub fn recompute(talents: &[TalentPick]) -> Modifiers {
    let mut mods = Modifiers::default();
    for pick in talents {
        let Some(def) = talent_def(pick.id) else {
            continue;
        };
        let level_index = (pick.level.clamp(1, def.max_level) - 1) as usize;
        for (kind, per_level) in def.effects {
            mods.add(*kind, per_level[level_index.min(2)]);
        }
    }
    mods
}

/// Talents this player may still take or level up, in catalog order
pub fn available_talents(talents: &[TalentPick], player_class: u8) -> Vec<TalentId> {
    CATALOG
        .iter()
        .enumerate()
        .filter_map(|(i, def)| {
            if let Some(required) = def.class_id {
                if required != player_class {
                    return None;
                }
            }
            let current = talents
                .iter()
                .find(|p| p.id.0 as usize == i)
                .map_or(0, |p| p.level);
            if current >= def.max_level {
                return None;
            }
            Some(TalentId(i as u16))
        })
        .collect()
}

/// Rarity-weighted draw of up to `count` distinct card choices.
///
/// Consumes RNG draws, so callers must be on the deterministic simulation
/// stream.
pub fn pick_card_choices(
    talents: &[TalentPick],
    player_class: u8,
    count: usize,
    rng: &mut Rng,
) -> SmallVec<[TalentId; 3]> {
    let mut pool = available_talents(talents, player_class);
    let mut picked = SmallVec::new();

    while picked.len() < count && !pool.is_empty() {
        let total: f32 = pool
            .iter()
            .map(|id| talent_def(*id).map_or(0.0, |d| d.rarity.weight()))
            .sum();
        if total <= 0.0 {
            break;
        }
        let mut roll = rng.range(0.0, total);
        let mut chosen = pool.len() - 1;
        for (i, id) in pool.iter().enumerate() {
            let w = talent_def(*id).map_or(0.0, |d| d.rarity.weight());
            if roll < w {
                chosen = i;
                break;
            }
            roll -= w;
        }
        picked.push(pool.remove(chosen));
    }
    picked
}

/// Grant or level up a talent, returning the updated pick
pub fn take_talent(talents: &mut Vec<TalentPick>, id: TalentId) -> Option<TalentPick> {
    let def = talent_def(id)?;
    if let Some(existing) = talents.iter_mut().find(|p| p.id == id) {
        if existing.level >= def.max_level {
            return None;
        }
        existing.level += 1;
        return Some(*existing);
    }
    let pick = TalentPick { id, level: 1 };
    talents.push(pick);
    Some(pick)
}
