//! Progression and lifecycle: level-ups, talent cards, death and respawn.

use std::f32::consts::TAU;

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::{class_id, flags};
use crate::game::modifiers::{self, ModifierKind, TalentPick};
use crate::game::state::{AbilityKind, AbilitySlot, GameState, Player, PlayerId};
use crate::game::systems::{spawning, RoomContext, SimContext};
use crate::util::rng::Rng;
use crate::util::vec2::Vec2;

/// How long a card offer stands before the server picks for the player
const CARD_AUTO_PICK_SEC: f32 = 10.0;

pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    process_level_ups(state, cfg, rng);
    process_deaths(state, cfg, rng);
    process_respawns(state, cfg, rng);
}

/// Mass required to go from `level` to `level + 1`. Beyond the configured
/// table the curve continues geometrically.
pub fn threshold_to_next(cfg: &ResolvedBalanceConfig, level: u32) -> f32 {
    let table = &cfg.slime.level_thresholds;
    if table.is_empty() {
        return f32::INFINITY;
    }
    let idx = level.saturating_sub(1) as usize;
    if idx < table.len() {
        table[idx]
    } else {
        let last = table[table.len() - 1];
        last * 1.5_f32.powi((idx - table.len() + 1) as i32)
    }
}

fn class_ability(class: u8) -> AbilityKind {
    match class {
        class_id::WARRIOR => AbilityKind::Shield,
        class_id::COLLECTOR => AbilityKind::Magnet,
        _ => AbilityKind::Dash,
    }
}

fn slot_kind_for_index(class: u8, index: usize) -> AbilityKind {
    match index {
        0 => class_ability(class),
        1 => AbilityKind::Bolt,
        _ => AbilityKind::Bomb,
    }
}

/// Grant everything a player at `level` is entitled to: ability slots and
/// pending talent cards. Used at join (level 1 unlocks) and on level-up.
fn grant_unlocks(player: &mut Player, cfg: &ResolvedBalanceConfig, level: u32) {
    if cfg.slime.slot_unlock_levels.contains(&level) && player.slots.len() < 3 {
        let kind = slot_kind_for_index(player.class_id, player.slots.len());
        player.slots.push(AbilitySlot {
            kind,
            ready_tick: 0,
        });
    }
    if cfg.slime.talent_grant_levels.contains(&level) {
        player.pending_card_slots += 1;
    }
}

/// Initial slot grants for a freshly joined player
pub fn init_unlocks(player: &mut Player, cfg: &ResolvedBalanceConfig) {
    for level in 0..=player.level {
        grant_unlocks(player, cfg, level);
    }
}

fn process_level_ups(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let state_tick = state.tick;
    let auto_pick_ticks = cfg.seconds_to_ticks(CARD_AUTO_PICK_SEC).max(1);
    for player in state.players.values_mut() {
        if player.is_dead() {
            continue;
        }
        while player.mass >= threshold_to_next(cfg, player.level) {
            player.level += 1;
            grant_unlocks(player, cfg, player.level);
        }
        if player.pending_card_slots > 0 && player.offered_cards.is_empty() {
            player.offered_cards =
                modifiers::pick_card_choices(&player.talents, player.class_id, 3, rng);
            if player.offered_cards.is_empty() {
                // Nothing left to offer; burn the slot
                player.pending_card_slots -= 1;
            } else {
                player.card_offer_tick = state_tick;
            }
        }
        // Expired offers resolve themselves, favouring the class talent
        if !player.offered_cards.is_empty()
            && state_tick >= player.card_offer_tick + auto_pick_ticks
        {
            let index = player
                .offered_cards
                .iter()
                .position(|&id| {
                    modifiers::talent_def(id)
                        .map(|d| d.class_id == Some(player.class_id))
                        .unwrap_or(false)
                })
                .unwrap_or(0);
            apply_talent_choice(player, index as u8);
        }
    }
}

/// Resolve a player's pick from their offered cards. Out-of-range picks
/// leave the offer standing.
pub fn apply_talent_choice(player: &mut Player, choice_index: u8) {
    let Some(&id) = player.offered_cards.get(choice_index as usize) else {
        return;
    };
    let max_level = modifiers::talent_def(id).map(|d| d.max_level).unwrap_or(1);
    let level = match modifiers::take_talent(&mut player.talents, id) {
        Some(existing) => (existing.level + 1).min(max_level),
        None => 1,
    };
    player.talents.push(TalentPick { id, level });
    player.modifiers = modifiers::recompute(&player.talents);
    player.pending_card_slots = player.pending_card_slots.saturating_sub(1);
    player.offered_cards.clear();
}

fn process_deaths(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let tick = state.tick;
    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        let Some(mut player) = state.players.remove(id) else {
            continue;
        };
        if !(player.is_dead() && player.respawn_at_tick == 0) {
            state.players.insert(id.clone(), player);
            continue;
        }

        let victim_mass = player.mass;
        let victim_pos = player.position;
        {
            let mut ctx = RoomContext {
                state,
                cfg,
                rng,
            };
            spawning::spawn_scatter_orbs(
                &mut ctx,
                victim_pos,
                victim_mass * cfg.death.mass_to_orbs_percent,
                cfg.death.orbs_count,
                cfg.combat.pvp_bite_scatter_speed,
            );
        }

        if let Some(killer_id) = player.last_damaged_by.clone() {
            if let Some(mut killer) = state.players.remove(&killer_id) {
                if !killer.is_dead() {
                    killer.kill_count += 1;
                    let bounty = victim_mass
                        * cfg.combat.pvp_bite_attacker_gain_pct
                        * (1.0 + killer.modifiers.get(ModifierKind::KillMassBonus));
                    let mut ctx = RoomContext {
                        state,
                        cfg,
                        rng,
                    };
                    ctx.apply_mass_delta(&mut killer, bounty);
                }
                state.players.insert(killer_id, killer);
            }
        }

        player.respawn_at_tick = tick + cfg.seconds_to_ticks(cfg.death.respawn_delay_sec).max(1);
        player.velocity = Vec2::ZERO;
        player.input = Vec2::ZERO;
        state.players.insert(id.clone(), player);
    }
}

fn process_respawns(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let tick = state.tick;
    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        let Some(mut player) = state.players.remove(id) else {
            continue;
        };
        if !(player.is_dead() && player.respawn_at_tick != 0 && tick >= player.respawn_at_tick) {
            state.players.insert(id.clone(), player);
            continue;
        }

        let retained = player.mass * (1.0 - cfg.death.mass_lost_percent);
        let floor = cfg
            .death
            .min_respawn_mass
            .max(player.modifiers.get(ModifierKind::RespawnMass));
        player.mass = retained.max(floor);

        player.position = spawning::find_spawn_point(state, cfg, rng, player.radius(cfg));
        player.velocity = Vec2::ZERO;
        player.heading = rng.range(0.0, TAU);
        player.input = Vec2::ZERO;

        player.flags = 0;
        player.set_flag(flags::RESPAWN_SHIELD);
        player.invulnerable_until_tick =
            tick + cfg.seconds_to_ticks(cfg.combat.respawn_shield_sec);
        player.last_breath_end_tick = 0;
        player.poison_until_tick = 0;
        player.poison_pct_per_sec = 0.0;
        player.frost_until_tick = 0;
        player.frost_slow_pct = 0.0;
        player.stunned_until_tick = 0;
        player.invisible_until_tick = 0;
        player.drift_until_tick = 0;
        player.drift_ready_tick = 0;
        player.dash_until_tick = 0;
        player.shield_until_tick = 0;
        player.magnet_until_tick = 0;
        player.last_attack_tick = 0;
        player.gcd_ready_tick = tick;
        player.respawn_at_tick = 0;
        player.last_damaged_by = None;

        state.players.insert(id.clone(), player);
    }
}
