//! Eating: orb bites and chest cracking, both gated by the shared bite
//! cooldown and the mouth arc.

use crate::balance::ResolvedBalanceConfig;
use crate::game::modifiers::ModifierKind;
use crate::game::state::{EntityId, GameState, Player, PlayerId};
use crate::game::systems::combat::{contact_zone, ContactZone};
use crate::game::systems::{spawning, RoomContext, SimContext};
use crate::util::rng::Rng;

pub fn update(state: &mut GameState, cfg: &ResolvedBalanceConfig, rng: &mut Rng) {
    let ids: Vec<PlayerId> = state.players.keys().cloned().collect();
    for id in &ids {
        let Some(mut player) = state.players.remove(id) else {
            continue;
        };
        if !player.is_dead() {
            let bit = feed_chests(state, cfg, rng, &mut player);
            if !bit {
                feed_orbs(state, cfg, rng, &mut player);
            }
        }
        state.players.insert(id.clone(), player);
    }
}

/// Bite the first orb (in id order) touching the player's mouth. Returns
/// whether a bite happened, consumed or not.
fn feed_orbs(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    player: &mut Player,
) -> bool {
    let tick = state.tick;
    if tick < player.gcd_ready_tick {
        return false;
    }

    let player_radius = player.radius(cfg);
    let target: Option<EntityId> = state
        .orbs
        .values()
        .find(|orb| {
            player.position.distance_to(orb.position) <= player_radius + orb.radius(cfg)
                && contact_zone(
                    player,
                    orb.position,
                    cfg.combat.mouth_arc_deg,
                    cfg.combat.tail_arc_deg,
                ) == ContactZone::Mouth
        })
        .map(|orb| orb.id);
    let Some(orb_id) = target else {
        return false;
    };

    // Latching on costs the cooldown whether or not any mass comes off
    player.gcd_ready_tick = tick + cfg.seconds_to_ticks(cfg.combat.bite_cooldown_sec);

    let (orb_mass, consumed) = {
        let Some(orb) = state.orbs.get_mut(&orb_id) else {
            return true;
        };
        if orb.mass < cfg.orbs.bite_min_mass {
            // Too small to get a grip on
            return true;
        }
        let threshold = player.mass.min(cfg.orbs.bite_max_mass)
            * cfg.slime.orb_bite_pct_of_mass
            * cfg.class_config(player.class_id).eating_power_mult;

        if orb.mass <= threshold {
            (orb.mass, true)
        } else {
            let remainder = orb.mass - threshold;
            if remainder < cfg.orbs.bite_min_mass {
                // Never leave behind a crumb nobody could ever eat
                (orb.mass, true)
            } else {
                orb.mass = remainder;
                (threshold, false)
            }
        }
    };
    if consumed {
        state.orbs.remove(&orb_id);
    }

    let gain = orb_mass * (1.0 + player.modifiers.get(ModifierKind::OrbMassBonus));
    let mut ctx = RoomContext {
        state,
        cfg,
        rng,
    };
    ctx.apply_mass_delta(player, gain);
    true
}

/// Bite a chest touching the mouth: armor rings soak bites for free, then
/// the chest's pool drains by the player's bite damage until it cracks.
/// Returns whether a chest was bitten.
fn feed_chests(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    rng: &mut Rng,
    player: &mut Player,
) -> bool {
    let tick = state.tick;
    if tick < player.gcd_ready_tick {
        return false;
    }

    let player_radius = player.radius(cfg);
    let target: Option<EntityId> = state
        .chests
        .values()
        .find(|chest| {
            player.position.distance_to(chest.position) <= player_radius + chest.radius
                && contact_zone(
                    player,
                    chest.position,
                    cfg.combat.mouth_arc_deg,
                    cfg.combat.tail_arc_deg,
                ) == ContactZone::Mouth
        })
        .map(|chest| chest.id);
    let Some(chest_id) = target else {
        return false;
    };

    player.gcd_ready_tick = tick + cfg.seconds_to_ticks(cfg.combat.bite_cooldown_sec);

    let destroyed = {
        let Some(chest) = state.chests.get_mut(&chest_id) else {
            return true;
        };
        if chest.armor_rings > 0 {
            chest.armor_rings -= 1;
            return true;
        }
        let damage = crate::game::formulas::log_stat(&cfg.formulas.damage, player.mass);
        chest.remaining_mass -= damage;
        chest.remaining_mass <= 0.0
    };
    if !destroyed {
        return true;
    }

    let position = state
        .chests
        .remove(&chest_id)
        .map(|c| c.position)
        .unwrap_or(player.position);

    let reward_pct = if cfg.chests.reward_mass_percent.is_empty() {
        0.0
    } else {
        let i = rng.pick_index(cfg.chests.reward_mass_percent.len());
        cfg.chests.reward_mass_percent[i]
    };
    let reward = cfg.chests.mass * reward_pct;
    let talent_roll = rng.next();

    let mut ctx = RoomContext {
        state,
        cfg,
        rng,
    };
    if reward > 0.0 {
        ctx.apply_mass_delta(player, reward);
    }
    if talent_roll < cfg.chests.reward_talent_chance {
        player.pending_card_slots += 1;
    }

    // The pool mass the opener did not take spills onto the floor
    let spill = (cfg.chests.mass - reward).max(0.0);
    spawning::spawn_scatter_orbs(
        &mut ctx,
        position,
        spill,
        cfg.death.orbs_count,
        cfg.combat.pvp_bite_scatter_speed,
    );
    true
}
