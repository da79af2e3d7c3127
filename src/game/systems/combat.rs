//! Bite resolution, projectile damage and the mass-conservation law.
//!
//! Every point of mass a defender loses is accounted for: it either lands on
//! the attacker or becomes scatter orbs. All clamping (Last-Breath, the
//! global mass floor) rescales gain and scatter by the same ratio so the
//! invariant survives double-clamping.

use crate::game::constants::flags;
use crate::game::modifiers::ModifierKind;
use crate::game::state::{GameState, Player, PlayerId, Projectile, ProjectileKind};
use crate::game::systems::{spawning, RoomContext, SimContext};
use crate::util::rng::Rng;
use crate::util::vec2::{wrap_angle, Vec2};

/// Angular classification of a contact point relative to facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactZone {
    Mouth,
    Tail,
    Side,
}

/// Classify where `toward` sits on `player`'s body: within the mouth arc,
/// within the tail arc, or on the side.
pub fn contact_zone(
    player: &Player,
    toward: Vec2,
    mouth_arc_deg: f32,
    tail_arc_deg: f32,
) -> ContactZone {
    let dir = toward - player.position;
    if dir.length_sq() == 0.0 {
        return ContactZone::Side;
    }
    let delta = wrap_angle(dir.angle() - player.heading).abs();
    if delta <= mouth_arc_deg.to_radians() / 2.0 {
        ContactZone::Mouth
    } else if delta >= std::f32::consts::PI - tail_arc_deg.to_radians() / 2.0 {
        ContactZone::Tail
    } else {
        ContactZone::Side
    }
}

/// What a resolved bite did, for callers and conservation checks:
/// `mass_loss == attacker_gain + scatter_mass` always holds.
#[derive(Debug, Clone, Copy)]
pub struct BiteReport {
    pub mass_loss: f32,
    pub attacker_gain: f32,
    pub scatter_mass: f32,
}

fn consume_attack(attacker: &mut Player, tick: u64, gcd_ticks: u64) {
    attacker.last_attack_tick = tick;
    attacker.gcd_ready_tick = tick + gcd_ticks;
}

/// Resolve one attacker→defender bite. Returns `None` when no damage was
/// dealt (gates failed, shield, guard).
pub fn resolve_bite(
    ctx: &mut impl SimContext,
    attacker: &mut Player,
    defender: &mut Player,
) -> Option<BiteReport> {
    let tick = ctx.tick();
    let cb = ctx.balance().combat.clone();
    let gcd_ticks = ctx.balance().server.global_cooldown_ticks;
    let attack_cd_ticks = ctx.balance().seconds_to_ticks(cb.attack_cooldown_sec);
    let invuln_ticks = ctx.balance().seconds_to_ticks(cb.damage_invuln_sec);
    let lb_ticks = ctx.balance().seconds_to_ticks(cb.last_breath_duration_sec);
    let min_mass = ctx.balance().physics.min_slime_mass;
    let a_class = ctx.balance().class_config(attacker.class_id).clone();
    let d_class = ctx.balance().class_config(defender.class_id).clone();
    let shield_reflect_pct = ctx.balance().abilities.shield.reflect_damage_pct;

    // Gates
    if attacker.is_dead() || defender.is_dead() || attacker.is_stunned(tick) {
        return None;
    }
    if attacker.last_attack_tick > 0 && tick < attacker.last_attack_tick + attack_cd_ticks {
        return None;
    }
    if tick < attacker.gcd_ready_tick {
        return None;
    }

    // Hitting an invulnerable target still costs the attack
    if defender.is_invulnerable(tick) {
        consume_attack(attacker, tick, gcd_ticks);
        return None;
    }

    let attacker_zone = contact_zone(attacker, defender.position, cb.mouth_arc_deg, cb.tail_arc_deg);
    if attacker_zone != ContactZone::Mouth {
        return None;
    }
    let defender_zone = contact_zone(defender, attacker.position, cb.mouth_arc_deg, cb.tail_arc_deg);

    // Mouth-vs-mouth is halved unless the attacker clearly outweighs the
    // defender; tail hits are punished extra
    let zone_mult = match defender_zone {
        ContactZone::Mouth => {
            if attacker.mass > defender.mass * 1.1 {
                1.0
            } else {
                0.5
            }
        }
        ContactZone::Tail => cb.tail_damage_multiplier,
        ContactZone::Side => 1.0,
    };

    let mut damage_bonus = 1.0
        + attacker.modifiers.get(ModifierKind::DamageBonus)
        + attacker.modifiers.get(ModifierKind::BiteDamageBonus);
    if defender_zone != ContactZone::Mouth {
        damage_bonus += attacker.modifiers.get(ModifierKind::AmbushDamage);
    }
    if attacker.is_last_breath() {
        damage_bonus *= cb.last_breath_damage_mult;
    }
    let damage_taken = damage_taken_multiplier(defender);
    let resist = (d_class.bite_resist_pct + defender.modifiers.get(ModifierKind::BiteResistPct))
        .min(0.5);

    let mut gain = attacker.mass
        * cb.pvp_bite_attacker_gain_pct
        * zone_mult
        * a_class.damage_mult
        * damage_bonus.max(0.0);
    let mut scatter =
        defender.mass * cb.pvp_bite_scatter_pct * zone_mult * damage_taken * (1.0 - resist);

    consume_attack(attacker, tick, gcd_ticks);

    // An active shield absorbs the hit and reflects part of the would-be loss
    if defender.has_flag(flags::ABILITY_SHIELD) && tick < defender.shield_until_tick {
        let reflected = (gain + scatter) * shield_reflect_pct;
        if reflected > 0.0 && !attacker.is_invulnerable(tick) && !ctx.try_consume_guard(attacker) {
            ctx.apply_mass_delta(attacker, -reflected);
            attacker.last_damaged_by = Some(defender.id.clone());
            attacker.last_damaged_at_tick = tick;
        }
        attacker.invisible_until_tick = 0;
        return None;
    }
    if ctx.try_consume_guard(defender) {
        attacker.invisible_until_tick = 0;
        return None;
    }

    // Vampire talents move value from scatter into gain, never past what the
    // scatter actually holds
    let vampire_pct = match defender_zone {
        ContactZone::Side => attacker.modifiers.get(ModifierKind::VampireSideGainPct),
        ContactZone::Tail => attacker.modifiers.get(ModifierKind::VampireTailGainPct),
        ContactZone::Mouth => 0.0,
    };
    if vampire_pct > 0.0 && scatter > 0.0 {
        let transferred = scatter * vampire_pct.min(1.0);
        gain += transferred;
        scatter -= transferred;
    }

    let mut mass_loss = gain + scatter;
    if mass_loss <= 0.0 {
        return None;
    }

    // Last-Breath: clamp the loss so this hit cannot cross the floor, scaling
    // gain and scatter by the same factor before anything is applied
    let mut trigger_last_breath = false;
    if defender.mass - mass_loss <= min_mass && !defender.is_last_breath() && lb_ticks > 0 {
        let max_loss = (defender.mass - min_mass).max(0.0);
        let scale = if mass_loss > 0.0 { max_loss / mass_loss } else { 0.0 };
        gain *= scale;
        scatter *= scale;
        mass_loss = max_loss;
        trigger_last_breath = true;
    }

    let actual_loss = -ctx.apply_mass_delta(defender, -mass_loss);
    if actual_loss < mass_loss && mass_loss > 0.0 {
        let ratio = actual_loss / mass_loss;
        gain *= ratio;
        scatter *= ratio;
    }
    ctx.apply_mass_delta(attacker, gain);
    defender.last_damaged_by = Some(attacker.id.clone());
    defender.last_damaged_at_tick = tick;

    // Thorns reflect a fraction of the applied loss back onto the attacker
    let thorns = defender.modifiers.get(ModifierKind::ThornsDamage);
    if thorns > 0.0 && actual_loss > 0.0 && !attacker.is_invulnerable(tick) {
        let reflected = actual_loss * thorns;
        if !ctx.try_consume_guard(attacker) {
            let applied = -ctx.apply_mass_delta(attacker, -reflected);
            if applied > 0.0 {
                let pos = attacker.position;
                spawning::spawn_scatter_orbs(
                    ctx,
                    pos,
                    applied * cb.pvp_bite_scatter_pct,
                    cb.pvp_bite_scatter_orb_count,
                    cb.pvp_bite_scatter_speed,
                );
            }
        }
    }

    // Parasite skims extra mass on top of the normal gain
    let parasite = attacker.modifiers.get(ModifierKind::ParasiteMass);
    if parasite > 0.0 && actual_loss > 0.0 {
        ctx.apply_mass_delta(attacker, actual_loss * parasite);
    }

    let defender_pos = defender.position;
    spawning::spawn_scatter_orbs(
        ctx,
        defender_pos,
        scatter,
        cb.pvp_bite_scatter_orb_count,
        cb.pvp_bite_scatter_speed,
    );

    apply_on_hit_statuses(ctx, attacker, defender);

    // Biting always drops the cloak
    attacker.invisible_until_tick = 0;

    if trigger_last_breath {
        defender.set_flag(flags::LAST_BREATH);
        defender.last_breath_end_tick = tick + lb_ticks;
        defender.invulnerable_until_tick = defender.last_breath_end_tick;
    } else {
        defender.invulnerable_until_tick =
            defender.invulnerable_until_tick.max(tick + invuln_ticks);
    }

    Some(BiteReport {
        mass_loss: actual_loss,
        attacker_gain: gain,
        scatter_mass: scatter,
    })
}

/// Poison/frost/stun land with max-stacking: a new application extends an
/// existing effect, never shortens it.
fn apply_on_hit_statuses(ctx: &mut impl SimContext, attacker: &Player, defender: &mut Player) {
    let tick = ctx.tick();
    let cfg = ctx.balance();

    let poison_pct = attacker.modifiers.get(ModifierKind::PoisonPctPerSec);
    if poison_pct > 0.0 {
        let dur = attacker.modifiers.get(ModifierKind::PoisonDurationSec);
        let until = tick + cfg.seconds_to_ticks(dur);
        defender.poison_until_tick = defender.poison_until_tick.max(until);
        defender.poison_pct_per_sec = defender.poison_pct_per_sec.max(poison_pct);
        defender.set_flag(flags::POISONED);
    }

    let frost_slow = attacker.modifiers.get(ModifierKind::FrostSlowPct);
    if frost_slow > 0.0 {
        let dur = attacker.modifiers.get(ModifierKind::FrostDurationSec);
        let until = tick + cfg.seconds_to_ticks(dur);
        defender.frost_until_tick = defender.frost_until_tick.max(until);
        defender.frost_slow_pct = defender.frost_slow_pct.max(frost_slow);
        defender.set_flag(flags::FROZEN);
    }

    let stun_sec = attacker.modifiers.get(ModifierKind::StunDurationSec);
    if stun_sec > 0.0 {
        let until = tick + cfg.seconds_to_ticks(stun_sec);
        defender.stunned_until_tick = defender.stunned_until_tick.max(until);
        defender.set_flag(flags::STUNNED);
    }
}

/// Talent-driven multiplier on all incoming damage
pub fn damage_taken_multiplier(player: &Player) -> f32 {
    (1.0 + player.modifiers.get(ModifierKind::DamageTakenBonus)
        - player.modifiers.get(ModifierKind::AllDamageReduction))
    .max(0.0)
}

/// Projectile/hazard damage: no attacker gain, the loss scatters at a reduced
/// rate (or vanishes, for environmental damage with `scatter_pct` 0).
pub fn apply_direct_damage(
    ctx: &mut impl SimContext,
    victim: &mut Player,
    damage_pct: f32,
    source: Option<&PlayerId>,
    scatter_pct: f32,
) -> f32 {
    let tick = ctx.tick();
    let cb = ctx.balance().combat.clone();
    let invuln_ticks = ctx.balance().seconds_to_ticks(cb.damage_invuln_sec);
    let lb_ticks = ctx.balance().seconds_to_ticks(cb.last_breath_duration_sec);
    let min_mass = ctx.balance().physics.min_slime_mass;

    if victim.is_dead() || victim.is_invulnerable(tick) {
        return 0.0;
    }
    if ctx.try_consume_guard(victim) {
        return 0.0;
    }

    let mut loss = victim.mass * damage_pct.max(0.0) * damage_taken_multiplier(victim);
    if loss <= 0.0 {
        return 0.0;
    }

    let mut trigger_last_breath = false;
    if victim.mass - loss <= min_mass && !victim.is_last_breath() && lb_ticks > 0 {
        loss = (victim.mass - min_mass).max(0.0);
        trigger_last_breath = true;
    }

    let actual = -ctx.apply_mass_delta(victim, -loss);
    if let Some(source) = source {
        victim.last_damaged_by = Some(source.clone());
        victim.last_damaged_at_tick = tick;
    }

    if actual > 0.0 && scatter_pct > 0.0 {
        let pos = victim.position;
        spawning::spawn_scatter_orbs(
            ctx,
            pos,
            actual * scatter_pct,
            cb.pvp_bite_scatter_orb_count,
            cb.pvp_bite_scatter_speed,
        );
    }

    if trigger_last_breath {
        victim.set_flag(flags::LAST_BREATH);
        victim.last_breath_end_tick = tick + lb_ticks;
        victim.invulnerable_until_tick = victim.last_breath_end_tick;
    } else {
        victim.invulnerable_until_tick = victim.invulnerable_until_tick.max(tick + invuln_ticks);
    }
    actual
}

/// Integrate projectiles, resolve hits, detonate bombs.
pub fn update_projectiles(
    state: &mut GameState,
    cfg: &crate::balance::ResolvedBalanceConfig,
    rng: &mut Rng,
) {
    let tick = state.tick;
    let dt = 1.0 / cfg.server.tick_rate;
    let bounds = crate::game::arena::WorldBounds::from_config(cfg);

    let ids: Vec<u64> = state.projectiles.keys().copied().collect();
    for id in ids {
        let Some(mut projectile) = state.projectiles.remove(&id) else {
            continue;
        };
        projectile.position += projectile.velocity * dt;

        let out_of_range =
            projectile.origin.distance_to(projectile.position) >= projectile.max_range;
        let out_of_world = !bounds.contains(projectile.position, 0.0);
        let fused = projectile.kind == ProjectileKind::Bomb && tick >= projectile.explode_at_tick;

        let hit_player = find_projectile_hit(state, cfg, &projectile);

        match projectile.kind {
            ProjectileKind::Bolt => {
                if let Some(victim_id) = hit_player {
                    hit_single(state, cfg, rng, &projectile, &victim_id);
                } else if !out_of_range && !out_of_world {
                    state.projectiles.insert(id, projectile);
                }
            }
            ProjectileKind::Bomb => {
                if fused || out_of_range || out_of_world || hit_player.is_some() {
                    detonate(state, cfg, rng, &projectile);
                } else {
                    state.projectiles.insert(id, projectile);
                }
            }
        }
    }
}

fn find_projectile_hit(
    state: &GameState,
    cfg: &crate::balance::ResolvedBalanceConfig,
    projectile: &Projectile,
) -> Option<PlayerId> {
    let tick = state.tick;
    state
        .players
        .values()
        .find(|p| {
            p.id != projectile.owner_id
                && !p.is_dead()
                && !p.is_invulnerable(tick)
                && p.position.distance_to(projectile.position) <= p.radius(cfg) + projectile.radius
        })
        .map(|p| p.id.clone())
}

fn hit_single(
    state: &mut GameState,
    cfg: &crate::balance::ResolvedBalanceConfig,
    rng: &mut Rng,
    projectile: &Projectile,
    victim_id: &PlayerId,
) {
    let Some(mut victim) = state.players.remove(victim_id) else {
        return;
    };
    {
        let mut ctx = RoomContext {
            state,
            cfg,
            rng,
        };
        apply_direct_damage(
            &mut ctx,
            &mut victim,
            projectile.damage_pct,
            Some(&projectile.owner_id),
            0.5,
        );
    }
    state.players.insert(victim_id.clone(), victim);
}

fn detonate(
    state: &mut GameState,
    cfg: &crate::balance::ResolvedBalanceConfig,
    rng: &mut Rng,
    projectile: &Projectile,
) {
    let tick = state.tick;
    let radius = cfg.abilities.bomb.explosion_radius;
    let victims: Vec<PlayerId> = state
        .players
        .values()
        .filter(|p| {
            p.id != projectile.owner_id
                && !p.is_dead()
                && !p.is_last_breath()
                && !p.is_invulnerable(tick)
                && p.position.distance_to(projectile.position) <= radius + p.radius(cfg)
        })
        .map(|p| p.id.clone())
        .collect();

    for victim_id in victims {
        let Some(mut victim) = state.players.remove(&victim_id) else {
            continue;
        };
        {
            let mut ctx = RoomContext {
                state,
                cfg,
                rng,
            };
            apply_direct_damage(
                &mut ctx,
                &mut victim,
                projectile.damage_pct,
                Some(&projectile.owner_id),
                0.5,
            );
        }
        state.players.insert(victim_id, victim);
    }
}
