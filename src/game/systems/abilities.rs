//! Ability activation: dash, shield, magnet, bolt, bomb.

use crate::balance::ResolvedBalanceConfig;
use crate::game::constants::flags;
use crate::game::modifiers::ModifierKind;
use crate::game::state::{AbilityKind, GameState, Player, Projectile, ProjectileKind};
use crate::util::vec2::Vec2;

/// Try to fire the ability in `slot_index`. Returns whether it went off.
///
/// Activation pays a mass cost up front and shares the global cooldown with
/// bites, so a slime cannot chain an ability into an instant attack.
pub fn try_activate(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    player: &mut Player,
    slot_index: u8,
) -> bool {
    let tick = state.tick;
    if player.is_dead() || player.is_stunned(tick) {
        return false;
    }
    if tick < player.gcd_ready_tick {
        return false;
    }
    let Some(slot) = player.slots.get(slot_index as usize).copied() else {
        return false;
    };
    if tick < slot.ready_tick {
        return false;
    }

    let (cooldown_sec, cost_pct) = match slot.kind {
        AbilityKind::Dash => (cfg.abilities.dash.cooldown_sec, cfg.abilities.dash.cost_pct),
        AbilityKind::Shield => (
            cfg.abilities.shield.cooldown_sec,
            cfg.abilities.shield.cost_pct,
        ),
        AbilityKind::Magnet => (
            cfg.abilities.magnet.cooldown_sec,
            cfg.abilities.magnet.cost_pct,
        ),
        AbilityKind::Bolt => (
            cfg.abilities.projectile.cooldown_sec,
            cfg.abilities.projectile.cost_pct,
        ),
        AbilityKind::Bomb => (cfg.abilities.bomb.cooldown_sec, cfg.abilities.bomb.cost_pct),
    };

    // The cost must not push the slime onto the floor
    let cost = player.mass * cost_pct;
    if player.mass - cost <= cfg.physics.min_slime_mass {
        return false;
    }

    match slot.kind {
        AbilityKind::Dash => {
            player.dash_until_tick = tick + cfg.seconds_to_ticks(cfg.abilities.dash.duration_sec);
            player.set_flag(flags::ABILITY_DASH);
            let cloak_sec = player.modifiers.get(ModifierKind::InvisibleDurationSec);
            if cloak_sec > 0.0 {
                player.invisible_until_tick = tick + cfg.seconds_to_ticks(cloak_sec);
            }
        }
        AbilityKind::Shield => {
            player.shield_until_tick =
                tick + cfg.seconds_to_ticks(cfg.abilities.shield.duration_sec);
            player.set_flag(flags::ABILITY_SHIELD);
        }
        AbilityKind::Magnet => {
            player.magnet_until_tick =
                tick + cfg.seconds_to_ticks(cfg.abilities.magnet.duration_sec);
            player.set_flag(flags::ABILITY_MAGNET);
        }
        AbilityKind::Bolt => {
            spawn_projectile(state, cfg, player, ProjectileKind::Bolt);
        }
        AbilityKind::Bomb => {
            spawn_projectile(state, cfg, player, ProjectileKind::Bomb);
        }
    }

    player.mass -= cost;

    // Only dashing keeps the cloak up
    if slot.kind != AbilityKind::Dash {
        player.invisible_until_tick = 0;
    }

    let reduction = player
        .modifiers
        .get(ModifierKind::CooldownReduction)
        .min(0.8);
    let slot = &mut player.slots[slot_index as usize];
    slot.ready_tick = tick + cfg.seconds_to_ticks(cooldown_sec * (1.0 - reduction));
    player.gcd_ready_tick = tick + cfg.server.global_cooldown_ticks;
    true
}

fn spawn_projectile(
    state: &mut GameState,
    cfg: &ResolvedBalanceConfig,
    player: &Player,
    kind: ProjectileKind,
) {
    let (speed, damage_pct, radius, max_range, fuse_sec) = match kind {
        ProjectileKind::Bolt => {
            let p = &cfg.abilities.projectile;
            (p.speed, p.damage_pct, p.radius, p.max_range, 0.0)
        }
        ProjectileKind::Bomb => {
            let b = &cfg.abilities.bomb;
            // Bombs fly until the fuse runs out, never past it
            (b.speed, b.damage_pct, b.radius, b.speed * b.fuse_sec, b.fuse_sec)
        }
    };

    let forward = Vec2::from_angle(player.heading);
    let origin = player.position + forward * (player.radius(cfg) + radius);
    let id = state.alloc_entity_id();
    state.projectiles.insert(
        id,
        Projectile {
            id,
            owner_id: player.id.clone(),
            kind,
            position: origin,
            velocity: forward * speed,
            radius,
            damage_pct,
            origin,
            max_range,
            explode_at_tick: state.tick + cfg.seconds_to_ticks(fuse_sec),
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::modifiers::{Modifiers, ModifierKind};
    use crate::game::state::AbilitySlot;

    fn setup() -> (GameState, ResolvedBalanceConfig) {
        let mut state = GameState::new();
        state.tick = 100;
        (state, ResolvedBalanceConfig::default())
    }

    fn player_with(cfg: &ResolvedBalanceConfig, kind: AbilityKind) -> Player {
        let mut p = Player::new("p1".to_string(), "T".to_string(), cfg);
        p.mass = 500.0;
        p.slots.push(AbilitySlot {
            kind,
            ready_tick: 0,
        });
        p
    }

    #[test]
    fn test_dash_sets_flag_and_pays_cost() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Dash);
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        assert!(p.has_flag(flags::ABILITY_DASH));
        assert!(p.dash_until_tick > 100);
        assert!((p.mass - 500.0 * (1.0 - cfg.abilities.dash.cost_pct)).abs() < 1e-3);
        assert!(p.slots[0].ready_tick > 100);
        assert!(p.gcd_ready_tick > 100);
    }

    #[test]
    fn test_cooldown_blocks_reactivation() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Shield);
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        state.tick += 1;
        // Both the slot cooldown and the GCD are still running
        assert!(!try_activate(&mut state, &cfg, &mut p, 0));
    }

    #[test]
    fn test_cost_cannot_cross_mass_floor() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Dash);
        p.mass = cfg.physics.min_slime_mass + 0.1;
        assert!(!try_activate(&mut state, &cfg, &mut p, 0));
        assert_eq!(p.mass, cfg.physics.min_slime_mass + 0.1);
    }

    #[test]
    fn test_bolt_spawns_projectile_ahead() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Bolt);
        p.heading = 0.0;
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        assert_eq!(state.projectiles.len(), 1);
        let projectile = state.projectiles.values().next().unwrap();
        assert_eq!(projectile.kind, ProjectileKind::Bolt);
        assert!(projectile.position.x > p.radius(&cfg) - 1.0);
        assert!(projectile.velocity.x > 0.0);
    }

    #[test]
    fn test_bomb_gets_a_fuse() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Bomb);
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        let projectile = state.projectiles.values().next().unwrap();
        assert_eq!(projectile.kind, ProjectileKind::Bomb);
        assert_eq!(
            projectile.explode_at_tick,
            100 + cfg.seconds_to_ticks(cfg.abilities.bomb.fuse_sec)
        );
    }

    #[test]
    fn test_cooldown_reduction_shortens_recovery() {
        let (mut state, cfg) = setup();
        let mut plain = player_with(&cfg, AbilityKind::Dash);
        try_activate(&mut state, &cfg, &mut plain, 0);

        let mut quick = player_with(&cfg, AbilityKind::Dash);
        let mut mods = Modifiers::default();
        mods.add(ModifierKind::CooldownReduction, 0.3);
        quick.modifiers = mods;
        try_activate(&mut state, &cfg, &mut quick, 0);

        assert!(quick.slots[0].ready_tick < plain.slots[0].ready_tick);
    }

    #[test]
    fn test_dash_cloaks_with_the_right_talent() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Dash);
        let mut mods = Modifiers::default();
        mods.add(ModifierKind::InvisibleDurationSec, 1.5);
        p.modifiers = mods;
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        assert!(p.is_invisible(state.tick));
        assert_eq!(p.invisible_until_tick, 100 + cfg.seconds_to_ticks(1.5));
    }

    #[test]
    fn test_dash_without_talent_stays_visible() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Dash);
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        assert!(!p.is_invisible(state.tick));
    }

    #[test]
    fn test_non_dash_ability_drops_cloak() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Shield);
        p.invisible_until_tick = 1_000;
        assert!(try_activate(&mut state, &cfg, &mut p, 0));
        assert_eq!(p.invisible_until_tick, 0);
    }

    #[test]
    fn test_stunned_player_cannot_activate() {
        let (mut state, cfg) = setup();
        let mut p = player_with(&cfg, AbilityKind::Dash);
        p.stunned_until_tick = 200;
        assert!(!try_activate(&mut state, &cfg, &mut p, 0));
    }

    #[test]
    fn test_missing_slot_is_rejected() {
        let (mut state, cfg) = setup();
        let mut p = Player::new("p1".to_string(), "T".to_string(), &cfg);
        p.mass = 500.0;
        assert!(!try_activate(&mut state, &cfg, &mut p, 0));
    }
}
