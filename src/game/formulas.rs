//! Mass-driven growth curves.
//!
//! Every derived stat uses a logarithmic curve so that growth never stops but
//! flattens hard: doubling mass always helps, never doubles power.

use crate::balance::{FormulaConfig, MovementConfig, OrbsConfig};

/// `base + scale * ln(1 + mass / divisor)` - hit points and bite damage
#[inline]
pub fn log_stat(cfg: &FormulaConfig, mass: f32) -> f32 {
    cfg.base + cfg.scale * (1.0 + mass / cfg.divisor).ln()
}

/// `base / (1 + scale * ln(1 + mass / divisor))` - speed multiplier, shrinks
/// with mass but never reaches zero
#[inline]
pub fn speed_multiplier(cfg: &FormulaConfig, mass: f32) -> f32 {
    cfg.base / (1.0 + cfg.scale * (1.0 + mass / cfg.divisor).ln())
}

/// `base * sqrt(1 + scale * ln(1 + mass / divisor))` - body radius
#[inline]
pub fn slime_radius(cfg: &FormulaConfig, mass: f32) -> f32 {
    cfg.base * (1.0 + cfg.scale * (1.0 + mass / cfg.divisor).ln()).sqrt()
}

/// Turn rate in degrees per second; heavier slimes steer slower
#[inline]
pub fn turn_rate_deg(movement: &MovementConfig, mass: f32) -> f32 {
    movement.base_turn_rate_deg / (1.0 + (1.0 + mass / movement.turn_divisor).ln())
}

/// Orb radius from mass and type density, floored at the configured minimum
#[inline]
pub fn orb_radius(orbs: &OrbsConfig, mass: f32, density: f32) -> f32 {
    if density <= 0.0 {
        return orbs.min_radius;
    }
    orbs.min_radius.max(orbs.min_radius * (mass / density).sqrt())
}
