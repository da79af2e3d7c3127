//! Slime Arena Server Library
//!
//! An authoritative real-time arena game server: deterministic fixed-timestep
//! simulation, mass-conserving combat, seeded arena generation and match
//! phase control. Rooms are independent simulations driven by a tokio
//! interval; everything inside a room is reproducible from its seed and
//! input stream.

pub mod balance;
pub mod config;
pub mod game;
pub mod util;
