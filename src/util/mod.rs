pub mod names;
pub mod nickname;
pub mod rng;
pub mod vec2;
