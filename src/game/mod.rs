pub mod arena;
pub mod constants;
pub mod formulas;
pub mod input_buffer;
pub mod modifiers;
pub mod room;
pub mod snapshot;
pub mod state;
pub mod systems;
