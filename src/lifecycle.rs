mod hooks;
mod state;
mod strategy;

pub use hooks::*;
pub use state::*;
pub use strategy::*;
