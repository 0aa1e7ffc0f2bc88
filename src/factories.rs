mod adapting;
mod factory;
mod injection;

pub use adapting::*;
pub use factory::*;
pub use injection::*;
