mod dot;
mod lifecycle;
mod logging;
mod monitor;

pub use dot::*;
pub use lifecycle::*;
pub use logging::*;
pub use monitor::*;
