mod command_line;
mod composite;
mod default;
mod empty;
mod pico;
mod registration;

pub use command_line::*;
pub use composite::*;
pub use default::*;
pub use empty::*;
pub use pico::*;
pub use registration::*;
