mod info;
mod parameter;
mod request;

pub use info::*;
pub use parameter::*;
pub use request::*;
