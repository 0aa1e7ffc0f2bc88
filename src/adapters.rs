mod adapter;
mod context;
mod injector;
mod instance;
mod spec;

pub use adapter::*;
pub use context::*;
pub use injector::*;
pub use instance::*;
pub use spec::*;
