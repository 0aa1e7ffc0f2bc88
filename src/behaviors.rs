/// Forwards the identity of a behavior adapter to the adapter it wraps. The
/// type must have a `delegate: Box<dyn ComponentAdapter>` field.
macro_rules! delegate_adapter {
    () => {
        fn key(&self) -> &$crate::ComponentKey {
            self.delegate.key()
        }

        fn implementation(&self) -> $crate::ServiceInfo {
            self.delegate.implementation()
        }

        fn interfaces(&self) -> &$crate::Interfaces {
            self.delegate.interfaces()
        }

        fn delegate(&self) -> Option<&dyn $crate::ComponentAdapter> {
            Some(self.delegate.as_ref())
        }
    };
}

/// Implements [`Behavior`](crate::Behavior) for a factory with a
/// `delegate: Box<dyn ComponentFactory>` field.
macro_rules! behavior_factory {
    ($factory:ty) => {
        impl $crate::Behavior for $factory {
            fn wrap(
                mut self: Box<Self>,
                delegate: Box<dyn $crate::ComponentFactory>,
            ) -> Box<dyn $crate::ComponentFactory> {
                self.delegate = delegate;
                self
            }
        }
    };
}

mod automated;
mod cached;
mod guarded;
mod hidden;
mod hot_swap;
mod locked;
mod pooled;
pub(crate) mod stored;
mod synchronized;
mod thread_cached;

pub use automated::*;
pub use cached::*;
pub use guarded::*;
pub use hidden::*;
pub use hot_swap::*;
pub use locked::*;
pub use pooled::*;
pub use synchronized::*;
pub use thread_cached::*;
