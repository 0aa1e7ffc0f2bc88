use crate::{BoxError, DynSvc, Service};
use derive_more::Display;

/// A component which takes part in the start and stop phases of its
/// container.
///
/// ## Example
///
/// ```
/// use pico_container::{BoxError, Startable};
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Server {
///     running: AtomicBool,
/// }
///
/// impl Startable for Server {
///     fn start(&self) -> Result<(), BoxError> {
///         self.running.store(true, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn stop(&self) -> Result<(), BoxError> {
///         self.running.store(false, Ordering::SeqCst);
///         Ok(())
///     }
/// }
/// ```
pub trait Startable: Service {
    /// Called when the container starts, or on first use with a lazy
    /// lifecycle strategy.
    fn start(&self) -> Result<(), BoxError>;

    /// Called when the container stops.
    fn stop(&self) -> Result<(), BoxError>;
}

/// A component which releases resources when its container is disposed.
pub trait Disposable: Service {
    /// Called when the container is disposed.
    fn dispose(&self) -> Result<(), BoxError>;
}

/// A phase of a component's lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Display)]
pub enum LifecyclePhase {
    /// The component is starting.
    #[display(fmt = "start")]
    Start,

    /// The component is stopping.
    #[display(fmt = "stop")]
    Stop,

    /// The component is being disposed.
    #[display(fmt = "dispose")]
    Dispose,
}

type Hook = fn(&DynSvc) -> Result<(), BoxError>;

/// The lifecycle methods of a component type, captured when the component is
/// registered.
#[derive(Clone, Copy, Default, Debug)]
pub struct LifecycleHooks {
    start: Option<Hook>,
    stop: Option<Hook>,
    dispose: Option<Hook>,
}

impl LifecycleHooks {
    /// Creates hooks for a component with no lifecycle.
    #[must_use]
    pub fn new() -> Self {
        LifecycleHooks::default()
    }

    /// Adds the [`Startable`] methods of `T`.
    #[must_use]
    pub fn startable<T: Startable>(mut self) -> Self {
        self.start = Some(start_hook::<T>);
        self.stop = Some(stop_hook::<T>);
        self
    }

    /// Adds the [`Disposable`] method of `T`.
    #[must_use]
    pub fn disposable<T: Disposable>(mut self) -> Self {
        self.dispose = Some(dispose_hook::<T>);
        self
    }

    /// Whether any lifecycle method was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && self.dispose.is_none()
    }

    /// Whether a method was captured for the given phase.
    #[must_use]
    pub fn has(&self, phase: LifecyclePhase) -> bool {
        self.hook(phase).is_some()
    }

    /// Invokes the method captured for a phase. Components of another type
    /// and phases without a method are ignored.
    pub fn invoke(
        &self,
        phase: LifecyclePhase,
        component: &DynSvc,
    ) -> Result<(), BoxError> {
        match self.hook(phase) {
            Some(hook) => hook(component),
            None => Ok(()),
        }
    }

    fn hook(&self, phase: LifecyclePhase) -> Option<Hook> {
        match phase {
            LifecyclePhase::Start => self.start,
            LifecyclePhase::Stop => self.stop,
            LifecyclePhase::Dispose => self.dispose,
        }
    }
}

fn start_hook<T: Startable>(component: &DynSvc) -> Result<(), BoxError> {
    component.downcast_ref::<T>().map_or(Ok(()), Startable::start)
}

fn stop_hook<T: Startable>(component: &DynSvc) -> Result<(), BoxError> {
    component.downcast_ref::<T>().map_or(Ok(()), Startable::stop)
}

fn dispose_hook<T: Disposable>(component: &DynSvc) -> Result<(), BoxError> {
    component.downcast_ref::<T>().map_or(Ok(()), Disposable::dispose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Svc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        starts: AtomicUsize,
        disposals: AtomicUsize,
    }

    impl Startable for Counter {
        fn start(&self) -> Result<(), BoxError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) -> Result<(), BoxError> {
            Err("cannot stop".into())
        }
    }

    impl Disposable for Counter {
        fn dispose(&self) -> Result<(), BoxError> {
            self.disposals.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn hooks_call_the_captured_methods() {
        let counter = Svc::new(Counter::default());
        let component: DynSvc = counter.clone();
        let hooks = LifecycleHooks::new().startable::<Counter>();

        hooks.invoke(LifecyclePhase::Start, &component).unwrap();
        assert!(hooks.invoke(LifecyclePhase::Stop, &component).is_err());
        hooks.invoke(LifecyclePhase::Dispose, &component).unwrap();

        assert_eq!(1, counter.starts.load(Ordering::SeqCst));
        assert_eq!(0, counter.disposals.load(Ordering::SeqCst));
        assert!(!hooks.has(LifecyclePhase::Dispose));
    }

    #[test]
    fn hooks_ignore_other_types() {
        let component: DynSvc = Svc::new(5_i32);
        let hooks = LifecycleHooks::new()
            .startable::<Counter>()
            .disposable::<Counter>();

        hooks.invoke(LifecyclePhase::Stop, &component).unwrap();
        assert!(!hooks.is_empty());
        assert!(LifecycleHooks::new().is_empty());
    }
}
