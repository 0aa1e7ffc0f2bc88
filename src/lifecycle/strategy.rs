use crate::{BoxError, DynSvc, LifecycleHooks, LifecyclePhase, Service};

/// Decides how, and whether, the lifecycle methods of components are
/// invoked.
pub trait LifecycleStrategy: Service {
    /// Invokes a lifecycle phase on a component.
    fn invoke(
        &self,
        phase: LifecyclePhase,
        component: &DynSvc,
        hooks: &LifecycleHooks,
    ) -> Result<(), BoxError>;

    /// Whether components with the given hooks take part in the lifecycle.
    fn has_lifecycle(&self, hooks: &LifecycleHooks) -> bool;

    /// Whether components should be started on first use rather than when
    /// the container starts.
    fn is_lazy(&self) -> bool {
        false
    }
}

/// Invokes the [`Startable`](crate::Startable) and
/// [`Disposable`](crate::Disposable) methods captured at registration.
#[derive(Clone, Copy, Default, Debug)]
pub struct StartableLifecycleStrategy {
    lazy: bool,
}

impl StartableLifecycleStrategy {
    /// Creates a strategy which starts components with their container.
    #[must_use]
    pub fn new() -> Self {
        StartableLifecycleStrategy::default()
    }

    /// Creates a strategy which starts components when they are first
    /// resolved from a started container.
    #[must_use]
    pub fn lazy() -> Self {
        StartableLifecycleStrategy { lazy: true }
    }
}

impl LifecycleStrategy for StartableLifecycleStrategy {
    fn invoke(
        &self,
        phase: LifecyclePhase,
        component: &DynSvc,
        hooks: &LifecycleHooks,
    ) -> Result<(), BoxError> {
        hooks.invoke(phase, component)
    }

    fn has_lifecycle(&self, hooks: &LifecycleHooks) -> bool {
        !hooks.is_empty()
    }

    fn is_lazy(&self) -> bool {
        self.lazy
    }
}

/// Ignores every lifecycle method.
#[derive(Clone, Copy, Default, Debug)]
pub struct NullLifecycleStrategy;

impl LifecycleStrategy for NullLifecycleStrategy {
    fn invoke(
        &self,
        _phase: LifecyclePhase,
        _component: &DynSvc,
        _hooks: &LifecycleHooks,
    ) -> Result<(), BoxError> {
        Ok(())
    }

    fn has_lifecycle(&self, _hooks: &LifecycleHooks) -> bool {
        false
    }
}
