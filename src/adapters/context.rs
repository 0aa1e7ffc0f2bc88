use crate::{
    ComponentAdapter, ComponentKey, DynSvc, InjectError, InjectResult,
    LifecycleHooks, LifecyclePhase, LifecycleStrategy, NullLifecycleStrategy,
    SharedMonitor, Svc,
};
use std::time::Instant;

/// The monitor and lifecycle strategy of the container an adapter is
/// created for. Component factories hand this to every adapter they build.
#[derive(Clone)]
pub struct AdapterContext {
    monitor: SharedMonitor,
    strategy: Svc<dyn LifecycleStrategy>,
}

impl AdapterContext {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        monitor: SharedMonitor,
        strategy: Svc<dyn LifecycleStrategy>,
    ) -> Self {
        AdapterContext { monitor, strategy }
    }

    /// The monitor shared with the container.
    #[must_use]
    pub fn monitor(&self) -> &SharedMonitor {
        &self.monitor
    }

    /// The lifecycle strategy of the container.
    #[must_use]
    pub fn strategy(&self) -> &Svc<dyn LifecycleStrategy> {
        &self.strategy
    }

    /// Whether components with the given hooks take part in the lifecycle.
    #[must_use]
    pub fn has_lifecycle(&self, hooks: &LifecycleHooks) -> bool {
        self.strategy.has_lifecycle(hooks)
    }

    /// Invokes a lifecycle phase on a component, reporting it to the
    /// monitor. Failures are handed to the monitor, which decides whether
    /// they abort the operation.
    pub fn invoke_lifecycle(
        &self,
        key: &ComponentKey,
        hooks: &LifecycleHooks,
        phase: LifecyclePhase,
        component: &DynSvc,
    ) -> InjectResult<()> {
        let monitor = self.monitor.get();
        monitor.invoking(key, phase);
        let started = Instant::now();
        match self.strategy.invoke(phase, component, hooks) {
            Ok(()) => {
                monitor.invoked(key, phase, started.elapsed());
                Ok(())
            }
            Err(inner) => monitor.lifecycle_invocation_failed(
                key,
                phase,
                InjectError::LifecycleFailed {
                    key: key.clone(),
                    phase,
                    inner,
                },
            ),
        }
    }

    /// Reports a freshly wrapped behavior to the monitor and boxes it.
    #[must_use]
    pub fn behavior<A: ComponentAdapter>(
        &self,
        adapter: A,
    ) -> Box<dyn ComponentAdapter> {
        self.monitor.get().new_behavior(&adapter.descriptor());
        Box::new(adapter)
    }
}

impl Default for AdapterContext {
    fn default() -> Self {
        AdapterContext::new(
            SharedMonitor::default(),
            Svc::new(NullLifecycleStrategy),
        )
    }
}
