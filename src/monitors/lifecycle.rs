use crate::{
    ComponentKey, ComponentMonitor, InjectError, InjectResult, LifecyclePhase,
    NullComponentMonitor, ServiceInfo, Svc,
};
use parking_lot::Mutex;
use std::time::Duration;

/// Collects lifecycle failures instead of aborting on the first one. After
/// the container finishes a lifecycle operation, [`rethrow_failures`]
/// reports everything that went wrong at once.
///
/// [`rethrow_failures`]: LifecycleComponentMonitor::rethrow_failures
pub struct LifecycleComponentMonitor {
    delegate: Svc<dyn ComponentMonitor>,
    failures: Mutex<Vec<InjectError>>,
}

impl LifecycleComponentMonitor {
    /// Creates a monitor which forwards other events nowhere.
    #[must_use]
    pub fn new() -> Self {
        LifecycleComponentMonitor::wrapping(Svc::new(NullComponentMonitor))
    }

    /// Creates a monitor which forwards events to `delegate`.
    #[must_use]
    pub fn wrapping(delegate: Svc<dyn ComponentMonitor>) -> Self {
        LifecycleComponentMonitor {
            delegate,
            failures: Mutex::new(Vec::new()),
        }
    }

    /// The number of failures collected so far.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.lock().len()
    }

    /// Returns every collected failure as a single error, or `Ok` if nothing
    /// failed. The collected failures are cleared.
    pub fn rethrow_failures(&self) -> InjectResult<()> {
        let failures = std::mem::take(&mut *self.failures.lock());
        if failures.is_empty() {
            Ok(())
        } else {
            Err(InjectError::LifecycleFailures { failures })
        }
    }
}

impl Default for LifecycleComponentMonitor {
    fn default() -> Self {
        LifecycleComponentMonitor::new()
    }
}

impl ComponentMonitor for LifecycleComponentMonitor {
    fn instantiating(&self, key: &ComponentKey, implementation: ServiceInfo) {
        self.delegate.instantiating(key, implementation);
    }

    fn instantiated(
        &self,
        key: &ComponentKey,
        implementation: ServiceInfo,
        injected: &[ServiceInfo],
        duration: Duration,
    ) {
        self.delegate
            .instantiated(key, implementation, injected, duration);
    }

    fn instantiation_failed(
        &self,
        key: &ComponentKey,
        implementation: ServiceInfo,
        error: &InjectError,
    ) {
        self.delegate.instantiation_failed(key, implementation, error);
    }

    fn invoking(&self, key: &ComponentKey, phase: LifecyclePhase) {
        self.delegate.invoking(key, phase);
    }

    fn invoked(
        &self,
        key: &ComponentKey,
        phase: LifecyclePhase,
        duration: Duration,
    ) {
        self.delegate.invoked(key, phase, duration);
    }

    fn lifecycle_invocation_failed(
        &self,
        key: &ComponentKey,
        phase: LifecyclePhase,
        error: InjectError,
    ) -> InjectResult<()> {
        // Failures the delegate swallows are not collected.
        if let Err(error) =
            self.delegate.lifecycle_invocation_failed(key, phase, error)
        {
            self.failures.lock().push(error);
        }
        Ok(())
    }

    fn no_component_found(&self, key: &ComponentKey) {
        self.delegate.no_component_found(key);
    }

    fn new_injector(&self, descriptor: &str) {
        self.delegate.new_injector(descriptor);
    }

    fn new_behavior(&self, descriptor: &str) {
        self.delegate.new_behavior(descriptor);
    }
}
