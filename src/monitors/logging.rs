use crate::{
    ComponentKey, ComponentMonitor, InjectError, InjectResult, LifecyclePhase,
    NullComponentMonitor, ServiceInfo, Svc,
};
use std::time::Duration;
use tracing::{debug, error, trace, warn};

/// Reports every event as a `tracing` event before passing it on to a
/// delegate monitor.
#[derive(Clone)]
pub struct TracingComponentMonitor {
    delegate: Svc<dyn ComponentMonitor>,
}

impl TracingComponentMonitor {
    /// Creates a monitor which only logs.
    #[must_use]
    pub fn new() -> Self {
        TracingComponentMonitor::wrapping(Svc::new(NullComponentMonitor))
    }

    /// Creates a monitor which logs and then forwards to `delegate`.
    #[must_use]
    pub fn wrapping(delegate: Svc<dyn ComponentMonitor>) -> Self {
        TracingComponentMonitor { delegate }
    }
}

impl Default for TracingComponentMonitor {
    fn default() -> Self {
        TracingComponentMonitor::new()
    }
}

impl ComponentMonitor for TracingComponentMonitor {
    fn instantiating(&self, key: &ComponentKey, implementation: ServiceInfo) {
        trace!(%key, %implementation, "instantiating component");
        self.delegate.instantiating(key, implementation);
    }

    fn instantiated(
        &self,
        key: &ComponentKey,
        implementation: ServiceInfo,
        injected: &[ServiceInfo],
        duration: Duration,
    ) {
        debug!(
            %key,
            %implementation,
            dependencies = injected.len(),
            duration_us = duration.as_micros() as u64,
            "instantiated component"
        );
        self.delegate
            .instantiated(key, implementation, injected, duration);
    }

    fn instantiation_failed(
        &self,
        key: &ComponentKey,
        implementation: ServiceInfo,
        error: &InjectError,
    ) {
        warn!(%key, %implementation, %error, "failed to instantiate component");
        self.delegate.instantiation_failed(key, implementation, error);
    }

    fn invoking(&self, key: &ComponentKey, phase: LifecyclePhase) {
        trace!(%key, %phase, "invoking lifecycle method");
        self.delegate.invoking(key, phase);
    }

    fn invoked(
        &self,
        key: &ComponentKey,
        phase: LifecyclePhase,
        duration: Duration,
    ) {
        debug!(
            %key,
            %phase,
            duration_us = duration.as_micros() as u64,
            "invoked lifecycle method"
        );
        self.delegate.invoked(key, phase, duration);
    }

    fn lifecycle_invocation_failed(
        &self,
        key: &ComponentKey,
        phase: LifecyclePhase,
        error: InjectError,
    ) -> InjectResult<()> {
        error!(%key, %phase, %error, "lifecycle method failed");
        self.delegate.lifecycle_invocation_failed(key, phase, error)
    }

    fn no_component_found(&self, key: &ComponentKey) {
        debug!(%key, "no component found");
        self.delegate.no_component_found(key);
    }

    fn new_injector(&self, descriptor: &str) {
        trace!(descriptor, "created injector");
        self.delegate.new_injector(descriptor);
    }

    fn new_behavior(&self, descriptor: &str) {
        trace!(descriptor, "created behavior");
        self.delegate.new_behavior(descriptor);
    }
}
