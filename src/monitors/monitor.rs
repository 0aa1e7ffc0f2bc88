use crate::{
    ComponentKey, InjectError, InjectResult, LifecyclePhase, Service,
    ServiceInfo, Svc,
};
use parking_lot::RwLock;
use std::time::Duration;

/// Receives notifications about what a container and its adapters are
/// doing. Every method has an empty default implementation, so monitors
/// only override the events they care about.
pub trait ComponentMonitor: Service {
    /// A component is about to be instantiated.
    fn instantiating(&self, _key: &ComponentKey, _implementation: ServiceInfo) {
    }

    /// A component was instantiated. `injected` lists the services its
    /// factory resolved.
    fn instantiated(
        &self,
        _key: &ComponentKey,
        _implementation: ServiceInfo,
        _injected: &[ServiceInfo],
        _duration: Duration,
    ) {
    }

    /// A component could not be instantiated.
    fn instantiation_failed(
        &self,
        _key: &ComponentKey,
        _implementation: ServiceInfo,
        _error: &InjectError,
    ) {
    }

    /// A lifecycle method is about to be invoked.
    fn invoking(&self, _key: &ComponentKey, _phase: LifecyclePhase) {}

    /// A lifecycle method was invoked successfully.
    fn invoked(
        &self,
        _key: &ComponentKey,
        _phase: LifecyclePhase,
        _duration: Duration,
    ) {
    }

    /// A lifecycle method failed. Returning the error aborts the lifecycle
    /// operation, returning `Ok` lets it continue.
    fn lifecycle_invocation_failed(
        &self,
        _key: &ComponentKey,
        _phase: LifecyclePhase,
        error: InjectError,
    ) -> InjectResult<()> {
        Err(error)
    }

    /// A lookup by key found nothing in the container or its ancestors.
    fn no_component_found(&self, _key: &ComponentKey) {}

    /// A component factory created an injector.
    fn new_injector(&self, _descriptor: &str) {}

    /// A component factory wrapped an adapter in a behavior.
    fn new_behavior(&self, _descriptor: &str) {}
}

/// A monitor which ignores every event. Lifecycle failures are still
/// returned as errors.
#[derive(Clone, Copy, Default, Debug)]
pub struct NullComponentMonitor;

impl ComponentMonitor for NullComponentMonitor {}

/// A monitor slot shared by a container and every adapter it creates.
/// Replacing the monitor through any handle changes it for all of them.
#[derive(Clone)]
pub struct SharedMonitor(Svc<RwLock<Svc<dyn ComponentMonitor>>>);

impl SharedMonitor {
    /// Creates a new slot holding the given monitor.
    #[must_use]
    pub fn new(monitor: Svc<dyn ComponentMonitor>) -> Self {
        SharedMonitor(Svc::new(RwLock::new(monitor)))
    }

    /// Gets the current monitor.
    #[must_use]
    pub fn get(&self) -> Svc<dyn ComponentMonitor> {
        self.0.read().clone()
    }

    /// Replaces the current monitor, returning the previous one.
    pub fn replace(
        &self,
        monitor: Svc<dyn ComponentMonitor>,
    ) -> Svc<dyn ComponentMonitor> {
        std::mem::replace(&mut *self.0.write(), monitor)
    }
}

impl Default for SharedMonitor {
    fn default() -> Self {
        SharedMonitor::new(Svc::new(NullComponentMonitor))
    }
}
