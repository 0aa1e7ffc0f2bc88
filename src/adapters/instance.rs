use crate::{
    behaviors::stored::Stored, AdapterContext, ComponentAdapter,
    ComponentKey, ComponentLifecycle, DynSvc, InjectResult, Interfaces,
    LifecycleHooks, LifecyclePhase, PicoContainer, RequestInfo, Service,
    ServiceInfo, Svc,
};

/// Provides a pre-built instance. The instance still takes part in the
/// container's lifecycle if its type has lifecycle hooks.
pub struct InstanceAdapter {
    key: ComponentKey,
    instance: DynSvc,
    implementation: ServiceInfo,
    interfaces: Interfaces,
    hooks: LifecycleHooks,
    context: AdapterContext,
    stored: Stored,
}

impl InstanceAdapter {
    /// Creates an adapter holding `instance`.
    #[must_use]
    pub fn new<T: Service>(
        key: ComponentKey,
        instance: Svc<T>,
        interfaces: Interfaces,
        hooks: LifecycleHooks,
        context: AdapterContext,
    ) -> Self {
        let instance: DynSvc = instance;
        InstanceAdapter {
            key,
            stored: Stored::holding(instance.clone()),
            instance,
            implementation: ServiceInfo::of::<T>(),
            interfaces,
            hooks,
            context,
        }
    }
}

impl ComponentAdapter for InstanceAdapter {
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    fn implementation(&self) -> ServiceInfo {
        self.implementation
    }

    fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    fn instance(
        &self,
        _container: &dyn PicoContainer,
        _request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        Ok(self.instance.clone())
    }

    fn descriptor(&self) -> String {
        format!("Instance-{}", self.key)
    }

    fn lifecycle(&self) -> Option<&dyn ComponentLifecycle> {
        Some(self)
    }

    fn component_has_lifecycle(&self) -> bool {
        self.context.has_lifecycle(&self.hooks)
    }

    fn invoke_lifecycle(
        &self,
        phase: LifecyclePhase,
        component: &DynSvc,
    ) -> InjectResult<()> {
        self.context
            .invoke_lifecycle(&self.key, &self.hooks, phase, component)
    }
}

impl ComponentLifecycle for InstanceAdapter {
    fn start(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        self.stored.start(self, || Ok(self.instance.clone()))
    }

    fn stop(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        self.stored.stop(self)
    }

    fn dispose(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        self.stored.dispose(self)
    }

    fn has_lifecycle(&self) -> bool {
        self.component_has_lifecycle()
    }

    fn is_started(&self) -> bool {
        self.stored.is_started()
    }

    fn ensure_started(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        self.stored.ensure_started(self, || Ok(self.instance.clone()))
    }
}
