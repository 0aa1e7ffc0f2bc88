use crate::{
    ComponentKey, Dependency, DynSvc, InjectResult, Interfaces,
    LifecyclePhase, PicoContainer, PicoVisitor, RequestInfo, ServiceInfo,
};
use downcast_rs::{impl_downcast, DowncastSync};

/// Knows how to produce the instances of one component. Behaviors wrap
/// another adapter and forward to it through [`delegate`], so a registered
/// component is usually a chain of adapters ending in an injector.
///
/// [`delegate`]: ComponentAdapter::delegate
pub trait ComponentAdapter: DowncastSync {
    /// The key this component is registered under.
    fn key(&self) -> &ComponentKey;

    /// The concrete type of the instances this adapter produces.
    fn implementation(&self) -> ServiceInfo;

    /// Additional types the component can be requested as.
    fn interfaces(&self) -> &Interfaces;

    /// Whether a request for the given type can be satisfied by this
    /// component.
    fn exposes(&self, service_info: ServiceInfo) -> bool {
        self.implementation() == service_info
            || self.interfaces().contains(service_info)
            || self.key().service_info() == Some(service_info)
    }

    /// Gets an instance of the component. `container` is the container
    /// which owns this adapter.
    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc>;

    /// Checks that the component could be created from `container`.
    fn verify(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        match self.delegate() {
            Some(delegate) => delegate.verify(container),
            None => Ok(()),
        }
    }

    /// The adapter this one wraps, if it is a behavior.
    fn delegate(&self) -> Option<&dyn ComponentAdapter> {
        None
    }

    /// A short description of this adapter and what it wraps.
    fn descriptor(&self) -> String;

    /// The services each argument of the component's factory resolves.
    fn dependencies(&self) -> Vec<Vec<Dependency>> {
        self.delegate()
            .map(ComponentAdapter::dependencies)
            .unwrap_or_default()
    }

    /// The lifecycle of the instances this adapter holds on to, if it holds
    /// on to any.
    fn lifecycle(&self) -> Option<&dyn ComponentLifecycle> {
        self.delegate().and_then(ComponentAdapter::lifecycle)
    }

    /// Whether the container's lifecycle strategy applies to the instances
    /// of this component.
    fn component_has_lifecycle(&self) -> bool {
        self.delegate()
            .map_or(false, ComponentAdapter::component_has_lifecycle)
    }

    /// Invokes a lifecycle phase on an instance of this component through
    /// the container's lifecycle strategy.
    fn invoke_lifecycle(
        &self,
        phase: LifecyclePhase,
        component: &DynSvc,
    ) -> InjectResult<()> {
        match self.delegate() {
            Some(delegate) => delegate.invoke_lifecycle(phase, component),
            None => Ok(()),
        }
    }

    /// Whether the container should instantiate this component when it
    /// starts.
    fn is_eager(&self) -> bool {
        self.delegate().map_or(false, ComponentAdapter::is_eager)
    }
}

impl_downcast!(sync ComponentAdapter);

impl dyn ComponentAdapter {
    /// Walks the delegate chain looking for an adapter of type `A`.
    ///
    /// ## Example
    ///
    /// ```
    /// use pico_container::{
    ///     characteristics::CACHE, Cached, ConstructorInjector, Container,
    /// };
    ///
    /// #[derive(Default)]
    /// struct Foo;
    ///
    /// let container = Container::new();
    /// let adapter = container
    ///     .register(Foo::default)
    ///     .characteristics(CACHE)
    ///     .add()
    ///     .unwrap();
    ///
    /// assert!(adapter.find_adapter_of_type::<Cached>().is_some());
    /// assert!(adapter.find_adapter_of_type::<ConstructorInjector>().is_some());
    /// ```
    #[must_use]
    pub fn find_adapter_of_type<A: ComponentAdapter>(&self) -> Option<&A> {
        let mut current: Option<&dyn ComponentAdapter> = Some(self);
        while let Some(adapter) = current {
            if let Some(found) = adapter.downcast_ref::<A>() {
                return Some(found);
            }
            current = adapter.delegate();
        }
        None
    }

    /// Lets a visitor visit this adapter.
    pub fn accept(&self, visitor: &mut dyn PicoVisitor) {
        visitor.visit_component_adapter(self);
    }
}

/// The lifecycle of the instances an adapter holds on to. Containers start,
/// stop and dispose every adapter which has one.
pub trait ComponentLifecycle {
    /// Starts the held instances, creating them if needed.
    fn start(&self, container: &dyn PicoContainer) -> InjectResult<()>;

    /// Stops the held instances.
    fn stop(&self, container: &dyn PicoContainer) -> InjectResult<()>;

    /// Disposes the held instances.
    fn dispose(&self, container: &dyn PicoContainer) -> InjectResult<()>;

    /// Whether the held instances have any lifecycle to manage.
    fn has_lifecycle(&self) -> bool;

    /// Whether the held instances are started.
    fn is_started(&self) -> bool;

    /// Starts the held instances unless they are already started. Unlike
    /// [`start`](ComponentLifecycle::start), this is not an error when they
    /// are.
    fn ensure_started(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if self.is_started() {
            Ok(())
        } else {
            self.start(container)
        }
    }
}
