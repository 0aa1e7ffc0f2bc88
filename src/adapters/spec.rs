use crate::{
    ComponentKey, Dependency, DynSvc, InjectResult, Interfaces,
    LifecycleHooks, Parameter, PicoContainer, RequestInfo, Service,
    ServiceFactory, ServiceInfo, Svc,
};
use std::marker::PhantomData;

/// A type-erased service factory.
pub trait Instantiator: Service {
    /// The type of component this produces.
    fn implementation(&self) -> ServiceInfo;

    /// The services each argument of the factory resolves.
    fn dependencies(&self) -> Vec<Vec<Dependency>>;

    /// Creates a new instance of the component.
    fn instantiate(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
        parameters: &[Parameter],
    ) -> InjectResult<DynSvc>;
}

struct FactoryInstantiator<D, F> {
    factory: F,
    marker: PhantomData<fn() -> D>,
}

impl<D, F> Instantiator for FactoryInstantiator<D, F>
where
    D: 'static,
    F: ServiceFactory<D>,
{
    fn implementation(&self) -> ServiceInfo {
        ServiceInfo::of::<F::Result>()
    }

    fn dependencies(&self) -> Vec<Vec<Dependency>> {
        F::dependencies()
    }

    fn instantiate(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
        parameters: &[Parameter],
    ) -> InjectResult<DynSvc> {
        let component =
            self.factory.invoke(container, request_info, parameters)?;
        Ok(Svc::new(component))
    }
}

/// Everything a registration tells a component factory about the component
/// it should adapt.
pub struct ComponentSpec {
    /// The key the component is registered under.
    pub key: ComponentKey,

    /// Creates instances of the component.
    pub instantiator: Box<dyn Instantiator>,

    /// Additional types the component can be requested as.
    pub interfaces: Interfaces,

    /// Overrides for the factory's arguments, by position.
    pub parameters: Vec<Parameter>,

    /// The lifecycle methods of the component type.
    pub hooks: LifecycleHooks,
}

impl ComponentSpec {
    /// Creates a spec for a factory, keyed by the type it produces.
    #[must_use]
    pub fn new<D, F>(factory: F) -> Self
    where
        D: 'static,
        F: ServiceFactory<D>,
    {
        ComponentSpec {
            key: ComponentKey::of::<F::Result>(),
            instantiator: Box::new(FactoryInstantiator {
                factory,
                marker: PhantomData,
            }),
            interfaces: Interfaces::new(),
            parameters: Vec::new(),
            hooks: LifecycleHooks::new(),
        }
    }

    /// The type of component this spec produces.
    #[must_use]
    pub fn implementation(&self) -> ServiceInfo {
        self.instantiator.implementation()
    }
}
