use crate::{
    AdapterContext, ComponentAdapter, ComponentKey, ComponentSpec, Dependency,
    DynSvc, InjectError, InjectResult, Instantiator, Interfaces,
    LifecycleHooks, LifecyclePhase, Parameter, PicoContainer, RequestInfo,
    ServiceInfo,
};
use std::time::Instant;

/// Creates a new instance of its component on every request by invoking the
/// registered factory with dependencies resolved from the container.
pub struct ConstructorInjector {
    key: ComponentKey,
    instantiator: Box<dyn Instantiator>,
    interfaces: Interfaces,
    parameters: Vec<Parameter>,
    hooks: LifecycleHooks,
    context: AdapterContext,
}

impl ConstructorInjector {
    /// Creates an injector for the given component.
    #[must_use]
    pub fn new(spec: ComponentSpec, context: AdapterContext) -> Self {
        ConstructorInjector {
            key: spec.key,
            instantiator: spec.instantiator,
            interfaces: spec.interfaces,
            parameters: spec.parameters,
            hooks: spec.hooks,
            context,
        }
    }

    /// The parameters applied to the factory's arguments.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    fn missing(&self, dependency: ComponentKey) -> InjectError {
        InjectError::MissingDependency {
            service_info: self.instantiator.implementation(),
            dependency,
        }
    }
}

impl ComponentAdapter for ConstructorInjector {
    fn key(&self) -> &ComponentKey {
        &self.key
    }

    fn implementation(&self) -> ServiceInfo {
        self.instantiator.implementation()
    }

    fn interfaces(&self) -> &Interfaces {
        &self.interfaces
    }

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let monitor = self.context.monitor().get();
        let implementation = self.instantiator.implementation();
        monitor.instantiating(&self.key, implementation);

        let started = Instant::now();
        let request_info = request_info.recording_injections();
        match self
            .instantiator
            .instantiate(container, &request_info, &self.parameters)
        {
            Ok(component) => {
                monitor.instantiated(
                    &self.key,
                    implementation,
                    &request_info.injected(),
                    started.elapsed(),
                );
                Ok(component)
            }
            Err(error) => {
                monitor.instantiation_failed(&self.key, implementation, &error);
                Err(error)
            }
        }
    }

    fn verify(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        let dependencies = self.instantiator.dependencies();
        for (index, argument) in dependencies.iter().enumerate() {
            match self.parameters.get(index) {
                Some(Parameter::Component(key)) => {
                    if container.find_by_key(key).is_none() {
                        return Err(self.missing(key.clone()));
                    }
                }
                Some(Parameter::Constant { .. }) => {}
                Some(Parameter::Default) | None => {
                    for dependency in argument
                        .iter()
                        .filter(|dependency| !dependency.is_optional())
                    {
                        let service_info = dependency.service_info();
                        if container.find_by_type(service_info)?.is_none() {
                            return Err(self.missing(ComponentKey::Type(
                                service_info,
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    fn descriptor(&self) -> String {
        format!("ConstructorInjector-{}", self.key)
    }

    fn dependencies(&self) -> Vec<Vec<Dependency>> {
        self.instantiator.dependencies()
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

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::NO_CACHE, ComponentKey, Container, InjectError,
        Parameter, PicoContainerExt, Svc,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Engine;

    struct Car(Svc<Engine>);

    #[test]
    fn new_instance_per_request() {
        let container = Container::new();
        container.add_component(Engine::default).unwrap();

        let first: Svc<Engine> = container.get().unwrap();
        let second: Svc<Engine> = container.get().unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }

    #[test]
    fn factory_runs_once_per_request() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let container = Container::new();
        container
            .register(|| {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Engine
            })
            .characteristics(NO_CACHE)
            .add()
            .unwrap();

        let _: Svc<Engine> = container.get().unwrap();
        let _: Svc<Engine> = container.get().unwrap();
        assert_eq!(2, CALLS.load(Ordering::SeqCst));
    }

    #[test]
    fn verify_reports_missing_dependencies() {
        let container = Container::new();
        container.add_component(Car).unwrap();

        match container.verify() {
            Err(InjectError::MissingDependency { dependency, .. }) => {
                assert_eq!(ComponentKey::of::<Engine>(), dependency);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("verification should fail"),
        }

        container.add_component(Engine::default).unwrap();
        container.verify().unwrap();
    }

    #[test]
    fn verify_checks_component_parameters() {
        let container = Container::new();
        container
            .register(Car)
            .parameters([Parameter::component("engine")])
            .add()
            .unwrap();
        assert!(container.verify().is_err());

        container
            .register(Engine::default)
            .key("engine")
            .add()
            .unwrap();
        container.verify().unwrap();
    }
}
