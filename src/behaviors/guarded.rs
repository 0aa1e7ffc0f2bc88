use crate::{
    characteristics::GUARD_NAME, AdapterContext, ComponentAdapter,
    ComponentFactory, ComponentKey, ComponentSpec, ConstructorInjection,
    DynSvc, InjectError, InjectResult, PicoContainer, Properties, RequestInfo,
};

/// Only creates the component if its guard allows it.
///
/// The guard is another component, looked up by key and resolved before
/// each creation. Resolving it is enough to allow creation, unless it is a
/// `bool`, in which case `false` refuses with
/// [`InjectError::ConditionsNotMet`].
pub struct Guarded {
    delegate: Box<dyn ComponentAdapter>,
    guard: ComponentKey,
}

impl Guarded {
    /// Guards `delegate` with the component registered under `guard`.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>, guard: ComponentKey) -> Self {
        Guarded { delegate, guard }
    }

    /// The key of the guard component.
    #[must_use]
    pub fn guard(&self) -> &ComponentKey {
        &self.guard
    }
}

impl ComponentAdapter for Guarded {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let guard = container.find_by_key(&self.guard).ok_or_else(|| {
            InjectError::MissingComponent {
                key: self.guard.clone(),
            }
        })?;

        let condition = guard.instance(request_info)?;
        if let Some(false) = condition.downcast_ref::<bool>() {
            return Err(InjectError::ConditionsNotMet {
                key: self.key().clone(),
            });
        }

        self.delegate.instance(container, request_info)
    }

    fn verify(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if container.find_by_key(&self.guard).is_none() {
            return Err(InjectError::MissingComponent {
                key: self.guard.clone(),
            });
        }
        self.delegate.verify(container)
    }

    fn descriptor(&self) -> String {
        format!("Guarded({}):{}", self.guard, self.delegate.descriptor())
    }
}

/// Guards the components registered with a
/// [`guard`](crate::characteristics::guard) characteristic.
pub struct Guarding {
    delegate: Box<dyn ComponentFactory>,
}

impl Guarding {
    /// Creates a guarding factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        Guarding {
            delegate: Box::new(ConstructorInjection),
        }
    }

    fn apply(
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> Box<dyn ComponentAdapter> {
        match properties.remove(GUARD_NAME) {
            Some(guard) => context.behavior(Guarded::new(
                adapter,
                ComponentKey::name(guard.into_owned()),
            )),
            None => adapter,
        }
    }
}

impl Default for Guarding {
    fn default() -> Self {
        Guarding::new()
    }
}

impl ComponentFactory for Guarding {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        Ok(Guarding::apply(context, properties, adapter))
    }

    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.wrap_adapter(context, properties, adapter)?;
        Ok(Guarding::apply(context, properties, adapter))
    }

    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        Some(self.delegate.as_ref())
    }

    fn descriptor(&self) -> String {
        "Guarding".to_string()
    }
}

behavior_factory!(Guarding);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::{guard, GUARD},
        Container, Guarded, InjectError, IntoFallible, PicoContainerExt, Svc,
    };
    use std::io;

    #[derive(Default)]
    struct Feature;

    struct Uses(Option<Svc<Feature>>);

    #[test]
    fn false_guard_refuses_creation() {
        let container = Container::new();
        container.add_config("guard", false).unwrap();
        let adapter = container
            .register(Feature::default)
            .characteristics(GUARD)
            .add()
            .unwrap();
        assert!(adapter.find_adapter_of_type::<Guarded>().is_some());

        match container.get::<Svc<Feature>>() {
            Err(InjectError::ConditionsNotMet { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("guard should refuse creation"),
        }

        container.add_component(Uses).unwrap();
        let uses: Svc<Uses> = container.get().unwrap();
        assert!(uses.0.is_none());
    }

    #[test]
    fn resolvable_guard_allows_creation() {
        let container = Container::new();
        container.add_config("ready", "yes".to_string()).unwrap();
        container
            .register(Feature::default)
            .characteristics(guard("ready"))
            .add()
            .unwrap();

        let _feature: Svc<Feature> = container.get().unwrap();
    }

    #[test]
    fn failing_guard_propagates_its_error() {
        struct Gate;

        fn open_gate() -> Result<Gate, io::Error> {
            Err(io::Error::new(io::ErrorKind::Other, "gate is closed"))
        }

        let container = Container::new();
        container
            .register(open_gate.fallible())
            .key("gate")
            .add()
            .unwrap();
        container
            .register(Feature::default)
            .characteristics(guard("gate"))
            .add()
            .unwrap();

        match container.get::<Svc<Feature>>() {
            Err(InjectError::ActivationFailed { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("guard should fail"),
        }
    }

    #[test]
    fn no_guard_means_no_guarding() {
        let container = Container::new();
        let adapter = container.add_component(Feature::default).unwrap();
        assert!(adapter.find_adapter_of_type::<Guarded>().is_none());
    }
}
