use crate::{
    characteristics::{HIDE_IMPL, NO_HIDE_IMPL},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentSpec,
    ConstructorInjection, DynSvc, InjectError, InjectResult, PicoContainer,
    Properties, RequestInfo, ServiceInfo,
};

/// Hides the concrete type of a component, so it can only be requested
/// through its key or one of its interfaces.
pub struct HiddenImplementation {
    delegate: Box<dyn ComponentAdapter>,
}

impl HiddenImplementation {
    /// Hides the concrete type of `delegate`. Fails if the component has no
    /// type other than its concrete type to be requested as.
    pub fn new(delegate: Box<dyn ComponentAdapter>) -> InjectResult<Self> {
        let implementation = delegate.implementation();
        let key_hides = delegate
            .key()
            .service_info()
            .map_or(false, |service_info| service_info != implementation);
        let interfaces_hide = delegate
            .interfaces()
            .iter()
            .any(|service_info| service_info != implementation);

        if key_hides || interfaces_hide {
            Ok(HiddenImplementation { delegate })
        } else {
            Err(InjectError::NotAnInterface {
                key: delegate.key().clone(),
            })
        }
    }
}

impl ComponentAdapter for HiddenImplementation {
    delegate_adapter!();

    fn exposes(&self, service_info: ServiceInfo) -> bool {
        service_info != self.implementation()
            && (self.interfaces().contains(service_info)
                || self.key().service_info() == Some(service_info))
    }

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        self.delegate.instance(container, request_info)
    }

    fn descriptor(&self) -> String {
        format!("Hidden:{}", self.delegate.descriptor())
    }
}

/// Hides the concrete type of every component unless it is registered with
/// [`NO_HIDE_IMPL`](crate::characteristics::NO_HIDE_IMPL).
pub struct ImplementationHiding {
    delegate: Box<dyn ComponentFactory>,
}

impl ImplementationHiding {
    /// Creates a hiding factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        ImplementationHiding {
            delegate: Box::new(ConstructorInjection),
        }
    }

    fn apply(
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        if properties.remove_if_present(&NO_HIDE_IMPL) {
            return Ok(adapter);
        }
        properties.remove_if_present(&HIDE_IMPL);
        Ok(context.behavior(HiddenImplementation::new(adapter)?))
    }
}

impl Default for ImplementationHiding {
    fn default() -> Self {
        ImplementationHiding::new()
    }
}

impl ComponentFactory for ImplementationHiding {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        ImplementationHiding::apply(context, properties, adapter)
    }

    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.wrap_adapter(context, properties, adapter)?;
        ImplementationHiding::apply(context, properties, adapter)
    }

    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        Some(self.delegate.as_ref())
    }

    fn descriptor(&self) -> String {
        "ImplementationHiding".to_string()
    }
}

behavior_factory!(ImplementationHiding);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::HIDE_IMPL, interface, Container, InjectError,
        PicoContainerExt, Service, Svc,
    };

    trait Greeter: Service {
        fn greet(&self) -> &'static str;
    }

    #[derive(Default)]
    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    interface!(Greeter = [English]);

    #[test]
    fn hidden_component_is_only_visible_through_its_interface() {
        let container = Container::new();
        container
            .register(English::default)
            .implementing::<dyn Greeter>()
            .characteristics(HIDE_IMPL)
            .add()
            .unwrap();

        let greeter: Svc<dyn Greeter> = container.get().unwrap();
        assert_eq!("hello", greeter.greet());

        let english: Option<Svc<English>> = container.get().unwrap();
        assert!(english.is_none());
    }

    #[test]
    fn concrete_key_cannot_be_hidden() {
        let container = Container::new();
        let result = container
            .register(English::default)
            .characteristics(HIDE_IMPL)
            .add();

        match result {
            Err(InjectError::NotAnInterface { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("registration should fail"),
        }
    }
}
