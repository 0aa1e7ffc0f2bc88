use crate::{
    ComponentAdapter, ComponentKey, ComponentSpec, Container, Disposable,
    InjectError, InjectResult, InstanceAdapter, Instantiator, InterfaceFor,
    Interfaces, LifecycleHooks, Parameter, Properties, Service,
    ServiceFactory, ServiceInfo, Startable, Svc,
};

enum Source<T> {
    Factory(Box<dyn Instantiator>),
    Instance(Svc<T>),
}

/// Configures a component before adding it to a container. Nothing is
/// registered until [`add`](Registration::add) is called.
///
/// ## Example
///
/// ```
/// use pico_container::{
///     characteristics::CACHE, interface, Container, Parameter,
///     PicoContainerExt, Svc,
/// };
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Formal(Svc<String>);
///
/// impl Greeter for Formal {
///     fn greet(&self) -> String {
///         format!("Good day, {}", self.0)
///     }
/// }
///
/// interface!(Greeter = [Formal]);
///
/// let container = Container::new();
/// container.add_config("user", "Ada".to_string()).unwrap();
/// container
///     .register(Formal)
///     .implementing::<dyn Greeter>()
///     .parameters([Parameter::component("user")])
///     .characteristics(CACHE)
///     .add()
///     .unwrap();
///
/// let greeter: Svc<dyn Greeter> = container.get().unwrap();
/// assert_eq!("Good day, Ada", greeter.greet());
/// ```
#[must_use = "components are only registered once `add` is called"]
pub struct Registration<'a, T: Service> {
    container: &'a Container,
    source: Source<T>,
    key: ComponentKey,
    interfaces: Interfaces,
    parameters: Vec<Parameter>,
    hooks: LifecycleHooks,
    properties: Properties,
}

impl<'a, T: Service> Registration<'a, T> {
    pub(crate) fn factory<D, F>(container: &'a Container, factory: F) -> Self
    where
        D: 'static,
        F: ServiceFactory<D, Result = T>,
    {
        let spec = ComponentSpec::new(factory);
        Registration {
            container,
            source: Source::Factory(spec.instantiator),
            key: spec.key,
            interfaces: spec.interfaces,
            parameters: spec.parameters,
            hooks: spec.hooks,
            properties: Properties::new(),
        }
    }

    pub(crate) fn instance(container: &'a Container, instance: Svc<T>) -> Self {
        Registration {
            container,
            source: Source::Instance(instance),
            key: ComponentKey::of::<T>(),
            interfaces: Interfaces::new(),
            parameters: Vec::new(),
            hooks: LifecycleHooks::new(),
            properties: Properties::new(),
        }
    }

    /// Registers the component under `key` instead of its type.
    pub fn key(mut self, key: impl Into<ComponentKey>) -> Self {
        self.key = key.into();
        self
    }

    /// Registers the component under the interface `I`, which it can then
    /// also be requested as.
    pub fn implementing<I: ?Sized + InterfaceFor<T>>(mut self) -> Self {
        self.key = ComponentKey::of::<I>();
        self.interfaces.add(ServiceInfo::of::<I>());
        self
    }

    /// Lets the component also be requested as the interface `I`.
    pub fn with_interface<I: ?Sized + InterfaceFor<T>>(mut self) -> Self {
        self.interfaces.add(ServiceInfo::of::<I>());
        self
    }

    /// Overrides how the factory's arguments are resolved, by position.
    /// Arguments without a parameter are resolved by type. Instances ignore
    /// parameters.
    pub fn parameters(
        mut self,
        parameters: impl IntoIterator<Item = Parameter>,
    ) -> Self {
        self.parameters = parameters.into_iter().collect();
        self
    }

    /// Adds characteristics which pick the behaviors of the component.
    pub fn characteristics(mut self, properties: impl Into<Properties>) -> Self {
        self.properties.merge(&properties.into());
        self
    }

    /// Makes the component take part in the start and stop phases of its
    /// container.
    pub fn startable(mut self) -> Self
    where
        T: Startable,
    {
        self.hooks = self.hooks.startable::<T>();
        self
    }

    /// Makes the component take part in the dispose phase of its container.
    pub fn disposable(mut self) -> Self
    where
        T: Disposable,
    {
        self.hooks = self.hooks.disposable::<T>();
        self
    }

    /// Adds the component to the container, returning its adapter.
    pub fn add(self) -> InjectResult<Svc<dyn ComponentAdapter>> {
        let Registration {
            container,
            source,
            key,
            interfaces,
            parameters,
            hooks,
            properties,
        } = self;

        match source {
            Source::Factory(instantiator) => container.add_spec(
                ComponentSpec {
                    key,
                    instantiator,
                    interfaces,
                    parameters,
                    hooks,
                },
                properties,
            ),
            Source::Instance(instance) => {
                let adapter = InstanceAdapter::new(
                    key,
                    instance,
                    interfaces,
                    hooks,
                    container.context().clone(),
                );
                container.add_built(Box::new(adapter), properties)
            }
        }
    }
}

/// Registers components with extra characteristics. Created by
/// [`Container::as_`].
///
/// ## Example
///
/// ```
/// use pico_container::{characteristics::CACHE, Container, PicoContainerExt, Svc};
///
/// #[derive(Default)]
/// struct Pool;
///
/// let container = Container::new();
/// container.as_(CACHE).add_component(Pool::default).unwrap();
///
/// let first: Svc<Pool> = container.get().unwrap();
/// let second: Svc<Pool> = container.get().unwrap();
/// assert!(Svc::ptr_eq(&first, &second));
/// ```
pub struct As<'a> {
    container: &'a Container,
    properties: Properties,
}

impl<'a> As<'a> {
    pub(crate) fn new(container: &'a Container, properties: Properties) -> Self {
        As {
            container,
            properties,
        }
    }

    /// Starts a registration carrying these characteristics.
    pub fn register<D, F>(self, factory: F) -> Registration<'a, F::Result>
    where
        D: 'static,
        F: ServiceFactory<D>,
    {
        self.container
            .register(factory)
            .characteristics(self.properties)
    }

    /// Adds a component carrying these characteristics.
    pub fn add_component<D, F>(
        self,
        factory: F,
    ) -> InjectResult<Svc<dyn ComponentAdapter>>
    where
        D: 'static,
        F: ServiceFactory<D>,
    {
        self.register(factory).add()
    }

    /// Adds an instance carrying these characteristics.
    pub fn add_instance<T: Service>(
        self,
        instance: T,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        self.container
            .register_instance(instance)
            .characteristics(self.properties)
            .add()
    }

    /// Characteristics cannot be stacked, so this always fails.
    pub fn as_(self, _properties: impl Into<Properties>) -> InjectResult<As<'a>> {
        Err(InjectError::Composition(
            "characteristics are already set for this registration".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::{CACHE, HIDE_IMPL},
        Container, InjectError, PicoContainerExt, Svc,
    };

    #[derive(Default)]
    struct Pool;

    #[derive(Default)]
    struct Other;

    #[test]
    fn characteristics_apply_to_one_registration() {
        let container = Container::new();
        container.as_(CACHE).add_component(Pool::default).unwrap();
        container.add_component(Other::default).unwrap();

        let first: Svc<Pool> = container.get().unwrap();
        let second: Svc<Pool> = container.get().unwrap();
        assert!(Svc::ptr_eq(&first, &second));

        let first: Svc<Other> = container.get().unwrap();
        let second: Svc<Other> = container.get().unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }

    #[test]
    fn characteristics_cannot_be_chained() {
        let container = Container::new();
        match container.as_(CACHE).as_(HIDE_IMPL) {
            Err(InjectError::Composition(_)) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("chained characteristics should be rejected"),
        }
    }
}
