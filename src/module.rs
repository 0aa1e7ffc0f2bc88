use crate::{
    ComponentAdapter, Container, InjectResult, InterfaceFor, Service,
    ServiceFactory, Svc,
};

type Installer =
    Box<dyn FnOnce(&Container) -> InjectResult<Svc<dyn ComponentAdapter>>>;

/// A collection of registrations that can be added all at once to a
/// [`Container`]. Modules can be used to group together related components
/// and configure the container in pieces rather than all at once.
///
/// For creating a module easily via a domain specific language, see
/// [`define_module!`].
#[derive(Default)]
pub struct Module {
    installers: Vec<Installer>,
}

impl Module {
    /// Creates an empty module.
    #[must_use]
    pub fn new() -> Self {
        Module::default()
    }

    /// Adds a component built by `factory`, keyed by the type it produces.
    pub fn add_component<D, F>(&mut self, factory: F)
    where
        D: 'static,
        F: ServiceFactory<D>,
    {
        self.installers
            .push(Box::new(move |container| container.add_component(factory)));
    }

    /// Adds a component built by `factory` which can also be requested as
    /// the interface `I`.
    pub fn add_interface<I, D, F>(&mut self, factory: F)
    where
        I: ?Sized + InterfaceFor<F::Result>,
        D: 'static,
        F: ServiceFactory<D>,
    {
        self.installers.push(Box::new(move |container| {
            container.register(factory).with_interface::<I>().add()
        }));
    }

    /// Adds a pre-built instance, keyed by its type.
    pub fn add_instance<T: Service>(&mut self, instance: T) {
        self.installers
            .push(Box::new(move |container| container.add_instance(instance)));
    }

    /// Adds a configuration value under a name.
    pub fn add_config<T: Service>(&mut self, name: impl Into<String>, value: T) {
        let name = name.into();
        self.installers
            .push(Box::new(move |container| container.add_config(name, value)));
    }

    /// Adds a registration configured through [`Container::register`] or
    /// any other method of the container.
    pub fn add_with<F>(&mut self, install: F)
    where
        F: FnOnce(&Container) -> InjectResult<Svc<dyn ComponentAdapter>> + 'static,
    {
        self.installers.push(Box::new(install));
    }

    /// Gets the number of registrations in this module.
    #[must_use]
    pub fn len(&self) -> usize {
        self.installers.len()
    }

    /// Returns whether this module has no registrations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }
}

impl Container {
    /// Adds every registration of a module, in the order they were added to
    /// it. Stops at the first registration which fails.
    pub fn add_module(&self, module: Module) -> InjectResult<()> {
        for install in module.installers {
            install(self)?;
        }
        Ok(())
    }
}

/// Defines a new module using a domain specific language.
///
/// ## Example
///
/// ```
/// use pico_container::{
///     define_module, interface, Container, PicoContainerExt, Service, Svc,
/// };
///
/// struct Greeting(Svc<String>);
/// #[derive(Default)]
/// struct English;
/// #[derive(Default)]
/// struct French;
/// struct Bundle(Vec<Svc<dyn Language>>);
///
/// trait Language: Service {}
/// impl Language for English {}
/// impl Language for French {}
/// interface!(Language = [English, French]);
///
/// let module = define_module! {
///     services = [
///         Bundle,
///     ],
///     interfaces = {
///         dyn Language = [
///             English::default,
///             French::default,
///         ],
///     },
///     configs = {
///         "greeting" = "hello".to_string(),
///     },
///
///     // Definitions of the same kind are merged together, so some
///     // components can be registered only in certain environments.
///     #[cfg(not(test))]
///     services = [
///         |greeting: Svc<String>| Greeting(greeting),
///     ],
/// };
///
/// let container = Container::new();
/// container.add_module(module).unwrap();
///
/// let bundle: Svc<Bundle> = container.get().unwrap();
/// assert_eq!(2, bundle.0.len());
/// ```
#[macro_export]
macro_rules! define_module {
    {
        $(
            $(#[$($attr:meta),*])*
            $key:ident = $value:tt
        ),*
        $(,)?
    } => {
        {
            #[allow(unused_mut)]
            let mut module = <$crate::Module as ::std::default::Default>::default();
            $(
                $(#[$($attr),*])*
                $crate::define_module!(@provide &mut module, $key = $value);
            )*
            module
        }
    };
    (
        @provide $module:expr,
        services = [
            $($service:expr),*
            $(,)?
        ]
    ) => {
        $($module.add_component($service);)*
    };
    (
        @provide $module:expr,
        interfaces = {
            $($interface:ty = [
                $($implementation:expr),*
                $(,)?
            ]),*
            $(,)?
        }
    ) => {
        $(
            $($module.add_interface::<$interface, _, _>($implementation);)*
        )*
    };
    (
        @provide $module:expr,
        configs = {
            $($name:literal = $config:expr),*
            $(,)?
        }
    ) => {
        $(
            $module.add_config($name, $config);
        )*
    };
}

#[cfg(test)]
mod tests {
    use crate::{ComponentKey, Container, InjectError, Module, PicoContainerExt};

    #[test]
    fn registrations_are_applied_in_order() {
        let mut module = Module::new();
        module.add_instance(1_u8);
        module.add_with(|container| {
            container.register_instance(2_u8).key("second").add()
        });
        assert_eq!(2, module.len());

        let container = Container::new();
        container.add_module(module).unwrap();
        let values = container.components::<u8>().unwrap();
        assert_eq!(vec![1, 2], values.iter().map(|value| **value).collect::<Vec<_>>());
        assert!(container
            .component_by_key::<u8>(&ComponentKey::name("second"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn failing_registrations_stop_the_module() {
        let mut module = Module::new();
        module.add_instance(1_u8);
        module.add_instance(2_u8);

        let container = Container::new();
        match container.add_module(module) {
            Err(InjectError::DuplicateKey { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("duplicate registration should fail"),
        }
    }
}
