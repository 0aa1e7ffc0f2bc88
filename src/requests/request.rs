use crate::{
    ComponentKey, Dependency, InjectError, InjectResult, Interface,
    Parameter, PicoContainer, PicoContainerExt, RequestInfo, ServiceInfo,
    Services, Svc,
};
use std::ops::Deref;

/// A request to a container.
///
/// ## Grouping requests
///
/// Requests can be grouped together by using tuples to make multiple requests
/// at once. Since there is a limit of 12 supported parameters/dependencies for
/// factories, tuples can also be used to get around that limitation.
///
/// ```
/// use pico_container::{Container, PicoContainerExt, Svc};
///
/// #[derive(Default)]
/// struct Bar;
/// #[derive(Default)]
/// struct Baz;
/// struct Foo(Svc<Bar>, Svc<Baz>);
///
/// impl Foo {
///     pub fn new((bar, baz): (Svc<Bar>, Svc<Baz>)) -> Self {
///         Foo(bar, baz)
///     }
/// }
///
/// let container = Container::new();
/// container.add_component(Bar::default).unwrap();
/// container.add_component(Baz::default).unwrap();
/// container.add_component(Foo::new).unwrap();
///
/// let _foo: Svc<Foo> = container.get().unwrap();
/// ```
pub trait Request: Sized + 'static {
    /// Performs the request to the container.
    fn request(
        container: &dyn PicoContainer,
        info: &RequestInfo,
    ) -> InjectResult<Self>;

    /// Performs the request, honouring a parameter configured for this
    /// argument. Requests that cannot honour a parameter reject anything but
    /// [`Parameter::Default`].
    fn request_with(
        container: &dyn PicoContainer,
        info: &RequestInfo,
        parameter: &Parameter,
    ) -> InjectResult<Self> {
        match parameter {
            Parameter::Default => Self::request(container, info),
            parameter => Err(InjectError::ParameterMismatch {
                service_info: ServiceInfo::of::<Self>(),
                parameter: parameter.to_string(),
            }),
        }
    }

    /// Services this request resolves from the container.
    #[must_use]
    fn dependencies() -> Vec<Dependency> {
        Vec::new()
    }
}

/// A handle to the container a component is being resolved from.
#[derive(Clone)]
pub struct ContainerRef(Svc<dyn PicoContainer>);

impl ContainerRef {
    /// Gets the shared pointer to the container.
    #[must_use]
    pub fn into_inner(self) -> Svc<dyn PicoContainer> {
        self.0
    }
}

impl Deref for ContainerRef {
    type Target = dyn PicoContainer;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

/// Requests the container used to resolve components.
impl Request for ContainerRef {
    #[inline]
    fn request(
        container: &dyn PicoContainer,
        _info: &RequestInfo,
    ) -> InjectResult<Self> {
        Ok(ContainerRef(container.handle()))
    }
}

/// Requests the information about the current request.
impl Request for RequestInfo {
    #[inline]
    fn request(
        _container: &dyn PicoContainer,
        info: &RequestInfo,
    ) -> InjectResult<Self> {
        Ok(info.clone())
    }
}

/// Requests a service pointer to a component. This request fails if no
/// component can be viewed as `I`, or if more than one could be and none is
/// keyed by `I`.
impl<I: ?Sized + Interface> Request for Svc<I> {
    fn request(
        container: &dyn PicoContainer,
        info: &RequestInfo,
    ) -> InjectResult<Self> {
        container.resolve::<I>(info)?.ok_or_else(|| {
            InjectError::MissingComponent {
                key: ComponentKey::of::<I>(),
            }
        })
    }

    fn request_with(
        container: &dyn PicoContainer,
        info: &RequestInfo,
        parameter: &Parameter,
    ) -> InjectResult<Self> {
        match parameter {
            Parameter::Default => Self::request(container, info),
            Parameter::Component(key) => container
                .resolve_key::<I>(key, info)?
                .ok_or_else(|| InjectError::MissingComponent {
                    key: key.clone(),
                }),
            Parameter::Constant { value, .. } => {
                I::from_component(value.clone()).ok_or_else(|| {
                    InjectError::ParameterMismatch {
                        service_info: ServiceInfo::of::<I>(),
                        parameter: parameter.to_string(),
                    }
                })
            }
        }
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::required(ServiceInfo::of::<I>())]
    }
}

/// Requests a service pointer to a component if one is available. Guarded
/// components whose guard refuses creation resolve to [`None`].
impl<I: ?Sized + Interface> Request for Option<Svc<I>> {
    fn request(
        container: &dyn PicoContainer,
        info: &RequestInfo,
    ) -> InjectResult<Self> {
        match container.resolve::<I>(info) {
            Err(InjectError::ConditionsNotMet { .. }) => Ok(None),
            result => result,
        }
    }

    fn request_with(
        container: &dyn PicoContainer,
        info: &RequestInfo,
        parameter: &Parameter,
    ) -> InjectResult<Self> {
        let result = match parameter {
            Parameter::Default => container.resolve::<I>(info),
            Parameter::Component(key) => container.resolve_key::<I>(key, info),
            Parameter::Constant { .. } => {
                <Svc<I>>::request_with(container, info, parameter).map(Some)
            }
        };

        match result {
            Err(InjectError::ConditionsNotMet { .. }) => Ok(None),
            result => result,
        }
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::optional(ServiceInfo::of::<I>())]
    }
}

/// Requests all the components which can be viewed as `I`. Components of
/// ancestor containers come first, and local components replace ancestor
/// components registered under the same key.
impl<I: ?Sized + Interface> Request for Vec<Svc<I>> {
    fn request(
        container: &dyn PicoContainer,
        info: &RequestInfo,
    ) -> InjectResult<Self> {
        let services: Services<I> = Services::request(container, info)?;
        services.get_all().collect()
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::optional(ServiceInfo::of::<I>())]
    }
}

/// Lazily requests all the components which can be viewed as `I`.
impl<I: ?Sized + Interface> Request for Services<I> {
    fn request(
        container: &dyn PicoContainer,
        info: &RequestInfo,
    ) -> InjectResult<Self> {
        Ok(Services::new(
            container.find_all(ServiceInfo::of::<I>()),
            info.clone(),
        ))
    }

    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::optional(ServiceInfo::of::<I>())]
    }
}

/// Performs multiple requests at once. This is useful for grouping together
/// related requests.
impl Request for () {
    fn request(
        _container: &dyn PicoContainer,
        _info: &RequestInfo,
    ) -> InjectResult<Self> {
        Ok(())
    }
}

macro_rules! impl_tuple_request {
    () => {};
    ($first:ident $(, $rest:ident)*) => {
        impl_tuple_request!(@impl ($first $(, $rest)*));
        impl_tuple_request!($($rest),*);
    };
    (@impl ($($type_name:ident),+)) => {
        /// Performs multiple requests at once. This is useful for grouping
        /// together related requests.
        impl<$($type_name),+> Request for ($($type_name,)+)
        where
            $($type_name: Request,)+
        {
            #[allow(unused_variables)]
            fn request(
                container: &dyn PicoContainer,
                info: &RequestInfo,
            ) -> InjectResult<Self> {
                let result = ($(<$type_name as Request>::request(container, info)?,)+);
                Ok(result)
            }

            fn dependencies() -> Vec<Dependency> {
                let mut dependencies = Vec::new();
                $(dependencies.extend(<$type_name as Request>::dependencies());)+
                dependencies
            }
        }
    };
}

impl_tuple_request!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::NO_CACHE, ComponentKey, Container, InjectError,
        Parameter, PicoContainerExt, Svc,
    };

    #[derive(Default)]
    struct Foo;

    struct Named(Svc<String>);

    #[test]
    fn component_parameter_selects_by_key() {
        let container = Container::new();
        container.add_config("first", "one".to_string()).unwrap();
        container.add_config("second", "two".to_string()).unwrap();
        container
            .register(Named)
            .parameters([Parameter::component("second")])
            .add()
            .unwrap();

        let named: Svc<Named> = container.get().unwrap();
        assert_eq!("two", named.0.as_str());
    }

    #[test]
    fn ambiguous_type_without_parameter_fails() {
        let container = Container::new();
        container.add_config("first", "one".to_string()).unwrap();
        container.add_config("second", "two".to_string()).unwrap();
        container.add_component(Named).unwrap();

        match container.get::<Svc<Named>>() {
            Err(InjectError::AmbiguousResolution { candidates, .. }) => {
                assert_eq!(2, candidates.len());
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("resolution should be ambiguous"),
        }
    }

    #[test]
    fn missing_parameter_target_is_reported() {
        let container = Container::new();
        container
            .register(Named)
            .parameters([Parameter::component("nope")])
            .add()
            .unwrap();

        match container.get::<Svc<Named>>() {
            Err(InjectError::MissingDependency { dependency, .. }) => {
                assert_eq!(ComponentKey::name("nope"), dependency);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("service should not be created"),
        }
    }

    #[test]
    fn optional_request_is_none_when_missing() {
        let container = Container::new();
        let foo: Option<Svc<Foo>> = container.get().unwrap();
        assert!(foo.is_none());
    }

    #[test]
    fn vec_request_collects_every_match() {
        let container = Container::new();
        container
            .register(Foo::default)
            .key("a")
            .characteristics(NO_CACHE)
            .add()
            .unwrap();
        container
            .register(Foo::default)
            .key("b")
            .add()
            .unwrap();

        let foos: Vec<Svc<Foo>> = container.get().unwrap();
        assert_eq!(2, foos.len());
    }

    #[test]
    fn constant_parameter_mismatch_is_reported() {
        let container = Container::new();
        container
            .register(Named)
            .parameters([Parameter::constant(5_u32)])
            .add()
            .unwrap();

        match container.get::<Svc<Named>>() {
            Err(InjectError::ParameterMismatch { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("parameter should not apply"),
        }
    }
}
