use crate::{
    Dependency, InjectError, InjectResult, Parameter, PicoContainer, Request,
    RequestInfo, Service, ServiceInfo,
};

/// A factory for creating instances of a component. All functions of arity
/// 12 or less are automatically service factories if the arguments to that
/// function are valid requests and the return value is a valid service type.
///
/// ## Type parameters
/// * `D` - Tuple of this component's dependencies.
///
/// ## Example
///
/// ```
/// use pico_container::{
///     Container, PicoContainer, RequestInfo, ServiceFactory, Svc,
/// };
///
/// struct Foo;
/// struct Bar;
///
/// # fn _no_run() {
/// fn factory(foo: Svc<Foo>) -> Bar {
///     todo!()
/// }
/// let container: Container = todo!();
/// factory.invoke(&container, &RequestInfo::new(), &[]);
/// # }
/// ```
pub trait ServiceFactory<D>: Service {
    /// The resulting component from invoking this service factory.
    type Result: Service;

    /// Invokes this service factory, creating an instance of the component.
    /// Parameters are applied to the arguments by position.
    fn invoke(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
        parameters: &[Parameter],
    ) -> InjectResult<Self::Result>;

    /// The services each argument of this factory resolves.
    fn dependencies() -> Vec<Vec<Dependency>>;
}

fn request_argument<T: Request>(
    container: &dyn PicoContainer,
    request_info: &RequestInfo,
    parameter: Option<&Parameter>,
) -> InjectResult<T> {
    match parameter {
        Some(parameter) => T::request_with(container, request_info, parameter),
        None => T::request(container, request_info),
    }
}

macro_rules! impl_provider_function {
    () => {
        impl_provider_function!(@impl ());
    };
    ($first:ident $(, $rest:ident)*) => {
        impl_provider_function!(@impl ($first $(, $rest)*));
        impl_provider_function!($($rest),*);
    };
    (@impl ($($type_name:ident),*)) => {
        impl<F, R $(, $type_name)*> ServiceFactory<($($type_name,)*)> for F
        where
            F: Service + Fn($($type_name),*) -> R,
            R: Service,
            $($type_name: Request,)*
        {
            type Result = R;

            #[allow(unused_variables, unused_mut)]
            fn invoke(
                &self,
                container: &dyn PicoContainer,
                request_info: &RequestInfo,
                parameters: &[Parameter],
            ) -> InjectResult<Self::Result> {
                let mut parameters = parameters.iter();
                let result = self($(
                    match request_argument::<$type_name>(
                        container,
                        request_info,
                        parameters.next(),
                    ) {
                        Ok(dependency) => dependency,
                        Err(InjectError::MissingComponent { key }) => {
                            return Err(InjectError::MissingDependency {
                                dependency: key,
                                service_info: ServiceInfo::of::<R>(),
                            })
                        },
                        Err(error) => return Err(error),
                    }
                ),*);
                Ok(result)
            }

            fn dependencies() -> Vec<Vec<Dependency>> {
                vec![$(<$type_name as Request>::dependencies()),*]
            }
        }
    };
}

impl_provider_function!(T0, T1, T2, T3, T4, T5, T6, T7, T8, T9, T10, T11);
