use crate::{ComponentKey, DynSvc, Service, ServiceInfo, Svc};
use std::fmt::{Debug, Display, Formatter};

/// Overrides how a single argument of a component's factory is resolved.
/// Parameters are matched to factory arguments by position. Arguments
/// without a parameter, or with [`Parameter::Default`], are resolved by type.
///
/// ## Example
///
/// ```
/// use pico_container::{Container, Parameter, PicoContainerExt, Svc};
///
/// struct Greeting(Svc<String>);
///
/// let container = Container::new();
/// container
///     .register(Greeting)
///     .parameters([Parameter::constant("hello".to_string())])
///     .add()
///     .unwrap();
///
/// let greeting: Svc<Greeting> = container.get().unwrap();
/// assert_eq!("hello", greeting.0.as_str());
/// ```
#[derive(Clone)]
pub enum Parameter {
    /// Resolve the argument by its type.
    Default,

    /// Resolve the argument from the component registered under a key.
    Component(ComponentKey),

    /// Use a fixed value for the argument.
    Constant {
        /// The erased value.
        value: DynSvc,

        /// The type of the value.
        service_info: ServiceInfo,
    },
}

impl Parameter {
    /// Resolves the argument from the component registered under a key.
    #[must_use]
    pub fn component(key: impl Into<ComponentKey>) -> Self {
        Parameter::Component(key.into())
    }

    /// Uses a fixed value for the argument.
    #[must_use]
    pub fn constant<T: Service>(value: T) -> Self {
        Parameter::shared(Svc::new(value))
    }

    /// Uses an already shared value for the argument.
    #[must_use]
    pub fn shared<T: Service>(value: Svc<T>) -> Self {
        Parameter::Constant {
            value,
            service_info: ServiceInfo::of::<T>(),
        }
    }
}

impl Default for Parameter {
    fn default() -> Self {
        Parameter::Default
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Parameter::Default => f.write_str("default"),
            Parameter::Component(key) => write!(f, "component({})", key),
            Parameter::Constant { service_info, .. } => {
                write!(f, "constant({})", service_info.name())
            }
        }
    }
}

impl Debug for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// Describes one service a factory argument resolves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Dependency {
    service_info: ServiceInfo,
    optional: bool,
}

impl Dependency {
    /// A dependency which must be satisfied for the component to be created.
    #[must_use]
    pub fn required(service_info: ServiceInfo) -> Self {
        Dependency {
            service_info,
            optional: false,
        }
    }

    /// A dependency which the component can be created without.
    #[must_use]
    pub fn optional(service_info: ServiceInfo) -> Self {
        Dependency {
            service_info,
            optional: true,
        }
    }

    /// The requested service.
    #[must_use]
    pub fn service_info(&self) -> ServiceInfo {
        self.service_info
    }

    /// Whether the component can be created without this dependency.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}
