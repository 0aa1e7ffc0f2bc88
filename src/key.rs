use crate::ServiceInfo;
use std::{
    any::Any,
    fmt::{Display, Formatter},
};

/// Identifies a component within a container. Components are usually keyed
/// by the type they are requested as, but they can also be registered under
/// a plain name or a type bound to a name.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ComponentKey {
    /// Keyed by a type. Requests for that type find this component first.
    Type(ServiceInfo),

    /// Keyed by a name, such as a configuration entry.
    Name(String),

    /// Keyed by a type bound to a name. Used when several components share a
    /// type and need to be told apart.
    Bound {
        /// The type the component is requested as.
        service_info: ServiceInfo,

        /// The name the type is bound to.
        name: String,
    },
}

impl ComponentKey {
    /// Creates a key for the given type.
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ComponentKey::Type(ServiceInfo::of::<T>())
    }

    /// Creates a key from a name.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        ComponentKey::Name(name.into())
    }

    /// Creates a key for the given type bound to a name.
    #[must_use]
    pub fn bound<T: ?Sized + Any>(name: impl Into<String>) -> Self {
        ComponentKey::Bound {
            service_info: ServiceInfo::of::<T>(),
            name: name.into(),
        }
    }

    /// Gets the type this key refers to, if it refers to one.
    #[must_use]
    pub fn service_info(&self) -> Option<ServiceInfo> {
        match self {
            ComponentKey::Type(service_info)
            | ComponentKey::Bound { service_info, .. } => Some(*service_info),
            ComponentKey::Name(_) => None,
        }
    }
}

impl Display for ComponentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentKey::Type(service_info) => {
                f.write_str(service_info.name())
            }
            ComponentKey::Name(name) => f.write_str(name),
            ComponentKey::Bound { service_info, name } => {
                write!(f, "{}:{}", service_info.name(), name)
            }
        }
    }
}

impl From<&str> for ComponentKey {
    fn from(name: &str) -> Self {
        ComponentKey::name(name)
    }
}

impl From<String> for ComponentKey {
    fn from(name: String) -> Self {
        ComponentKey::Name(name)
    }
}

impl From<ServiceInfo> for ComponentKey {
    fn from(service_info: ServiceInfo) -> Self {
        ComponentKey::Type(service_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Foo;

    #[test]
    fn keys_display_their_contents() {
        assert_eq!("config", ComponentKey::name("config").to_string());
        assert!(ComponentKey::of::<Foo>().to_string().ends_with("Foo"));
        assert!(ComponentKey::bound::<Foo>("primary")
            .to_string()
            .ends_with("Foo:primary"));
    }

    #[test]
    fn bound_and_type_keys_share_service_info() {
        assert_eq!(
            ComponentKey::of::<Foo>().service_info(),
            ComponentKey::bound::<Foo>("primary").service_info()
        );
        assert_eq!(None, ComponentKey::name("foo").service_info());
        assert_ne!(ComponentKey::of::<Foo>(), ComponentKey::bound::<Foo>("x"));
    }
}
