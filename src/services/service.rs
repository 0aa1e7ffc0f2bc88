use crate::{ComponentKey, LifecyclePhase, Properties};
use derive_more::Display;
use std::{
    any::{Any, TypeId},
    error::Error,
    fmt::{Display, Formatter},
    time::Duration,
};

/// A reference-counted pointer holding a service. Components are shared
/// between threads by their behaviors, so this is always an
/// [`Arc<T>`](std::sync::Arc).
pub type Svc<T> = std::sync::Arc<T>;

/// A service pointer holding an erased component instance.
pub type DynSvc = Svc<dyn Any + Send + Sync>;

/// A boxed error returned by user code, such as a fallible factory or a
/// lifecycle hook.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Implemented automatically on types that are capable of being a
/// component.
pub trait Service: Any + Send + Sync {}
impl<T: ?Sized + Any + Send + Sync> Service for T {}

/// A result from attempting to resolve, construct or manage a component.
pub type InjectResult<T> = Result<T, InjectError>;

/// Type information about a service.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct ServiceInfo {
    id: TypeId,
    name: &'static str,
}

impl ServiceInfo {
    /// Creates a [`ServiceInfo`] for the given type.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        ServiceInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Gets the [`TypeId`] for this service.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Gets the type name of this service.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Display for ServiceInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// An error that has occurred while registering, resolving or managing a
/// component.
#[derive(Debug, Display)]
#[non_exhaustive]
pub enum InjectError {
    /// No component is registered for the requested key or type.
    #[display(fmt = "{} has no component registered", key)]
    MissingComponent {
        /// The key that was requested.
        key: ComponentKey,
    },

    /// A component for a dependency of the requested service is missing.
    #[display(
        fmt = "{} is missing a dependency on {}",
        "service_info.name()",
        dependency
    )]
    MissingDependency {
        /// The service that was being constructed.
        service_info: ServiceInfo,

        /// The dependency that could not be satisfied.
        dependency: ComponentKey,
    },

    /// More than one component could satisfy a request for a type.
    #[display(
        fmt = "{} is ambiguous, candidates are [{}]",
        "service_info.name()",
        "fmt_keys(candidates, \", \")"
    )]
    AmbiguousResolution {
        /// The type that was requested.
        service_info: ServiceInfo,

        /// Keys of every component which could satisfy the request.
        candidates: Vec<ComponentKey>,
    },

    /// A cycle was detected during activation of a component.
    #[display(
        fmt = "a cycle was detected during activation of {} [{}]",
        key,
        "fmt_keys(cycle, \" -> \")"
    )]
    CycleDetected {
        /// The component that was requested a second time.
        key: ComponentKey,

        /// The chain of components that were requested during resolution.
        cycle: Vec<ComponentKey>,
    },

    /// A component with the same key is already registered.
    #[display(fmt = "duplicate keys not allowed, {} is already registered", key)]
    DuplicateKey {
        /// The duplicated key.
        key: ComponentKey,
    },

    /// A registration carried characteristics that no component factory
    /// understood.
    #[display(
        fmt = "unprocessed characteristics {} for {}",
        properties,
        key
    )]
    UnprocessedCharacteristics {
        /// The component being registered.
        key: ComponentKey,

        /// The leftover characteristics.
        properties: Properties,
    },

    /// The component cannot be viewed as the requested type.
    #[display(fmt = "{} cannot be viewed as {}", key, "service_info.name()")]
    InvalidComponent {
        /// The component that was resolved.
        key: ComponentKey,

        /// The type that was requested.
        service_info: ServiceInfo,
    },

    /// Implementation hiding requires the component to be keyed by an
    /// interface rather than by its concrete type.
    #[display(
        fmt = "{} must be keyed by an interface to hide its implementation",
        key
    )]
    NotAnInterface {
        /// The offending key.
        key: ComponentKey,
    },

    /// A parameter could not be applied to a dependency.
    #[display(
        fmt = "parameter {} cannot satisfy {}",
        parameter,
        "service_info.name()"
    )]
    ParameterMismatch {
        /// The dependency that the parameter was applied to.
        service_info: ServiceInfo,

        /// A description of the parameter.
        parameter: String,
    },

    /// The guard of a component did not allow it to be created.
    #[display(fmt = "the guard of {} did not allow it to be created", key)]
    ConditionsNotMet {
        /// The guarded component.
        key: ComponentKey,
    },

    /// An error occurred during activation of a component.
    #[display(fmt = "an error occurred during activation of {}: {}", key, inner)]
    ActivationFailed {
        /// The component that was being activated.
        key: ComponentKey,

        /// The error returned by the factory.
        inner: BoxError,
    },

    /// A lifecycle hook of a component returned an error.
    #[display(fmt = "{} failed to {}: {}", key, phase, inner)]
    LifecycleFailed {
        /// The component whose hook failed.
        key: ComponentKey,

        /// The lifecycle phase that failed.
        phase: LifecyclePhase,

        /// The error returned by the hook.
        inner: BoxError,
    },

    /// Lifecycle failures collected by a monitor.
    #[display(fmt = "{}", "fmt_failures(failures)")]
    LifecycleFailures {
        /// Every failure that was collected.
        failures: Vec<InjectError>,
    },

    /// A lifecycle transition was attempted from the wrong state.
    #[display(fmt = "'{}' {}", key, message)]
    IllegalState {
        /// The component or container in the wrong state.
        key: ComponentKey,

        /// A description of the violated state.
        message: &'static str,
    },

    /// A pool had no free instance and was configured not to wait.
    #[display(fmt = "pool exhausted for {}", key)]
    PoolExhausted {
        /// The pooled component.
        key: ComponentKey,
    },

    /// A pool did not free an instance before the wait timed out.
    #[display(
        fmt = "timed out after {}ms waiting for a pooled {}",
        "waited.as_millis()",
        key
    )]
    PoolTimedOut {
        /// The pooled component.
        key: ComponentKey,

        /// How long the request waited.
        waited: Duration,
    },

    /// A locked component could not acquire its lock in time.
    #[display(fmt = "timed out waiting for the lock of {}", key)]
    LockTimedOut {
        /// The locked component.
        key: ComponentKey,
    },

    /// The container was configured or composed incorrectly.
    #[display(fmt = "composition error: {}", _0)]
    Composition(String),

    /// An unexpected error has occurred. This is usually caused by a bug in
    /// the library itself.
    #[display(
        fmt = "an unexpected error occurred (please report this): {}",
        _0
    )]
    InternalError(String),
}

impl Error for InjectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InjectError::ActivationFailed { inner, .. }
            | InjectError::LifecycleFailed { inner, .. } => Some(&**inner),
            _ => None,
        }
    }
}

fn fmt_keys(keys: &[ComponentKey], separator: &str) -> String {
    let mut joined = String::new();
    for key in keys {
        if !joined.is_empty() {
            joined.push_str(separator);
        }
        joined.push_str(&key.to_string());
    }
    joined
}

fn fmt_failures(failures: &[InjectError]) -> String {
    let mut joined = String::new();
    for failure in failures {
        joined.push_str(&failure.to_string());
        joined.push_str(";  ");
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn cycle_is_joined_with_arrows() {
        let error = InjectError::CycleDetected {
            key: ComponentKey::name("a"),
            cycle: vec![
                ComponentKey::name("a"),
                ComponentKey::name("b"),
                ComponentKey::name("a"),
            ],
        };

        assert_eq!(
            "a cycle was detected during activation of a [a -> b -> a]",
            error.to_string()
        );
    }

    #[test]
    fn activation_failure_exposes_source() {
        let inner: BoxError = "boom".into();
        let error = InjectError::ActivationFailed {
            key: ComponentKey::name("foo"),
            inner,
        };

        let source = error.source().map(ToString::to_string);
        assert_eq!(Some("boom".to_string()), source);
    }

    #[test]
    fn lifecycle_failures_are_joined() {
        let error = InjectError::LifecycleFailures {
            failures: vec![
                InjectError::Composition("one".into()),
                InjectError::Composition("two".into()),
            ],
        };

        assert_eq!(
            "composition error: one;  composition error: two;  ",
            error.to_string()
        );
    }
}
