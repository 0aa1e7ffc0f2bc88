use crate::{DynSvc, Service, ServiceInfo, Svc};

/// Indicates that a type can be viewed from an erased component. Each sized
/// service type can view itself by downcasting. Trait objects (`dyn Trait`)
/// must be declared with the [`interface!`](crate::interface) macro, which
/// lists the implementations they can be viewed from.
pub trait Interface: Service {
    /// Attempts to view an erased component as this interface.
    fn from_component(component: DynSvc) -> Option<Svc<Self>>;
}

impl<T: Service> Interface for T {
    fn from_component(component: DynSvc) -> Option<Svc<Self>> {
        component.downcast::<T>().ok()
    }
}

/// Marker trait that indicates that a type is an interface for another type.
/// Each sized type is an interface for itself, and each `dyn Trait` is an
/// interface for the types listed in its [`interface!`](crate::interface)
/// declaration. Registrations use this to check at compile time that a
/// component really implements the interfaces it exposes.
pub trait InterfaceFor<T: Service>: Interface {
    /// Converts a pointer to the implementation into a pointer to the
    /// interface.
    fn from_svc(service: Svc<T>) -> Svc<Self>;
}

impl<T: Service> InterfaceFor<T> for T {
    fn from_svc(service: Svc<T>) -> Svc<Self> {
        service
    }
}

/// Marks a trait as being an interface for many other types. This means that
/// a request for the given trait can resolve to any component built from one
/// of the types indicated by this macro invocation. The trait must have
/// `Send + Sync` as supertraits.
///
/// # Example
/// ```
/// use pico_container::interface;
///
/// struct Bar;
/// #[cfg(test)]
/// struct MockBar;
///
/// trait Foo: Send + Sync {}
/// impl Foo for Bar {}
/// #[cfg(test)]
/// impl Foo for MockBar {}
///
/// // Requests for `dyn Foo` can resolve to either `Bar` or, in a test run,
/// // `MockBar`. Note that attributes are allowed on each of the listed types.
/// interface!(
///     Foo = [
///         Bar,
///         #[cfg(test)]
///         MockBar,
///     ]
/// );
/// ```
#[macro_export]
macro_rules! interface {
    ($trait:path = [$($(#[$attr:meta])* $impl:ty),* $(,)?]) => {
        impl $crate::Interface for dyn $trait {
            #[allow(unused_variables)]
            fn from_component(
                component: $crate::DynSvc,
            ) -> ::std::option::Option<$crate::Svc<Self>> {
                $(
                    $(#[$attr])*
                    let component = match component.downcast::<$impl>() {
                        Ok(service) => {
                            return ::std::option::Option::Some(
                                service as $crate::Svc<Self>,
                            );
                        }
                        Err(component) => component,
                    };
                )*
                ::std::option::Option::None
            }
        }

        $(
            $(#[$attr])*
            impl $crate::InterfaceFor<$impl> for dyn $trait {
                fn from_svc(service: $crate::Svc<$impl>) -> $crate::Svc<Self> {
                    service
                }
            }
        )*
    };
}

/// The set of additional types a component can be requested as.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Interfaces {
    services: Vec<ServiceInfo>,
}

impl Interfaces {
    /// Creates an empty set of interfaces.
    #[must_use]
    pub fn new() -> Self {
        Interfaces::default()
    }

    /// Adds an interface to the set.
    pub fn add(&mut self, service_info: ServiceInfo) {
        if !self.contains(service_info) {
            self.services.push(service_info);
        }
    }

    /// Whether the set contains an interface.
    #[must_use]
    pub fn contains(&self, service_info: ServiceInfo) -> bool {
        self.services.contains(&service_info)
    }

    /// Iterates over the interfaces in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = ServiceInfo> + '_ {
        self.services.iter().copied()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Speaker: Send + Sync {
        fn speak(&self) -> &'static str;
    }

    struct Dog;
    impl Speaker for Dog {
        fn speak(&self) -> &'static str {
            "woof"
        }
    }

    struct Cat;
    impl Speaker for Cat {
        fn speak(&self) -> &'static str {
            "meow"
        }
    }

    interface!(Speaker = [Dog, Cat]);

    #[test]
    fn trait_objects_view_listed_implementations() {
        let cat: DynSvc = Svc::new(Cat);
        let speaker = <dyn Speaker>::from_component(cat).unwrap();
        assert_eq!("meow", speaker.speak());

        let other: DynSvc = Svc::new(5_i32);
        assert!(<dyn Speaker>::from_component(other).is_none());
    }

    #[test]
    fn sized_types_view_themselves() {
        let dog: DynSvc = Svc::new(Dog);
        assert!(Dog::from_component(dog.clone()).is_some());
        assert!(Cat::from_component(dog).is_none());
    }

    #[test]
    fn interfaces_are_deduplicated() {
        let mut interfaces = Interfaces::new();
        interfaces.add(ServiceInfo::of::<dyn Speaker>());
        interfaces.add(ServiceInfo::of::<dyn Speaker>());
        assert_eq!(1, interfaces.iter().count());
    }
}
