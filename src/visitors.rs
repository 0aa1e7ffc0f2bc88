use crate::{ComponentAdapter, ComponentFactory, InjectError, PicoContainer, Svc};

/// Walks a container hierarchy. Each container visits its component
/// factory, then its adapters, then its children.
pub trait PicoVisitor {
    /// Visits a container. Returning `false` skips everything it holds.
    fn visit_container(&mut self, container: &dyn PicoContainer) -> bool;

    /// Visits a component adapter of the last visited container.
    fn visit_component_adapter(&mut self, adapter: &dyn ComponentAdapter);

    /// Visits the component factory of the last visited container, and each
    /// factory it wraps.
    fn visit_component_factory(&mut self, _factory: &dyn ComponentFactory) {}
}

/// Checks that every component of a container hierarchy could be created.
///
/// ## Example
///
/// ```
/// use pico_container::{Container, Svc, VerifyingVisitor};
///
/// struct Engine;
/// struct Car(Svc<Engine>);
///
/// let container = Container::new();
/// container.add_component(Car).unwrap();
///
/// let mut visitor = VerifyingVisitor::new();
/// assert_eq!(1, visitor.traverse(&container).len());
/// assert_eq!(1, visitor.verified());
/// ```
#[derive(Default)]
pub struct VerifyingVisitor {
    current: Option<Svc<dyn PicoContainer>>,
    failures: Vec<InjectError>,
    verified: usize,
}

impl VerifyingVisitor {
    /// Creates a new visitor.
    #[must_use]
    pub fn new() -> Self {
        VerifyingVisitor::default()
    }

    /// Verifies every component reachable from `container`, returning the
    /// failures found.
    pub fn traverse(&mut self, container: &dyn PicoContainer) -> &[InjectError] {
        self.failures.clear();
        self.verified = 0;

        container.accept(self);
        self.current = None;
        &self.failures
    }

    /// Takes the failures found by the last traversal.
    #[must_use]
    pub fn into_failures(self) -> Vec<InjectError> {
        self.failures
    }

    /// The number of adapters the last traversal verified.
    #[must_use]
    pub fn verified(&self) -> usize {
        self.verified
    }
}

impl PicoVisitor for VerifyingVisitor {
    fn visit_container(&mut self, container: &dyn PicoContainer) -> bool {
        self.current = Some(container.handle());
        true
    }

    fn visit_component_adapter(&mut self, adapter: &dyn ComponentAdapter) {
        self.verified += 1;
        if let Some(container) = &self.current {
            if let Err(error) = adapter.verify(container.as_ref()) {
                self.failures.push(error);
            }
        }
    }
}
