use crate::{
    ComponentAdapter, ComponentKey, DynSvc, InjectError, InjectResult,
    PicoContainer, PicoVisitor, RequestInfo, Resolved, ServiceInfo, Svc,
};
use parking_lot::RwLock;

/// Searches several containers in turn. The first container which has a
/// component wins.
///
/// ## Example
///
/// ```
/// use pico_container::{
///     CompositeContainer, Container, PicoContainer, PicoContainerExt,
/// };
///
/// let defaults = Container::new();
/// defaults.add_instance(8080_u16).unwrap();
/// defaults.add_instance("localhost".to_string()).unwrap();
///
/// let overrides = Container::new();
/// overrides.add_instance(9000_u16).unwrap();
///
/// let composite = CompositeContainer::new([overrides.handle(), defaults.handle()]);
/// assert_eq!(9000, *composite.component::<u16>().unwrap().unwrap());
/// assert_eq!(
///     "localhost",
///     composite.component::<String>().unwrap().unwrap().as_str()
/// );
/// ```
#[derive(Default)]
pub struct CompositeContainer {
    containers: Svc<RwLock<Vec<Svc<dyn PicoContainer>>>>,
}

impl CompositeContainer {
    /// Creates a composite searching `containers` in order.
    #[must_use]
    pub fn new(containers: impl IntoIterator<Item = Svc<dyn PicoContainer>>) -> Self {
        CompositeContainer {
            containers: Svc::new(RwLock::new(containers.into_iter().collect())),
        }
    }

    /// Adds a container to the end of the search order.
    pub fn add_container(&self, container: Svc<dyn PicoContainer>) {
        self.containers.write().push(container);
    }

    /// Removes a container. Returns `false` if it was not part of this
    /// composite.
    pub fn remove_container(&self, container: &Svc<dyn PicoContainer>) -> bool {
        let mut containers = self.containers.write();
        let before = containers.len();
        containers.retain(|other| {
            !std::ptr::eq(
                Svc::as_ptr(other).cast::<()>(),
                Svc::as_ptr(container).cast::<()>(),
            )
        });
        containers.len() < before
    }

    fn containers(&self) -> Vec<Svc<dyn PicoContainer>> {
        self.containers.read().clone()
    }
}

impl PicoContainer for CompositeContainer {
    fn as_dyn(&self) -> &dyn PicoContainer {
        self
    }

    fn handle(&self) -> Svc<dyn PicoContainer> {
        Svc::new(CompositeContainer {
            containers: self.containers.clone(),
        })
    }

    fn find_by_key(&self, key: &ComponentKey) -> Option<Resolved> {
        self.containers()
            .iter()
            .find_map(|container| container.find_by_key(key))
    }

    fn find_by_type(
        &self,
        service_info: ServiceInfo,
    ) -> InjectResult<Option<Resolved>> {
        for container in self.containers() {
            if let Some(resolved) = container.find_by_type(service_info)? {
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }

    fn find_all(&self, service_info: ServiceInfo) -> Vec<Resolved> {
        self.containers()
            .iter()
            .flat_map(|container| container.find_all(service_info))
            .collect()
    }

    fn component_adapters(&self) -> Vec<Svc<dyn ComponentAdapter>> {
        self.containers()
            .iter()
            .flat_map(|container| container.component_adapters())
            .collect()
    }

    fn parent(&self) -> Option<Svc<dyn PicoContainer>> {
        None
    }

    fn instantiate(
        &self,
        adapter: &Svc<dyn ComponentAdapter>,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let owner = self.containers().into_iter().find(|container| {
            container.component_adapters().iter().any(|other| {
                std::ptr::eq(
                    Svc::as_ptr(other).cast::<()>(),
                    Svc::as_ptr(adapter).cast::<()>(),
                )
            })
        });

        match owner {
            Some(owner) => owner.instantiate(adapter, request_info),
            None => Err(InjectError::InternalError(format!(
                "no container in the composite owns {}",
                adapter.key()
            ))),
        }
    }

    fn accept(&self, visitor: &mut dyn PicoVisitor) {
        if visitor.visit_container(self) {
            for container in self.containers() {
                container.accept(visitor);
            }
        }
    }

    fn no_component_found(&self, key: &ComponentKey) {
        if let Some(first) = self.containers().first() {
            first.no_component_found(key);
        }
    }

    fn name(&self) -> String {
        "composite".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ComponentKey, CompositeContainer, Container, PicoContainer,
        PicoContainerExt, Svc,
    };

    #[test]
    fn collections_span_every_container() {
        let first = Container::new();
        first.add_config("a", 1_i32).unwrap();
        let second = Container::new();
        second.add_config("b", 2_i32).unwrap();

        let composite = CompositeContainer::new([first.handle()]);
        composite.add_container(second.handle());

        let values: Vec<Svc<i32>> = composite.get().unwrap();
        assert_eq!(2, values.len());
        assert_eq!(2, composite.component_adapters().len());
    }

    #[test]
    fn removed_containers_are_not_searched() {
        let container = Container::new();
        container.add_config("a", 1_i32).unwrap();
        let handle = container.handle();

        let composite = CompositeContainer::new([handle.clone()]);
        assert!(composite.find_by_key(&ComponentKey::name("a")).is_some());
        assert!(composite.remove_container(&handle));
        assert!(composite.find_by_key(&ComponentKey::name("a")).is_none());
    }
}
