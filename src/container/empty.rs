use crate::{
    ComponentAdapter, ComponentKey, DynSvc, InjectError, InjectResult,
    PicoContainer, PicoVisitor, RequestInfo, Resolved, ServiceInfo, Svc,
};

/// A container which holds nothing. Useful as a placeholder parent.
#[derive(Clone, Copy, Default, Debug)]
pub struct EmptyContainer;

impl EmptyContainer {
    /// Creates a new empty container.
    #[must_use]
    pub fn new() -> Self {
        EmptyContainer
    }
}

impl PicoContainer for EmptyContainer {
    fn as_dyn(&self) -> &dyn PicoContainer {
        self
    }

    fn handle(&self) -> Svc<dyn PicoContainer> {
        Svc::new(EmptyContainer)
    }

    fn find_by_key(&self, _key: &ComponentKey) -> Option<Resolved> {
        None
    }

    fn find_by_type(
        &self,
        _service_info: ServiceInfo,
    ) -> InjectResult<Option<Resolved>> {
        Ok(None)
    }

    fn find_all(&self, _service_info: ServiceInfo) -> Vec<Resolved> {
        Vec::new()
    }

    fn component_adapters(&self) -> Vec<Svc<dyn ComponentAdapter>> {
        Vec::new()
    }

    fn parent(&self) -> Option<Svc<dyn PicoContainer>> {
        None
    }

    fn instantiate(
        &self,
        adapter: &Svc<dyn ComponentAdapter>,
        _request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        Err(InjectError::InternalError(format!(
            "an empty container cannot own {}",
            adapter.key()
        )))
    }

    fn accept(&self, visitor: &mut dyn PicoVisitor) {
        visitor.visit_container(self);
    }

    fn name(&self) -> String {
        "empty".to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ComponentKey, EmptyContainer, PicoContainerExt};

    #[test]
    fn finds_nothing() {
        let container = EmptyContainer::new();
        assert!(container.component::<u32>().unwrap().is_none());
        assert!(container
            .component_by_key::<u32>(&ComponentKey::name("port"))
            .unwrap()
            .is_none());
        assert!(container.components::<u32>().unwrap().is_empty());
    }
}
