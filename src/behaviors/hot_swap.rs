use crate::{
    behaviors::stored::Stored,
    characteristics::{HOT_SWAP, NO_HOT_SWAP},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentLifecycle,
    ComponentSpec, ConstructorInjection, DynSvc, InjectError, InjectResult,
    PicoContainer, Properties, RequestInfo, Service, ServiceInfo, Svc,
};

/// Holds on to a single instance which can be replaced while the container
/// is running. Requests made after a swap get the new instance, while
/// holders of the old one keep it.
pub struct HotSwappable {
    delegate: Box<dyn ComponentAdapter>,
    subject: Stored,
}

impl HotSwappable {
    /// Makes the instance of `delegate` swappable.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>) -> Self {
        HotSwappable {
            delegate,
            subject: Stored::default(),
        }
    }

    /// The current instance, if one was created or swapped in.
    #[must_use]
    pub fn subject(&self) -> Option<DynSvc> {
        self.subject.get()
    }

    /// Replaces the current instance, returning the previous one. The new
    /// instance must be of the component's concrete type.
    pub fn swap<T: Service>(
        &self,
        replacement: Svc<T>,
    ) -> InjectResult<Option<DynSvc>> {
        let service_info = ServiceInfo::of::<T>();
        if service_info != self.implementation() {
            return Err(InjectError::InvalidComponent {
                key: self.key().clone(),
                service_info,
            });
        }
        Ok(self.subject.replace(replacement))
    }
}

impl ComponentAdapter for HotSwappable {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        self.subject
            .get_or_create(|| self.delegate.instance(container, request_info))
    }

    fn descriptor(&self) -> String {
        format!("HotSwappable:{}", self.delegate.descriptor())
    }

    fn lifecycle(&self) -> Option<&dyn ComponentLifecycle> {
        Some(self)
    }
}

impl ComponentLifecycle for HotSwappable {
    fn start(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let request_info = RequestInfo::new().with_request(self.key().clone());
        self.subject.start(self.delegate.as_ref(), || {
            self.delegate.instance(container, &request_info)
        })
    }

    fn stop(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }
        self.subject.stop(self.delegate.as_ref())
    }

    fn dispose(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }
        self.subject.dispose(self.delegate.as_ref())
    }

    fn has_lifecycle(&self) -> bool {
        self.component_has_lifecycle()
    }

    fn is_started(&self) -> bool {
        self.subject.is_started()
    }

    fn ensure_started(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let request_info = RequestInfo::new().with_request(self.key().clone());
        self.subject.ensure_started(self.delegate.as_ref(), || {
            self.delegate.instance(container, &request_info)
        })
    }
}

/// Makes every component hot swappable unless it is registered with
/// [`NO_HOT_SWAP`](crate::characteristics::NO_HOT_SWAP).
pub struct HotSwapping {
    delegate: Box<dyn ComponentFactory>,
}

impl HotSwapping {
    /// Creates a hot swapping factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        HotSwapping {
            delegate: Box::new(ConstructorInjection),
        }
    }
}

impl Default for HotSwapping {
    fn default() -> Self {
        HotSwapping::new()
    }
}

impl ComponentFactory for HotSwapping {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        if properties.remove_if_present(&NO_HOT_SWAP) {
            return Ok(adapter);
        }
        properties.remove_if_present(&HOT_SWAP);
        Ok(context.behavior(HotSwappable::new(adapter)))
    }

    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        self.delegate.wrap_adapter(context, properties, adapter)
    }

    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        Some(self.delegate.as_ref())
    }

    fn descriptor(&self) -> String {
        "HotSwapping".to_string()
    }
}

behavior_factory!(HotSwapping);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::HOT_SWAP, Container, HotSwappable, InjectError,
        PicoContainerExt, Svc,
    };

    struct Config(&'static str);

    #[test]
    fn swapped_instance_is_served() {
        let container = Container::new();
        let adapter = container
            .register(|| Config("old"))
            .characteristics(HOT_SWAP)
            .add()
            .unwrap();

        let old: Svc<Config> = container.get().unwrap();
        assert_eq!("old", old.0);

        let swappable = adapter.find_adapter_of_type::<HotSwappable>().unwrap();
        let previous = swappable.swap(Svc::new(Config("new"))).unwrap();
        assert!(previous.is_some());

        let new: Svc<Config> = container.get().unwrap();
        assert_eq!("new", new.0);
        assert_eq!("old", old.0);
    }

    #[test]
    fn swap_rejects_other_types() {
        let container = Container::new();
        let adapter = container
            .register(|| Config("old"))
            .characteristics(HOT_SWAP)
            .add()
            .unwrap();

        let swappable = adapter.find_adapter_of_type::<HotSwappable>().unwrap();
        match swappable.swap(Svc::new(5_i32)) {
            Err(InjectError::InvalidComponent { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("swap should fail"),
        }
    }
}
