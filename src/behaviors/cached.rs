use crate::{
    behaviors::stored::Stored,
    characteristics::{CACHE, NO_CACHE},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentLifecycle,
    ComponentSpec, ConstructorInjection, DynSvc, InjectResult, PicoContainer,
    Properties, RequestInfo,
};

/// Holds on to the first instance created by the wrapped adapter and returns
/// it for every later request.
///
/// The held instance takes part in its container's lifecycle: it is started
/// at most once, can only be stopped after being started, and cannot be used
/// again after being disposed.
pub struct Cached {
    delegate: Box<dyn ComponentAdapter>,
    stored: Stored,
}

impl Cached {
    /// Caches the instances of `delegate`.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>) -> Self {
        Cached {
            delegate,
            stored: Stored::default(),
        }
    }

    /// The cached instance, if one was created.
    #[must_use]
    pub fn stored(&self) -> Option<DynSvc> {
        self.stored.get()
    }

    /// Drops the cached instance so the next request creates a new one. A
    /// started instance is stopped and disposed first.
    pub fn flush(&self) -> InjectResult<()> {
        self.stored.flush(self.delegate.as_ref())
    }
}

impl ComponentAdapter for Cached {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        self.stored
            .get_or_create(|| self.delegate.instance(container, request_info))
    }

    fn descriptor(&self) -> String {
        let lifecycle = if self.component_has_lifecycle() {
            "+Lifecycle"
        } else {
            ""
        };
        format!("Cached{}:{}", lifecycle, self.delegate.descriptor())
    }

    fn lifecycle(&self) -> Option<&dyn ComponentLifecycle> {
        Some(self)
    }
}

impl ComponentLifecycle for Cached {
    fn start(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let request_info = RequestInfo::new().with_request(self.key().clone());
        self.stored.start(self.delegate.as_ref(), || {
            self.delegate.instance(container, &request_info)
        })
    }

    fn stop(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }
        self.stored.stop(self.delegate.as_ref())
    }

    fn dispose(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }
        self.stored.dispose(self.delegate.as_ref())
    }

    fn has_lifecycle(&self) -> bool {
        self.component_has_lifecycle()
    }

    fn is_started(&self) -> bool {
        self.stored.is_started()
    }

    fn ensure_started(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let request_info = RequestInfo::new().with_request(self.key().clone());
        self.stored.ensure_started(self.delegate.as_ref(), || {
            self.delegate.instance(container, &request_info)
        })
    }
}

/// Caches every component unless it is registered with
/// [`NO_CACHE`](crate::characteristics::NO_CACHE).
pub struct Caching {
    delegate: Box<dyn ComponentFactory>,
}

impl Caching {
    /// Creates a caching factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        Caching {
            delegate: Box::new(ConstructorInjection),
        }
    }

    fn apply(
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> Box<dyn ComponentAdapter> {
        if properties.remove_if_present(&NO_CACHE) {
            return adapter;
        }
        properties.remove_if_present(&CACHE);
        context.behavior(Cached::new(adapter))
    }
}

impl Default for Caching {
    fn default() -> Self {
        Caching::new()
    }
}

impl ComponentFactory for Caching {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        Ok(Caching::apply(context, properties, adapter))
    }

    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.wrap_adapter(context, properties, adapter)?;
        Ok(Caching::apply(context, properties, adapter))
    }

    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        Some(self.delegate.as_ref())
    }

    fn descriptor(&self) -> String {
        "Caching".to_string()
    }
}

behavior_factory!(Caching);

/// Caches only the components registered with
/// [`CACHE`](crate::characteristics::CACHE).
pub struct OptInCaching {
    delegate: Box<dyn ComponentFactory>,
}

impl OptInCaching {
    /// Creates an opt-in caching factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        OptInCaching {
            delegate: Box::new(ConstructorInjection),
        }
    }

    fn apply(
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> Box<dyn ComponentAdapter> {
        properties.remove_if_present(&NO_CACHE);
        if properties.remove_if_present(&CACHE) {
            context.behavior(Cached::new(adapter))
        } else {
            adapter
        }
    }
}

impl Default for OptInCaching {
    fn default() -> Self {
        OptInCaching::new()
    }
}

impl ComponentFactory for OptInCaching {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        Ok(OptInCaching::apply(context, properties, adapter))
    }

    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.wrap_adapter(context, properties, adapter)?;
        Ok(OptInCaching::apply(context, properties, adapter))
    }

    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        Some(self.delegate.as_ref())
    }

    fn descriptor(&self) -> String {
        "OptInCaching".to_string()
    }
}

behavior_factory!(OptInCaching);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::{CACHE, NO_CACHE},
        BoxError, Cached, Caching, ComponentAdapter, Container, InjectError,
        PicoContainerExt, Startable, Svc,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl Startable for Counter {
        fn start(&self) -> Result<(), BoxError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&self) -> Result<(), BoxError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn cached_component_is_shared() {
        let container = Container::new();
        container
            .register(Counter::default)
            .characteristics(CACHE)
            .add()
            .unwrap();

        let first: Svc<Counter> = container.get().unwrap();
        let second: Svc<Counter> = container.get().unwrap();
        assert!(Svc::ptr_eq(&first, &second));
    }

    #[test]
    fn caching_factory_honours_no_cache() {
        let container = Container::builder().with_behavior(Caching::new()).build();
        container
            .register(Counter::default)
            .characteristics(NO_CACHE)
            .add()
            .unwrap();

        let first: Svc<Counter> = container.get().unwrap();
        let second: Svc<Counter> = container.get().unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }

    #[test]
    fn lifecycle_guards_are_enforced() {
        let container = Container::new();
        let adapter = container
            .register(Counter::default)
            .characteristics(CACHE)
            .startable()
            .add()
            .unwrap();
        let lifecycle = adapter.lifecycle().unwrap();

        match lifecycle.stop(&container) {
            Err(InjectError::IllegalState { message, .. }) => {
                assert_eq!("not instantiated", message);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("stop should fail"),
        }

        lifecycle.start(&container).unwrap();
        assert!(lifecycle.start(&container).is_err());
        lifecycle.stop(&container).unwrap();
        lifecycle.dispose(&container).unwrap();

        match lifecycle.start(&container) {
            Err(InjectError::IllegalState { message, .. }) => {
                assert_eq!("already disposed", message);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("start should fail"),
        }

        let counter: Svc<Counter> = container.get().unwrap();
        assert_eq!(1, counter.starts.load(Ordering::SeqCst));
        assert_eq!(1, counter.stops.load(Ordering::SeqCst));
    }

    #[test]
    fn flush_drops_the_instance() {
        let container = Container::new();
        let adapter = container
            .register(Counter::default)
            .characteristics(CACHE)
            .startable()
            .add()
            .unwrap();

        container.start().unwrap();
        let first: Svc<Counter> = container.get().unwrap();
        let cached = adapter.find_adapter_of_type::<Cached>().unwrap();
        assert!(cached.descriptor().starts_with("Cached+Lifecycle:"));

        cached.flush().unwrap();
        assert!(cached.stored().is_none());
        assert_eq!(1, first.stops.load(Ordering::SeqCst));

        let second: Svc<Counter> = container.get().unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }
}
