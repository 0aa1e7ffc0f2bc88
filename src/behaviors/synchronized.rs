use crate::{
    characteristics::{NO_SYNCHRONIZE, SYNCHRONIZE},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentSpec,
    ConstructorInjection, DynSvc, InjectResult, PicoContainer, Properties,
    RequestInfo,
};
use parking_lot::ReentrantMutex;

/// Serializes requests to the wrapped adapter. The lock is reentrant, so a
/// thread may resolve the component again while creating it.
pub struct Synchronized {
    delegate: Box<dyn ComponentAdapter>,
    lock: ReentrantMutex<()>,
}

impl Synchronized {
    /// Synchronizes requests to `delegate`.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>) -> Self {
        Synchronized {
            delegate,
            lock: ReentrantMutex::new(()),
        }
    }
}

impl ComponentAdapter for Synchronized {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let _guard = self.lock.lock();
        self.delegate.instance(container, request_info)
    }

    fn descriptor(&self) -> String {
        format!("Synchronized:{}", self.delegate.descriptor())
    }
}

/// Synchronizes every component unless it is registered with
/// [`NO_SYNCHRONIZE`](crate::characteristics::NO_SYNCHRONIZE).
pub struct Synchronizing {
    delegate: Box<dyn ComponentFactory>,
}

impl Synchronizing {
    /// Creates a synchronizing factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        Synchronizing {
            delegate: Box::new(ConstructorInjection),
        }
    }

    fn apply(
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> Box<dyn ComponentAdapter> {
        if properties.remove_if_present(&NO_SYNCHRONIZE) {
            return adapter;
        }
        properties.remove_if_present(&SYNCHRONIZE);
        context.behavior(Synchronized::new(adapter))
    }
}

impl Default for Synchronizing {
    fn default() -> Self {
        Synchronizing::new()
    }
}

impl ComponentFactory for Synchronizing {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        Ok(Synchronizing::apply(context, properties, adapter))
    }

    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.wrap_adapter(context, properties, adapter)?;
        Ok(Synchronizing::apply(context, properties, adapter))
    }

    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        Some(self.delegate.as_ref())
    }

    fn descriptor(&self) -> String {
        "Synchronizing".to_string()
    }
}

behavior_factory!(Synchronizing);

#[cfg(test)]
mod tests {
    use crate::{Container, PicoContainerExt, Svc, Synchronizing};
    use std::thread;

    #[test]
    fn synchronized_components_resolve_across_threads() {
        let container = Container::builder()
            .with_behavior(Synchronizing::new())
            .build();
        container.add_component(|| 1_u8).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let container = container.clone();
                thread::spawn(move || *container.get::<Svc<u8>>().unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(1, handle.join().unwrap());
        }
    }
}
