use crate::{
    characteristics::AUTOMATIC, AdapterContext, ComponentAdapter,
    ComponentFactory, ComponentSpec, ConstructorInjection, DynSvc,
    InjectResult, PicoContainer, Properties, RequestInfo,
};

/// Marks a component to be instantiated when its container starts, even
/// though it has no lifecycle of its own.
pub struct Automated {
    delegate: Box<dyn ComponentAdapter>,
}

impl Automated {
    /// Makes `delegate` eager.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>) -> Self {
        Automated { delegate }
    }
}

impl ComponentAdapter for Automated {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        self.delegate.instance(container, request_info)
    }

    fn descriptor(&self) -> String {
        format!("Automated:{}", self.delegate.descriptor())
    }

    fn is_eager(&self) -> bool {
        true
    }
}

/// Makes every component eager.
pub struct Automating {
    delegate: Box<dyn ComponentFactory>,
}

impl Automating {
    /// Creates an automating factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        Automating {
            delegate: Box::new(ConstructorInjection),
        }
    }
}

impl Default for Automating {
    fn default() -> Self {
        Automating::new()
    }
}

impl ComponentFactory for Automating {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        properties.remove_if_present(&AUTOMATIC);
        Ok(context.behavior(Automated::new(adapter)))
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
        "Automating".to_string()
    }
}

behavior_factory!(Automating);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::{AUTOMATIC, CACHE},
        Container,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Warmup;

    #[test]
    fn automatic_components_are_created_on_start() {
        static CREATED: AtomicUsize = AtomicUsize::new(0);

        let container = Container::new();
        container
            .register(|| {
                CREATED.fetch_add(1, Ordering::SeqCst);
                Warmup
            })
            .characteristics([AUTOMATIC, CACHE])
            .add()
            .unwrap();
        assert_eq!(0, CREATED.load(Ordering::SeqCst));

        container.start().unwrap();
        assert_eq!(1, CREATED.load(Ordering::SeqCst));
    }
}
