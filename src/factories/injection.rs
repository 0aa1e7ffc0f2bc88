use crate::{
    characteristics::NONE, AdapterContext, ComponentAdapter, ComponentFactory,
    ComponentSpec, ConstructorInjector, InjectResult, Properties,
};

/// Builds a [`ConstructorInjector`] for every component. This is the
/// innermost factory of every behavior chain.
#[derive(Clone, Copy, Default, Debug)]
pub struct ConstructorInjection;

impl ConstructorInjection {
    /// Creates a new factory.
    #[must_use]
    pub fn new() -> Self {
        ConstructorInjection
    }
}

impl ComponentFactory for ConstructorInjection {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        properties.remove_if_present(&NONE);
        let injector = ConstructorInjector::new(spec, context.clone());
        context.monitor().get().new_injector(&injector.descriptor());
        Ok(Box::new(injector))
    }

    fn descriptor(&self) -> String {
        "ConstructorInjection".to_string()
    }
}
