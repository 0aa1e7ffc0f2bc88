use crate::{
    AdapterContext, ComponentAdapter, ComponentSpec, InjectResult,
    PicoVisitor, Properties, Service,
};

/// Creates the adapter for each component registered with a container.
///
/// Factories consume the characteristics they act on from `properties`.
/// Anything left over once the adapter is built is reported as an error by
/// the container.
pub trait ComponentFactory: Service {
    /// Creates an adapter for a component built by a factory.
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>>;

    /// Wraps an adapter which was built elsewhere, such as an instance
    /// adapter, in the behaviors this factory applies to those.
    fn wrap_adapter(
        &self,
        _context: &AdapterContext,
        _properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        Ok(adapter)
    }

    /// The factory this one wraps, if it is a behavior.
    fn delegate(&self) -> Option<&dyn ComponentFactory> {
        None
    }

    /// A short description of this factory.
    fn descriptor(&self) -> String;
}

impl dyn ComponentFactory {
    /// Lets a visitor visit this factory and every factory it wraps.
    pub fn accept(&self, visitor: &mut dyn PicoVisitor) {
        visitor.visit_component_factory(self);
        if let Some(delegate) = self.delegate() {
            delegate.accept(visitor);
        }
    }
}

/// A component factory which wraps the adapters of another factory.
pub trait Behavior: ComponentFactory {
    /// Replaces the factory this behavior wraps.
    fn wrap(
        self: Box<Self>,
        delegate: Box<dyn ComponentFactory>,
    ) -> Box<dyn ComponentFactory>;
}
