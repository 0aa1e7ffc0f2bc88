use crate::{
    characteristics::{
        AUTOMATIC, CACHE, GUARD_NAME, HIDE_IMPL, HOT_SWAP, LOCK, NO_CACHE,
        NO_HIDE_IMPL, NO_HOT_SWAP, NO_LOCK, NO_POOL, NO_SYNCHRONIZE,
        NO_THREAD_CACHE, POOL, SYNCHRONIZE, THREAD_CACHE,
    },
    AdapterContext, Automating, Behavior, Caching, Characteristic,
    ComponentAdapter, ComponentFactory, ComponentSpec, ConstructorInjection,
    Guarding, HotSwapping, ImplementationHiding, InjectResult, Locking,
    Pooling, Properties, Synchronizing, ThreadCaching,
};
use tracing::trace;

/// Picks the behaviors of each component from its characteristics.
///
/// Components are created per request unless they ask for a behavior. The
/// behaviors are applied in a fixed order, from innermost to outermost:
/// synchronizing, locking, automating, implementation hiding, hot swapping,
/// pooling, thread caching, caching and guarding.
#[derive(Clone, Copy, Default, Debug)]
pub struct AdaptingBehavior;

impl AdaptingBehavior {
    /// Creates a new factory.
    #[must_use]
    pub fn new() -> Self {
        AdaptingBehavior
    }

    /// Builds the behavior chain a component asks for, consuming the
    /// characteristics it acts on. Behaviors which are not asked for have
    /// their negations consumed too.
    fn chain(properties: &mut Properties) -> Box<dyn ComponentFactory> {
        let mut behaviors: Vec<Box<dyn Behavior>> = Vec::new();
        if wants(properties, &SYNCHRONIZE, &NO_SYNCHRONIZE) {
            behaviors.push(Box::new(Synchronizing::new()));
        }
        if wants(properties, &LOCK, &NO_LOCK) {
            behaviors.push(Box::new(Locking::new()));
        }
        if properties.remove_if_present(&AUTOMATIC) {
            behaviors.push(Box::new(Automating::new()));
        }
        if wants(properties, &HIDE_IMPL, &NO_HIDE_IMPL) {
            behaviors.push(Box::new(ImplementationHiding::new()));
        }
        if wants(properties, &HOT_SWAP, &NO_HOT_SWAP) {
            behaviors.push(Box::new(HotSwapping::new()));
        }
        if wants(properties, &POOL, &NO_POOL) {
            behaviors.push(Box::new(Pooling::new()));
        }
        if wants(properties, &THREAD_CACHE, &NO_THREAD_CACHE) {
            behaviors.push(Box::new(ThreadCaching::new()));
        }
        if wants(properties, &CACHE, &NO_CACHE) {
            behaviors.push(Box::new(Caching::new()));
        }
        if properties.contains_name(GUARD_NAME) {
            behaviors.push(Box::new(Guarding::new()));
        }

        wrap_all(behaviors)
    }
}

impl ComponentFactory for AdaptingBehavior {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let key = spec.key.clone();
        let chain = AdaptingBehavior::chain(properties);
        trace!(%key, chain = %describe(chain.as_ref()), "adapting component");
        chain.create_adapter(context, properties, spec)
    }

    /// Pre-built adapters can only be synchronized, hidden, cached or
    /// guarded.
    fn wrap_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let mut behaviors: Vec<Box<dyn Behavior>> = Vec::new();
        if wants(properties, &SYNCHRONIZE, &NO_SYNCHRONIZE) {
            behaviors.push(Box::new(Synchronizing::new()));
        }
        if wants(properties, &HIDE_IMPL, &NO_HIDE_IMPL) {
            behaviors.push(Box::new(ImplementationHiding::new()));
        }
        if wants(properties, &CACHE, &NO_CACHE) {
            behaviors.push(Box::new(Caching::new()));
        }
        if properties.contains_name(GUARD_NAME) {
            behaviors.push(Box::new(Guarding::new()));
        }

        wrap_all(behaviors).wrap_adapter(context, properties, adapter)
    }

    fn descriptor(&self) -> String {
        "AdaptingBehavior".to_string()
    }
}

/// Consumes both forms of a characteristic, returning whether it was asked
/// for.
fn wants(
    properties: &mut Properties,
    on: &Characteristic,
    off: &Characteristic,
) -> bool {
    properties.remove_if_present(off);
    properties.remove_if_present(on)
}

/// Stacks behaviors around constructor injection, the first one innermost.
fn wrap_all(behaviors: Vec<Box<dyn Behavior>>) -> Box<dyn ComponentFactory> {
    let factory: Box<dyn ComponentFactory> = Box::new(ConstructorInjection);
    behaviors
        .into_iter()
        .fold(factory, |factory, behavior| behavior.wrap(factory))
}

fn describe(factory: &dyn ComponentFactory) -> String {
    let mut names = vec![factory.descriptor()];
    let mut current = factory.delegate();
    while let Some(delegate) = current {
        names.push(delegate.descriptor());
        current = delegate.delegate();
    }
    names.join(":")
}

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::{
            guard, CACHE, HIDE_IMPL, LOCK, NO_CACHE, POOL, SYNCHRONIZE,
        },
        interface, Characteristic, Container, InjectError, Properties, Service,
    };

    trait Shape: Service {}

    #[derive(Default)]
    struct Square;
    impl Shape for Square {}

    interface!(Shape = [Square]);

    fn descriptor_of(
        container: &Container,
        properties: impl Into<Properties>,
    ) -> String {
        container
            .register(Square::default)
            .implementing::<dyn Shape>()
            .characteristics(properties)
            .add()
            .unwrap()
            .descriptor()
    }

    #[test]
    fn plain_components_are_injected_per_request() {
        let container = Container::new();
        let adapter = container.add_component(Square::default).unwrap();
        assert!(adapter.descriptor().starts_with("ConstructorInjector-"));
    }

    #[test]
    fn behaviors_are_applied_in_a_fixed_order() {
        let container = Container::new();
        container.add_config("guard", true).unwrap();
        let descriptor = descriptor_of(
            &container,
            [guard("guard"), CACHE, POOL, HIDE_IMPL, LOCK, SYNCHRONIZE],
        );

        let order: Vec<_> = descriptor
            .split(':')
            .map(|part| part.split('(').next().unwrap_or(part))
            .collect();
        assert_eq!(
            ["Guarded", "Cached", "Pooled", "Hidden", "Locked", "Synchronized"],
            order[..6]
        );
    }

    #[test]
    fn negated_characteristics_are_consumed() {
        let container = Container::new();
        let descriptor = descriptor_of(&container, NO_CACHE);
        assert!(descriptor.starts_with("ConstructorInjector-"));
    }

    #[test]
    fn unknown_characteristics_are_rejected() {
        let container = Container::new();
        let result = container
            .register(Square::default)
            .characteristics(Characteristic::new("colour", "red"))
            .add();

        match result {
            Err(InjectError::UnprocessedCharacteristics { properties, .. }) => {
                assert_eq!(Some("red"), properties.value("colour"));
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("registration should fail"),
        }
    }
}
