use crate::{
    AdapterContext, AdaptingBehavior, Automating, Behavior, Caching,
    ComponentFactory, ComponentMonitor, ConstructorInjection, Container,
    ContainerParts, Guarding, HotSwapping, ImplementationHiding,
    LifecycleStrategy, Locking, NullComponentMonitor, NullLifecycleStrategy,
    PicoContainer, Pooling, Properties, SharedMonitor,
    StartableLifecycleStrategy, Svc, Synchronizing, ThreadCaching,
    TracingComponentMonitor,
};
use tracing::debug;

enum Parent {
    Container(Container),
    Dyn(Svc<dyn PicoContainer>),
}

/// A builder for a [`Container`].
///
/// Unless configured otherwise, the container has no lifecycle strategy,
/// reports to no monitor, and picks behaviors from characteristics with an
/// [`AdaptingBehavior`].
///
/// ## Example
///
/// ```
/// use pico_container::{Container, PicoContainerExt, Svc};
///
/// #[derive(Default)]
/// struct Clock;
///
/// let container = Container::builder()
///     .with_name("app")
///     .with_caching()
///     .with_lifecycle()
///     .build();
/// container.add_component(Clock::default).unwrap();
///
/// let first: Svc<Clock> = container.get().unwrap();
/// let second: Svc<Clock> = container.get().unwrap();
/// assert!(Svc::ptr_eq(&first, &second));
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    name: String,
    parent: Option<Parent>,
    add_child_to_parent: bool,
    monitor: Option<Svc<dyn ComponentMonitor>>,
    strategy: Option<Svc<dyn LifecycleStrategy>>,
    behaviors: Vec<Box<dyn Behavior>>,
    component_factory: Option<Box<dyn ComponentFactory>>,
    properties: Properties,
}

impl ContainerBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        ContainerBuilder::default()
    }

    /// Names the container.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Makes the container a child of `parent`, able to see its components.
    #[must_use]
    pub fn with_parent(mut self, parent: &Container) -> Self {
        self.parent = Some(Parent::Container(parent.clone()));
        self
    }

    /// Makes the container a child of any other kind of container.
    #[must_use]
    pub fn with_dyn_parent(mut self, parent: Svc<dyn PicoContainer>) -> Self {
        self.parent = Some(Parent::Dyn(parent));
        self
    }

    /// Registers the container as a child of its parent, so it follows the
    /// parent's lifecycle. Only has an effect when the parent is a
    /// [`Container`].
    #[must_use]
    pub fn add_child_to_parent(mut self) -> Self {
        self.add_child_to_parent = true;
        self
    }

    /// Reports component events to `monitor`.
    #[must_use]
    pub fn with_monitor(mut self, monitor: Svc<dyn ComponentMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Reports component events as `tracing` events.
    #[must_use]
    pub fn with_tracing_monitor(self) -> Self {
        self.with_monitor(Svc::new(TracingComponentMonitor::new()))
    }

    /// Starts and stops [`Startable`](crate::Startable) components, and
    /// disposes [`Disposable`](crate::Disposable) ones, with the container.
    #[must_use]
    pub fn with_lifecycle(self) -> Self {
        self.with_lifecycle_strategy(Svc::new(StartableLifecycleStrategy::new()))
    }

    /// Like [`with_lifecycle`](ContainerBuilder::with_lifecycle), but
    /// components are only started when first resolved from a started
    /// container.
    #[must_use]
    pub fn with_lazy_lifecycle(self) -> Self {
        self.with_lifecycle_strategy(Svc::new(StartableLifecycleStrategy::lazy()))
    }

    /// Uses a custom lifecycle strategy.
    #[must_use]
    pub fn with_lifecycle_strategy(
        mut self,
        strategy: Svc<dyn LifecycleStrategy>,
    ) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Adds a behavior to every component. Behaviors added earlier wrap
    /// behaviors added later.
    #[must_use]
    pub fn with_behavior<B: Behavior>(mut self, behavior: B) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    /// Adds several behaviors, outermost first.
    #[must_use]
    pub fn with_behaviors(
        mut self,
        behaviors: impl IntoIterator<Item = Box<dyn Behavior>>,
    ) -> Self {
        self.behaviors.extend(behaviors);
        self
    }

    /// Caches every component unless it is registered with `NO_CACHE`.
    #[must_use]
    pub fn with_caching(self) -> Self {
        self.with_behavior(Caching::new())
    }

    /// Caches a component per thread.
    #[must_use]
    pub fn with_thread_caching(self) -> Self {
        self.with_behavior(ThreadCaching::new())
    }

    /// Hides the implementation of components keyed by an interface.
    #[must_use]
    pub fn with_hidden_implementations(self) -> Self {
        self.with_behavior(ImplementationHiding::new())
    }

    /// Serializes the creation of each component.
    #[must_use]
    pub fn with_synchronizing(self) -> Self {
        self.with_behavior(Synchronizing::new())
    }

    /// Serializes the creation of each component, with a non-reentrant
    /// lock.
    #[must_use]
    pub fn with_locking(self) -> Self {
        self.with_behavior(Locking::new())
    }

    /// Creates every component when the container starts.
    #[must_use]
    pub fn with_automatic(self) -> Self {
        self.with_behavior(Automating::new())
    }

    /// Pools the instances of every component.
    #[must_use]
    pub fn with_pooling(self) -> Self {
        self.with_behavior(Pooling::new())
    }

    /// Lets the instance of every component be swapped at runtime.
    #[must_use]
    pub fn with_hot_swapping(self) -> Self {
        self.with_behavior(HotSwapping::new())
    }

    /// Guards components registered with a guard characteristic.
    #[must_use]
    pub fn with_guarding(self) -> Self {
        self.with_behavior(Guarding::new())
    }

    /// Replaces the factory the behaviors wrap.
    #[must_use]
    pub fn with_component_factory<F: ComponentFactory>(mut self, factory: F) -> Self {
        self.component_factory = Some(Box::new(factory));
        self
    }

    /// Adds characteristics to every component registered with the
    /// container.
    #[must_use]
    pub fn with_characteristics(mut self, properties: impl Into<Properties>) -> Self {
        self.properties.merge(&properties.into());
        self
    }

    /// Builds the container.
    #[must_use]
    pub fn build(self) -> Container {
        let ContainerBuilder {
            name,
            parent,
            add_child_to_parent,
            monitor,
            strategy,
            behaviors,
            component_factory,
            properties,
        } = self;

        let base = component_factory.unwrap_or_else(|| {
            if behaviors.is_empty() {
                Box::new(AdaptingBehavior::new())
            } else {
                Box::new(ConstructorInjection::new())
            }
        });
        let factory = behaviors
            .into_iter()
            .rev()
            .fold(base, |factory, behavior| behavior.wrap(factory));

        let monitor = monitor.unwrap_or_else(|| Svc::new(NullComponentMonitor));
        let strategy =
            strategy.unwrap_or_else(|| Svc::new(NullLifecycleStrategy));
        let (parent, parent_container) = match parent {
            Some(Parent::Container(container)) => {
                (Some(container.handle()), Some(container))
            }
            Some(Parent::Dyn(parent)) => (Some(parent), None),
            None => (None, None),
        };

        let container = Container::from_parts(ContainerParts {
            name,
            parent,
            factory: Svc::from(factory),
            context: AdapterContext::new(SharedMonitor::new(monitor), strategy),
            properties,
        });

        if let (true, Some(parent)) = (add_child_to_parent, parent_container) {
            // A fresh container can never be an ancestor of its parent.
            if let Err(error) = parent.add_child(&container) {
                debug!(%error, "could not add container to its parent");
            }
        }

        container
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::NO_CACHE, Container, PicoContainer, PicoContainerExt,
        Svc,
    };

    #[derive(Default)]
    struct Widget;

    #[test]
    fn default_builder_creates_per_request() {
        let container = Container::builder().build();
        container.add_component(Widget::default).unwrap();

        let first: Svc<Widget> = container.get().unwrap();
        let second: Svc<Widget> = container.get().unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }

    #[test]
    fn first_behavior_is_outermost() {
        let container = Container::builder()
            .with_synchronizing()
            .with_caching()
            .build();
        let adapter = container.add_component(Widget::default).unwrap();
        assert!(adapter.descriptor().starts_with("Synchronized:Cached"));
    }

    #[test]
    fn container_characteristics_apply_to_every_registration() {
        let container = Container::builder()
            .with_caching()
            .with_characteristics(NO_CACHE)
            .build();
        container.add_component(Widget::default).unwrap();

        let first: Svc<Widget> = container.get().unwrap();
        let second: Svc<Widget> = container.get().unwrap();
        assert!(!Svc::ptr_eq(&first, &second));
    }

    #[test]
    fn children_can_join_their_parent() {
        let parent = Container::new();
        let child = Container::builder()
            .with_name("child")
            .with_parent(&parent)
            .add_child_to_parent()
            .build();

        assert_eq!(1, parent.children().len());
        assert!(child.parent().is_some());
        parent.start().unwrap();
        assert!(child.is_started());
    }
}
