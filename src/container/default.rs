use crate::{
    characteristics::NONE, AdapterContext, AdaptingBehavior, As,
    ComponentAdapter, ComponentFactory, ComponentKey, ComponentMonitor,
    ComponentSpec, ContainerBuilder, DynSvc, InjectError, InjectResult,
    LifecycleState, PicoContainer, PicoVisitor, Properties, Registration,
    RequestInfo, Resolved, Service, ServiceFactory, ServiceInfo,
    SharedMonitor, StartableLifecycleStrategy, Svc, VerifyingVisitor,
};
use parking_lot::{Mutex, RwLock};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    sync::Weak,
};
use tracing::{debug, trace};

#[derive(Default)]
struct Registry {
    adapters: Vec<Svc<dyn ComponentAdapter>>,
    keys: HashMap<ComponentKey, Svc<dyn ComponentAdapter>>,
    /// Adapters with a lifecycle, in the order their instances were first
    /// created. Dependencies always come before their dependents.
    ordered: Vec<Svc<dyn ComponentAdapter>>,
}

struct ContainerInner {
    name: RwLock<String>,
    parent: Option<Svc<dyn PicoContainer>>,
    factory: Svc<dyn ComponentFactory>,
    context: AdapterContext,
    properties: RwLock<Properties>,
    registry: RwLock<Registry>,
    children: RwLock<Vec<Weak<ContainerInner>>>,
    state: Mutex<LifecycleState>,
}

/// Everything a container is built from.
pub(crate) struct ContainerParts {
    pub name: String,
    pub parent: Option<Svc<dyn PicoContainer>>,
    pub factory: Svc<dyn ComponentFactory>,
    pub context: AdapterContext,
    pub properties: Properties,
}

/// The standard container. Components are registered with it, resolved
/// from it, and have their lifecycle managed by it.
///
/// Handles are cheap to clone and all refer to the same container. Children
/// made with [`make_child`](Container::make_child) can see the components of
/// their parent, but not the other way around. A parent only holds weak
/// references to its children, so they must be kept alive by the caller.
///
/// ## Example
///
/// ```
/// use pico_container::{
///     characteristics::CACHE, BoxError, Container, PicoContainerExt,
///     Startable, Svc,
/// };
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct Database {
///     open: AtomicBool,
/// }
///
/// impl Startable for Database {
///     fn start(&self) -> Result<(), BoxError> {
///         self.open.store(true, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn stop(&self) -> Result<(), BoxError> {
///         self.open.store(false, Ordering::SeqCst);
///         Ok(())
///     }
/// }
///
/// struct Repository(Svc<Database>);
///
/// let container = Container::new();
/// container
///     .register(Database::default)
///     .characteristics(CACHE)
///     .startable()
///     .add()
///     .unwrap();
/// container.add_component(Repository).unwrap();
///
/// container.start().unwrap();
/// let repository: Svc<Repository> = container.get().unwrap();
/// assert!(repository.0.open.load(Ordering::SeqCst));
///
/// container.dispose().unwrap();
/// assert!(!repository.0.open.load(Ordering::SeqCst));
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Svc<ContainerInner>,
}

impl Container {
    /// Creates a container which picks behaviors from characteristics,
    /// manages [`Startable`](crate::Startable) and
    /// [`Disposable`](crate::Disposable) components, and reports to no
    /// monitor.
    #[must_use]
    pub fn new() -> Self {
        Container::from_parts(ContainerParts {
            name: String::new(),
            parent: None,
            factory: Svc::new(AdaptingBehavior::new()),
            context: AdapterContext::new(
                SharedMonitor::default(),
                Svc::new(StartableLifecycleStrategy::new()),
            ),
            properties: Properties::new(),
        })
    }

    /// Creates a builder for configuring a container.
    #[must_use]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn from_parts(parts: ContainerParts) -> Self {
        Container {
            inner: Svc::new(ContainerInner {
                name: RwLock::new(parts.name),
                parent: parts.parent,
                factory: parts.factory,
                context: parts.context,
                properties: RwLock::new(parts.properties),
                registry: RwLock::new(Registry::default()),
                children: RwLock::new(Vec::new()),
                state: Mutex::new(LifecycleState::default()),
            }),
        }
    }

    pub(crate) fn context(&self) -> &AdapterContext {
        &self.inner.context
    }

    /// Whether two handles refer to the same container.
    #[must_use]
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Svc::ptr_eq(&self.inner, &other.inner)
    }

    /// Starts registering a component built by `factory`.
    pub fn register<D, F>(&self, factory: F) -> Registration<'_, F::Result>
    where
        D: 'static,
        F: ServiceFactory<D>,
    {
        Registration::factory(self, factory)
    }

    /// Starts registering a pre-built instance.
    pub fn register_instance<T: Service>(&self, instance: T) -> Registration<'_, T> {
        Registration::instance(self, Svc::new(instance))
    }

    /// Starts registering a pre-built shared instance.
    pub fn register_shared<T: Service>(&self, instance: Svc<T>) -> Registration<'_, T> {
        Registration::instance(self, instance)
    }

    /// Adds a component built by `factory`, keyed by the type it produces.
    pub fn add_component<D, F>(
        &self,
        factory: F,
    ) -> InjectResult<Svc<dyn ComponentAdapter>>
    where
        D: 'static,
        F: ServiceFactory<D>,
    {
        self.register(factory).add()
    }

    /// Adds a pre-built instance, keyed by its type.
    pub fn add_instance<T: Service>(
        &self,
        instance: T,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        self.register_instance(instance).add()
    }

    /// Adds a configuration value under a name.
    pub fn add_config<T: Service>(
        &self,
        name: impl Into<String>,
        value: T,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        self.register_instance(value)
            .key(ComponentKey::name(name))
            .add()
    }

    /// Adds an adapter built elsewhere. The component factory may still
    /// wrap it in behaviors.
    pub fn add_adapter(
        &self,
        adapter: Box<dyn ComponentAdapter>,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        self.add_built(adapter, Properties::new())
    }

    pub(crate) fn add_spec(
        &self,
        spec: ComponentSpec,
        properties: Properties,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        let mut properties = self.merged_properties(&properties);
        let adapter = self.inner.factory.create_adapter(
            &self.inner.context,
            &mut properties,
            spec,
        )?;
        self.install(adapter, properties)
    }

    pub(crate) fn add_built(
        &self,
        adapter: Box<dyn ComponentAdapter>,
        properties: Properties,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        let mut properties = self.merged_properties(&properties);
        let adapter = self.inner.factory.wrap_adapter(
            &self.inner.context,
            &mut properties,
            adapter,
        )?;
        self.install(adapter, properties)
    }

    fn merged_properties(&self, properties: &Properties) -> Properties {
        let mut merged = self.inner.properties.read().clone();
        merged.merge(properties);
        merged
    }

    fn install(
        &self,
        adapter: Box<dyn ComponentAdapter>,
        mut leftover: Properties,
    ) -> InjectResult<Svc<dyn ComponentAdapter>> {
        leftover.remove_if_present(&NONE);
        if !leftover.is_empty() {
            return Err(InjectError::UnprocessedCharacteristics {
                key: adapter.key().clone(),
                properties: leftover,
            });
        }

        let adapter: Svc<dyn ComponentAdapter> = Svc::from(adapter);
        {
            let mut registry = self.inner.registry.write();
            let key = adapter.key().clone();
            if registry.keys.contains_key(&key) {
                return Err(InjectError::DuplicateKey { key });
            }
            registry.keys.insert(key, adapter.clone());
            registry.adapters.push(adapter.clone());
        }

        debug!(
            container = %self,
            key = %adapter.key(),
            descriptor = %adapter.descriptor(),
            "registered component"
        );

        // Components added to a running container are started right away.
        if self.is_started()
            && !self.inner.context.strategy().is_lazy()
            && starts_with_container(&adapter)
        {
            self.instantiate(&adapter, &RequestInfo::new())?;
            self.start_adapter(&adapter)?;
        }

        Ok(adapter)
    }

    /// Removes the component registered under `key`, returning its adapter.
    /// A started component is stopped and disposed first.
    pub fn remove_component(
        &self,
        key: &ComponentKey,
    ) -> InjectResult<Option<Svc<dyn ComponentAdapter>>> {
        let removed = {
            let mut registry = self.inner.registry.write();
            let Some(adapter) = registry.keys.remove(key) else {
                return Ok(None);
            };
            registry.adapters.retain(|other| !same_adapter(other, &adapter));
            registry.ordered.retain(|other| !same_adapter(other, &adapter));
            adapter
        };

        debug!(container = %self, %key, "removed component");
        if let Some(lifecycle) = removed.lifecycle() {
            if lifecycle.has_lifecycle() && lifecycle.is_started() {
                lifecycle.stop(self)?;
                lifecycle.dispose(self)?;
            }
        }

        Ok(Some(removed))
    }

    /// Gets a handle which registers components with extra characteristics.
    pub fn as_(&self, properties: impl Into<Properties>) -> As<'_> {
        As::new(self, properties.into())
    }

    /// Adds characteristics to every component registered from now on.
    pub fn change(&self, properties: impl Into<Properties>) {
        self.inner.properties.write().merge(&properties.into());
    }

    /// The monitor of this container.
    #[must_use]
    pub fn monitor(&self) -> Svc<dyn ComponentMonitor> {
        self.inner.context.monitor().get()
    }

    /// Replaces the monitor of this container, its adapters and its
    /// children.
    pub fn change_monitor(&self, monitor: Svc<dyn ComponentMonitor>) {
        self.inner.context.monitor().replace(monitor.clone());
        for child in self.children() {
            child.change_monitor(monitor.clone());
        }
    }

    /// Renames this container.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.inner.name.write() = name.into();
    }

    /// Creates a child container which shares this container's component
    /// factory, lifecycle strategy and monitor. The child is started,
    /// stopped and disposed along with this container.
    #[must_use]
    pub fn make_child(&self) -> Container {
        let context = AdapterContext::new(
            SharedMonitor::new(self.monitor()),
            self.inner.context.strategy().clone(),
        );
        let child = Container::from_parts(ContainerParts {
            name: String::new(),
            parent: Some(self.handle()),
            factory: self.inner.factory.clone(),
            context,
            properties: Properties::new(),
        });
        self.inner
            .children
            .write()
            .push(Svc::downgrade(&child.inner));
        child
    }

    /// Adds a child whose lifecycle follows this container. Returns `false`
    /// if it was already a child. Fails if the child is this container or
    /// one of its ancestors.
    pub fn add_child(&self, child: &Container) -> InjectResult<bool> {
        if self.ptr_eq(child) {
            return Err(InjectError::Composition(format!(
                "container {} cannot be its own child",
                self
            )));
        }

        let mut ancestor = self.parent();
        while let Some(parent) = ancestor {
            if parent
                .downcast_ref::<Container>()
                .map_or(false, |parent| parent.ptr_eq(child))
            {
                return Err(InjectError::Composition(format!(
                    "container {} is an ancestor of {}",
                    child, self
                )));
            }
            ancestor = parent.parent();
        }

        let mut children = self.inner.children.write();
        children.retain(|weak| weak.strong_count() > 0);
        if children
            .iter()
            .any(|weak| std::ptr::eq(weak.as_ptr(), Svc::as_ptr(&child.inner)))
        {
            return Ok(false);
        }
        children.push(Svc::downgrade(&child.inner));
        Ok(true)
    }

    /// Removes a child. Returns `false` if it was not a child.
    pub fn remove_child(&self, child: &Container) -> bool {
        let mut children = self.inner.children.write();
        let before = children.len();
        children.retain(|weak| {
            weak.strong_count() > 0
                && !std::ptr::eq(weak.as_ptr(), Svc::as_ptr(&child.inner))
        });
        children.len() < before
    }

    /// The live children of this container, in the order they were added.
    #[must_use]
    pub fn children(&self) -> Vec<Container> {
        self.inner
            .children
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .map(|inner| Container { inner })
            .collect()
    }

    /// The lifecycle state of this container.
    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.inner.state.lock()
    }

    /// Whether this container is started.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.lifecycle_state().is_started()
    }

    /// Whether this container is disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.lifecycle_state().is_disposed()
    }

    fn lifecycle_key(&self) -> ComponentKey {
        ComponentKey::name(self.to_string())
    }

    fn ordered(&self) -> Vec<Svc<dyn ComponentAdapter>> {
        self.inner.registry.read().ordered.clone()
    }

    /// Starts this container. Components with a lifecycle are created and
    /// then started in dependency order, followed by the children. With a
    /// lazy lifecycle strategy, components are only started when they are
    /// first resolved.
    pub fn start(&self) -> InjectResult<()> {
        {
            let mut state = self.inner.state.lock();
            *state = state.starting(&self.lifecycle_key())?;
        }
        debug!(container = %self, "starting container");

        let lazy = self.inner.context.strategy().is_lazy();
        for adapter in self.component_adapters() {
            if adapter.is_eager() || (!lazy && starts_with_container(&adapter)) {
                self.instantiate(&adapter, &RequestInfo::new())?;
            }
        }

        if !lazy {
            for adapter in self.ordered() {
                self.start_adapter(&adapter)?;
            }
        }

        for child in self.children() {
            if !child.is_started() {
                child.start()?;
            }
        }
        Ok(())
    }

    /// Stops the children of this container, then its components in the
    /// reverse of the order they were started.
    pub fn stop(&self) -> InjectResult<()> {
        {
            let mut state = self.inner.state.lock();
            *state = state.stopping(&self.lifecycle_key())?;
        }
        debug!(container = %self, "stopping container");

        for child in self.children().into_iter().rev() {
            if child.is_started() {
                child.stop()?;
            }
        }

        for adapter in self.ordered().into_iter().rev() {
            if let Some(lifecycle) = adapter.lifecycle() {
                if lifecycle.has_lifecycle() && lifecycle.is_started() {
                    lifecycle.stop(self)?;
                }
            }
        }
        Ok(())
    }

    /// Disposes this container, stopping it first if it is running. Children
    /// are disposed before the components of this container.
    pub fn dispose(&self) -> InjectResult<()> {
        if self.is_started() {
            self.stop()?;
        }
        {
            let mut state = self.inner.state.lock();
            *state = state.disposing(&self.lifecycle_key())?;
        }
        debug!(container = %self, "disposing container");

        for child in self.children().into_iter().rev() {
            if !child.is_disposed() {
                child.dispose()?;
            }
        }

        for adapter in self.ordered().into_iter().rev() {
            if let Some(lifecycle) = adapter.lifecycle() {
                if lifecycle.has_lifecycle() {
                    lifecycle.dispose(self)?;
                }
            }
        }
        Ok(())
    }

    fn start_adapter(&self, adapter: &Svc<dyn ComponentAdapter>) -> InjectResult<()> {
        match adapter.lifecycle() {
            Some(lifecycle) if lifecycle.has_lifecycle() => lifecycle.ensure_started(self),
            _ => Ok(()),
        }
    }

    /// Records the creation order of components with a lifecycle, and
    /// starts them on first use with a lazy strategy.
    fn track(&self, adapter: &Svc<dyn ComponentAdapter>) -> InjectResult<()> {
        let Some(lifecycle) = adapter.lifecycle() else {
            return Ok(());
        };
        if !lifecycle.has_lifecycle() {
            return Ok(());
        }

        {
            let mut registry = self.inner.registry.write();
            if !registry
                .ordered
                .iter()
                .any(|other| same_adapter(other, adapter))
            {
                registry.ordered.push(adapter.clone());
            }
        }

        if self.inner.context.strategy().is_lazy() && self.is_started() {
            lifecycle.ensure_started(self)?;
        }
        Ok(())
    }

    /// Checks that every component of this container and its children could
    /// be created, returning the first problem found.
    pub fn verify(&self) -> InjectResult<()> {
        let mut visitor = VerifyingVisitor::new();
        visitor.traverse(self);
        match visitor.into_failures().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Container::new()
    }
}

impl Display for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.registry.read().adapters.len();
        write!(f, "{}:{}<", self.inner.name.read(), count)?;
        match &self.inner.parent {
            Some(parent) => f.write_str(&parent.name()),
            None => f.write_str("|"),
        }
    }
}

impl PicoContainer for Container {
    fn as_dyn(&self) -> &dyn PicoContainer {
        self
    }

    fn handle(&self) -> Svc<dyn PicoContainer> {
        Svc::new(self.clone())
    }

    fn find_by_key(&self, key: &ComponentKey) -> Option<Resolved> {
        let local = self.inner.registry.read().keys.get(key).cloned();
        match local {
            Some(adapter) => Some(Resolved::new(adapter, self.handle())),
            None => self
                .inner
                .parent
                .as_ref()
                .and_then(|parent| parent.find_by_key(key)),
        }
    }

    fn find_by_type(
        &self,
        service_info: ServiceInfo,
    ) -> InjectResult<Option<Resolved>> {
        if let Some(resolved) =
            self.find_by_key(&ComponentKey::Type(service_info))
        {
            return Ok(Some(resolved));
        }

        let mut candidates: Vec<_> = self
            .component_adapters()
            .into_iter()
            .filter(|adapter| adapter.exposes(service_info))
            .collect();
        match candidates.len() {
            0 => match &self.inner.parent {
                Some(parent) => parent.find_by_type(service_info),
                None => Ok(None),
            },
            1 => Ok(candidates
                .pop()
                .map(|adapter| Resolved::new(adapter, self.handle()))),
            _ => Err(InjectError::AmbiguousResolution {
                service_info,
                candidates: candidates
                    .iter()
                    .map(|adapter| adapter.key().clone())
                    .collect(),
            }),
        }
    }

    fn find_all(&self, service_info: ServiceInfo) -> Vec<Resolved> {
        let mut all = self
            .inner
            .parent
            .as_ref()
            .map(|parent| parent.find_all(service_info))
            .unwrap_or_default();

        let owner = self.handle();
        for adapter in self.component_adapters() {
            if !adapter.exposes(service_info) {
                continue;
            }

            let resolved = Resolved::new(adapter, owner.clone());
            match all
                .iter()
                .position(|other| other.adapter().key() == resolved.adapter().key())
            {
                Some(index) => all[index] = resolved,
                None => all.push(resolved),
            }
        }
        all
    }

    fn component_adapters(&self) -> Vec<Svc<dyn ComponentAdapter>> {
        self.inner.registry.read().adapters.clone()
    }

    fn parent(&self) -> Option<Svc<dyn PicoContainer>> {
        self.inner.parent.clone()
    }

    fn instantiate(
        &self,
        adapter: &Svc<dyn ComponentAdapter>,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let key = adapter.key();
        let path = request_info.key_path();
        if let Some(start) = path.iter().position(|requested| requested == key) {
            let mut cycle = path[start..].to_vec();
            cycle.push(key.clone());
            return Err(InjectError::CycleDetected {
                key: key.clone(),
                cycle,
            });
        }

        trace!(container = %self, %key, "resolving component");
        let instance = adapter.instance(self, &request_info.with_request(key.clone()))?;
        request_info.record_injected(adapter.implementation());
        self.track(adapter)?;
        Ok(instance)
    }

    fn accept(&self, visitor: &mut dyn PicoVisitor) {
        if !visitor.visit_container(self) {
            return;
        }

        let factory: &dyn ComponentFactory = self.inner.factory.as_ref();
        factory.accept(visitor);
        for adapter in self.component_adapters() {
            adapter.accept(visitor);
        }
        for child in self.children() {
            child.accept(visitor);
        }
    }

    fn no_component_found(&self, key: &ComponentKey) {
        self.monitor().no_component_found(key);
    }

    fn name(&self) -> String {
        self.inner.name.read().clone()
    }
}

fn starts_with_container(adapter: &Svc<dyn ComponentAdapter>) -> bool {
    adapter
        .lifecycle()
        .map_or(false, |lifecycle| lifecycle.has_lifecycle())
}

fn same_adapter(
    first: &Svc<dyn ComponentAdapter>,
    second: &Svc<dyn ComponentAdapter>,
) -> bool {
    std::ptr::eq(
        Svc::as_ptr(first).cast::<()>(),
        Svc::as_ptr(second).cast::<()>(),
    )
}
