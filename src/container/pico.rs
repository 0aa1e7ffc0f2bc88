use crate::{
    ComponentAdapter, ComponentKey, DynSvc, InjectError, InjectResult,
    Interface, PicoVisitor, Request, RequestInfo, ServiceInfo, Svc,
};
use downcast_rs::{impl_downcast, DowncastSync};

/// A container of components which can be looked up by key or by type.
///
/// Lookups return [`Resolved`] entries pairing an adapter with the container
/// that owns it, so components are always created by their owner even when
/// they are found through a child. Most callers use the typed helpers of
/// [`PicoContainerExt`] instead of these methods.
pub trait PicoContainer: DowncastSync {
    /// Views this container as a trait object.
    fn as_dyn(&self) -> &dyn PicoContainer;

    /// Gets a shared handle to this container.
    fn handle(&self) -> Svc<dyn PicoContainer>;

    /// Finds the adapter registered under `key`, searching this container
    /// first and then its ancestors.
    fn find_by_key(&self, key: &ComponentKey) -> Option<Resolved>;

    /// Finds the single adapter which can provide `service_info`.
    ///
    /// An adapter keyed by the type itself wins. Otherwise exactly one local
    /// adapter must expose the type, or the search moves on to the parent.
    /// More than one local match is an
    /// [`InjectError::AmbiguousResolution`].
    fn find_by_type(&self, service_info: ServiceInfo)
        -> InjectResult<Option<Resolved>>;

    /// Finds every adapter which can provide `service_info`. Ancestor
    /// adapters come first, and local adapters replace ancestor adapters
    /// registered under the same key.
    fn find_all(&self, service_info: ServiceInfo) -> Vec<Resolved>;

    /// The adapters registered with this container, in registration order.
    fn component_adapters(&self) -> Vec<Svc<dyn ComponentAdapter>>;

    /// The parent of this container, if it has one.
    fn parent(&self) -> Option<Svc<dyn PicoContainer>>;

    /// Gets an instance from one of this container's adapters. Fails with
    /// [`InjectError::CycleDetected`] if the component is already being
    /// created further up the request.
    fn instantiate(
        &self,
        adapter: &Svc<dyn ComponentAdapter>,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc>;

    /// Lets a visitor visit this container and everything it holds.
    fn accept(&self, visitor: &mut dyn PicoVisitor);

    /// Called when a lookup made through this container found nothing.
    fn no_component_found(&self, _key: &ComponentKey) {}

    /// A name for this container, used in logs and errors.
    fn name(&self) -> String;
}

impl_downcast!(sync PicoContainer);

/// An adapter found by a lookup, together with the container which owns it.
#[derive(Clone)]
pub struct Resolved {
    adapter: Svc<dyn ComponentAdapter>,
    owner: Svc<dyn PicoContainer>,
}

impl Resolved {
    /// Pairs an adapter with its owning container.
    #[must_use]
    pub fn new(
        adapter: Svc<dyn ComponentAdapter>,
        owner: Svc<dyn PicoContainer>,
    ) -> Self {
        Resolved { adapter, owner }
    }

    /// The adapter which was found.
    #[must_use]
    pub fn adapter(&self) -> &Svc<dyn ComponentAdapter> {
        &self.adapter
    }

    /// The container which owns the adapter.
    #[must_use]
    pub fn owner(&self) -> &Svc<dyn PicoContainer> {
        &self.owner
    }

    /// Gets an erased instance of the component from its owner.
    pub fn instance(&self, request_info: &RequestInfo) -> InjectResult<DynSvc> {
        self.owner.instantiate(&self.adapter, request_info)
    }

    /// Gets an instance of the component viewed as `I`.
    pub fn get<I: ?Sized + Interface>(
        &self,
        request_info: &RequestInfo,
    ) -> InjectResult<Svc<I>> {
        let service_info = ServiceInfo::of::<I>();
        let invalid = || InjectError::InvalidComponent {
            key: self.adapter.key().clone(),
            service_info,
        };

        if !self.adapter.exposes(service_info) {
            return Err(invalid());
        }

        let instance = self.instance(request_info)?;
        I::from_component(instance).ok_or_else(invalid)
    }
}

/// Typed lookups for every [`PicoContainer`].
///
/// ## Example
///
/// ```
/// use pico_container::{
///     characteristics::CACHE, interface, Container, PicoContainerExt, Svc,
/// };
///
/// trait Store: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// #[derive(Default)]
/// struct MemoryStore;
///
/// impl Store for MemoryStore {
///     fn name(&self) -> &'static str {
///         "memory"
///     }
/// }
///
/// interface!(Store = [MemoryStore]);
///
/// let container = Container::new();
/// container
///     .register(MemoryStore::default)
///     .with_interface::<dyn Store>()
///     .characteristics(CACHE)
///     .add()
///     .unwrap();
///
/// let store: Svc<dyn Store> = container.get().unwrap();
/// assert_eq!("memory", store.name());
///
/// let concrete = container.component::<MemoryStore>().unwrap().unwrap();
/// assert_eq!("memory", concrete.name());
/// ```
pub trait PicoContainerExt: PicoContainer {
    /// Performs a request against this container.
    fn get<R: Request>(&self) -> InjectResult<R> {
        R::request(self.as_dyn(), &RequestInfo::new())
    }

    /// Gets the single component which can be viewed as `I`, if there is
    /// one.
    fn component<I: ?Sized + Interface>(&self) -> InjectResult<Option<Svc<I>>> {
        self.resolve::<I>(&RequestInfo::new())
    }

    /// Gets the component registered under `key` viewed as `I`, if there is
    /// one.
    fn component_by_key<I: ?Sized + Interface>(
        &self,
        key: &ComponentKey,
    ) -> InjectResult<Option<Svc<I>>> {
        self.resolve_key::<I>(key, &RequestInfo::new())
    }

    /// Gets every local component which can be viewed as `I`, in
    /// registration order.
    fn components<I: ?Sized + Interface>(&self) -> InjectResult<Vec<Svc<I>>> {
        let service_info = ServiceInfo::of::<I>();
        let owner = self.handle();
        self.component_adapters()
            .into_iter()
            .filter(|adapter| adapter.exposes(service_info))
            .map(|adapter| {
                Resolved::new(adapter, owner.clone()).get::<I>(&RequestInfo::new())
            })
            .collect()
    }

    /// Resolves the single component which can be viewed as `I` as part of
    /// a request.
    fn resolve<I: ?Sized + Interface>(
        &self,
        request_info: &RequestInfo,
    ) -> InjectResult<Option<Svc<I>>> {
        match self.find_by_type(ServiceInfo::of::<I>())? {
            Some(resolved) => resolved.get::<I>(request_info).map(Some),
            None => {
                self.no_component_found(&ComponentKey::of::<I>());
                Ok(None)
            }
        }
    }

    /// Resolves the component registered under `key` as part of a request.
    fn resolve_key<I: ?Sized + Interface>(
        &self,
        key: &ComponentKey,
        request_info: &RequestInfo,
    ) -> InjectResult<Option<Svc<I>>> {
        match self.find_by_key(key) {
            Some(resolved) => resolved.get::<I>(request_info).map(Some),
            None => {
                self.no_component_found(key);
                Ok(None)
            }
        }
    }
}

impl<C: ?Sized + PicoContainer> PicoContainerExt for C {}
