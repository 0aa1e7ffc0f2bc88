use crate::{ComponentKey, ServiceInfo, Svc};
use parking_lot::Mutex;

/// Information about an active request.
#[derive(Clone, Default, Debug)]
pub struct RequestInfo {
    key_path: Vec<ComponentKey>,
    injected: Option<Svc<Mutex<Vec<ServiceInfo>>>>,
}

impl RequestInfo {
    /// Creates a new, empty instance of [`RequestInfo`].
    #[must_use]
    pub fn new() -> Self {
        RequestInfo {
            key_path: Vec::new(),
            injected: None,
        }
    }

    /// Creates a new child instance of [`RequestInfo`] with the given
    /// component appended to the end of the request path.
    #[must_use]
    pub fn with_request(&self, key: ComponentKey) -> Self {
        let mut child = self.clone();
        child.key_path.push(key);
        child.injected = None;
        child
    }

    /// Creates a copy which records the implementations of the components
    /// resolved through it.
    #[must_use]
    pub(crate) fn recording_injections(&self) -> Self {
        let mut recording = self.clone();
        recording.injected = Some(Svc::default());
        recording
    }

    pub(crate) fn record_injected(&self, implementation: ServiceInfo) {
        if let Some(injected) = &self.injected {
            injected.lock().push(implementation);
        }
    }

    /// The implementations recorded so far, in the order they were resolved.
    pub(crate) fn injected(&self) -> Vec<ServiceInfo> {
        self.injected
            .as_ref()
            .map(|injected| injected.lock().clone())
            .unwrap_or_default()
    }

    /// Gets the current request path. This can be used to configure a
    /// component based on what it's being injected into.
    ///
    /// ## Example
    ///
    /// ```
    /// use pico_container::{
    ///     ComponentKey, Container, PicoContainerExt, RequestInfo, Svc,
    /// };
    ///
    /// struct Foo(pub Svc<Baz>);
    /// struct Bar(pub Svc<Baz>);
    /// struct Baz(pub i32);
    ///
    /// impl Baz {
    ///     pub fn new(request_info: RequestInfo) -> Self {
    ///         let value = match request_info.key_path().first() {
    ///             Some(root) if root == &ComponentKey::of::<Foo>() => 1,
    ///             Some(root) if root == &ComponentKey::of::<Bar>() => 2,
    ///             _ => 0,
    ///         };
    ///
    ///         Baz(value)
    ///     }
    /// }
    ///
    /// let container = Container::new();
    /// container.add_component(Foo).unwrap();
    /// container.add_component(Bar).unwrap();
    /// container.add_component(Baz::new).unwrap();
    ///
    /// let foo: Svc<Foo> = container.get().unwrap();
    /// let bar: Svc<Bar> = container.get().unwrap();
    /// let baz: Svc<Baz> = container.get().unwrap();
    #[rustfmt::skip]
    /// assert_eq!(1, foo.0.0);
    /// assert_eq!(2, bar.0.0);
    /// assert_eq!(0, baz.0);
    /// ```
    #[must_use]
    pub fn key_path(&self) -> &[ComponentKey] {
        &self.key_path
    }

    /// Gets the component whose construction triggered this request, if any.
    #[must_use]
    pub fn injectee(&self) -> Option<&ComponentKey> {
        self.key_path.last()
    }

    /// Whether the given component is already being constructed further up
    /// the request path.
    #[must_use]
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.key_path.contains(key)
    }
}
