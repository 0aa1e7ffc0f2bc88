use crate::{
    ComponentKey, InjectError, InjectResult, Interface, RequestInfo, Resolved,
    Svc,
};
use std::{marker::PhantomData, slice::Iter};

/// A collection of all the components which can be viewed as `I`. Each
/// component is only instantiated when it is reached during iteration.
///
/// ## Example
///
/// ```
/// use pico_container::{interface, Container, PicoContainerExt, Services};
///
/// trait Plugin: Send + Sync {}
///
/// #[derive(Default)]
/// struct Logging;
/// impl Plugin for Logging {}
///
/// #[derive(Default)]
/// struct Metrics;
/// impl Plugin for Metrics {}
///
/// interface!(Plugin = [Logging, Metrics]);
///
/// let container = Container::new();
/// container
///     .register(Logging::default)
///     .with_interface::<dyn Plugin>()
///     .add()
///     .unwrap();
/// container
///     .register(Metrics::default)
///     .with_interface::<dyn Plugin>()
///     .add()
///     .unwrap();
///
/// let plugins: Services<dyn Plugin> = container.get().unwrap();
/// assert_eq!(2, plugins.len());
/// assert_eq!(2, plugins.get_all().filter_map(Result::ok).count());
/// ```
pub struct Services<I: ?Sized + Interface> {
    resolved: Vec<Resolved>,
    request_info: RequestInfo,
    marker: PhantomData<fn() -> I>,
}

impl<I: ?Sized + Interface> Services<I> {
    #[inline]
    pub(crate) fn new(resolved: Vec<Resolved>, request_info: RequestInfo) -> Self {
        Services {
            resolved,
            request_info,
            marker: PhantomData,
        }
    }

    /// Lazily gets all the components. Each component will be requested on
    /// demand rather than all at once. Guarded components whose guard refuses
    /// creation are skipped.
    #[inline]
    #[must_use]
    pub fn get_all(&self) -> ServicesIter<'_, I> {
        ServicesIter {
            resolved: self.resolved.iter(),
            request_info: &self.request_info,
            marker: PhantomData,
        }
    }

    /// Keys of every component in this collection.
    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.resolved.iter().map(|resolved| resolved.adapter().key())
    }

    /// Gets the number of components in this collection. This does not take
    /// into account guarded components which may refuse to be created.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Returns whether there are no components in this collection.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// An iterator over the components of a [`Services`] collection.
pub struct ServicesIter<'a, I: ?Sized + Interface> {
    resolved: Iter<'a, Resolved>,
    request_info: &'a RequestInfo,
    marker: PhantomData<fn() -> I>,
}

impl<'a, I: ?Sized + Interface> Iterator for ServicesIter<'a, I> {
    type Item = InjectResult<Svc<I>>;

    fn next(&mut self) -> Option<Self::Item> {
        let request_info = self.request_info;
        self.resolved.find_map(|resolved| {
            match resolved.get::<I>(request_info) {
                Err(InjectError::ConditionsNotMet { .. }) => None,
                result => Some(result),
            }
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.resolved.size_hint().1)
    }
}
