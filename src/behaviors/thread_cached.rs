use crate::{
    characteristics::{NO_THREAD_CACHE, THREAD_CACHE},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentSpec,
    ConstructorInjection, DynSvc, InjectResult, PicoContainer, Properties,
    RequestInfo, Svc,
};
use parking_lot::Mutex;
use std::{
    cell::RefCell,
    collections::{hash_map::Entry, HashMap},
    sync::Weak,
    thread::{self, ThreadId},
};

type Instances = Mutex<HashMap<ThreadId, DynSvc>>;

thread_local! {
    static HELD: RefCell<Vec<HeldInstance>> = const { RefCell::new(Vec::new()) };
}

/// Removes the entry of a thread from a thread cache once that thread
/// exits.
struct HeldInstance {
    instances: Weak<Instances>,
    thread: ThreadId,
}

impl Drop for HeldInstance {
    fn drop(&mut self) {
        if let Some(instances) = self.instances.upgrade() {
            let released = instances.lock().remove(&self.thread);
            drop(released);
        }
    }
}

/// Holds on to one instance per thread. The instance of a thread is released
/// when the thread exits.
pub struct ThreadCached {
    delegate: Box<dyn ComponentAdapter>,
    instances: Svc<Instances>,
}

impl ThreadCached {
    /// Caches the instances of `delegate` per thread.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>) -> Self {
        ThreadCached {
            delegate,
            instances: Svc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The number of threads currently holding an instance.
    #[must_use]
    pub fn cached_threads(&self) -> usize {
        self.instances.lock().len()
    }

    fn release_on_exit(&self, thread: ThreadId) {
        let held = HeldInstance {
            instances: Svc::downgrade(&self.instances),
            thread,
        };
        // Fails only while the thread is already exiting. The entry then
        // lives as long as the cache.
        let _ = HELD.try_with(|entries| {
            let mut entries = entries.borrow_mut();
            entries.retain(|entry| entry.instances.strong_count() > 0);
            entries.push(held);
        });
    }
}

impl ComponentAdapter for ThreadCached {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let thread = thread::current().id();
        if let Some(instance) = self.instances.lock().get(&thread) {
            return Ok(instance.clone());
        }

        let instance = self.delegate.instance(container, request_info)?;
        let (instance, inserted) = match self.instances.lock().entry(thread) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => (entry.insert(instance).clone(), true),
        };
        if inserted {
            self.release_on_exit(thread);
        }
        Ok(instance)
    }

    fn descriptor(&self) -> String {
        format!("ThreadCached:{}", self.delegate.descriptor())
    }
}

/// Caches components per thread unless they are registered with
/// [`NO_THREAD_CACHE`](crate::characteristics::NO_THREAD_CACHE).
pub struct ThreadCaching {
    delegate: Box<dyn ComponentFactory>,
}

impl ThreadCaching {
    /// Creates a thread caching factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        ThreadCaching {
            delegate: Box::new(ConstructorInjection),
        }
    }
}

impl Default for ThreadCaching {
    fn default() -> Self {
        ThreadCaching::new()
    }
}

impl ComponentFactory for ThreadCaching {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        if properties.remove_if_present(&NO_THREAD_CACHE) {
            return Ok(adapter);
        }
        properties.remove_if_present(&THREAD_CACHE);
        Ok(context.behavior(ThreadCached::new(adapter)))
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
        "ThreadCaching".to_string()
    }
}

behavior_factory!(ThreadCaching);

#[cfg(test)]
mod tests {
    use crate::{
        characteristics::THREAD_CACHE, Container, PicoContainerExt, Svc,
        ThreadCached,
    };
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    #[derive(Default)]
    struct Session;

    struct Tracked(Svc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn one_instance_per_thread() {
        let container = Container::new();
        container
            .register(Session::default)
            .characteristics(THREAD_CACHE)
            .add()
            .unwrap();

        let first: Svc<Session> = container.get().unwrap();
        let second: Svc<Session> = container.get().unwrap();
        assert!(Svc::ptr_eq(&first, &second));

        let other = thread::spawn({
            let container = container.clone();
            move || container.get::<Svc<Session>>().unwrap()
        })
        .join()
        .unwrap();
        assert!(!Svc::ptr_eq(&first, &other));
    }

    #[test]
    fn instances_are_released_when_their_thread_exits() {
        let dropped = Svc::new(AtomicUsize::new(0));
        let container = Container::new();
        let adapter = container
            .register({
                let dropped = dropped.clone();
                move || Tracked(dropped.clone())
            })
            .characteristics(THREAD_CACHE)
            .add()
            .unwrap();

        for _ in 0..8 {
            let container = container.clone();
            thread::spawn(move || {
                container.get::<Svc<Tracked>>().unwrap();
            })
            .join()
            .unwrap();
        }

        assert_eq!(8, dropped.load(Ordering::SeqCst));
        let cached = adapter.find_adapter_of_type::<ThreadCached>().unwrap();
        assert_eq!(0, cached.cached_threads());
    }
}
