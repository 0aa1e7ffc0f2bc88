use crate::{
    characteristics::{LOCK, NO_LOCK},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentSpec,
    ConstructorInjection, DynSvc, InjectError, InjectResult, PicoContainer,
    Properties, RequestInfo,
};
use parking_lot::ReentrantMutex;
use std::time::Duration;

/// Serializes requests to the wrapped adapter like
/// [`Synchronized`](crate::Synchronized), optionally giving up when the lock
/// cannot be taken in time.
pub struct Locked {
    delegate: Box<dyn ComponentAdapter>,
    lock: ReentrantMutex<()>,
    timeout: Option<Duration>,
}

impl Locked {
    /// Locks requests to `delegate`. With a timeout, requests which cannot
    /// take the lock in time fail with [`InjectError::LockTimedOut`].
    #[must_use]
    pub fn new(
        delegate: Box<dyn ComponentAdapter>,
        timeout: Option<Duration>,
    ) -> Self {
        Locked {
            delegate,
            lock: ReentrantMutex::new(()),
            timeout,
        }
    }
}

impl ComponentAdapter for Locked {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let _guard = match self.timeout {
            Some(timeout) => self.lock.try_lock_for(timeout).ok_or_else(|| {
                InjectError::LockTimedOut {
                    key: self.key().clone(),
                }
            })?,
            None => self.lock.lock(),
        };
        self.delegate.instance(container, request_info)
    }

    fn descriptor(&self) -> String {
        format!("Locked:{}", self.delegate.descriptor())
    }
}

/// Locks every component unless it is registered with
/// [`NO_LOCK`](crate::characteristics::NO_LOCK).
pub struct Locking {
    delegate: Box<dyn ComponentFactory>,
    timeout: Option<Duration>,
}

impl Locking {
    /// Creates a locking factory wrapping [`ConstructorInjection`].
    #[must_use]
    pub fn new() -> Self {
        Locking {
            delegate: Box::new(ConstructorInjection),
            timeout: None,
        }
    }

    /// Gives up on requests which cannot take the lock within `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for Locking {
    fn default() -> Self {
        Locking::new()
    }
}

impl ComponentFactory for Locking {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        if properties.remove_if_present(&NO_LOCK) {
            return Ok(adapter);
        }
        properties.remove_if_present(&LOCK);
        Ok(context.behavior(Locked::new(adapter, self.timeout)))
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
        "Locking".to_string()
    }
}

behavior_factory!(Locking);

#[cfg(test)]
mod tests {
    use crate::{Container, InjectError, Locking, PicoContainerExt, Svc};
    use std::{
        sync::{mpsc, Arc, Barrier},
        thread,
        time::Duration,
    };

    struct Slow;

    #[test]
    fn lock_times_out_while_another_thread_creates() {
        let container = Container::builder()
            .with_behavior(Locking::new().with_timeout(Duration::from_millis(20)))
            .build();
        let barrier = Arc::new(Barrier::new(2));
        container
            .register({
                let barrier = barrier.clone();
                move || {
                    barrier.wait();
                    thread::sleep(Duration::from_millis(200));
                    Slow
                }
            })
            .add()
            .unwrap();

        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn({
            let container = container.clone();
            move || {
                sender.send(container.get::<Svc<Slow>>().is_ok()).unwrap();
            }
        });

        // Wait until the other thread holds the lock and is creating.
        barrier.wait();
        match container.get::<Svc<Slow>>() {
            Err(InjectError::LockTimedOut { .. }) => {}
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("the lock should be held"),
        }

        handle.join().unwrap();
        assert!(receiver.recv().unwrap());
    }
}
