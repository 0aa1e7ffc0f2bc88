use crate::{
    characteristics::{NO_POOL, POOL},
    AdapterContext, ComponentAdapter, ComponentFactory, ComponentLifecycle,
    ComponentSpec, ConstructorInjection, DynSvc, InjectError, InjectResult,
    LifecyclePhase, PicoContainer, Properties, RequestInfo, Service, Svc,
};
use parking_lot::{Condvar, Mutex, MutexGuard, ReentrantMutex};
use std::time::{Duration, Instant};

/// The pool size used unless another one is configured.
pub const DEFAULT_MAX_SIZE: usize = 8;

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// What a request does when every pooled instance is in use and the pool is
/// full.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PoolWait {
    /// Fail immediately with [`InjectError::PoolExhausted`].
    Fail,

    /// Wait until an instance is returned.
    Block,

    /// Wait up to the given duration, then fail with
    /// [`InjectError::PoolTimedOut`].
    Timeout(Duration),
}

/// Prepares a returned instance for reuse.
pub trait Resetter: Service {
    /// Resets `component`. Returns `false` if the instance should be dropped
    /// from the pool instead of being reused.
    fn reset(&self, component: &DynSvc) -> bool;
}

/// Reuses returned instances as they are.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoResetter;

impl Resetter for NoResetter {
    fn reset(&self, _component: &DynSvc) -> bool {
        true
    }
}

/// How a pool is sized and what it does when it runs out.
#[derive(Clone)]
pub struct PoolSettings {
    /// The largest number of instances the pool creates.
    pub max_size: usize,

    /// What a request does when the pool is exhausted.
    pub wait: PoolWait,

    /// Prepares returned instances for reuse.
    pub resetter: Svc<dyn Resetter>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_size: DEFAULT_MAX_SIZE,
            wait: PoolWait::Block,
            resetter: Svc::new(NoResetter),
        }
    }
}

#[derive(Default)]
struct Pool {
    instances: Vec<DynSvc>,
    started: bool,
    disposed: bool,
}

impl Pool {
    /// An instance is free when the pool holds the only reference to it.
    fn free(&self) -> Option<usize> {
        self.instances
            .iter()
            .position(|instance| Svc::strong_count(instance) == 1)
    }
}

/// Hands out instances from a bounded pool. An instance goes back to the
/// pool once every pointer to it handed out by the container is dropped.
pub struct Pooled {
    delegate: Box<dyn ComponentAdapter>,
    settings: PoolSettings,
    pool: Mutex<Pool>,
    returned: Condvar,
    transition: ReentrantMutex<()>,
}

impl Pooled {
    /// Pools the instances of `delegate`.
    #[must_use]
    pub fn new(delegate: Box<dyn ComponentAdapter>, settings: PoolSettings) -> Self {
        Pooled {
            delegate,
            settings,
            pool: Mutex::new(Pool::default()),
            returned: Condvar::new(),
            transition: ReentrantMutex::new(()),
        }
    }

    /// The number of instances the pool has created.
    #[must_use]
    pub fn size(&self) -> usize {
        self.pool.lock().instances.len()
    }

    /// The number of created instances which are not in use.
    #[must_use]
    pub fn available(&self) -> usize {
        self.pool
            .lock()
            .instances
            .iter()
            .filter(|instance| Svc::strong_count(instance) == 1)
            .count()
    }

    fn illegal(&self, message: &'static str) -> InjectError {
        InjectError::IllegalState {
            key: self.key().clone(),
            message,
        }
    }

    fn acquire(
        &self,
        pool: &mut MutexGuard<'_, Pool>,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let deadline = match self.settings.wait {
            PoolWait::Timeout(timeout) => Some(Instant::now() + timeout),
            PoolWait::Fail | PoolWait::Block => None,
        };

        loop {
            if pool.disposed {
                return Err(self.illegal("already disposed"));
            }

            if let Some(index) = pool.free() {
                if self.settings.resetter.reset(&pool.instances[index]) {
                    return Ok(pool.instances[index].clone());
                }
                pool.instances.swap_remove(index);
                continue;
            }

            if pool.instances.len() < self.settings.max_size {
                let instance = self.delegate.instance(container, request_info)?;
                if pool.started {
                    self.delegate
                        .invoke_lifecycle(LifecyclePhase::Start, &instance)?;
                }
                pool.instances.push(instance.clone());
                return Ok(instance);
            }

            match (self.settings.wait, deadline) {
                (PoolWait::Fail, _) => {
                    return Err(InjectError::PoolExhausted {
                        key: self.key().clone(),
                    });
                }
                (PoolWait::Timeout(timeout), Some(deadline)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(InjectError::PoolTimedOut {
                            key: self.key().clone(),
                            waited: timeout,
                        });
                    }
                    let wait = POLL_INTERVAL.min(deadline - now);
                    self.returned.wait_for(pool, wait);
                }
                _ => {
                    self.returned.wait_for(pool, POLL_INTERVAL);
                }
            }
        }
    }

    fn invoke_all(&self, phase: LifecyclePhase, instances: &[DynSvc]) -> InjectResult<()> {
        for instance in instances {
            self.delegate.invoke_lifecycle(phase, instance)?;
        }
        Ok(())
    }
}

impl ComponentAdapter for Pooled {
    delegate_adapter!();

    fn instance(
        &self,
        container: &dyn PicoContainer,
        request_info: &RequestInfo,
    ) -> InjectResult<DynSvc> {
        let mut pool = self.pool.lock();
        self.acquire(&mut pool, container, request_info)
    }

    fn descriptor(&self) -> String {
        format!("Pooled:{}", self.delegate.descriptor())
    }

    fn lifecycle(&self) -> Option<&dyn ComponentLifecycle> {
        Some(self)
    }
}

impl ComponentLifecycle for Pooled {
    fn start(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let _transition = self.transition.lock();
        let instances = {
            let mut pool = self.pool.lock();
            if pool.disposed {
                return Err(self.illegal("already disposed"));
            }
            if pool.started {
                return Err(self.illegal("already started"));
            }
            if pool.instances.is_empty() {
                let request_info =
                    RequestInfo::new().with_request(self.key().clone());
                let instance = self.delegate.instance(container, &request_info)?;
                pool.instances.push(instance);
            }
            pool.started = true;
            pool.instances.clone()
        };

        self.invoke_all(LifecyclePhase::Start, &instances)
    }

    fn stop(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let _transition = self.transition.lock();
        let instances = {
            let mut pool = self.pool.lock();
            if pool.disposed {
                return Err(self.illegal("already disposed"));
            }
            if !pool.started {
                return Err(self.illegal("not started"));
            }
            pool.started = false;
            pool.instances.clone()
        };

        self.invoke_all(LifecyclePhase::Stop, &instances)
    }

    fn dispose(&self, _container: &dyn PicoContainer) -> InjectResult<()> {
        if !self.has_lifecycle() {
            return Ok(());
        }

        let _transition = self.transition.lock();
        let instances = {
            let mut pool = self.pool.lock();
            if pool.disposed {
                return Err(self.illegal("already disposed"));
            }
            pool.disposed = true;
            std::mem::take(&mut pool.instances)
        };
        self.returned.notify_all();

        self.invoke_all(LifecyclePhase::Dispose, &instances)
    }

    fn has_lifecycle(&self) -> bool {
        self.component_has_lifecycle()
    }

    fn is_started(&self) -> bool {
        self.pool.lock().started
    }

    fn ensure_started(&self, container: &dyn PicoContainer) -> InjectResult<()> {
        let _transition = self.transition.lock();
        if self.is_started() {
            return Ok(());
        }
        self.start(container)
    }
}

/// Pools every component unless it is registered with
/// [`NO_POOL`](crate::characteristics::NO_POOL).
pub struct Pooling {
    delegate: Box<dyn ComponentFactory>,
    settings: PoolSettings,
}

impl Pooling {
    /// Creates a pooling factory wrapping [`ConstructorInjection`] with
    /// the default settings.
    #[must_use]
    pub fn new() -> Self {
        Pooling::with_settings(PoolSettings::default())
    }

    /// Creates a pooling factory with the given settings.
    #[must_use]
    pub fn with_settings(settings: PoolSettings) -> Self {
        Pooling {
            delegate: Box::new(ConstructorInjection),
            settings,
        }
    }
}

impl Default for Pooling {
    fn default() -> Self {
        Pooling::new()
    }
}

impl ComponentFactory for Pooling {
    fn create_adapter(
        &self,
        context: &AdapterContext,
        properties: &mut Properties,
        spec: ComponentSpec,
    ) -> InjectResult<Box<dyn ComponentAdapter>> {
        let adapter = self.delegate.create_adapter(context, properties, spec)?;
        if properties.remove_if_present(&NO_POOL) {
            return Ok(adapter);
        }
        properties.remove_if_present(&POOL);
        Ok(context.behavior(Pooled::new(adapter, self.settings.clone())))
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
        "Pooling".to_string()
    }
}

behavior_factory!(Pooling);
