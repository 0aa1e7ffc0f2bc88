use crate::{
    ComponentAdapter, DynSvc, InjectError, InjectResult, LifecyclePhase,
};
use parking_lot::{Mutex, ReentrantMutex};

#[derive(Default)]
struct StoredState {
    instance: Option<DynSvc>,
    started: bool,
    starting: bool,
    disposed: bool,
}

/// A single held instance together with its lifecycle state.
///
/// Lifecycle transitions are serialized. A thread starting the instance
/// holds the transition lock until the `Start` hook returns, so other
/// threads never observe a half started instance.
#[derive(Default)]
pub(crate) struct Stored {
    state: Mutex<StoredState>,
    transition: ReentrantMutex<()>,
}

impl Stored {
    /// Holds `instance` from the beginning.
    pub fn holding(instance: DynSvc) -> Self {
        Stored {
            state: Mutex::new(StoredState {
                instance: Some(instance),
                ..StoredState::default()
            }),
            transition: ReentrantMutex::new(()),
        }
    }

    pub fn get(&self) -> Option<DynSvc> {
        self.state.lock().instance.clone()
    }

    /// Gets the held instance, creating it if there is none. The lock is not
    /// held while creating, so concurrent first requests may both create an
    /// instance. Only the first one stored is kept.
    pub fn get_or_create(
        &self,
        create: impl FnOnce() -> InjectResult<DynSvc>,
    ) -> InjectResult<DynSvc> {
        if let Some(instance) = self.get() {
            return Ok(instance);
        }

        let created = create()?;
        let mut state = self.state.lock();
        Ok(state.instance.get_or_insert(created).clone())
    }

    pub fn replace(&self, instance: DynSvc) -> Option<DynSvc> {
        self.state.lock().instance.replace(instance)
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    pub fn start(
        &self,
        adapter: &dyn ComponentAdapter,
        create: impl FnOnce() -> InjectResult<DynSvc>,
    ) -> InjectResult<()> {
        let _transition = self.transition.lock();
        self.start_locked(adapter, create)
    }

    /// Starts the instance unless it is started already. A start in
    /// progress on another thread is waited for. One in progress further up
    /// the current thread's stack counts as started.
    pub fn ensure_started(
        &self,
        adapter: &dyn ComponentAdapter,
        create: impl FnOnce() -> InjectResult<DynSvc>,
    ) -> InjectResult<()> {
        let _transition = self.transition.lock();
        {
            let state = self.state.lock();
            if state.started || state.starting {
                return Ok(());
            }
        }
        self.start_locked(adapter, create)
    }

    fn start_locked(
        &self,
        adapter: &dyn ComponentAdapter,
        create: impl FnOnce() -> InjectResult<DynSvc>,
    ) -> InjectResult<()> {
        {
            let mut state = self.state.lock();
            if state.disposed {
                return Err(illegal(adapter, "already disposed"));
            }
            if state.started || state.starting {
                return Err(illegal(adapter, "already started"));
            }
            state.starting = true;
        }

        let result = self.get_or_create(create).and_then(|instance| {
            adapter.invoke_lifecycle(LifecyclePhase::Start, &instance)
        });

        let mut state = self.state.lock();
        state.starting = false;
        state.started = result.is_ok();
        result
    }

    pub fn stop(&self, adapter: &dyn ComponentAdapter) -> InjectResult<()> {
        let _transition = self.transition.lock();
        let instance = {
            let state = self.state.lock();
            if state.disposed {
                return Err(illegal(adapter, "already disposed"));
            }
            let Some(instance) = state.instance.clone() else {
                return Err(illegal(adapter, "not instantiated"));
            };
            if !state.started {
                return Err(illegal(adapter, "not started"));
            }
            instance
        };

        adapter.invoke_lifecycle(LifecyclePhase::Stop, &instance)?;
        self.state.lock().started = false;
        Ok(())
    }

    pub fn dispose(&self, adapter: &dyn ComponentAdapter) -> InjectResult<()> {
        let _transition = self.transition.lock();
        let instance = {
            let state = self.state.lock();
            if state.disposed {
                return Err(illegal(adapter, "already disposed"));
            }
            state.instance.clone()
        };

        if let Some(instance) = instance {
            adapter.invoke_lifecycle(LifecyclePhase::Dispose, &instance)?;
            self.state.lock().disposed = true;
        }
        Ok(())
    }

    /// Drops the held instance. A started instance is stopped and disposed
    /// first.
    pub fn flush(&self, adapter: &dyn ComponentAdapter) -> InjectResult<()> {
        let _transition = self.transition.lock();
        let (instance, started) = {
            let mut state = self.state.lock();
            let started = std::mem::take(&mut state.started);
            (state.instance.take(), started)
        };

        if let (Some(instance), true) = (instance, started) {
            adapter.invoke_lifecycle(LifecyclePhase::Stop, &instance)?;
            adapter.invoke_lifecycle(LifecyclePhase::Dispose, &instance)?;
        }
        Ok(())
    }
}

fn illegal(adapter: &dyn ComponentAdapter, message: &'static str) -> InjectError {
    InjectError::IllegalState {
        key: adapter.key().clone(),
        message,
    }
}
