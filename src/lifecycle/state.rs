use crate::{ComponentKey, InjectError, InjectResult};
use derive_more::Display;

/// The lifecycle state of a container.
///
/// ```text
/// constructed -> started <-> stopped
///      \            \          /
///       ------------> disposed
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum LifecycleState {
    /// Created, but never started.
    #[display(fmt = "constructed")]
    Constructed,

    /// Started.
    #[display(fmt = "started")]
    Started,

    /// Stopped after being started.
    #[display(fmt = "stopped")]
    Stopped,

    /// Disposed. No further transitions are possible.
    #[display(fmt = "disposed")]
    Disposed,
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::Constructed
    }
}

impl LifecycleState {
    /// Transitions into [`LifecycleState::Started`].
    pub fn starting(self, key: &ComponentKey) -> InjectResult<Self> {
        match self {
            LifecycleState::Constructed | LifecycleState::Stopped => {
                Ok(LifecycleState::Started)
            }
            LifecycleState::Started => Err(illegal(key, "already started")),
            LifecycleState::Disposed => Err(illegal(key, "already disposed")),
        }
    }

    /// Transitions into [`LifecycleState::Stopped`].
    pub fn stopping(self, key: &ComponentKey) -> InjectResult<Self> {
        match self {
            LifecycleState::Started => Ok(LifecycleState::Stopped),
            LifecycleState::Disposed => Err(illegal(key, "already disposed")),
            LifecycleState::Constructed | LifecycleState::Stopped => {
                Err(illegal(key, "not started"))
            }
        }
    }

    /// Transitions into [`LifecycleState::Disposed`].
    pub fn disposing(self, key: &ComponentKey) -> InjectResult<Self> {
        match self {
            LifecycleState::Disposed => Err(illegal(key, "already disposed")),
            _ => Ok(LifecycleState::Disposed),
        }
    }

    /// Whether the container is started.
    #[must_use]
    pub fn is_started(self) -> bool {
        self == LifecycleState::Started
    }

    /// Whether the container is disposed.
    #[must_use]
    pub fn is_disposed(self) -> bool {
        self == LifecycleState::Disposed
    }
}

fn illegal(key: &ComponentKey, message: &'static str) -> InjectError {
    InjectError::IllegalState {
        key: key.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_stop_cycle_is_allowed() {
        let key = ComponentKey::name("container");
        let state = LifecycleState::default()
            .starting(&key)
            .and_then(|state| state.stopping(&key))
            .and_then(|state| state.starting(&key))
            .unwrap();
        assert!(state.is_started());
    }

    #[test]
    fn double_start_is_rejected() {
        let key = ComponentKey::name("container");
        let state = LifecycleState::Started;
        match state.starting(&key) {
            Err(InjectError::IllegalState { message, .. }) => {
                assert_eq!("already started", message);
            }
            Err(error) => Err(error).unwrap(),
            Ok(_) => unreachable!("container should not start twice"),
        }
    }

    #[test]
    fn nothing_follows_disposal() {
        let key = ComponentKey::name("container");
        let state = LifecycleState::Disposed;
        assert!(state.starting(&key).is_err());
        assert!(state.stopping(&key).is_err());
        assert!(state.disposing(&key).is_err());
        assert!(LifecycleState::Constructed.stopping(&key).is_err());
    }
}
