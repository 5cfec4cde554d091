use std::fmt;

use thiserror::Error;

/// Service worker lifecycle. Installation skips the waiting phase, so there
/// is no "installed but waiting" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    #[default]
    Installing,
    Active,
    Redundant,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("illegal worker transition {from} -> {to}")]
pub struct LifecycleError {
    pub from: WorkerState,
    pub to: WorkerState,
}

impl WorkerState {
    /// Only an active worker intercepts fetches.
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }

    /// Installing -> Active, without waiting for older workers to release.
    pub fn skip_waiting(self) -> Result<WorkerState, LifecycleError> {
        match self {
            WorkerState::Installing => Ok(WorkerState::Active),
            from => Err(LifecycleError {
                from,
                to: WorkerState::Active,
            }),
        }
    }

    /// A newer registration took over. Any non-terminal worker may be replaced.
    pub fn supersede(self) -> Result<WorkerState, LifecycleError> {
        match self {
            WorkerState::Installing | WorkerState::Active => Ok(WorkerState::Redundant),
            from => Err(LifecycleError {
                from,
                to: WorkerState::Redundant,
            }),
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Installing => write!(f, "installing"),
            WorkerState::Active => write!(f, "active"),
            WorkerState::Redundant => write!(f, "redundant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installing_skips_straight_to_active() {
        let state = WorkerState::default();
        assert!(!state.can_intercept_fetch());
        let state = state.skip_waiting().unwrap();
        assert!(state.can_intercept_fetch());
    }

    #[test]
    fn redundant_is_terminal() {
        let state = WorkerState::Active.supersede().unwrap();
        assert!(state.is_terminal());
        assert_eq!(
            state.skip_waiting().unwrap_err(),
            LifecycleError {
                from: WorkerState::Redundant,
                to: WorkerState::Active
            }
        );
        assert!(state.supersede().is_err());
    }

    #[test]
    fn active_cannot_install_again() {
        let err = WorkerState::Active.skip_waiting().unwrap_err();
        assert_eq!(err.to_string(), "illegal worker transition active -> active");
    }
}
