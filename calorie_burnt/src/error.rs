use crate::SessionState;

/// Input rejected at the session boundary. The estimator itself never fails.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Weight must be a positive number of kilograms, got {0}")]
    NonPositiveWeight(f64),

    #[error("Sampling interval must be longer than zero")]
    ZeroInterval,

    #[error("Moving average capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Can't move cardio session from {from} to {to}")]
    InvalidTransition {
        from: SessionState,
        to: SessionState,
    },
}
