use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecompositionError {
    #[error("Precondition failed before decomposition began: {0}")]
    Precondition(#[from] PreconditionError),
    #[error("Internal consistency failure during surface attribution: {0}")]
    InternalConsistency(#[from] InternalConsistencyError),
    #[error("Time series fetch failed: {0}")]
    Fetch(#[from] anyhow::Error),
}

/// Failures detected before any channel arithmetic starts. These indicate bad
/// input (no annual run, or a provider returning the wrong series shape) and
/// abort processing of the zone.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("An annual simulation is required: the run covered {hours_simulated} hours where {expected} were expected")]
    NotAnnual { hours_simulated: f64, expected: u32 },
    #[error("Timesteps per hour must be between 1 and 60 and divide 60 evenly, got {0}")]
    InvalidStepsPerHour(usize),
    #[error("Series for '{variable}' (key '{key}') has {actual} values where {expected} were expected")]
    SeriesLengthMismatch {
        variable: String,
        key: String,
        expected: usize,
        actual: usize,
    },
}

/// An arithmetic defect in the implementation itself (not bad input): the
/// interior-to-exterior redistribution failed to drive an interior channel to
/// a zero annual sum.
#[derive(Debug, Error)]
#[error("Channel '{channel}' sums to {residual} after redistribution; expected zero")]
pub struct InternalConsistencyError {
    pub channel: String,
    pub residual: f64,
}
