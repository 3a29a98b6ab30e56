//! Error types.

use thiserror::Error;

/// Rejected annealing schedule parameters.
///
/// Returned synchronously by schedule constructors. There is no recovery:
/// build a new schedule with valid parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("initial temperature must be positive, got {0}")]
    InitialTemperature(f64),

    #[error("minimum temperature must be positive, got {0}")]
    MinTemperature(f64),

    #[error("minimum temperature {min} must be below initial temperature {initial}")]
    MinAboveInitial { min: f64, initial: f64 },

    #[error("cooling rate alpha must be in (0, 1), got {0}")]
    Alpha(f64),

    #[error("temperature decrement must be positive, got {0}")]
    DeltaT(f64),

    #[error("steps between temperature changes must be at least 1")]
    ZeroSteps,
}

/// Errors raised by search coordinators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error("a parallel multistarter needs at least one search")]
    NoSearches,

    #[error("number of threads must be at least 1")]
    ZeroThreads,

    #[error("all searches must share the same progress tracker")]
    MismatchedTracker,

    #[error("all searches must solve the same problem instance")]
    MismatchedProblem,

    #[error("invalid restart schedule: {0}")]
    InvalidRestartSchedule(String),

    #[error("the multistarter has been closed")]
    Closed,

    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("search thread panicked: {0}")]
    WorkerPanicked(String),
}

/// Result alias for coordinator operations.
pub type Result<T> = std::result::Result<T, SearchError>;
