//! Simulated annealing with adaptive schedules and restart coordination.
//!
//! - **Simulated Annealing (SA)**: a single-run engine generic over the
//!   problem, mutation operator, initializer and annealing schedule, with
//!   fixed, parameter-free and self-tuning (Lam) schedules.
//! - **Stochastic Hill Climbing**: the zero-temperature baseline, sharing
//!   the same capabilities as the annealing engine.
//! - **Restarts**: sequential multistart driven by restart schedules
//!   (constant, Luby, variable annealing length), and parallel multistart
//!   across a thread pool with a shared best-of-all tracker.
//!
//! # Architecture
//!
//! Problems, mutation operators and initializers are supplied by the user
//! through the traits in [`search`]. Every search reports into a shared
//! [`ProgressTracker`](search::ProgressTracker); the coordinators in
//! [`restarts`] split searches into independent per-thread copies that share
//! only that tracker and the problem instance.
//!
//! Randomness comes from [`SplittableRng`](random::SplittableRng). Call
//! [`random::configure_seed`] before constructing components to make runs
//! reproducible.

pub mod error;
pub mod hill_climbing;
pub mod random;
pub mod restarts;
pub mod sa;
pub mod search;

pub use error::{ScheduleError, SearchError};
