//! Shared search vocabulary.
//!
//! # Key Types
//!
//! - [`Cost`] / [`CostValue`]: integer or real costs, lower is better
//! - [`SolutionCostPair`]: immutable candidate + cost, ordered by cost
//! - [`ProgressTracker`]: best-of-all record shared across restarts and threads
//!
//! # Core Traits
//!
//! - [`Problem`], [`MutationOperator`], [`UndoableMutation`], [`Initializer`]
//! - [`TracksProgress`], [`RunsFixedLength`], [`ResumesFromBest`], [`Splittable`]

mod cost;
mod tracker;
mod traits;

pub use cost::{Cost, CostValue, SolutionCostPair};
pub use tracker::ProgressTracker;
pub use traits::{
    Initializer, MutationOperator, Problem, ResumesFromBest, RunsFixedLength, Splittable,
    TracksProgress, UndoableMutation,
};

#[cfg(test)]
pub(crate) mod testing;
