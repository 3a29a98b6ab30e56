//! Collaborator contracts and search capabilities.
//!
//! The engine sees candidates only through three collaborators:
//!
//! - [`Problem`]: evaluates cost and recognizes a proven optimum
//! - [`MutationOperator`]: perturbs a candidate in place, optionally undoable
//!   through [`UndoableMutation`]
//! - [`Initializer`]: produces random starting candidates
//!
//! Searches themselves are described by small capability traits that are
//! composed per concrete type instead of a deep hierarchy:
//! [`TracksProgress`], [`RunsFixedLength`], [`ResumesFromBest`] and
//! [`Splittable`].

use super::cost::{CostValue, SolutionCostPair};
use super::tracker::ProgressTracker;
use crate::random::SplittableRng;
use std::sync::Arc;

/// Defines an optimization problem over candidates of type `T`.
///
/// Shared by reference across threads, so evaluation must not need
/// mutable state.
///
/// # Minimization
///
/// Lower cost is better. For maximization, negate the cost.
pub trait Problem<T>: Send + Sync {
    /// `i64` for integer-valued problems, `f64` otherwise.
    type Cost: CostValue;

    /// Computes the cost of a candidate.
    fn cost(&self, candidate: &T) -> Self::Cost;

    /// A lower bound on the cost. Defaults to the smallest representable
    /// value, which disables proven-optimal short-circuiting.
    fn min_cost(&self) -> Self::Cost {
        Self::Cost::lower_bound()
    }

    /// Whether `cost` equals the lower bound.
    fn is_min_cost(&self, cost: Self::Cost) -> bool {
        cost == self.min_cost()
    }
}

/// Perturbs a candidate in place.
pub trait MutationOperator<T>: Send {
    fn mutate(&mut self, candidate: &mut T, rng: &mut SplittableRng);

    /// Returns the undo capability if this operator has one.
    ///
    /// Operators without it force the engine to keep a copy of the
    /// pre-mutation candidate and restore that on rejection.
    fn as_undoable(&mut self) -> Option<&mut dyn UndoableMutation<T>> {
        None
    }

    /// Independent copy for use on another thread.
    fn split(&self) -> Self
    where
        Self: Sized;
}

/// A mutation operator that can revert its most recent mutation.
pub trait UndoableMutation<T>: MutationOperator<T> {
    /// Restores `candidate` to its state before the last
    /// [`mutate`](MutationOperator::mutate) call.
    fn undo(&mut self, candidate: &mut T);
}

/// Produces random starting candidates.
pub trait Initializer<T>: Send {
    fn create_candidate(&mut self, rng: &mut SplittableRng) -> T;

    fn split(&self) -> Self
    where
        Self: Sized;
}

/// A search that reports into a shared [`ProgressTracker`].
pub trait TracksProgress<T> {
    /// The problem type; parallel coordinators compare instances by
    /// pointer identity.
    type Problem: ?Sized;

    fn problem(&self) -> &Arc<Self::Problem>;

    fn progress_tracker(&self) -> &Arc<ProgressTracker<T>>;

    /// Replaces the tracker, e.g. to join an existing experiment.
    fn set_progress_tracker(&mut self, tracker: Arc<ProgressTracker<T>>);

    /// Total evaluations performed across every run so far.
    fn total_run_length(&self) -> u64;
}

/// A search that can execute one run of a given length.
pub trait RunsFixedLength<T>: TracksProgress<T> + Send {
    /// Runs from a fresh random start for at most `run_length`
    /// evaluations.
    ///
    /// Returns `None` without doing any work if the tracker is stopped or
    /// already holds a proven optimum. Otherwise returns the end-of-run
    /// candidate, which may differ from the tracker's best.
    fn optimize(&mut self, run_length: usize) -> Option<SolutionCostPair<T>>;
}

/// A search that can continue from the tracker's best solution.
pub trait ResumesFromBest<T>: RunsFixedLength<T> {
    /// Like [`optimize`](RunsFixedLength::optimize), but starts from the
    /// tracker's best solution when there is one.
    fn reoptimize(&mut self, run_length: usize) -> Option<SolutionCostPair<T>>;
}

/// Produces an independent copy for use on another thread.
///
/// The copy shares the problem and progress tracker but owns its own
/// random stream and mutable search state.
pub trait Splittable: Sized {
    fn split(&mut self) -> Self;
}
