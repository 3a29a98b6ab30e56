//! Stochastic hill climbing execution loop.

use crate::random::SplittableRng;
use crate::search::{
    CostValue, Initializer, MutationOperator, Problem, ProgressTracker, ResumesFromBest,
    RunsFixedLength, SolutionCostPair, Splittable, TracksProgress,
};
use rand::SeedableRng;
use std::sync::Arc;

/// First-improvement stochastic hill climber.
///
/// Applies one random mutation per evaluation and keeps it only if the
/// cost does not get worse. Sideways moves are accepted so the search can
/// drift across plateaus. Combine with a
/// [`Multistarter`](crate::restarts::Multistarter) to escape local optima.
pub struct StochasticHillClimber<T, P, M, I> {
    problem: Arc<P>,
    mutation: M,
    initializer: I,
    tracker: Arc<ProgressTracker<T>>,
    rng: SplittableRng,
    can_undo: bool,
    total_run_length: u64,
}

impl<T, P, M, I> StochasticHillClimber<T, P, M, I>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
{
    pub fn new(problem: Arc<P>, mutation: M, initializer: I) -> Self {
        Self::with_tracker(problem, mutation, initializer, Arc::new(ProgressTracker::new()))
    }

    pub fn with_tracker(
        problem: Arc<P>,
        mut mutation: M,
        initializer: I,
        tracker: Arc<ProgressTracker<T>>,
    ) -> Self {
        let can_undo = mutation.as_undoable().is_some();
        Self {
            problem,
            mutation,
            initializer,
            tracker,
            rng: SplittableRng::new(),
            can_undo,
            total_run_length: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SplittableRng::seed_from_u64(seed);
        self
    }

    fn publish(&self, cost: P::Cost, candidate: &T) {
        if cost.to_f64() <= self.tracker.cost_double() {
            self.tracker
                .update(cost, candidate, self.problem.is_min_cost(cost));
        }
    }

    fn climb(&mut self, mut current: T, run_length: usize) -> SolutionCostPair<T> {
        let mut current_cost = self.problem.cost(&current);
        self.publish(current_cost, &current);
        let mut evaluations = 0u64;
        while evaluations < run_length as u64 && !self.tracker.should_halt() {
            let backup = if self.can_undo {
                None
            } else {
                Some(current.clone())
            };
            self.mutation.mutate(&mut current, &mut self.rng);
            let neighbor_cost = self.problem.cost(&current);
            evaluations += 1;

            if neighbor_cost <= current_cost && neighbor_cost.to_f64() < f64::INFINITY {
                let improved = neighbor_cost < current_cost;
                current_cost = neighbor_cost;
                if improved {
                    self.publish(current_cost, &current);
                }
            } else if let Some(previous) = backup {
                current = previous;
            } else if let Some(undoable) = self.mutation.as_undoable() {
                undoable.undo(&mut current);
            }
        }
        self.total_run_length += evaluations;
        tracing::debug!(
            run_length,
            evaluations,
            cost = current_cost.to_f64(),
            "hill climbing run finished"
        );

        let optimal = self.problem.is_min_cost(current_cost);
        SolutionCostPair::new(current, current_cost, optimal)
    }
}

impl<T, P, M, I> TracksProgress<T> for StochasticHillClimber<T, P, M, I>
where
    P: Problem<T>,
{
    type Problem = P;

    fn problem(&self) -> &Arc<P> {
        &self.problem
    }

    fn progress_tracker(&self) -> &Arc<ProgressTracker<T>> {
        &self.tracker
    }

    fn set_progress_tracker(&mut self, tracker: Arc<ProgressTracker<T>>) {
        self.tracker = tracker;
    }

    fn total_run_length(&self) -> u64 {
        self.total_run_length
    }
}

impl<T, P, M, I> RunsFixedLength<T> for StochasticHillClimber<T, P, M, I>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
{
    fn optimize(&mut self, run_length: usize) -> Option<SolutionCostPair<T>> {
        if self.tracker.should_halt() {
            return None;
        }
        let start = self.initializer.create_candidate(&mut self.rng);
        Some(self.climb(start, run_length))
    }
}

impl<T, P, M, I> ResumesFromBest<T> for StochasticHillClimber<T, P, M, I>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
{
    fn reoptimize(&mut self, run_length: usize) -> Option<SolutionCostPair<T>> {
        if self.tracker.should_halt() {
            return None;
        }
        let start = match self.tracker.solution() {
            Some(best) => best,
            None => self.initializer.create_candidate(&mut self.rng),
        };
        Some(self.climb(start, run_length))
    }
}

impl<T, P, M, I> Splittable for StochasticHillClimber<T, P, M, I>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
{
    fn split(&mut self) -> Self {
        Self {
            problem: Arc::clone(&self.problem),
            mutation: self.mutation.split(),
            initializer: self.initializer.split(),
            tracker: Arc::clone(&self.tracker),
            rng: self.rng.split(),
            can_undo: self.can_undo,
            total_run_length: 0,
        }
    }
}
