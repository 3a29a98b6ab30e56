//! Simulated annealing engine.

use super::schedule::AnnealingSchedule;
use crate::random::SplittableRng;
use crate::search::{
    CostValue, Initializer, MutationOperator, Problem, ProgressTracker, ResumesFromBest,
    RunsFixedLength, SolutionCostPair, Splittable, TracksProgress,
};
use rand::SeedableRng;
use std::sync::Arc;

/// Statistics of the most recent run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunStats {
    /// Neighbor evaluations performed.
    pub evaluations: u64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: u64,

    /// Number of strictly improving moves.
    pub improving_moves: u64,

    /// Temperature when the run ended.
    pub final_temperature: f64,
}

/// Single-solution simulated annealing over candidates of type `T`.
///
/// Each run starts from a candidate, then repeatedly mutates it, evaluates
/// the result and asks the [`AnnealingSchedule`] whether to keep it.
/// Rejected mutations are undone in place when the operator supports
/// [`UndoableMutation`](crate::search::UndoableMutation); otherwise the
/// engine restores a copy taken before the mutation.
///
/// Accepted candidates that beat the shared tracker are published to it.
/// The stop and found-best flags are polled once per evaluation.
///
/// # Examples
///
/// ```ignore
/// let problem = Arc::new(MyProblem::new());
/// let mut sa = SimulatedAnnealing::new(problem, SwapMutation, RandomPermutation, ModifiedLam::new())
///     .with_seed(42);
/// let end = sa.optimize(100_000);
/// let best = sa.progress_tracker().solution_cost_pair();
/// ```
pub struct SimulatedAnnealing<T, P, M, I, S> {
    problem: Arc<P>,
    mutation: M,
    initializer: I,
    schedule: S,
    tracker: Arc<ProgressTracker<T>>,
    rng: SplittableRng,
    can_undo: bool,
    total_run_length: u64,
    last_run: RunStats,
}

impl<T, P, M, I, S> SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
    S: AnnealingSchedule,
{
    /// Creates an engine with a fresh progress tracker.
    pub fn new(problem: Arc<P>, mutation: M, initializer: I, schedule: S) -> Self {
        Self::with_tracker(
            problem,
            mutation,
            initializer,
            schedule,
            Arc::new(ProgressTracker::new()),
        )
    }

    /// Creates an engine that reports into an existing tracker.
    pub fn with_tracker(
        problem: Arc<P>,
        mut mutation: M,
        initializer: I,
        schedule: S,
        tracker: Arc<ProgressTracker<T>>,
    ) -> Self {
        let can_undo = mutation.as_undoable().is_some();
        Self {
            problem,
            mutation,
            initializer,
            schedule,
            tracker,
            rng: SplittableRng::new(),
            can_undo,
            total_run_length: 0,
            last_run: RunStats::default(),
        }
    }

    /// Reseeds the engine's random stream.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SplittableRng::seed_from_u64(seed);
        self
    }

    pub fn schedule(&self) -> &S {
        &self.schedule
    }

    /// Statistics of the most recent run.
    pub fn last_run(&self) -> RunStats {
        self.last_run
    }

    fn publish(&self, cost: P::Cost, candidate: &T) {
        if cost.to_f64() <= self.tracker.cost_double() {
            self.tracker
                .update(cost, candidate, self.problem.is_min_cost(cost));
        }
    }

    fn anneal(&mut self, mut current: T, run_length: usize) -> SolutionCostPair<T> {
        let mut current_cost = self.problem.cost(&current);
        self.publish(current_cost, &current);
        self.schedule.init(run_length);

        let mut stats = RunStats::default();
        while stats.evaluations < run_length as u64 && !self.tracker.should_halt() {
            let backup = if self.can_undo {
                None
            } else {
                Some(current.clone())
            };
            self.mutation.mutate(&mut current, &mut self.rng);
            let neighbor_cost = self.problem.cost(&current);
            stats.evaluations += 1;

            if self
                .schedule
                .accept(neighbor_cost.to_f64(), current_cost.to_f64(), &mut self.rng)
            {
                stats.accepted_moves += 1;
                if neighbor_cost < current_cost {
                    stats.improving_moves += 1;
                }
                current_cost = neighbor_cost;
                self.publish(current_cost, &current);
            } else if let Some(previous) = backup {
                current = previous;
            } else if let Some(undoable) = self.mutation.as_undoable() {
                undoable.undo(&mut current);
            }
        }

        stats.final_temperature = self.schedule.temperature();
        self.total_run_length += stats.evaluations;
        self.last_run = stats;
        tracing::debug!(
            run_length,
            evaluations = stats.evaluations,
            accepted = stats.accepted_moves,
            cost = current_cost.to_f64(),
            temperature = stats.final_temperature,
            "annealing run finished"
        );

        let optimal = self.problem.is_min_cost(current_cost);
        SolutionCostPair::new(current, current_cost, optimal)
    }
}

impl<T, P, M, I, S> TracksProgress<T> for SimulatedAnnealing<T, P, M, I, S>
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

impl<T, P, M, I, S> RunsFixedLength<T> for SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
    S: AnnealingSchedule,
{
    fn optimize(&mut self, run_length: usize) -> Option<SolutionCostPair<T>> {
        if self.tracker.should_halt() {
            return None;
        }
        let start = self.initializer.create_candidate(&mut self.rng);
        Some(self.anneal(start, run_length))
    }
}

impl<T, P, M, I, S> ResumesFromBest<T> for SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
    S: AnnealingSchedule,
{
    fn reoptimize(&mut self, run_length: usize) -> Option<SolutionCostPair<T>> {
        if self.tracker.should_halt() {
            return None;
        }
        let start = match self.tracker.solution() {
            Some(best) => best,
            None => self.initializer.create_candidate(&mut self.rng),
        };
        Some(self.anneal(start, run_length))
    }
}

impl<T, P, M, I, S> Splittable for SimulatedAnnealing<T, P, M, I, S>
where
    T: Clone + Send,
    P: Problem<T>,
    M: MutationOperator<T>,
    I: Initializer<T>,
    S: AnnealingSchedule,
{
    fn split(&mut self) -> Self {
        Self {
            problem: Arc::clone(&self.problem),
            mutation: self.mutation.split(),
            initializer: self.initializer.split(),
            schedule: self.schedule.split(),
            tracker: Arc::clone(&self.tracker),
            rng: self.rng.split(),
            can_undo: self.can_undo,
            total_run_length: 0,
            last_run: RunStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sa::{ExponentialCooling, LinearCooling, ModifiedLam, SelfTuningLam};
    use crate::search::testing::{
        BitFlip, Nudge, OneMax, PlainBitFlip, RandomBits, RandomPoint, Sphere,
    };
    use crate::search::Cost;

    fn onemax_sa<S: AnnealingSchedule>(
        schedule: S,
    ) -> SimulatedAnnealing<Vec<bool>, OneMax, BitFlip, RandomBits, S> {
        SimulatedAnnealing::new(
            Arc::new(OneMax),
            BitFlip::default(),
            RandomBits { n: 40 },
            schedule,
        )
        .with_seed(42)
    }

    #[test]
    fn test_onemax_reaches_optimum() {
        let mut sa = onemax_sa(ModifiedLam::new());
        let end = sa.optimize(20_000).unwrap();
        assert_eq!(sa.progress_tracker().cost(), 0);
        assert!(sa.progress_tracker().did_find_best());
        assert_eq!(end.cost(), Cost::Int(0));
        assert!(end.is_known_optimal());
        // Stops as soon as the optimum is published.
        assert!(sa.total_run_length() < 20_000);
    }

    #[test]
    fn test_halted_tracker_short_circuits() {
        let mut sa = onemax_sa(ModifiedLam::new());
        sa.progress_tracker().stop();
        assert!(sa.optimize(1000).is_none());
        assert!(sa.reoptimize(1000).is_none());
        assert_eq!(sa.total_run_length(), 0);
    }

    #[test]
    fn test_externally_reported_optimum_short_circuits() {
        let mut sa = onemax_sa(ModifiedLam::new());
        sa.optimize(10).unwrap();
        sa.progress_tracker().set_found_best();
        let before = sa.total_run_length();
        assert!(sa.optimize(1000).is_none());
        assert!(sa.reoptimize(1000).is_none());
        assert_eq!(sa.total_run_length(), before);
    }

    #[test]
    fn test_run_length_respected() {
        // Sphere has no known lower bound, so runs use their whole budget.
        let mut sa = SimulatedAnnealing::new(
            Arc::new(Sphere),
            Nudge,
            RandomPoint,
            ExponentialCooling::new(10.0, 0.999).unwrap(),
        )
        .with_seed(7);
        sa.optimize(500).unwrap();
        sa.optimize(300).unwrap();
        assert_eq!(sa.total_run_length(), 800);
        assert_eq!(sa.last_run().evaluations, 300);
    }

    #[test]
    fn test_sphere_converges() {
        let mut sa = SimulatedAnnealing::new(
            Arc::new(Sphere),
            Nudge,
            RandomPoint,
            SelfTuningLam::new(),
        )
        .with_seed(42);
        sa.optimize(50_000).unwrap();
        let best = sa.progress_tracker().cost_double();
        assert!(best < 0.01, "expected near-zero cost, got {best}");
    }

    #[test]
    fn test_tracker_matches_best_seen() {
        let mut sa = SimulatedAnnealing::new(
            Arc::new(Sphere),
            Nudge,
            RandomPoint,
            LinearCooling::new(5.0, 0.01).unwrap(),
        )
        .with_seed(3);
        let end = sa.optimize(2000).unwrap();
        let pair = sa.progress_tracker().solution_cost_pair().unwrap();
        assert!(pair.cost() <= end.cost());
        assert_eq!(pair.cost_f64(), pair.solution() * pair.solution());
    }

    #[test]
    fn test_without_undo_matches_with_undo() {
        // Same seeds and the same flips: only the restore path differs.
        let mut with_undo = onemax_sa(ExponentialCooling::new(2.0, 0.99).unwrap());
        let mut without = SimulatedAnnealing::new(
            Arc::new(OneMax),
            PlainBitFlip,
            RandomBits { n: 40 },
            ExponentialCooling::new(2.0, 0.99).unwrap(),
        )
        .with_seed(42);
        let a = with_undo.optimize(500).unwrap();
        let b = without.optimize(500).unwrap();
        assert_eq!(a.solution(), b.solution());
        assert_eq!(with_undo.last_run(), without.last_run());
    }

    #[test]
    fn test_reoptimize_starts_from_best() {
        let mut sa = SimulatedAnnealing::new(
            Arc::new(Sphere),
            Nudge,
            RandomPoint,
            ExponentialCooling::new(1e-3, 0.5).unwrap(),
        )
        .with_seed(1);
        sa.progress_tracker().update(0.25, &0.5, false);
        // Zero-length run returns the starting candidate unchanged.
        let end = sa.reoptimize(0).unwrap();
        assert_eq!(*end.solution(), 0.5);
    }

    #[test]
    fn test_split_shares_tracker_and_problem() {
        let mut sa = onemax_sa(ModifiedLam::new());
        sa.optimize(10).unwrap();
        let copy = sa.split();
        assert!(Arc::ptr_eq(sa.progress_tracker(), copy.progress_tracker()));
        assert!(Arc::ptr_eq(sa.problem(), copy.problem()));
        assert_eq!(copy.total_run_length(), 0);
    }

    #[test]
    fn test_split_streams_differ() {
        let mut a = SimulatedAnnealing::new(
            Arc::new(Sphere),
            Nudge,
            RandomPoint,
            ModifiedLam::new(),
        )
        .with_seed(9);
        let mut b = a.split();
        let ra = a.optimize(0).unwrap();
        let rb = b.optimize(0).unwrap();
        assert_ne!(ra.solution(), rb.solution());
    }

    #[test]
    fn test_stats_consistent() {
        let mut sa = onemax_sa(ModifiedLam::new());
        sa.optimize(200).unwrap();
        let stats = sa.last_run();
        assert!(stats.accepted_moves <= stats.evaluations);
        assert!(stats.improving_moves <= stats.accepted_moves);
        assert!(stats.final_temperature > 0.0);
    }
}
