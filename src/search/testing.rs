//! Fixtures shared by unit tests across modules.

use super::{
    Initializer, MutationOperator, Problem, ProgressTracker, ResumesFromBest, RunsFixedLength,
    SolutionCostPair, Splittable, TracksProgress, UndoableMutation,
};
use crate::random::SplittableRng;
use rand::Rng;
use std::sync::Arc;

/// Number of set bits; optimum is all zeros.
pub(crate) struct OneMax;

impl Problem<Vec<bool>> for OneMax {
    type Cost = i64;

    fn cost(&self, bits: &Vec<bool>) -> i64 {
        bits.iter().filter(|&&b| b).count() as i64
    }

    fn min_cost(&self) -> i64 {
        0
    }
}

/// Flips one random bit and remembers it.
#[derive(Default)]
pub(crate) struct BitFlip {
    last: Option<usize>,
}

impl MutationOperator<Vec<bool>> for BitFlip {
    fn mutate(&mut self, bits: &mut Vec<bool>, rng: &mut SplittableRng) {
        let i = rng.random_range(0..bits.len());
        bits[i] = !bits[i];
        self.last = Some(i);
    }

    fn as_undoable(&mut self) -> Option<&mut dyn UndoableMutation<Vec<bool>>> {
        Some(self)
    }

    fn split(&self) -> Self {
        Self::default()
    }
}

impl UndoableMutation<Vec<bool>> for BitFlip {
    fn undo(&mut self, bits: &mut Vec<bool>) {
        if let Some(i) = self.last.take() {
            bits[i] = !bits[i];
        }
    }
}

/// Flips one random bit with no undo support.
pub(crate) struct PlainBitFlip;

impl MutationOperator<Vec<bool>> for PlainBitFlip {
    fn mutate(&mut self, bits: &mut Vec<bool>, rng: &mut SplittableRng) {
        let i = rng.random_range(0..bits.len());
        bits[i] = !bits[i];
    }

    fn split(&self) -> Self {
        PlainBitFlip
    }
}

pub(crate) struct RandomBits {
    pub(crate) n: usize,
}

impl Initializer<Vec<bool>> for RandomBits {
    fn create_candidate(&mut self, rng: &mut SplittableRng) -> Vec<bool> {
        (0..self.n).map(|_| rng.random_bool(0.5)).collect()
    }

    fn split(&self) -> Self {
        RandomBits { n: self.n }
    }
}

/// `f(x) = x^2` with no known lower bound.
pub(crate) struct Sphere;

impl Problem<f64> for Sphere {
    type Cost = f64;

    fn cost(&self, x: &f64) -> f64 {
        x * x
    }
}

pub(crate) struct Nudge;

impl MutationOperator<f64> for Nudge {
    fn mutate(&mut self, x: &mut f64, rng: &mut SplittableRng) {
        *x += rng.random_range(-1.0..1.0);
    }

    fn split(&self) -> Self {
        Nudge
    }
}

pub(crate) struct RandomPoint;

impl Initializer<f64> for RandomPoint {
    fn create_candidate(&mut self, rng: &mut SplittableRng) -> f64 {
        rng.random_range(-10.0..10.0)
    }

    fn split(&self) -> Self {
        RandomPoint
    }
}

/// Cost equals the candidate value.
pub(crate) struct Identity;

impl Problem<u64> for Identity {
    type Cost = i64;

    fn cost(&self, x: &u64) -> i64 {
        *x as i64
    }

    fn min_cost(&self) -> i64 {
        0
    }
}

/// Deterministic stand-in for a real search.
///
/// Each run consumes its full length unless `stop_after` total units are
/// reached, in which case the run is truncated and the tracker stopped.
pub(crate) struct CountingSearch {
    problem: Arc<Identity>,
    tracker: Arc<ProgressTracker<u64>>,
    total: u64,
    pub(crate) optimize_calls: usize,
    pub(crate) reoptimize_calls: usize,
    pub(crate) stop_after: Option<u64>,
    /// Cost reported by each run.
    pub(crate) result_cost: u64,
    /// Candidate reported by each run; the cost when unset.
    pub(crate) result_solution: Option<u64>,
}

impl CountingSearch {
    pub(crate) fn new(result_cost: u64) -> Self {
        Self {
            problem: Arc::new(Identity),
            tracker: Arc::new(ProgressTracker::new()),
            total: 0,
            optimize_calls: 0,
            reoptimize_calls: 0,
            stop_after: None,
            result_cost,
            result_solution: None,
        }
    }

    fn run(&mut self, run_length: usize) -> Option<SolutionCostPair<u64>> {
        if self.tracker.should_halt() {
            return None;
        }
        let mut len = run_length as u64;
        if let Some(limit) = self.stop_after {
            if self.total + len >= limit {
                len = limit - self.total;
                self.tracker.stop();
            }
        }
        self.total += len;
        let cost = self.result_cost as i64;
        let solution = self.result_solution.unwrap_or(self.result_cost);
        let optimal = self.problem.is_min_cost(cost);
        self.tracker.update(cost, &solution, optimal);
        Some(SolutionCostPair::new(solution, cost, optimal))
    }
}

impl TracksProgress<u64> for CountingSearch {
    type Problem = Identity;

    fn problem(&self) -> &Arc<Identity> {
        &self.problem
    }

    fn progress_tracker(&self) -> &Arc<ProgressTracker<u64>> {
        &self.tracker
    }

    fn set_progress_tracker(&mut self, tracker: Arc<ProgressTracker<u64>>) {
        self.tracker = tracker;
    }

    fn total_run_length(&self) -> u64 {
        self.total
    }
}

impl RunsFixedLength<u64> for CountingSearch {
    fn optimize(&mut self, run_length: usize) -> Option<SolutionCostPair<u64>> {
        self.optimize_calls += 1;
        self.run(run_length)
    }
}

impl ResumesFromBest<u64> for CountingSearch {
    fn reoptimize(&mut self, run_length: usize) -> Option<SolutionCostPair<u64>> {
        self.reoptimize_calls += 1;
        self.run(run_length)
    }
}

impl Splittable for CountingSearch {
    fn split(&mut self) -> Self {
        Self {
            problem: Arc::clone(&self.problem),
            tracker: Arc::clone(&self.tracker),
            total: 0,
            optimize_calls: 0,
            reoptimize_calls: 0,
            stop_after: self.stop_after,
            result_cost: self.result_cost,
            result_solution: self.result_solution,
        }
    }
}
