//! Shared best-solution record.
//!
//! One [`ProgressTracker`] is created per experiment and shared through an
//! `Arc` by every sequential restart and every parallel thread of that
//! experiment. It is the only mutable state crossing thread boundaries.

use super::cost::{Cost, SolutionCostPair};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::{Duration, Instant};

struct Best<T> {
    solution: T,
    cost: Cost,
    known_optimal: bool,
    improved_at: Instant,
}

/// Thread-safe record of the best solution found so far.
///
/// Writes go through a single lock so the stored candidate always matches
/// the stored cost. The cost is mirrored into atomics for lock-free reads
/// on hot paths; those reads may lag a concurrent writer but never observe
/// a worse cost than one already published.
pub struct ProgressTracker<T> {
    best: Mutex<Option<Best<T>>>,
    cost_int: AtomicI64,
    cost_bits: AtomicU64,
    int_valued: AtomicBool,
    found_best: AtomicBool,
    stopped: AtomicBool,
}

impl<T> ProgressTracker<T> {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            best: Mutex::new(None),
            cost_int: AtomicI64::new(i64::MAX),
            cost_bits: AtomicU64::new(f64::INFINITY.to_bits()),
            int_valued: AtomicBool::new(false),
            found_best: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    /// Best integer cost, or `i64::MAX` if nothing has been recorded.
    ///
    /// Non-blocking. For real-valued problems this is the best cost
    /// truncated toward zero.
    pub fn cost(&self) -> i64 {
        self.cost_int.load(Ordering::Acquire)
    }

    /// Best cost as `f64`, or `+inf` if nothing has been recorded.
    ///
    /// Non-blocking.
    pub fn cost_double(&self) -> f64 {
        f64::from_bits(self.cost_bits.load(Ordering::Acquire))
    }

    /// Whether the stored cost came from an integer-valued problem.
    pub fn contains_int_cost(&self) -> bool {
        self.int_valued.load(Ordering::Acquire)
    }

    /// Best cost as a [`Cost`], or `None` if nothing has been recorded.
    pub fn best_cost(&self) -> Option<Cost> {
        self.best.lock().as_ref().map(|b| b.cost)
    }

    /// Whether the stored solution is known to be optimal.
    ///
    /// Once set, searches sharing this tracker stop issuing new runs.
    pub fn did_find_best(&self) -> bool {
        self.found_best.load(Ordering::Acquire)
    }

    /// Marks the stored solution as known optimal.
    pub fn set_found_best(&self) {
        self.found_best.store(true, Ordering::Release);
    }

    /// Requests cooperative cancellation of every search sharing this
    /// tracker.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// Clears a previous [`stop`](Self::stop) request.
    pub fn start(&self) {
        self.stopped.store(false, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Whether searches should stop issuing new work: either a stop was
    /// requested or an optimal solution was found.
    pub fn should_halt(&self) -> bool {
        self.is_stopped() || self.did_find_best()
    }

    /// Time since the last improving update, or `None` if empty.
    pub fn elapsed_since_improvement(&self) -> Option<Duration> {
        self.best.lock().as_ref().map(|b| b.improved_at.elapsed())
    }

    fn publish(&self, cost: Cost) {
        self.cost_int.store(cost.as_i64(), Ordering::Release);
        self.cost_bits.store(cost.as_f64().to_bits(), Ordering::Release);
        self.int_valued.store(cost.is_integer(), Ordering::Release);
    }
}

impl<T: Clone> ProgressTracker<T> {
    /// Offers a solution to the tracker.
    ///
    /// If `cost` is strictly better than the stored cost, or the tracker is
    /// empty, a copy of `candidate` replaces the stored solution and the
    /// found-best flag is set to `known_optimal`. Returns the best cost
    /// after the call, which differs from `cost` when another search
    /// already holds something better.
    pub fn update(&self, cost: impl Into<Cost>, candidate: &T, known_optimal: bool) -> Cost {
        let cost = cost.into();
        let mut guard = self.best.lock();
        if let Some(best) = guard.as_ref() {
            if !cost.is_better_than(&best.cost) {
                return best.cost;
            }
            if best.known_optimal {
                tracing::warn!(
                    previous = %best.cost,
                    improved = %cost,
                    "improving update after a solution was reported optimal"
                );
            }
        }
        *guard = Some(Best {
            solution: candidate.clone(),
            cost,
            known_optimal,
            improved_at: Instant::now(),
        });
        self.publish(cost);
        self.found_best.store(known_optimal, Ordering::Release);
        cost
    }

    /// [`update`](Self::update) from an existing pair.
    pub fn update_pair(&self, pair: &SolutionCostPair<T>) -> Cost {
        self.update(pair.cost(), pair.solution(), pair.is_known_optimal())
    }

    /// Copy of the best solution, or `None` if empty.
    pub fn solution(&self) -> Option<T> {
        self.best.lock().as_ref().map(|b| b.solution.clone())
    }

    /// Best solution and its cost as one consistent snapshot.
    pub fn solution_cost_pair(&self) -> Option<SolutionCostPair<T>> {
        self.best
            .lock()
            .as_ref()
            .map(|b| SolutionCostPair::new(b.solution.clone(), b.cost, b.known_optimal))
    }
}

impl<T> Default for ProgressTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ProgressTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("cost", &self.cost_double())
            .field("found_best", &self.did_find_best())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}
