//! Sequential restarts of a single search.

use super::schedule::{ConstantRestartSchedule, RestartSchedule};
use crate::error::Result;
use crate::search::{
    ProgressTracker, ResumesFromBest, RunsFixedLength, SolutionCostPair, Splittable,
    TracksProgress,
};
use std::sync::Arc;
use std::time::Instant;

/// Keeps the first of two equally good results.
pub(crate) fn keep_better<T>(
    best: Option<SolutionCostPair<T>>,
    candidate: Option<SolutionCostPair<T>>,
) -> Option<SolutionCostPair<T>> {
    match (best, candidate) {
        (Some(b), Some(c)) => Some(if c < b { c } else { b }),
        (b, c) => b.or(c),
    }
}

/// Restarts a wrapped search repeatedly with run lengths drawn from a
/// [`RestartSchedule`].
///
/// Stops early when the shared tracker is stopped or holds a proven
/// optimum. The returned result is the best end-of-run candidate this
/// multistarter produced itself; siblings sharing the tracker may have
/// found something better.
pub struct Multistarter<M, R = ConstantRestartSchedule> {
    search: M,
    schedule: R,
    total_run_length: u64,
}

impl<M> Multistarter<M, ConstantRestartSchedule> {
    /// Restarts with a constant run length.
    pub fn new(search: M, run_length: usize) -> Result<Self> {
        Ok(Self::with_schedule(
            search,
            ConstantRestartSchedule::new(run_length)?,
        ))
    }
}

impl<M, R: RestartSchedule> Multistarter<M, R> {
    pub fn with_schedule(search: M, schedule: R) -> Self {
        Self {
            search,
            schedule,
            total_run_length: 0,
        }
    }

    /// The wrapped search.
    pub fn search(&self) -> &M {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut M {
        &mut self.search
    }

    /// Evaluations performed through this multistarter, including runs cut
    /// short by a stop request.
    pub fn total_run_length(&self) -> u64 {
        self.total_run_length
    }

    pub fn restart_schedule(&self) -> &R {
        &self.schedule
    }

    pub fn restart_schedule_mut(&mut self) -> &mut R {
        &mut self.schedule
    }

    /// Executes up to `num_restarts` runs, each starting from a fresh
    /// random candidate.
    pub fn optimize<T>(&mut self, num_restarts: usize) -> Option<SolutionCostPair<T>>
    where
        M: RunsFixedLength<T>,
    {
        self.restart_loop(num_restarts, |search, length| search.optimize(length))
    }

    /// Executes up to `num_restarts` runs, each resuming from the
    /// tracker's best solution.
    pub fn reoptimize<T>(&mut self, num_restarts: usize) -> Option<SolutionCostPair<T>>
    where
        M: ResumesFromBest<T>,
    {
        self.restart_loop(num_restarts, |search, length| search.reoptimize(length))
    }

    /// Restarts with fresh candidates until `deadline` passes.
    ///
    /// The deadline is checked between restarts only; a run in progress
    /// always finishes.
    pub fn optimize_until<T>(&mut self, deadline: Instant) -> Option<SolutionCostPair<T>>
    where
        M: RunsFixedLength<T>,
    {
        self.timed_loop(deadline, |search, length| search.optimize(length))
    }

    /// Restarts from the tracker's best until `deadline` passes.
    pub fn reoptimize_until<T>(&mut self, deadline: Instant) -> Option<SolutionCostPair<T>>
    where
        M: ResumesFromBest<T>,
    {
        self.timed_loop(deadline, |search, length| search.reoptimize(length))
    }

    fn restart_loop<T, F>(&mut self, num_restarts: usize, mut run: F) -> Option<SolutionCostPair<T>>
    where
        M: RunsFixedLength<T>,
        F: FnMut(&mut M, usize) -> Option<SolutionCostPair<T>>,
    {
        let tracker = Arc::clone(self.search.progress_tracker());
        let mut best = None;
        for restart in 0..num_restarts {
            if tracker.should_halt() {
                tracing::debug!(restart, "multistart halted by tracker");
                break;
            }
            best = keep_better(best, self.run_once(&mut run));
        }
        best
    }

    fn timed_loop<T, F>(&mut self, deadline: Instant, mut run: F) -> Option<SolutionCostPair<T>>
    where
        M: RunsFixedLength<T>,
        F: FnMut(&mut M, usize) -> Option<SolutionCostPair<T>>,
    {
        let tracker = Arc::clone(self.search.progress_tracker());
        let mut best = None;
        while Instant::now() < deadline && !tracker.should_halt() {
            best = keep_better(best, self.run_once(&mut run));
        }
        best
    }

    fn run_once<T, F>(&mut self, run: &mut F) -> Option<SolutionCostPair<T>>
    where
        M: RunsFixedLength<T>,
        F: FnMut(&mut M, usize) -> Option<SolutionCostPair<T>>,
    {
        let before = self.search.total_run_length();
        let length = self.schedule.next_run_length();
        let result = run(&mut self.search, length);
        self.total_run_length += self.search.total_run_length() - before;
        result
    }
}

impl<T, M, R> TracksProgress<T> for Multistarter<M, R>
where
    M: TracksProgress<T>,
{
    type Problem = M::Problem;

    fn problem(&self) -> &Arc<M::Problem> {
        self.search.problem()
    }

    fn progress_tracker(&self) -> &Arc<ProgressTracker<T>> {
        self.search.progress_tracker()
    }

    fn set_progress_tracker(&mut self, tracker: Arc<ProgressTracker<T>>) {
        self.search.set_progress_tracker(tracker);
    }

    fn total_run_length(&self) -> u64 {
        self.total_run_length
    }
}

impl<M: Splittable, R: RestartSchedule> Splittable for Multistarter<M, R> {
    fn split(&mut self) -> Self {
        Self {
            search: self.search.split(),
            schedule: self.schedule.split(),
            total_run_length: 0,
        }
    }
}
