//! Concurrent multistart across a fixed-size thread pool.

use super::multistart::{keep_better, Multistarter};
use super::schedule::{ConstantRestartSchedule, RestartSchedule};
use crate::error::{Result, SearchError};
use crate::search::{
    ProgressTracker, ResumesFromBest, RunsFixedLength, SolutionCostPair, Splittable,
    TracksProgress,
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

type Outcome<T> = std::thread::Result<Option<SolutionCostPair<T>>>;

/// Runs one [`Multistarter`] per thread, all sharing one
/// [`ProgressTracker`], and returns the best result of any thread.
///
/// Every search is an independent split: only the tracker and the problem
/// are shared. When any thread proves optimality or the tracker is
/// stopped, the others finish their current run and return.
///
/// # Examples
///
/// ```ignore
/// let sa = SimulatedAnnealing::new(problem, mutation, init, SelfTuningLam::new());
/// let mut parallel = ParallelMultistarter::new(sa, 10_000, 4)?;
/// let best = parallel.optimize(25)?;
/// parallel.close();
/// ```
pub struct ParallelMultistarter<M, R = ConstantRestartSchedule> {
    searches: Vec<Multistarter<M, R>>,
    pool: Option<ThreadPool>,
}

impl<M: Splittable> ParallelMultistarter<M, ConstantRestartSchedule> {
    /// Splits `search` into `num_threads` copies, each restarted with a
    /// constant `run_length`.
    pub fn new<T>(search: M, run_length: usize, num_threads: usize) -> Result<Self>
    where
        M: TracksProgress<T>,
    {
        if num_threads == 0 {
            return Err(SearchError::ZeroThreads);
        }
        let schedule = ConstantRestartSchedule::new(run_length)?;
        Self::with_schedules(search, vec![schedule; num_threads])
    }
}

impl<M, R> ParallelMultistarter<M, R>
where
    M: Splittable,
    R: RestartSchedule,
{
    /// Splits `search` into one copy per restart schedule.
    pub fn with_schedules<T>(mut search: M, schedules: Vec<R>) -> Result<Self>
    where
        M: TracksProgress<T>,
    {
        if schedules.is_empty() {
            return Err(SearchError::ZeroThreads);
        }
        let mut copies: Vec<M> = (1..schedules.len()).map(|_| search.split()).collect();
        copies.insert(0, search);
        let searches = copies
            .into_iter()
            .zip(schedules)
            .map(|(s, r)| Multistarter::with_schedule(s, r))
            .collect();
        Self::from_multistarters(searches)
    }
}

impl<M, R: RestartSchedule> ParallelMultistarter<M, R> {
    /// Uses pre-built multistarters, one per thread.
    ///
    /// Fails unless every multistarter shares the same progress tracker
    /// and problem instance.
    pub fn from_multistarters<T>(searches: Vec<Multistarter<M, R>>) -> Result<Self>
    where
        M: TracksProgress<T>,
    {
        let first = searches.first().ok_or(SearchError::NoSearches)?;
        for other in &searches[1..] {
            if !Arc::ptr_eq(first.search().progress_tracker(), other.search().progress_tracker()) {
                return Err(SearchError::MismatchedTracker);
            }
            if !Arc::ptr_eq(first.search().problem(), other.search().problem()) {
                return Err(SearchError::MismatchedProblem);
            }
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(searches.len())
            .thread_name(|i| format!("multistart-{i}"))
            .build()
            .map_err(|e| SearchError::ThreadPool(e.to_string()))?;
        tracing::debug!(threads = searches.len(), "parallel multistarter ready");
        Ok(Self {
            searches,
            pool: Some(pool),
        })
    }

    pub fn num_threads(&self) -> usize {
        self.searches.len()
    }

    /// The per-thread multistarters.
    pub fn searches(&self) -> &[Multistarter<M, R>] {
        &self.searches
    }

    /// Sum of evaluations performed by every thread.
    pub fn total_run_length(&self) -> u64 {
        self.searches.iter().map(|s| s.total_run_length()).sum()
    }

    pub fn progress_tracker<T>(&self) -> &Arc<ProgressTracker<T>>
    where
        M: TracksProgress<T>,
    {
        self.searches[0].search().progress_tracker()
    }

    /// Shuts down the thread pool. Later optimize calls fail with
    /// [`SearchError::Closed`].
    pub fn close(&mut self) {
        if self.pool.take().is_some() {
            tracing::debug!("parallel multistarter closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_none()
    }

    /// Runs `restarts_per_thread` fresh-start restarts on every thread.
    pub fn optimize<T>(&mut self, restarts_per_thread: usize) -> Result<Option<SolutionCostPair<T>>>
    where
        T: Send,
        M: RunsFixedLength<T>,
    {
        self.run_all(|search| search.optimize(restarts_per_thread))
    }

    /// Runs `restarts_per_thread` restarts from the tracker's best on
    /// every thread.
    pub fn reoptimize<T>(
        &mut self,
        restarts_per_thread: usize,
    ) -> Result<Option<SolutionCostPair<T>>>
    where
        T: Send,
        M: ResumesFromBest<T>,
    {
        self.run_all(|search| search.reoptimize(restarts_per_thread))
    }

    /// Runs `job` once per thread and keeps the best result.
    ///
    /// Panics inside a job are caught; once every thread has finished, the
    /// first one (by thread index) is returned as
    /// [`SearchError::WorkerPanicked`].
    pub(crate) fn run_all<T, F>(&mut self, job: F) -> Result<Option<SolutionCostPair<T>>>
    where
        T: Send,
        M: Send,
        F: Fn(&mut Multistarter<M, R>) -> Option<SolutionCostPair<T>> + Sync,
    {
        let pool = self.pool.as_ref().ok_or(SearchError::Closed)?;
        let mut outcomes: Vec<Option<Outcome<T>>> = self.searches.iter().map(|_| None).collect();
        let job = &job;
        pool.scope(|scope| {
            for (search, slot) in self.searches.iter_mut().zip(outcomes.iter_mut()) {
                scope.spawn(move |_| {
                    *slot = Some(panic::catch_unwind(AssertUnwindSafe(|| job(search))));
                });
            }
        });

        let mut best = None;
        let mut failure = None;
        for (thread, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Some(Ok(result)) => best = keep_better(best, result),
                Some(Err(payload)) => {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(thread, %message, "search thread panicked");
                    failure.get_or_insert(SearchError::WorkerPanicked(message));
                }
                None => {
                    failure.get_or_insert(SearchError::WorkerPanicked(format!(
                        "thread {thread} did not report a result"
                    )));
                }
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(best),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
