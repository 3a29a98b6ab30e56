//! Wall-clock bounded parallel multistart.

use super::multistart::Multistarter;
use super::parallel::ParallelMultistarter;
use super::schedule::{ConstantRestartSchedule, RestartSchedule};
use crate::error::{Result, SearchError};
use crate::search::{
    ProgressTracker, ResumesFromBest, RunsFixedLength, SolutionCostPair, Splittable,
    TracksProgress,
};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stand-in deadline for durations too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// A [`ParallelMultistarter`] that restarts on every thread until a time
/// limit passes instead of for a fixed number of restarts.
///
/// Threads check the deadline between restarts. When it passes, a watcher
/// stops the shared tracker so runs in progress end at their next
/// evaluation boundary; candidates are never abandoned mid-mutation. If the
/// watcher was the one to stop the tracker, it is restarted before
/// returning so the same tracker can be reused.
pub struct TimedParallelMultistarter<M, R = ConstantRestartSchedule> {
    inner: ParallelMultistarter<M, R>,
}

impl<M: Splittable> TimedParallelMultistarter<M, ConstantRestartSchedule> {
    pub fn new<T>(search: M, run_length: usize, num_threads: usize) -> Result<Self>
    where
        M: TracksProgress<T>,
    {
        Ok(Self {
            inner: ParallelMultistarter::new(search, run_length, num_threads)?,
        })
    }
}

impl<M, R: RestartSchedule> TimedParallelMultistarter<M, R> {
    pub fn from_parallel(inner: ParallelMultistarter<M, R>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &ParallelMultistarter<M, R> {
        &self.inner
    }

    pub fn num_threads(&self) -> usize {
        self.inner.num_threads()
    }

    pub fn total_run_length(&self) -> u64 {
        self.inner.total_run_length()
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    /// Restarts from fresh candidates on every thread for `limit`.
    pub fn optimize<T>(&mut self, limit: Duration) -> Result<Option<SolutionCostPair<T>>>
    where
        T: Send,
        M: RunsFixedLength<T>,
    {
        self.run_for(limit, |search, deadline| search.optimize_until(deadline))
    }

    /// Restarts from the tracker's best on every thread for `limit`.
    pub fn reoptimize<T>(&mut self, limit: Duration) -> Result<Option<SolutionCostPair<T>>>
    where
        T: Send,
        M: ResumesFromBest<T>,
    {
        self.run_for(limit, |search, deadline| search.reoptimize_until(deadline))
    }

    fn run_for<T, F>(&mut self, limit: Duration, job: F) -> Result<Option<SolutionCostPair<T>>>
    where
        T: Send,
        M: RunsFixedLength<T>,
        F: Fn(&mut Multistarter<M, R>, Instant) -> Option<SolutionCostPair<T>> + Sync,
    {
        if self.inner.is_closed() {
            return Err(SearchError::Closed);
        }
        let now = Instant::now();
        let deadline = now
            .checked_add(limit)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let tracker = Arc::clone(self.inner.progress_tracker::<T>());
        let finished = (Mutex::new(false), Condvar::new());
        tracing::debug!(?limit, "timed multistart started");

        let inner = &mut self.inner;
        std::thread::scope(|scope| {
            let watcher = scope.spawn(|| watch(&tracker, &finished, deadline));
            let result = inner.run_all(|search| job(search, deadline));
            {
                let (lock, cvar) = &finished;
                *lock.lock() = true;
                cvar.notify_all();
            }
            if watcher.join().unwrap_or(false) {
                tracker.start();
            }
            result
        })
    }
}

/// Waits for `deadline` or for the searches to finish, whichever comes
/// first. Returns whether it stopped the tracker.
fn watch<T>(
    tracker: &ProgressTracker<T>,
    finished: &(Mutex<bool>, Condvar),
    deadline: Instant,
) -> bool {
    let (lock, cvar) = finished;
    let mut done = lock.lock();
    while !*done {
        if cvar.wait_until(&mut done, deadline).timed_out() {
            break;
        }
    }
    if *done || tracker.is_stopped() {
        return false;
    }
    tracing::debug!("time limit reached, stopping searches");
    tracker.stop();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hill_climbing::StochasticHillClimber;
    use crate::restarts::LubyRestarts;
    use crate::sa::{ExponentialCooling, SimulatedAnnealing};
    use crate::search::testing::{
        BitFlip, CountingSearch, Nudge, OneMax, RandomBits, RandomPoint, Sphere,
    };

    #[test]
    fn test_stops_at_optimum_before_limit() {
        let sa = SimulatedAnnealing::new(
            Arc::new(OneMax),
            BitFlip::default(),
            RandomBits { n: 24 },
            ExponentialCooling::new(2.0, 0.999).unwrap(),
        )
        .with_seed(3);
        let mut timed = TimedParallelMultistarter::new(sa, 3_000, 2).unwrap();
        let started = Instant::now();
        let best = timed
            .optimize::<Vec<bool>>(Duration::from_secs(30))
            .unwrap()
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(30));
        assert!(best.is_known_optimal());
        assert!(!timed.inner().progress_tracker::<Vec<bool>>().is_stopped());
    }

    #[test]
    fn test_unbounded_problem_runs_until_limit() {
        let hc = StochasticHillClimber::new(Arc::new(Sphere), Nudge, RandomPoint).with_seed(4);
        let mut timed = TimedParallelMultistarter::new(hc, 100, 2).unwrap();
        let limit = Duration::from_millis(100);
        let started = Instant::now();
        let best = timed.optimize::<f64>(limit).unwrap().unwrap();
        assert!(started.elapsed() >= limit);
        assert!(best.cost_f64() < 1.0);
        assert!(timed.total_run_length() > 0);
        // Watcher-initiated stops are cleared for reuse.
        assert!(!timed.inner().progress_tracker::<f64>().is_stopped());
    }

    #[test]
    fn test_from_parallel_keeps_schedules() {
        let parallel = ParallelMultistarter::with_schedules::<u64>(
            CountingSearch::new(5),
            vec![LubyRestarts::default(); 2],
        )
        .unwrap();
        let mut timed = TimedParallelMultistarter::from_parallel(parallel);
        assert_eq!(timed.num_threads(), 2);
        let best = timed
            .optimize::<u64>(Duration::from_millis(30))
            .unwrap()
            .unwrap();
        assert_eq!(*best.solution(), 5);
        assert!(timed.total_run_length() > 0);
        for search in timed.inner().searches() {
            assert_ne!(*search.restart_schedule(), LubyRestarts::default());
        }
        assert!(!timed.inner().progress_tracker::<u64>().is_stopped());
    }

    #[test]
    fn test_zero_limit_does_no_work() {
        let mut timed = TimedParallelMultistarter::new(CountingSearch::new(5), 10, 2).unwrap();
        let best = timed.reoptimize::<u64>(Duration::ZERO).unwrap();
        assert!(best.is_none());
        assert_eq!(timed.total_run_length(), 0);
    }

    #[test]
    fn test_external_stop_is_preserved() {
        let mut timed = TimedParallelMultistarter::new(CountingSearch::new(5), 10, 1).unwrap();
        let tracker = Arc::clone(timed.inner().progress_tracker::<u64>());
        tracker.stop();
        let best = timed.optimize::<u64>(Duration::from_millis(20)).unwrap();
        assert!(best.is_none());
        assert!(tracker.is_stopped());
    }

    #[test]
    fn test_closed_fails_fast() {
        let mut timed = TimedParallelMultistarter::new(CountingSearch::new(5), 10, 2).unwrap();
        timed.close();
        let err = timed.optimize::<u64>(Duration::from_secs(1)).err();
        assert_eq!(err, Some(SearchError::Closed));
    }
}
