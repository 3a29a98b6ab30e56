//! Annealing schedule contract and the Metropolis criterion.

use crate::random::SplittableRng;
use rand::Rng;

/// Temperature floor used by schedules that cool toward a fixed minimum.
pub const MIN_TEMPERATURE: f64 = 0.001;

/// Controls acceptance and temperature over one annealing run.
///
/// A schedule is re-initialized at the start of every run with
/// [`init`](Self::init) and stepped once per evaluation by
/// [`accept`](Self::accept). Every parallel search holds its own split
/// instance, so no schedule state is ever shared between threads.
///
/// Every implementation accepts a candidate whose cost equals the current
/// cost and never accepts a candidate costing `+inf`.
pub trait AnnealingSchedule: Send {
    /// Resets the schedule for a run of `max_evals` evaluations.
    fn init(&mut self, max_evals: usize);

    /// Decides whether to move from `current_cost` to `neighbor_cost` and
    /// advances the schedule by one evaluation.
    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool;

    /// Current temperature.
    fn temperature(&self) -> f64;

    /// Copy carrying the full current state.
    fn split(&self) -> Self
    where
        Self: Sized;
}

/// Metropolis acceptance at temperature `t`.
///
/// Non-worsening moves are always accepted; worsening moves are accepted
/// with probability `exp(-(neighbor - current) / t)`. A uniform draw is
/// consumed only for worsening moves.
pub fn metropolis(neighbor_cost: f64, current_cost: f64, t: f64, rng: &mut SplittableRng) -> bool {
    if !is_admissible(neighbor_cost) {
        return false;
    }
    if neighbor_cost <= current_cost {
        return true;
    }
    rng.random::<f64>() < ((current_cost - neighbor_cost) / t).exp()
}

/// Rejects `+inf` and NaN costs.
pub(crate) fn is_admissible(cost: f64) -> bool {
    cost < f64::INFINITY
}
