//! Cooling schedules that calibrate themselves from the run.
//!
//! The first [`SAMPLE_SIZE`] evaluations of each run are accepted
//! unconditionally while the schedule records how much worsening moves
//! cost. The initial temperature is then set so a worsening move of the
//! average observed size is accepted with probability
//! [`INITIAL_ACCEPTANCE`], and the cooling rate is derived so the
//! temperature lands on [`MIN_TEMPERATURE`] at the last evaluation.

use super::schedule::{is_admissible, metropolis, AnnealingSchedule, MIN_TEMPERATURE};
use crate::random::SplittableRng;

/// Evaluations used to estimate the initial temperature.
pub const SAMPLE_SIZE: usize = 10;

/// Target acceptance probability of an average worsening move at the
/// start of cooling.
pub const INITIAL_ACCEPTANCE: f64 = 0.95;

/// Sampling state shared by the parameter-free schedules.
#[derive(Debug, Clone, Default)]
struct Sampler {
    max_evals: usize,
    sample_size: usize,
    evals: usize,
    sum_worse: f64,
    count_worse: usize,
    sum_abs: f64,
}

impl Sampler {
    fn init(&mut self, max_evals: usize) {
        *self = Self {
            max_evals,
            sample_size: SAMPLE_SIZE.min(max_evals),
            ..Self::default()
        };
    }

    fn sampling(&self) -> bool {
        self.evals < self.sample_size
    }

    fn record(&mut self, neighbor_cost: f64, current_cost: f64) {
        let delta = neighbor_cost - current_cost;
        if delta.is_finite() {
            if delta > 0.0 {
                self.sum_worse += delta;
                self.count_worse += 1;
            }
            self.sum_abs += delta.abs();
        }
    }

    /// Typical size of a worsening move.
    fn mean_worsening(&self) -> f64 {
        if self.count_worse > 0 {
            self.sum_worse / self.count_worse as f64
        } else if self.sum_abs > 0.0 {
            self.sum_abs / self.sample_size.max(1) as f64
        } else {
            1.0
        }
    }

    /// Initial temperature and number of cooling steps left.
    fn calibrate(&self) -> (f64, usize) {
        let t0 = -self.mean_worsening() / INITIAL_ACCEPTANCE.ln();
        (t0, self.max_evals.saturating_sub(self.evals))
    }

    fn finished(&self) -> bool {
        self.evals >= self.max_evals
    }
}

/// Exponential cooling with self-calibrated `T0` and `alpha`.
#[derive(Debug, Clone)]
pub struct ParameterFreeExponentialCooling {
    sampler: Sampler,
    alpha: f64,
    t: f64,
}

impl ParameterFreeExponentialCooling {
    pub fn new() -> Self {
        Self {
            sampler: Sampler::default(),
            alpha: 1.0,
            t: f64::INFINITY,
        }
    }

    /// Cooling factor chosen by the last calibration.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for ParameterFreeExponentialCooling {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for ParameterFreeExponentialCooling {
    fn init(&mut self, max_evals: usize) {
        self.sampler.init(max_evals);
        self.alpha = 1.0;
        self.t = if max_evals == 0 {
            MIN_TEMPERATURE
        } else {
            f64::INFINITY
        };
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        if self.sampler.sampling() {
            self.sampler.record(neighbor_cost, current_cost);
            self.sampler.evals += 1;
            if !self.sampler.sampling() {
                let (t0, remaining) = self.sampler.calibrate();
                if remaining == 0 || t0 <= MIN_TEMPERATURE {
                    self.t = MIN_TEMPERATURE;
                } else {
                    self.t = t0;
                    self.alpha = (MIN_TEMPERATURE / t0).powf(1.0 / remaining as f64);
                }
                tracing::trace!(t0 = self.t, alpha = self.alpha, "calibrated exponential cooling");
            }
            return is_admissible(neighbor_cost);
        }
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        self.sampler.evals += 1;
        self.t = if self.sampler.finished() {
            MIN_TEMPERATURE
        } else {
            (self.t * self.alpha).max(MIN_TEMPERATURE)
        };
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}

/// Linear cooling with self-calibrated `T0` and `delta_t`.
#[derive(Debug, Clone)]
pub struct ParameterFreeLinearCooling {
    sampler: Sampler,
    delta_t: f64,
    t: f64,
}

impl ParameterFreeLinearCooling {
    pub fn new() -> Self {
        Self {
            sampler: Sampler::default(),
            delta_t: 0.0,
            t: f64::INFINITY,
        }
    }

    /// Decrement chosen by the last calibration.
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }
}

impl Default for ParameterFreeLinearCooling {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for ParameterFreeLinearCooling {
    fn init(&mut self, max_evals: usize) {
        self.sampler.init(max_evals);
        self.delta_t = 0.0;
        self.t = if max_evals == 0 {
            MIN_TEMPERATURE
        } else {
            f64::INFINITY
        };
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        if self.sampler.sampling() {
            self.sampler.record(neighbor_cost, current_cost);
            self.sampler.evals += 1;
            if !self.sampler.sampling() {
                let (t0, remaining) = self.sampler.calibrate();
                if remaining == 0 || t0 <= MIN_TEMPERATURE {
                    self.t = MIN_TEMPERATURE;
                } else {
                    self.t = t0;
                    self.delta_t = (t0 - MIN_TEMPERATURE) / remaining as f64;
                }
                tracing::trace!(t0 = self.t, delta_t = self.delta_t, "calibrated linear cooling");
            }
            return is_admissible(neighbor_cost);
        }
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        self.sampler.evals += 1;
        self.t = if self.sampler.finished() {
            MIN_TEMPERATURE
        } else {
            (self.t - self.delta_t).max(MIN_TEMPERATURE)
        };
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}
