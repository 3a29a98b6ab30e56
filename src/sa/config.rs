//! Fixed-parameter cooling schedules.
//!
//! Each schedule changes the temperature every `steps` evaluations and
//! never cools below its minimum temperature (default
//! [`MIN_TEMPERATURE`]). Parameters are validated at construction.
//!
//! # References
//!
//! - Exponential: Kirkpatrick, Gelatt & Vecchi (1983)
//! - Linear: fixed-duration cooling
//! - Logarithmic: Geman & Geman (1984), with convergence proof

use super::schedule::{metropolis, AnnealingSchedule, MIN_TEMPERATURE};
use crate::error::ScheduleError;
use crate::random::SplittableRng;

fn validate_common(t0: f64, min_t: f64, steps: usize) -> Result<(), ScheduleError> {
    if !(t0 > 0.0) {
        return Err(ScheduleError::InitialTemperature(t0));
    }
    if !(min_t > 0.0) {
        return Err(ScheduleError::MinTemperature(min_t));
    }
    if min_t >= t0 {
        return Err(ScheduleError::MinAboveInitial {
            min: min_t,
            initial: t0,
        });
    }
    if steps == 0 {
        return Err(ScheduleError::ZeroSteps);
    }
    Ok(())
}

/// Counts evaluations and reports when a cooling step is due.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct StepCounter {
    steps: usize,
    since_change: usize,
}

impl StepCounter {
    fn new(steps: usize) -> Self {
        Self {
            steps,
            since_change: 0,
        }
    }

    fn tick(&mut self) -> bool {
        self.since_change += 1;
        if self.since_change == self.steps {
            self.since_change = 0;
            true
        } else {
            false
        }
    }
}

/// Exponential cooling: `T <- max(alpha * T, T_min)` every `steps`
/// evaluations.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{AnnealingSchedule, ExponentialCooling};
///
/// let mut schedule = ExponentialCooling::new(100.0, 0.95).unwrap();
/// schedule.init(1000);
/// assert_eq!(schedule.temperature(), 100.0);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExponentialCooling {
    t0: f64,
    alpha: f64,
    min_t: f64,
    counter: StepCounter,
    t: f64,
}

impl ExponentialCooling {
    /// Cools after every evaluation.
    pub fn new(t0: f64, alpha: f64) -> Result<Self, ScheduleError> {
        Self::with_steps(t0, alpha, 1)
    }

    pub fn with_steps(t0: f64, alpha: f64, steps: usize) -> Result<Self, ScheduleError> {
        validate_common(t0, MIN_TEMPERATURE.min(t0 / 2.0), steps)?;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ScheduleError::Alpha(alpha));
        }
        Ok(Self {
            t0,
            alpha,
            min_t: MIN_TEMPERATURE.min(t0 / 2.0),
            counter: StepCounter::new(steps),
            t: t0,
        })
    }

    /// Replaces the temperature floor.
    pub fn with_min_temperature(mut self, min_t: f64) -> Result<Self, ScheduleError> {
        validate_common(self.t0, min_t, self.counter.steps)?;
        self.min_t = min_t;
        Ok(self)
    }
}

impl AnnealingSchedule for ExponentialCooling {
    fn init(&mut self, _max_evals: usize) {
        self.t = self.t0;
        self.counter.since_change = 0;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        if self.counter.tick() {
            self.t = (self.t * self.alpha).max(self.min_t);
        }
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}

/// Linear cooling: `T <- max(T - delta_t, T_min)` every `steps`
/// evaluations.
///
/// The floor keeps the temperature strictly positive so the acceptance
/// probability stays defined.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearCooling {
    t0: f64,
    delta_t: f64,
    min_t: f64,
    counter: StepCounter,
    t: f64,
}

impl LinearCooling {
    pub fn new(t0: f64, delta_t: f64) -> Result<Self, ScheduleError> {
        Self::with_steps(t0, delta_t, 1)
    }

    pub fn with_steps(t0: f64, delta_t: f64, steps: usize) -> Result<Self, ScheduleError> {
        let min_t = MIN_TEMPERATURE.min(t0 / 2.0);
        validate_common(t0, min_t, steps)?;
        if !(delta_t > 0.0) {
            return Err(ScheduleError::DeltaT(delta_t));
        }
        Ok(Self {
            t0,
            delta_t,
            min_t,
            counter: StepCounter::new(steps),
            t: t0,
        })
    }

    pub fn with_min_temperature(mut self, min_t: f64) -> Result<Self, ScheduleError> {
        validate_common(self.t0, min_t, self.counter.steps)?;
        self.min_t = min_t;
        Ok(self)
    }
}

impl AnnealingSchedule for LinearCooling {
    fn init(&mut self, _max_evals: usize) {
        self.t = self.t0;
        self.counter.since_change = 0;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        if self.counter.tick() {
            self.t = (self.t - self.delta_t).max(self.min_t);
        }
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}

/// Logarithmic cooling: `T = max(c / ln(e + k), T_min)` after the `k`-th
/// cooling step.
///
/// Recomputed from `k` rather than decremented.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogarithmicCooling {
    c: f64,
    min_t: f64,
    counter: StepCounter,
    k: u64,
    t: f64,
}

impl LogarithmicCooling {
    pub fn new(c: f64) -> Result<Self, ScheduleError> {
        Self::with_steps(c, 1)
    }

    pub fn with_steps(c: f64, steps: usize) -> Result<Self, ScheduleError> {
        let min_t = MIN_TEMPERATURE.min(c / 2.0);
        validate_common(c, min_t, steps)?;
        Ok(Self {
            c,
            min_t,
            counter: StepCounter::new(steps),
            k: 0,
            t: c,
        })
    }

    pub fn with_min_temperature(mut self, min_t: f64) -> Result<Self, ScheduleError> {
        validate_common(self.c, min_t, self.counter.steps)?;
        self.min_t = min_t;
        Ok(self)
    }
}

impl AnnealingSchedule for LogarithmicCooling {
    fn init(&mut self, _max_evals: usize) {
        self.t = self.c;
        self.k = 0;
        self.counter.since_change = 0;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        if self.counter.tick() {
            self.k += 1;
            self.t = (self.c / (std::f64::consts::E + self.k as f64).ln()).max(self.min_t);
        }
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}
