//! Lam adaptive annealing.
//!
//! Instead of following a predetermined temperature curve, the Lam
//! schedules steer the temperature so that the observed acceptance rate
//! follows a target trajectory over the run:
//!
//! ```text
//!            | 0.44 + 0.56 * 560^(-p / 0.15)       p <= 0.15
//! target(p) =| 0.44                               0.15 < p <= 0.65
//!            | 0.44 * 440^(-(p - 0.65) / 0.35)     p > 0.65
//! ```
//!
//! where `p` is the fraction of the run completed. The observed rate is an
//! exponential moving average over recent accept/reject outcomes (weight
//! [`RATE_DECAY`], roughly a 500-evaluation window). After each evaluation
//! the temperature is lowered when the observed rate is above target and
//! raised otherwise.
//!
//! # References
//!
//! - Lam & Delosme (1988), "An Efficient Simulated Annealing Schedule"
//! - Swartz (1993), "A New Adaptive Cooling Schedule" (modified Lam)
//! - Cicirello (2021), "Self-Tuning Lam Annealing: Learning Hyperparameters
//!   While Problem Solving"

use super::schedule::{is_admissible, metropolis, AnnealingSchedule};
use crate::random::SplittableRng;

/// Weight of the previous estimate in the acceptance-rate average.
pub const RATE_DECAY: f64 = 0.998;

/// Multiplicative temperature step of the modified Lam schedule.
pub const LAM_STEP: f64 = 0.999;

const PHASE1_END: f64 = 0.15;
const PHASE2_END: f64 = 0.65;
const PLATEAU: f64 = 0.44;

/// Target acceptance rate after completing fraction `progress` of a run.
pub fn lam_target_rate(progress: f64) -> f64 {
    if progress <= PHASE1_END {
        PLATEAU + (1.0 - PLATEAU) * 560f64.powf(-progress / PHASE1_END)
    } else if progress <= PHASE2_END {
        PLATEAU
    } else {
        PLATEAU * 440f64.powf(-(progress - PHASE2_END) / (1.0 - PHASE2_END))
    }
}

/// Lowest temperature the Lam controllers cool to. Stays a normal float
/// so dividing by the step factor always raises it again.
pub const LAM_MIN_TEMPERATURE: f64 = f64::MIN_POSITIVE;

/// One controller step: cool by `step` when above target, heat otherwise.
fn adjust_temperature(t: f64, step: f64, above_target: bool) -> f64 {
    if above_target {
        (t * step).max(LAM_MIN_TEMPERATURE)
    } else {
        (t / step).min(f64::MAX)
    }
}

/// Controller state shared by both Lam variants.
#[derive(Debug, Clone)]
struct LamController {
    max_evals: usize,
    evals: usize,
    accept_rate: f64,
    target_rate: f64,
}

impl LamController {
    fn new() -> Self {
        Self {
            max_evals: 0,
            evals: 0,
            accept_rate: 0.5,
            target_rate: 1.0,
        }
    }

    fn init(&mut self, max_evals: usize) {
        *self = Self {
            max_evals,
            ..Self::new()
        };
    }

    /// Records one outcome and returns whether the observed rate is above
    /// target.
    fn observe(&mut self, accepted: bool) -> bool {
        let hit = if accepted { 1.0 - RATE_DECAY } else { 0.0 };
        self.accept_rate = RATE_DECAY * self.accept_rate + hit;
        self.evals += 1;
        self.target_rate = lam_target_rate(self.evals as f64 / self.max_evals.max(1) as f64);
        self.accept_rate > self.target_rate
    }
}

/// Modified Lam schedule with fixed initial temperature 0.5 and step
/// factor [`LAM_STEP`].
#[derive(Debug, Clone)]
pub struct ModifiedLam {
    lam: LamController,
    t: f64,
}

impl ModifiedLam {
    pub fn new() -> Self {
        Self {
            lam: LamController::new(),
            t: 0.5,
        }
    }

    /// Current estimate of the acceptance rate.
    pub fn acceptance_rate(&self) -> f64 {
        self.lam.accept_rate
    }

    /// Acceptance rate the schedule is currently steering toward.
    pub fn target_rate(&self) -> f64 {
        self.lam.target_rate
    }
}

impl Default for ModifiedLam {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for ModifiedLam {
    fn init(&mut self, max_evals: usize) {
        self.lam.init(max_evals);
        self.t = 0.5;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        self.t = adjust_temperature(self.t, LAM_STEP, self.lam.observe(accepted));
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}

/// Lam schedule that learns its initial temperature and step factor.
///
/// A prefix of each run (1% of its length, at least [`MIN_SAMPLES`]
/// evaluations) is accepted unconditionally while the average worsening
/// delta `d` is measured. The initial temperature is then set so `d` is
/// accepted at the current target rate, and the step factor so the
/// controller can move from the plateau temperature (`d` accepted at 0.44)
/// to the final temperature (`d` accepted at 0.001) within the last
/// phase of the run. Outside the sampling prefix it behaves exactly like
/// [`ModifiedLam`] with the learned parameters.
#[derive(Debug, Clone)]
pub struct SelfTuningLam {
    lam: LamController,
    sample_size: usize,
    sum_worse: f64,
    count_worse: usize,
    step: f64,
    t: f64,
}

/// Minimum length of the sampling prefix.
pub const MIN_SAMPLES: usize = 10;

/// Bounds on the learned step factor.
const STEP_RANGE: (f64, f64) = (0.9, 0.99999);

impl SelfTuningLam {
    pub fn new() -> Self {
        Self {
            lam: LamController::new(),
            sample_size: 0,
            sum_worse: 0.0,
            count_worse: 0,
            step: LAM_STEP,
            t: 0.5,
        }
    }

    pub fn acceptance_rate(&self) -> f64 {
        self.lam.accept_rate
    }

    pub fn target_rate(&self) -> f64 {
        self.lam.target_rate
    }

    /// Multiplicative step learned for the current run.
    pub fn step_factor(&self) -> f64 {
        self.step
    }

    fn tune(&mut self) {
        if self.count_worse == 0 {
            self.t = 0.5;
            self.step = LAM_STEP;
        } else {
            let d = self.sum_worse / self.count_worse as f64;
            let target = self.lam.target_rate.min(0.999);
            self.t = -d / target.ln();
            let t_plateau = -d / PLATEAU.ln();
            let t_final = -d / lam_target_rate(1.0).ln();
            let phase3 = (self.lam.max_evals as f64 * (1.0 - PHASE2_END)).max(1.0);
            self.step = (t_final / t_plateau)
                .powf(1.0 / phase3)
                .clamp(STEP_RANGE.0, STEP_RANGE.1);
        }
        tracing::trace!(t0 = self.t, step = self.step, "tuned Lam schedule");
    }
}

impl Default for SelfTuningLam {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnealingSchedule for SelfTuningLam {
    fn init(&mut self, max_evals: usize) {
        self.lam.init(max_evals);
        self.sample_size = (max_evals / 100).max(MIN_SAMPLES).min(max_evals);
        self.sum_worse = 0.0;
        self.count_worse = 0;
        self.step = LAM_STEP;
        self.t = 0.5;
    }

    fn accept(&mut self, neighbor_cost: f64, current_cost: f64, rng: &mut SplittableRng) -> bool {
        if self.lam.evals < self.sample_size {
            let delta = neighbor_cost - current_cost;
            if delta > 0.0 && delta.is_finite() {
                self.sum_worse += delta;
                self.count_worse += 1;
            }
            let accepted = is_admissible(neighbor_cost);
            self.lam.observe(accepted);
            if self.lam.evals == self.sample_size {
                self.tune();
            }
            return accepted;
        }
        let accepted = metropolis(neighbor_cost, current_cost, self.t, rng);
        self.t = adjust_temperature(self.t, self.step, self.lam.observe(accepted));
        accepted
    }

    fn temperature(&self) -> f64 {
        self.t
    }

    fn split(&self) -> Self {
        self.clone()
    }
}
