//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! # Schedules
//!
//! - Fixed parameters: [`ExponentialCooling`], [`LinearCooling`],
//!   [`LogarithmicCooling`]
//! - Self-calibrating: [`ParameterFreeExponentialCooling`],
//!   [`ParameterFreeLinearCooling`]
//! - Closed-loop: [`ModifiedLam`], [`SelfTuningLam`]
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Lam & Delosme (1988), "An Efficient Simulated Annealing Schedule"

mod config;
mod lam;
mod parameter_free;
mod runner;
mod schedule;

pub use config::{ExponentialCooling, LinearCooling, LogarithmicCooling};
pub use lam::{
    lam_target_rate, ModifiedLam, SelfTuningLam, LAM_MIN_TEMPERATURE, LAM_STEP, MIN_SAMPLES,
    RATE_DECAY,
};
pub use parameter_free::{
    ParameterFreeExponentialCooling, ParameterFreeLinearCooling, INITIAL_ACCEPTANCE, SAMPLE_SIZE,
};
pub use runner::{RunStats, SimulatedAnnealing};
pub use schedule::{metropolis, AnnealingSchedule, MIN_TEMPERATURE};
