//! Stochastic hill climbing.
//!
//! The zero-temperature limit of simulated annealing: only non-worsening
//! mutations are kept. Implements the same capability traits as
//! [`SimulatedAnnealing`](crate::sa::SimulatedAnnealing), so it can be
//! restarted sequentially or in parallel by the coordinators in
//! [`restarts`](crate::restarts).

mod runner;

pub use runner::StochasticHillClimber;
