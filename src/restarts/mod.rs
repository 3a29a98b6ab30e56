//! Restart coordination.
//!
//! Wraps any search implementing the capability traits in
//! [`crate::search`] and runs it repeatedly:
//!
//! - [`Multistarter`]: sequential restarts with lengths from a
//!   [`RestartSchedule`]
//! - [`ParallelMultistarter`]: one multistarter per thread, sharing a
//!   single progress tracker
//! - [`TimedParallelMultistarter`]: parallel restarts bounded by wall-clock
//!   time rather than a restart count
//!
//! # Restart Schedules
//!
//! - [`ConstantRestartSchedule`]: the same length every time
//! - [`LubyRestarts`]: the Luby et al. universal sequence, scaled
//! - [`VariableAnnealingLength`]: lengths that double each restart

mod multistart;
mod parallel;
mod schedule;
mod timed;

pub use multistart::Multistarter;
pub use parallel::ParallelMultistarter;
pub use schedule::{
    luby, ConstantRestartSchedule, LubyRestarts, RestartSchedule, VariableAnnealingLength,
};
pub use timed::TimedParallelMultistarter;
