//! Restart schedules: run lengths for successive restarts.
//!
//! # References
//!
//! - Luby, Sinclair & Zuckerman (1993), "Optimal Speedup of Las Vegas Algorithms"
//! - Cicirello (2007), variable annealing length restarts

use crate::error::{Result, SearchError};

/// Generates the run length of each successive restart.
///
/// Iterator-like: [`next_run_length`](Self::next_run_length) advances,
/// [`reset`](Self::reset) rewinds, and [`split`](Self::split) copies the
/// current position for another thread.
pub trait RestartSchedule: Send {
    fn next_run_length(&mut self) -> usize;

    fn reset(&mut self);

    fn split(&self) -> Self
    where
        Self: Sized;
}

/// Every restart has the same length.
///
/// # Examples
///
/// ```
/// use u_anneal::restarts::{ConstantRestartSchedule, RestartSchedule};
///
/// let mut r = ConstantRestartSchedule::new(8).unwrap();
/// assert_eq!(r.next_run_length(), 8);
/// assert_eq!(r.next_run_length(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstantRestartSchedule {
    run_length: usize,
}

impl ConstantRestartSchedule {
    pub fn new(run_length: usize) -> Result<Self> {
        if run_length == 0 {
            return Err(SearchError::InvalidRestartSchedule(
                "run length must be positive".into(),
            ));
        }
        Ok(Self { run_length })
    }

    pub fn run_length(&self) -> usize {
        self.run_length
    }
}

impl RestartSchedule for ConstantRestartSchedule {
    fn next_run_length(&mut self) -> usize {
        self.run_length
    }

    fn reset(&mut self) {}

    fn split(&self) -> Self {
        self.clone()
    }
}

/// The Luby sequence `1, 1, 2, 1, 1, 2, 4, 1, 1, 2, ...` times a scale.
///
/// Optimal (within a constant factor) among universal restart strategies
/// for Las Vegas algorithms with unknown run-time distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LubyRestarts {
    scale: usize,
    index: u64,
}

impl LubyRestarts {
    pub fn new(scale: usize) -> Result<Self> {
        if scale == 0 {
            return Err(SearchError::InvalidRestartSchedule(
                "Luby scale must be positive".into(),
            ));
        }
        Ok(Self { scale, index: 0 })
    }
}

impl Default for LubyRestarts {
    fn default() -> Self {
        Self { scale: 1, index: 0 }
    }
}

/// The `i`-th term (1-based) of the Luby sequence.
pub fn luby(mut i: u64) -> u64 {
    loop {
        let mut k = 1u32;
        while (1u64 << k) - 1 < i {
            k += 1;
        }
        if i == (1u64 << k) - 1 {
            return 1u64 << (k - 1);
        }
        i -= (1u64 << (k - 1)) - 1;
    }
}

impl RestartSchedule for LubyRestarts {
    fn next_run_length(&mut self) -> usize {
        self.index += 1;
        (luby(self.index) as usize).saturating_mul(self.scale)
    }

    fn reset(&mut self) {
        self.index = 0;
    }

    fn split(&self) -> Self {
        self.clone()
    }
}

/// Run lengths that double each restart, starting from an initial length.
///
/// Early restarts are short and cheap; later ones give the annealing
/// schedule enough time to cool slowly. An optional cap bounds growth.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableAnnealingLength {
    initial: usize,
    cap: usize,
    next: usize,
}

impl VariableAnnealingLength {
    pub fn new(initial: usize) -> Result<Self> {
        if initial == 0 {
            return Err(SearchError::InvalidRestartSchedule(
                "initial run length must be positive".into(),
            ));
        }
        Ok(Self {
            initial,
            cap: usize::MAX,
            next: initial,
        })
    }

    /// Caps run lengths at `cap`.
    pub fn with_cap(mut self, cap: usize) -> Result<Self> {
        if cap < self.initial {
            return Err(SearchError::InvalidRestartSchedule(format!(
                "cap {cap} is below the initial run length {}",
                self.initial
            )));
        }
        self.cap = cap;
        Ok(self)
    }
}

impl RestartSchedule for VariableAnnealingLength {
    fn next_run_length(&mut self) -> usize {
        let length = self.next;
        self.next = self.next.saturating_mul(2).min(self.cap);
        length
    }

    fn reset(&mut self) {
        self.next = self.initial;
    }

    fn split(&self) -> Self {
        self.clone()
    }
}
