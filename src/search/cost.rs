//! Cost values and solution/cost pairs.

use std::cmp::Ordering;

/// A cost, either integer- or real-valued. Lower is better.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cost {
    Int(i64),
    Double(f64),
}

impl Cost {
    /// Whether this cost came from an integer-valued problem.
    pub fn is_integer(self) -> bool {
        matches!(self, Cost::Int(_))
    }

    /// The cost as `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Cost::Int(c) => c as f64,
            Cost::Double(c) => c,
        }
    }

    /// The cost as `i64`, rounding real values toward zero and saturating
    /// at the integer bounds.
    pub fn as_i64(self) -> i64 {
        match self {
            Cost::Int(c) => c,
            Cost::Double(c) => c as i64,
        }
    }

    /// Total order over costs. Two integer costs compare exactly; anything
    /// else compares as `f64` using IEEE total ordering.
    pub fn total_cmp(&self, other: &Cost) -> Ordering {
        match (self, other) {
            (Cost::Int(a), Cost::Int(b)) => a.cmp(b),
            _ => self.as_f64().total_cmp(&other.as_f64()),
        }
    }

    /// Strict improvement test used by the progress tracker.
    pub fn is_better_than(&self, other: &Cost) -> bool {
        self.total_cmp(other) == Ordering::Less
    }
}

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl From<i64> for Cost {
    fn from(c: i64) -> Self {
        Cost::Int(c)
    }
}

impl From<f64> for Cost {
    fn from(c: f64) -> Self {
        Cost::Double(c)
    }
}

impl std::fmt::Display for Cost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cost::Int(c) => write!(f, "{c}"),
            Cost::Double(c) => write!(f, "{c}"),
        }
    }
}

/// Scalar types a problem may use for its cost.
///
/// Built-in implementations exist for `i64` and `f64`.
pub trait CostValue:
    Copy + PartialOrd + Send + Sync + std::fmt::Debug + Into<Cost> + 'static
{
    /// Default lower bound when a problem does not know a better one.
    fn lower_bound() -> Self;

    /// Converts the cost to `f64` for the annealing schedule.
    fn to_f64(self) -> f64;
}

impl CostValue for i64 {
    fn lower_bound() -> Self {
        i64::MIN
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl CostValue for f64 {
    fn lower_bound() -> Self {
        f64::NEG_INFINITY
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// A candidate solution together with its cost.
///
/// Immutable once constructed. Ordered by cost only.
#[derive(Debug, Clone)]
pub struct SolutionCostPair<T> {
    solution: T,
    cost: Cost,
    known_optimal: bool,
}

impl<T> SolutionCostPair<T> {
    pub fn new(solution: T, cost: impl Into<Cost>, known_optimal: bool) -> Self {
        Self {
            solution,
            cost: cost.into(),
            known_optimal,
        }
    }

    pub fn solution(&self) -> &T {
        &self.solution
    }

    pub fn into_solution(self) -> T {
        self.solution
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn cost_f64(&self) -> f64 {
        self.cost.as_f64()
    }

    /// Whether the cost equals the problem's known lower bound.
    pub fn is_known_optimal(&self) -> bool {
        self.known_optimal
    }
}

impl<T> PartialEq for SolutionCostPair<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl<T> Eq for SolutionCostPair<T> {}

impl<T> PartialOrd for SolutionCostPair<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for SolutionCostPair<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.total_cmp(&other.cost)
    }
}
