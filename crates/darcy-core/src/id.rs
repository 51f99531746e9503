//! Strongly-typed identifiers and the [`CellCoord`] type alias.

use std::fmt;

/// Monotonically increasing step counter.
///
/// Incremented each time the simulation accepts a step. Rejected trial
/// steps never consume an ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(pub u64);

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StepId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A cell position in the structured grid, as `(i, j, k)` indices.
///
/// `i` runs along x, `j` along y, `k` along z (downward). All three are
/// zero-based; well perforation intervals use inclusive corner pairs of
/// this type.
pub type CellCoord = (usize, usize, usize);
