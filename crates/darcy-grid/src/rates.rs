//! Per-phase volumetric rate grids.

use crate::grid::CellGrid;
use crate::shape::GridShape;
use darcy_core::Phase;

/// Per-phase volumetric rates, ft³/day at reservoir conditions, one grid
/// per phase.
///
/// The engine emits one `RateGrids` for injection and one for production
/// with every accepted step; values are zero except at perforated cells.
#[derive(Clone, Debug, PartialEq)]
pub struct RateGrids {
    /// Oil-phase rate.
    pub oil: CellGrid,
    /// Water-phase rate.
    pub water: CellGrid,
    /// Gas-phase rate.
    pub gas: CellGrid,
}

impl RateGrids {
    /// All-zero rates on the given shape.
    pub fn zeros(shape: GridShape) -> Self {
        Self {
            oil: CellGrid::uniform(shape, 0.0),
            water: CellGrid::uniform(shape, 0.0),
            gas: CellGrid::uniform(shape, 0.0),
        }
    }

    /// The grid for one phase.
    pub fn phase(&self, phase: Phase) -> &CellGrid {
        match phase {
            Phase::Oil => &self.oil,
            Phase::Water => &self.water,
            Phase::Gas => &self.gas,
        }
    }

    /// Mutable grid for one phase.
    pub fn phase_mut(&mut self, phase: Phase) -> &mut CellGrid {
        match phase {
            Phase::Oil => &mut self.oil,
            Phase::Water => &mut self.water,
            Phase::Gas => &mut self.gas,
        }
    }

    /// Sum of all three phase grids over all cells.
    pub fn total(&self) -> f64 {
        self.oil.sum() + self.water.sum() + self.gas.sum()
    }
}
