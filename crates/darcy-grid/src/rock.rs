//! Rock property bundle: porosity, permeability, compressibility.

use crate::error::ModelError;
use crate::grid::CellGrid;
use crate::shape::GridShape;

/// Anisotropic absolute permeability, md, one grid per axis.
#[derive(Clone, Debug, PartialEq)]
pub struct RockPermeability {
    /// Permeability along x.
    pub x: CellGrid,
    /// Permeability along y.
    pub y: CellGrid,
    /// Permeability along z.
    pub z: CellGrid,
}

impl RockPermeability {
    /// Isotropic permeability: the same grid on all three axes.
    pub fn isotropic(grid: CellGrid) -> Self {
        Self {
            x: grid.clone(),
            y: grid.clone(),
            z: grid,
        }
    }
}

/// Static rock properties for the whole grid.
#[derive(Clone, Debug, PartialEq)]
pub struct RockProperties {
    /// Porosity, fraction of bulk volume.
    pub porosity: CellGrid,
    /// Absolute permeability, md.
    pub absolute_permeability: RockPermeability,
    /// Rock (pore-volume) compressibility, 1/psi.
    pub compressibility: CellGrid,
    /// Net-to-gross ratio, fraction.
    pub net_to_gross: CellGrid,
}

impl RockProperties {
    /// Validate physical ranges against a shape.
    ///
    /// Cells with zero porosity are inactive and allowed; negative
    /// porosity or permeability is rejected outright.
    pub fn validate(&self, shape: GridShape) -> Result<(), ModelError> {
        for (name, grid) in [
            ("porosity", &self.porosity),
            ("permeability x", &self.absolute_permeability.x),
            ("permeability y", &self.absolute_permeability.y),
            ("permeability z", &self.absolute_permeability.z),
            ("rock compressibility", &self.compressibility),
            ("net-to-gross", &self.net_to_gross),
        ] {
            if grid.as_slice().len() != shape.cell_count() {
                return Err(ModelError::ShapeMismatch {
                    field: name.to_string(),
                    got: grid.as_slice().len(),
                    expected: shape.cell_count(),
                });
            }
        }
        self.porosity
            .validate("porosity", |v| v.is_finite() && (0.0..=1.0).contains(&v))?;
        self.absolute_permeability
            .x
            .validate("permeability x", |v| v.is_finite() && v >= 0.0)?;
        self.absolute_permeability
            .y
            .validate("permeability y", |v| v.is_finite() && v >= 0.0)?;
        self.absolute_permeability
            .z
            .validate("permeability z", |v| v.is_finite() && v >= 0.0)?;
        self.compressibility
            .validate("rock compressibility", |v| v.is_finite() && v >= 0.0)?;
        self.net_to_gross
            .validate("net-to-gross", |v| v.is_finite() && (0.0..=1.0).contains(&v))?;
        Ok(())
    }
}
