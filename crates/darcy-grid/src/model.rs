//! The immutable reservoir model snapshot.

use crate::error::ModelError;
use crate::fluid::{FluidProperties, SaturationHistory};
use crate::grid::CellGrid;
use crate::rock::RockProperties;
use crate::shape::GridShape;

/// One immutable snapshot of the reservoir.
///
/// A run starts from one model; the engine derives a fresh model at the
/// end of every accepted step and never mutates a published one, so any
/// previously emitted snapshot stays valid while later steps compute.
/// Construction validates everything up front — invalid input is fatal,
/// never corrected.
#[derive(Clone, Debug, PartialEq)]
pub struct ReservoirModel {
    shape: GridShape,
    thickness: CellGrid,
    rock: RockProperties,
    fluid: FluidProperties,
    saturation_history: SaturationHistory,
}

impl ReservoirModel {
    /// Build and validate a model.
    ///
    /// # Errors
    ///
    /// [`ModelError`] when any grid disagrees with `shape`, any property
    /// is outside its physical range, thickness is non-positive in an
    /// active cell, or saturations fail the three-phase closure.
    pub fn new(
        shape: GridShape,
        thickness: CellGrid,
        rock: RockProperties,
        fluid: FluidProperties,
        saturation_history: SaturationHistory,
    ) -> Result<Self, ModelError> {
        if thickness.as_slice().len() != shape.cell_count() {
            return Err(ModelError::ShapeMismatch {
                field: "thickness".to_string(),
                got: thickness.as_slice().len(),
                expected: shape.cell_count(),
            });
        }
        thickness.validate("thickness", |v| v.is_finite() && v > 0.0)?;
        rock.validate(shape)?;
        fluid.validate(shape)?;
        Ok(Self {
            shape,
            thickness,
            rock,
            fluid,
            saturation_history,
        })
    }

    /// Derive the successor model for an accepted step: same geometry and
    /// rock, new fluid state, history folded forward.
    ///
    /// Re-checks only the saturation closure; geometry and rock were
    /// validated when the initial model was built and are carried by
    /// value unchanged.
    pub fn with_fluid(&self, fluid: FluidProperties) -> Result<Self, ModelError> {
        fluid.check_saturation_sum()?;
        let saturation_history = self
            .saturation_history
            .updated(&fluid.water_saturation, &fluid.gas_saturation);
        Ok(Self {
            shape: self.shape,
            thickness: self.thickness.clone(),
            rock: self.rock.clone(),
            fluid,
            saturation_history,
        })
    }

    /// The grid shape.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Cell thickness, ft.
    pub fn thickness(&self) -> &CellGrid {
        &self.thickness
    }

    /// Rock properties.
    pub fn rock(&self) -> &RockProperties {
        &self.rock
    }

    /// Fluid state.
    pub fn fluid(&self) -> &FluidProperties {
        &self.fluid
    }

    /// Drainage/imbibition history.
    pub fn saturation_history(&self) -> &SaturationHistory {
        &self.saturation_history
    }

    /// Pore volume of a cell, ft³: bulk volume × net-to-gross × porosity.
    pub fn pore_volume(&self, rank: usize) -> f64 {
        let bulk = self.shape.dx() * self.shape.dy() * self.thickness.at(rank);
        bulk * self.rock.net_to_gross.at(rank) * self.rock.porosity.at(rank)
    }

    /// Whether a cell participates in flow (non-zero porosity).
    pub fn is_active(&self, rank: usize) -> bool {
        self.rock.porosity.at(rank) > 0.0
    }

    /// Total compressibility of a cell, 1/psi: rock plus
    /// saturation-weighted fluid compressibilities.
    pub fn total_compressibility(&self, rank: usize) -> f64 {
        let f = &self.fluid;
        self.rock.compressibility.at(rank)
            + f.oil_saturation.at(rank) * f.oil_compressibility.at(rank)
            + f.water_saturation.at(rank) * f.water_compressibility.at(rank)
            + f.gas_saturation.at(rank) * f.gas_compressibility.at(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rock::RockPermeability;

    fn shape() -> GridShape {
        GridShape::new((2, 1, 1), (100.0, 100.0)).unwrap()
    }

    fn uniform_fluid(shape: GridShape) -> FluidProperties {
        FluidProperties {
            pressure: CellGrid::uniform(shape, 3000.0),
            temperature: CellGrid::uniform(shape, 620.0),
            bubble_point_pressure: CellGrid::uniform(shape, 2000.0),
            oil_saturation: CellGrid::uniform(shape, 0.6),
            water_saturation: CellGrid::uniform(shape, 0.3),
            gas_saturation: CellGrid::uniform(shape, 0.1),
            oil_viscosity: CellGrid::uniform(shape, 1.2),
            water_viscosity: CellGrid::uniform(shape, 0.5),
            gas_viscosity: CellGrid::uniform(shape, 0.02),
            oil_fvf: CellGrid::uniform(shape, 1.2),
            water_fvf: CellGrid::uniform(shape, 1.01),
            gas_fvf: CellGrid::uniform(shape, 0.005),
            solution_gor: CellGrid::uniform(shape, 400.0),
            oil_specific_gravity: CellGrid::uniform(shape, 0.85),
            gas_specific_gravity: CellGrid::uniform(shape, 0.7),
            water_specific_gravity: CellGrid::uniform(shape, 1.05),
            oil_compressibility: CellGrid::uniform(shape, 1.0e-5),
            water_compressibility: CellGrid::uniform(shape, 3.0e-6),
            gas_compressibility: CellGrid::uniform(shape, 3.0e-4),
        }
    }

    fn uniform_rock(shape: GridShape) -> RockProperties {
        RockProperties {
            porosity: CellGrid::uniform(shape, 0.25),
            absolute_permeability: RockPermeability::isotropic(CellGrid::uniform(shape, 100.0)),
            compressibility: CellGrid::uniform(shape, 4.0e-6),
            net_to_gross: CellGrid::uniform(shape, 1.0),
        }
    }

    fn build_model() -> ReservoirModel {
        let s = shape();
        let fluid = uniform_fluid(s);
        let hist = SaturationHistory::initial(&fluid.water_saturation, &fluid.gas_saturation);
        ReservoirModel::new(s, CellGrid::uniform(s, 20.0), uniform_rock(s), fluid, hist).unwrap()
    }

    #[test]
    fn valid_model_constructs() {
        let model = build_model();
        assert_eq!(model.shape().cell_count(), 2);
        assert!(model.is_active(0));
    }

    #[test]
    fn saturation_sum_violation_rejected() {
        let s = shape();
        let mut fluid = uniform_fluid(s);
        fluid.gas_saturation = CellGrid::uniform(s, 0.2); // sums to 1.1
        let hist = SaturationHistory::initial(&fluid.water_saturation, &fluid.gas_saturation);
        let result =
            ReservoirModel::new(s, CellGrid::uniform(s, 20.0), uniform_rock(s), fluid, hist);
        assert!(matches!(result, Err(ModelError::SaturationSum { .. })));
    }

    #[test]
    fn pore_volume_uses_net_to_gross() {
        let model = build_model();
        // 100 × 100 × 20 bulk, ntg 1.0, porosity 0.25.
        assert!((model.pore_volume(0) - 50_000.0).abs() < 1.0e-9);
    }

    #[test]
    fn total_compressibility_is_saturation_weighted() {
        let model = build_model();
        let expected = 4.0e-6 + 0.6 * 1.0e-5 + 0.3 * 3.0e-6 + 0.1 * 3.0e-4;
        assert!((model.total_compressibility(0) - expected).abs() < 1.0e-12);
    }

    #[test]
    fn with_fluid_folds_history_forward() {
        let model = build_model();
        let s = shape();
        let mut fluid = uniform_fluid(s);
        fluid.water_saturation = CellGrid::uniform(s, 0.4);
        fluid.oil_saturation = CellGrid::uniform(s, 0.5);
        let next = model.with_fluid(fluid).unwrap();
        assert_eq!(next.saturation_history().max_water_saturation.at(0), 0.4);
        // The original model is untouched.
        assert_eq!(model.saturation_history().max_water_saturation.at(0), 0.3);
    }
}
