//! Fluid state bundle and saturation history tracking.

use crate::error::ModelError;
use crate::grid::CellGrid;
use crate::shape::GridShape;
use darcy_core::constants::SATURATION_SUM_TOLERANCE;

/// Per-cell fluid state: pressures, saturations, and the PVT-derived
/// property grids the flow equations consume.
///
/// The engine re-evaluates the PVT-derived grids (viscosities, formation
/// volume factors, solution GOR, compressibilities) from pressure and
/// temperature every step; they are carried on the model so each emitted
/// snapshot is self-describing.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidProperties {
    /// Cell pressure, psia.
    pub pressure: CellGrid,
    /// Cell temperature, °R.
    pub temperature: CellGrid,
    /// Bubble-point pressure, psia.
    pub bubble_point_pressure: CellGrid,
    /// Oil saturation, fraction.
    pub oil_saturation: CellGrid,
    /// Water saturation, fraction.
    pub water_saturation: CellGrid,
    /// Gas saturation, fraction.
    pub gas_saturation: CellGrid,
    /// Oil viscosity, cP.
    pub oil_viscosity: CellGrid,
    /// Water viscosity, cP.
    pub water_viscosity: CellGrid,
    /// Gas viscosity, cP.
    pub gas_viscosity: CellGrid,
    /// Oil formation volume factor, rb/stb.
    pub oil_fvf: CellGrid,
    /// Water formation volume factor, rb/stb.
    pub water_fvf: CellGrid,
    /// Gas formation volume factor, rcf/scf.
    pub gas_fvf: CellGrid,
    /// Solution gas-oil ratio, scf/stb.
    pub solution_gor: CellGrid,
    /// Stock-tank oil specific gravity (water = 1).
    pub oil_specific_gravity: CellGrid,
    /// Gas specific gravity (air = 1).
    pub gas_specific_gravity: CellGrid,
    /// Water specific gravity (fresh water = 1).
    pub water_specific_gravity: CellGrid,
    /// Oil compressibility, 1/psi.
    pub oil_compressibility: CellGrid,
    /// Water compressibility, 1/psi.
    pub water_compressibility: CellGrid,
    /// Gas compressibility, 1/psi.
    pub gas_compressibility: CellGrid,
}

impl FluidProperties {
    /// Validate shapes and physical ranges.
    ///
    /// Saturations must lie in [0, 1] and sum to one (within tolerance)
    /// at every cell; pressures, viscosities, volume factors, and
    /// gravities must be positive and finite; compressibilities must be
    /// non-negative.
    pub fn validate(&self, shape: GridShape) -> Result<(), ModelError> {
        let expected = shape.cell_count();
        for (name, grid) in self.named_grids() {
            if grid.as_slice().len() != expected {
                return Err(ModelError::ShapeMismatch {
                    field: name.to_string(),
                    got: grid.as_slice().len(),
                    expected,
                });
            }
        }
        self.pressure
            .validate("pressure", |v| v.is_finite() && v > 0.0)?;
        self.temperature
            .validate("temperature", |v| v.is_finite() && v > 0.0)?;
        self.bubble_point_pressure
            .validate("bubble-point pressure", |v| v.is_finite() && v >= 0.0)?;
        for (name, grid) in [
            ("oil saturation", &self.oil_saturation),
            ("water saturation", &self.water_saturation),
            ("gas saturation", &self.gas_saturation),
        ] {
            grid.validate(name, |v| v.is_finite() && (0.0..=1.0).contains(&v))?;
        }
        for (name, grid) in [
            ("oil viscosity", &self.oil_viscosity),
            ("water viscosity", &self.water_viscosity),
            ("gas viscosity", &self.gas_viscosity),
            ("oil FVF", &self.oil_fvf),
            ("water FVF", &self.water_fvf),
            ("gas FVF", &self.gas_fvf),
            ("oil specific gravity", &self.oil_specific_gravity),
            ("gas specific gravity", &self.gas_specific_gravity),
            ("water specific gravity", &self.water_specific_gravity),
        ] {
            grid.validate(name, |v| v.is_finite() && v > 0.0)?;
        }
        for (name, grid) in [
            ("solution GOR", &self.solution_gor),
            ("oil compressibility", &self.oil_compressibility),
            ("water compressibility", &self.water_compressibility),
            ("gas compressibility", &self.gas_compressibility),
        ] {
            grid.validate(name, |v| v.is_finite() && v >= 0.0)?;
        }
        self.check_saturation_sum()?;
        Ok(())
    }

    /// Check the three-phase closure `So + Sw + Sg = 1` at every cell.
    pub fn check_saturation_sum(&self) -> Result<(), ModelError> {
        let so = self.oil_saturation.as_slice();
        let sw = self.water_saturation.as_slice();
        let sg = self.gas_saturation.as_slice();
        for cell in 0..so.len() {
            let sum = so[cell] + sw[cell] + sg[cell];
            if (sum - 1.0).abs() > SATURATION_SUM_TOLERANCE {
                return Err(ModelError::SaturationSum { cell, sum });
            }
        }
        Ok(())
    }

    fn named_grids(&self) -> impl Iterator<Item = (&'static str, &CellGrid)> + '_ {
        [
            ("pressure", &self.pressure),
            ("temperature", &self.temperature),
            ("bubble-point pressure", &self.bubble_point_pressure),
            ("oil saturation", &self.oil_saturation),
            ("water saturation", &self.water_saturation),
            ("gas saturation", &self.gas_saturation),
            ("oil viscosity", &self.oil_viscosity),
            ("water viscosity", &self.water_viscosity),
            ("gas viscosity", &self.gas_viscosity),
            ("oil FVF", &self.oil_fvf),
            ("water FVF", &self.water_fvf),
            ("gas FVF", &self.gas_fvf),
            ("solution GOR", &self.solution_gor),
            ("oil specific gravity", &self.oil_specific_gravity),
            ("gas specific gravity", &self.gas_specific_gravity),
            ("water specific gravity", &self.water_specific_gravity),
            ("oil compressibility", &self.oil_compressibility),
            ("water compressibility", &self.water_compressibility),
            ("gas compressibility", &self.gas_compressibility),
        ]
        .into_iter()
    }
}

/// Per-cell drainage/imbibition bookkeeping carried across steps.
///
/// Tracks the historical maximum water and gas saturations and whether a
/// cell is currently on an imbibition path (saturation falling from its
/// historical maximum). Flag grids store 0.0 / 1.0.
#[derive(Clone, Debug, PartialEq)]
pub struct SaturationHistory {
    /// Historical maximum water saturation.
    pub max_water_saturation: CellGrid,
    /// Historical maximum gas saturation.
    pub max_gas_saturation: CellGrid,
    /// 1.0 where water saturation is below its historical maximum.
    pub water_imbibition: CellGrid,
    /// 1.0 where gas saturation is below its historical maximum.
    pub gas_imbibition: CellGrid,
}

impl SaturationHistory {
    /// Fresh history seeded from the initial saturations.
    pub fn initial(water_saturation: &CellGrid, gas_saturation: &CellGrid) -> Self {
        let shape = water_saturation.shape();
        Self {
            max_water_saturation: water_saturation.clone(),
            max_gas_saturation: gas_saturation.clone(),
            water_imbibition: CellGrid::uniform(shape, 0.0),
            gas_imbibition: CellGrid::uniform(shape, 0.0),
        }
    }

    /// Fold the saturations of a newly accepted step into the history.
    pub fn updated(&self, water_saturation: &CellGrid, gas_saturation: &CellGrid) -> Self {
        let mut next = self.clone();
        let n = water_saturation.as_slice().len();
        for cell in 0..n {
            let sw = water_saturation.at(cell);
            let sg = gas_saturation.at(cell);
            if sw > next.max_water_saturation.at(cell) {
                next.max_water_saturation.set(cell, sw);
            }
            if sg > next.max_gas_saturation.at(cell) {
                next.max_gas_saturation.set(cell, sg);
            }
            let w_flag = (sw < next.max_water_saturation.at(cell)) as u8 as f64;
            let g_flag = (sg < next.max_gas_saturation.at(cell)) as u8 as f64;
            next.water_imbibition.set(cell, w_flag);
            next.gas_imbibition.set(cell, g_flag);
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::GridShape;

    fn shape() -> GridShape {
        GridShape::new((2, 1, 1), (10.0, 10.0)).unwrap()
    }

    #[test]
    fn history_tracks_maxima_and_flags() {
        let sw0 = CellGrid::uniform(shape(), 0.2);
        let sg0 = CellGrid::uniform(shape(), 0.1);
        let hist = SaturationHistory::initial(&sw0, &sg0);

        // Water rises, gas falls.
        let sw1 = CellGrid::uniform(shape(), 0.35);
        let sg1 = CellGrid::uniform(shape(), 0.05);
        let hist = hist.updated(&sw1, &sg1);
        assert_eq!(hist.max_water_saturation.at(0), 0.35);
        assert_eq!(hist.max_gas_saturation.at(0), 0.1);
        assert_eq!(hist.water_imbibition.at(0), 0.0);
        assert_eq!(hist.gas_imbibition.at(0), 1.0);

        // Water falls back below its max: imbibition flag flips on.
        let sw2 = CellGrid::uniform(shape(), 0.3);
        let hist = hist.updated(&sw2, &sg1);
        assert_eq!(hist.max_water_saturation.at(0), 0.35);
        assert_eq!(hist.water_imbibition.at(0), 1.0);
    }
}
