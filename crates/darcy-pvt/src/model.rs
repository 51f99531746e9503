//! The [`PvtModel`] strategy and its evaluation result.

use crate::correlations;
use crate::error::PvtError;
use crate::table::{ColumnId, PvtTable};

/// Phase properties at one (pressure, temperature, bubble-point) state.
///
/// The flow equations consume these directly; every field is per-cell
/// and the evaluation producing them is pure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseProperties {
    /// Solution gas-oil ratio, scf/stb.
    pub solution_gor: f64,
    /// Oil formation volume factor, rb/stb.
    pub oil_fvf: f64,
    /// Oil viscosity, cP.
    pub oil_viscosity: f64,
    /// Gas formation volume factor, rcf/scf.
    pub gas_fvf: f64,
    /// Gas viscosity, cP.
    pub gas_viscosity: f64,
    /// Water formation volume factor, rb/stb.
    pub water_fvf: f64,
    /// Water viscosity, cP.
    pub water_viscosity: f64,
    /// Oil compressibility, 1/psi.
    pub oil_compressibility: f64,
    /// Gas compressibility, 1/psi.
    pub gas_compressibility: f64,
    /// Water compressibility, 1/psi.
    pub water_compressibility: f64,
}

/// Parameters for the correlation-backed strategy.
///
/// Identifies the fluids by their bulk properties: stock-tank oil API
/// gravity, separator-gas specific gravity, and brine salinity. Built
/// once per run and validated up front.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrelationSet {
    oil_api_gravity: f64,
    gas_specific_gravity: f64,
    gas_molecular_weight: f64,
    /// Brine salinity, weight-percent solids.
    salinity: f64,
}

impl CorrelationSet {
    /// Build a correlation set, validating parameter ranges.
    pub fn new(
        oil_api_gravity: f64,
        gas_specific_gravity: f64,
        salinity: f64,
    ) -> Result<Self, PvtError> {
        if !oil_api_gravity.is_finite() || !(5.0..=70.0).contains(&oil_api_gravity) {
            return Err(PvtError::InvalidParameter {
                reason: format!("oil API gravity {oil_api_gravity} outside [5, 70]"),
            });
        }
        if !gas_specific_gravity.is_finite() || !(0.55..=1.8).contains(&gas_specific_gravity) {
            return Err(PvtError::InvalidParameter {
                reason: format!("gas specific gravity {gas_specific_gravity} outside [0.55, 1.8]"),
            });
        }
        if !salinity.is_finite() || !(0.0..=30.0).contains(&salinity) {
            return Err(PvtError::InvalidParameter {
                reason: format!("salinity {salinity} wt% outside [0, 30]"),
            });
        }
        Ok(Self {
            oil_api_gravity,
            gas_specific_gravity,
            gas_molecular_weight: gas_specific_gravity
                * darcy_core::constants::MOLECULAR_WEIGHT_AIR,
            salinity,
        })
    }

    /// Stock-tank oil specific gravity (water = 1) from API gravity.
    pub fn oil_specific_gravity(&self) -> f64 {
        141.5 / (131.5 + self.oil_api_gravity)
    }

    /// Gas specific gravity (air = 1).
    pub fn gas_specific_gravity(&self) -> f64 {
        self.gas_specific_gravity
    }

    fn evaluate(&self, p: f64, temp: f64, bubble_point: f64) -> PhaseProperties {
        let gas_sg = self.gas_specific_gravity;
        let api = self.oil_api_gravity;
        // Saturated below the bubble point; Rs holds constant above it.
        let rs_pressure = p.min(bubble_point);
        let solution_gor = correlations::standing_solution_gor(rs_pressure, gas_sg, api, temp);
        let oil_fvf =
            correlations::standing_oil_fvf(solution_gor, gas_sg, self.oil_specific_gravity(), temp);
        let dead = correlations::dead_oil_viscosity(api, temp);
        let oil_viscosity = correlations::live_oil_viscosity(dead, solution_gor);
        let z = correlations::gas_z_factor(p, temp, gas_sg);
        PhaseProperties {
            solution_gor,
            oil_fvf,
            oil_viscosity,
            gas_fvf: correlations::gas_fvf(z, temp, p),
            gas_viscosity: correlations::gas_viscosity(temp, p, self.gas_molecular_weight, z),
            water_fvf: correlations::water_fvf(p, temp),
            water_viscosity: correlations::water_viscosity(temp, self.salinity),
            oil_compressibility: correlations::oil_compressibility(
                solution_gor,
                temp,
                api,
                gas_sg,
                p,
            ),
            gas_compressibility: correlations::gas_compressibility(p, temp, gas_sg),
            water_compressibility: correlations::water_compressibility(p, temp, self.salinity),
        }
    }
}

/// The PVT evaluation strategy: correlations or a precomputed table.
///
/// Both variants expose the same pure [`evaluate`](PvtModel::evaluate)
/// operation, so the engine is indifferent to which one a run uses.
#[derive(Clone, Debug, PartialEq)]
pub enum PvtModel {
    /// Closed-form empirical correlations.
    Correlation(CorrelationSet),
    /// Interpolated lookup against a pressure-indexed table.
    Table(PvtTable),
}

impl PvtModel {
    /// Evaluate phase properties at one cell state.
    ///
    /// Pure function of its arguments: same inputs always give the same
    /// output, which is what makes per-cell evaluation embarrassingly
    /// parallel and runs bit-for-bit reproducible.
    ///
    /// # Errors
    ///
    /// [`PvtError::InvalidInput`] for non-physical pressure or
    /// temperature; [`PvtError::OutOfTableRange`] for strict tables.
    pub fn evaluate(
        &self,
        pressure: f64,
        temperature: f64,
        bubble_point: f64,
    ) -> Result<PhaseProperties, PvtError> {
        if !pressure.is_finite() || pressure <= 0.0 {
            return Err(PvtError::InvalidInput {
                reason: format!("pressure {pressure} must be finite and positive"),
            });
        }
        if !temperature.is_finite() || temperature <= 0.0 {
            return Err(PvtError::InvalidInput {
                reason: format!("temperature {temperature} must be finite and positive"),
            });
        }
        match self {
            Self::Correlation(set) => Ok(set.evaluate(pressure, temperature, bubble_point)),
            Self::Table(table) => {
                let rs_pressure = pressure.min(bubble_point).max(f64::MIN_POSITIVE);
                Ok(PhaseProperties {
                    solution_gor: table.sample(ColumnId::SolutionGor, rs_pressure)?,
                    oil_fvf: table.sample(ColumnId::OilFvf, pressure)?,
                    oil_viscosity: table.sample(ColumnId::OilViscosity, pressure)?,
                    gas_fvf: table.sample(ColumnId::GasFvf, pressure)?,
                    gas_viscosity: table.sample(ColumnId::GasViscosity, pressure)?,
                    water_fvf: table.sample(ColumnId::WaterFvf, pressure)?,
                    water_viscosity: table.sample(ColumnId::WaterViscosity, pressure)?,
                    oil_compressibility: table.sample(ColumnId::OilCompressibility, pressure)?,
                    gas_compressibility: table.sample(ColumnId::GasCompressibility, pressure)?,
                    water_compressibility: table
                        .sample(ColumnId::WaterCompressibility, pressure)?,
                })
            }
        }
    }
}
