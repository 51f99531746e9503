//! Per-cell property evaluation for one trial step.
//!
//! Pulls PVT and rock-fluid values for every active cell into flat
//! buffers the assembly and saturation update index directly. Each
//! cell's evaluation is a pure function of that cell's state, so the
//! loop is order-free and embarrassingly parallel; it runs sequentially
//! here to keep the engine dependency-light and bit-reproducible.

use crate::config::Miscibility;
use darcy_core::RunError;
use darcy_grid::ReservoirModel;
use darcy_pvt::{PhaseProperties, PvtModel};
use darcy_rockfluid::RockFluidTables;
use darcy_wells::{WellKind, Wells};

/// Todd-Longstaff mixing parameters pulled from the injected fluids.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct MiscibleBlend {
    /// Mixing parameter ω.
    pub omega: f64,
    /// Minimum miscibility pressure, psia.
    pub mmp: f64,
}

/// Flat per-cell property buffers for one step.
#[derive(Clone, Debug)]
pub(crate) struct PropertyField {
    /// Phase mobilities kr/µ, 1/cP, after any miscible blending.
    pub mobility_oil: Vec<f64>,
    /// Water mobility.
    pub mobility_water: Vec<f64>,
    /// Gas mobility.
    pub mobility_gas: Vec<f64>,
    /// Oil-water capillary pressure, psi.
    pub pc_ow: Vec<f64>,
    /// Gas-oil capillary pressure, psi.
    pub pc_go: Vec<f64>,
    /// Raw PVT evaluation per cell.
    pub pvt: Vec<PhaseProperties>,
}

impl PropertyField {
    /// Total mobility of a cell, 1/cP.
    pub fn total_mobility(&self, rank: usize) -> f64 {
        self.mobility_oil[rank] + self.mobility_water[rank] + self.mobility_gas[rank]
    }
}

/// The Todd-Longstaff parameters of the first miscible injected gas, if
/// the run mixes at all.
pub(crate) fn miscible_blend(miscibility: Miscibility, wells: &Wells) -> Option<MiscibleBlend> {
    if miscibility == Miscibility::Immiscible {
        return None;
    }
    wells.injectors().iter().find_map(|well| match well.kind() {
        WellKind::Injector(fluid) if fluid.is_miscible => Some(MiscibleBlend {
            omega: fluid.todd_longstaff_omega,
            mmp: fluid.minimum_miscibility_pressure,
        }),
        _ => None,
    })
}

/// Quarter-power fully-mixed viscosity of the oil/gas pair.
fn mixed_viscosity(so: f64, sg: f64, mu_o: f64, mu_g: f64) -> f64 {
    let total = so + sg;
    if total <= f64::EPSILON {
        return mu_o;
    }
    let fo = so / total;
    let fg = sg / total;
    (fo * mu_o.powf(-0.25) + fg * mu_g.powf(-0.25)).powf(-4.0)
}

/// Todd-Longstaff effective viscosities: `µ_eff = µ^(1−ω) · µ_m^ω`.
pub(crate) fn todd_longstaff_viscosities(
    so: f64,
    sg: f64,
    mu_o: f64,
    mu_g: f64,
    omega: f64,
) -> (f64, f64) {
    let mu_m = mixed_viscosity(so, sg, mu_o, mu_g);
    (
        mu_o.powf(1.0 - omega) * mu_m.powf(omega),
        mu_g.powf(1.0 - omega) * mu_m.powf(omega),
    )
}

/// Evaluate properties for every cell of the model.
///
/// Inactive cells get zero mobility and a default PVT record; they
/// never enter the linear system.
pub(crate) fn evaluate(
    model: &ReservoirModel,
    tables: &RockFluidTables,
    pvt: &PvtModel,
    blend: Option<MiscibleBlend>,
) -> Result<PropertyField, RunError> {
    let n = model.shape().cell_count();
    let fluid = model.fluid();
    let mut field = PropertyField {
        mobility_oil: vec![0.0; n],
        mobility_water: vec![0.0; n],
        mobility_gas: vec![0.0; n],
        pc_ow: vec![0.0; n],
        pc_go: vec![0.0; n],
        pvt: vec![
            PhaseProperties {
                solution_gor: 0.0,
                oil_fvf: 1.0,
                oil_viscosity: 1.0,
                gas_fvf: 1.0,
                gas_viscosity: 1.0,
                water_fvf: 1.0,
                water_viscosity: 1.0,
                oil_compressibility: 0.0,
                gas_compressibility: 0.0,
                water_compressibility: 0.0,
            };
            n
        ],
    };

    for rank in 0..n {
        if !model.is_active(rank) {
            continue;
        }
        let p = fluid.pressure.at(rank);
        let temp = fluid.temperature.at(rank);
        let pb = fluid.bubble_point_pressure.at(rank);
        let props = pvt
            .evaluate(p, temp, pb)
            .map_err(|e| RunError::InvalidState {
                reason: format!("PVT evaluation at cell {rank}: {e}"),
            })?;

        let sw = fluid.water_saturation.at(rank);
        let so = fluid.oil_saturation.at(rank);
        let sg = fluid.gas_saturation.at(rank);
        let kr = tables.relative_permeability(sw, so, sg);

        let (mut mu_o, mut mu_g) = (props.oil_viscosity, props.gas_viscosity);
        if let Some(blend) = blend {
            if p >= blend.mmp {
                let (eff_o, eff_g) = todd_longstaff_viscosities(so, sg, mu_o, mu_g, blend.omega);
                mu_o = eff_o;
                mu_g = eff_g;
            }
        }

        field.mobility_oil[rank] = kr.oil / mu_o;
        field.mobility_water[rank] = kr.water / props.water_viscosity;
        field.mobility_gas[rank] = kr.gas / mu_g;
        field.pc_ow[rank] = tables.oil_water_pc(sw);
        field.pc_go[rank] = tables.gas_oil_pc(sg);
        field.pvt[rank] = props;
    }

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_viscosity_between_endpoints() {
        let mu_m = mixed_viscosity(0.5, 0.5, 1.0, 0.02);
        assert!(mu_m > 0.02 && mu_m < 1.0, "mu_m = {mu_m}");
    }

    #[test]
    fn omega_zero_keeps_pure_viscosities() {
        let (mu_o, mu_g) = todd_longstaff_viscosities(0.6, 0.4, 1.2, 0.03, 0.0);
        assert!((mu_o - 1.2).abs() < 1.0e-12);
        assert!((mu_g - 0.03).abs() < 1.0e-12);
    }

    #[test]
    fn omega_one_fully_mixes() {
        let (mu_o, mu_g) = todd_longstaff_viscosities(0.6, 0.4, 1.2, 0.03, 1.0);
        assert!((mu_o - mu_g).abs() < 1.0e-12);
    }

    #[test]
    fn blending_thins_oil_and_thickens_gas() {
        let (mu_o, mu_g) = todd_longstaff_viscosities(0.6, 0.4, 1.2, 0.03, 0.67);
        assert!(mu_o < 1.2);
        assert!(mu_g > 0.03);
    }
}
