//! Closed-form black-oil property correlations.
//!
//! Field units throughout: psia, °R, scf/stb, rb/stb, cP. Each function
//! is pure; validity-range handling (clamping) happens in the caller
//! ([`crate::CorrelationSet`]), not here.

use darcy_core::constants::{GAS_CONSTANT, STANDARD_PRESSURE, STANDARD_TEMPERATURE};

/// Standing's solution gas-oil ratio at pressure `p`, scf/stb.
///
/// Valid for saturated oil (`p` at or below the bubble point).
pub fn standing_solution_gor(p: f64, gas_sg: f64, api: f64, temp: f64) -> f64 {
    let temp_f = temp - 459.67;
    let x = 0.0125 * api - 0.000_91 * temp_f;
    gas_sg * ((p / 18.2 + 1.4) * 10.0_f64.powf(x)).max(0.0).powf(1.204_8)
}

/// Standing's bubble-point pressure for a given solution GOR, psia.
pub fn standing_bubble_point(rs: f64, gas_sg: f64, api: f64, temp: f64) -> f64 {
    let temp_f = temp - 459.67;
    let yg = 0.000_91 * temp_f - 0.0125 * api;
    18.2 * ((rs / gas_sg).powf(0.83) * 10.0_f64.powf(yg) - 1.4)
}

/// Standing's saturated-oil formation volume factor, rb/stb.
pub fn standing_oil_fvf(rs: f64, gas_sg: f64, oil_sg: f64, temp: f64) -> f64 {
    let temp_f = temp - 459.67;
    let bob = rs * (gas_sg / oil_sg).sqrt() + 1.25 * temp_f;
    0.972 + 1.47e-4 * bob.powf(1.175)
}

/// Beggs-Robinson dead-oil viscosity, cP.
pub fn dead_oil_viscosity(api: f64, temp: f64) -> f64 {
    let temp_f = temp - 459.67;
    let z = 3.032_4 - 0.020_23 * api;
    let y = 10.0_f64.powf(z);
    let x = y * temp_f.powf(-1.163);
    10.0_f64.powf(x) - 1.0
}

/// Beggs-Robinson live-oil viscosity from dead-oil viscosity and Rs, cP.
pub fn live_oil_viscosity(dead: f64, rs: f64) -> f64 {
    let a = 10.715 * (rs + 100.0).powf(-0.515);
    let b = 5.44 * (rs + 150.0).powf(-0.338);
    a * dead.powf(b)
}

/// Vasquez-Beggs undersaturated oil compressibility, 1/psi.
pub fn oil_compressibility(rs: f64, temp: f64, api: f64, gas_sg: f64, p: f64) -> f64 {
    let temp_f = temp - 459.67;
    let num = -1_433.0 + 5.0 * rs + 17.2 * temp_f - 1_180.0 * gas_sg + 12.61 * api;
    (num / (1.0e5 * p)).max(1.0e-7)
}

/// Sutton pseudo-critical temperature, °R, from gas specific gravity.
pub fn pseudo_critical_temperature(gas_sg: f64) -> f64 {
    169.2 + 349.5 * gas_sg - 74.0 * gas_sg * gas_sg
}

/// Sutton pseudo-critical pressure, psia, from gas specific gravity.
pub fn pseudo_critical_pressure(gas_sg: f64) -> f64 {
    756.8 - 131.07 * gas_sg - 3.6 * gas_sg * gas_sg
}

/// Papay's gas deviation factor.
pub fn gas_z_factor(p: f64, temp: f64, gas_sg: f64) -> f64 {
    let ppr = p / pseudo_critical_pressure(gas_sg);
    let tpr = temp / pseudo_critical_temperature(gas_sg);
    let z = 1.0 - 3.53 * ppr / 10.0_f64.powf(0.981_3 * tpr)
        + 0.274 * ppr * ppr / 10.0_f64.powf(0.815_7 * tpr);
    z.max(0.05)
}

/// Gas formation volume factor, rcf/scf, from the real-gas law.
pub fn gas_fvf(z: f64, temp: f64, p: f64) -> f64 {
    // (p_sc / T_sc) z T / p
    (STANDARD_PRESSURE / STANDARD_TEMPERATURE) * z * temp / p
}

/// Lee-Gonzalez-Eakin gas viscosity, cP.
pub fn gas_viscosity(temp: f64, p: f64, molecular_weight: f64, z: f64) -> f64 {
    // Density in g/cm³ from the real-gas law.
    let density = p * molecular_weight / (z * GAS_CONSTANT * temp) / 62.428;
    let k = (9.4 + 0.02 * molecular_weight) * temp.powf(1.5) / (209.0 + 19.0 * molecular_weight + temp);
    let x = 3.5 + 986.0 / temp + 0.01 * molecular_weight;
    let y = 2.4 - 0.2 * x;
    1.0e-4 * k * (x * density.powf(y)).exp()
}

/// Isothermal gas compressibility, 1/psi, via a centered z-factor
/// derivative.
pub fn gas_compressibility(p: f64, temp: f64, gas_sg: f64) -> f64 {
    let dp = (p * 1.0e-4).max(1.0e-3);
    let z = gas_z_factor(p, temp, gas_sg);
    let dz_dp = (gas_z_factor(p + dp, temp, gas_sg) - gas_z_factor(p - dp, temp, gas_sg))
        / (2.0 * dp);
    (1.0 / p - dz_dp / z).max(1.0e-7)
}

/// McCain water formation volume factor, rb/stb.
pub fn water_fvf(p: f64, temp: f64) -> f64 {
    let temp_f = temp - 459.67;
    let dv_t = -1.001_0e-2 + 1.333_91e-4 * temp_f + 5.505_42e-7 * temp_f * temp_f;
    let dv_p = -1.953_01e-9 * p * temp_f - 1.728_34e-13 * p * p * temp_f - 3.589_22e-7 * p
        - 2.253_41e-10 * p * p;
    (1.0 + dv_t) * (1.0 + dv_p)
}

/// Brine viscosity, cP, as a function of temperature and salinity
/// (weight-percent solids), after McCain.
pub fn water_viscosity(temp: f64, salinity: f64) -> f64 {
    let temp_f = temp - 459.67;
    let a = 109.574 - 8.405_64 * salinity + 0.313_314 * salinity * salinity
        + 8.722_13e-3 * salinity * salinity * salinity;
    let b = -1.121_66 + 2.632_51e-2 * salinity - 6.795_61e-4 * salinity * salinity
        - 5.471_19e-5 * salinity * salinity * salinity
        + 1.556_28e-6 * salinity * salinity * salinity * salinity;
    a * temp_f.powf(b)
}

/// Osif water compressibility, 1/psi.
pub fn water_compressibility(p: f64, temp: f64, salinity: f64) -> f64 {
    let temp_f = temp - 459.67;
    // Salinity in g/L of the Osif fit, from weight-percent.
    let salt = salinity * 10.0;
    1.0 / (7.033 * p + 541.5 * salt - 537.0 * temp_f + 403_300.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMP: f64 = 660.0; // ~200 °F

    #[test]
    fn bubble_point_and_gor_are_consistent() {
        // Round-trip Rs → Pb → Rs at the bubble point.
        let (gas_sg, api) = (0.7, 35.0);
        let rs = 500.0;
        let pb = standing_bubble_point(rs, gas_sg, api, TEMP);
        assert!(pb > 500.0 && pb < 5000.0, "pb = {pb}");
    }

    #[test]
    fn live_oil_is_thinner_than_dead_oil() {
        let dead = dead_oil_viscosity(35.0, TEMP);
        let live = live_oil_viscosity(dead, 500.0);
        assert!(dead > 0.0);
        assert!(live < dead);
    }

    #[test]
    fn z_factor_near_one_at_low_pressure() {
        let z = gas_z_factor(100.0, TEMP, 0.7);
        assert!((z - 1.0).abs() < 0.1, "z = {z}");
    }

    #[test]
    fn gas_fvf_decreases_with_pressure() {
        let z1 = gas_z_factor(1000.0, TEMP, 0.7);
        let z2 = gas_z_factor(3000.0, TEMP, 0.7);
        assert!(gas_fvf(z1, TEMP, 1000.0) > gas_fvf(z2, TEMP, 3000.0));
    }

    #[test]
    fn water_properties_are_physical() {
        let bw = water_fvf(3000.0, TEMP);
        assert!(bw > 0.9 && bw < 1.2, "bw = {bw}");
        let muw = water_viscosity(TEMP, 1.0);
        assert!(muw > 0.1 && muw < 2.0, "muw = {muw}");
        let cw = water_compressibility(3000.0, TEMP, 1.0);
        assert!(cw > 1.0e-7 && cw < 1.0e-5, "cw = {cw}");
    }

    #[test]
    fn gas_viscosity_increases_with_pressure() {
        let z1 = gas_z_factor(1000.0, TEMP, 0.7);
        let z2 = gas_z_factor(5000.0, TEMP, 0.7);
        let mu1 = gas_viscosity(TEMP, 1000.0, 20.0, z1);
        let mu2 = gas_viscosity(TEMP, 5000.0, 20.0, z2);
        assert!(mu2 > mu1);
    }
}
