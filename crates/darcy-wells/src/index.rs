//! Peaceman well-index calculation.

use crate::error::WellError;
use darcy_core::constants::TRANSMISSIBILITY_CONVERSION;

/// Peaceman well index for one perforated cell, ft³/day/psi/cP.
///
/// `WI = C · 2π √(kx ky) h ntg / (ln(re/rw) + s)` with the anisotropic
/// equivalent radius
/// `re = 0.28 √(√(ky/kx) dx² + √(kx/ky) dy²) / ((ky/kx)^¼ + (kx/ky)^¼)`.
///
/// The caller multiplies by phase mobility (`kr/µ`) to get the phase
/// coupling coefficient.
#[allow(clippy::too_many_arguments)]
pub fn peaceman_well_index(
    well: &str,
    kx: f64,
    ky: f64,
    dx: f64,
    dy: f64,
    thickness: f64,
    net_to_gross: f64,
    radius: f64,
    skin: f64,
) -> Result<f64, WellError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(WellError::InvalidRadius {
            well: well.to_string(),
            radius,
        });
    }
    if kx <= 0.0 || ky <= 0.0 {
        // Impermeable cell: the perforation simply does not flow.
        return Ok(0.0);
    }
    let ratio = ky / kx;
    let re = 0.28 * (ratio.sqrt() * dx * dx + (1.0 / ratio).sqrt() * dy * dy).sqrt()
        / (ratio.powf(0.25) + (1.0 / ratio).powf(0.25));
    let denominator = (re / radius).ln() + skin;
    if denominator <= 0.0 {
        return Err(WellError::InvalidSkin {
            well: well.to_string(),
            denominator,
        });
    }
    let k_eff = (kx * ky).sqrt();
    Ok(TRANSMISSIBILITY_CONVERSION * 2.0 * std::f64::consts::PI * k_eff * thickness * net_to_gross
        / denominator)
}
