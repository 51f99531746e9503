//! Field-unit constants and conversion factors.
//!
//! The engine works in oilfield units throughout: ft for length, psia for
//! pressure, cP for viscosity, md for permeability, °R for absolute
//! temperature, ft³/day for volumetric rate, seconds for simulation time.

/// Days per Julian year.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Seconds per day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Meters to feet.
pub const METERS_TO_FT: f64 = 3.280_84;

/// Darcy-law conversion for field units with rates in ft³/day:
/// `q = C · k[md] · A[ft²] / (µ[cP] · L[ft]) · Δp[psi]`.
pub const TRANSMISSIBILITY_CONVERSION: f64 = 6.328_3e-3;

/// Fresh-water hydrostatic gradient, psi per ft of column.
pub const WATER_PRESSURE_GRADIENT: f64 = 0.433;

/// Standard-condition pressure, psia.
pub const STANDARD_PRESSURE: f64 = 14.696;

/// Standard-condition temperature, °R (60 °F).
pub const STANDARD_TEMPERATURE: f64 = 519.67;

/// Universal gas constant, psia·ft³/(lb-mol·°R).
pub const GAS_CONSTANT: f64 = 10.732;

/// Molecular weight of air, lbm/lb-mol.
pub const MOLECULAR_WEIGHT_AIR: f64 = 28.966;

/// Molecular weight of methane, lbm/lb-mol.
pub const MOLECULAR_WEIGHT_CH4: f64 = 16.043;

/// Molecular weight of water, lbm/lb-mol.
pub const MOLECULAR_WEIGHT_WATER: f64 = 18.015;

/// Density of fresh water at standard conditions, lbm/ft³.
pub const WATER_DENSITY_STANDARD: f64 = 62.37;

/// Tolerance used when checking that phase saturations sum to one.
pub const SATURATION_SUM_TOLERANCE: f64 = 1.0e-6;
