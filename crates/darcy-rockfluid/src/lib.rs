//! Rock-fluid interaction models: relative permeability and capillary
//! pressure as functions of phase saturations.
//!
//! Two-phase Corey-type curves supply water-oil and gas-oil endpoints;
//! three-phase oil relative permeability blends the two through an
//! injectable [`OilMixingRule`], so alternative blending schemes slot in
//! without touching the tables. Saturations outside [0, 1] are a
//! programming error at this boundary (the saturation updater clamps
//! before calling in) and are rejected by debug assertions.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capillary;
pub mod corey;
pub mod error;
pub mod mixing;
pub mod tables;

pub use capillary::CapillaryPressureModel;
pub use corey::CoreyCurve;
pub use error::RockFluidError;
pub use mixing::{BakerLinear, OilMixingRule, StoneTwo};
pub use tables::{RelPerm, RockFluidTables, Wettability};
