//! Grid geometry and per-cell property storage for Darcy simulations.
//!
//! Defines [`GridShape`] (structured 3D topology with row-major ranking),
//! [`CellGrid`] (shape-checked flat storage, one `f64` per cell), the rock
//! and fluid property bundles, per-phase [`RateGrids`], and the immutable
//! [`ReservoirModel`] snapshot that the engine derives anew every accepted
//! step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod fluid;
pub mod grid;
pub mod model;
pub mod rates;
pub mod rock;
pub mod shape;

pub use error::ModelError;
pub use fluid::{FluidProperties, SaturationHistory};
pub use grid::CellGrid;
pub use model::ReservoirModel;
pub use rates::RateGrids;
pub use rock::{RockPermeability, RockProperties};
pub use shape::GridShape;
