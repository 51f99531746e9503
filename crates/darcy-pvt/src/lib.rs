//! PVT property evaluation for the Darcy black-oil engine.
//!
//! Maps (pressure, temperature, bubble point) to the phase properties the
//! flow equations consume — formation volume factors, viscosities,
//! solution gas-oil ratio, compressibilities — through one of two
//! interchangeable strategies: closed-form empirical correlations
//! ([`CorrelationSet`]) or lookup against a pressure-indexed table
//! ([`PvtTable`]). Both are pure functions of their inputs: no hidden
//! state, so per-cell evaluation is independent and order-free.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod correlations;
pub mod error;
pub mod model;
pub mod table;

pub use error::PvtError;
pub use model::{CorrelationSet, PhaseProperties, PvtModel};
pub use table::{Extrapolation, Interpolation, PvtTable, PvtTableColumns};
