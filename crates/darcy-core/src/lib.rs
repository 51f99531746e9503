//! Core types for the Darcy black-oil reservoir simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Darcy workspace:
//! phase identities, strongly-typed step counters, field-unit constants,
//! the [`Time`] construction helper, and the error taxonomy shared by
//! the flow engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod id;
pub mod phase;
pub mod time;

pub use error::{RunError, StepRejection};
pub use id::{CellCoord, StepId};
pub use phase::{PerPhase, Phase};
pub use time::Time;
