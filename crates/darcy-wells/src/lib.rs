//! Wells and well controls for the Darcy black-oil engine.
//!
//! A [`Well`] couples identity and geometry (perforated intervals,
//! wellbore radius, skin) with a [`WellControl`] policy. Controls form a
//! closed tagged set with one resolution operation: every step, each
//! active well's control is re-resolved against current reservoir
//! conditions into a concrete operating point ([`ResolvedWell`]) — a set
//! of phase rates plus the bottom-hole pressure they imply — which is
//! what the pressure assembly consumes. Rate-targeted wells switch to
//! BHP-limited operation when sustaining the target would cross their
//! pressure limit, and switch back when the constraint stops binding.
//!
//! Sign convention throughout: negative rates produce, positive inject.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod control;
pub mod error;
pub mod fluid;
pub mod index;
pub mod schedule;
pub mod well;

pub use control::{
    PhaseRateControl, ResolvedWell, SecondaryClamp, WellConditions, WellControl, WellMode,
};
pub use error::WellError;
pub use fluid::{InjectedFluid, ProducedFluid};
pub use index::peaceman_well_index;
pub use schedule::{WellAction, WellEvent, WellSchedule, WellSchedules};
pub use well::{PerforationInterval, Well, WellKind, Wells};
