//! Darcy: a three-phase black-oil reservoir flow simulator.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Darcy sub-crates. For most users, adding `darcy` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use darcy::prelude::*;
//! use darcy::grid::{CellGrid, GridShape};
//!
//! # fn fluid_for(shape: GridShape) -> darcy::grid::FluidProperties {
//! #     darcy::grid::FluidProperties {
//! #         pressure: CellGrid::uniform(shape, 3000.0),
//! #         temperature: CellGrid::uniform(shape, 660.0),
//! #         bubble_point_pressure: CellGrid::uniform(shape, 2000.0),
//! #         oil_saturation: CellGrid::uniform(shape, 0.6),
//! #         water_saturation: CellGrid::uniform(shape, 0.3),
//! #         gas_saturation: CellGrid::uniform(shape, 0.1),
//! #         oil_viscosity: CellGrid::uniform(shape, 1.2),
//! #         water_viscosity: CellGrid::uniform(shape, 0.5),
//! #         gas_viscosity: CellGrid::uniform(shape, 0.02),
//! #         oil_fvf: CellGrid::uniform(shape, 1.2),
//! #         water_fvf: CellGrid::uniform(shape, 1.01),
//! #         gas_fvf: CellGrid::uniform(shape, 0.005),
//! #         solution_gor: CellGrid::uniform(shape, 400.0),
//! #         oil_specific_gravity: CellGrid::uniform(shape, 0.85),
//! #         gas_specific_gravity: CellGrid::uniform(shape, 0.7),
//! #         water_specific_gravity: CellGrid::uniform(shape, 1.05),
//! #         oil_compressibility: CellGrid::uniform(shape, 1.0e-5),
//! #         water_compressibility: CellGrid::uniform(shape, 3.0e-6),
//! #         gas_compressibility: CellGrid::uniform(shape, 3.0e-4),
//! #     }
//! # }
//! use darcy::grid::{ReservoirModel, RockPermeability, RockProperties, SaturationHistory};
//! use darcy::rockfluid::{BakerLinear, CapillaryPressureModel, CoreyCurve, RockFluidTables, Wettability};
//!
//! // A 10×10×3 homogeneous box at 3000 psia.
//! let shape = GridShape::new((10, 10, 3), (100.0, 100.0)).unwrap();
//! let fluid = fluid_for(shape);
//! let history = SaturationHistory::initial(&fluid.water_saturation, &fluid.gas_saturation);
//! let rock = RockProperties {
//!     porosity: CellGrid::uniform(shape, 0.25),
//!     absolute_permeability: RockPermeability::isotropic(CellGrid::uniform(shape, 100.0)),
//!     compressibility: CellGrid::uniform(shape, 4.0e-6),
//!     net_to_gross: CellGrid::uniform(shape, 1.0),
//! };
//! let model =
//!     ReservoirModel::new(shape, CellGrid::uniform(shape, 20.0), rock, fluid, history).unwrap();
//!
//! let tables = RockFluidTables::new(
//!     CoreyCurve::new(0.2, 0.3, 0.6, 2.0).unwrap(),
//!     CoreyCurve::new(0.25, 0.2, 0.9, 2.0).unwrap(),
//!     CoreyCurve::new(0.1, 0.25, 0.8, 2.0).unwrap(),
//!     CoreyCurve::new(0.05, 0.45, 0.7, 2.0).unwrap(),
//!     Box::new(BakerLinear),
//!     CapillaryPressureModel::zero(),
//!     CapillaryPressureModel::zero(),
//!     Wettability::WaterWet,
//! )
//! .unwrap();
//!
//! let run = RunConfig {
//!     model,
//!     wells: Wells::default(),
//!     rock_fluid: tables,
//!     pvt: PvtModel::Correlation(CorrelationSet::new(35.0, 0.7, 1.0).unwrap()),
//!     solver: SolverConfig::default(),
//!     timer: TimerConfig {
//!         initial_step_size: Time::hours(30.0),
//!         min_step_size: Time::hours(1.0),
//!         max_step_size: Time::days(7.0),
//!         simulation_time: Time::days(30.0),
//!         max_cfl_number: 0.9,
//!         ramp_up_factor: 1.2,
//!         backoff_factor: 0.5,
//!         aggressive_backoff_factor: 0.25,
//!         max_rejects: 10,
//!     },
//!     boundaries: BoundarySet::closed(),
//!     schedules: WellSchedules::new(),
//! };
//!
//! let mut states = 0;
//! for state in Simulation::new(run).unwrap() {
//!     let state = state.unwrap();
//!     states += 1;
//!     assert!(state.time_in_days() <= 30.0 + 1.0e-9);
//! }
//! assert!(states > 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `darcy-core` | Phases, IDs, units, time helper, error taxonomy |
//! | [`grid`] | `darcy-grid` | Grid shape, cell storage, the reservoir model |
//! | [`pvt`] | `darcy-pvt` | Correlations and PVT table interpolation |
//! | [`rockfluid`] | `darcy-rockfluid` | Relative permeability and capillary pressure |
//! | [`wells`] | `darcy-wells` | Wells, controls, schedules, well indices |
//! | [`solver`] | `darcy-solver` | CSR matrices, Krylov solvers, preconditioners |
//! | [`engine`] | `darcy-engine` | The time-marching simulation loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, units, and the error taxonomy (`darcy-core`).
pub use darcy_core as types;

/// Grid geometry, property storage, and the immutable reservoir model
/// (`darcy-grid`).
pub use darcy_grid as grid;

/// PVT property evaluation (`darcy-pvt`).
pub use darcy_pvt as pvt;

/// Relative permeability and capillary pressure models
/// (`darcy-rockfluid`).
pub use darcy_rockfluid as rockfluid;

/// Wells, operating controls, and schedules (`darcy-wells`).
pub use darcy_wells as wells;

/// Sparse linear algebra for the pressure solve (`darcy-solver`).
pub use darcy_solver as solver;

/// The time-marching simulation engine (`darcy-engine`).
pub use darcy_engine as engine;

/// Common imports for typical Darcy usage.
///
/// ```rust
/// use darcy::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use darcy_core::{PerPhase, Phase, RunError, StepId, StepRejection, Time};

    // Model
    pub use darcy_grid::{RateGrids, ReservoirModel};

    // PVT
    pub use darcy_pvt::{CorrelationSet, PvtModel, PvtTable};

    // Rock-fluid
    pub use darcy_rockfluid::RockFluidTables;

    // Wells
    pub use darcy_wells::{
        InjectedFluid, ProducedFluid, Well, WellControl, WellMode, WellSchedules, Wells,
    };

    // Solver selection
    pub use darcy_solver::{LinearSolver, PreconditionerKind};

    // Engine
    pub use darcy_engine::{
        BoundaryCondition, BoundarySet, Face, Miscibility, RunConfig, Scheme, Simulation,
        SimulationState, SolverConfig, StateStream, StepMetrics, TimerConfig,
    };
}
