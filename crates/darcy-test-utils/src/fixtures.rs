//! Standard fixtures: a uniform box model, rock-fluid tables, a
//! correlation PVT set, and simple wells.

use darcy_core::{CellCoord, Phase};
use darcy_grid::{
    CellGrid, FluidProperties, GridShape, ReservoirModel, RockPermeability, RockProperties,
    SaturationHistory,
};
use darcy_pvt::{CorrelationSet, PvtModel};
use darcy_rockfluid::{
    BakerLinear, CapillaryPressureModel, CoreyCurve, RockFluidTables, Wettability,
};
use darcy_wells::{
    InjectedFluid, PhaseRateControl, ProducedFluid, SecondaryClamp, Well, WellControl,
};

/// Default uniform reservoir pressure, psia.
pub const PRESSURE: f64 = 3000.0;

/// Default reservoir temperature, °R (~200 °F).
pub const TEMPERATURE: f64 = 660.0;

/// Default (water, oil, gas) saturations.
pub const SATURATIONS: (f64, f64, f64) = (0.3, 0.6, 0.1);

/// A homogeneous box model: 100 ft × 100 ft cells, 20 ft thick,
/// porosity 0.25, isotropic 100 md, uniform fluid state.
pub fn uniform_model(dims: (usize, usize, usize)) -> ReservoirModel {
    uniform_model_at(dims, PRESSURE, SATURATIONS)
}

/// A homogeneous box model at a chosen pressure and saturation triple.
pub fn uniform_model_at(
    dims: (usize, usize, usize),
    pressure: f64,
    saturations: (f64, f64, f64),
) -> ReservoirModel {
    let shape = GridShape::new(dims, (100.0, 100.0)).expect("valid shape");
    let (sw, so, sg) = saturations;
    let fluid = FluidProperties {
        pressure: CellGrid::uniform(shape, pressure),
        temperature: CellGrid::uniform(shape, TEMPERATURE),
        bubble_point_pressure: CellGrid::uniform(shape, 2000.0),
        oil_saturation: CellGrid::uniform(shape, so),
        water_saturation: CellGrid::uniform(shape, sw),
        gas_saturation: CellGrid::uniform(shape, sg),
        oil_viscosity: CellGrid::uniform(shape, 1.2),
        water_viscosity: CellGrid::uniform(shape, 0.5),
        gas_viscosity: CellGrid::uniform(shape, 0.02),
        oil_fvf: CellGrid::uniform(shape, 1.2),
        water_fvf: CellGrid::uniform(shape, 1.01),
        gas_fvf: CellGrid::uniform(shape, 0.005),
        solution_gor: CellGrid::uniform(shape, 400.0),
        oil_specific_gravity: CellGrid::uniform(shape, 0.85),
        gas_specific_gravity: CellGrid::uniform(shape, 0.7),
        water_specific_gravity: CellGrid::uniform(shape, 1.05),
        oil_compressibility: CellGrid::uniform(shape, 1.0e-5),
        water_compressibility: CellGrid::uniform(shape, 3.0e-6),
        gas_compressibility: CellGrid::uniform(shape, 3.0e-4),
    };
    let history = SaturationHistory::initial(&fluid.water_saturation, &fluid.gas_saturation);
    let rock = RockProperties {
        porosity: CellGrid::uniform(shape, 0.25),
        absolute_permeability: RockPermeability::isotropic(CellGrid::uniform(shape, 100.0)),
        compressibility: CellGrid::uniform(shape, 4.0e-6),
        net_to_gross: CellGrid::uniform(shape, 1.0),
    };
    ReservoirModel::new(shape, CellGrid::uniform(shape, 20.0), rock, fluid, history)
        .expect("valid fixture model")
}

/// Rock-fluid tables with moderate Corey curves, Baker mixing, and
/// capillary pressure disabled.
pub fn standard_tables() -> RockFluidTables {
    RockFluidTables::new(
        CoreyCurve::new(0.2, 0.3, 0.6, 2.0).expect("water curve"),
        CoreyCurve::new(0.25, 0.2, 0.9, 2.0).expect("oil-in-water curve"),
        CoreyCurve::new(0.1, 0.25, 0.8, 2.0).expect("oil-in-gas curve"),
        CoreyCurve::new(0.05, 0.45, 0.7, 2.0).expect("gas curve"),
        Box::new(BakerLinear),
        CapillaryPressureModel::zero(),
        CapillaryPressureModel::zero(),
        Wettability::WaterWet,
    )
    .expect("valid fixture tables")
}

/// A Standing/Beggs-Robinson correlation PVT set for a 35 °API oil with
/// 0.7-gravity gas and 1 wt% brine.
pub fn correlation_pvt() -> PvtModel {
    PvtModel::Correlation(CorrelationSet::new(35.0, 0.7, 1.0).expect("valid correlation set"))
}

/// The water descriptor used by fixture injectors.
pub fn injection_water() -> InjectedFluid {
    InjectedFluid {
        name: "Water".to_string(),
        phase: Phase::Water,
        specific_gravity: 1.05,
        molecular_weight: 18.015,
        viscosity: 0.5,
        density: 62.4,
        minimum_miscibility_pressure: 0.0,
        todd_longstaff_omega: 0.0,
        is_miscible: false,
        concentration: 1.0,
    }
}

/// A miscible CO2 descriptor for gas-injection fixtures.
pub fn injection_co2() -> InjectedFluid {
    InjectedFluid {
        name: "CO2".to_string(),
        phase: Phase::Gas,
        specific_gravity: 0.818,
        molecular_weight: 44.0,
        viscosity: 0.05,
        density: 35.0,
        minimum_miscibility_pressure: 2200.0,
        todd_longstaff_omega: 0.67,
        is_miscible: true,
        concentration: 1.0,
    }
}

/// A constant-rate water injector perforating one cell.
pub fn water_injector(name: &str, cell: CellCoord, rate: f64) -> Well {
    Well::injector(
        name,
        [(cell, cell)],
        0.354,
        0.0,
        WellControl::ConstantRate { rate },
        injection_water(),
        true,
    )
    .expect("valid fixture injector")
}

/// A constant-rate producer perforating one cell.
pub fn rate_producer(name: &str, cell: CellCoord, rate: f64) -> Well {
    Well::producer(
        name,
        [(cell, cell)],
        0.354,
        0.0,
        WellControl::ConstantRate { rate },
        produced_oil_water_gas(),
        true,
    )
    .expect("valid fixture producer")
}

/// A producer driving oil rate with a BHP floor.
pub fn adaptive_producer(name: &str, cell: CellCoord, target_rate: f64, bhp_limit: f64) -> Well {
    Well::producer(
        name,
        [(cell, cell)],
        0.354,
        0.0,
        WellControl::AdaptiveBhpRate {
            phase: Phase::Oil,
            target_rate,
            bhp_limit,
        },
        produced_oil_water_gas(),
        true,
    )
    .expect("valid fixture producer")
}

/// A producer driving oil with a water-cut clamp on the side phases.
pub fn clamped_producer(name: &str, cell: CellCoord, target_rate: f64, max_fraction: f64) -> Well {
    Well::producer(
        name,
        [(cell, cell)],
        0.354,
        0.0,
        WellControl::PrimaryPhaseRate {
            phase: Phase::Oil,
            control: PhaseRateControl {
                target_rate,
                bhp_limit: 100.0,
            },
            clamp: SecondaryClamp::FractionOfPrimary { max_fraction },
        },
        produced_oil_water_gas(),
        true,
    )
    .expect("valid fixture producer")
}

fn produced_oil_water_gas() -> Vec<ProducedFluid> {
    vec![
        ProducedFluid {
            name: "Oil".to_string(),
            phase: Phase::Oil,
            specific_gravity: 0.845,
            molecular_weight: 180.0,
        },
        ProducedFluid {
            name: "Gas".to_string(),
            phase: Phase::Gas,
            specific_gravity: 0.65,
            molecular_weight: darcy_core::constants::MOLECULAR_WEIGHT_CH4,
        },
        ProducedFluid {
            name: "Water".to_string(),
            phase: Phase::Water,
            specific_gravity: 1.05,
            molecular_weight: darcy_core::constants::MOLECULAR_WEIGHT_WATER,
        },
    ]
}
