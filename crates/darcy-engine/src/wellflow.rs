//! Per-step well resolution against the current reservoir state.

use crate::properties::PropertyField;
use darcy_core::{PerPhase, Phase, RunError};
use darcy_grid::ReservoirModel;
use darcy_wells::{peaceman_well_index, ResolvedWell, Well, WellConditions, WellError, Wells};

/// One perforated cell with its geometric well index.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Perforation {
    /// Linear cell rank.
    pub rank: usize,
    /// Peaceman well index, ft³·cP/day/psi.
    pub well_index: f64,
}

/// Precomputed perforation geometry for every well, in collection
/// order (injectors first, then producers).
///
/// Geometry is static for a run, so the indices are computed once at
/// simulation construction — which also front-loads Peaceman validation
/// (bad radius or skin fails the build, not step 400).
pub(crate) fn well_indices(
    model: &ReservoirModel,
    wells: &Wells,
) -> Result<Vec<Vec<Perforation>>, WellError> {
    let shape = model.shape();
    let rock = model.rock();
    let mut all = Vec::new();
    for well in wells.iter() {
        well.validate_against(shape)?;
        let mut perforations = Vec::new();
        for coord in well.perforated_cells() {
            let rank = shape.rank(coord);
            if !model.is_active(rank) {
                continue;
            }
            let well_index = peaceman_well_index(
                well.name(),
                rock.absolute_permeability.x.at(rank),
                rock.absolute_permeability.y.at(rank),
                shape.dx(),
                shape.dy(),
                model.thickness().at(rank),
                rock.net_to_gross.at(rank),
                well.radius(),
                well.skin_factor(),
            )?;
            if well_index > 0.0 {
                perforations.push(Perforation { rank, well_index });
            }
        }
        all.push(perforations);
    }
    Ok(all)
}

/// A well resolved for the current step, ready for assembly.
pub(crate) struct ActiveWell<'w> {
    /// The well.
    pub well: &'w Well,
    /// Its active perforations.
    pub perforations: &'w [Perforation],
    /// The resolved operating point.
    pub resolved: ResolvedWell,
    /// The injected phase, `None` for producers.
    pub injected_phase: Option<Phase>,
}

/// Resolve every active well's control into an operating point.
///
/// Inactive wells and wells with no flowing perforation are excluded
/// entirely — they contribute no source/sink term and no equation
/// coupling.
pub(crate) fn resolve_wells<'w>(
    model: &ReservoirModel,
    props: &PropertyField,
    wells: &'w Wells,
    indices: &'w [Vec<Perforation>],
) -> Result<Vec<ActiveWell<'w>>, RunError> {
    let mut active = Vec::new();
    for (well, perforations) in wells.iter().zip(indices) {
        if !well.is_active() || perforations.is_empty() {
            continue;
        }
        let injected_phase = well.kind().injected_phase();

        let mut pressure_sum = 0.0;
        let mut injectivity = PerPhase::ZERO;
        for perf in perforations {
            pressure_sum += model.fluid().pressure.at(perf.rank);
            match injected_phase {
                // Injectivity against the full mobile system for the
                // injected phase.
                Some(phase) => {
                    injectivity[phase] += perf.well_index * props.total_mobility(perf.rank);
                }
                None => {
                    injectivity.oil += perf.well_index * props.mobility_oil[perf.rank];
                    injectivity.water += perf.well_index * props.mobility_water[perf.rank];
                    injectivity.gas += perf.well_index * props.mobility_gas[perf.rank];
                }
            }
        }
        let conditions = WellConditions {
            average_pressure: pressure_sum / perforations.len() as f64,
            injectivity,
        };
        let resolved = well.control().resolve(&conditions, injected_phase);
        if !resolved.bhp.is_finite() {
            return Err(RunError::InvalidState {
                reason: format!("well '{}' resolved a non-finite BHP", well.name()),
            });
        }
        active.push(ActiveWell {
            well,
            perforations,
            resolved,
            injected_phase,
        });
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Miscibility;
    use crate::properties;
    use darcy_test_utils::{
        adaptive_producer, rate_producer, standard_tables, uniform_model, water_injector,
    };
    use darcy_wells::WellMode;

    fn props_for(model: &ReservoirModel) -> PropertyField {
        properties::evaluate(
            model,
            &standard_tables(),
            &darcy_test_utils::correlation_pvt(),
            properties::miscible_blend(Miscibility::Immiscible, &Wells::default()),
        )
        .unwrap()
    }

    #[test]
    fn inactive_wells_are_excluded() {
        let model = uniform_model((4, 4, 1));
        let mut producer = rate_producer("P-1", (3, 3, 0), -500.0);
        producer.set_active(false);
        let wells = Wells::new(vec![water_injector("I-1", (0, 0, 0), 500.0)], vec![producer])
            .unwrap();
        let indices = well_indices(&model, &wells).unwrap();
        let props = props_for(&model);
        let active = resolve_wells(&model, &props, &wells, &indices).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].well.name(), "I-1");
    }

    #[test]
    fn producer_resolves_against_average_pressure() {
        let model = uniform_model((3, 3, 1));
        let wells = Wells::new(vec![], vec![adaptive_producer("P-1", (1, 1, 0), -300.0, 800.0)])
            .unwrap();
        let indices = well_indices(&model, &wells).unwrap();
        let props = props_for(&model);
        let active = resolve_wells(&model, &props, &wells, &indices).unwrap();
        assert_eq!(active.len(), 1);
        let resolved = &active[0].resolved;
        // Plenty of pressure headroom at 3000 psia: target is met.
        assert_eq!(resolved.mode, WellMode::RateTarget);
        assert_eq!(resolved.rates.oil, -300.0);
        assert!(resolved.bhp < 3000.0 && resolved.bhp > 800.0);
    }

    #[test]
    fn well_geometry_validated_at_index_build() {
        let model = uniform_model((2, 2, 1));
        let wells = Wells::new(vec![], vec![rate_producer("P-1", (5, 5, 0), -100.0)]).unwrap();
        assert!(matches!(
            well_indices(&model, &wells),
            Err(WellError::PerforationOutOfGrid { .. })
        ));
    }
}
