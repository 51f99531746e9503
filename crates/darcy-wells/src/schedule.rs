//! Time-triggered well events.

use crate::control::WellControl;
use crate::error::WellError;
use crate::well::Wells;
use darcy_core::Time;
use indexmap::IndexMap;

/// What a scheduled event does to its well.
#[derive(Clone, Debug, PartialEq)]
pub enum WellAction {
    /// Activate or deactivate the well.
    SetActive(bool),
    /// Replace the well's operating control.
    SetControl(WellControl),
}

/// One event: fire once when simulation time reaches `at`.
#[derive(Clone, Debug, PartialEq)]
pub struct WellEvent {
    /// Simulation time the event fires at.
    pub at: Time,
    /// The action applied to the well.
    pub action: WellAction,
}

/// An ordered series of events for one well.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WellSchedule {
    events: Vec<WellEvent>,
}

impl WellSchedule {
    /// Empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event, keeping the series sorted by firing time.
    pub fn add(&mut self, event: WellEvent) {
        let pos = self
            .events
            .partition_point(|e| e.at.seconds() <= event.at.seconds());
        self.events.insert(pos, event);
    }

    /// Events firing in the half-open window `(after, up_to]` seconds.
    pub fn due(&self, after: f64, up_to: f64) -> impl Iterator<Item = &WellEvent> {
        self.events
            .iter()
            .filter(move |e| e.at.seconds() > after && e.at.seconds() <= up_to)
    }
}

/// Schedules for a wells collection, keyed by well name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WellSchedules {
    schedules: IndexMap<String, WellSchedule>,
}

impl WellSchedules {
    /// Empty schedule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach (or extend) a schedule for one well.
    pub fn add(&mut self, well_name: impl Into<String>, schedule: WellSchedule) {
        let entry = self.schedules.entry(well_name.into()).or_default();
        for event in schedule.events {
            entry.add(event);
        }
    }

    /// Whether any schedule is registered.
    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }

    /// Check every scheduled well name exists in the collection.
    pub fn validate_against(&self, wells: &Wells) -> Result<(), WellError> {
        for name in self.schedules.keys() {
            if wells.get(name).is_none() {
                return Err(WellError::InvalidControl {
                    reason: format!("schedule references unknown well '{name}'"),
                });
            }
        }
        Ok(())
    }

    /// Apply every event due in `(after, up_to]` seconds to the wells.
    ///
    /// Events apply in firing order per well. A control replacement that
    /// fails validation (wrong sign for the well kind) surfaces as a
    /// [`WellError`] — a configuration mistake, not a runtime condition.
    pub fn apply_due(&self, wells: &mut Wells, after: f64, up_to: f64) -> Result<(), WellError> {
        for (name, schedule) in &self.schedules {
            for event in schedule.due(after, up_to) {
                let well = wells.get_mut(name).expect("validated against wells");
                match &event.action {
                    WellAction::SetActive(active) => well.set_active(*active),
                    WellAction::SetControl(control) => well.set_control(control.clone())?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::InjectedFluid;
    use crate::well::Well;
    use darcy_core::Phase;

    fn wells() -> Wells {
        let injector = Well::injector(
            "I-1",
            [((0, 0, 0), (0, 0, 0))],
            0.354,
            0.0,
            WellControl::ConstantRate { rate: 500.0 },
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
            },
            false,
        )
        .unwrap();
        Wells::new(vec![injector], vec![]).unwrap()
    }

    #[test]
    fn events_fire_once_in_their_window() {
        let mut schedule = WellSchedule::new();
        schedule.add(WellEvent {
            at: Time::days(100.0),
            action: WellAction::SetActive(true),
        });
        let mut schedules = WellSchedules::new();
        schedules.add("I-1", schedule);

        let mut wells = wells();
        schedules.validate_against(&wells).unwrap();

        // Window before the event: nothing happens.
        schedules
            .apply_due(&mut wells, 0.0, Time::days(99.0).seconds())
            .unwrap();
        assert!(!wells.get("I-1").unwrap().is_active());

        // Window covering day 100: the well opens.
        schedules
            .apply_due(
                &mut wells,
                Time::days(99.0).seconds(),
                Time::days(101.0).seconds(),
            )
            .unwrap();
        assert!(wells.get("I-1").unwrap().is_active());
    }

    #[test]
    fn schedule_for_unknown_well_rejected() {
        let mut schedules = WellSchedules::new();
        schedules.add("ghost", WellSchedule::new());
        assert!(schedules.validate_against(&wells()).is_err());
    }

    #[test]
    fn control_replacement_validates_sign() {
        let mut schedule = WellSchedule::new();
        schedule.add(WellEvent {
            at: Time::days(1.0),
            action: WellAction::SetControl(WellControl::ConstantRate { rate: -100.0 }),
        });
        let mut schedules = WellSchedules::new();
        schedules.add("I-1", schedule);
        let mut wells = wells();
        // Production-signed rate on an injector: configuration mistake.
        let result = schedules.apply_due(&mut wells, 0.0, Time::days(2.0).seconds());
        assert!(matches!(result, Err(WellError::InvalidControl { .. })));
    }
}
