//! Well identity, geometry, and the [`Wells`] collection.

use crate::control::WellControl;
use crate::error::WellError;
use crate::fluid::{InjectedFluid, ProducedFluid};
use darcy_core::{CellCoord, Phase};
use darcy_grid::GridShape;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// One contiguous perforated block of cells, inclusive corners.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PerforationInterval {
    /// Lower corner `(i, j, k)`.
    pub start: CellCoord,
    /// Upper corner `(i, j, k)`, inclusive.
    pub end: CellCoord,
}

impl PerforationInterval {
    /// Iterate every perforated coordinate in the interval.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let (i0, j0, k0) = self.start;
        let (i1, j1, k1) = self.end;
        (k0..=k1).flat_map(move |k| (j0..=j1).flat_map(move |j| (i0..=i1).map(move |i| (i, j, k))))
    }
}

/// What a well does: inject one fluid or produce several.
#[derive(Clone, Debug, PartialEq)]
pub enum WellKind {
    /// Injection well carrying its injected-fluid descriptor.
    Injector(InjectedFluid),
    /// Production well reporting zero or more produced fluids.
    Producer(Vec<ProducedFluid>),
}

impl WellKind {
    /// The injected phase, if this is an injector.
    pub fn injected_phase(&self) -> Option<Phase> {
        match self {
            Self::Injector(fluid) => Some(fluid.phase),
            Self::Producer(_) => None,
        }
    }
}

/// A well: identity, perforation geometry, and operating control.
#[derive(Clone, Debug, PartialEq)]
pub struct Well {
    name: String,
    intervals: SmallVec<[PerforationInterval; 2]>,
    radius: f64,
    skin_factor: f64,
    is_active: bool,
    kind: WellKind,
    control: WellControl,
}

impl Well {
    /// Build an injection well.
    pub fn injector(
        name: impl Into<String>,
        intervals: impl IntoIterator<Item = (CellCoord, CellCoord)>,
        radius: f64,
        skin_factor: f64,
        control: WellControl,
        injected_fluid: InjectedFluid,
        is_active: bool,
    ) -> Result<Self, WellError> {
        injected_fluid.validate()?;
        control.validate(false)?;
        Self::build(
            name.into(),
            intervals,
            radius,
            skin_factor,
            is_active,
            WellKind::Injector(injected_fluid),
            control,
        )
    }

    /// Build a production well.
    pub fn producer(
        name: impl Into<String>,
        intervals: impl IntoIterator<Item = (CellCoord, CellCoord)>,
        radius: f64,
        skin_factor: f64,
        control: WellControl,
        produced_fluids: Vec<ProducedFluid>,
        is_active: bool,
    ) -> Result<Self, WellError> {
        for fluid in &produced_fluids {
            fluid.validate()?;
        }
        control.validate(true)?;
        Self::build(
            name.into(),
            intervals,
            radius,
            skin_factor,
            is_active,
            WellKind::Producer(produced_fluids),
            control,
        )
    }

    fn build(
        name: String,
        intervals: impl IntoIterator<Item = (CellCoord, CellCoord)>,
        radius: f64,
        skin_factor: f64,
        is_active: bool,
        kind: WellKind,
        control: WellControl,
    ) -> Result<Self, WellError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(WellError::InvalidRadius { well: name, radius });
        }
        let mut built: SmallVec<[PerforationInterval; 2]> = SmallVec::new();
        for (start, end) in intervals {
            if start.0 > end.0 || start.1 > end.1 || start.2 > end.2 {
                return Err(WellError::ReversedInterval {
                    well: name.clone(),
                    start,
                    end,
                });
            }
            built.push(PerforationInterval { start, end });
        }
        if built.is_empty() {
            return Err(WellError::NoPerforations { well: name });
        }
        Ok(Self {
            name,
            intervals: built,
            radius,
            skin_factor,
            is_active,
            kind,
            control,
        })
    }

    /// Check every perforation lies inside `shape`.
    pub fn validate_against(&self, shape: GridShape) -> Result<(), WellError> {
        for interval in &self.intervals {
            for coord in [interval.start, interval.end] {
                if !shape.contains(coord) {
                    return Err(WellError::PerforationOutOfGrid {
                        well: self.name.clone(),
                        coord,
                    });
                }
            }
        }
        Ok(())
    }

    /// Well name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Perforated intervals.
    pub fn intervals(&self) -> &[PerforationInterval] {
        &self.intervals
    }

    /// Every perforated cell coordinate, interval by interval.
    pub fn perforated_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.intervals.iter().flat_map(|iv| iv.cells())
    }

    /// Wellbore radius, ft.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Skin factor, dimensionless.
    pub fn skin_factor(&self) -> f64 {
        self.skin_factor
    }

    /// Whether the well currently operates.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Activate or deactivate the well.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Injector or producer, with its fluid descriptors.
    pub fn kind(&self) -> &WellKind {
        &self.kind
    }

    /// The operating control.
    pub fn control(&self) -> &WellControl {
        &self.control
    }

    /// Replace the operating control (used by well schedules).
    pub fn set_control(&mut self, control: WellControl) -> Result<(), WellError> {
        control.validate(matches!(self.kind, WellKind::Producer(_)))?;
        self.control = control;
        Ok(())
    }
}

/// The wells collection: injectors and producers with unique names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wells {
    injectors: Vec<Well>,
    producers: Vec<Well>,
    by_name: IndexMap<String, (bool, usize)>,
}

impl Wells {
    /// Assemble a collection, rejecting duplicate names.
    pub fn new(injectors: Vec<Well>, producers: Vec<Well>) -> Result<Self, WellError> {
        let mut by_name = IndexMap::new();
        for (idx, well) in injectors.iter().enumerate() {
            if by_name.insert(well.name.clone(), (true, idx)).is_some() {
                return Err(WellError::DuplicateName {
                    name: well.name.clone(),
                });
            }
        }
        for (idx, well) in producers.iter().enumerate() {
            if by_name.insert(well.name.clone(), (false, idx)).is_some() {
                return Err(WellError::DuplicateName {
                    name: well.name.clone(),
                });
            }
        }
        Ok(Self {
            injectors,
            producers,
            by_name,
        })
    }

    /// Check every well's perforations against the grid.
    pub fn validate_against(&self, shape: GridShape) -> Result<(), WellError> {
        for well in self.iter() {
            well.validate_against(shape)?;
        }
        Ok(())
    }

    /// Injection wells.
    pub fn injectors(&self) -> &[Well] {
        &self.injectors
    }

    /// Production wells.
    pub fn producers(&self) -> &[Well] {
        &self.producers
    }

    /// All wells, injectors first.
    pub fn iter(&self) -> impl Iterator<Item = &Well> {
        self.injectors.iter().chain(self.producers.iter())
    }

    /// Whether any well exists at all.
    pub fn exists(&self) -> bool {
        !self.injectors.is_empty() || !self.producers.is_empty()
    }

    /// Look up a well by name.
    pub fn get(&self, name: &str) -> Option<&Well> {
        let &(is_injector, idx) = self.by_name.get(name)?;
        Some(if is_injector {
            &self.injectors[idx]
        } else {
            &self.producers[idx]
        })
    }

    /// Look up a well mutably by name (used by well schedules).
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Well> {
        let &(is_injector, idx) = self.by_name.get(name)?;
        Some(if is_injector {
            &mut self.injectors[idx]
        } else {
            &mut self.producers[idx]
        })
    }
}
