//! Pressure-indexed PVT tables with monotone interpolation.

use crate::error::PvtError;

/// Interpolation scheme for table lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    /// Piecewise-linear between pressure nodes.
    Linear,
    /// Monotone cubic (Fritsch-Carlson limited tangents). Smoother than
    /// linear without overshooting, so monotone columns stay monotone.
    MonotoneCubic,
}

/// What a lookup does outside the tabulated pressure range.
///
/// The policy is explicit at table construction; there is no silent
/// extrapolation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extrapolation {
    /// Hold the boundary value (recommended).
    Clamp,
    /// Fail the lookup with [`PvtError::OutOfTableRange`].
    Strict,
}

/// One tabulated property column.
#[derive(Clone, Debug, PartialEq)]
struct Column {
    name: &'static str,
    values: Vec<f64>,
    /// Fritsch-Carlson tangents, built lazily only for cubic tables.
    tangents: Option<Vec<f64>>,
}

/// A pressure-indexed black-oil property table.
///
/// Columns: solution GOR, oil/gas/water formation volume factors and
/// viscosities, and phase compressibilities, all sampled at the same
/// strictly increasing pressure nodes. Built once, read-only for the
/// duration of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct PvtTable {
    pressure: Vec<f64>,
    columns: Vec<Column>,
    interpolation: Interpolation,
    extrapolation: Extrapolation,
}

/// Column identifiers for [`PvtTable::sample`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ColumnId {
    SolutionGor,
    OilFvf,
    OilViscosity,
    GasFvf,
    GasViscosity,
    WaterFvf,
    WaterViscosity,
    OilCompressibility,
    GasCompressibility,
    WaterCompressibility,
}

/// Raw column data for building a [`PvtTable`].
#[derive(Clone, Debug, Default)]
pub struct PvtTableColumns {
    /// Solution gas-oil ratio, scf/stb.
    pub solution_gor: Vec<f64>,
    /// Oil formation volume factor, rb/stb.
    pub oil_fvf: Vec<f64>,
    /// Oil viscosity, cP.
    pub oil_viscosity: Vec<f64>,
    /// Gas formation volume factor, rcf/scf.
    pub gas_fvf: Vec<f64>,
    /// Gas viscosity, cP.
    pub gas_viscosity: Vec<f64>,
    /// Water formation volume factor, rb/stb.
    pub water_fvf: Vec<f64>,
    /// Water viscosity, cP.
    pub water_viscosity: Vec<f64>,
    /// Oil compressibility, 1/psi.
    pub oil_compressibility: Vec<f64>,
    /// Gas compressibility, 1/psi.
    pub gas_compressibility: Vec<f64>,
    /// Water compressibility, 1/psi.
    pub water_compressibility: Vec<f64>,
}

impl PvtTable {
    /// Build a table, validating the pressure axis and every column.
    pub fn new(
        pressure: Vec<f64>,
        columns: PvtTableColumns,
        interpolation: Interpolation,
        extrapolation: Extrapolation,
    ) -> Result<Self, PvtError> {
        if pressure.len() < 2 {
            return Err(PvtError::TooFewRows {
                got: pressure.len(),
            });
        }
        for i in 1..pressure.len() {
            if !(pressure[i] > pressure[i - 1]) {
                return Err(PvtError::NonMonotonicPressure { index: i });
            }
        }
        let named: [(&'static str, Vec<f64>); 10] = [
            ("solution_gor", columns.solution_gor),
            ("oil_fvf", columns.oil_fvf),
            ("oil_viscosity", columns.oil_viscosity),
            ("gas_fvf", columns.gas_fvf),
            ("gas_viscosity", columns.gas_viscosity),
            ("water_fvf", columns.water_fvf),
            ("water_viscosity", columns.water_viscosity),
            ("oil_compressibility", columns.oil_compressibility),
            ("gas_compressibility", columns.gas_compressibility),
            ("water_compressibility", columns.water_compressibility),
        ];
        let mut built = Vec::with_capacity(named.len());
        for (name, values) in named {
            if values.len() != pressure.len() {
                return Err(PvtError::ColumnLength {
                    column: name,
                    got: values.len(),
                    expected: pressure.len(),
                });
            }
            for (row, v) in values.iter().enumerate() {
                if !v.is_finite() {
                    return Err(PvtError::NonFiniteValue { column: name, row });
                }
            }
            let tangents = match interpolation {
                Interpolation::Linear => None,
                Interpolation::MonotoneCubic => Some(monotone_tangents(&pressure, &values)),
            };
            built.push(Column {
                name,
                values,
                tangents,
            });
        }
        Ok(Self {
            pressure,
            columns: built,
            interpolation,
            extrapolation,
        })
    }

    /// The covered pressure range, psia.
    pub fn pressure_range(&self) -> (f64, f64) {
        (self.pressure[0], *self.pressure.last().expect("non-empty"))
    }

    /// The configured interpolation scheme.
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub(crate) fn sample(&self, column: ColumnId, p: f64) -> Result<f64, PvtError> {
        if !p.is_finite() || p <= 0.0 {
            return Err(PvtError::InvalidInput {
                reason: format!("pressure {p} must be finite and positive"),
            });
        }
        let (lo, hi) = self.pressure_range();
        let p = if p < lo || p > hi {
            match self.extrapolation {
                Extrapolation::Clamp => p.clamp(lo, hi),
                Extrapolation::Strict => {
                    return Err(PvtError::OutOfTableRange {
                        pressure: p,
                        range: (lo, hi),
                    })
                }
            }
        } else {
            p
        };
        let col = &self.columns[column as usize];
        debug_assert_eq!(self.column_name(column), col.name);
        Ok(self.interpolate(col, p))
    }

    fn column_name(&self, column: ColumnId) -> &'static str {
        match column {
            ColumnId::SolutionGor => "solution_gor",
            ColumnId::OilFvf => "oil_fvf",
            ColumnId::OilViscosity => "oil_viscosity",
            ColumnId::GasFvf => "gas_fvf",
            ColumnId::GasViscosity => "gas_viscosity",
            ColumnId::WaterFvf => "water_fvf",
            ColumnId::WaterViscosity => "water_viscosity",
            ColumnId::OilCompressibility => "oil_compressibility",
            ColumnId::GasCompressibility => "gas_compressibility",
            ColumnId::WaterCompressibility => "water_compressibility",
        }
    }

    fn interpolate(&self, col: &Column, p: f64) -> f64 {
        // Find the bracketing segment: pressure[i] <= p <= pressure[i+1].
        let i = match self
            .pressure
            .binary_search_by(|node| node.partial_cmp(&p).expect("finite"))
        {
            Ok(exact) => return col.values[exact],
            Err(insertion) => insertion.saturating_sub(1).min(self.pressure.len() - 2),
        };
        let (x0, x1) = (self.pressure[i], self.pressure[i + 1]);
        let (y0, y1) = (col.values[i], col.values[i + 1]);
        let h = x1 - x0;
        let t = (p - x0) / h;
        match &col.tangents {
            None => y0 + t * (y1 - y0),
            Some(m) => {
                // Cubic Hermite with Fritsch-Carlson limited tangents.
                let t2 = t * t;
                let t3 = t2 * t;
                let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
                let h10 = t3 - 2.0 * t2 + t;
                let h01 = -2.0 * t3 + 3.0 * t2;
                let h11 = t3 - t2;
                h00 * y0 + h10 * h * m[i] + h01 * y1 + h11 * h * m[i + 1]
            }
        }
    }
}

/// Fritsch-Carlson monotone tangents for cubic Hermite interpolation.
fn monotone_tangents(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut delta = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        delta.push((y[i + 1] - y[i]) / (x[i + 1] - x[i]));
    }
    let mut m = vec![0.0; n];
    m[0] = delta[0];
    m[n - 1] = delta[n - 2];
    for i in 1..n - 1 {
        if delta[i - 1] * delta[i] <= 0.0 {
            m[i] = 0.0;
        } else {
            m[i] = (delta[i - 1] + delta[i]) / 2.0;
        }
    }
    // Limit tangents so the interpolant cannot overshoot.
    for i in 0..n - 1 {
        if delta[i] == 0.0 {
            m[i] = 0.0;
            m[i + 1] = 0.0;
            continue;
        }
        let alpha = m[i] / delta[i];
        let beta = m[i + 1] / delta[i];
        let s = alpha * alpha + beta * beta;
        if s > 9.0 {
            let tau = 3.0 / s.sqrt();
            m[i] = tau * alpha * delta[i];
            m[i + 1] = tau * beta * delta[i];
        }
    }
    m
}
