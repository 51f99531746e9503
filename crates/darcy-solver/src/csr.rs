//! Compressed-sparse-row matrix storage and assembly.

use crate::error::SolverError;

/// Accumulating triplet builder for [`CsrMatrix`].
///
/// Repeated `(row, col)` entries sum, which is what finite-volume
/// assembly wants: transmissibility, accumulation, well, and boundary
/// contributions each add into the same positions independently.
#[derive(Clone, Debug)]
pub struct TripletBuilder {
    n: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl TripletBuilder {
    /// Builder for an `n × n` matrix.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            entries: Vec::new(),
        }
    }

    /// Add `value` at `(row, col)`, summing with any prior entry there.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.n && col < self.n);
        self.entries.push((row, col, value));
    }

    /// Add with bounds checking, for callers assembling from
    /// externally supplied indices.
    pub fn try_add(&mut self, row: usize, col: usize, value: f64) -> Result<(), SolverError> {
        for index in [row, col] {
            if index >= self.n {
                return Err(SolverError::IndexOutOfBounds { index, n: self.n });
            }
        }
        self.entries.push((row, col, value));
        Ok(())
    }

    /// Finalize into CSR form: sort, merge duplicates, build row
    /// pointers.
    pub fn build(mut self) -> CsrMatrix {
        self.entries
            .sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        let mut row_ptr = vec![0usize; self.n + 1];
        let mut col_idx = Vec::with_capacity(self.entries.len());
        let mut values = Vec::with_capacity(self.entries.len());
        let mut prev: Option<(usize, usize)> = None;
        for (row, col, value) in self.entries {
            if prev == Some((row, col)) {
                *values.last_mut().expect("entry exists") += value;
            } else {
                col_idx.push(col);
                values.push(value);
                row_ptr[row + 1] += 1;
                prev = Some((row, col));
            }
        }
        // Prefix-sum the per-row counts into offsets.
        for r in 0..self.n {
            row_ptr[r + 1] += row_ptr[r];
        }
        CsrMatrix {
            n: self.n,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// A square sparse matrix in compressed-sparse-row form.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Matrix dimension.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// One row's `(columns, values)` slices.
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[range.clone()], &self.values[range])
    }

    /// `y = A x`.
    pub fn matvec(&self, x: &[f64], y: &mut [f64]) {
        debug_assert_eq!(x.len(), self.n);
        debug_assert_eq!(y.len(), self.n);
        for i in 0..self.n {
            let (cols, vals) = self.row(i);
            let mut sum = 0.0;
            for (&j, &v) in cols.iter().zip(vals) {
                sum += v * x[j];
            }
            y[i] = sum;
        }
    }

    /// The main diagonal, zero where no entry is stored.
    pub fn diagonal(&self) -> Vec<f64> {
        let mut diag = vec![0.0; self.n];
        for i in 0..self.n {
            let (cols, vals) = self.row(i);
            if let Ok(pos) = cols.binary_search(&i) {
                diag[i] = vals[pos];
            }
        }
        diag
    }

    /// Raw stored values, for drift comparison by the preconditioner
    /// cache.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether `other` shares this matrix's sparsity pattern.
    pub fn same_pattern(&self, other: &CsrMatrix) -> bool {
        self.n == other.n && self.row_ptr == other.row_ptr && self.col_idx == other.col_idx
    }

    /// Relative L2 drift of stored values against `other`.
    ///
    /// Defined only for matrices with the same pattern; differing
    /// patterns report infinite drift so caches always rebuild.
    pub fn value_drift(&self, other: &CsrMatrix) -> f64 {
        if !self.same_pattern(other) {
            return f64::INFINITY;
        }
        let mut diff = 0.0;
        let mut base = 0.0;
        for (a, b) in self.values.iter().zip(&other.values) {
            diff += (a - b) * (a - b);
            base += b * b;
        }
        if base == 0.0 {
            if diff == 0.0 {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            (diff / base).sqrt()
        }
    }

    pub(crate) fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub(crate) fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }
}
