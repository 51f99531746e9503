//! Preconditioners and the caching wrapper.

use crate::csr::CsrMatrix;
use crate::error::SolverError;
use std::fmt;

/// A left preconditioner: `z ≈ M⁻¹ r`.
pub trait Preconditioner: Send {
    /// Apply the preconditioner to `r`, writing into `z`.
    fn apply(&self, r: &[f64], z: &mut [f64]);

    /// Name, for diagnostics.
    fn name(&self) -> &'static str;
}

impl fmt::Debug for dyn Preconditioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Preconditioner({})", self.name())
    }
}

/// The selectable preconditioner family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreconditionerKind {
    /// Identity: no preconditioning.
    None,
    /// Diagonal (Jacobi) scaling.
    Diagonal,
    /// Incomplete LU with zero fill-in.
    Ilu0,
}

impl PreconditionerKind {
    /// Build a preconditioner for `matrix`.
    pub fn build(&self, matrix: &CsrMatrix) -> Result<Box<dyn Preconditioner>, SolverError> {
        Ok(match self {
            Self::None => Box::new(Identity),
            Self::Diagonal => Box::new(Jacobi::new(matrix)?),
            Self::Ilu0 => Box::new(Ilu0::new(matrix)?),
        })
    }
}

/// Identity preconditioner.
struct Identity;

impl Preconditioner for Identity {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        z.copy_from_slice(r);
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Jacobi (diagonal) preconditioner.
struct Jacobi {
    inv_diag: Vec<f64>,
}

impl Jacobi {
    fn new(matrix: &CsrMatrix) -> Result<Self, SolverError> {
        let diag = matrix.diagonal();
        let mut inv_diag = Vec::with_capacity(diag.len());
        for (row, d) in diag.iter().enumerate() {
            if *d == 0.0 {
                return Err(SolverError::ZeroDiagonal { row });
            }
            inv_diag.push(1.0 / d);
        }
        Ok(Self { inv_diag })
    }
}

impl Preconditioner for Jacobi {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        for i in 0..r.len() {
            z[i] = r[i] * self.inv_diag[i];
        }
    }

    fn name(&self) -> &'static str {
        "diagonal"
    }
}

/// ILU(0): incomplete LU factorization on the matrix's own sparsity
/// pattern. L carries a unit diagonal; L and U share the pattern's
/// storage.
struct Ilu0 {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
    diag_pos: Vec<usize>,
}

impl Ilu0 {
    fn new(matrix: &CsrMatrix) -> Result<Self, SolverError> {
        let n = matrix.n();
        let row_ptr = matrix.row_ptr().to_vec();
        let col_idx = matrix.col_idx().to_vec();
        let mut values = matrix.values().to_vec();

        // Locate diagonal positions up front.
        let mut diag_pos = vec![usize::MAX; n];
        for i in 0..n {
            for pos in row_ptr[i]..row_ptr[i + 1] {
                if col_idx[pos] == i {
                    diag_pos[i] = pos;
                }
            }
            if diag_pos[i] == usize::MAX {
                return Err(SolverError::ZeroDiagonal { row: i });
            }
        }

        // IKJ-ordered factorization restricted to the existing pattern.
        let mut col_of_row = vec![usize::MAX; n];
        for i in 0..n {
            // Scatter row i's column positions.
            for pos in row_ptr[i]..row_ptr[i + 1] {
                col_of_row[col_idx[pos]] = pos;
            }
            for pos in row_ptr[i]..row_ptr[i + 1] {
                let k = col_idx[pos];
                if k >= i {
                    break;
                }
                let u_kk = values[diag_pos[k]];
                if u_kk == 0.0 {
                    return Err(SolverError::ZeroDiagonal { row: k });
                }
                let l_ik = values[pos] / u_kk;
                values[pos] = l_ik;
                // Eliminate using row k's upper part, staying in-pattern.
                for k_pos in diag_pos[k] + 1..row_ptr[k + 1] {
                    let j = col_idx[k_pos];
                    let target = col_of_row[j];
                    if target != usize::MAX {
                        values[target] -= l_ik * values[k_pos];
                    }
                }
            }
            if values[diag_pos[i]] == 0.0 {
                return Err(SolverError::ZeroDiagonal { row: i });
            }
            // Gather (reset scatter map).
            for pos in row_ptr[i]..row_ptr[i + 1] {
                col_of_row[col_idx[pos]] = usize::MAX;
            }
        }

        Ok(Self {
            n,
            row_ptr,
            col_idx,
            values,
            diag_pos,
        })
    }
}

impl Preconditioner for Ilu0 {
    fn apply(&self, r: &[f64], z: &mut [f64]) {
        // Forward solve L y = r (unit diagonal), in place in z.
        for i in 0..self.n {
            let mut sum = r[i];
            for pos in self.row_ptr[i]..self.diag_pos[i] {
                sum -= self.values[pos] * z[self.col_idx[pos]];
            }
            z[i] = sum;
        }
        // Backward solve U z = y.
        for i in (0..self.n).rev() {
            let mut sum = z[i];
            for pos in self.diag_pos[i] + 1..self.row_ptr[i + 1] {
                sum -= self.values[pos] * z[self.col_idx[pos]];
            }
            z[i] = sum / self.values[self.diag_pos[i]];
        }
    }

    fn name(&self) -> &'static str {
        "ilu0"
    }
}

/// Caching wrapper around preconditioner construction.
///
/// Rebuilding an ILU factorization every step is wasted work when the
/// matrix barely moves. The cache rebuilds on a fixed cadence
/// (`update_frequency` solves) or early when the matrix's stored values
/// drift past `recompute_threshold` relative L2 distance — and must be
/// [`invalidate`](CachedPreconditioner::invalidate)d whenever well
/// configuration or active-cell topology changes the system structure.
pub struct CachedPreconditioner {
    kind: PreconditionerKind,
    update_frequency: u32,
    recompute_threshold: f64,
    cached: Option<Box<dyn Preconditioner>>,
    reference: Option<CsrMatrix>,
    solves_since_build: u32,
    rebuilds: u64,
}

impl CachedPreconditioner {
    /// Wrap `kind` with a rebuild cadence and drift threshold.
    pub fn new(kind: PreconditionerKind, update_frequency: u32, recompute_threshold: f64) -> Self {
        Self {
            kind,
            update_frequency: update_frequency.max(1),
            recompute_threshold,
            cached: None,
            reference: None,
            solves_since_build: 0,
            rebuilds: 0,
        }
    }

    /// The wrapped preconditioner kind.
    pub fn kind(&self) -> PreconditionerKind {
        self.kind
    }

    /// How many times the factorization has been (re)built.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Drop the cached factorization. Call when the matrix structure
    /// changes (well on/off, active-cell topology).
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.reference = None;
        self.solves_since_build = 0;
    }

    /// Get a preconditioner for `matrix`, rebuilding if the cache is
    /// cold, stale, or drifted.
    pub fn get(&mut self, matrix: &CsrMatrix) -> Result<&dyn Preconditioner, SolverError> {
        let needs_rebuild = match (&self.cached, &self.reference) {
            (Some(_), Some(reference)) => {
                self.solves_since_build >= self.update_frequency
                    || matrix.value_drift(reference) > self.recompute_threshold
            }
            _ => true,
        };
        if needs_rebuild {
            self.cached = Some(self.kind.build(matrix)?);
            self.reference = Some(matrix.clone());
            self.solves_since_build = 0;
            self.rebuilds += 1;
        }
        self.solves_since_build += 1;
        Ok(self.cached.as_deref().expect("just built"))
    }
}

impl fmt::Debug for CachedPreconditioner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedPreconditioner")
            .field("kind", &self.kind)
            .field("update_frequency", &self.update_frequency)
            .field("recompute_threshold", &self.recompute_threshold)
            .field("cached", &self.cached.is_some())
            .field("rebuilds", &self.rebuilds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csr::TripletBuilder;

    fn tridiag(n: usize, diag: f64) -> CsrMatrix {
        let mut b = TripletBuilder::new(n);
        for i in 0..n {
            b.add(i, i, diag);
            if i > 0 {
                b.add(i, i - 1, -1.0);
            }
            if i + 1 < n {
                b.add(i, i + 1, -1.0);
            }
        }
        b.build()
    }

    #[test]
    fn jacobi_inverts_diagonal() {
        let a = tridiag(4, 2.0);
        let p = PreconditionerKind::Diagonal.build(&a).unwrap();
        let r = vec![2.0, 4.0, 6.0, 8.0];
        let mut z = vec![0.0; 4];
        p.apply(&r, &mut z);
        assert_eq!(z, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn ilu0_is_exact_for_triangular_free_pattern() {
        // For a tridiagonal matrix ILU(0) equals full LU, so applying
        // M⁻¹ to A·x must recover x exactly.
        let a = tridiag(6, 3.0);
        let p = PreconditionerKind::Ilu0.build(&a).unwrap();
        let x = vec![1.0, -2.0, 0.5, 3.0, -1.0, 2.0];
        let mut ax = vec![0.0; 6];
        a.matvec(&x, &mut ax);
        let mut z = vec![0.0; 6];
        p.apply(&ax, &mut z);
        for (zi, xi) in z.iter().zip(&x) {
            assert!((zi - xi).abs() < 1.0e-12, "{zi} vs {xi}");
        }
    }

    #[test]
    fn missing_diagonal_rejected() {
        let mut b = TripletBuilder::new(2);
        b.add(0, 1, 1.0);
        b.add(1, 0, 1.0);
        let a = b.build();
        assert!(matches!(
            PreconditionerKind::Ilu0.build(&a),
            Err(SolverError::ZeroDiagonal { .. })
        ));
        assert!(matches!(
            PreconditionerKind::Diagonal.build(&a),
            Err(SolverError::ZeroDiagonal { .. })
        ));
    }

    #[test]
    fn cache_rebuilds_on_cadence() {
        let a = tridiag(4, 2.0);
        let mut cache = CachedPreconditioner::new(PreconditionerKind::Diagonal, 3, 0.5);
        for _ in 0..3 {
            cache.get(&a).unwrap();
        }
        assert_eq!(cache.rebuild_count(), 1);
        // Fourth solve crosses the cadence.
        cache.get(&a).unwrap();
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn cache_rebuilds_on_drift() {
        let a = tridiag(4, 2.0);
        let mut cache = CachedPreconditioner::new(PreconditionerKind::Diagonal, 100, 0.1);
        cache.get(&a).unwrap();
        assert_eq!(cache.rebuild_count(), 1);
        // Small drift: below threshold, cache holds.
        let nearly = tridiag(4, 2.001);
        cache.get(&nearly).unwrap();
        assert_eq!(cache.rebuild_count(), 1);
        // Large drift: rebuild.
        let far = tridiag(4, 4.0);
        cache.get(&far).unwrap();
        assert_eq!(cache.rebuild_count(), 2);
    }

    #[test]
    fn invalidate_forces_rebuild() {
        let a = tridiag(4, 2.0);
        let mut cache = CachedPreconditioner::new(PreconditionerKind::Ilu0, 100, 0.5);
        cache.get(&a).unwrap();
        cache.invalidate();
        cache.get(&a).unwrap();
        assert_eq!(cache.rebuild_count(), 2);
    }
}
