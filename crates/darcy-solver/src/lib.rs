//! Sparse linear algebra for the Darcy pressure solve.
//!
//! A compressed-sparse-row matrix type ([`CsrMatrix`]), two Krylov
//! methods (BiCGSTAB and restarted GMRES), and a small preconditioner
//! family (diagonal and ILU(0)) with a caching wrapper that rebuilds on
//! a cadence or when matrix values drift, and is explicitly invalidated
//! when the system structure changes.
//!
//! Non-convergence is an outcome, not an error: [`solve`] reports it in
//! the [`SolveReport`] and the caller decides what a stalled solve means
//! (for the flow engine, a step rejection).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bicgstab;
pub mod csr;
pub mod error;
pub mod gmres;
pub mod precond;

pub use csr::{CsrMatrix, TripletBuilder};
pub use error::SolverError;
pub use precond::{CachedPreconditioner, Preconditioner, PreconditionerKind};

/// Which Krylov method solves the pressure system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearSolver {
    /// BiCGSTAB: general non-symmetric systems, low memory.
    BiCgStab,
    /// Restarted GMRES with the given Krylov subspace size.
    Gmres {
        /// Restart length (Krylov subspace dimension).
        restart: usize,
    },
}

/// Outcome of an iterative solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveReport {
    /// Whether the relative residual dropped below tolerance.
    pub converged: bool,
    /// Iterations performed.
    pub iterations: u32,
    /// Final relative residual norm.
    pub residual: f64,
}

/// Solve `A x = b` in place with the selected method and preconditioner.
///
/// `x` carries the initial guess in and the solution out. Convergence is
/// `‖b − Ax‖ / ‖b‖ < tolerance` within `max_iterations`. A breakdown in
/// the recurrence is reported as non-convergence.
pub fn solve(
    method: LinearSolver,
    matrix: &CsrMatrix,
    b: &[f64],
    x: &mut [f64],
    precond: &dyn Preconditioner,
    tolerance: f64,
    max_iterations: u32,
) -> Result<SolveReport, SolverError> {
    if b.len() != matrix.n() || x.len() != matrix.n() {
        return Err(SolverError::DimensionMismatch {
            matrix: matrix.n(),
            vector: b.len().min(x.len()),
        });
    }
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(SolverError::InvalidTolerance { value: tolerance });
    }
    Ok(match method {
        LinearSolver::BiCgStab => {
            bicgstab::solve(matrix, b, x, precond, tolerance, max_iterations)
        }
        LinearSolver::Gmres { restart } => {
            gmres::solve(matrix, b, x, precond, restart.max(1), tolerance, max_iterations)
        }
    })
}

/// Euclidean norm.
pub(crate) fn norm2(v: &[f64]) -> f64 {
    v.iter().map(|&a| a * a).sum::<f64>().sqrt()
}

/// Dot product.
pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&x, &y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precond::PreconditionerKind;

    /// 1D Laplacian with Dirichlet ends: tridiagonal (-1, 2, -1).
    fn laplacian(n: usize) -> CsrMatrix {
        let mut builder = TripletBuilder::new(n);
        for i in 0..n {
            builder.add(i, i, 2.0);
            if i > 0 {
                builder.add(i, i - 1, -1.0);
            }
            if i + 1 < n {
                builder.add(i, i + 1, -1.0);
            }
        }
        builder.build()
    }

    fn check_method(method: LinearSolver, kind: PreconditionerKind) {
        let n = 50;
        let a = laplacian(n);
        let x_true: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
        let mut b = vec![0.0; n];
        a.matvec(&x_true, &mut b);
        let precond = kind.build(&a).unwrap();
        let mut x = vec![0.0; n];
        let report = solve(method, &a, &b, &mut x, precond.as_ref(), 1.0e-10, 1000).unwrap();
        assert!(report.converged, "{method:?}/{kind:?}: {report:?}");
        for (xi, ti) in x.iter().zip(&x_true) {
            assert!((xi - ti).abs() < 1.0e-6, "{method:?}/{kind:?}: {xi} vs {ti}");
        }
    }

    #[test]
    fn bicgstab_solves_laplacian_all_preconditioners() {
        for kind in [
            PreconditionerKind::None,
            PreconditionerKind::Diagonal,
            PreconditionerKind::Ilu0,
        ] {
            check_method(LinearSolver::BiCgStab, kind);
        }
    }

    #[test]
    fn gmres_solves_laplacian_all_preconditioners() {
        for kind in [
            PreconditionerKind::None,
            PreconditionerKind::Diagonal,
            PreconditionerKind::Ilu0,
        ] {
            check_method(LinearSolver::Gmres { restart: 20 }, kind);
        }
    }

    #[test]
    fn iteration_budget_reported_as_non_convergence() {
        let n = 200;
        let a = laplacian(n);
        let b = vec![1.0; n];
        let mut x = vec![0.0; n];
        let precond = PreconditionerKind::None.build(&a).unwrap();
        let report = solve(
            LinearSolver::BiCgStab,
            &a,
            &b,
            &mut x,
            precond.as_ref(),
            1.0e-14,
            2,
        )
        .unwrap();
        assert!(!report.converged);
        assert!(report.iterations <= 2);
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let a = laplacian(10);
        let b = vec![1.0; 9];
        let mut x = vec![0.0; 10];
        let precond = PreconditionerKind::None.build(&a).unwrap();
        let result = solve(
            LinearSolver::BiCgStab,
            &a,
            &b,
            &mut x,
            precond.as_ref(),
            1.0e-8,
            100,
        );
        assert!(matches!(result, Err(SolverError::DimensionMismatch { .. })));
    }
}
