//! Preconditioned BiCGSTAB.

use crate::csr::CsrMatrix;
use crate::precond::Preconditioner;
use crate::{dot, norm2, SolveReport};

/// Recurrence scalars below this magnitude (relative) are a breakdown.
const BREAKDOWN: f64 = 1.0e-30;

/// Solve `A x = b` with right-preconditioned BiCGSTAB.
///
/// `x` carries the initial guess in and the best iterate out. Breakdown
/// of the recurrence (ρ or ω collapsing) is reported as non-convergence
/// with the residual at the point of failure.
pub fn solve(
    a: &CsrMatrix,
    b: &[f64],
    x: &mut [f64],
    precond: &dyn Preconditioner,
    tolerance: f64,
    max_iterations: u32,
) -> SolveReport {
    let n = a.n();
    let b_norm = norm2(b);
    if b_norm == 0.0 {
        x.fill(0.0);
        return SolveReport {
            converged: true,
            iterations: 0,
            residual: 0.0,
        };
    }

    let mut r = vec![0.0; n];
    a.matvec(x, &mut r);
    for i in 0..n {
        r[i] = b[i] - r[i];
    }
    let r_hat = r.clone();
    let mut residual = norm2(&r) / b_norm;
    if residual < tolerance {
        return SolveReport {
            converged: true,
            iterations: 0,
            residual,
        };
    }

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;
    let mut p = vec![0.0; n];
    let mut v = vec![0.0; n];
    let mut p_hat = vec![0.0; n];
    let mut s = vec![0.0; n];
    let mut s_hat = vec![0.0; n];
    let mut t = vec![0.0; n];

    for iteration in 1..=max_iterations {
        let rho_next = dot(&r_hat, &r);
        if rho_next.abs() < BREAKDOWN * b_norm * b_norm {
            return SolveReport {
                converged: false,
                iterations: iteration - 1,
                residual,
            };
        }
        let beta = (rho_next / rho) * (alpha / omega);
        rho = rho_next;
        for i in 0..n {
            p[i] = r[i] + beta * (p[i] - omega * v[i]);
        }
        precond.apply(&p, &mut p_hat);
        a.matvec(&p_hat, &mut v);
        let denom = dot(&r_hat, &v);
        if denom.abs() < BREAKDOWN * b_norm * b_norm {
            return SolveReport {
                converged: false,
                iterations: iteration - 1,
                residual,
            };
        }
        alpha = rho / denom;
        for i in 0..n {
            s[i] = r[i] - alpha * v[i];
        }
        residual = norm2(&s) / b_norm;
        if residual < tolerance {
            for i in 0..n {
                x[i] += alpha * p_hat[i];
            }
            return SolveReport {
                converged: true,
                iterations: iteration,
                residual,
            };
        }
        precond.apply(&s, &mut s_hat);
        a.matvec(&s_hat, &mut t);
        let tt = dot(&t, &t);
        if tt.abs() < BREAKDOWN {
            return SolveReport {
                converged: false,
                iterations: iteration,
                residual,
            };
        }
        omega = dot(&t, &s) / tt;
        if omega.abs() < BREAKDOWN {
            return SolveReport {
                converged: false,
                iterations: iteration,
                residual,
            };
        }
        for i in 0..n {
            x[i] += alpha * p_hat[i] + omega * s_hat[i];
            r[i] = s[i] - omega * t[i];
        }
        residual = norm2(&r) / b_norm;
        if residual < tolerance {
            return SolveReport {
                converged: true,
                iterations: iteration,
                residual,
            };
        }
    }

    SolveReport {
        converged: false,
        iterations: max_iterations,
        residual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csr::TripletBuilder;
    use crate::precond::PreconditionerKind;

    #[test]
    fn zero_rhs_gives_zero_solution() {
        let mut b = TripletBuilder::new(3);
        for i in 0..3 {
            b.add(i, i, 2.0);
        }
        let a = b.build();
        let rhs = vec![0.0; 3];
        let mut x = vec![5.0; 3];
        let p = PreconditionerKind::None.build(&a).unwrap();
        let report = solve(&a, &rhs, &mut x, p.as_ref(), 1.0e-10, 100);
        assert!(report.converged);
        assert_eq!(x, vec![0.0; 3]);
    }

    #[test]
    fn warm_start_converges_immediately() {
        let mut builder = TripletBuilder::new(3);
        for i in 0..3 {
            builder.add(i, i, 2.0);
        }
        let a = builder.build();
        let rhs = vec![2.0, 4.0, 6.0];
        let mut x = vec![1.0, 2.0, 3.0]; // exact solution
        let p = PreconditionerKind::None.build(&a).unwrap();
        let report = solve(&a, &rhs, &mut x, p.as_ref(), 1.0e-10, 100);
        assert!(report.converged);
        assert_eq!(report.iterations, 0);
    }
}
