//! Criterion micro-benchmarks for the sparse pressure solve.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use darcy_solver::{
    solve, CachedPreconditioner, CsrMatrix, LinearSolver, PreconditionerKind, TripletBuilder,
};

/// 3D 7-point Laplacian on an n×n×n box, the pressure matrix's shape.
fn laplacian_3d(n: usize) -> CsrMatrix {
    let rank = |i: usize, j: usize, k: usize| i + n * (j + n * k);
    let mut builder = TripletBuilder::new(n * n * n);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let r = rank(i, j, k);
                let mut degree = 0.0;
                let mut neighbour = |rr: usize| {
                    builder.add(r, rr, -1.0);
                    1.0
                };
                if i > 0 {
                    degree += neighbour(rank(i - 1, j, k));
                }
                if i + 1 < n {
                    degree += neighbour(rank(i + 1, j, k));
                }
                if j > 0 {
                    degree += neighbour(rank(i, j - 1, k));
                }
                if j + 1 < n {
                    degree += neighbour(rank(i, j + 1, k));
                }
                if k > 0 {
                    degree += neighbour(rank(i, j, k - 1));
                }
                if k + 1 < n {
                    degree += neighbour(rank(i, j, k + 1));
                }
                builder.add(r, r, degree + 0.01);
            }
        }
    }
    builder.build()
}

fn bench_krylov(c: &mut Criterion) {
    let a = laplacian_3d(20);
    let b: Vec<f64> = (0..a.n()).map(|i| ((i % 17) as f64 - 8.0) / 8.0).collect();

    for (label, method) in [
        ("bicgstab", LinearSolver::BiCgStab),
        ("gmres30", LinearSolver::Gmres { restart: 30 }),
    ] {
        for (pname, kind) in [
            ("diag", PreconditionerKind::Diagonal),
            ("ilu0", PreconditionerKind::Ilu0),
        ] {
            c.bench_function(&format!("solve/{label}/{pname}/8k"), |bench| {
                let precond = kind.build(&a).unwrap();
                bench.iter(|| {
                    let mut x = vec![0.0; a.n()];
                    let report = solve(
                        method,
                        black_box(&a),
                        black_box(&b),
                        &mut x,
                        precond.as_ref(),
                        1.0e-8,
                        2000,
                    )
                    .unwrap();
                    assert!(report.converged);
                    black_box(x)
                });
            });
        }
    }
}

fn bench_preconditioner_cache(c: &mut Criterion) {
    let a = laplacian_3d(20);
    c.bench_function("precond/ilu0_build/8k", |bench| {
        bench.iter(|| black_box(PreconditionerKind::Ilu0.build(black_box(&a)).unwrap()));
    });
    c.bench_function("precond/cached_get/8k", |bench| {
        let mut cache = CachedPreconditioner::new(PreconditionerKind::Ilu0, 1000, 0.3);
        cache.get(&a).unwrap();
        bench.iter(|| {
            let p = cache.get(black_box(&a)).unwrap();
            black_box(p.name())
        });
    });
}

criterion_group!(benches, bench_krylov, bench_preconditioner_cache);
criterion_main!(benches);
