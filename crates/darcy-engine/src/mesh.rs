//! Inter-cell connectivity and geometric transmissibility.

use crate::boundary::{BoundaryCondition, BoundarySet, Face};
use darcy_core::constants::TRANSMISSIBILITY_CONVERSION;
use darcy_grid::ReservoirModel;

/// Grid axis of a face connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Axis {
    /// i direction.
    X,
    /// j direction.
    Y,
    /// k direction.
    Z,
}

/// One connection between two cells (interior face or periodic wrap).
#[derive(Clone, Copy, Debug)]
pub(crate) struct Connection {
    /// Rank of the lower-index cell.
    pub a: usize,
    /// Rank of the higher-index cell.
    pub b: usize,
    /// Geometric transmissibility, ft³·cP/day/psi (multiply by
    /// mobility, 1/cP, for a flow coefficient).
    pub transmissibility: f64,
}

/// Directional permeability of a cell.
fn perm(model: &ReservoirModel, rank: usize, axis: Axis) -> f64 {
    let k = &model.rock().absolute_permeability;
    match axis {
        Axis::X => k.x.at(rank),
        Axis::Y => k.y.at(rank),
        Axis::Z => k.z.at(rank),
    }
}

/// Geometric transmissibility between two adjacent cells.
///
/// Harmonic-mean permeability times face area over center distance,
/// with net-to-gross thinning the lateral flow area.
pub(crate) fn transmissibility(model: &ReservoirModel, a: usize, b: usize, axis: Axis) -> f64 {
    let shape = model.shape();
    let (dx, dy) = (shape.dx(), shape.dy());
    let (ha, hb) = (model.thickness().at(a), model.thickness().at(b));
    let ntg = &model.rock().net_to_gross;
    let h = 0.5 * (ha * ntg.at(a) + hb * ntg.at(b));
    let (area, distance) = match axis {
        Axis::X => (dy * h, dx),
        Axis::Y => (dx * h, dy),
        // Vertical flow crosses the full areal footprint over the
        // half-thickness sum.
        Axis::Z => (dx * dy, 0.5 * (ha + hb)),
    };
    let (ka, kb) = (perm(model, a, axis), perm(model, b, axis));
    if ka <= 0.0 || kb <= 0.0 {
        return 0.0;
    }
    let k_face = 2.0 * ka * kb / (ka + kb);
    TRANSMISSIBILITY_CONVERSION * k_face * area / distance
}

/// All interior face connections between active cells, plus periodic
/// wraps declared by the boundary set. Deterministic order: x faces in
/// rank order, then y, then z, then periodic wraps per axis.
pub(crate) fn connections(model: &ReservoirModel, boundaries: &BoundarySet) -> Vec<Connection> {
    let shape = model.shape();
    let (nx, ny, nz) = (shape.nx(), shape.ny(), shape.nz());
    let mut list = Vec::new();
    let mut push = |a: usize, b: usize, axis: Axis| {
        if !model.is_active(a) || !model.is_active(b) {
            return;
        }
        let t = transmissibility(model, a, b, axis);
        if t > 0.0 {
            list.push(Connection {
                a,
                b,
                transmissibility: t,
            });
        }
    };

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let rank = shape.rank((i, j, k));
                if i + 1 < nx {
                    push(rank, shape.rank((i + 1, j, k)), Axis::X);
                }
                if j + 1 < ny {
                    push(rank, shape.rank((i, j + 1, k)), Axis::Y);
                }
                if k + 1 < nz {
                    push(rank, shape.rank((i, j, k + 1)), Axis::Z);
                }
            }
        }
    }

    // Periodic wraps: a Min face declared periodic couples to its
    // (validated) periodic opposite across the axis.
    if boundaries.face(Face::XMin) == BoundaryCondition::Periodic && nx > 1 {
        for k in 0..nz {
            for j in 0..ny {
                push(shape.rank((0, j, k)), shape.rank((nx - 1, j, k)), Axis::X);
            }
        }
    }
    if boundaries.face(Face::YMin) == BoundaryCondition::Periodic && ny > 1 {
        for k in 0..nz {
            for i in 0..nx {
                push(shape.rank((i, 0, k)), shape.rank((i, ny - 1, k)), Axis::Y);
            }
        }
    }
    if boundaries.face(Face::ZMin) == BoundaryCondition::Periodic && nz > 1 {
        for j in 0..ny {
            for i in 0..nx {
                push(shape.rank((i, j, 0)), shape.rank((i, j, nz - 1)), Axis::Z);
            }
        }
    }

    list
}

/// Boundary cells of a face with their half-cell transmissibility.
///
/// Used by constant-pressure boundaries: flow crosses half the cell to
/// reach the face.
pub(crate) fn boundary_cells(model: &ReservoirModel, face: Face) -> Vec<(usize, f64)> {
    let shape = model.shape();
    let (nx, ny, nz) = (shape.nx(), shape.ny(), shape.nz());
    let (dx, dy) = (shape.dx(), shape.dy());
    let mut cells = Vec::new();
    let mut push = |rank: usize, axis: Axis| {
        if !model.is_active(rank) {
            return;
        }
        let k = perm(model, rank, axis);
        if k <= 0.0 {
            return;
        }
        let h = model.thickness().at(rank) * model.rock().net_to_gross.at(rank);
        let (area, distance) = match axis {
            Axis::X => (dy * h, 0.5 * dx),
            Axis::Y => (dx * h, 0.5 * dy),
            Axis::Z => (dx * dy, 0.5 * model.thickness().at(rank)),
        };
        cells.push((rank, TRANSMISSIBILITY_CONVERSION * k * area / distance));
    };
    match face {
        Face::XMin => {
            for k in 0..nz {
                for j in 0..ny {
                    push(shape.rank((0, j, k)), Axis::X);
                }
            }
        }
        Face::XMax => {
            for k in 0..nz {
                for j in 0..ny {
                    push(shape.rank((nx - 1, j, k)), Axis::X);
                }
            }
        }
        Face::YMin => {
            for k in 0..nz {
                for i in 0..nx {
                    push(shape.rank((i, 0, k)), Axis::Y);
                }
            }
        }
        Face::YMax => {
            for k in 0..nz {
                for i in 0..nx {
                    push(shape.rank((i, ny - 1, k)), Axis::Y);
                }
            }
        }
        Face::ZMin => {
            for j in 0..ny {
                for i in 0..nx {
                    push(shape.rank((i, j, 0)), Axis::Z);
                }
            }
        }
        Face::ZMax => {
            for j in 0..ny {
                for i in 0..nx {
                    push(shape.rank((i, j, nz - 1)), Axis::Z);
                }
            }
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use darcy_test_utils::uniform_model;

    #[test]
    fn connection_count_matches_structured_grid() {
        let model = uniform_model((3, 2, 2));
        let list = connections(&model, &BoundarySet::closed());
        // x faces: 2·2·2 = 8, y: 3·1·2 = 6, z: 3·2·1 = 6.
        assert_eq!(list.len(), 20);
        for c in &list {
            assert!(c.transmissibility > 0.0);
            assert!(c.a < c.b);
        }
    }

    #[test]
    fn periodic_wrap_adds_connections() {
        let model = uniform_model((3, 2, 2));
        let boundaries = BoundarySet::closed()
            .with_face(Face::XMin, BoundaryCondition::Periodic)
            .with_face(Face::XMax, BoundaryCondition::Periodic);
        let list = connections(&model, &boundaries);
        // 2·2 wraps on top of the 20 interior faces.
        assert_eq!(list.len(), 24);
    }

    #[test]
    fn harmonic_mean_is_symmetric_and_bounded() {
        let model = uniform_model((2, 1, 1));
        let t = transmissibility(&model, 0, 1, Axis::X);
        assert!(t > 0.0);
        assert_eq!(t, transmissibility(&model, 1, 0, Axis::X));
    }

    #[test]
    fn boundary_cells_cover_the_face() {
        let model = uniform_model((3, 2, 2));
        assert_eq!(boundary_cells(&model, Face::XMin).len(), 4);
        assert_eq!(boundary_cells(&model, Face::ZMax).len(), 6);
    }
}
