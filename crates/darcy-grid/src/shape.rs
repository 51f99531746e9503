//! Structured-grid topology and linear ranking.

use crate::error::ModelError;
use darcy_core::CellCoord;

/// The structured 3D grid: cell counts plus areal cell dimensions.
///
/// Cells are ranked row-major with `i` (x) fastest, then `j` (y), then
/// `k` (z): `rank = i + nx * (j + ny * k)`. Cell thickness varies per
/// cell and lives on the model, not the shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridShape {
    nx: usize,
    ny: usize,
    nz: usize,
    dx: f64,
    dy: f64,
}

impl GridShape {
    /// Construct a shape, validating cell counts and areal dimensions.
    pub fn new(dims: (usize, usize, usize), cell_dimension: (f64, f64)) -> Result<Self, ModelError> {
        let (nx, ny, nz) = dims;
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(ModelError::EmptyGrid);
        }
        let (dx, dy) = cell_dimension;
        if !dx.is_finite() || dx <= 0.0 || !dy.is_finite() || dy <= 0.0 {
            return Err(ModelError::InvalidGeometry {
                reason: format!("cell dimension ({dx}, {dy}) must be finite and positive"),
            });
        }
        Ok(Self { nx, ny, nz, dx, dy })
    }

    /// Cell count along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Cell count along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Cell count along z.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Areal cell size along x, ft.
    pub fn dx(&self) -> f64 {
        self.dx
    }

    /// Areal cell size along y, ft.
    pub fn dy(&self) -> f64 {
        self.dy
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Linear rank of `(i, j, k)`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the coordinate is out of bounds; callers
    /// index only coordinates they obtained from [`GridShape::contains`]
    /// checks or iteration.
    pub fn rank(&self, coord: CellCoord) -> usize {
        let (i, j, k) = coord;
        debug_assert!(self.contains(coord), "coordinate {coord:?} out of bounds");
        i + self.nx * (j + self.ny * k)
    }

    /// Whether `(i, j, k)` lies inside the grid.
    pub fn contains(&self, coord: CellCoord) -> bool {
        let (i, j, k) = coord;
        i < self.nx && j < self.ny && k < self.nz
    }

    /// Iterate all coordinates in rank order.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let (nx, ny, nz) = (self.nx, self.ny, self.nz);
        (0..nz).flat_map(move |k| (0..ny).flat_map(move |j| (0..nx).map(move |i| (i, j, k))))
    }

    /// The coordinate at a given linear rank.
    pub fn coord_of(&self, rank: usize) -> CellCoord {
        debug_assert!(rank < self.cell_count());
        let i = rank % self.nx;
        let j = (rank / self.nx) % self.ny;
        let k = rank / (self.nx * self.ny);
        (i, j, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rank_is_row_major() {
        let shape = GridShape::new((3, 4, 5), (10.0, 10.0)).unwrap();
        assert_eq!(shape.rank((0, 0, 0)), 0);
        assert_eq!(shape.rank((1, 0, 0)), 1);
        assert_eq!(shape.rank((0, 1, 0)), 3);
        assert_eq!(shape.rank((0, 0, 1)), 12);
        assert_eq!(shape.rank((2, 3, 4)), 59);
    }

    #[test]
    fn zero_dimension_rejected() {
        assert_eq!(
            GridShape::new((0, 4, 5), (10.0, 10.0)),
            Err(ModelError::EmptyGrid)
        );
    }

    #[test]
    fn bad_cell_dimension_rejected() {
        assert!(matches!(
            GridShape::new((2, 2, 2), (0.0, 10.0)),
            Err(ModelError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            GridShape::new((2, 2, 2), (10.0, f64::NAN)),
            Err(ModelError::InvalidGeometry { .. })
        ));
    }

    proptest! {
        #[test]
        fn rank_coord_round_trip(
            nx in 1usize..8,
            ny in 1usize..8,
            nz in 1usize..8,
        ) {
            let shape = GridShape::new((nx, ny, nz), (1.0, 1.0)).unwrap();
            for (rank, coord) in shape.coords().enumerate() {
                prop_assert_eq!(shape.rank(coord), rank);
                prop_assert_eq!(shape.coord_of(rank), coord);
            }
        }
    }
}
