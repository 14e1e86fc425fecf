//! Sampled point lattices for marching cubes and marching squares.
//!
//! A grid of `n` cells per axis stores `n + 1` points per axis. Points are
//! sampled exactly once and shared by every cell that touches them.
#![forbid(unsafe_code)]

use isomarch_field::{FieldVisitor, ScalarField};
use isomarch_geom::Vec3;
use rayon::prelude::*;

/// A sampled lattice point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GridPoint {
    pub pos: Vec3,
    pub value: f32,
}

impl GridPoint {
    #[inline]
    pub const fn new(pos: Vec3, value: f32) -> Self {
        Self { pos, value }
    }
}

/// Offsets of the eight cube corners from a cell's minimum point, in the
/// order the triangulation table expects. Corners 0..4 form the bottom face
/// and 4..8 the top face directly above them.
pub const CUBE_CORNER_OFFSETS: [[usize; 3]; 8] = [
    [0, 0, 1],
    [1, 0, 1],
    [1, 0, 0],
    [0, 0, 0],
    [0, 1, 1],
    [1, 1, 1],
    [1, 1, 0],
    [0, 1, 0],
];

/// Offsets (x, z) of the four square corners from a cell's minimum point:
/// top-left, top-right, bottom-left, bottom-right. "Top" is larger z.
pub const SQUARE_CORNER_OFFSETS: [[usize; 2]; 4] = [[0, 1], [1, 1], [0, 0], [1, 0]];

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    DimensionMismatch { expected: usize, got: usize },
    InvalidCellSize,
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::DimensionMismatch { expected, got } => {
                write!(f, "expected {} point values, got {}", expected, got)
            }
            GridError::InvalidCellSize => write!(f, "cell size must be positive on every axis"),
        }
    }
}

impl std::error::Error for GridError {}

/// Cell counts along each axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridDims {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridDims {
    #[inline]
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    #[inline]
    pub const fn cubic(n: usize) -> Self {
        Self { nx: n, ny: n, nz: n }
    }

    #[inline]
    pub const fn cell_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    #[inline]
    pub const fn point_count(&self) -> usize {
        (self.nx + 1) * (self.ny + 1) * (self.nz + 1)
    }
}

#[inline]
fn valid_cell(cell: Vec3) -> bool {
    cell.x > 0.0 && cell.y > 0.0 && cell.z > 0.0
}

/// 3D lattice of `(nx+1) * (ny+1) * (nz+1)` points, stored y-major then z
/// then x.
#[derive(Clone, Debug)]
pub struct PointGrid3 {
    pub dims: GridDims,
    pub origin: Vec3,
    pub cell: Vec3,
    pub points: Vec<GridPoint>,
}

impl PointGrid3 {
    /// Samples `field` at every lattice point. Fails when any cell axis is
    /// not positive.
    pub fn sample<F: ScalarField + ?Sized>(
        dims: GridDims,
        origin: Vec3,
        cell: Vec3,
        field: &F,
    ) -> Result<Self, GridError> {
        if !valid_cell(cell) {
            return Err(GridError::InvalidCellSize);
        }
        let (px, py, pz) = (dims.nx + 1, dims.ny + 1, dims.nz + 1);
        let mut points = Vec::with_capacity(dims.point_count());
        for y in 0..py {
            for z in 0..pz {
                for x in 0..px {
                    let pos = lattice_pos(origin, cell, x, y, z);
                    points.push(GridPoint::new(pos, field.sample(pos)));
                }
            }
        }
        Ok(PointGrid3 {
            dims,
            origin,
            cell,
            points,
        })
    }

    /// Same as [`PointGrid3::sample`] with y-layers sampled on the rayon pool.
    /// The grid is fully populated before this returns.
    pub fn sample_par<F: ScalarField + Sync + ?Sized>(
        dims: GridDims,
        origin: Vec3,
        cell: Vec3,
        field: &F,
    ) -> Result<Self, GridError> {
        if !valid_cell(cell) {
            return Err(GridError::InvalidCellSize);
        }
        let (px, pz) = (dims.nx + 1, dims.nz + 1);
        let layer = px * pz;
        let mut points = vec![GridPoint::default(); dims.point_count()];
        points
            .par_chunks_mut(layer)
            .enumerate()
            .for_each(|(y, slab)| {
                for z in 0..pz {
                    for x in 0..px {
                        let pos = lattice_pos(origin, cell, x, y, z);
                        slab[z * px + x] = GridPoint::new(pos, field.sample(pos));
                    }
                }
            });
        Ok(PointGrid3 {
            dims,
            origin,
            cell,
            points,
        })
    }

    /// Wraps precomputed values laid out in [`PointGrid3::idx`] order.
    pub fn from_values(
        dims: GridDims,
        origin: Vec3,
        cell: Vec3,
        values: &[f32],
    ) -> Result<Self, GridError> {
        if !valid_cell(cell) {
            return Err(GridError::InvalidCellSize);
        }
        let expected = dims.point_count();
        if values.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                got: values.len(),
            });
        }
        let (px, py, pz) = (dims.nx + 1, dims.ny + 1, dims.nz + 1);
        let mut points = Vec::with_capacity(expected);
        for y in 0..py {
            for z in 0..pz {
                for x in 0..px {
                    let i = (y * pz + z) * px + x;
                    points.push(GridPoint::new(lattice_pos(origin, cell, x, y, z), values[i]));
                }
            }
        }
        Ok(PointGrid3 {
            dims,
            origin,
            cell,
            points,
        })
    }

    #[inline]
    pub fn points_x(&self) -> usize {
        self.dims.nx + 1
    }
    #[inline]
    pub fn points_y(&self) -> usize {
        self.dims.ny + 1
    }
    #[inline]
    pub fn points_z(&self) -> usize {
        self.dims.nz + 1
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.points_z() + z) * self.points_x() + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> GridPoint {
        self.points[self.idx(x, y, z)]
    }

    #[inline]
    pub fn position(&self, x: usize, y: usize, z: usize) -> Vec3 {
        lattice_pos(self.origin, self.cell, x, y, z)
    }

    /// Corners of cell `(x, y, z)` in [`CUBE_CORNER_OFFSETS`] order.
    /// Requires `x < nx`, `y < ny`, `z < nz`.
    #[inline]
    pub fn cube_corners(&self, x: usize, y: usize, z: usize) -> [GridPoint; 8] {
        let mut out = [GridPoint::default(); 8];
        for (c, o) in CUBE_CORNER_OFFSETS.iter().enumerate() {
            out[c] = self.get(x + o[0], y + o[1], z + o[2]);
        }
        out
    }

    pub fn value_range(&self) -> Option<(f32, f32)> {
        value_range(&self.points)
    }
}

#[inline]
fn lattice_pos(origin: Vec3, cell: Vec3, x: usize, y: usize, z: usize) -> Vec3 {
    origin + Vec3::new(x as f32 * cell.x, y as f32 * cell.y, z as f32 * cell.z)
}

fn value_range(points: &[GridPoint]) -> Option<(f32, f32)> {
    let first = points.first()?.value;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(p.value), hi.max(p.value))),
    )
}

/// Builds a [`PointGrid3`] from whichever concrete field a
/// `isomarch_field::Field` holds.
#[derive(Clone, Copy, Debug)]
pub struct SampleGrid3 {
    pub dims: GridDims,
    pub origin: Vec3,
    pub cell: Vec3,
    pub parallel: bool,
}

impl FieldVisitor for SampleGrid3 {
    type Output = Result<PointGrid3, GridError>;
    fn visit<F: ScalarField + Sync>(self, field: &F) -> Self::Output {
        if self.parallel {
            PointGrid3::sample_par(self.dims, self.origin, self.cell, field)
        } else {
            PointGrid3::sample(self.dims, self.origin, self.cell, field)
        }
    }
}

/// 2D lattice of `(nx+1) * (nz+1)` points on the plane `y = origin.y`,
/// stored z-major then x.
#[derive(Clone, Debug)]
pub struct PointGrid2 {
    pub nx: usize,
    pub nz: usize,
    pub origin: Vec3,
    pub cell: f32,
    pub points: Vec<GridPoint>,
}

impl PointGrid2 {
    pub fn sample<F: ScalarField + ?Sized>(
        nx: usize,
        nz: usize,
        origin: Vec3,
        cell: f32,
        field: &F,
    ) -> Result<Self, GridError> {
        if !(cell > 0.0) {
            return Err(GridError::InvalidCellSize);
        }
        let (px, pz) = (nx + 1, nz + 1);
        let mut points = Vec::with_capacity(px * pz);
        for z in 0..pz {
            for x in 0..px {
                let pos = plane_pos(origin, cell, x, z);
                points.push(GridPoint::new(pos, field.sample(pos)));
            }
        }
        Ok(PointGrid2 {
            nx,
            nz,
            origin,
            cell,
            points,
        })
    }

    /// Like [`PointGrid2::sample`] with the footprint centered on `center` in XZ.
    pub fn centered<F: ScalarField + ?Sized>(
        nx: usize,
        nz: usize,
        center: Vec3,
        cell: f32,
        field: &F,
    ) -> Result<Self, GridError> {
        let origin = Vec3::new(
            center.x - nx as f32 * cell * 0.5,
            center.y,
            center.z - nz as f32 * cell * 0.5,
        );
        Self::sample(nx, nz, origin, cell, field)
    }

    pub fn from_values(
        nx: usize,
        nz: usize,
        origin: Vec3,
        cell: f32,
        values: &[f32],
    ) -> Result<Self, GridError> {
        if !(cell > 0.0) {
            return Err(GridError::InvalidCellSize);
        }
        let (px, pz) = (nx + 1, nz + 1);
        let expected = px * pz;
        if values.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                got: values.len(),
            });
        }
        let mut points = Vec::with_capacity(expected);
        for z in 0..pz {
            for x in 0..px {
                points.push(GridPoint::new(plane_pos(origin, cell, x, z), values[z * px + x]));
            }
        }
        Ok(PointGrid2 {
            nx,
            nz,
            origin,
            cell,
            points,
        })
    }

    #[inline]
    pub fn points_x(&self) -> usize {
        self.nx + 1
    }
    #[inline]
    pub fn points_z(&self) -> usize {
        self.nz + 1
    }

    #[inline]
    pub fn idx(&self, x: usize, z: usize) -> usize {
        z * self.points_x() + x
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> GridPoint {
        self.points[self.idx(x, z)]
    }

    /// Corners of cell `(x, z)` as `[top_left, top_right, bottom_left,
    /// bottom_right]`.
    #[inline]
    pub fn square_corners(&self, x: usize, z: usize) -> [GridPoint; 4] {
        let mut out = [GridPoint::default(); 4];
        for (c, o) in SQUARE_CORNER_OFFSETS.iter().enumerate() {
            out[c] = self.get(x + o[0], z + o[1]);
        }
        out
    }

    pub fn value_range(&self) -> Option<(f32, f32)> {
        value_range(&self.points)
    }
}

#[inline]
fn plane_pos(origin: Vec3, cell: f32, x: usize, z: usize) -> Vec3 {
    origin + Vec3::new(x as f32 * cell, 0.0, z as f32 * cell)
}

/// Builds a [`PointGrid2`] from a field dispatched once by kind.
#[derive(Clone, Copy, Debug)]
pub struct SampleGrid2 {
    pub nx: usize,
    pub nz: usize,
    pub origin: Vec3,
    pub cell: f32,
}

impl FieldVisitor for SampleGrid2 {
    type Output = Result<PointGrid2, GridError>;
    fn visit<F: ScalarField + Sync>(self, field: &F) -> Self::Output {
        PointGrid2::sample(self.nx, self.nz, self.origin, self.cell, field)
    }
}
