use hashbrown::HashMap;
use isomarch_geom::Vec3;

use crate::ScalarField;

/// Density never reaches 1.0 inside an occupied cell, so a threshold just
/// below 1 always separates occupied cells from empty space.
pub const MAX_CELL_DENSITY: f32 = 0.98;
/// Value of space with no points nearby.
pub const EMPTY_DENSITY: f32 = 1.0;

/// Voxelizes a point cloud (typically a mesh's vertices) into per-cell
/// counts. A cell's density is `min(0.98, count / max_count)`; empty cells
/// read 1.0. Extract with a threshold such as 0.99 to wrap the occupied
/// cells.
///
/// Cell `c` spans lattice points `c..=c+1` on each axis, where lattice point
/// `l` sits at `l * cell`. A lattice point takes the lowest density of the
/// eight cells sharing it.
#[derive(Clone, Debug)]
pub struct PointDensityField {
    cell: Vec3,
    max_count: u32,
    bins: HashMap<[i32; 3], u32>,
    min_bin: [i32; 3],
    max_bin: [i32; 3],
}

impl PointDensityField {
    /// Returns `None` when any cell extent is not strictly positive.
    pub fn new(points: &[Vec3], cell: Vec3, max_count: u32) -> Option<Self> {
        if !(cell.x > 0.0 && cell.y > 0.0 && cell.z > 0.0) {
            return None;
        }
        let mut bins: HashMap<[i32; 3], u32> = HashMap::new();
        let mut min_bin = [i32::MAX; 3];
        let mut max_bin = [i32::MIN; 3];
        for p in points {
            let b = [
                (p.x / cell.x).round() as i32,
                (p.y / cell.y).round() as i32,
                (p.z / cell.z).round() as i32,
            ];
            *bins.entry(b).or_insert(0) += 1;
            for a in 0..3 {
                min_bin[a] = min_bin[a].min(b[a]);
                max_bin[a] = max_bin[a].max(b[a]);
            }
        }
        Some(Self {
            cell,
            max_count: max_count.max(1),
            bins,
            min_bin,
            max_bin,
        })
    }

    #[inline]
    pub fn cell_size(&self) -> Vec3 {
        self.cell
    }

    #[inline]
    pub fn occupied_cells(&self) -> usize {
        self.bins.len()
    }

    pub fn cell_density(&self, c: [i32; 3]) -> f32 {
        match self.bins.get(&c) {
            Some(&n) => (n as f32 / self.max_count as f32).min(MAX_CELL_DENSITY),
            None => EMPTY_DENSITY,
        }
    }

    /// Grid origin and cell counts covering every occupied cell plus one
    /// empty cell of padding on each side, so the extracted surface closes.
    /// `None` for an empty point cloud.
    pub fn padded_extent(&self) -> Option<(Vec3, [usize; 3])> {
        if self.bins.is_empty() {
            return None;
        }
        let lo = [
            self.min_bin[0] - 1,
            self.min_bin[1] - 1,
            self.min_bin[2] - 1,
        ];
        let origin = Vec3::new(
            lo[0] as f32 * self.cell.x,
            lo[1] as f32 * self.cell.y,
            lo[2] as f32 * self.cell.z,
        );
        let cells = [
            (self.max_bin[0] - self.min_bin[0] + 3) as usize,
            (self.max_bin[1] - self.min_bin[1] + 3) as usize,
            (self.max_bin[2] - self.min_bin[2] + 3) as usize,
        ];
        Some((origin, cells))
    }
}

impl ScalarField for PointDensityField {
    fn sample(&self, p: Vec3) -> f32 {
        let l = [
            (p.x / self.cell.x).round() as i32,
            (p.y / self.cell.y).round() as i32,
            (p.z / self.cell.z).round() as i32,
        ];
        let mut v = EMPTY_DENSITY;
        for dy in 0..2 {
            for dz in 0..2 {
                for dx in 0..2 {
                    v = v.min(self.cell_density([l[0] - dx, l[1] - dy, l[2] - dz]));
                }
            }
        }
        v
    }
}
