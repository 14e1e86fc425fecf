use std::fmt;

use isomarch_geom::Vec3;

use crate::catalog::ModuleKey;

/// Height of the ground slab (level 0 cells).
pub const FLOOR_HEIGHT: f32 = 0.25;
/// Height of the basement layer (level 1 cells).
pub const BASEMENT_HEIGHT: f32 = 1.5 - FLOOR_HEIGHT * 0.5;

/// Cell offsets around a lattice point; bit `i` of the point bitmask is set
/// when the cell at `POINT_NEIGHBOURS[i]` is active. Bits 0-3 are the cells
/// above the point, 4-7 the cells below.
pub const POINT_NEIGHBOURS: [[i64; 3]; 8] = [
    [0, 0, 0],
    [-1, 0, 0],
    [-1, 0, -1],
    [0, 0, -1],
    [0, -1, 0],
    [-1, -1, 0],
    [-1, -1, -1],
    [0, -1, -1],
];

/// Which set of modules a lattice level draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stratum {
    Ground,
    Basement,
    Middle,
    Roof,
}

/// Stratum of lattice level `level` in a grid `height` cells tall. Levels
/// outside `0..=height` have none.
pub fn stratum_for_level(level: usize, height: usize) -> Option<Stratum> {
    if level > 1 && level < height {
        Some(Stratum::Middle)
    } else if level == 0 {
        Some(Stratum::Ground)
    } else if level == 1 {
        Some(Stratum::Basement)
    } else if level == height {
        Some(Stratum::Roof)
    } else {
        None
    }
}

/// Cell face, named from the cell's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    /// +z
    Front,
    /// -z
    Back,
    /// -x
    Left,
    /// +x
    Right,
    Up,
    Down,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Front,
        Face::Back,
        Face::Left,
        Face::Right,
        Face::Up,
        Face::Down,
    ];

    #[inline]
    pub const fn offset(self) -> [i64; 3] {
        match self {
            Face::Front => [0, 0, 1],
            Face::Back => [0, 0, -1],
            Face::Left => [-1, 0, 0],
            Face::Right => [1, 0, 0],
            Face::Up => [0, 1, 0],
            Face::Down => [0, -1, 0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildingError {
    ZeroDimension,
    OutOfRange([usize; 3]),
}

impl fmt::Display for BuildingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildingError::ZeroDimension => write!(f, "building grid needs at least one cell per axis"),
            BuildingError::OutOfRange(c) => write!(f, "cell {:?} is outside the grid", c),
        }
    }
}

impl std::error::Error for BuildingError {}

/// Cells of a modular building, `gx * gy * gz`, each on or off. Lattice
/// points sit at cell corners, `(gx+1) * (gy+1) * (gz+1)` of them, and each
/// point picks a module from the cells around it.
#[derive(Clone, Debug)]
pub struct BuildingGrid {
    gx: usize,
    gy: usize,
    gz: usize,
    active: Vec<bool>,
}

impl BuildingGrid {
    /// All cells off.
    pub fn new(gx: usize, gy: usize, gz: usize) -> Result<Self, BuildingError> {
        if gx == 0 || gy == 0 || gz == 0 {
            return Err(BuildingError::ZeroDimension);
        }
        Ok(Self {
            gx,
            gy,
            gz,
            active: vec![false; gx * gy * gz],
        })
    }

    /// Ground layer (y = 0) on, everything above off.
    pub fn with_ground(gx: usize, gy: usize, gz: usize) -> Result<Self, BuildingError> {
        let mut g = Self::new(gx, gy, gz)?;
        for i in 0..gx * gz {
            g.active[i] = true;
        }
        Ok(g)
    }

    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        [self.gx, self.gy, self.gz]
    }

    #[inline]
    pub fn point_dims(&self) -> [usize; 3] {
        [self.gx + 1, self.gy + 1, self.gz + 1]
    }

    /// Linear index `y * gz * gx + z * gx + x`, or `None` out of range.
    #[inline]
    pub fn cell_index(&self, c: [i64; 3]) -> Option<usize> {
        let in_range = c[0] >= 0
            && c[1] >= 0
            && c[2] >= 0
            && (c[0] as usize) < self.gx
            && (c[1] as usize) < self.gy
            && (c[2] as usize) < self.gz;
        in_range.then(|| (c[1] as usize * self.gz + c[2] as usize) * self.gx + c[0] as usize)
    }

    #[inline]
    pub fn is_active(&self, c: [i64; 3]) -> bool {
        self.cell_index(c).is_some_and(|i| self.active[i])
    }

    pub fn set_active(&mut self, c: [usize; 3], on: bool) -> Result<(), BuildingError> {
        let i = self
            .cell_index(c.map(|v| v as i64))
            .ok_or(BuildingError::OutOfRange(c))?;
        self.active[i] = on;
        Ok(())
    }

    /// Activates the cell across `face` of `c`. Returns the activated cell,
    /// or `None` when that cell would be outside the grid.
    pub fn add_adjacent(&mut self, c: [usize; 3], face: Face) -> Option<[usize; 3]> {
        let o = face.offset();
        let n = [c[0] as i64 + o[0], c[1] as i64 + o[1], c[2] as i64 + o[2]];
        let i = self.cell_index(n)?;
        self.active[i] = true;
        let out = n.map(|v| v as usize);
        log::trace!("cell {:?} on via {:?} of {:?}", out, face, c);
        Some(out)
    }

    /// Deactivates `c` unless it is on the ground layer. Returns whether the
    /// cell was turned off.
    pub fn remove(&mut self, c: [usize; 3]) -> bool {
        if c[1] == 0 {
            return false;
        }
        match self.cell_index(c.map(|v| v as i64)) {
            Some(i) => {
                self.active[i] = false;
                true
            }
            None => false,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// Bitmask of lattice point `p` over [`POINT_NEIGHBOURS`].
    pub fn point_bitmask(&self, p: [usize; 3]) -> u8 {
        let mut mask = 0u8;
        for (bit, o) in POINT_NEIGHBOURS.iter().enumerate() {
            let c = [p[0] as i64 + o[0], p[1] as i64 + o[1], p[2] as i64 + o[2]];
            if self.is_active(c) {
                mask |= 1 << bit;
            }
        }
        mask
    }

    #[inline]
    pub fn point_stratum(&self, p: [usize; 3]) -> Option<Stratum> {
        stratum_for_level(p[1], self.gy)
    }

    /// Module key of `p`, `None` when no cell around it is active.
    pub fn point_key(&self, p: [usize; 3]) -> Option<ModuleKey> {
        let bitmask = self.point_bitmask(p);
        if bitmask == 0 {
            return None;
        }
        let stratum = self.point_stratum(p)?;
        Some(ModuleKey { stratum, bitmask })
    }

    /// World position of lattice point `p`. The footprint is centred on the
    /// origin in XZ; the ground slab and basement are shorter than the unit
    /// storeys above them.
    pub fn point_position(&self, p: [usize; 3]) -> Vec3 {
        let y = match p[1] {
            0 => -FLOOR_HEIGHT * 0.5,
            1 => FLOOR_HEIGHT * 0.5,
            l => l as f32 - 0.5,
        };
        Vec3::new(
            p[0] as f32 - self.gx as f32 * 0.5,
            y,
            p[2] as f32 - self.gz as f32 * 0.5,
        )
    }

    /// Every lattice point that shows a module, in y, z, x order.
    pub fn module_points(&self) -> Vec<([usize; 3], ModuleKey)> {
        let [px, py, pz] = self.point_dims();
        let mut out = Vec::new();
        for y in 0..py {
            for z in 0..pz {
                for x in 0..px {
                    if let Some(k) = self.point_key([x, y, z]) {
                        out.push(([x, y, z], k));
                    }
                }
            }
        }
        out
    }
}
