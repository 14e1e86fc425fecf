use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::rules::TileRules;

/// Neighbour weights of the 8-direction tile bitmask. North is `+j`.
pub mod dir {
    pub const NORTH_WEST: u8 = 1;
    pub const NORTH: u8 = 2;
    pub const NORTH_EAST: u8 = 4;
    pub const WEST: u8 = 8;
    pub const EAST: u8 = 16;
    pub const SOUTH_WEST: u8 = 32;
    pub const SOUTH: u8 = 64;
    pub const SOUTH_EAST: u8 = 128;
}

/// A map character other than `#` or `.`, at 1-based `line` and `column`
/// of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyError {
    pub line: usize,
    pub column: usize,
    pub found: char,
}

impl fmt::Display for OccupancyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "map line {} column {}: unexpected '{}', expected '#' or '.'",
            self.line, self.column, self.found
        )
    }
}

impl Error for OccupancyError {}

/// Boolean tile map, `w` columns by `h` rows, indexed `(i, j)` with `j`
/// growing north.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Occupancy2 {
    pub w: usize,
    pub h: usize,
    cells: Vec<bool>,
}

impl Occupancy2 {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            cells: vec![false; w * h],
        }
    }

    /// Parses rows of `#` (occupied) and `.` (empty); the first row is the
    /// northmost. Short rows are padded with empty cells; blank lines are
    /// skipped. Any other character is an error.
    pub fn from_ascii(text: &str) -> Result<Self, OccupancyError> {
        let rows: Vec<(usize, &str)> = text
            .lines()
            .map(str::trim_end)
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .collect();
        let h = rows.len();
        let w = rows.iter().map(|(_, r)| r.chars().count()).max().unwrap_or(0);
        let mut occ = Self::new(w, h);
        for (row, (n, line)) in rows.iter().enumerate() {
            let j = h - 1 - row;
            for (i, ch) in line.chars().enumerate() {
                match ch {
                    '#' => occ.set(i, j, true),
                    '.' => {}
                    found => {
                        return Err(OccupancyError {
                            line: n + 1,
                            column: i + 1,
                            found,
                        });
                    }
                }
            }
        }
        Ok(occ)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        let occ = Self::from_ascii(&s)?;
        log::info!("loaded {}x{} occupancy from {}", occ.w, occ.h, path.display());
        Ok(occ)
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        j * self.w + i
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.cells[self.idx(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: bool) {
        let k = self.idx(i, j);
        self.cells[k] = v;
    }

    /// Out-of-range cells read as empty, as if the map had a one-cell empty
    /// border.
    #[inline]
    pub fn occupied(&self, i: i64, j: i64) -> bool {
        i >= 0
            && j >= 0
            && (i as usize) < self.w
            && (j as usize) < self.h
            && self.get(i as usize, j as usize)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Bitmask of the neighbours of `(i, j)`. A diagonal counts only when it and
/// both orthogonal neighbours flanking it are occupied.
pub fn tile_bitmask(occ: &Occupancy2, i: usize, j: usize) -> u8 {
    let (i, j) = (i as i64, j as i64);
    let n = occ.occupied(i, j + 1);
    let s = occ.occupied(i, j - 1);
    let w = occ.occupied(i - 1, j);
    let e = occ.occupied(i + 1, j);
    let nw = n && w && occ.occupied(i - 1, j + 1);
    let ne = n && e && occ.occupied(i + 1, j + 1);
    let sw = s && w && occ.occupied(i - 1, j - 1);
    let se = s && e && occ.occupied(i + 1, j - 1);

    let mut mask = 0u8;
    for (on, weight) in [
        (nw, dir::NORTH_WEST),
        (n, dir::NORTH),
        (ne, dir::NORTH_EAST),
        (w, dir::WEST),
        (e, dir::EAST),
        (sw, dir::SOUTH_WEST),
        (s, dir::SOUTH),
        (se, dir::SOUTH_EAST),
    ] {
        if on {
            mask |= weight;
        }
    }
    mask
}

/// Bitmask per cell in [`Occupancy2::idx`] order; `None` for empty cells.
pub fn bitmasks(occ: &Occupancy2) -> Vec<Option<u8>> {
    let mut out = vec![None; occ.w * occ.h];
    for j in 0..occ.h {
        for i in 0..occ.w {
            if occ.get(i, j) {
                out[occ.idx(i, j)] = Some(tile_bitmask(occ, i, j));
            }
        }
    }
    out
}

/// Tile index per cell. Empty cells and occupied cells whose bitmask has no
/// rule both read `None`.
pub fn assign_tiles(occ: &Occupancy2, rules: &TileRules) -> Vec<Option<u32>> {
    let masks = bitmasks(occ);
    let mut misses = 0usize;
    let tiles: Vec<Option<u32>> = masks
        .iter()
        .map(|m| {
            m.and_then(|mask| {
                let t = rules.get(mask);
                if t.is_none() {
                    misses += 1;
                }
                t
            })
        })
        .collect();
    if misses > 0 {
        log::debug!("{} occupied cells have no tile rule", misses);
    }
    tiles
}
