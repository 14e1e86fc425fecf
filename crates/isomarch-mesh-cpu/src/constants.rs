//! Shared constants for isomarch-mesh-cpu.

/// Number of cube corner-sign configurations (2^8).
pub const CUBE_STATES: usize = 256;
/// Number of square corner-sign configurations (2^4).
pub const SQUARE_STATES: usize = 16;
/// State with every cube corner below the threshold.
pub const FULL_CUBE: u8 = 0xFF;
/// Row terminator in the cube triangulation table.
pub const TRIANGULATION_END: i8 = -1;

/// Tolerance for the interpolation guards.
pub const INTERP_EPSILON: f32 = 1e-5;

/// Vertex keys round positions to this many steps per world unit
/// (five decimal places).
pub const VERTEX_KEY_SCALE: f64 = 100_000.0;

pub(crate) const OPAQUE_WHITE: [u8; 4] = [255, 255, 255, 255];
