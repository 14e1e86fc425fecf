use isomarch_grid::GridPoint;

/// Cube state: bit `i` set when corner `i` is below `threshold`.
/// NaN compares false, so NaN corners count as outside.
#[inline]
pub fn classify_cube(values: &[f32; 8], threshold: f32) -> u8 {
    let mut state = 0u8;
    for (i, &v) in values.iter().enumerate() {
        if v < threshold {
            state |= 1 << i;
        }
    }
    state
}

/// Square state: top-left 1, top-right 2, bottom-left 4, bottom-right 8 for
/// corners strictly above `threshold`.
#[inline]
pub fn classify_square(values: &[f32; 4], threshold: f32) -> u8 {
    let mut state = 0u8;
    for (i, &v) in values.iter().enumerate() {
        if v > threshold {
            state |= 1 << i;
        }
    }
    state
}

#[inline]
pub fn cube_state(corners: &[GridPoint; 8], threshold: f32) -> u8 {
    classify_cube(&corners.map(|p| p.value), threshold)
}

#[inline]
pub fn square_state(corners: &[GridPoint; 4], threshold: f32) -> u8 {
    classify_square(&corners.map(|p| p.value), threshold)
}
