use isomarch_geom::Vec3;
use isomarch_grid::GridPoint;

use crate::constants::INTERP_EPSILON;

/// How edge crossings are placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeInterp {
    /// Always the edge midpoint.
    Midpoint,
    /// Linear in the field value; `t` is not clamped.
    #[default]
    Lerp,
    /// Linear with `t` clamped to `[0, 1]`.
    LerpClamped,
}

impl EdgeInterp {
    #[inline]
    pub fn from_flags(lerp: bool, clamp: bool) -> Self {
        match (lerp, clamp) {
            (false, _) => EdgeInterp::Midpoint,
            (true, false) => EdgeInterp::Lerp,
            (true, true) => EdgeInterp::LerpClamped,
        }
    }
}

#[inline]
fn near(a: f32, b: f32) -> bool {
    (a - b).abs() < INTERP_EPSILON
}

/// Position on segment `pa..pb` where the field crosses `threshold`.
///
/// Guards run in order: a corner sitting on the threshold is returned as is,
/// and near-equal corner values fall back to `pa` instead of dividing.
pub fn interpolate_with(pa: Vec3, va: f32, pb: Vec3, vb: f32, threshold: f32, mode: EdgeInterp) -> Vec3 {
    if mode == EdgeInterp::Midpoint {
        return (pa + pb) * 0.5;
    }
    if near(threshold, va) {
        return pa;
    }
    if near(threshold, vb) {
        return pb;
    }
    if near(va, vb) {
        return pa;
    }
    let mut t = (threshold - va) / (vb - va);
    if mode == EdgeInterp::LerpClamped {
        t = t.clamp(0.0, 1.0);
    }
    pa.lerp(pb, t)
}

/// Unclamped linear interpolation, or the midpoint when `use_lerp` is false.
#[inline]
pub fn interpolate(pa: Vec3, va: f32, pb: Vec3, vb: f32, threshold: f32, use_lerp: bool) -> Vec3 {
    interpolate_with(pa, va, pb, vb, threshold, EdgeInterp::from_flags(use_lerp, false))
}

#[inline]
pub fn interpolate_points(a: GridPoint, b: GridPoint, threshold: f32, mode: EdgeInterp) -> Vec3 {
    interpolate_with(a.pos, a.value, b.pos, b.value, threshold, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    const B: Vec3 = Vec3::new(2.0, 4.0, -2.0);

    #[test]
    fn degenerate_equal_values_return_first_point() {
        assert_eq!(interpolate(A, 5.0, B, 5.0, 5.0, true), A);
        // Equal values off the threshold also fall back to pa
        assert_eq!(interpolate(A, 3.0, B, 3.0, 5.0, true), A);
    }

    #[test]
    fn endpoint_on_threshold() {
        assert_eq!(interpolate(A, 0.0, B, 1.0, 0.0, true), A);
        assert_eq!(interpolate(A, -1.0, B, 0.0, 0.0, true), B);
    }

    #[test]
    fn midpoint_ignores_values() {
        let m = Vec3::new(1.0, 2.0, -1.0);
        assert_eq!(interpolate(A, -10.0, B, 0.1, 0.0, false), m);
        assert_eq!(interpolate(A, 5.0, B, 5.0, 5.0, false), m);
    }

    #[test]
    fn linear_crossing() {
        let p = interpolate(A, -1.0, B, 3.0, 0.0, true);
        assert!((p - B * 0.25).length() < 1e-6);
    }

    #[test]
    fn clamping_differs_only_outside_segment() {
        // Threshold beyond vb extrapolates unless clamped
        let un = interpolate_with(A, 0.5, B, 1.0, 2.0, EdgeInterp::Lerp);
        let cl = interpolate_with(A, 0.5, B, 1.0, 2.0, EdgeInterp::LerpClamped);
        assert!((un - B * 3.0).length() < 1e-5);
        assert_eq!(cl, B);
        let inside_un = interpolate_with(A, 0.0, B, 1.0, 0.5, EdgeInterp::Lerp);
        let inside_cl = interpolate_with(A, 0.0, B, 1.0, 0.5, EdgeInterp::LerpClamped);
        assert_eq!(inside_un, inside_cl);
    }
}
