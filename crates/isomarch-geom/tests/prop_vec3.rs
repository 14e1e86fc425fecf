use isomarch_geom::Vec3;
use proptest::num::f32::NORMAL;
use proptest::prelude::*;
use proptest::strategy::Strategy;

fn approx(a: f32, b: f32, eps: f32) -> bool { (a - b).abs() <= eps }
fn vapprox(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx(a.x, b.x, eps) && approx(a.y, b.y, eps) && approx(a.z, b.z, eps)
}

fn approx_abs_rel(a: f32, b: f32, atol: f32, rtol: f32) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn vapprox_abs_rel(a: Vec3, b: Vec3, atol: f32, rtol: f32) -> bool {
    approx_abs_rel(a.x, b.x, atol, rtol)
        && approx_abs_rel(a.y, b.y, atol, rtol)
        && approx_abs_rel(a.z, b.z, atol, rtol)
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e4)
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32())
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // lerp hits both endpoints exactly
    #[test]
    fn lerp_endpoints(a in arb_vec3(), b in arb_vec3()) {
        prop_assert_eq!(a.lerp(b, 0.0), a);
        prop_assert!(vapprox_abs_rel(a.lerp(b, 1.0), b, 1e-3, 1e-5));
    }

    // For t in [0,1] every component stays between the endpoints
    #[test]
    fn lerp_stays_on_segment(a in arb_vec3(), b in arb_vec3(), t in 0.0f32..=1.0) {
        let p = a.lerp(b, t);
        let lo = a.min(b);
        let hi = a.max(b);
        let slack = 1e-2;
        prop_assert!(p.x >= lo.x - slack && p.x <= hi.x + slack);
        prop_assert!(p.y >= lo.y - slack && p.y <= hi.y + slack);
        prop_assert!(p.z >= lo.z - slack && p.z <= hi.z + slack);
    }

    // lerp at one half is the midpoint
    #[test]
    fn lerp_half_is_midpoint(a in arb_vec3(), b in arb_vec3()) {
        prop_assert!(vapprox_abs_rel(a.lerp(b, 0.5), (a + b) * 0.5, 1e-3, 1e-5));
    }

    // Cross anti-commutativity: a×b + b×a ≈ 0
    #[test]
    fn cross_anticommutative(a in arb_vec3(), b in arb_vec3()) {
        let sum = a.cross(b) + b.cross(a);
        prop_assert!(vapprox(sum, Vec3::ZERO, 1e-1));
    }

    // Negation is subtraction from zero
    #[test]
    fn neg_matches_zero_minus(a in arb_vec3()) {
        prop_assert_eq!(-a, Vec3::ZERO - a);
    }

    // distance is symmetric and agrees with length of the difference
    #[test]
    fn distance_symmetric(a in arb_vec3(), b in arb_vec3()) {
        prop_assert!(approx_abs_rel(a.distance(b), b.distance(a), 1e-4, 1e-5));
        prop_assert!(approx_abs_rel(a.distance(b), (a - b).length(), 1e-4, 1e-5));
    }

    // min/max bracket both inputs
    #[test]
    fn min_max_bracket(a in arb_vec3(), b in arb_vec3()) {
        let lo = a.min(b);
        let hi = a.max(b);
        prop_assert!(lo.x <= a.x && lo.x <= b.x && hi.x >= a.x && hi.x >= b.x);
        prop_assert!(lo.y <= a.y && lo.y <= b.y && hi.y >= a.y && hi.y >= b.y);
        prop_assert!(lo.z <= a.z && lo.z <= b.z && hi.z >= a.z && hi.z >= b.z);
    }
}
