use isomarch_geom::Vec3;

use crate::ScalarField;

/// Signed distance to a sphere: negative inside, zero on the surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereField {
    pub center: Vec3,
    pub radius: f32,
}

impl SphereField {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl ScalarField for SphereField {
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        p.distance(self.center) - self.radius
    }
}

/// `|p - c|² - r²`. Same zero set as [`SphereField`] without the square root,
/// but the value grows quadratically so lerped vertices sit slightly inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquaredSphereField {
    pub center: Vec3,
    pub radius: f32,
}

impl SquaredSphereField {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl ScalarField for SquaredSphereField {
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        (p - self.center).length_squared() - self.radius * self.radius
    }
}
