//! Scalar fields sampled by the marching grids: signed distances, layered
//! noise terrain, and point-cloud density.
#![forbid(unsafe_code)]

use isomarch_geom::Vec3;

pub mod config;
mod density;
mod noise;
mod sphere;

pub use config::{FieldError, FieldSpec};
pub use density::PointDensityField;
pub use noise::{LayeredNoiseField, LayeredNoiseParams, PlanarNoiseField, SimplexField};
pub use sphere::{SphereField, SquaredSphereField};

/// A density function over world space. The surface is where the value
/// crosses the extraction threshold.
pub trait ScalarField {
    fn sample(&self, p: Vec3) -> f32;
}

impl<F> ScalarField for F
where
    F: Fn(Vec3) -> f32,
{
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        self(p)
    }
}

/// Receives the concrete field behind a [`Field`], so generic grid code is
/// monomorphized per field kind instead of matching on every sample.
pub trait FieldVisitor {
    type Output;
    fn visit<F: ScalarField + Sync>(self, field: &F) -> Self::Output;
}

/// Every field kind the scene config can name.
pub enum Field {
    Sphere(SphereField),
    SphereSquared(SquaredSphereField),
    LayeredNoise(LayeredNoiseField),
    Simplex(SimplexField),
    PlanarNoise(PlanarNoiseField),
    PointDensity(PointDensityField),
}

impl Field {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Field::Sphere(_) => "sphere",
            Field::SphereSquared(_) => "sphere_squared",
            Field::LayeredNoise(_) => "layered_noise",
            Field::Simplex(_) => "simplex",
            Field::PlanarNoise(_) => "planar_noise",
            Field::PointDensity(_) => "point_density",
        }
    }

    /// Dispatches once on the field kind and hands the concrete field to `v`.
    pub fn visit<V: FieldVisitor>(&self, v: V) -> V::Output {
        match self {
            Field::Sphere(f) => v.visit(f),
            Field::SphereSquared(f) => v.visit(f),
            Field::LayeredNoise(f) => v.visit(f),
            Field::Simplex(f) => v.visit(f),
            Field::PlanarNoise(f) => v.visit(f),
            Field::PointDensity(f) => v.visit(f),
        }
    }
}

impl ScalarField for Field {
    fn sample(&self, p: Vec3) -> f32 {
        match self {
            Field::Sphere(f) => f.sample(p),
            Field::SphereSquared(f) => f.sample(p),
            Field::LayeredNoise(f) => f.sample(p),
            Field::Simplex(f) => f.sample(p),
            Field::PlanarNoise(f) => f.sample(p),
            Field::PointDensity(f) => f.sample(p),
        }
    }
}
