use fastnoise_lite::{FastNoiseLite, NoiseType};
use isomarch_geom::Vec3;
use serde::Deserialize;

use crate::ScalarField;

fn make_noise(seed: i32, kind: NoiseType) -> FastNoiseLite {
    let mut n = FastNoiseLite::with_seed(seed);
    n.set_noise_type(Some(kind));
    // Coordinates are pre-scaled by the caller.
    n.set_frequency(Some(1.0));
    n
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b {
        return 0.0;
    }
    ((v - a) / (b - a)).clamp(0.0, 1.0)
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LayeredNoiseParams {
    #[serde(default = "default_seed")]
    pub seed: i32,
    /// Raw octave sums in this range map to `[0, max_height]`.
    #[serde(default = "default_height_range")]
    pub height_range: [f32; 2],
    #[serde(default = "default_max_height")]
    pub max_height: f32,
    /// World units to noise units.
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    /// Frequency multiplier per octave.
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    /// Amplitude multiplier per octave.
    #[serde(default = "default_persistence")]
    pub persistence: f32,
}

fn default_seed() -> i32 {
    1337
}
fn default_height_range() -> [f32; 2] {
    [-1.0, 1.0]
}
fn default_max_height() -> f32 {
    8.0
}
fn default_scale() -> f32 {
    0.1
}
fn default_octaves() -> u32 {
    4
}
fn default_roughness() -> f32 {
    3.0
}
fn default_persistence() -> f32 {
    0.4
}

impl Default for LayeredNoiseParams {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            height_range: default_height_range(),
            max_height: default_max_height(),
            scale: default_scale(),
            offset: [0.0, 0.0],
            octaves: default_octaves(),
            roughness: default_roughness(),
            persistence: default_persistence(),
        }
    }
}

/// Heightmap terrain: `p.y - height(p.x, p.z)`, so everything below the
/// layered-noise surface is negative.
pub struct LayeredNoiseField {
    params: LayeredNoiseParams,
    noise: FastNoiseLite,
}

impl LayeredNoiseField {
    pub fn new(params: LayeredNoiseParams) -> Self {
        let noise = make_noise(params.seed, NoiseType::Perlin);
        Self { params, noise }
    }

    pub fn params(&self) -> &LayeredNoiseParams {
        &self.params
    }

    /// Unnormalized octave sum; each layer contributes noise in `[-1, 1]`
    /// times its amplitude.
    pub fn layered(&self, x: f32, z: f32) -> f32 {
        let p = &self.params;
        let u = x * p.scale + p.offset[0];
        let v = z * p.scale + p.offset[1];
        let mut sum = 0.0_f32;
        let mut freq = 1.0_f32;
        let mut amp = 1.0_f32;
        for _ in 0..p.octaves {
            sum += self.noise.get_noise_2d(u * freq, v * freq) * amp;
            amp *= p.persistence;
            freq *= p.roughness;
        }
        sum
    }

    pub fn height(&self, x: f32, z: f32) -> f32 {
        let [lo, hi] = self.params.height_range;
        inverse_lerp(lo, hi, self.layered(x, z)) * self.params.max_height
    }
}

impl ScalarField for LayeredNoiseField {
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        p.y - self.height(p.x, p.z)
    }
}

/// Raw 3D simplex noise in `[-1, 1]`.
pub struct SimplexField {
    pub scale: f32,
    noise: FastNoiseLite,
}

impl SimplexField {
    pub fn new(seed: i32, scale: f32) -> Self {
        Self {
            scale,
            noise: make_noise(seed, NoiseType::OpenSimplex2),
        }
    }
}

impl ScalarField for SimplexField {
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        let q = p * self.scale;
        self.noise.get_noise_3d(q.x, q.y, q.z)
    }
}

/// 2D Perlin noise over the XZ plane remapped to `[0, 1]`, for marching
/// squares maps. `y` is ignored.
pub struct PlanarNoiseField {
    pub scale: f32,
    pub offset: [f32; 2],
    noise: FastNoiseLite,
}

impl PlanarNoiseField {
    pub fn new(seed: i32, scale: f32, offset: [f32; 2]) -> Self {
        Self {
            scale,
            offset,
            noise: make_noise(seed, NoiseType::Perlin),
        }
    }
}

impl ScalarField for PlanarNoiseField {
    #[inline]
    fn sample(&self, p: Vec3) -> f32 {
        let n = self.noise.get_noise_2d(
            p.x * self.scale + self.offset[0],
            p.z * self.scale + self.offset[1],
        );
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }
}
