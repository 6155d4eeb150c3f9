//! Portrait sampling.
//!
//! Turns a raster portrait into a sparse point cloud: every sufficiently
//! opaque, sufficiently dark pixel becomes a candidate particle, a fraction
//! of candidates is dropped to thin the cloud, and the survivors are placed
//! in a centered 3D space whose height is fixed regardless of the source
//! resolution.
//!
//! # Example
//!
//! ```ignore
//! let image = silkfield::sampler::load_portrait("assets/portrait.png")?;
//! let mut rng = SpawnRng::from_seed(Some(1));
//! let cloud = sample_image(&image, &SamplerConfig::default(), &mut rng);
//! println!("{} particles", cloud.len());
//! ```

use std::path::Path;

use glam::{Vec3, Vec4};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::config::hex_rgba;
use crate::error::SampleError;
use crate::spawn::SpawnRng;

/// Role of a particle within one target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    /// Dark, fully opaque particle. Drawn solid and favoured as a silk anchor.
    Accent,
    /// Light, faint particle forming the bulk of the portrait.
    Ambient,
    /// Placeholder that keeps index alignment between states of different size.
    Padding,
}

/// Settings for turning pixels into particles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Sample every `stride`-th pixel in each direction. Values below 1 act as 1.
    pub stride: u32,
    /// Pixels must have alpha strictly above this to count as ink.
    pub alpha_threshold: u8,
    /// Pixels must have luminance strictly below this (0-255 scale).
    pub brightness_threshold: f32,
    /// Probability of discarding a qualifying pixel.
    pub drop_probability: f32,
    /// Total z thickness of the cloud; z is uniform in `[-depth/2, depth/2]`.
    pub depth: f32,
    /// World-space height the full image is fitted to.
    pub target_height: f32,
    /// Probability that a particle becomes an accent particle.
    pub accent_probability: f32,
    /// RGBA of accent particles.
    pub accent_color: Vec4,
    /// RGBA of ambient particles.
    pub ambient_color: Vec4,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            stride: 1,
            alpha_threshold: 128,
            brightness_threshold: 80.0,
            drop_probability: 0.1,
            depth: 15.0,
            target_height: 160.0,
            accent_probability: 0.3,
            accent_color: hex_rgba(0x222222, 1.0),
            ambient_color: hex_rgba(0x888888, 0.3),
        }
    }
}

impl SamplerConfig {
    /// Set the pixel stride.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// Set the thinning probability.
    pub fn with_drop_probability(mut self, probability: f32) -> Self {
        self.drop_probability = probability;
        self
    }

    /// Set the accent probability.
    pub fn with_accent_probability(mut self, probability: f32) -> Self {
        self.accent_probability = probability;
        self
    }

    /// Set the world height the image is fitted to.
    pub fn with_target_height(mut self, height: f32) -> Self {
        self.target_height = height;
        self
    }

    /// Set the z thickness of the cloud.
    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }
}

/// Parallel arrays describing one sampled portrait.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    /// Particle positions in the centered world frame.
    pub positions: Vec<Vec3>,
    /// Particle RGBA colors.
    pub colors: Vec<Vec4>,
    /// Particle roles.
    pub kinds: Vec<ParticleKind>,
}

impl PointCloud {
    /// Number of particles in the cloud.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the image produced no particles at all.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append a particle.
    pub fn push(&mut self, position: Vec3, color: Vec4, kind: ParticleKind) {
        self.positions.push(position);
        self.colors.push(color);
        self.kinds.push(kind);
    }

    /// Number of accent particles.
    pub fn accent_count(&self) -> usize {
        self.kinds.iter().filter(|k| **k == ParticleKind::Accent).count()
    }
}

/// Perceptual brightness of an RGB triple on a 0-255 scale.
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// Sample a decoded portrait into a point cloud.
///
/// An image without qualifying pixels (or with a zero dimension) yields an
/// empty cloud.
pub fn sample_image(image: &RgbaImage, config: &SamplerConfig, rng: &mut SpawnRng) -> PointCloud {
    let (width, height) = image.dimensions();
    let mut cloud = PointCloud::default();
    if width == 0 || height == 0 {
        return cloud;
    }

    let stride = config.stride.max(1) as usize;
    let scale = config.target_height / height as f32;
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;
    let half_depth = config.depth / 2.0;

    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            let [r, g, b, a] = image.get_pixel(x, y).0;
            if a <= config.alpha_threshold || luminance(r, g, b) >= config.brightness_threshold {
                continue;
            }
            if rng.chance(config.drop_probability) {
                continue;
            }

            let position = Vec3::new(
                (x as f32 - half_w) * scale,
                -(y as f32 - half_h) * scale,
                rng.random_range(-half_depth, half_depth),
            );
            if rng.chance(config.accent_probability) {
                cloud.push(position, config.accent_color, ParticleKind::Accent);
            } else {
                cloud.push(position, config.ambient_color, ParticleKind::Ambient);
            }
        }
    }

    cloud
}

/// Read and decode a portrait from disk.
pub fn load_portrait<P: AsRef<Path>>(path: P) -> Result<RgbaImage, SampleError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_portrait(&bytes)
}

/// Decode a portrait from an in-memory encoded image (PNG or JPEG).
pub fn decode_portrait(bytes: &[u8]) -> Result<RgbaImage, SampleError> {
    Ok(image::load_from_memory(bytes)?.into_rgba8())
}
