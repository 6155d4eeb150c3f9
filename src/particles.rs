//! Particle buffers.
//!
//! [`ParticleSet`] owns every per-particle array of the field. All arrays are
//! index-aligned: entry `i` of each array describes the same particle. The
//! particle count is fixed at construction and nothing is allocated after
//! that; the simulation loop only mutates `position`, `color` and the drift
//! metadata in place.
//!
//! Target states are generic over N. States sampled from smaller portraits
//! are padded with [`ParticleKind::Padding`] entries: parked far outside the
//! view frustum at zero alpha.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::motion::{local_morph, mix, morph_segment};
use crate::sampler::{ParticleKind, PointCloud};
use crate::spawn::SpawnRng;

/// Where padding particles are parked. Beyond the default far plane.
pub const PADDING_POSITION: Vec3 = Vec3::new(0.0, 0.0, -5000.0);

/// Settings for the scattered start state and per-particle animation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Half-size of the cube initial positions are drawn from.
    pub half_size: f32,
    /// Minimum burst displacement magnitude.
    pub burst_min: f32,
    /// Maximum burst displacement magnitude.
    pub burst_max: f32,
    /// Position given to padding particles.
    pub padding_position: Vec3,
    /// Fraction of a morph transition used to stagger particle start times.
    pub stagger_window: f32,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            half_size: 400.0,
            burst_min: 50.0,
            burst_max: 250.0,
            padding_position: PADDING_POSITION,
            stagger_window: 0.4,
        }
    }
}

/// All per-particle arrays of a field.
#[derive(Debug, Clone)]
pub struct ParticleSet {
    count: usize,
    /// Live positions, rewritten every frame.
    pub(crate) position: Vec<Vec3>,
    /// Live RGBA colors, smoothed every frame.
    pub(crate) color: Vec<Vec4>,
    targets: Vec<Vec<Vec3>>,
    target_colors: Vec<Vec<Vec4>>,
    kinds: Vec<Vec<ParticleKind>>,
    initial: Vec<Vec3>,
    morph_offset: Vec<f32>,
    burst_direction: Vec<Vec3>,
    /// Current edge (0..3) of each particle's drift triangle.
    pub(crate) drift_segment: Vec<u8>,
    /// Progress along the current drift edge, in `[0, 1)`.
    pub(crate) drift_progress: Vec<f32>,
    stagger_window: f32,
}

impl ParticleSet {
    /// Build the buffers from one point cloud per target state.
    ///
    /// `count` is the largest cloud's size. Empty input (no clouds, or only
    /// empty clouds) produces a set with `count == 0`.
    pub fn from_clouds(clouds: &[PointCloud], config: &ScatterConfig, rng: &mut SpawnRng) -> Self {
        let count = clouds.iter().map(PointCloud::len).max().unwrap_or(0);

        let mut targets = Vec::with_capacity(clouds.len());
        let mut target_colors = Vec::with_capacity(clouds.len());
        let mut kinds = Vec::with_capacity(clouds.len());
        for cloud in clouds {
            let mut positions = cloud.positions.clone();
            let mut colors = cloud.colors.clone();
            let mut roles = cloud.kinds.clone();
            positions.resize(count, config.padding_position);
            colors.resize(count, Vec4::ZERO);
            roles.resize(count, ParticleKind::Padding);
            targets.push(positions);
            target_colors.push(colors);
            kinds.push(roles);
        }

        let mut initial = Vec::with_capacity(count);
        let mut morph_offset = Vec::with_capacity(count);
        let mut burst_direction = Vec::with_capacity(count);
        let mut drift_segment = Vec::with_capacity(count);
        let mut drift_progress = Vec::with_capacity(count);
        for _ in 0..count {
            initial.push(rng.random_in_cube(config.half_size));
            morph_offset.push(rng.random());
            burst_direction.push(rng.random_in_shell(config.burst_min, config.burst_max));
            drift_segment.push((rng.random() * 3.0) as u8 % 3);
            drift_progress.push(rng.random());
        }

        let color = match target_colors.first() {
            Some(first) => first.iter().map(|c| Vec4::new(c.x, c.y, c.z, 0.0)).collect(),
            None => Vec::new(),
        };

        Self {
            count,
            position: initial.clone(),
            color,
            targets,
            target_colors,
            kinds,
            initial,
            morph_offset,
            burst_direction,
            drift_segment,
            drift_progress,
            stagger_window: config.stagger_window.clamp(0.0, 0.99),
        }
    }

    /// Number of particles. Never changes after construction.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of target states.
    #[inline]
    pub fn state_count(&self) -> usize {
        self.targets.len()
    }

    /// Live positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.position
    }

    /// Live RGBA colors.
    pub fn colors(&self) -> &[Vec4] {
        &self.color
    }

    /// Target positions of one state.
    pub fn target(&self, state: usize) -> &[Vec3] {
        &self.targets[state]
    }

    /// Target colors of one state (padding entries have zero alpha).
    pub fn target_colors(&self, state: usize) -> &[Vec4] {
        &self.target_colors[state]
    }

    /// Particle roles within one state.
    pub fn kinds(&self, state: usize) -> &[ParticleKind] {
        &self.kinds[state]
    }

    /// Whether particle `index` is padding in `state`.
    pub fn is_padding(&self, state: usize, index: usize) -> bool {
        self.kinds[state][index] == ParticleKind::Padding
    }

    /// Scattered start positions of the formation animation.
    pub fn initial(&self) -> &[Vec3] {
        &self.initial
    }

    /// Per-particle morph stagger offsets in `[0, 1)`.
    pub fn morph_offsets(&self) -> &[f32] {
        &self.morph_offset
    }

    /// Per-particle burst displacement at `burst == 1`.
    pub fn burst_directions(&self) -> &[Vec3] {
        &self.burst_direction
    }

    /// Fraction of a transition used for staggering.
    pub fn stagger_window(&self) -> f32 {
        self.stagger_window
    }

    /// Staggered morph progress of one particle, with the states it blends.
    ///
    /// Returns `(from, to, local)`.
    pub fn local_morph(&self, index: usize, morph: f32) -> (usize, usize, f32) {
        let (from, to, t) = morph_segment(morph, self.state_count());
        (from, to, local_morph(t, self.morph_offset[index], self.stagger_window))
    }

    /// Position of one particle after formation and morph interpolation,
    /// before any frame-local displacement.
    ///
    /// At `formation == 0` this is exactly `initial[index]`.
    pub fn formation_position(&self, index: usize, formation: f32, morph: f32) -> Vec3 {
        if self.targets.is_empty() {
            return self.initial[index];
        }
        let (from, to, local) = self.local_morph(index, morph);
        let morph_target = mix(self.targets[from][index], self.targets[to][index], local);
        mix(self.initial[index], morph_target, formation.clamp(0.0, 1.0))
    }

    /// Baseline color of one particle at the given morph progress.
    pub fn base_color(&self, index: usize, morph: f32) -> Vec4 {
        if self.target_colors.is_empty() {
            return Vec4::ZERO;
        }
        let (from, to, local) = self.local_morph(index, morph);
        mix(self.target_colors[from][index], self.target_colors[to][index], local)
    }
}
