//! The particle field and its per-frame simulation step.
//!
//! [`ParticleField`] is the single owner and single writer of every live
//! buffer: particle positions and colors, silk vertices and cilia vertices.
//! Callers hand it one [`FrameInputs`] per frame; after [`ParticleField::step`]
//! returns, all buffers reflect those inputs and are ready to upload.
//!
//! # Example
//!
//! ```ignore
//! let mut field = ParticleField::from_images(&[portrait_a, portrait_b], &FieldConfig::default());
//!
//! // every frame
//! let inputs = FrameInputs::new(Progress::new(1.0, scroll_morph, 0.0), time, delta)
//!     .with_pointer(pointer_in_field_space);
//! field.step(&inputs);
//! upload(field.particles().positions(), field.particles().colors());
//! ```

use glam::{Vec3, Vec4};
use image::RgbaImage;

use crate::config::FieldConfig;
use crate::motion::{
    advance_drift, breathing_offset, drift_offset, mix, smoothing_factor, twist_z, AvoidanceRegion,
    InteractionConfig, MotionConfig, Progress,
};
use crate::particles::ParticleSet;
use crate::sampler::{sample_image, PointCloud};
use crate::silk::{CiliaConfig, CiliaGeometry, DerivedFrame, SilkConfig, SilkGeometry};
use crate::spawn::SpawnRng;
use crate::topology::Topology;

/// Everything the simulation reads in one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInputs {
    pub progress: Progress,
    /// Pointer projected into field space. `None` when absent or disabled.
    pub pointer: Option<Vec3>,
    /// Zone to keep clear, in field space.
    pub avoidance: Option<AvoidanceRegion>,
    /// Seconds since the field started.
    pub time: f32,
    /// Seconds since the previous frame.
    pub delta: f32,
}

impl FrameInputs {
    pub fn new(progress: Progress, time: f32, delta: f32) -> Self {
        Self {
            progress,
            pointer: None,
            avoidance: None,
            time,
            delta,
        }
    }

    pub fn with_pointer(mut self, pointer: Option<Vec3>) -> Self {
        self.pointer = pointer;
        self
    }

    pub fn with_avoidance(mut self, avoidance: Option<AvoidanceRegion>) -> Self {
        self.avoidance = avoidance;
        self
    }
}

/// A constructed particle portrait with its derived geometry.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: ParticleSet,
    topologies: Vec<Topology>,
    silk: SilkGeometry,
    cilia: CiliaGeometry,
    base_color: Vec<Vec4>,
    motion: MotionConfig,
    interaction: InteractionConfig,
    silk_config: SilkConfig,
    cilia_config: CiliaConfig,
}

impl ParticleField {
    /// Build a field from already sampled point clouds, one per target state.
    pub fn new(clouds: &[PointCloud], config: &FieldConfig) -> Self {
        let mut rng = SpawnRng::from_seed(config.seed);
        Self::build(clouds, config, &mut rng)
    }

    /// Sample each portrait and build a field from the results.
    ///
    /// Sampling and construction share one RNG, so a fixed seed reproduces
    /// the whole field.
    pub fn from_images(images: &[RgbaImage], config: &FieldConfig) -> Self {
        let mut rng = SpawnRng::from_seed(config.seed);
        let clouds: Vec<PointCloud> = images
            .iter()
            .enumerate()
            .map(|(state, image)| {
                let cloud = sample_image(image, &config.sampler, &mut rng);
                if cloud.is_empty() {
                    log::warn!("portrait {} has no qualifying pixels", state);
                }
                cloud
            })
            .collect();
        Self::build(&clouds, config, &mut rng)
    }

    fn build(clouds: &[PointCloud], config: &FieldConfig, rng: &mut SpawnRng) -> Self {
        let particles = ParticleSet::from_clouds(clouds, &config.scatter, rng);
        let topologies: Vec<Topology> = (0..particles.state_count())
            .map(|state| Topology::for_state(&particles, state, &config.topology, rng))
            .collect();
        let silk = SilkGeometry::new(&topologies, &config.silk);
        let cilia = CiliaGeometry::new(&particles, &config.cilia, rng);

        if particles.count() == 0 {
            log::warn!("particle field is empty; nothing will be drawn");
        } else {
            log::info!(
                "particle field: {} particles, {} states, edges per state {:?}, {} cilia",
                particles.count(),
                particles.state_count(),
                topologies.iter().map(Topology::len).collect::<Vec<_>>(),
                cilia.emitters().len()
            );
        }

        Self {
            base_color: vec![Vec4::ZERO; particles.count()],
            particles,
            topologies,
            silk,
            cilia,
            motion: config.motion.clone(),
            interaction: config.interaction.clone(),
            silk_config: config.silk.clone(),
            cilia_config: config.cilia.clone(),
        }
    }

    /// Advance the field by one frame.
    ///
    /// Order: per-particle position pass, pointer and color pass, then the
    /// silk and cilia passes that read the finished positions.
    pub fn step(&mut self, inputs: &FrameInputs) {
        let progress = inputs.progress.clamped();
        let fade = 1.0 - progress.burst;

        self.update_positions(inputs, progress, fade);

        let pointer = if self.interaction.enabled { inputs.pointer } else { None };
        let response = smoothing_factor(self.interaction.color_response, inputs.delta);
        match pointer {
            Some(target) => self.apply_pointer(target, fade, response),
            None => {
                for i in 0..self.particles.count() {
                    self.relax_color(i, fade, response);
                }
            }
        }

        let frame = DerivedFrame {
            time: inputs.time,
            morph: progress.morph,
            burst: progress.burst,
            pointer,
            pointer_radius: self.interaction.radius,
        };
        self.silk
            .update(&self.topologies, &self.particles.position, &frame, &self.silk_config);
        self.cilia.update(
            &self.particles.position,
            &self.particles.color,
            &frame,
            &self.cilia_config,
        );
    }

    fn update_positions(&mut self, inputs: &FrameInputs, progress: Progress, fade: f32) {
        let motion = &self.motion;
        let drift_delta = motion.drift_speed * inputs.delta.max(0.0);

        for i in 0..self.particles.count() {
            let mut p = self
                .particles
                .formation_position(i, progress.formation, progress.morph);

            if let Some(region) = &inputs.avoidance {
                p += region.displacement(p, i, motion.avoidance_force);
            }
            if progress.burst > 0.0 {
                p += self.particles.burst_directions()[i] * progress.burst;
            }

            advance_drift(
                &mut self.particles.drift_segment[i],
                &mut self.particles.drift_progress[i],
                drift_delta,
            );
            let ambient = breathing_offset(i, inputs.time, motion.breathing_amplitude, motion.breathing_frequency)
                + drift_offset(
                    self.particles.drift_segment[i],
                    self.particles.drift_progress[i],
                    motion.drift_amplitude,
                );
            p += ambient * fade;

            self.particles.position[i] = p;
            self.base_color[i] = self.particles.base_color(i, progress.morph);
        }
    }

    fn apply_pointer(&mut self, target: Vec3, fade: f32, response: f32) {
        let radius = self.interaction.radius;
        let highlight = self.interaction.highlight_color.truncate().extend(fade);

        for i in 0..self.particles.count() {
            let offset = self.particles.position[i] - target;
            let dist = offset.length();
            if radius <= 0.0 || dist >= radius {
                self.relax_color(i, fade, response);
                continue;
            }

            let proximity = 1.0 - dist / radius;
            let twisted = target + twist_z(offset, self.interaction.twist * proximity);
            self.particles.position[i] = mix(twisted, target, self.interaction.attraction * proximity);

            // padding in the current state stays invisible
            let visible = if self.base_color[i].w > 0.0 { 1.0 } else { 0.0 };
            let goal = highlight.truncate().extend(highlight.w * visible);
            self.particles.color[i] = mix(self.particles.color[i], goal, response);
        }
    }

    fn relax_color(&mut self, i: usize, fade: f32, response: f32) {
        let base = self.base_color[i];
        let goal = base.truncate().extend(base.w * fade);
        self.particles.color[i] = mix(self.particles.color[i], goal, response);
    }

    /// The particle buffers.
    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// One topology per target state.
    pub fn topologies(&self) -> &[Topology] {
        &self.topologies
    }

    /// Silk line geometry.
    pub fn silk(&self) -> &SilkGeometry {
        &self.silk
    }

    /// Cilia line geometry.
    pub fn cilia(&self) -> &CiliaGeometry {
        &self.cilia
    }

    /// Number of particles.
    pub fn count(&self) -> usize {
        self.particles.count()
    }

    /// Whether the field has no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.count() == 0
    }
}
