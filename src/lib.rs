//! # silkfield - particle portrait field
//!
//! Turns one or more portrait images into an animated field of particles:
//! the points converge from a scatter into the first portrait, morph
//! particle by particle into the next, and finally burst apart. Silk curves
//! link nearby particles and short cilia wave from a few of them. The
//! pointer stirs and highlights particles around it, and a UI zone can be
//! kept clear.
//!
//! ## Quick Start
//!
//! ```ignore
//! use silkfield::prelude::*;
//!
//! fn main() -> Result<(), FieldError> {
//!     Simulation::new()
//!         .with_portrait("portrait-a.png")
//!         .with_portrait("portrait-b.png")
//!         .run()
//! }
//! ```
//!
//! ## Without a window
//!
//! The simulation is plain CPU code and runs headless:
//!
//! ```ignore
//! let config = FieldConfig::default().with_seed(7);
//! let mut field = ParticleField::from_images(&[portrait_a, portrait_b], &config);
//!
//! let mut bridge = ScrollBridge::new(config.timeline.clone());
//! bridge.set_scroll(0.5);
//! let (progress, _transform) = bridge.advance(3.0, 1.0 / 60.0);
//! field.step(&FrameInputs::new(progress, 3.0, 1.0 / 60.0));
//! ```
//!
//! ## Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Image to points | [`sampler`] |
//! | Per-particle buffers | [`particles`] |
//! | Silk edges | [`topology`] |
//! | Frame step | [`field`], [`motion`], [`silk`] |
//! | Scroll and pointer | [`bridge`], [`input`] |
//! | Lifecycle | [`mount`], [`time`] |

pub mod bridge;
pub mod config;
pub mod error;
pub mod field;
mod gpu;
pub mod input;
pub mod motion;
pub mod mount;
pub mod particles;
pub mod sampler;
pub mod silk;
mod simulation;
pub mod spawn;
pub mod time;
pub mod topology;

pub use bridge::{AvoidanceConfig, Easing, FieldTransform, Phase, ScreenRect, ScrollBridge, ScrollTimeline};
pub use config::{hex_rgba, FieldConfig};
pub use error::{ConfigError, FieldError, GpuError, SampleError};
pub use field::{FrameInputs, ParticleField};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::{Camera, ViewConfig};
pub use motion::{AvoidanceRegion, InteractionConfig, MotionConfig, Progress};
pub use mount::{LoadStatus, Liveness, Mount, PendingLoad};
pub use particles::{ParticleSet, ScatterConfig, PADDING_POSITION};
pub use sampler::{decode_portrait, load_portrait, sample_image, ParticleKind, PointCloud, SamplerConfig};
pub use silk::{CiliaConfig, CiliaGeometry, LineVertex, SilkConfig, SilkGeometry};
pub use simulation::Simulation;
pub use spawn::SpawnRng;
pub use topology::{Topology, TopologyConfig};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use silkfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bridge::{ScrollBridge, ScrollTimeline};
    pub use crate::config::FieldConfig;
    pub use crate::error::FieldError;
    pub use crate::field::{FrameInputs, ParticleField};
    pub use crate::motion::{AvoidanceRegion, Progress};
    pub use crate::sampler::{load_portrait, sample_image};
    pub use crate::simulation::Simulation;
    pub use crate::{Vec2, Vec3, Vec4};
}
