//! Field configuration.
//!
//! [`FieldConfig`] gathers the settings of every stage. Each section has
//! defaults tuned for a portrait about 160 units tall viewed from 180 units
//! away, and every struct is `#[serde(default)]`, so a JSON file only needs
//! the values it changes:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "sampler": { "stride": 2 },
//!   "silk": { "opacity": 0.8 }
//! }
//! ```

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::bridge::{AvoidanceConfig, ScrollTimeline};
use crate::error::ConfigError;
use crate::gpu::ViewConfig;
use crate::motion::{InteractionConfig, MotionConfig};
use crate::particles::ScatterConfig;
use crate::sampler::SamplerConfig;
use crate::silk::{CiliaConfig, SilkConfig};
use crate::topology::TopologyConfig;

/// Convert `0xRRGGBB` plus an alpha into RGBA floats in `[0, 1]`.
pub fn hex_rgba(hex: u32, alpha: f32) -> Vec4 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec4::new(r, g, b, alpha)
}

/// Complete configuration of a particle field and its presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Seed for every random decision. `None` picks one from the clock.
    pub seed: Option<u64>,
    pub sampler: SamplerConfig,
    pub scatter: ScatterConfig,
    pub topology: TopologyConfig,
    pub motion: MotionConfig,
    pub interaction: InteractionConfig,
    pub silk: SilkConfig,
    pub cilia: CiliaConfig,
    pub timeline: ScrollTimeline,
    pub view: ViewConfig,
    /// Screen-space zone kept clear of particles. `None` disables avoidance.
    pub avoidance: Option<AvoidanceConfig>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            seed: None,
            sampler: SamplerConfig::default(),
            scatter: ScatterConfig::default(),
            topology: TopologyConfig::default(),
            motion: MotionConfig::default(),
            interaction: InteractionConfig::default(),
            silk: SilkConfig::default(),
            cilia: CiliaConfig::default(),
            timeline: ScrollTimeline::default(),
            view: ViewConfig::default(),
            avoidance: Some(AvoidanceConfig::default()),
        }
    }
}

impl FieldConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Fix the seed so construction is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerConfig) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_scatter(mut self, scatter: ScatterConfig) -> Self {
        self.scatter = scatter;
        self
    }

    pub fn with_topology(mut self, topology: TopologyConfig) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_silk(mut self, silk: SilkConfig) -> Self {
        self.silk = silk;
        self
    }

    pub fn with_cilia(mut self, cilia: CiliaConfig) -> Self {
        self.cilia = cilia;
        self
    }

    pub fn with_timeline(mut self, timeline: ScrollTimeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_view(mut self, view: ViewConfig) -> Self {
        self.view = view;
        self
    }

    pub fn with_avoidance(mut self, avoidance: Option<AvoidanceConfig>) -> Self {
        self.avoidance = avoidance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_rgba() {
        assert_eq!(hex_rgba(0xff0000, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(hex_rgba(0x0000ff, 0.5), Vec4::new(0.0, 0.0, 1.0, 0.5));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = FieldConfig::from_json_str(r#"{ "seed": 7, "sampler": { "stride": 3 } }"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.sampler.stride, 3);
        assert_eq!(config.sampler.alpha_threshold, 128);
        assert_eq!(config.topology.max_edges_per_node, 4);
        assert!(config.avoidance.is_some());
    }

    #[test]
    fn test_null_avoidance_disables_it() {
        let config = FieldConfig::from_json_str(r#"{ "avoidance": null }"#).unwrap();
        assert!(config.avoidance.is_none());
    }

    #[test]
    fn test_builders_replace_sections() {
        let config = FieldConfig::default()
            .with_scatter(ScatterConfig { half_size: 42.0, ..Default::default() })
            .with_topology(TopologyConfig { max_distance: 3.0, ..Default::default() })
            .with_interaction(InteractionConfig { radius: 7.0, ..Default::default() })
            .with_silk(SilkConfig { opacity: 0.25, ..Default::default() })
            .with_cilia(CiliaConfig { emitters: 2, ..Default::default() })
            .with_timeline(ScrollTimeline { intro_secs: 1.5, ..Default::default() })
            .with_view(ViewConfig { distance: 300.0, ..Default::default() })
            .with_avoidance(None);

        assert_eq!(config.scatter.half_size, 42.0);
        assert_eq!(config.topology.max_distance, 3.0);
        assert_eq!(config.interaction.radius, 7.0);
        assert_eq!(config.silk.opacity, 0.25);
        assert_eq!(config.cilia.emitters, 2);
        assert_eq!(config.timeline.intro_secs, 1.5);
        assert_eq!(config.view.distance, 300.0);
        assert!(config.avoidance.is_none());
        // untouched sections keep their defaults
        assert_eq!(config.silk.segments, SilkConfig::default().segments);
    }

    #[test]
    fn test_json_round_trip() {
        let config = FieldConfig::default().with_seed(3);
        let json = config.to_json().unwrap();
        let back = FieldConfig::from_json_str(&json).unwrap();
        assert_eq!(back.seed, Some(3));
        assert_eq!(back.silk.segments, config.silk.segments);
        assert_eq!(back.interaction.highlight_color, config.interaction.highlight_color);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        assert!(matches!(FieldConfig::from_json_str("{ nope"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            FieldConfig::from_file("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
