//! Derived line geometry: silk curves and cilia tendrils.
//!
//! Both are rebuilt from live particle positions every frame into vertex
//! buffers allocated once at construction. Segments that should not be seen
//! are written with zero alpha rather than removed, so buffer sizes and
//! layout never change.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::config::hex_rgba;
use crate::motion::{mix, state_weight, wave};
use crate::particles::ParticleSet;
use crate::spawn::SpawnRng;
use crate::topology::Topology;

/// One end of a line segment, as uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: Vec3, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }

    /// Alpha of this vertex.
    pub fn alpha(&self) -> f32 {
        self.color[3]
    }
}

/// Silk rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SilkConfig {
    /// RGB of the silk; alpha is ignored in favour of `opacity`.
    pub color: Vec4,
    /// Peak opacity of a fully weighted edge.
    pub opacity: f32,
    /// Line segments used to approximate each Bézier curve.
    pub segments: usize,
    /// Edges whose endpoints are farther apart than this are hidden.
    pub break_distance: f32,
    /// Amplitude of the control point wobble.
    pub wobble_amplitude: f32,
    /// Angular frequency of the wobble.
    pub wobble_frequency: f32,
    /// How far the control point is drawn toward a nearby pointer.
    pub pointer_pull: f32,
    /// Extra z lift of the control point near the pointer.
    pub z_lift: f32,
    /// Relative opacity boost near the pointer.
    pub pointer_boost: f32,
}

impl Default for SilkConfig {
    fn default() -> Self {
        Self {
            color: hex_rgba(0x333333, 1.0),
            opacity: 0.5,
            segments: 8,
            break_distance: 14.0,
            wobble_amplitude: 1.5,
            wobble_frequency: 1.3,
            pointer_pull: 0.35,
            z_lift: 6.0,
            pointer_boost: 1.0,
        }
    }
}

/// Cilia rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CiliaConfig {
    /// Number of particles that grow a tendril.
    pub emitters: usize,
    /// Line segments per tendril.
    pub segments: usize,
    /// Resting tendril length.
    pub length: f32,
    /// Sideways wave amplitude at the tip.
    pub wave_amplitude: f32,
    /// Angular frequency of the wave.
    pub wave_frequency: f32,
    /// RGB of the tendrils; alpha is ignored in favour of `opacity`.
    pub color: Vec4,
    /// Opacity at the root of a tendril.
    pub opacity: f32,
    /// Relative length boost near the pointer.
    pub pointer_boost: f32,
}

impl Default for CiliaConfig {
    fn default() -> Self {
        Self {
            emitters: 40,
            segments: 5,
            length: 8.0,
            wave_amplitude: 1.5,
            wave_frequency: 3.0,
            color: hex_rgba(0x444444, 1.0),
            opacity: 0.4,
            pointer_boost: 1.5,
        }
    }
}

/// Per-frame values shared by the derived geometry passes.
#[derive(Debug, Clone, Copy)]
pub struct DerivedFrame {
    pub time: f32,
    pub morph: f32,
    pub burst: f32,
    /// Pointer in field space, if interaction is active.
    pub pointer: Option<Vec3>,
    pub pointer_radius: f32,
}

impl DerivedFrame {
    /// 1 at the pointer, 0 at or beyond `pointer_radius`.
    fn proximity(&self, point: Vec3) -> f32 {
        match self.pointer {
            Some(pointer) if self.pointer_radius > 0.0 => {
                (1.0 - point.distance(pointer) / self.pointer_radius).max(0.0)
            }
            _ => 0.0,
        }
    }
}

/// Point on the quadratic Bézier `a → control → b` at `t`.
#[inline]
pub fn quadratic_bezier(a: Vec3, control: Vec3, b: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    a * (u * u) + control * (2.0 * u * t) + b * (t * t)
}

/// Curved connective lines for every topology edge.
#[derive(Debug, Clone)]
pub struct SilkGeometry {
    vertices: Vec<LineVertex>,
    segments: usize,
}

impl SilkGeometry {
    /// Allocate buffers for all edges of all states.
    pub fn new(topologies: &[Topology], config: &SilkConfig) -> Self {
        let segments = config.segments.max(1);
        let edges: usize = topologies.iter().map(Topology::len).sum();
        Self {
            vertices: vec![LineVertex::default(); edges * segments * 2],
            segments,
        }
    }

    /// Line-list vertices, two per segment.
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Rewrite every curve from the live positions.
    ///
    /// State `k`'s edges are weighted by [`state_weight`], so silk cross-fades
    /// in lockstep with the point cloud morph.
    pub fn update(&mut self, topologies: &[Topology], positions: &[Vec3], frame: &DerivedFrame, config: &SilkConfig) {
        let fade = 1.0 - frame.burst;
        let break_sq = config.break_distance * config.break_distance;
        let per_edge = self.segments * 2;
        let mut cursor = 0;

        for (state, topology) in topologies.iter().enumerate() {
            let weight = state_weight(frame.morph, state, topologies.len());
            for (e, &[a, b]) in topology.edges().iter().enumerate() {
                let span = &mut self.vertices[cursor..cursor + per_edge];
                cursor += per_edge;

                let pa = positions[a as usize];
                let pb = positions[b as usize];
                let mut alpha = config.opacity * weight * fade;
                if alpha <= 0.0 || pa.distance_squared(pb) > break_sq {
                    for v in span.iter_mut() {
                        *v = LineVertex::new(pa, Vec4::ZERO);
                    }
                    continue;
                }

                let mid = (pa + pb) * 0.5;
                let seed = e as f32 * 1.618 + state as f32 * 0.5;
                let phase = frame.time * config.wobble_frequency + seed;
                let mut control = mid
                    + Vec3::new(wave(phase), wave(phase * 0.8 + 1.3), 0.0) * config.wobble_amplitude;

                let proximity = frame.proximity(mid);
                if proximity > 0.0 {
                    if let Some(pointer) = frame.pointer {
                        control = mix(control, pointer, config.pointer_pull * proximity);
                    }
                    control.z += config.z_lift * proximity;
                    alpha = (alpha * (1.0 + config.pointer_boost * proximity)).min(1.0);
                }

                let color = config.color.truncate().extend(alpha);
                let n = self.segments as f32;
                for (s, pair) in span.chunks_exact_mut(2).enumerate() {
                    let t0 = s as f32 / n;
                    let t1 = (s + 1) as f32 / n;
                    pair[0] = LineVertex::new(quadratic_bezier(pa, control, pb, t0), color);
                    pair[1] = LineVertex::new(quadratic_bezier(pa, control, pb, t1), color);
                }
            }
        }
    }
}

/// Short waving tendrils grown from a fixed set of emitter particles.
#[derive(Debug, Clone)]
pub struct CiliaGeometry {
    emitters: Vec<u32>,
    vertices: Vec<LineVertex>,
    segments: usize,
}

impl CiliaGeometry {
    /// Choose emitters among the particles that are live in the first state.
    pub fn new(particles: &ParticleSet, config: &CiliaConfig, rng: &mut SpawnRng) -> Self {
        let pool: Vec<u32> = if particles.state_count() == 0 {
            Vec::new()
        } else {
            (0..particles.count())
                .filter(|&i| !particles.is_padding(0, i))
                .map(|i| i as u32)
                .collect()
        };
        let emitters: Vec<u32> = rng
            .sample_indices(pool.len(), config.emitters)
            .into_iter()
            .map(|i| pool[i])
            .collect();
        let segments = config.segments.max(1);
        Self {
            vertices: vec![LineVertex::default(); emitters.len() * segments * 2],
            emitters,
            segments,
        }
    }

    /// Indices of the emitter particles.
    pub fn emitters(&self) -> &[u32] {
        &self.emitters
    }

    /// Line-list vertices, two per segment.
    pub fn vertices(&self) -> &[LineVertex] {
        &self.vertices
    }

    /// Regrow every tendril from its emitter's live position.
    ///
    /// Tendril opacity follows the emitter's live alpha, so a tendril fades
    /// with a particle that morphs into padding.
    pub fn update(&mut self, positions: &[Vec3], colors: &[Vec4], frame: &DerivedFrame, config: &CiliaConfig) {
        let fade = 1.0 - frame.burst;
        let per_emitter = self.segments * 2;
        let n = self.segments as f32;

        for (e, &index) in self.emitters.iter().enumerate() {
            let root = positions[index as usize];
            let visibility = colors[index as usize].w.clamp(0.0, 1.0);
            let dir = root.try_normalize().unwrap_or(Vec3::Y);
            let side = dir.cross(Vec3::Z).try_normalize().unwrap_or(Vec3::X);

            let proximity = frame.proximity(root);
            let sway = frame.time * config.wave_frequency;
            let length = config.length
                * (1.0 + 0.5 * wave(sway + root.x * 0.05))
                * (1.0 + config.pointer_boost * proximity);
            let amplitude = config.wave_amplitude * (1.0 + proximity);

            let point = |t: f32| root + dir * (length * t) + side * (wave(sway + t * TAU + e as f32) * amplitude * t);

            let span = &mut self.vertices[e * per_emitter..(e + 1) * per_emitter];
            for (s, pair) in span.chunks_exact_mut(2).enumerate() {
                let t0 = s as f32 / n;
                let t1 = (s + 1) as f32 / n;
                let alpha = config.opacity * fade * visibility * (1.0 - (t0 + t1) * 0.5);
                let color = config.color.truncate().extend(alpha.max(0.0));
                pair[0] = LineVertex::new(point(t0), color);
                pair[1] = LineVertex::new(point(t1), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ScatterConfig;
    use crate::sampler::{ParticleKind, PointCloud};

    fn frame(morph: f32, burst: f32) -> DerivedFrame {
        DerivedFrame {
            time: 0.0,
            morph,
            burst,
            pointer: None,
            pointer_radius: 30.0,
        }
    }

    fn still_silk() -> SilkConfig {
        SilkConfig {
            wobble_amplitude: 0.0,
            segments: 4,
            ..SilkConfig::default()
        }
    }

    fn topology_of(edges: &[[u32; 2]]) -> Topology {
        // Two points per edge, all within linking distance.
        let n = edges.iter().flatten().copied().max().map_or(0, |m| m as usize + 1);
        let positions = vec![Vec3::ZERO; n];
        let pool: Vec<u32> = (0..n as u32).collect();
        let mut rng = SpawnRng::from_seed(Some(1));
        let config = crate::topology::TopologyConfig {
            connectivity: 1.0,
            max_distance: 1.0,
            max_edges_per_node: 1,
            stratify: false,
        };
        Topology::build(&positions, &pool, &config, &mut rng)
    }

    #[test]
    fn test_bezier_endpoints() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.0, 1.0);
        let c = Vec3::new(10.0, 10.0, 10.0);
        assert_eq!(quadratic_bezier(a, c, b, 0.0), a);
        assert_eq!(quadratic_bezier(a, c, b, 1.0), b);
    }

    #[test]
    fn test_silk_cross_fade_weights() {
        let topo = topology_of(&[[0, 1]]);
        assert_eq!(topo.len(), 1);
        let topologies = vec![topo.clone(), topo];
        let positions = vec![Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)];
        let config = still_silk();
        let mut silk = SilkGeometry::new(&topologies, &config);
        assert_eq!(silk.vertices().len(), 2 * 4 * 2);

        silk.update(&topologies, &positions, &frame(0.0, 0.0), &config);
        let (a, b) = silk.vertices().split_at(8);
        assert!(a.iter().all(|v| (v.alpha() - 0.5).abs() < 1e-6));
        assert!(b.iter().all(|v| v.alpha() == 0.0));

        silk.update(&topologies, &positions, &frame(1.0, 0.0), &config);
        let (a, b) = silk.vertices().split_at(8);
        assert!(a.iter().all(|v| v.alpha() == 0.0));
        assert!(b.iter().all(|v| (v.alpha() - 0.5).abs() < 1e-6));
    }

    #[test]
    fn test_stretched_edges_hidden() {
        let topologies = vec![topology_of(&[[0, 1]])];
        let positions = vec![Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0)];
        let config = still_silk();
        let mut silk = SilkGeometry::new(&topologies, &config);
        silk.update(&topologies, &positions, &frame(0.0, 0.0), &config);
        assert!(silk.vertices().iter().all(|v| v.alpha() == 0.0));
    }

    #[test]
    fn test_silk_follows_live_positions() {
        let topologies = vec![topology_of(&[[0, 1]])];
        let positions = vec![Vec3::new(1.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 0.0)];
        let config = still_silk();
        let mut silk = SilkGeometry::new(&topologies, &config);
        silk.update(&topologies, &positions, &frame(0.0, 0.0), &config);
        let verts = silk.vertices();
        let ends = [verts[0].position, verts[verts.len() - 1].position];
        assert!(ends.contains(&[1.0, 1.0, 0.0]));
        assert!(ends.contains(&[3.0, 1.0, 0.0]));
    }

    #[test]
    fn test_pointer_lifts_control_point() {
        let topologies = vec![topology_of(&[[0, 1]])];
        let positions = vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)];
        let config = still_silk();
        let mut silk = SilkGeometry::new(&topologies, &config);
        let mut f = frame(0.0, 0.0);
        f.pointer = Some(Vec3::new(2.0, 0.0, 0.0));
        silk.update(&topologies, &positions, &f, &config);
        let mid = silk.vertices()[3].position;
        assert!(mid[2] > 0.0);
        assert!(silk.vertices()[0].alpha() > 0.5);
    }

    #[test]
    fn test_cilia_follow_emitter_alpha() {
        let root = Vec3::new(5.0, 0.0, 0.0);
        let mut cloud = PointCloud::default();
        cloud.push(root, Vec4::ONE, ParticleKind::Accent);
        let mut rng = SpawnRng::from_seed(Some(2));
        let particles = ParticleSet::from_clouds(&[cloud], &ScatterConfig::default(), &mut rng);

        let config = CiliaConfig::default();
        let mut cilia = CiliaGeometry::new(&particles, &config, &mut rng);
        assert_eq!(cilia.emitters(), &[0]);

        cilia.update(&[root], &[Vec4::new(0.5, 0.5, 0.5, 0.0)], &frame(0.0, 0.0), &config);
        assert!(cilia.vertices().iter().all(|v| v.alpha() == 0.0));

        cilia.update(&[root], &[Vec4::ONE], &frame(0.0, 0.0), &config);
        assert!(cilia.vertices()[0].alpha() > 0.0);
    }

    #[test]
    fn test_no_edges_no_vertices() {
        let config = still_silk();
        let mut silk = SilkGeometry::new(&[], &config);
        silk.update(&[], &[], &frame(0.5, 0.0), &config);
        assert!(silk.vertices().is_empty());
    }
}
