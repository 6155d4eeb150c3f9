//! Silk topology.
//!
//! A sparse, undirected set of particle-index pairs per target state. Only a
//! random subset of particles ("connectors") take part, and each connector
//! links greedily to later connectors within `max_distance`, stopping after
//! `max_edges_per_node` links. That keeps the cost at O(k²) over the
//! connector subset instead of O(n²) over the whole field.
//!
//! The edge list never changes after construction. The curve drawn through
//! each edge follows the live particle positions every frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::particles::ParticleSet;
use crate::sampler::ParticleKind;
use crate::spawn::SpawnRng;

/// Settings for building a [`Topology`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Fraction of eligible particles chosen as connectors.
    pub connectivity: f32,
    /// Connectors farther apart than this (in target space) are never linked.
    pub max_distance: f32,
    /// Maximum links a connector adds while scanning.
    pub max_edges_per_node: usize,
    /// Sample accent and ambient particles separately, each at `connectivity`.
    pub stratify: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            connectivity: 0.1,
            max_distance: 6.0,
            max_edges_per_node: 4,
            stratify: true,
        }
    }
}

/// Fixed edge list over particle indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    edges: Vec<[u32; 2]>,
}

impl Topology {
    /// Link connectors drawn from `pool` using their `positions`.
    ///
    /// Picks `floor(connectivity * pool.len())` connectors. Fewer than two
    /// connectors produce an empty topology.
    pub fn build(positions: &[Vec3], pool: &[u32], config: &TopologyConfig, rng: &mut SpawnRng) -> Self {
        let connectors = pick(pool, config.connectivity, rng);
        Self::link(positions, &connectors, config)
    }

    /// Build the topology of one state of a [`ParticleSet`].
    ///
    /// Padding particles are never connectors.
    pub fn for_state(particles: &ParticleSet, state: usize, config: &TopologyConfig, rng: &mut SpawnRng) -> Self {
        let kinds = particles.kinds(state);
        let positions = particles.target(state);

        let connectors = if config.stratify {
            let accent = pool_of(kinds, |k| k == ParticleKind::Accent);
            let ambient = pool_of(kinds, |k| k == ParticleKind::Ambient);
            let mut connectors = pick(&accent, config.connectivity, rng);
            connectors.extend(pick(&ambient, config.connectivity, rng));
            connectors
        } else {
            let live = pool_of(kinds, |k| k != ParticleKind::Padding);
            pick(&live, config.connectivity, rng)
        };

        Self::link(positions, &connectors, config)
    }

    fn link(positions: &[Vec3], connectors: &[u32], config: &TopologyConfig) -> Self {
        let mut edges = Vec::new();
        if connectors.len() < 2 || config.max_edges_per_node == 0 {
            return Self { edges };
        }

        let max_sq = config.max_distance * config.max_distance;
        for (i, &a) in connectors.iter().enumerate() {
            let pa = positions[a as usize];
            let mut added = 0;
            for &b in &connectors[i + 1..] {
                if added >= config.max_edges_per_node {
                    break;
                }
                if pa.distance_squared(positions[b as usize]) < max_sq {
                    edges.push([a, b]);
                    added += 1;
                }
            }
        }

        Self { edges }
    }

    /// The index pairs.
    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether there are no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

fn pool_of(kinds: &[ParticleKind], keep: impl Fn(ParticleKind) -> bool) -> Vec<u32> {
    kinds
        .iter()
        .enumerate()
        .filter(|(_, k)| keep(**k))
        .map(|(i, _)| i as u32)
        .collect()
}

fn pick(pool: &[u32], connectivity: f32, rng: &mut SpawnRng) -> Vec<u32> {
    let amount = (pool.len() as f32 * connectivity.clamp(0.0, 1.0)).floor() as usize;
    rng.sample_indices(pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}
