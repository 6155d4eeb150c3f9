//! Per-particle motion math.
//!
//! Everything here is a pure function of its inputs.
//! [`ParticleField::step`](crate::ParticleField::step) composes them in a
//! fixed order: staggered morph, formation blend, avoidance push, burst, then
//! ambient breathing and drift.

use std::f32::consts::TAU;
use std::ops::{Add, Mul};

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::hex_rgba;

/// Golden angle in radians, used to spread fallback directions by index.
const GOLDEN_ANGLE: f32 = 2.399_963;

/// Ambient motion and avoidance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Amplitude of the sinusoidal breathing offset.
    pub breathing_amplitude: f32,
    /// Angular frequency of breathing, in radians per second.
    pub breathing_frequency: f32,
    /// Edge length of each particle's drift triangle. Zero disables drift.
    pub drift_amplitude: f32,
    /// Drift speed in triangle edges per second.
    pub drift_speed: f32,
    /// Push strength at the center of an avoidance region.
    pub avoidance_force: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            breathing_amplitude: 0.6,
            breathing_frequency: 1.2,
            drift_amplitude: 2.0,
            drift_speed: 0.6,
            avoidance_force: 40.0,
        }
    }
}

impl MotionConfig {
    /// Motion with no ambient offsets, leaving only the scripted transitions.
    pub fn still() -> Self {
        Self {
            breathing_amplitude: 0.0,
            drift_amplitude: 0.0,
            ..Self::default()
        }
    }
}

/// Pointer interaction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Master switch for the pointer pass.
    pub enabled: bool,
    /// Particles closer than this to the pointer react to it.
    pub radius: f32,
    /// Fraction of the way toward the pointer a particle is pulled at zero distance.
    pub attraction: f32,
    /// Rotation around the pointer axis at zero distance, in radians.
    pub twist: f32,
    /// Color particles shift toward near the pointer.
    pub highlight_color: Vec4,
    /// Per-frame (at 60 Hz) color approach rate.
    pub color_response: f32,
    /// Viewports narrower than this (logical px) disable interaction.
    pub min_viewport_width: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 30.0,
            attraction: 0.15,
            twist: 0.35,
            highlight_color: hex_rgba(0x2d936c, 1.0),
            color_response: 0.08,
            min_viewport_width: 768.0,
        }
    }
}

/// The three scroll-driven scalars, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    /// Scatter to structured cloud.
    pub formation: f32,
    /// First target state to last target state.
    pub morph: f32,
    /// Terminal dissolve.
    pub burst: f32,
}

impl Progress {
    /// Build a progress value, clamping every scalar into `[0, 1]`.
    pub fn new(formation: f32, morph: f32, burst: f32) -> Self {
        Self {
            formation,
            morph,
            burst,
        }
        .clamped()
    }

    /// Fully formed, unmorphed, not bursting.
    pub fn formed() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Copy with every scalar clamped into `[0, 1]`. NaN becomes 0.
    pub fn clamped(self) -> Self {
        let c = |v: f32| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self {
            formation: c(self.formation),
            morph: c(self.morph),
            burst: c(self.burst),
        }
    }
}

/// Elliptical zone in the field's local space that particles are pushed out of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidanceRegion {
    /// Center of the ellipse.
    pub center: Vec3,
    /// Half-width and half-height of the ellipse.
    pub half_extents: Vec2,
}

impl AvoidanceRegion {
    pub fn new(center: Vec3, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// Squared normalized distance of `point` from the center.
    ///
    /// Below 1 means inside. `None` if the region has no area.
    pub fn normalized_distance_sq(&self, point: Vec3) -> Option<f32> {
        if self.half_extents.x <= 0.0 || self.half_extents.y <= 0.0 {
            return None;
        }
        let d = (point.truncate() - self.center.truncate()) / self.half_extents;
        Some(d.length_squared())
    }

    /// Outward displacement for a particle at `point`.
    ///
    /// Zero outside the ellipse; `force * (1 - d²)` along the radial direction
    /// inside it. A particle exactly at the center uses a per-index fallback
    /// direction so it is never left in place.
    pub fn displacement(&self, point: Vec3, index: usize, force: f32) -> Vec3 {
        let Some(nd2) = self.normalized_distance_sq(point) else {
            return Vec3::ZERO;
        };
        if nd2 >= 1.0 {
            return Vec3::ZERO;
        }
        let radial = point.truncate() - self.center.truncate();
        let dir = if radial.length_squared() > 1e-12 {
            radial.normalize()
        } else {
            let angle = index as f32 * GOLDEN_ANGLE;
            Vec2::new(angle.cos(), angle.sin())
        };
        (dir * force * (1.0 - nd2)).extend(0.0)
    }
}

/// Linear blend `a·(1−t) + b·t`, exact at both endpoints.
#[inline]
pub fn mix<T>(a: T, b: T, t: f32) -> T
where
    T: Mul<f32, Output = T> + Add<Output = T>,
{
    a * (1.0 - t) + b * t
}

/// Staggered per-particle progress within one transition.
///
/// Every particle sits at 0 while `t == 0` and at 1 once `t == 1`, for any
/// `offset` in `[0, 1)`.
#[inline]
pub fn local_morph(t: f32, offset: f32, stagger_window: f32) -> f32 {
    let window = stagger_window.clamp(0.0, 0.99);
    ((t - offset * window) / (1.0 - window)).clamp(0.0, 1.0)
}

/// Map global morph progress onto a pair of adjacent states.
///
/// With `states` target states there are `states - 1` transitions sharing
/// the `[0, 1]` range. Returns `(from, to, t)`; with fewer than two states
/// there is nothing to blend and the result is `(0, 0, 0)`.
pub fn morph_segment(morph: f32, states: usize) -> (usize, usize, f32) {
    if states < 2 {
        return (0, 0, 0.0);
    }
    let span = (states - 1) as f32;
    let scaled = morph.clamp(0.0, 1.0) * span;
    let from = (scaled.floor() as usize).min(states - 2);
    (from, from + 1, scaled - from as f32)
}

/// How visible state `state`'s silk is at the given morph progress.
///
/// For two states this is `(1 - morph, morph)`.
pub fn state_weight(morph: f32, state: usize, states: usize) -> f32 {
    match states {
        0 => 0.0,
        1 => 1.0,
        n => {
            let scaled = morph.clamp(0.0, 1.0) * (n - 1) as f32;
            (1.0 - (scaled - state as f32).abs()).clamp(0.0, 1.0)
        }
    }
}

/// Small sinusoidal offset, phase-shifted by particle index.
#[inline]
pub fn breathing_offset(index: usize, time: f32, amplitude: f32, frequency: f32) -> Vec3 {
    if amplitude == 0.0 {
        return Vec3::ZERO;
    }
    let phase = index as f32 * 0.37;
    Vec3::new(
        (time * frequency + phase).sin(),
        (time * frequency * 0.8 + phase * 1.3).cos(),
        (time * frequency * 0.6 + phase * 0.7).sin() * 0.5,
    ) * amplitude
}

/// Offset along a small triangle path with corners
/// `(0,0,0)`, `(a,0,a/2)`, `(a/2,a,-a/2)`.
pub fn drift_offset(segment: u8, progress: f32, amplitude: f32) -> Vec3 {
    if amplitude == 0.0 {
        return Vec3::ZERO;
    }
    let corners = [
        Vec3::ZERO,
        Vec3::new(amplitude, 0.0, amplitude * 0.5),
        Vec3::new(amplitude * 0.5, amplitude, -amplitude * 0.5),
    ];
    let s = (segment % 3) as usize;
    mix(corners[s], corners[(s + 1) % 3], progress)
}

/// Advance drift state by `delta` edges, wrapping to the next edge.
#[inline]
pub fn advance_drift(segment: &mut u8, progress: &mut f32, delta: f32) {
    *progress += delta;
    while *progress >= 1.0 {
        *progress -= 1.0;
        *segment = (*segment + 1) % 3;
    }
}

/// Convert a per-60Hz-frame approach rate into one for an arbitrary delta.
#[inline]
pub fn smoothing_factor(rate: f32, delta: f32) -> f32 {
    if delta <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(delta * 60.0)
}

/// Rotate `offset` around the z axis by `angle`.
#[inline]
pub fn twist_z(offset: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(offset.x * c - offset.y * s, offset.x * s + offset.y * c, offset.z)
}

/// Unit wave used by silk and cilia, one cycle per `TAU` of `phase`.
#[inline]
pub(crate) fn wave(phase: f32) -> f32 {
    (phase % TAU).sin()
}
