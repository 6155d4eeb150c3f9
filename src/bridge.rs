//! Scroll and pointer bridge.
//!
//! Turns host signals into the values [`ParticleField::step`] consumes:
//!
//! - normalized scroll progress runs through a [`ScrollTimeline`] whose
//!   phases produce `formation`, `morph`, `burst` and the group
//!   [`FieldTransform`];
//! - pointer and UI rectangles in window pixels are unprojected through the
//!   camera and the inverse group transform into the field's local space.
//!
//! The field itself never sees scroll positions, pixels or matrices.
//!
//! [`ParticleField::step`]: crate::field::ParticleField::step

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::gpu::Camera;
use crate::motion::{mix, AvoidanceRegion, Progress};

// ========== Easing ==========

/// Monotonic easing curves mapping `[0, 1]` onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicOut,
    CubicInOut,
}

impl Easing {
    /// Ease `t`, clamped into `[0, 1]` first.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// A sub-range of scroll progress with its easing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub start: f32,
    pub end: f32,
    #[serde(default)]
    pub easing: Easing,
}

impl Phase {
    pub fn new(start: f32, end: f32, easing: Easing) -> Self {
        Self { start, end, easing }
    }

    /// Eased progress of this phase at `scroll`.
    ///
    /// 0 before `start`, 1 after `end`. An empty phase is a step at `end`.
    pub fn progress(&self, scroll: f32) -> f32 {
        if self.end <= self.start {
            return if scroll >= self.end { 1.0 } else { 0.0 };
        }
        self.easing.apply((scroll - self.start) / (self.end - self.start))
    }
}

// ========== Timeline ==========

/// Maps scroll progress onto the field's control values.
///
/// Phases are sequential and disjoint by default: the group transform first,
/// then the morph, then the burst. Formation plays as a timed intro unless a
/// `formation` phase binds it to scroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollTimeline {
    /// Length of the timed formation intro in seconds. 0 starts formed.
    pub intro_secs: f32,
    pub intro_easing: Easing,
    /// Drive formation from scroll instead of the intro.
    pub formation: Option<Phase>,
    pub transform: Phase,
    pub morph: Phase,
    pub burst: Phase,
    /// Group scale reached at the end of the transform phase.
    pub scale_to: f32,
    /// Full turns around the y axis over the transform phase.
    pub rotation_turns: f32,
    /// Group offset reached at the end of the transform phase.
    pub translate_to: Vec3,
    /// Time constant of the scrub smoothing in seconds. 0 follows scroll exactly.
    pub scrub_secs: f32,
    /// Scroll progress per wheel line.
    pub wheel_step: f32,
}

impl Default for ScrollTimeline {
    fn default() -> Self {
        Self {
            intro_secs: 2.5,
            intro_easing: Easing::CubicOut,
            formation: None,
            transform: Phase::new(0.0, 0.3, Easing::QuadInOut),
            morph: Phase::new(0.3, 0.65, Easing::QuadInOut),
            burst: Phase::new(0.7, 1.0, Easing::QuadIn),
            scale_to: 1.4,
            rotation_turns: 1.0,
            translate_to: Vec3::ZERO,
            scrub_secs: 0.35,
            wheel_step: 0.04,
        }
    }
}

impl ScrollTimeline {
    /// Formation from the timed intro alone.
    pub fn intro(&self, time: f32) -> f32 {
        if self.intro_secs <= 0.0 {
            return 1.0;
        }
        self.intro_easing.apply(time / self.intro_secs)
    }

    /// Control scalars at `time` seconds and scroll progress `scroll`.
    pub fn progress(&self, time: f32, scroll: f32) -> Progress {
        let formation = match &self.formation {
            Some(phase) => phase.progress(scroll),
            None => self.intro(time),
        };
        Progress::new(formation, self.morph.progress(scroll), self.burst.progress(scroll))
    }

    /// Group transform at scroll progress `scroll`.
    pub fn transform_at(&self, scroll: f32) -> FieldTransform {
        let t = self.transform.progress(scroll);
        FieldTransform {
            scale: mix(1.0, self.scale_to, t),
            rotation_y: self.rotation_turns * TAU * t,
            translation: self.translate_to * t,
        }
    }
}

/// Placement of the whole field in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldTransform {
    pub scale: f32,
    /// Rotation around the world y axis in radians.
    pub rotation_y: f32,
    pub translation: Vec3,
}

impl Default for FieldTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_y: 0.0,
            translation: Vec3::ZERO,
        }
    }
}

impl FieldTransform {
    /// Local-to-world matrix.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale.max(MIN_SCALE)),
            Quat::from_rotation_y(self.rotation_y),
            self.translation,
        )
    }

    /// World-to-local matrix.
    pub fn inverse_matrix(&self) -> Mat4 {
        self.model_matrix().inverse()
    }
}

const MIN_SCALE: f32 = 1e-4;

// ========== Scroll state ==========

/// Scroll progress with scrub smoothing, fed once per frame.
#[derive(Debug, Clone)]
pub struct ScrollBridge {
    timeline: ScrollTimeline,
    target: f32,
    scroll: f32,
}

impl ScrollBridge {
    pub fn new(timeline: ScrollTimeline) -> Self {
        Self {
            timeline,
            target: 0.0,
            scroll: 0.0,
        }
    }

    pub fn timeline(&self) -> &ScrollTimeline {
        &self.timeline
    }

    /// Set the raw scroll progress, clamped into `[0, 1]`.
    pub fn set_scroll(&mut self, progress: f32) {
        if progress.is_finite() {
            self.target = progress.clamp(0.0, 1.0);
        }
    }

    /// Move the raw scroll progress by `lines` wheel lines.
    pub fn scroll_by(&mut self, lines: f32) {
        self.set_scroll(self.target + lines * self.timeline.wheel_step);
    }

    /// Raw scroll progress.
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Smoothed scroll progress.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Advance the scrub smoothing and sample the timeline.
    pub fn advance(&mut self, time: f32, delta: f32) -> (Progress, FieldTransform) {
        let k = if self.timeline.scrub_secs <= 0.0 {
            1.0
        } else {
            1.0 - (-delta.max(0.0) / self.timeline.scrub_secs).exp()
        };
        self.scroll += (self.target - self.scroll) * k;
        if (self.target - self.scroll).abs() < 1e-4 {
            self.scroll = self.target;
        }
        (
            self.timeline.progress(time, self.scroll),
            self.timeline.transform_at(self.scroll),
        )
    }
}

// ========== Screen space ==========

/// Axis-aligned rectangle in physical window pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// A UI element kept clear of particles, anchored bottom-centre.
///
/// Sizes are in logical pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AvoidanceConfig {
    pub width: f32,
    pub height: f32,
    /// Gap between the element and the bottom of the window.
    pub bottom_margin: f32,
}

impl Default for AvoidanceConfig {
    fn default() -> Self {
        Self {
            width: 220.0,
            height: 48.0,
            bottom_margin: 48.0,
        }
    }
}

impl AvoidanceConfig {
    /// The element's rectangle in a window of `viewport` physical pixels.
    pub fn rect(&self, viewport: Vec2, scale_factor: f32) -> ScreenRect {
        let w = self.width * scale_factor;
        let h = self.height * scale_factor;
        ScreenRect::new(
            (viewport.x - w) * 0.5,
            viewport.y - h - self.bottom_margin * scale_factor,
            w,
            h,
        )
    }
}

/// Pixel position to normalized device coordinates, y up.
///
/// `None` for a zero-sized viewport.
pub fn pixel_to_ndc(pixel: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        pixel.x / viewport.x * 2.0 - 1.0,
        1.0 - pixel.y / viewport.y * 2.0,
    ))
}

/// Project a pointer in NDC onto the field's local `z = 0` plane.
///
/// `None` when the ray is parallel to the plane or the plane is behind it.
pub fn pointer_to_local(camera: &Camera, transform: &FieldTransform, ndc: Vec2) -> Option<Vec3> {
    let (origin, dir) = camera.ray(ndc);
    let inverse = transform.inverse_matrix();
    let origin = inverse.transform_point3(origin);
    let dir = inverse.transform_vector3(dir);
    if dir.z.abs() < 1e-6 {
        return None;
    }
    let t = -origin.z / dir.z;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}

/// Convert a UI rectangle into an avoidance region in field space.
///
/// Anything that cannot be projected means "no avoidance".
pub fn rect_to_avoidance(
    camera: &Camera,
    transform: &FieldTransform,
    rect: &ScreenRect,
    viewport: Vec2,
) -> Option<AvoidanceRegion> {
    if rect.is_empty() {
        return None;
    }
    let local = |pixel: Vec2| pixel_to_ndc(pixel, viewport).and_then(|ndc| pointer_to_local(camera, transform, ndc));

    let center = local(rect.center())?;
    let a = local(Vec2::new(rect.x, rect.y))?;
    let b = local(Vec2::new(rect.x + rect.width, rect.y + rect.height))?;
    let half = ((b - a).truncate() * 0.5).abs();
    if half.x <= 0.0 || half.y <= 0.0 {
        return None;
    }
    Some(AvoidanceRegion::new(center, half))
}

/// Pointer interaction is limited to viewports at least `min_width` logical pixels wide.
pub fn interaction_enabled(logical_width: f32, min_width: f32) -> bool {
    logical_width >= min_width
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::ViewConfig;

    fn camera() -> Camera {
        let mut camera = Camera::new(&ViewConfig::default());
        camera.set_viewport(800, 600);
        camera
    }

    #[test]
    fn test_easings_hit_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicOut,
            Easing::CubicInOut,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{:?}", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", easing);
            assert!(easing.apply(0.3) <= easing.apply(0.6), "{:?}", easing);
        }
    }

    #[test]
    fn test_phase_progress() {
        let phase = Phase::new(0.2, 0.6, Easing::Linear);
        assert_eq!(phase.progress(0.0), 0.0);
        assert!((phase.progress(0.4) - 0.5).abs() < 1e-6);
        assert_eq!(phase.progress(0.9), 1.0);

        let step = Phase::new(0.5, 0.5, Easing::Linear);
        assert_eq!(step.progress(0.49), 0.0);
        assert_eq!(step.progress(0.5), 1.0);
    }

    #[test]
    fn test_default_phases_are_sequential() {
        let timeline = ScrollTimeline::default();
        let early = timeline.progress(10.0, 0.1);
        assert_eq!(early.formation, 1.0);
        assert_eq!(early.morph, 0.0);
        assert_eq!(early.burst, 0.0);

        let mid = timeline.progress(10.0, 0.66);
        assert_eq!(mid.morph, 1.0);
        assert_eq!(mid.burst, 0.0);

        let end = timeline.progress(10.0, 1.0);
        assert_eq!(end.burst, 1.0);
    }

    #[test]
    fn test_intro_and_scroll_bound_formation() {
        let mut timeline = ScrollTimeline::default();
        assert_eq!(timeline.progress(0.0, 0.0).formation, 0.0);
        assert!(timeline.progress(1.0, 0.0).formation > 0.0);

        timeline.formation = Some(Phase::new(0.0, 0.2, Easing::Linear));
        assert_eq!(timeline.progress(100.0, 0.0).formation, 0.0);
        assert_eq!(timeline.progress(0.0, 0.2).formation, 1.0);

        timeline.formation = None;
        timeline.intro_secs = 0.0;
        assert_eq!(timeline.progress(0.0, 0.0).formation, 1.0);
    }

    #[test]
    fn test_scrub_converges() {
        let mut bridge = ScrollBridge::new(ScrollTimeline::default());
        bridge.set_scroll(0.5);
        bridge.advance(0.0, 0.016);
        assert!(bridge.scroll() > 0.0 && bridge.scroll() < 0.5);
        for _ in 0..200 {
            bridge.advance(0.0, 0.016);
        }
        assert_eq!(bridge.scroll(), 0.5);
    }

    #[test]
    fn test_scroll_clamped() {
        let mut bridge = ScrollBridge::new(ScrollTimeline::default());
        bridge.scroll_by(-10.0);
        assert_eq!(bridge.target(), 0.0);
        bridge.scroll_by(1000.0);
        assert_eq!(bridge.target(), 1.0);
        bridge.set_scroll(f32::NAN);
        assert_eq!(bridge.target(), 1.0);
    }

    #[test]
    fn test_transform_phase() {
        let timeline = ScrollTimeline::default();
        assert_eq!(timeline.transform_at(0.0), FieldTransform::default());
        let done = timeline.transform_at(0.5);
        assert!((done.scale - 1.4).abs() < 1e-6);
        assert!((done.rotation_y - TAU).abs() < 1e-5);
    }

    #[test]
    fn test_centre_pointer_hits_origin() {
        let hit = pointer_to_local(&camera(), &FieldTransform::default(), Vec2::ZERO).unwrap();
        assert!(hit.length() < 1e-2, "{:?}", hit);
    }

    #[test]
    fn test_pointer_respects_group_transform() {
        let transform = FieldTransform {
            scale: 2.0,
            rotation_y: 0.0,
            translation: Vec3::new(10.0, 0.0, 0.0),
        };
        let ndc = Vec2::new(0.3, -0.2);
        let world = pointer_to_local(&camera(), &FieldTransform::default(), ndc).unwrap();
        let local = pointer_to_local(&camera(), &transform, ndc).unwrap();
        let back = transform.model_matrix().transform_point3(local);
        assert!((back - world).length() < 1e-2, "{:?} vs {:?}", back, world);
    }

    #[test]
    fn test_plane_behind_camera_has_no_pointer() {
        let transform = FieldTransform {
            translation: Vec3::new(0.0, 0.0, 500.0),
            ..FieldTransform::default()
        };
        assert!(pointer_to_local(&camera(), &transform, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_rect_to_avoidance() {
        let viewport = Vec2::new(800.0, 600.0);
        let rect = AvoidanceConfig::default().rect(viewport, 1.0);
        let region = rect_to_avoidance(&camera(), &FieldTransform::default(), &rect, viewport).unwrap();
        assert!(region.center.y < 0.0);
        assert!(region.center.x.abs() < 1e-2);
        assert!(region.half_extents.x > region.half_extents.y);

        let empty = ScreenRect::new(10.0, 10.0, 0.0, 20.0);
        assert!(rect_to_avoidance(&camera(), &FieldTransform::default(), &empty, viewport).is_none());
        assert!(rect_to_avoidance(&camera(), &FieldTransform::default(), &rect, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_interaction_threshold() {
        assert!(interaction_enabled(1024.0, 768.0));
        assert!(interaction_enabled(768.0, 768.0));
        assert!(!interaction_enabled(767.0, 768.0));
    }
}
