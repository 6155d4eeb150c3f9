//! Perspective orbit camera.
//!
//! Left-drag orbits around the field centre. Orbit input sets a goal
//! yaw/pitch and [`Camera::update`] eases toward it, so the view keeps
//! gliding briefly after the drag ends. Zoom is fixed.

use glam::{Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::config::hex_rgba;
use crate::motion::smoothing_factor;

/// View and presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Distance from the camera to the field centre.
    pub distance: f32,
    pub near: f32,
    pub far: f32,
    /// Background color.
    pub clear_color: Vec4,
    /// Particle sprite size in world units.
    pub point_size: f32,
    /// Fraction of the remaining orbit covered per 60 Hz frame.
    pub damping: f32,
    /// Radians of orbit per dragged pixel.
    pub orbit_sensitivity: f32,
    /// Pitch limit in radians. The sign is ignored.
    pub max_pitch: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            distance: 180.0,
            near: 0.1,
            far: 1000.0,
            clear_color: hex_rgba(0xe0e0e0, 1.0),
            point_size: 1.2,
            damping: 0.08,
            orbit_sensitivity: 0.005,
            max_pitch: 1.2,
        }
    }
}

/// Orbit camera for viewing the particle field.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Horizontal rotation angle in radians.
    pub yaw: f32,
    /// Vertical rotation angle in radians.
    pub pitch: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
    goal_yaw: f32,
    goal_pitch: f32,
    fov_y: f32,
    near: f32,
    far: f32,
    aspect: f32,
    damping: f32,
    sensitivity: f32,
    max_pitch: f32,
}

impl Camera {
    /// Create a camera looking down -Z at the origin.
    pub fn new(view: &ViewConfig) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            distance: view.distance,
            target: Vec3::ZERO,
            goal_yaw: 0.0,
            goal_pitch: 0.0,
            fov_y: view.fov_degrees.to_radians(),
            near: view.near,
            far: view.far,
            aspect: 1.0,
            damping: view.damping,
            sensitivity: view.orbit_sensitivity,
            max_pitch: view.max_pitch.abs(),
        }
    }

    /// Update the aspect ratio from a surface size.
    ///
    /// Returns `false` and keeps the previous aspect when either side is zero.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    /// Current aspect ratio.
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Queue an orbit by a drag of `delta` pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.goal_yaw -= delta.x * self.sensitivity;
        self.goal_pitch = (self.goal_pitch + delta.y * self.sensitivity).clamp(-self.max_pitch, self.max_pitch);
    }

    /// Ease yaw and pitch toward the orbit goal.
    pub fn update(&mut self, delta: f32) {
        let k = smoothing_factor(self.damping, delta);
        self.yaw += (self.goal_yaw - self.yaw) * k;
        self.pitch += (self.goal_pitch - self.pitch) * k;
    }

    /// Calculate the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a point in normalized device coordinates.
    ///
    /// Returns the ray origin on the near plane and its unit direction.
    pub fn ray(&self, ndc: Vec2) -> (Vec3, Vec3) {
        let inverse = self.view_proj().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        (near, (far - near).normalize_or_zero())
    }
}
