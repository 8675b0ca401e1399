use glam::Vec3;

use crate::Ray;

/// Pinhole projection camera.
///
/// Maps normalized screen coordinates in [0, 1] x [0, 1] to primary rays.
/// (0, 0) is the lower-left corner of the image plane and y grows upward.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,

    // Derived basis (set by update())
    look: Vec3,
    u: Vec3,
    v: Vec3,
}

impl Camera {
    /// Create a new camera looking from `position` at `target`.
    pub fn new(position: Vec3, target: Vec3, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::Y,
            fov_y: 45.0_f32.to_radians(),
            aspect,
            look: Vec3::NEG_Z,
            u: Vec3::X,
            v: Vec3::Y,
        };
        camera.update();
        camera
    }

    /// Set the up vector.
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self.update();
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn with_fov_degrees(mut self, fov: f32) -> Self {
        self.fov_y = fov.to_radians();
        self.update();
        self
    }

    /// Unit view direction.
    pub fn look(&self) -> Vec3 {
        self.look
    }

    /// Build the primary ray through normalized screen coordinates (x, y).
    pub fn ray_through(&self, x: f32, y: f32) -> Ray {
        let x = x - 0.5;
        let y = y - 0.5;
        let direction = (self.look + x * self.u + y * self.v).normalize();
        Ray::visibility(self.position, direction)
    }

    /// Recompute the image-plane basis from position, target, up and lens.
    fn update(&mut self) {
        self.look = (self.target - self.position).normalize_or_zero();
        if self.look == Vec3::ZERO {
            self.look = Vec3::NEG_Z;
        }

        let mut right = self.look.cross(self.up).normalize_or_zero();
        if right == Vec3::ZERO {
            // up parallel to the view direction; pick any perpendicular
            right = self.look.any_orthonormal_vector();
        }
        let true_up = right.cross(self.look);

        let normalized_height = 2.0 * (self.fov_y / 2.0).tan();
        self.u = right * normalized_height * self.aspect;
        self.v = true_up * normalized_height;
    }
}
