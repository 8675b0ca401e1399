// Re-export glam for convenience
pub use glam::*;

// Prism math types
mod camera;
mod interval;
mod ray;

pub use camera::Camera;
pub use interval::Interval;
pub use ray::{Ray, RayKind};

/// Minimum ray parameter accepted as a forward hit.
///
/// Secondary and shadow rays start exactly on a surface, so anything at or
/// below this distance is treated as the surface the ray left from.
pub const RAY_EPSILON: f32 = 1e-4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_creation() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_epsilon_is_positive_and_small() {
        assert!(RAY_EPSILON > 0.0);
        assert!(RAY_EPSILON < 1e-2);
    }
}
