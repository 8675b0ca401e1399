use crate::Vec3;

/// What a ray is being traced for.
///
/// Only shadow-casting logic and the debug ray log look at this; the
/// intersection math treats every kind the same.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RayKind {
    /// Primary ray from the camera.
    Visibility,
    /// Mirror bounce off a surface.
    Reflection,
    /// Transmission through a transparent surface.
    Refraction,
    /// Occlusion probe toward a light.
    Shadow,
}

/// A ray in 3D space with origin, direction, and a classification tag.
///
/// The direction is not required to be unit length at construction. Use
/// [`Ray::unit_direction`] where the math needs it normalized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
    pub kind: RayKind,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: Vec3, direction: Vec3, kind: RayKind) -> Self {
        Self {
            origin,
            direction,
            kind,
        }
    }

    /// Create a camera (visibility) ray.
    pub fn visibility(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, RayKind::Visibility)
    }

    /// Create a shadow probe.
    pub fn shadow(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction, RayKind::Shadow)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn kind(&self) -> RayKind {
        self.kind
    }

    /// Direction scaled to unit length (zero stays zero).
    #[inline]
    pub fn unit_direction(&self) -> Vec3 {
        self.direction.normalize_or_zero()
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
