//! Light sources.
//!
//! Lights only need to answer four questions about a shaded point: which
//! way the light is, its color, how much it falls off with distance, and
//! whether something blocks it. The blocking test goes through an
//! [`Occluder`] supplied by the caller so lights never hold the scene.

use prism_math::{Ray, Vec3};

use crate::material::Color;

/// Nearest-hit query used by shadow probes.
pub trait Occluder {
    /// Ray parameter of the nearest forward hit along `ray`, if any.
    fn first_hit(&self, ray: &Ray) -> Option<f32>;
}

/// Trait for light sources.
pub trait Light: Send + Sync + std::fmt::Debug {
    /// Unit vector from `p` toward the light.
    fn direction(&self, p: Vec3) -> Vec3;

    fn color(&self) -> Color;

    /// Falloff factor in [0, 1].
    fn distance_attenuation(&self, p: Vec3) -> f32;

    /// 0 where `p` is occluded from the light, 1 where it is not.
    fn shadow_attenuation(&self, occluder: &dyn Occluder, p: Vec3) -> Color;
}

/// Light from infinitely far away along a fixed orientation.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Direction the light travels (unit)
    orientation: Vec3,
    color: Color,
}

impl DirectionalLight {
    pub fn new(orientation: Vec3, color: Color) -> Self {
        Self {
            orientation: orientation.normalize_or_zero(),
            color,
        }
    }
}

impl Light for DirectionalLight {
    fn direction(&self, _p: Vec3) -> Vec3 {
        -self.orientation
    }

    fn color(&self) -> Color {
        self.color
    }

    fn distance_attenuation(&self, _p: Vec3) -> f32 {
        // Source at infinity
        1.0
    }

    fn shadow_attenuation(&self, occluder: &dyn Occluder, p: Vec3) -> Color {
        let probe = Ray::shadow(p, self.direction(p));
        // Anything along the probe lies in front of a light at infinity
        match occluder.first_hit(&probe) {
            Some(_) => Color::ZERO,
            None => Color::ONE,
        }
    }
}

/// Light at a position with quadratic distance falloff.
#[derive(Debug, Clone)]
pub struct PointLight {
    position: Vec3,
    color: Color,
    constant: f32,
    linear: f32,
    quadratic: f32,
}

impl PointLight {
    /// Light with no falloff (constant term 1, others 0).
    pub fn new(position: Vec3, color: Color) -> Self {
        Self::with_attenuation(position, color, 1.0, 0.0, 0.0)
    }

    pub fn with_attenuation(
        position: Vec3,
        color: Color,
        constant: f32,
        linear: f32,
        quadratic: f32,
    ) -> Self {
        Self {
            position,
            color,
            constant,
            linear,
            quadratic,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}

impl Light for PointLight {
    fn direction(&self, p: Vec3) -> Vec3 {
        (self.position - p).normalize_or_zero()
    }

    fn color(&self) -> Color {
        self.color
    }

    fn distance_attenuation(&self, p: Vec3) -> f32 {
        let d = (p - self.position).length();
        let falloff = self.constant + self.linear * d + self.quadratic * d * d;
        (1.0 / falloff).min(1.0)
    }

    fn shadow_attenuation(&self, occluder: &dyn Occluder, p: Vec3) -> Color {
        let probe = Ray::shadow(p, self.direction(p));
        let Some(t) = occluder.first_hit(&probe) else {
            return Color::ONE;
        };

        // Only blockers between the point and the light count
        let hit_distance = (probe.at(t) - p).length();
        let light_distance = (self.position - p).length();
        if hit_distance < light_distance {
            Color::ZERO
        } else {
            Color::ONE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Occluder that reports a single blocker at a fixed distance along any probe.
    struct WallAt(Option<f32>);

    impl Occluder for WallAt {
        fn first_hit(&self, ray: &Ray) -> Option<f32> {
            self.0.map(|d| d / ray.direction.length())
        }
    }

    #[test]
    fn test_directional_light() {
        let light = DirectionalLight::new(Vec3::new(0.0, -2.0, 0.0), Vec3::ONE);

        assert_eq!(light.direction(Vec3::new(5.0, 1.0, 3.0)), Vec3::Y);
        assert_eq!(light.distance_attenuation(Vec3::splat(1e6)), 1.0);
        assert_eq!(light.shadow_attenuation(&WallAt(None), Vec3::ZERO), Vec3::ONE);
        assert_eq!(light.shadow_attenuation(&WallAt(Some(1e5)), Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_point_light_direction() {
        let light = PointLight::new(Vec3::new(0.0, 10.0, 0.0), Vec3::ONE);
        let dir = light.direction(Vec3::new(0.0, 0.0, 0.0));
        assert!((dir - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_point_light_attenuation() {
        let light = PointLight::with_attenuation(Vec3::ZERO, Vec3::ONE, 0.0, 0.0, 1.0);

        // 1 / d^2 at d = 2
        assert!((light.distance_attenuation(Vec3::new(2.0, 0.0, 0.0)) - 0.25).abs() < 1e-6);
        // Never brighter than the light itself
        assert_eq!(light.distance_attenuation(Vec3::new(0.1, 0.0, 0.0)), 1.0);
        assert_eq!(light.distance_attenuation(Vec3::ZERO), 1.0);

        let linear = PointLight::with_attenuation(Vec3::ZERO, Vec3::ONE, 1.0, 0.5, 0.0);
        assert!((linear.distance_attenuation(Vec3::new(0.0, 0.0, 4.0)) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_light_shadow_only_before_light() {
        let light = PointLight::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ONE);

        assert_eq!(light.shadow_attenuation(&WallAt(Some(2.0)), Vec3::ZERO), Vec3::ZERO);
        assert_eq!(light.shadow_attenuation(&WallAt(Some(8.0)), Vec3::ZERO), Vec3::ONE);
        assert_eq!(light.shadow_attenuation(&WallAt(None), Vec3::ZERO), Vec3::ONE);
    }
}
