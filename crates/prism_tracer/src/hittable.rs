//! Hittable trait, HitRecord and the scene-level `World` query.

use std::borrow::Cow;

use prism_core::{Material, Occluder, Scene};
use prism_math::{Interval, Ray, Vec2, Vec3};

use crate::triangle::TriangleMesh;

/// Record of a ray-object intersection.
///
/// `t` is measured along the ray's unit direction.
#[derive(Clone, Debug)]
pub struct HitRecord<'a> {
    /// Ray parameter of the hit, `f32::MAX` until something is hit
    pub t: f32,
    /// Shading normal (unit, not flipped toward the ray)
    pub normal: Vec3,
    /// Barycentric weights of the face's three vertices
    pub bary: Vec3,
    /// Texture coordinates
    pub uv: Vec2,
    /// Mesh material, or an owned blend of the face's vertex materials
    pub material: Cow<'a, Material>,
}

impl Default for HitRecord<'_> {
    fn default() -> Self {
        Self {
            t: f32::MAX,
            normal: Vec3::ZERO,
            bary: Vec3::ZERO,
            uv: Vec2::ZERO,
            material: Cow::Owned(Material::default()),
        }
    }
}

impl HitRecord<'_> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this record holds a hit.
    pub fn is_hit(&self) -> bool {
        self.t < f32::MAX
    }

    /// Intersection point along `ray`.
    #[inline]
    pub fn point(&self, ray: &Ray) -> Vec3 {
        ray.origin() + ray.unit_direction() * self.t
    }
}

/// Trait for objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object within the given interval.
    ///
    /// Returns true if hit, and fills in the hit record.
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;
}

/// Every mesh of a scene, searched linearly for the nearest hit.
#[derive(Clone, Copy, Debug)]
pub struct World<'s> {
    scene: &'s Scene,
    smooth_shading: bool,
}

impl<'s> World<'s> {
    pub fn new(scene: &'s Scene, smooth_shading: bool) -> Self {
        Self {
            scene,
            smooth_shading,
        }
    }

    pub fn scene(&self) -> &'s Scene {
        self.scene
    }

    pub fn smooth_shading(&self) -> bool {
        self.smooth_shading
    }
}

impl Hittable for World<'_> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest_so_far = ray_t.max;

        for mesh in self.scene.meshes() {
            let object = TriangleMesh::new(mesh, self.smooth_shading);
            if object.intersect(ray, Interval::new(ray_t.min, closest_so_far), rec) {
                hit_anything = true;
                closest_so_far = rec.t;
            }
        }

        hit_anything
    }
}

impl Occluder for World<'_> {
    fn first_hit(&self, ray: &Ray) -> Option<f32> {
        let mut closest: Option<f32> = None;

        for mesh in self.scene.meshes() {
            let max = closest.unwrap_or(f32::MAX);
            if let Some(hit) = TriangleMesh::new(mesh, false).nearest_face(ray, Interval::forward(max))
            {
                closest = Some(hit.t);
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use prism_core::Mesh;
    use prism_math::Camera;

    fn square_at_z(z: f32, material: Material) -> Mesh {
        let mut mesh = Mesh::new(Arc::new(material));
        mesh.add_vertex(Vec3::new(-1.0, -1.0, z));
        mesh.add_vertex(Vec3::new(1.0, -1.0, z));
        mesh.add_vertex(Vec3::new(1.0, 1.0, z));
        mesh.add_vertex(Vec3::new(-1.0, 1.0, z));
        mesh.add_face(0, 1, 2).unwrap();
        mesh.add_face(0, 2, 3).unwrap();
        mesh
    }

    fn two_walls() -> Scene {
        let mut scene = Scene::new("walls", Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 1.0));
        scene.add_mesh(square_at_z(-2.0, Material::diffuse(Vec3::Y)));
        scene.add_mesh(square_at_z(0.0, Material::diffuse(Vec3::X)));
        scene
    }

    #[test]
    fn test_default_record_is_no_hit() {
        let rec = HitRecord::new();
        assert_eq!(rec.t, f32::MAX);
        assert!(!rec.is_hit());
    }

    #[test]
    fn test_world_nearest_hit() {
        let scene = two_walls();
        let world = World::new(&scene, true);
        let ray = Ray::visibility(Vec3::new(0.2, 0.1, 5.0), Vec3::NEG_Z);

        let mut rec = HitRecord::new();
        assert!(world.hit(&ray, Interval::forward(f32::MAX), &mut rec));
        assert!((rec.t - 5.0).abs() < 1e-5);
        assert_eq!(rec.material.kd(rec.uv), Vec3::X);
        assert!((rec.point(&ray) - Vec3::new(0.2, 0.1, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_world_miss() {
        let scene = two_walls();
        let world = World::new(&scene, true);
        let ray = Ray::visibility(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        let mut rec = HitRecord::new();
        assert!(!world.hit(&ray, Interval::forward(f32::MAX), &mut rec));
        assert!(!rec.is_hit());
        assert_eq!(world.first_hit(&ray), None);
    }

    #[test]
    fn test_occluder_reports_nearest() {
        let scene = two_walls();
        let world = World::new(&scene, false);
        let ray = Ray::shadow(Vec3::new(0.2, 0.1, -5.0), Vec3::Z);

        let t = world.first_hit(&ray).unwrap();
        assert!((t - 3.0).abs() < 1e-5);
    }
}
