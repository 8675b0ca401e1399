//! Ray/triangle intersection over the faces of a mesh.
//!
//! The ray is intersected with each face's plane, then the hit point is
//! tested against the three edges in turn (v2->v0, v0->v1, v1->v2). The
//! signed sub-triangle areas from those tests double as the barycentric
//! weights: the area opposite vertex k is the weight of vertex k.

use std::borrow::Cow;

use prism_core::{Face, Material, Mesh};
use prism_math::{Interval, Ray, Vec2, Vec3};

use crate::hittable::{HitRecord, Hittable};

/// Below this |n·d| the ray is treated as parallel to the plane.
const PARALLEL_EPSILON: f32 = 1e-8;

/// Nearest face hit, before any shading attributes are resolved.
#[derive(Clone, Copy, Debug)]
pub struct FaceHit {
    pub face: usize,
    pub t: f32,
    /// Weights of v0, v1, v2
    pub bary: Vec3,
}

/// Intersect one face. Returns `(t, bary)` for a hit strictly inside `ray_t`.
pub fn intersect_face(mesh: &Mesh, face: &Face, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
    let [v0, v1, v2] = mesh.face_vertices(face);
    let n = face.normal;
    let origin = ray.origin();
    let direction = ray.unit_direction();

    let n_dot_d = n.dot(direction);
    // Ray is parallel to the plane
    if n_dot_d.abs() < PARALLEL_EPSILON {
        return None;
    }

    let t = n.dot(v0 - origin) / n_dot_d;
    if !ray_t.surrounds(t) {
        return None;
    }

    let q = origin + direction * t;

    // Opposite v1
    let a = n.dot((v0 - v2).cross(q - v2));
    if a < 0.0 {
        return None;
    }
    // Opposite v2
    let b = n.dot((v1 - v0).cross(q - v0));
    if b < 0.0 {
        return None;
    }
    // Opposite v0
    let c = n.dot((v2 - v1).cross(q - v1));
    if c < 0.0 {
        return None;
    }

    let area = a + b + c;
    if area <= 0.0 {
        return None;
    }

    Some((t, Vec3::new(c, a, b) / area))
}

/// A mesh viewed as a set of hittable triangles.
#[derive(Clone, Copy, Debug)]
pub struct TriangleMesh<'m> {
    mesh: &'m Mesh,
    smooth_shading: bool,
}

impl<'m> TriangleMesh<'m> {
    pub fn new(mesh: &'m Mesh, smooth_shading: bool) -> Self {
        Self {
            mesh,
            smooth_shading,
        }
    }

    /// Nearest face hit within `ray_t`, testing every face.
    pub fn nearest_face(&self, ray: &Ray, ray_t: Interval) -> Option<FaceHit> {
        let mut nearest: Option<FaceHit> = None;
        let mut closest_so_far = ray_t.max;

        for (index, face) in self.mesh.faces().iter().enumerate() {
            let interval = Interval::new(ray_t.min, closest_so_far);
            if let Some((t, bary)) = intersect_face(self.mesh, face, ray, interval) {
                closest_so_far = t;
                nearest = Some(FaceHit {
                    face: index,
                    t,
                    bary,
                });
            }
        }

        nearest
    }

    /// Nearest hit with its shading attributes written to `rec`.
    pub fn intersect(self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'m>) -> bool {
        match self.nearest_face(ray, ray_t) {
            Some(hit) => {
                self.resolve(hit, rec);
                true
            }
            None => false,
        }
    }

    fn resolve(&self, hit: FaceHit, rec: &mut HitRecord<'m>) {
        let face = &self.mesh.faces()[hit.face];
        let [i0, i1, i2] = face.indices.map(|i| i as usize);
        let w = hit.bary;
        let uv = Vec2::new(w.y, w.z);

        rec.normal = match self.mesh.normals() {
            Some(normals) if self.smooth_shading => {
                let blended = normals[i0] * w.x + normals[i1] * w.y + normals[i2] * w.z;
                blended.try_normalize().unwrap_or(face.normal)
            }
            _ => face.normal,
        };

        rec.material = match self.mesh.vertex_materials() {
            Some(materials) => Cow::Owned(Material::blend(
                [&materials[i0], &materials[i1], &materials[i2]],
                w,
                uv,
            )),
            None => Cow::Borrowed(self.mesh.material()),
        };

        rec.t = hit.t;
        rec.bary = w;
        rec.uv = uv;
    }
}

impl Hittable for TriangleMesh<'_> {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let object: TriangleMesh<'a> = *self;
        object.intersect(ray, ray_t, rec)
    }
}
