//! Triangle mesh geometry.
//!
//! A mesh is built at load time (vertices, optional per-vertex normals and
//! materials, then faces) and is read-only once it is handed to a scene.
//! Per-vertex attribute counts must match the vertex count; `validate`
//! reports meshes that break this so the loader can reject them.

use std::sync::Arc;

use prism_math::Vec3;
use thiserror::Error;

use crate::material::Material;

/// Errors found while building a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("face [{a}, {b}, {c}] references a vertex past the end ({vertex_count} vertices)")]
    FaceIndexOutOfRange {
        a: u32,
        b: u32,
        c: u32,
        vertex_count: usize,
    },

    #[error("wrong number of normals: {normals} for {vertices} vertices")]
    NormalCountMismatch { normals: usize, vertices: usize },

    #[error("wrong number of materials: {materials} for {vertices} vertices")]
    MaterialCountMismatch { materials: usize, vertices: usize },
}

pub type MeshResult<T> = Result<T, MeshError>;

/// One triangle of a mesh.
#[derive(Clone, Copy, Debug)]
pub struct Face {
    /// Vertex indices, counter-clockwise seen from the front
    pub indices: [u32; 3],
    /// Unit plane normal, normalize((v1 - v0) x (v2 - v0))
    pub normal: Vec3,
}

/// A triangle mesh with optional per-vertex normals and materials.
#[derive(Clone, Debug)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    normals: Vec<Vec3>,
    vertex_materials: Vec<Arc<Material>>,
    faces: Vec<Face>,
    material: Arc<Material>,
}

impl Mesh {
    /// Create an empty mesh whose faces use `material`.
    pub fn new(material: Arc<Material>) -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            vertex_materials: Vec::new(),
            faces: Vec::new(),
            material,
        }
    }

    /// Vertices, normals and materials must be added in the same order.
    pub fn add_vertex(&mut self, v: Vec3) {
        self.vertices.push(v);
    }

    pub fn add_normal(&mut self, n: Vec3) {
        self.normals.push(n);
    }

    pub fn add_vertex_material(&mut self, material: Arc<Material>) {
        self.vertex_materials.push(material);
    }

    /// Add the triangle (a, b, c).
    ///
    /// Returns `Ok(false)` when the triangle has zero area; such faces can
    /// never be hit and are dropped.
    pub fn add_face(&mut self, a: u32, b: u32, c: u32) -> MeshResult<bool> {
        let vertex_count = self.vertices.len();
        if [a, b, c].iter().any(|&i| i as usize >= vertex_count) {
            return Err(MeshError::FaceIndexOutOfRange {
                a,
                b,
                c,
                vertex_count,
            });
        }

        let v0 = self.vertices[a as usize];
        let v1 = self.vertices[b as usize];
        let v2 = self.vertices[c as usize];
        let cross = (v1 - v0).cross(v2 - v0);
        if cross.length_squared() <= f32::EPSILON * f32::EPSILON {
            log::debug!("Dropping degenerate face [{}, {}, {}]", a, b, c);
            return Ok(false);
        }

        self.faces.push(Face {
            indices: [a, b, c],
            normal: cross.normalize(),
        });
        Ok(true)
    }

    /// Check per-vertex attribute counts.
    pub fn validate(&self) -> MeshResult<()> {
        let vertices = self.vertices.len();
        if !self.vertex_materials.is_empty() && self.vertex_materials.len() != vertices {
            return Err(MeshError::MaterialCountMismatch {
                materials: self.vertex_materials.len(),
                vertices,
            });
        }
        if !self.normals.is_empty() && self.normals.len() != vertices {
            return Err(MeshError::NormalCountMismatch {
                normals: self.normals.len(),
                vertices,
            });
        }
        Ok(())
    }

    /// Replace the vertex normals with the average of each vertex's face normals.
    ///
    /// Every incident face counts equally regardless of its area. Vertices
    /// that belong to no face get a zero normal.
    pub fn generate_normals(&mut self) {
        let mut sums = vec![Vec3::ZERO; self.vertices.len()];
        let mut counts = vec![0u32; self.vertices.len()];

        for face in &self.faces {
            for &i in &face.indices {
                sums[i as usize] += face.normal;
                counts[i as usize] += 1;
            }
        }

        self.normals = sums
            .into_iter()
            .zip(counts)
            .map(|(sum, count)| if count > 0 { sum / count as f32 } else { sum })
            .collect();

        log::debug!("Generated {} vertex normals", self.normals.len());
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Per-vertex normals, if any.
    pub fn normals(&self) -> Option<&[Vec3]> {
        (!self.normals.is_empty()).then_some(self.normals.as_slice())
    }

    /// Per-vertex materials, if any.
    pub fn vertex_materials(&self) -> Option<&[Arc<Material>]> {
        (!self.vertex_materials.is_empty()).then_some(self.vertex_materials.as_slice())
    }

    /// Positions of a face's three vertices.
    #[inline]
    pub fn face_vertices(&self, face: &Face) -> [Vec3; 3] {
        face.indices.map(|i| self.vertices[i as usize])
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        let mut mesh = Mesh::new(Arc::new(Material::default()));
        mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(1.0, 1.0, 0.0));
        mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
        mesh
    }

    #[test]
    fn test_mesh_creation() {
        let mut mesh = quad();
        assert!(mesh.add_face(0, 1, 2).unwrap());
        assert!(mesh.add_face(0, 2, 3).unwrap());

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.normals().is_none());
        assert!(mesh.vertex_materials().is_none());

        // Counter-clockwise in XY faces +Z
        assert!((mesh.faces()[0].normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_face_out_of_range() {
        let mut mesh = quad();
        let err = mesh.add_face(0, 1, 4).unwrap_err();
        assert!(matches!(err, MeshError::FaceIndexOutOfRange { vertex_count: 4, .. }));
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_degenerate_face_dropped() {
        let mut mesh = quad();
        mesh.add_vertex(Vec3::new(2.0, 0.0, 0.0));

        // Collinear points
        assert!(!mesh.add_face(0, 1, 4).unwrap());
        // Repeated index
        assert!(!mesh.add_face(1, 1, 2).unwrap());
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_validate_counts() {
        let mut mesh = quad();
        assert!(mesh.validate().is_ok());

        mesh.add_normal(Vec3::Z);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::NormalCountMismatch {
                normals: 1,
                vertices: 4
            })
        );

        let mut mesh = quad();
        for _ in 0..3 {
            mesh.add_vertex_material(Arc::new(Material::default()));
        }
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::MaterialCountMismatch { materials: 3, .. })
        ));
    }

    #[test]
    fn test_generated_normal_single_face_is_exact() {
        let mut mesh = Mesh::new(Arc::new(Material::default()));
        mesh.add_vertex(Vec3::new(0.3, -1.0, 2.0));
        mesh.add_vertex(Vec3::new(1.7, 0.2, 0.5));
        mesh.add_vertex(Vec3::new(-0.4, 1.1, 1.0));
        mesh.add_face(0, 1, 2).unwrap();
        mesh.generate_normals();

        let face_normal = mesh.faces()[0].normal;
        for n in mesh.normals().unwrap() {
            assert_eq!(*n, face_normal);
        }
    }

    #[test]
    fn test_generated_normals_weight_faces_equally() {
        // Two faces sharing an edge along the x axis, folded 90 degrees
        let mut mesh = Mesh::new(Arc::new(Material::default()));
        mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0)); // small face in XY, normal +Z
        mesh.add_vertex(Vec3::new(0.0, 0.0, -5.0)); // large face in XZ, normal +Y
        mesh.add_face(0, 1, 2).unwrap();
        mesh.add_face(0, 1, 3).unwrap();
        mesh.generate_normals();

        let normals = mesh.normals().unwrap();
        let shared = normals[0];
        assert!((shared - Vec3::new(0.0, 0.5, 0.5)).length() < 1e-6);
        assert_eq!(normals[1], shared);
        assert!((normals[2] - Vec3::Z).length() < 1e-6);
        assert!((normals[3] - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_face_vertices() {
        let mut mesh = quad();
        mesh.add_face(0, 2, 3).unwrap();
        let [a, b, c] = mesh.face_vertices(&mesh.faces()[0]);
        assert_eq!(a, Vec3::ZERO);
        assert_eq!(b, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(c, Vec3::new(0.0, 1.0, 0.0));
    }
}
