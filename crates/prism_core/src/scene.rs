//! Scene graph types for Prism.
//!
//! A scene is assembled once (usually by [`crate::scene_file`]) and is then
//! shared read-only by every trace.

use std::fmt;

use prism_math::{Camera, Mat4, Quat, Vec3};

use crate::cube_map::CubeMap;
use crate::light::Light;
use crate::material::Color;
use crate::mesh::Mesh;

/// Transform components that can be composed into a matrix.
#[derive(Clone, Debug)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,

    /// Rotation (as quaternion)
    pub rotation: Quat,

    /// Scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Matrix for transforming normals (inverse transpose of the upper 3x3).
    pub fn normal_matrix(&self) -> Mat4 {
        self.to_matrix().inverse().transpose()
    }
}

/// A complete scene: geometry, lights, camera and environment.
pub struct Scene {
    /// Scene name (usually from filename)
    pub name: String,

    pub camera: Camera,

    /// Global ambient light color
    pub ambient: Color,

    /// Lights in registration order
    lights: Vec<Box<dyn Light>>,

    meshes: Vec<Mesh>,

    cube_map: Option<CubeMap>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>, camera: Camera) -> Self {
        Self {
            name: name.into(),
            camera,
            ambient: Color::ZERO,
            lights: Vec::new(),
            meshes: Vec::new(),
            cube_map: None,
        }
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    /// Add a mesh; it is frozen from here on.
    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// Register a light. Shading visits lights in registration order.
    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    pub fn set_cube_map(&mut self, cube_map: CubeMap) {
        self.cube_map = Some(cube_map);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn lights(&self) -> impl Iterator<Item = &dyn Light> {
        self.lights.iter().map(|l| l.as_ref())
    }

    pub fn cube_map(&self) -> Option<&CubeMap> {
        self.cube_map.as_ref()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Get total triangle count across all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.triangle_count()).sum()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("meshes", &self.meshes.len())
            .field("triangles", &self.total_triangle_count())
            .field("lights", &self.lights.len())
            .field("cube_map", &self.cube_map.is_some())
            .finish()
    }
}
