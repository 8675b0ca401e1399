//! Prism Core - Scene description types for the Prism ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: indexed triangle `Mesh` with optional per-vertex normals and materials
//! - **Shading inputs**: Phong `Material`, `TextureMap`, `CubeMap` environments
//! - **Lights**: `DirectionalLight` and `PointLight` behind the `Light` trait
//! - **Scene files**: JSON scene loading with OBJ mesh support
//!
//! # Example
//!
//! ```ignore
//! use prism_core::load_scene_file;
//!
//! let scene = load_scene_file("scenes/cornell.json")?;
//! println!("Loaded {} meshes, {} lights",
//!     scene.mesh_count(),
//!     scene.light_count());
//! ```

pub mod cube_map;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod scene_file;
pub mod texture;

// Re-export commonly used types
pub use cube_map::{CubeFace, CubeMap};
pub use light::{DirectionalLight, Light, Occluder, PointLight};
pub use material::{Color, Material, MaterialParameter};
pub use mesh::{Face, Mesh, MeshError};
pub use scene::{Scene, Transform};
pub use scene_file::{load_scene, load_scene_file, SceneError, SceneResult};
pub use texture::{TextureCache, TextureError, TextureMap};
