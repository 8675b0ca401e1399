//! JSON scene description loading.
//!
//! A scene file names a camera, an ambient color, a material table, lights,
//! meshes (inline or OBJ) and an optional cube map:
//!
//! ```json
//! {
//!   "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0], "fov": 45 },
//!   "ambient": [0.1, 0.1, 0.1],
//!   "materials": { "red": { "kd": [0.8, 0.1, 0.1], "ks": 0.5, "shininess": 32 } },
//!   "lights": [ { "type": "point", "position": [0, 5, 0], "color": [1, 1, 1] } ],
//!   "meshes": [
//!     { "vertices": [[-1, 0, 0], [1, 0, 0], [0, 1, 0]], "faces": [[0, 1, 2]],
//!       "material": "red" },
//!     { "obj": "bunny.obj", "transform": { "scale": 2 }, "material": { "kd": 0.7 } }
//!   ],
//!   "cube_map": { "pos_x": "px.png", "neg_x": "nx.png", "pos_y": "py.png",
//!                 "neg_y": "ny.png", "pos_z": "pz.png", "neg_z": "nz.png" }
//! }
//! ```
//!
//! Material parameters accept a number, an RGB triple or `{ "texture": "file" }`.
//! Relative paths resolve against the scene file's directory.
//!
//! Malformed meshes are skipped with a warning. Texture, OBJ and syntax
//! failures abort the whole load.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prism_math::{Camera, EulerRot, Quat, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::cube_map::CubeMap;
use crate::light::{DirectionalLight, PointLight};
use crate::material::{Material, MaterialParameter};
use crate::mesh::Mesh;
use crate::scene::{Scene, Transform};
use crate::texture::{TextureCache, TextureError};

/// Errors that abort a scene load.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Texture mapping exception: {0}")]
    Texture(#[from] TextureError),

    #[error("Unable to load OBJ '{path}': {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("Unknown material '{0}'")]
    UnknownMaterial(String),
}

/// Result type for loading operations.
pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct SceneDesc {
    camera: CameraDesc,
    #[serde(default)]
    ambient: Option<[f32; 3]>,
    #[serde(default)]
    materials: HashMap<String, MaterialDesc>,
    #[serde(default)]
    lights: Vec<LightDesc>,
    #[serde(default)]
    meshes: Vec<MeshDesc>,
    #[serde(default)]
    cube_map: Option<CubeMapDesc>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct CameraDesc {
    position: [f32; 3],
    look_at: [f32; 3],
    #[serde(default = "default_up")]
    up: [f32; 3],
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    fov: f32,
    #[serde(default = "default_aspect")]
    aspect: f32,
}

fn default_up() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_fov() -> f32 {
    45.0
}

fn default_aspect() -> f32 {
    1.0
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum ParamDesc {
    Scalar(f32),
    Color([f32; 3]),
    Texture { texture: String },
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
struct MaterialDesc {
    ke: Option<ParamDesc>,
    ka: Option<ParamDesc>,
    ks: Option<ParamDesc>,
    kd: Option<ParamDesc>,
    kr: Option<ParamDesc>,
    kt: Option<ParamDesc>,
    shininess: Option<ParamDesc>,
    index: Option<ParamDesc>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
enum MaterialRef {
    Named(String),
    Inline(MaterialDesc),
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
enum LightDesc {
    Directional {
        direction: [f32; 3],
        #[serde(default = "default_light_color")]
        color: [f32; 3],
    },
    Point {
        position: [f32; 3],
        #[serde(default = "default_light_color")]
        color: [f32; 3],
        #[serde(default = "default_constant")]
        constant: f32,
        #[serde(default)]
        linear: f32,
        #[serde(default)]
        quadratic: f32,
    },
}

fn default_light_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_constant() -> f32 {
    1.0
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct MeshDesc {
    #[serde(default)]
    obj: Option<String>,
    #[serde(default)]
    vertices: Vec<[f32; 3]>,
    #[serde(default)]
    faces: Vec<[u32; 3]>,
    #[serde(default)]
    normals: Option<Vec<[f32; 3]>>,
    /// Average face normals per vertex when no normals are given
    #[serde(default)]
    generate_normals: bool,
    /// Per-vertex materials
    #[serde(default)]
    vertex_materials: Option<Vec<MaterialRef>>,
    #[serde(default)]
    material: Option<MaterialRef>,
    #[serde(default)]
    transform: Option<TransformDesc>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TransformDesc {
    #[serde(default)]
    translate: Option<[f32; 3]>,
    /// Euler XYZ in degrees
    #[serde(default)]
    rotate: Option<[f32; 3]>,
    #[serde(default)]
    scale: Option<ScaleDesc>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ScaleDesc {
    Uniform(f32),
    Axes([f32; 3]),
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct CubeMapDesc {
    pos_x: String,
    neg_x: String,
    pos_y: String,
    neg_y: String,
    pos_z: String,
    neg_z: String,
}

/// Load a scene file from disk.
pub fn load_scene_file<P: AsRef<Path>>(path: P) -> SceneResult<Scene> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    load_scene(std::io::BufReader::new(file), &base_dir, name)
}

/// Load a scene from an already opened source.
///
/// `base_dir` resolves relative texture and OBJ paths.
pub fn load_scene<R: Read>(reader: R, base_dir: &Path, name: &str) -> SceneResult<Scene> {
    let desc: SceneDesc = serde_json::from_reader(reader)?;
    let mut builder = SceneBuilder {
        base_dir: base_dir.to_path_buf(),
        textures: TextureCache::with_base_dir(base_dir),
        named: HashMap::new(),
    };
    builder.build(desc, name)
}

struct SceneBuilder {
    base_dir: PathBuf,
    textures: TextureCache,
    named: HashMap<String, Arc<Material>>,
}

impl SceneBuilder {
    fn build(&mut self, desc: SceneDesc, name: &str) -> SceneResult<Scene> {
        let camera = Camera::new(
            Vec3::from(desc.camera.position),
            Vec3::from(desc.camera.look_at),
            desc.camera.aspect,
        )
        .with_up(Vec3::from(desc.camera.up))
        .with_fov_degrees(desc.camera.fov);

        let mut scene = Scene::new(name, camera)
            .with_ambient(desc.ambient.map(Vec3::from).unwrap_or(Vec3::ZERO));

        // Sorted so texture errors are reported deterministically
        let mut names: Vec<_> = desc.materials.keys().cloned().collect();
        names.sort();
        for key in names {
            let material = self.material(&desc.materials[&key])?;
            self.named.insert(key, Arc::new(material));
        }

        for light in desc.lights {
            match light {
                LightDesc::Directional { direction, color } => scene.add_light(Box::new(
                    DirectionalLight::new(Vec3::from(direction), Vec3::from(color)),
                )),
                LightDesc::Point {
                    position,
                    color,
                    constant,
                    linear,
                    quadratic,
                } => scene.add_light(Box::new(PointLight::with_attenuation(
                    Vec3::from(position),
                    Vec3::from(color),
                    constant,
                    linear,
                    quadratic,
                ))),
            }
        }

        for (index, mesh_desc) in desc.meshes.into_iter().enumerate() {
            if let Some(mesh) = self.mesh(index, mesh_desc)? {
                scene.add_mesh(mesh);
            }
        }

        if let Some(cube) = desc.cube_map {
            let faces = [
                &cube.pos_x,
                &cube.neg_x,
                &cube.pos_y,
                &cube.neg_y,
                &cube.pos_z,
                &cube.neg_z,
            ];
            let mut loaded = Vec::with_capacity(6);
            for face in faces {
                loaded.push(self.textures.load(face)?);
            }
            if let Ok(faces) = <[_; 6]>::try_from(loaded) {
                scene.set_cube_map(CubeMap::new(faces));
            }
        }

        log::info!(
            "Loaded scene '{}': {} meshes, {} triangles, {} lights, {} textures",
            scene.name,
            scene.mesh_count(),
            scene.total_triangle_count(),
            scene.light_count(),
            self.textures.len()
        );

        Ok(scene)
    }

    fn param(&mut self, desc: &Option<ParamDesc>, default: f32) -> SceneResult<MaterialParameter> {
        Ok(match desc {
            None => MaterialParameter::scalar(default),
            Some(ParamDesc::Scalar(v)) => MaterialParameter::scalar(*v),
            Some(ParamDesc::Color(c)) => MaterialParameter::constant(Vec3::from(*c)),
            Some(ParamDesc::Texture { texture }) => {
                MaterialParameter::textured(self.textures.load(texture)?)
            }
        })
    }

    fn material(&mut self, desc: &MaterialDesc) -> SceneResult<Material> {
        Ok(Material {
            ke: self.param(&desc.ke, 0.0)?,
            ka: self.param(&desc.ka, 0.0)?,
            ks: self.param(&desc.ks, 0.0)?,
            kd: self.param(&desc.kd, 0.0)?,
            kr: self.param(&desc.kr, 0.0)?,
            kt: self.param(&desc.kt, 0.0)?,
            shininess: self.param(&desc.shininess, 0.0)?,
            index: self.param(&desc.index, 1.0)?,
        })
    }

    fn material_ref(&mut self, reference: &MaterialRef) -> SceneResult<Arc<Material>> {
        match reference {
            MaterialRef::Named(name) => self
                .named
                .get(name)
                .cloned()
                .ok_or_else(|| SceneError::UnknownMaterial(name.clone())),
            MaterialRef::Inline(desc) => Ok(Arc::new(self.material(desc)?)),
        }
    }

    /// Build one mesh. `Ok(None)` means the mesh was malformed and skipped.
    fn mesh(&mut self, index: usize, desc: MeshDesc) -> SceneResult<Option<Mesh>> {
        let material = match &desc.material {
            Some(reference) => self.material_ref(reference)?,
            None => Arc::new(Material::default()),
        };
        let transform = desc.transform.as_ref().map(TransformDesc::to_transform);
        let matrix = transform.as_ref().map(Transform::to_matrix);
        let normal_matrix = transform.as_ref().map(Transform::normal_matrix);

        let mut vertices: Vec<Vec3> = desc.vertices.iter().copied().map(Vec3::from).collect();
        let mut faces = desc.faces.clone();
        let mut normals: Option<Vec<Vec3>> = desc
            .normals
            .as_ref()
            .map(|n| n.iter().copied().map(Vec3::from).collect());

        if let Some(obj) = &desc.obj {
            let (obj_vertices, obj_faces, obj_normals) = self.load_obj(obj)?;
            let offset = vertices.len() as u32;
            vertices.extend(obj_vertices);
            faces.extend(obj_faces.into_iter().map(|f| f.map(|i| i + offset)));
            if desc.normals.is_none() && offset == 0 {
                normals = obj_normals;
            }
        }

        let mut mesh = Mesh::new(material);
        for v in vertices {
            mesh.add_vertex(matrix.map_or(v, |m| m.transform_point3(v)));
        }
        for n in normals.iter().flatten() {
            let n = normal_matrix.map_or(*n, |m| m.transform_vector3(*n));
            mesh.add_normal(n.normalize_or_zero());
        }
        if let Some(vertex_materials) = &desc.vertex_materials {
            for reference in vertex_materials {
                let m = self.material_ref(reference)?;
                mesh.add_vertex_material(m);
            }
        }

        if let Err(e) = mesh.validate() {
            log::warn!("Skipping mesh {}: {}", index, e);
            return Ok(None);
        }

        for [a, b, c] in faces {
            if let Err(e) = mesh.add_face(a, b, c) {
                log::warn!("Mesh {}: rejecting face: {}", index, e);
            }
        }

        if desc.generate_normals && mesh.normals().is_none() {
            mesh.generate_normals();
        }

        Ok(Some(mesh))
    }

    #[allow(clippy::type_complexity)]
    fn load_obj(&self, path: &str) -> SceneResult<(Vec<Vec3>, Vec<[u32; 3]>, Option<Vec<Vec3>>)> {
        let full_path = self.base_dir.join(path);
        let (models, _materials) = tobj::load_obj(
            &full_path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| SceneError::Obj {
            path: full_path.display().to_string(),
            source,
        })?;

        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        let mut normals = Vec::new();
        let mut all_have_normals = true;

        for model in &models {
            let mesh = &model.mesh;
            let offset = vertices.len() as u32;

            vertices.extend(mesh.positions.chunks_exact(3).map(Vec3::from_slice));
            faces.extend(
                mesh.indices
                    .chunks_exact(3)
                    .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
            );

            if mesh.normals.len() == mesh.positions.len() {
                normals.extend(mesh.normals.chunks_exact(3).map(Vec3::from_slice));
            } else {
                all_have_normals = false;
            }
        }

        log::debug!(
            "Loaded OBJ {}: {} models, {} vertices, {} faces",
            path,
            models.len(),
            vertices.len(),
            faces.len()
        );

        let normals = (all_have_normals && !normals.is_empty()).then_some(normals);
        Ok((vertices, faces, normals))
    }
}

impl TransformDesc {
    fn to_transform(&self) -> Transform {
        let rotation = self.rotate.map_or(Quat::IDENTITY, |[x, y, z]| {
            Quat::from_euler(EulerRot::XYZ, x.to_radians(), y.to_radians(), z.to_radians())
        });
        let scale = match self.scale {
            None => Vec3::ONE,
            Some(ScaleDesc::Uniform(s)) => Vec3::splat(s),
            Some(ScaleDesc::Axes(axes)) => Vec3::from(axes),
        };
        Transform {
            translation: self.translate.map(Vec3::from).unwrap_or(Vec3::ZERO),
            rotation,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_math::Vec2;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn load_str(json: &str) -> SceneResult<Scene> {
        load_scene(json.as_bytes(), Path::new("."), "test")
    }

    const TRIANGLE: &str = r#"{
        "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
        "ambient": [0.2, 0.2, 0.2],
        "materials": { "red": { "kd": [1, 0, 0], "ks": 0.5, "shininess": 16 } },
        "lights": [
            { "type": "point", "position": [0, 5, 0], "quadratic": 0.1 },
            { "type": "directional", "direction": [0, -1, 0], "color": [0.5, 0.5, 0.5] }
        ],
        "meshes": [
            { "vertices": [[-1, -1, 0], [1, -1, 0], [0, 1, 0]],
              "faces": [[0, 1, 2]],
              "material": "red" }
        ]
    }"#;

    #[test]
    fn test_load_triangle_scene() {
        let scene = load_str(TRIANGLE).unwrap();

        assert_eq!(scene.name, "test");
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.total_triangle_count(), 1);
        assert_eq!(scene.light_count(), 2);
        assert_eq!(scene.ambient, Vec3::splat(0.2));

        let mesh = &scene.meshes()[0];
        assert_eq!(mesh.material().kd(Vec2::ZERO), Vec3::X);
        assert!((mesh.material().shininess(Vec2::ZERO) - 16.0).abs() < 1e-3);
        // Faceted unless normals are asked for
        assert!(mesh.normals().is_none());
    }

    #[test]
    fn test_shared_vertex_box_stays_flat() {
        let box_mesh = |generate: bool| {
            format!(
                r#"{{
                "camera": {{ "position": [0, 1, 3], "look_at": [0, 1, 0] }},
                "meshes": [
                    {{ "vertices": [[-1, 0, 1], [1, 0, 1], [1, 0, -1], [-1, 0, -1],
                                    [-1, 2, -1], [1, 2, -1]],
                      "faces": [[0, 1, 2], [0, 2, 3], [3, 2, 5], [3, 5, 4]],
                      "generate_normals": {generate} }}
                ]
            }}"#
            )
        };

        let flat = load_str(&box_mesh(false)).unwrap();
        assert!(flat.meshes()[0].normals().is_none());

        let smooth = load_str(&box_mesh(true)).unwrap();
        let normals = smooth.meshes()[0].normals().unwrap();
        assert_eq!(normals.len(), 6);
        // Corner shared by the floor and the back wall is bent between them
        assert!(normals[3].y > 0.1 && normals[3].z > 0.1);
        // Front corner only touches the floor
        assert!((normals[0] - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_misspelled_light_key_rejected() {
        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "lights": [ { "type": "point", "position": [0, 5, 0], "quadratc": 0.1 } ]
        }"#;
        let err = load_str(json).unwrap_err();
        assert!(matches!(err, SceneError::Syntax(_)));
        assert!(err.to_string().contains("quadratc"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = load_str("{ \"camera\": ").unwrap_err();
        assert!(matches!(err, SceneError::Syntax(_)));
    }

    #[test]
    fn test_unknown_material() {
        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "meshes": [ { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                          "faces": [[0, 1, 2]], "material": "missing" } ]
        }"#;
        let err = load_str(json).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_missing_texture_names_file() {
        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "materials": { "wood": { "kd": { "texture": "no_such_wood.png" } } }
        }"#;
        let err = load_str(json).unwrap_err();
        assert!(matches!(err, SceneError::Texture(_)));
        assert!(err.to_string().contains("no_such_wood.png"));
    }

    #[test]
    fn test_malformed_mesh_skipped() {
        init_logging();
        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "meshes": [
                { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                  "normals": [[0, 0, 1]],
                  "faces": [[0, 1, 2]] },
                { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                  "faces": [[0, 1, 2], [0, 1, 7]] }
            ]
        }"#;
        let scene = load_str(json).unwrap();

        // First mesh dropped for the normal count, second keeps its good face
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.total_triangle_count(), 1);
    }

    #[test]
    fn test_vertex_materials() {
        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "materials": { "a": { "kd": [1, 0, 0] } },
            "meshes": [
                { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                  "vertex_materials": ["a", { "kd": [0, 1, 0] }, { "kd": 0.5 }],
                  "faces": [[0, 1, 2]] }
            ]
        }"#;
        let scene = load_str(json).unwrap();
        let materials = scene.meshes()[0].vertex_materials().unwrap();
        assert_eq!(materials.len(), 3);
        assert_eq!(materials[2].kd(Vec2::ZERO), Vec3::splat(0.5));
    }

    #[test]
    fn test_transform_applied() {
        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0] },
            "meshes": [
                { "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                  "faces": [[0, 1, 2]],
                  "transform": { "translate": [0, 0, -2], "scale": 2 } }
            ]
        }"#;
        let scene = load_str(json).unwrap();
        let vertices = scene.meshes()[0].vertices();
        assert_eq!(vertices[1], Vec3::new(2.0, 0.0, -2.0));
    }

    #[test]
    fn test_load_scene_file_with_obj_and_textures() {
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(
            dir.path().join("tri.obj"),
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();
        let img = image::RgbImage::from_raw(1, 1, vec![0, 0, 255]).unwrap();
        for face in ["px", "nx", "py", "ny", "pz", "nz"] {
            img.save(dir.path().join(format!("{face}.png"))).unwrap();
        }

        let json = r#"{
            "camera": { "position": [0, 0, 5], "look_at": [0, 0, 0], "fov": 60, "aspect": 1.5 },
            "meshes": [ { "obj": "tri.obj", "material": { "kd": { "texture": "px.png" } } } ],
            "cube_map": { "pos_x": "px.png", "neg_x": "nx.png", "pos_y": "py.png",
                          "neg_y": "ny.png", "pos_z": "pz.png", "neg_z": "nz.png" }
        }"#;
        let scene_path = dir.path().join("scene.json");
        std::fs::write(&scene_path, json).unwrap();

        let scene = load_scene_file(&scene_path).unwrap();
        assert_eq!(scene.name, "scene");
        assert_eq!(scene.total_triangle_count(), 1);
        assert_eq!(scene.camera.aspect, 1.5);

        let cube = scene.cube_map().unwrap();
        assert_eq!(cube.sample(Vec3::NEG_Y), Some(Vec3::Z));
        assert_eq!(scene.meshes()[0].material().kd(Vec2::ZERO), Vec3::Z);
    }
}
