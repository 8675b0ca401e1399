//! Simple Whitted example.
//!
//! Builds a mirror floor, a glass prism and a diffuse wall in code, renders
//! them with 2x2 antialiasing and saves a PNG.

use std::sync::Arc;

use prism_core::{DirectionalLight, Material, MaterialParameter, Mesh, PointLight, Scene};
use prism_math::{Camera, Vec3};
use prism_tracer::{RayTracer, SampleGrid, TraceConfig};

fn main() {
    println!("Prism - Simple Whitted Example");
    println!("==============================");

    let start = std::time::Instant::now();
    let scene = build_scene();
    println!("Scene built in {:?} ({} triangles)", start.elapsed(), scene.total_triangle_count());

    let mut tracer = RayTracer::new();
    tracer.set_scene(scene);
    tracer.trace_setup(640, 480);

    let config = TraceConfig::default()
        .with_max_depth(4)
        .with_antialiasing(SampleGrid::Four)
        .with_background(Vec3::new(0.1, 0.12, 0.18));

    let start = std::time::Instant::now();
    let stats = tracer.render(&config);
    println!(
        "Rendered in {:?}: {} shade evaluations, {} secondary rays",
        start.elapsed(),
        stats.shade_evaluations,
        stats.recursive_calls
    );

    let filename = "output.png";
    tracer.save_png(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Scene {
    let camera = Camera::new(Vec3::new(0.0, 2.0, 7.0), Vec3::new(0.0, 0.8, 0.0), 640.0 / 480.0);
    let mut scene = Scene::new("simple", camera).with_ambient(Vec3::splat(0.15));

    // Mirror floor
    let floor = Material {
        kd: MaterialParameter::scalar(0.3),
        ka: MaterialParameter::scalar(0.3),
        kr: MaterialParameter::scalar(0.4),
        ..Default::default()
    };
    let mut mesh = Mesh::new(Arc::new(floor));
    for v in [[-6.0, 0.0, 6.0], [6.0, 0.0, 6.0], [6.0, 0.0, -6.0], [-6.0, 0.0, -6.0]] {
        mesh.add_vertex(Vec3::from(v));
    }
    mesh.add_face(0, 1, 2).unwrap();
    mesh.add_face(0, 2, 3).unwrap();
    mesh.generate_normals();
    scene.add_mesh(mesh);

    // Back wall with a color per corner
    let mut wall = Mesh::new(Arc::new(Material::default()));
    let corners = [
        ([-6.0, 0.0, -4.0], Vec3::new(0.8, 0.2, 0.2)),
        ([6.0, 0.0, -4.0], Vec3::new(0.2, 0.8, 0.2)),
        ([6.0, 5.0, -4.0], Vec3::new(0.2, 0.2, 0.8)),
        ([-6.0, 5.0, -4.0], Vec3::new(0.8, 0.8, 0.2)),
    ];
    for (position, color) in corners {
        wall.add_vertex(Vec3::from(position));
        wall.add_vertex_material(Arc::new(Material {
            ka: MaterialParameter::constant(color),
            ..Material::diffuse(color)
        }));
    }
    wall.add_face(0, 1, 2).unwrap();
    wall.add_face(0, 2, 3).unwrap();
    wall.generate_normals();
    scene.add_mesh(wall);

    // Glass prism
    let glass = Material {
        ks: MaterialParameter::scalar(0.8),
        shininess: MaterialParameter::scalar(64.0),
        kr: MaterialParameter::scalar(0.1),
        kt: MaterialParameter::scalar(0.85),
        index: MaterialParameter::scalar(1.5),
        ..Default::default()
    };
    let mut prism = Mesh::new(Arc::new(glass));
    let base = [[-1.0, 0.01, 1.0], [1.0, 0.01, 1.0], [0.0, 0.01, -0.7]];
    for v in base {
        prism.add_vertex(Vec3::from(v));
    }
    for [x, _, z] in base {
        prism.add_vertex(Vec3::new(x, 2.0, z));
    }
    let faces = [
        [0, 2, 1],
        [3, 4, 5],
        [0, 1, 4],
        [0, 4, 3],
        [1, 2, 5],
        [1, 5, 4],
        [2, 0, 3],
        [2, 3, 5],
    ];
    for [a, b, c] in faces {
        prism.add_face(a, b, c).unwrap();
    }
    scene.add_mesh(prism);

    scene.add_light(Box::new(PointLight::with_attenuation(
        Vec3::new(2.0, 4.0, 3.0),
        Vec3::new(1.0, 0.95, 0.9),
        1.0,
        0.02,
        0.01,
    )));
    scene.add_light(Box::new(DirectionalLight::new(
        Vec3::new(-0.3, -1.0, -0.5),
        Vec3::splat(0.3),
    )));

    scene
}
