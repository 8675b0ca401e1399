//! Phong local illumination.

use prism_core::Color;
use prism_math::Ray;

use crate::hittable::{HitRecord, World};
use crate::tracer::TraceConfig;

/// Local color at a hit: emission, ambient, then every light in order.
pub fn shade(world: &World<'_>, ray: &Ray, rec: &HitRecord<'_>, config: &TraceConfig) -> Color {
    let scene = world.scene();
    let material = &rec.material;
    let uv = rec.uv;
    let point = rec.point(ray);
    let normal = rec.normal;
    let view = -ray.unit_direction();

    let kd = material.kd(uv);
    let ks = material.ks(uv);
    let shininess = material.shininess(uv);

    let mut color = material.ke(uv) + material.ka(uv) * scene.ambient;

    for light in scene.lights() {
        let to_light = light.direction(point);
        let mut attenuation = Color::splat(light.distance_attenuation(point));
        if config.shadows {
            attenuation *= light.shadow_attenuation(world, point);
        }

        let n_dot_l = normal.dot(to_light);
        let reflected = 2.0 * n_dot_l * normal - to_light;

        let diffuse = kd * n_dot_l.max(0.0);
        let specular = ks * reflected.dot(view).max(0.0).powf(shininess);

        color += light.color() * attenuation * (diffuse + specular);
    }

    color
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::hittable::Hittable;
    use prism_core::{DirectionalLight, Material, MaterialParameter, Mesh, PointLight, Scene};
    use prism_math::{Camera, Interval, Vec3};

    fn floor(material: Material) -> Mesh {
        let mut mesh = Mesh::new(Arc::new(material));
        mesh.add_vertex(Vec3::new(-5.0, 0.0, 5.0));
        mesh.add_vertex(Vec3::new(5.0, 0.0, 5.0));
        mesh.add_vertex(Vec3::new(5.0, 0.0, -5.0));
        mesh.add_vertex(Vec3::new(-5.0, 0.0, -5.0));
        mesh.add_face(0, 1, 2).unwrap();
        mesh.add_face(0, 2, 3).unwrap();
        mesh
    }

    fn scene_with(material: Material) -> Scene {
        let camera = Camera::new(Vec3::new(0.0, 5.0, 0.01), Vec3::ZERO, 1.0);
        let mut scene = Scene::new("shading", camera);
        scene.add_mesh(floor(material));
        scene
    }

    /// Shaded point on the floor, away from the diagonal between its faces.
    const P: Vec3 = Vec3::new(0.3, 0.0, 0.1);

    fn shade_down(scene: &Scene, config: &TraceConfig) -> Color {
        let world = World::new(scene, config.smooth_shading);
        let ray = Ray::visibility(P + Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y);
        let mut rec = HitRecord::new();
        assert!(world.hit(&ray, Interval::forward(f32::MAX), &mut rec));
        shade(&world, &ray, &rec, config)
    }

    #[test]
    fn test_emissive_and_ambient() {
        let material = Material {
            ke: MaterialParameter::constant(Vec3::new(0.1, 0.0, 0.0)),
            ka: MaterialParameter::scalar(0.5),
            ..Default::default()
        };
        let scene = scene_with(material).with_ambient(Vec3::new(0.0, 0.4, 0.0));

        let color = shade_down(&scene, &TraceConfig::default());
        assert!((color - Vec3::new(0.1, 0.2, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_diffuse_lambert() {
        let mut scene = scene_with(Material::diffuse(Vec3::ONE));
        // 60 degrees from the normal
        let dir = Vec3::new(-(60f32.to_radians().sin()), -(60f32.to_radians().cos()), 0.0);
        scene.add_light(Box::new(DirectionalLight::new(dir, Vec3::ONE)));

        let color = shade_down(&scene, &TraceConfig::default());
        assert!((color - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_light_below_surface_adds_nothing() {
        let mut scene = scene_with(Material::diffuse(Vec3::ONE));
        scene.add_light(Box::new(DirectionalLight::new(Vec3::Y, Vec3::ONE)));

        let config = TraceConfig::default().with_shadows(false);
        assert_eq!(shade_down(&scene, &config), Vec3::ZERO);
    }

    #[test]
    fn test_specular_highlight() {
        let material = Material {
            ks: MaterialParameter::scalar(1.0),
            shininess: MaterialParameter::scalar(10.0),
            ..Default::default()
        };
        let mut scene = scene_with(material);
        scene.add_light(Box::new(PointLight::new(P + Vec3::new(0.0, 4.0, 0.0), Vec3::ONE)));

        // Light straight above, viewer straight above: R.V = 1
        let color = shade_down(&scene, &TraceConfig::default());
        assert!((color - Vec3::ONE).length() < 1e-4);
    }

    #[test]
    fn test_lights_accumulate_and_attenuate() {
        let mut scene = scene_with(Material::diffuse(Vec3::ONE));
        scene.add_light(Box::new(PointLight::with_attenuation(
            P + Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            0.0,
            0.0,
            1.0,
        )));
        scene.add_light(Box::new(DirectionalLight::new(Vec3::NEG_Y, Vec3::new(0.0, 0.0, 0.5))));

        let color = shade_down(&scene, &TraceConfig::default());
        assert!((color - Vec3::new(0.25, 0.0, 0.5)).length() < 1e-5);
    }
}
