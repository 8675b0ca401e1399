//! Recursive Whitted-style tracing.
//!
//! A hit is shaded locally, then spawns a mirror ray (reflective materials)
//! and a transmitted ray (transparent materials, unless totally internally
//! reflected) while depth remains. A miss samples the cube map or returns
//! the background color.

use prism_core::{Color, Scene};
use prism_math::{Interval, Ray, RayKind};

use crate::hittable::{HitRecord, Hittable, World};
use crate::optics::{reflect_direction, refract_direction};
use crate::sampler::SampleGrid;
use crate::shading::shade;

/// Tracer configuration.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Secondary ray generations below each primary ray
    pub max_depth: u32,
    /// Cast shadow probes toward lights
    pub shadows: bool,
    /// Interpolate vertex normals where a mesh has them
    pub smooth_shading: bool,
    /// Average `sample_grid` samples per pixel
    pub antialiasing: bool,
    pub sample_grid: SampleGrid,
    /// Sample the scene's cube map on a miss
    pub cube_map: bool,
    /// Color of rays that leave the scene
    pub background: Color,
    /// Record every traced ray in the trace context
    pub debug: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            shadows: true,
            smooth_shading: true,
            antialiasing: false,
            sample_grid: SampleGrid::One,
            cube_map: false,
            background: Color::ZERO,
            debug: false,
        }
    }
}

impl TraceConfig {
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_shadows(mut self, shadows: bool) -> Self {
        self.shadows = shadows;
        self
    }

    pub fn with_smooth_shading(mut self, smooth_shading: bool) -> Self {
        self.smooth_shading = smooth_shading;
        self
    }

    /// Enable antialiasing with the given grid (`SampleGrid::One` disables it).
    pub fn with_antialiasing(mut self, grid: SampleGrid) -> Self {
        self.antialiasing = grid != SampleGrid::One;
        self.sample_grid = grid;
        self
    }

    pub fn with_cube_map(mut self, cube_map: bool) -> Self {
        self.cube_map = cube_map;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Counters for one or more traces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Local illumination evaluations
    pub shade_evaluations: u64,
    /// Secondary rays traced
    pub recursive_calls: u64,
}

impl TraceStats {
    pub fn merge(&mut self, other: TraceStats) {
        self.shade_evaluations += other.shade_evaluations;
        self.recursive_calls += other.recursive_calls;
    }
}

/// A ray recorded by the debug log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugRay {
    pub ray: Ray,
    /// Hit distance, `None` for a miss
    pub t: Option<f32>,
}

/// Mutable state owned by one caller of [`trace`].
#[derive(Debug, Default)]
pub struct TraceContext {
    pub stats: TraceStats,
    rays: Vec<DebugRay>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rays of the most recent top-level trace, when debugging is on.
    pub fn rays(&self) -> &[DebugRay] {
        &self.rays
    }

    fn record(&mut self, config: &TraceConfig, ray: &Ray, t: Option<f32>) {
        if config.debug {
            self.rays.push(DebugRay { ray: *ray, t });
        }
    }
}

/// Color of the primary ray through normalized screen coordinates (x, y),
/// clamped to [0, 1] per channel.
pub fn trace(scene: &Scene, x: f32, y: f32, config: &TraceConfig, ctx: &mut TraceContext) -> Color {
    ctx.rays.clear();

    let world = World::new(scene, config.smooth_shading);
    let ray = scene.camera.ray_through(x, y);
    let color = trace_ray(&world, &ray, config.max_depth, config, ctx);

    Color::new(
        Interval::UNIT.clamp(color.x),
        Interval::UNIT.clamp(color.y),
        Interval::UNIT.clamp(color.z),
    )
}

/// Unclamped color seen along `ray`, recursing at most `depth` more times.
pub fn trace_ray(
    world: &World<'_>,
    ray: &Ray,
    depth: u32,
    config: &TraceConfig,
    ctx: &mut TraceContext,
) -> Color {
    let mut rec = HitRecord::new();

    if !world.hit(ray, Interval::forward(f32::MAX), &mut rec) {
        ctx.record(config, ray, None);
        return miss_color(world.scene(), ray, config);
    }
    ctx.record(config, ray, Some(rec.t));

    ctx.stats.shade_evaluations += 1;
    let mut color = shade(world, ray, &rec, config);

    if depth == 0 {
        return color;
    }

    let point = rec.point(ray);
    let uv = rec.uv;
    let material = &rec.material;

    if material.is_reflective() {
        let reflected = Ray::new(
            point,
            reflect_direction(ray.direction(), rec.normal),
            RayKind::Reflection,
        );
        ctx.stats.recursive_calls += 1;
        color += material.kr(uv) * trace_ray(world, &reflected, depth - 1, config, ctx);
    }

    if material.is_transparent() {
        // None means total internal reflection
        if let Some(direction) = refract_direction(ray.direction(), rec.normal, material.index(uv)) {
            let refracted = Ray::new(point, direction, RayKind::Refraction);
            ctx.stats.recursive_calls += 1;
            color += material.kt(uv) * trace_ray(world, &refracted, depth - 1, config, ctx);
        }
    }

    color
}

fn miss_color(scene: &Scene, ray: &Ray, config: &TraceConfig) -> Color {
    if config.cube_map {
        if let Some(color) = scene.cube_map().and_then(|cube| cube.sample(ray.direction())) {
            return color;
        }
    }
    config.background
}
