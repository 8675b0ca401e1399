//! Prism tracer - recursive Whitted-style CPU ray tracing.
//!
//! Primary rays from the scene camera are intersected against every mesh
//! triangle, shaded with Phong lighting and shadows, and followed through
//! mirror reflection and refraction up to a fixed depth. Rays that leave
//! the scene sample a cube map or the background color.

mod bucket;
mod hittable;
mod optics;
mod renderer;
mod sampler;
mod shading;
mod tracer;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use hittable::{HitRecord, Hittable, World};
pub use optics::{reflect_direction, refract_direction, INDEX_AIR};
pub use renderer::RayTracer;
pub use sampler::{color_to_rgb, pixel_color, write_pixel, SampleGrid};
pub use shading::shade;
pub use tracer::{trace, trace_ray, DebugRay, TraceConfig, TraceContext, TraceStats};
pub use triangle::{intersect_face, FaceHit, TriangleMesh};

/// Re-export common math types from prism_math
pub use prism_math::{Interval, Ray, RayKind, Vec3};
