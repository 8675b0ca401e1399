//! Mirror reflection and Snell refraction directions.
//!
//! Both take the incoming ray direction and the surface normal as stored in
//! the hit record, which is not flipped toward the viewer.

use prism_math::Vec3;

/// Index of refraction of air.
pub const INDEX_AIR: f32 = 1.000_277_2;

/// Mirror of the reversed incoming direction about `normal`, unit length.
pub fn reflect_direction(incoming: Vec3, normal: Vec3) -> Vec3 {
    let to_viewer = -incoming.normalize_or_zero();
    (2.0 * to_viewer.dot(normal) * normal - to_viewer).normalize_or_zero()
}

/// Transmitted direction through a surface of refractive `index`.
///
/// The ray enters the material when it arrives against the normal and
/// leaves it otherwise. Returns `None` on total internal reflection.
pub fn refract_direction(incoming: Vec3, normal: Vec3, index: f32) -> Option<Vec3> {
    let to_viewer = -incoming.normalize_or_zero();
    let mut normal = normal;
    let mut cos_i = normal.dot(to_viewer);

    let (n_i, n_t) = if cos_i > 0.0 {
        (INDEX_AIR, index)
    } else {
        normal = -normal;
        cos_i = -cos_i;
        (index, INDEX_AIR)
    };

    let n = n_i / n_t;
    let term = 1.0 - n * n * (1.0 - cos_i * cos_i);
    if term < 0.0 {
        return None;
    }

    let transmitted = (n * cos_i - term.sqrt()) * normal - n * to_viewer;
    Some(transmitted.normalize_or_zero())
}
