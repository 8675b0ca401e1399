//! Phong material definition.
//!
//! Every coefficient is a [`MaterialParameter`]: a constant RGB value or a
//! texture map looked up at the hit's UV coordinates.

use std::sync::Arc;

use prism_math::{Vec2, Vec3};

use crate::texture::TextureMap;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Luma weights used to turn a color into a scalar parameter.
const LUMA: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// Textured shininess maps intensity [0, 1] onto exponent [0, 128].
const TEXTURED_SHININESS_SCALE: f32 = 128.0;

/// A constant RGB value or a texture lookup.
#[derive(Clone, Debug, Default)]
pub struct MaterialParameter {
    value: Color,
    texture: Option<Arc<TextureMap>>,
}

impl MaterialParameter {
    pub fn constant(value: Color) -> Self {
        Self {
            value,
            texture: None,
        }
    }

    /// Constant with the same value on every channel.
    pub fn scalar(value: f32) -> Self {
        Self::constant(Color::splat(value))
    }

    pub fn textured(texture: Arc<TextureMap>) -> Self {
        Self {
            value: Color::ZERO,
            texture: Some(texture),
        }
    }

    pub fn is_textured(&self) -> bool {
        self.texture.is_some()
    }

    /// True for a constant black parameter.
    pub fn is_zero(&self) -> bool {
        self.texture.is_none() && self.value == Color::ZERO
    }

    /// RGB value at `uv`.
    #[inline]
    pub fn value(&self, uv: Vec2) -> Color {
        match &self.texture {
            Some(texture) => texture.sample(uv),
            None => self.value,
        }
    }

    /// Scalar (luma) value at `uv`.
    #[inline]
    pub fn intensity(&self, uv: Vec2) -> f32 {
        self.value(uv).dot(LUMA)
    }
}

/// Phong material with reflective and transmissive terms.
#[derive(Clone, Debug)]
pub struct Material {
    /// Emissive
    pub ke: MaterialParameter,
    /// Ambient
    pub ka: MaterialParameter,
    /// Specular
    pub ks: MaterialParameter,
    /// Diffuse
    pub kd: MaterialParameter,
    /// Reflective
    pub kr: MaterialParameter,
    /// Transmissive
    pub kt: MaterialParameter,
    /// Phong exponent
    pub shininess: MaterialParameter,
    /// Index of refraction
    pub index: MaterialParameter,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ke: MaterialParameter::default(),
            ka: MaterialParameter::default(),
            ks: MaterialParameter::default(),
            kd: MaterialParameter::default(),
            kr: MaterialParameter::default(),
            kt: MaterialParameter::default(),
            shininess: MaterialParameter::default(),
            index: MaterialParameter::scalar(1.0),
        }
    }
}

impl Material {
    /// Plain diffuse material.
    pub fn diffuse(color: Color) -> Self {
        Self {
            kd: MaterialParameter::constant(color),
            ..Default::default()
        }
    }

    pub fn ke(&self, uv: Vec2) -> Color {
        self.ke.value(uv)
    }

    pub fn ka(&self, uv: Vec2) -> Color {
        self.ka.value(uv)
    }

    pub fn ks(&self, uv: Vec2) -> Color {
        self.ks.value(uv)
    }

    pub fn kd(&self, uv: Vec2) -> Color {
        self.kd.value(uv)
    }

    pub fn kr(&self, uv: Vec2) -> Color {
        self.kr.value(uv)
    }

    pub fn kt(&self, uv: Vec2) -> Color {
        self.kt.value(uv)
    }

    pub fn shininess(&self, uv: Vec2) -> f32 {
        let intensity = self.shininess.intensity(uv);
        if self.shininess.is_textured() {
            intensity * TEXTURED_SHININESS_SCALE
        } else {
            intensity
        }
    }

    pub fn index(&self, uv: Vec2) -> f32 {
        self.index.intensity(uv)
    }

    /// Whether refraction rays are spawned for this material.
    pub fn is_transparent(&self) -> bool {
        !self.kt.is_zero()
    }

    /// Whether mirror rays are spawned for this material.
    pub fn is_reflective(&self) -> bool {
        !self.kr.is_zero()
    }

    /// Barycentric blend of three materials evaluated at `uv`.
    ///
    /// The result holds constants only; it lives for one intersection.
    pub fn blend(materials: [&Material; 3], weights: Vec3, uv: Vec2) -> Material {
        let color = |f: fn(&Material, Vec2) -> Color| {
            MaterialParameter::constant(
                f(materials[0], uv) * weights.x
                    + f(materials[1], uv) * weights.y
                    + f(materials[2], uv) * weights.z,
            )
        };
        let scalar = |f: fn(&Material, Vec2) -> f32| {
            let value = f(materials[0], uv) * weights.x
                + f(materials[1], uv) * weights.y
                + f(materials[2], uv) * weights.z;
            MaterialParameter::scalar(value / LUMA.element_sum())
        };

        Material {
            ke: color(Material::ke),
            ka: color(Material::ka),
            ks: color(Material::ks),
            kd: color(Material::kd),
            kr: color(Material::kr),
            kt: color(Material::kt),
            shininess: scalar(Material::shininess),
            index: scalar(Material::index),
        }
    }
}
