//! Texture maps and the texture cache used while loading scenes.
//!
//! Texture maps are decoded once at load time into 8-bit RGB and are
//! read-only afterwards. Sampling is nearest-pixel with edge clamping.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use prism_math::{Interval, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Unable to load texture map '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture map '{0}' has no pixels")]
    Empty(String),

    #[error("Texture map '{path}' has {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: String,
        expected: usize,
        actual: usize,
    },
}

impl TextureError {
    /// The file (or pseudo path) the failure refers to.
    pub fn path(&self) -> &str {
        match self {
            TextureError::Load { path, .. } => path,
            TextureError::Empty(path) => path,
            TextureError::SizeMismatch { path, .. } => path,
        }
    }
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture map.
///
/// Rows are stored bottom row first so that v = 0 is the bottom of the image.
#[derive(Clone, Debug)]
pub struct TextureMap {
    width: u32,
    height: u32,
    /// RGB bytes, row-major, bottom row first
    data: Vec<u8>,
    /// Original file path (for error messages and debugging)
    path: String,
}

impl TextureMap {
    /// Build a texture from bottom-up RGB bytes.
    pub fn from_rgb(
        width: u32,
        height: u32,
        data: Vec<u8>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        let path = path.into();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(path));
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                path,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            path,
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        let byte = |c: f32| (Interval::UNIT.clamp(c) * 255.0) as u8;
        Self {
            width: 1,
            height: 1,
            data: vec![byte(color.x), byte(color.y), byte(color.z)],
            path: "<solid>".to_string(),
        }
    }

    /// Decode an image file.
    pub fn load(path: &Path) -> TextureResult<Self> {
        let display = path.display().to_string();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: display.clone(),
            source,
        })?;

        // Flip so the first stored row is the bottom of the picture
        let rgb = image::imageops::flip_vertical(&img.to_rgb8());
        let (width, height) = rgb.dimensions();

        Self::from_rgb(width, height, rgb.into_raw(), display)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Nearest-pixel lookup at UV coordinates.
    ///
    /// Coordinates outside [0, 1] clamp to the edge row/column.
    pub fn sample(&self, uv: Vec2) -> Vec3 {
        let x = (uv.x * self.width as f32) as i64;
        let y = (uv.y * self.height as f32) as i64;
        self.pixel_at(x, y)
    }

    /// Pixel at integer coordinates, clamped into the image.
    pub fn pixel_at(&self, x: i64, y: i64) -> Vec3 {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        let pos = (y * self.width as usize + x) * 3;
        Vec3::new(
            self.data[pos] as f32 / 255.0,
            self.data[pos + 1] as f32 / 255.0,
            self.data[pos + 2] as f32 / 255.0,
        )
    }

    /// Get total size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and shared between every material and
/// cube map face that names the same file.
pub struct TextureCache {
    /// Cached textures by file path as written in the scene
    textures: HashMap<String, Arc<TextureMap>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<TextureMap>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(TextureMap::load(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width(),
            texture.height(),
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 texture: bottom row red, green; top row blue, white.
    fn quad_texture() -> TextureMap {
        TextureMap::from_rgb(
            2,
            2,
            vec![
                255, 0, 0, 0, 255, 0, // bottom row
                0, 0, 255, 255, 255, 255, // top row
            ],
            "quad",
        )
        .unwrap()
    }

    #[test]
    fn test_solid_color_texture() {
        let tex = TextureMap::solid_color(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.width(), 1);
        assert_eq!(tex.height(), 1);

        let sample = tex.sample(Vec2::new(0.5, 0.5));
        assert_eq!(sample, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_nearest_sampling() {
        let tex = quad_texture();

        assert_eq!(tex.sample(Vec2::new(0.1, 0.1)), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(tex.sample(Vec2::new(0.9, 0.1)), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(Vec2::new(0.1, 0.9)), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(tex.sample(Vec2::new(0.9, 0.9)), Vec3::ONE);
    }

    #[test]
    fn test_sampling_clamps_at_edges() {
        let tex = quad_texture();

        // u = v = 1 lands one past the last texel and clamps back
        assert_eq!(tex.sample(Vec2::new(1.0, 1.0)), Vec3::ONE);
        assert_eq!(tex.sample(Vec2::new(5.0, 0.0)), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(tex.sample(Vec2::new(-3.0, -3.0)), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_from_rgb_rejects_bad_sizes() {
        assert!(matches!(
            TextureMap::from_rgb(0, 4, vec![], "empty"),
            Err(TextureError::Empty(_))
        ));
        let err = TextureMap::from_rgb(2, 2, vec![0; 5], "short").unwrap_err();
        assert_eq!(err.path(), "short");
    }

    #[test]
    fn test_missing_file_names_the_file() {
        let err = TextureMap::load(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(err.to_string().contains("definitely/not/here.png"));
    }

    #[test]
    fn test_load_flips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripe.png");

        // Top row white, bottom row black in image (top-down) order
        let img = image::RgbImage::from_raw(1, 2, vec![255, 255, 255, 0, 0, 0]).unwrap();
        img.save(&path).unwrap();

        let tex = TextureMap::load(&path).unwrap();
        assert_eq!(tex.sample(Vec2::new(0.5, 0.1)), Vec3::ZERO);
        assert_eq!(tex.sample(Vec2::new(0.5, 0.9)), Vec3::ONE);
    }

    #[test]
    fn test_texture_cache() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::from_raw(1, 1, vec![0, 255, 0])
            .unwrap()
            .save(dir.path().join("leaf.png"))
            .unwrap();

        let mut cache = TextureCache::with_base_dir(dir.path());
        assert!(cache.is_empty());

        let first = cache.load("leaf.png").unwrap();
        let second = cache.load("leaf.png").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.sample(Vec2::ZERO), Vec3::Y);

        let cache = TextureCache::with_base_dir("/scenes");
        assert_eq!(
            cache.resolve_path("maps/wood.png"),
            PathBuf::from("/scenes/maps/wood.png")
        );
    }
}
