//! The `RayTracer` driver: committed scene, output buffer and rendering.
//!
//! Errors stop at this boundary and are reported as message strings.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use prism_core::{Color, Scene};
use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::sampler::{pixel_color, write_pixel};
use crate::tracer::{TraceConfig, TraceContext, TraceStats};

const BYTES_PER_PIXEL: usize = 3;

/// Scene, RGB output buffer and its dimensions.
///
/// Buffer rows are stored bottom row first.
#[derive(Debug, Default)]
pub struct RayTracer {
    scene: Option<Arc<Scene>>,
    buffer: Vec<u8>,
    width: u32,
    height: u32,
}

impl RayTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a scene from an open source. Relative paths resolve against `base_dir`.
    ///
    /// On failure the previously loaded scene stays active.
    pub fn load_scene<R: Read>(&mut self, reader: R, base_dir: &Path, name: &str) -> Result<(), String> {
        let scene = prism_core::load_scene(reader, base_dir, name).map_err(|e| e.to_string())?;
        self.commit(scene);
        Ok(())
    }

    /// Load a scene file from disk. On failure the previous scene stays active.
    pub fn load_scene_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let scene = prism_core::load_scene_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        self.commit(scene);
        Ok(())
    }

    /// Use an already built scene.
    pub fn set_scene(&mut self, scene: Scene) {
        self.commit(scene);
    }

    fn commit(&mut self, scene: Scene) {
        log::info!("Scene '{}' is now active", scene.name);
        self.scene = Some(Arc::new(scene));
    }

    pub fn scene_loaded(&self) -> bool {
        self.scene.is_some()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_deref()
    }

    /// Camera aspect ratio of the loaded scene, 1 without one.
    pub fn aspect_ratio(&self) -> f32 {
        self.scene.as_ref().map_or(1.0, |s| s.camera.aspect)
    }

    /// Size the output buffer. A change of dimensions reallocates it zero-filled.
    pub fn trace_setup(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.buffer = vec![0; width as usize * height as usize * BYTES_PER_PIXEL];
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB bytes, bottom row first.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Trace pixel (i, j) and store its bytes in the buffer.
    ///
    /// Returns black without touching the buffer when no scene is loaded
    /// or the pixel lies outside the buffer.
    pub fn trace_pixel(&mut self, i: u32, j: u32, config: &TraceConfig) -> Color {
        let Some(scene) = self.scene.as_deref() else {
            return Color::ZERO;
        };
        if i >= self.width || j >= self.height {
            return Color::ZERO;
        }

        let mut ctx = TraceContext::new();
        let color = pixel_color(scene, i, j, self.width, self.height, config, &mut ctx);

        let offset = self.pixel_offset(i, j);
        write_pixel(&mut self.buffer[offset..offset + BYTES_PER_PIXEL], color);
        color
    }

    /// Render the whole buffer in parallel buckets.
    pub fn render(&mut self, config: &TraceConfig) -> TraceStats {
        let Some(scene) = self.scene.clone() else {
            log::warn!("No scene loaded, nothing to render");
            return TraceStats::default();
        };

        let (width, height) = (self.width, self.height);
        let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);
        log::info!(
            "Rendering {}x{} in {} buckets (depth {}, {} samples/pixel)",
            width,
            height,
            buckets.len(),
            config.max_depth,
            if config.antialiasing {
                config.sample_grid.sample_count()
            } else {
                1
            }
        );

        let start = Instant::now();
        let results: Vec<BucketResult> = buckets
            .par_iter()
            .map(|bucket| render_bucket(bucket, &scene, width, height, config))
            .collect();

        let mut stats = TraceStats::default();
        for result in results {
            self.store_bucket(&result);
            stats.merge(result.stats);
        }

        log::info!(
            "Render complete in {:.2}s: {} shade evaluations, {} secondary rays",
            start.elapsed().as_secs_f32(),
            stats.shade_evaluations,
            stats.recursive_calls
        );
        stats
    }

    fn store_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (row, pixels) in result.pixels.chunks(bucket.width as usize).enumerate() {
            let start = self.pixel_offset(bucket.x, bucket.y + row as u32);
            for (k, rgb) in pixels.iter().enumerate() {
                let offset = start + k * BYTES_PER_PIXEL;
                self.buffer[offset..offset + BYTES_PER_PIXEL].copy_from_slice(rgb);
            }
        }
    }

    fn pixel_offset(&self, i: u32, j: u32) -> usize {
        (j as usize * self.width as usize + i as usize) * BYTES_PER_PIXEL
    }

    /// Write the buffer as an image, top row first.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let image = image::RgbImage::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| format!("Buffer does not match {}x{}", self.width, self.height))?;
        image::imageops::flip_vertical(&image)
            .save(path)
            .map_err(|e| format!("Unable to save '{}': {}", path.display(), e))?;

        log::info!("Saved {}", path.display());
        Ok(())
    }
}
