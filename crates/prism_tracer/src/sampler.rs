//! Per-pixel sampling and byte output.

use prism_core::{Color, Scene};

use crate::tracer::{trace, TraceConfig, TraceContext};

/// Supersampling grid used when antialiasing is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleGrid {
    /// 1 sample
    #[default]
    One,
    /// 2x2 samples
    Four,
    /// 3x3 samples
    Nine,
    /// 4x4 samples
    Sixteen,
}

impl SampleGrid {
    /// Grid from its side length (1 to 4).
    pub fn from_selector(side: u32) -> Option<Self> {
        match side {
            1 => Some(SampleGrid::One),
            2 => Some(SampleGrid::Four),
            3 => Some(SampleGrid::Nine),
            4 => Some(SampleGrid::Sixteen),
            _ => None,
        }
    }

    /// Samples along each axis of a pixel.
    pub fn side(self) -> u32 {
        match self {
            SampleGrid::One => 1,
            SampleGrid::Four => 2,
            SampleGrid::Nine => 3,
            SampleGrid::Sixteen => 4,
        }
    }

    pub fn sample_count(self) -> u32 {
        self.side() * self.side()
    }
}

/// Color of pixel (i, j) in a `width` x `height` image.
///
/// Row j = 0 is the bottom of the image. With antialiasing on, an s x s
/// grid of samples starting at the pixel's lower-left corner is averaged.
pub fn pixel_color(
    scene: &Scene,
    i: u32,
    j: u32,
    width: u32,
    height: u32,
    config: &TraceConfig,
    ctx: &mut TraceContext,
) -> Color {
    let side = if config.antialiasing {
        config.sample_grid.side()
    } else {
        1
    };
    let step = 1.0 / side as f32;
    let (w, h) = (width as f32, height as f32);

    let mut sum = Color::ZERO;
    for sy in 0..side {
        for sx in 0..side {
            let x = (i as f32 + sx as f32 * step) / w;
            let y = (j as f32 + sy as f32 * step) / h;
            sum += trace(scene, x, y, config, ctx);
        }
    }

    sum / (side * side) as f32
}

/// Convert a [0, 1] color to bytes, truncating.
#[inline]
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [
        (255.0 * color.x) as u8,
        (255.0 * color.y) as u8,
        (255.0 * color.z) as u8,
    ]
}

/// Write `color` into a 3-byte pixel slot.
#[inline]
pub fn write_pixel(slot: &mut [u8], color: Color) {
    slot[..3].copy_from_slice(&color_to_rgb(color));
}
