use crate::RAY_EPSILON;

/// A range of f32 values, used for ray parameters and color channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Ray parameters that count as a forward hit: (RAY_EPSILON, max).
    pub fn forward(max: f32) -> Self {
        Self::new(RAY_EPSILON, max)
    }

    /// Returns true if x is strictly within the interval (min, max) (exclusive).
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    /// Clamps x to be within the interval [min, max].
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// The unit interval, used to clamp color channels.
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };
}
