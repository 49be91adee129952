//! 2D detections as produced by an external detector.

use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle, half-open: `[x_min, x_max) x [y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> i64 {
        (self.x_max as i64 - self.x_min as i64).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.y_max as i64 - self.y_min as i64).max(0)
    }

    /// Pixel area; zero for degenerate boxes, saturating for boxes spanning
    /// the whole `i32` range.
    pub fn area(&self) -> i64 {
        self.width().saturating_mul(self.height())
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersect with the image rectangle `[0, width) x [0, height)`.
    ///
    /// Returns pixel ranges `(x0..x1, y0..y1)`; either may be empty when the
    /// box lies entirely outside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> (std::ops::Range<u32>, std::ops::Range<u32>) {
        let clamp = |v: i32, hi: u32| -> u32 { (v.max(0) as u32).min(hi) };
        let x0 = clamp(self.x_min, width);
        let x1 = clamp(self.x_max, width).max(x0);
        let y0 = clamp(self.y_min, height);
        let y1 = clamp(self.y_max, height).max(y0);
        (x0..x1, y0..y1)
    }

    pub fn as_array(&self) -> [i32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }
}

/// A labeled, scored 2D detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Region in image pixel coordinates. Detectors may omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Confidence in [0, 1].
    pub score: f64,
    pub label: String,
}

impl Detection {
    pub fn new(bounding_box: BoundingBox, score: f64, label: impl Into<String>) -> Self {
        Self {
            bounding_box: Some(bounding_box),
            score,
            label: label.into(),
        }
    }
}
