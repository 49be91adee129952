use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics together with the resolution they were calibrated at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in x (pixels).
    pub fx: f64,
    /// Focal length in y (pixels).
    pub fy: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
    /// Image width (pixels).
    pub width: u32,
    /// Image height (pixels).
    pub height: u32,
}

impl CameraIntrinsics {
    /// Returns `true` when focal lengths are finite and non-zero.
    pub fn is_valid(self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    /// Convert pixel coordinates to normalized pinhole coordinates.
    pub fn pixel_to_normalized(self, pixel_xy: [f64; 2]) -> Option<[f64; 2]> {
        if !self.is_valid() {
            return None;
        }
        let x = (pixel_xy[0] - self.cx) / self.fx;
        let y = (pixel_xy[1] - self.cy) / self.fy;
        if x.is_finite() && y.is_finite() {
            Some([x, y])
        } else {
            None
        }
    }

    /// Convert normalized pinhole coordinates to pixel coordinates.
    pub fn normalized_to_pixel(self, normalized_xy: [f64; 2]) -> [f64; 2] {
        [
            self.fx * normalized_xy[0] + self.cx,
            self.fy * normalized_xy[1] + self.cy,
        ]
    }

    /// Whether these intrinsics were calibrated for an image of the given size.
    pub fn matches_resolution(self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> CameraIntrinsics {
        CameraIntrinsics {
            fx: 900.0,
            fy: 920.0,
            cx: 640.0,
            cy: 480.0,
            width: 1280,
            height: 960,
        }
    }

    #[test]
    fn validation_rejects_zero_focal() {
        let k = CameraIntrinsics {
            fx: 0.0,
            ..sample()
        };
        assert!(!k.is_valid());
        assert!(k.pixel_to_normalized([100.0, 100.0]).is_none());
    }

    #[test]
    fn normalized_roundtrip() {
        let k = sample();
        let n = k.pixel_to_normalized([100.5, 700.25]).unwrap();
        let p = k.normalized_to_pixel(n);
        assert_relative_eq!(p[0], 100.5, epsilon = 1e-12);
        assert_relative_eq!(p[1], 700.25, epsilon = 1e-12);
        assert!(k.matches_resolution(1280, 960));
        assert!(!k.matches_resolution(640, 480));
    }
}
