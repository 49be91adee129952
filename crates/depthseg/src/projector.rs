//! Back-projection of RGB-D pixels into 3D.
//!
//! A [`Projector`] is derived once from the properties a camera reports and
//! then lifts any rectangular region of a color + depth frame pair into a
//! colored [`PointCloud`].

use image::{ImageBuffer, Luma, RgbaImage};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::detection::BoundingBox;
use crate::error::{GeometryError, SegmentError};
use crate::pixelmap::{
    CameraIntrinsics, CameraProperties, RadialTangentialDistortion, UndistortConfig,
};
use crate::pointcloud::PointCloud;

/// Single-channel depth frame; zero means "no reading".
pub type DepthMap = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Largest pixel error tolerated when re-distorting an undistorted point.
const MAX_REPROJECTION_ERROR_PX: f64 = 1e-3;

/// Pinhole model with optional lens distortion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinholeModel {
    pub intrinsics: CameraIntrinsics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distortion: Option<RadialTangentialDistortion>,
    /// Settings for the iterative distortion inverse.
    #[serde(default)]
    pub undistort: UndistortConfig,
}

impl PinholeModel {
    /// Lift pixel `(u, v)` at depth `d` into the camera frame.
    fn back_project(&self, u: f64, v: f64, d: f64) -> Option<Point3<f64>> {
        let k = self.intrinsics;
        match self.distortion.filter(|dist| !dist.is_identity()) {
            None => Some(Point3::new(
                (u - k.cx) * d / k.fx,
                (v - k.cy) * d / k.fy,
                d,
            )),
            Some(dist) => {
                let xd = k.pixel_to_normalized([u, v])?;
                let xn = dist.undistort_normalized(xd, self.undistort)?;
                // reject iterations that stopped before converging
                let [ru, rv] = k.normalized_to_pixel(dist.distort_normalized(xn));
                if (ru - u).hypot(rv - v) > MAX_REPROJECTION_ERROR_PX {
                    return None;
                }
                Some(Point3::new(xn[0] * d, xn[1] * d, d))
            }
        }
    }
}

/// Camera projection model used for back-projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projector {
    /// Calibrated pinhole camera.
    Pinhole(PinholeModel),
    /// Identity mapping: `x = u`, `y = v`, `z = depth`. Used when the camera
    /// reports no intrinsics.
    ParallelProjection,
}

impl Projector {
    /// Derive the projector for a camera's reported properties.
    ///
    /// Missing properties are a configuration error; missing intrinsics are
    /// not, they select [`Projector::ParallelProjection`].
    pub fn from_properties(properties: Option<&CameraProperties>) -> Result<Self, SegmentError> {
        let props = properties.ok_or_else(|| {
            SegmentError::config("camera_properties", "camera properties are required")
        })?;
        let Some(intrinsics) = props.intrinsics else {
            return Ok(Self::ParallelProjection);
        };
        if !intrinsics.is_valid() {
            return Err(SegmentError::config(
                "camera_properties.intrinsics",
                "fx/fy must be finite and non-zero",
            ));
        }
        Ok(Self::Pinhole(PinholeModel {
            intrinsics,
            distortion: props.distortion,
            undistort: UndistortConfig::default(),
        }))
    }

    /// Back-project the pixels of `bbox` into a colored point cloud.
    ///
    /// The box is clamped to the image; pixels with zero depth are skipped,
    /// so the result holds at most `bbox.area()` points and may be empty.
    pub fn project(
        &self,
        color: &RgbaImage,
        depth: &DepthMap,
        bbox: &BoundingBox,
    ) -> Result<PointCloud, SegmentError> {
        if color.dimensions() != depth.dimensions() {
            let (cw, ch) = color.dimensions();
            let (dw, dh) = depth.dimensions();
            return Err(GeometryError::DimensionMismatch {
                color: [cw, ch],
                depth: [dw, dh],
            }
            .into());
        }
        if bbox.is_degenerate() {
            return Err(GeometryError::DegenerateBoundingBox {
                bounds: bbox.as_array(),
            }
            .into());
        }

        let (w, h) = depth.dimensions();
        if let Self::Pinhole(model) = self {
            if !model.intrinsics.matches_resolution(w, h) {
                tracing::debug!(
                    "intrinsics calibrated for {}x{}, projecting a {}x{} frame",
                    model.intrinsics.width,
                    model.intrinsics.height,
                    w,
                    h
                );
            }
        }

        let (xs, ys) = bbox.clamp_to(w, h);
        let mut cloud = PointCloud::with_capacity(xs.len() * ys.len());
        let mut n_skipped = 0usize;
        for v in ys {
            for u in xs.clone() {
                let d = depth.get_pixel(u, v)[0];
                if d == 0 {
                    continue;
                }
                let position = match self {
                    Self::ParallelProjection => Some(Point3::new(u as f64, v as f64, d as f64)),
                    Self::Pinhole(model) => model.back_project(u as f64, v as f64, d as f64),
                };
                match position {
                    Some(p) => cloud.set(p, Some(color.get_pixel(u, v).0)),
                    None => n_skipped += 1,
                }
            }
        }

        if n_skipped > 0 {
            tracing::trace!("{} pixels could not be undistorted", n_skipped);
        }
        Ok(cloud)
    }
}
