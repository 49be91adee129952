//! Labeled 3D objects and their bounding volumes.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::pointcloud::PointCloud;

/// Axis-aligned box enclosing an object's points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    /// Box center in the camera frame.
    pub center: Point3<f64>,
    /// Full extent along x, y, z.
    pub dims: Vector3<f64>,
}

impl BoundingVolume {
    pub fn from_cloud(cloud: &PointCloud) -> Option<Self> {
        let (lo, hi) = cloud.bounds()?;
        Some(Self {
            center: nalgebra::center(&lo, &hi),
            dims: hi - lo,
        })
    }
}

/// A labeled 3D segment: the points lifted from one accepted detection.
///
/// The cloud is never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<BoundingVolume>,
    pub cloud: PointCloud,
}

impl Object {
    /// Wrap a cloud; returns `None` for an empty cloud.
    pub fn with_label(cloud: PointCloud, label: impl Into<String>) -> Option<Self> {
        let geometry = Some(BoundingVolume::from_cloud(&cloud)?);
        Some(Self {
            label: label.into(),
            geometry,
            cloud,
        })
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.cloud.len()
    }
}
