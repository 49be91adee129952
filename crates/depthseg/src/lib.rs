//! depthseg: lift 2D object detections into labeled 3D point clouds.
//!
//! Given an RGB-D camera and a 2D object detector, every sufficiently
//! confident detection becomes an [`Object`]: the colored points behind its
//! bounding box, cleaned of statistical outliers. The pipeline stages are:
//!
//! 1. **Frames** – fetch the camera's `"color"` and `"depth"` frames.
//! 2. **Projector** – derive a pinhole (optionally distorted) or parallel
//!    projection model from the camera's reported properties.
//! 3. **Detect** – run the external detector on the color frame.
//! 4. **Gate** – drop detections below the confidence threshold.
//! 5. **Back-project** – lift each box's valid depth pixels into 3D.
//! 6. **Filter** – optional statistical outlier removal per object.
//! 7. **Package** – wrap non-empty clouds as labeled objects.
//!
//! # Public API
//! - [`DetectionSegmenter`] and [`SegmenterConfig`] as primary entry points
//! - [`Detector`] / [`Camera`] collaborator traits and the [`Dependencies`] registry
//! - geometry building blocks: [`Projector`], [`StatisticalOutlierFilter`], [`PointCloud`]

mod collaborators;
mod config;
mod detection;
mod error;
mod object;
mod outlier;
mod pipeline;
mod pixelmap;
mod pointcloud;
mod projector;
mod segmenter;
#[cfg(test)]
mod test_utils;

pub use collaborators::{Camera, Dependencies, Detector, NamedImage};
pub use config::{AcceptancePolicy, ConfigValidation, SegmenterConfig, DEFAULT_CONFIDENCE_THRESHOLD};
pub use detection::{BoundingBox, Detection};
pub use error::{BoxError, DependencyKind, GeometryError, Modality, SegmentError};
pub use object::{BoundingVolume, Object};
pub use outlier::{
    mean_neighbor_distances, BruteForceNeighbors, FilterPolicy, NeighborSearch,
    StatisticalOutlierFilter,
};
pub use pixelmap::{CameraIntrinsics, CameraProperties, RadialTangentialDistortion, UndistortConfig};
pub use pointcloud::{CloudPoint, PointCloud, Rgba};
pub use projector::{DepthMap, PinholeModel, Projector};
pub use segmenter::DetectionSegmenter;
