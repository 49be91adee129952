//! Interfaces of the external capabilities the segmenter consumes.
//!
//! Detectors and cameras are opaque: this crate never implements them, it
//! only calls through these traits. [`Dependencies`] is the by-name registry
//! used to resolve them when a segmenter is built from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};

use crate::detection::Detection;
use crate::error::{BoxError, DependencyKind, SegmentError};
use crate::pixelmap::CameraProperties;

/// A 2D object detector.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &RgbaImage) -> Result<Vec<Detection>, BoxError>;
}

impl<F> Detector for F
where
    F: Fn(&RgbaImage) -> Result<Vec<Detection>, BoxError> + Send + Sync,
{
    fn detect(&self, image: &RgbaImage) -> Result<Vec<Detection>, BoxError> {
        self(image)
    }
}

/// One frame returned by a camera, tagged with its source (`"color"`, `"depth"`, ...).
#[derive(Debug, Clone)]
pub struct NamedImage {
    pub source_name: String,
    pub image: DynamicImage,
}

impl NamedImage {
    pub fn new(source_name: impl Into<String>, image: impl Into<DynamicImage>) -> Self {
        Self {
            source_name: source_name.into(),
            image: image.into(),
        }
    }
}

/// An RGB-D camera.
pub trait Camera: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Fetch the current set of frames.
    fn images(&self) -> Result<Vec<NamedImage>, BoxError>;

    /// Report intrinsics/distortion, if known.
    fn properties(&self) -> Result<CameraProperties, BoxError>;
}

/// Named collaborators available to a segmenter at construction time.
#[derive(Default, Clone)]
pub struct Dependencies {
    detectors: HashMap<String, Arc<dyn Detector>>,
    cameras: HashMap<String, Arc<dyn Camera>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_detector(&mut self, name: impl Into<String>, detector: Arc<dyn Detector>) {
        self.detectors.insert(name.into(), detector);
    }

    pub fn insert_camera(&mut self, name: impl Into<String>, camera: Arc<dyn Camera>) {
        self.cameras.insert(name.into(), camera);
    }

    pub fn detector(&self, name: &str) -> Result<Arc<dyn Detector>, SegmentError> {
        self.detectors
            .get(name)
            .cloned()
            .ok_or_else(|| SegmentError::Dependency {
                kind: DependencyKind::Detector,
                name: name.to_string(),
            })
    }

    pub fn camera(&self, name: &str) -> Result<Arc<dyn Camera>, SegmentError> {
        self.cameras
            .get(name)
            .cloned()
            .ok_or_else(|| SegmentError::Dependency {
                kind: DependencyKind::Camera,
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut detectors: Vec<&String> = self.detectors.keys().collect();
        let mut cameras: Vec<&String> = self.cameras.keys().collect();
        detectors.sort();
        cameras.sort();
        f.debug_struct("Dependencies")
            .field("detectors", &detectors)
            .field("cameras", &cameras)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let mut deps = Dependencies::new();
        let det: Arc<dyn Detector> = Arc::new(|_: &RgbaImage| -> Result<Vec<Detection>, BoxError> {
            Ok(Vec::new())
        });
        deps.insert_detector("det", det);

        assert!(deps.detector("det").is_ok());
        assert!(matches!(
            deps.detector("other"),
            Err(SegmentError::Dependency {
                kind: DependencyKind::Detector,
                ..
            })
        ));
        assert!(matches!(
            deps.camera("cam"),
            Err(SegmentError::Dependency {
                kind: DependencyKind::Camera,
                ..
            })
        ));
    }
}
