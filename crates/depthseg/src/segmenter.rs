//! High-level segmentation API.
//!
//! [`DetectionSegmenter`] is the primary entry point. It wraps a 2D
//! detector and an [`AcceptancePolicy`] and turns the frames of any RGB-D
//! [`Camera`] into labeled 3D objects. Create once, segment many times.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use image::RgbaImage;

use crate::collaborators::{Camera, Dependencies, Detector};
use crate::config::{AcceptancePolicy, SegmenterConfig};
use crate::detection::Detection;
use crate::error::{DependencyKind, SegmentError};
use crate::object::Object;
use crate::pipeline::{self, FramePair};
use crate::projector::Projector;

const UNNAMED_DETECTOR: &str = "detector";

/// Turns a 2D detector into a 3D segmenter.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use depthseg::{BoxError, Detection, DetectionSegmenter};
/// use image::RgbaImage;
///
/// let detector = Arc::new(|_: &RgbaImage| -> Result<Vec<Detection>, BoxError> { Ok(vec![]) });
/// let segmenter = DetectionSegmenter::new(detector, 50, 1.25, 0.6).unwrap();
/// # let camera: &dyn depthseg::Camera = unimplemented!();
/// let objects = segmenter.segment(camera).unwrap();
/// println!("{} objects", objects.len());
/// ```
pub struct DetectionSegmenter {
    detector: Arc<dyn Detector>,
    detector_name: String,
    policy: AcceptancePolicy,
    default_camera: Option<String>,
}

impl DetectionSegmenter {
    /// Create from raw tunables.
    ///
    /// `mean_k`/`sigma` enable outlier filtering only when both are
    /// positive; a `confidence_threshold <= 0` selects the default.
    pub fn new(
        detector: Arc<dyn Detector>,
        mean_k: i64,
        sigma: f64,
        confidence_threshold: f64,
    ) -> Result<Self, SegmentError> {
        let policy = AcceptancePolicy::new(confidence_threshold, mean_k, sigma)?;
        Ok(Self::with_policy(detector, UNNAMED_DETECTOR, policy))
    }

    /// Create with an already normalized policy.
    pub fn with_policy(
        detector: Arc<dyn Detector>,
        detector_name: impl Into<String>,
        policy: AcceptancePolicy,
    ) -> Self {
        Self {
            detector,
            detector_name: detector_name.into(),
            policy,
            default_camera: None,
        }
    }

    /// Build from configuration, resolving collaborators by name.
    ///
    /// Fails if the configuration is invalid, the detector cannot be
    /// resolved, or a configured default camera cannot be resolved.
    pub fn from_config(config: &SegmenterConfig, deps: &Dependencies) -> Result<Self, SegmentError> {
        let validation = config.validate()?;
        for warning in &validation.warnings {
            tracing::warn!("{}", warning);
        }

        let detector = deps.detector(&config.detector_name)?;
        let policy = config.policy()?;
        let mut segmenter = Self::with_policy(detector, config.detector_name.clone(), policy);

        if let Some(camera) = config.default_camera() {
            deps.camera(camera)?;
            segmenter.default_camera = Some(camera.to_string());
        }

        tracing::info!(
            "segmenter ready: detector={:?}, confidence>={:.3}, filter={:?}, camera={:?}",
            segmenter.detector_name,
            policy.confidence_threshold,
            policy.filter,
            segmenter.default_camera
        );
        Ok(segmenter)
    }

    pub fn policy(&self) -> &AcceptancePolicy {
        &self.policy
    }

    pub fn detector_name(&self) -> &str {
        &self.detector_name
    }

    pub fn default_camera(&self) -> Option<&str> {
        self.default_camera.as_deref()
    }

    /// Run the wrapped detector on an image.
    pub fn detections(&self, image: &RgbaImage) -> Result<Vec<Detection>, SegmentError> {
        self.detector
            .detect(image)
            .map_err(|source| SegmentError::Detector {
                detector: self.detector_name.clone(),
                source,
            })
    }

    /// Segment the current frames of `camera` into objects.
    pub fn segment(&self, camera: &dyn Camera) -> Result<Vec<Object>, SegmentError> {
        self.segment_impl(camera, None)
    }

    /// Like [`segment`](Self::segment), aborting with
    /// [`SegmentError::Cancelled`] once `cancel` is raised during filtering.
    pub fn segment_with_cancel(
        &self,
        camera: &dyn Camera,
        cancel: &AtomicBool,
    ) -> Result<Vec<Object>, SegmentError> {
        self.segment_impl(camera, Some(cancel))
    }

    /// Resolve a camera by name and segment its frames.
    ///
    /// An empty `camera_name` selects the configured default camera.
    pub fn object_point_clouds(
        &self,
        camera_name: &str,
        deps: &Dependencies,
    ) -> Result<Vec<Object>, SegmentError> {
        let name = match (camera_name, self.default_camera.as_deref()) {
            ("", Some(default)) => default,
            (name, _) => name,
        };
        if name.is_empty() {
            return Err(SegmentError::Dependency {
                kind: DependencyKind::Camera,
                name: String::new(),
            });
        }
        let camera = deps.camera(name)?;
        self.segment(camera.as_ref())
    }

    fn segment_impl(
        &self,
        camera: &dyn Camera,
        cancel: Option<&AtomicBool>,
    ) -> Result<Vec<Object>, SegmentError> {
        let cam_name = camera.name();
        let images = camera.images().map_err(|source| SegmentError::Camera {
            camera: cam_name.to_string(),
            source,
        })?;
        tracing::debug!("camera {:?} returned {} frames", cam_name, images.len());
        let frames = FramePair::from_named_images(cam_name, images)?;

        let properties = camera.properties().map_err(|e| {
            SegmentError::config(
                "camera_properties",
                format!("properties unavailable for camera \"{}\": {}", cam_name, e),
            )
        })?;
        let projector = Projector::from_properties(Some(&properties))?;

        // the detector may modify its input; projection samples the original
        let scratch = frames.color.clone();
        let detections = self.detections(&scratch)?;
        tracing::debug!("detector returned {} detections", detections.len());

        pipeline::run(&frames, &detections, &projector, &self.policy, cancel)
    }
}
