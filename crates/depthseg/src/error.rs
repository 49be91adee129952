//! Error taxonomy shared by every stage of the segmenter.

use std::fmt;

/// Boxed error returned by external collaborators (detectors, cameras).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Kind of named collaborator looked up in [`crate::Dependencies`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// A 2D object detector.
    Detector,
    /// An RGB-D camera.
    Camera,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detector => f.write_str("detector"),
            Self::Camera => f.write_str("camera"),
        }
    }
}

/// Image modality a camera is expected to deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// RGB(A) color frame, tagged `"color"`.
    Color,
    /// Single-channel depth frame, tagged `"depth"`.
    Depth,
}

impl Modality {
    /// Source tag used by cameras for this modality.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Depth => "depth",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Failures of the back-projection geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The detection carried no bounding box.
    MissingBoundingBox,
    /// The bounding box has zero (or negative) area.
    DegenerateBoundingBox {
        /// Box as `[x_min, y_min, x_max, y_max]`.
        bounds: [i32; 4],
    },
    /// Color image and depth map differ in size.
    DimensionMismatch {
        /// Color image `[width, height]`.
        color: [u32; 2],
        /// Depth map `[width, height]`.
        depth: [u32; 2],
    },
    /// No camera model was available for projection.
    UnsetCameraModel,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBoundingBox => f.write_str("detection bounding box cannot be empty"),
            Self::DegenerateBoundingBox { bounds } => write!(
                f,
                "degenerate bounding box [{}, {}, {}, {}] has zero area",
                bounds[0], bounds[1], bounds[2], bounds[3]
            ),
            Self::DimensionMismatch { color, depth } => write!(
                f,
                "color image ({}x{}) and depth map ({}x{}) must have the same size",
                color[0], color[1], depth[0], depth[1]
            ),
            Self::UnsetCameraModel => f.write_str("camera model is not set"),
        }
    }
}

/// Errors produced while constructing or running a segmenter.
#[derive(Debug)]
pub enum SegmentError {
    /// A tunable or the camera properties are missing or invalid.
    Configuration {
        /// Name of the offending parameter.
        parameter: String,
        /// What is wrong with it.
        reason: String,
    },
    /// A named collaborator could not be resolved.
    Dependency {
        /// What was being looked up.
        kind: DependencyKind,
        /// Requested name.
        name: String,
    },
    /// The wrapped detector failed.
    Detector {
        /// Detector name.
        detector: String,
        /// Error reported by the detector.
        source: BoxError,
    },
    /// The camera failed to deliver frames.
    Camera {
        /// Camera name.
        camera: String,
        /// Error reported by the camera.
        source: BoxError,
    },
    /// The camera frames did not include a required modality.
    MissingModality {
        /// Camera name.
        camera: String,
        /// Which modality is missing or unusable.
        modality: Modality,
        /// Additional detail when the frame was present but unusable.
        detail: Option<String>,
    },
    /// Back-projection failed for a detection.
    Geometry(GeometryError),
    /// A cooperative cancellation flag was raised mid-computation.
    Cancelled,
}

impl SegmentError {
    pub(crate) fn config(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { parameter, reason } => {
                write!(f, "invalid configuration for `{}`: {}", parameter, reason)
            }
            Self::Dependency {
                kind: DependencyKind::Detector,
                name,
            } => write!(
                f,
                "could not find necessary dependency, detector \"{}\"",
                name
            ),
            Self::Dependency { kind, name } => write!(f, "could not find {} \"{}\"", kind, name),
            Self::Detector { detector, source } => {
                write!(f, "detector \"{}\" failed: {}", detector, source)
            }
            Self::Camera { camera, source } => {
                write!(f, "camera \"{}\" failed to return images: {}", camera, source)
            }
            Self::MissingModality {
                camera,
                modality,
                detail: None,
            } => write!(
                f,
                "camera \"{}\" did not return a '{}' image; both 'color' and 'depth' are required",
                camera, modality
            ),
            Self::MissingModality {
                camera,
                modality,
                detail: Some(detail),
            } => write!(
                f,
                "camera \"{}\" returned an unusable '{}' image: {}",
                camera, modality, detail
            ),
            Self::Geometry(e) => write!(f, "geometry error: {}", e),
            Self::Cancelled => f.write_str("operation cancelled"),
        }
    }
}

impl std::error::Error for SegmentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Detector { source, .. } | Self::Camera { source, .. } => Some(source.as_ref()),
            Self::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for GeometryError {}

impl From<GeometryError> for SegmentError {
    fn from(e: GeometryError) -> Self {
        Self::Geometry(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn dependency_messages_name_the_collaborator() {
        let det = SegmentError::Dependency {
            kind: DependencyKind::Detector,
            name: "noDetector".into(),
        };
        assert!(det
            .to_string()
            .contains("could not find necessary dependency"));
        assert!(det.to_string().contains("\"noDetector\""));

        let cam = SegmentError::Dependency {
            kind: DependencyKind::Camera,
            name: "not-camera".into(),
        };
        assert_eq!(cam.to_string(), "could not find camera \"not-camera\"");
    }

    #[test]
    fn detector_error_exposes_source() {
        let err = SegmentError::Detector {
            detector: "yolo".into(),
            source: "model not loaded".into(),
        };
        assert!(err.to_string().contains("model not loaded"));
        assert_eq!(err.source().unwrap().to_string(), "model not loaded");
    }

    #[test]
    fn geometry_error_converts() {
        let err: SegmentError = GeometryError::MissingBoundingBox.into();
        assert!(matches!(
            err,
            SegmentError::Geometry(GeometryError::MissingBoundingBox)
        ));
    }
}
