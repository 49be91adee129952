//! Segmenter configuration and the acceptance policy derived from it.

use serde::{Deserialize, Serialize};

use crate::detection::Detection;
use crate::error::SegmentError;
use crate::outlier::FilterPolicy;

/// Confidence threshold used when none (or a non-positive one) is configured.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// User-facing configuration of a [`crate::DetectionSegmenter`].
///
/// Keys match the JSON attributes of the service:
///
/// ```json
/// {
///   "detector_name": "my-detector",
///   "confidence_threshold_pct": 0.6,
///   "mean_k": 50,
///   "sigma": 1.25,
///   "camera_name": "rgbd-cam"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Name of the detector dependency (required).
    pub detector_name: String,
    /// Minimum detection score in (0, 1]; `<= 0` means "use the default".
    #[serde(rename = "confidence_threshold_pct")]
    pub confidence_threshold: f64,
    /// Outlier filter neighbor window.
    pub mean_k: i64,
    /// Outlier filter standard-deviation multiplier.
    pub sigma: f64,
    /// Optional default camera dependency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera_name: Option<String>,
}

/// Outcome of [`SegmenterConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigValidation {
    /// Names of the collaborators the segmenter needs, camera first.
    pub dependencies: Vec<String>,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl SegmenterConfig {
    pub fn new(detector_name: impl Into<String>) -> Self {
        Self {
            detector_name: detector_name.into(),
            ..Default::default()
        }
    }

    /// Default camera name, treating an empty string as unset.
    pub fn default_camera(&self) -> Option<&str> {
        self.camera_name.as_deref().filter(|s| !s.is_empty())
    }

    /// Check the configuration without resolving any dependency.
    pub fn validate(&self) -> Result<ConfigValidation, SegmentError> {
        let mut out = ConfigValidation::default();
        if let Some(camera) = self.default_camera() {
            out.dependencies.push(camera.to_string());
        }
        if self.detector_name.is_empty() {
            return Err(SegmentError::config(
                "detector_name",
                "expected a detector to be specified",
            ));
        }
        out.dependencies.push(self.detector_name.clone());

        let policy = self.policy()?;
        if !policy.filter.is_enabled() && (self.mean_k > 0 || self.sigma > 0.0) {
            out.warnings.push(format!(
                "outlier filter disabled: mean_k ({}) and sigma ({}) must both be positive",
                self.mean_k, self.sigma
            ));
        }
        Ok(out)
    }

    /// Normalized acceptance policy.
    pub fn policy(&self) -> Result<AcceptancePolicy, SegmentError> {
        AcceptancePolicy::new(self.confidence_threshold, self.mean_k, self.sigma)
    }
}

/// Which detections become objects, and how their clouds are cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePolicy {
    /// Detections scoring below this are dropped.
    pub confidence_threshold: f64,
    pub filter: FilterPolicy,
}

impl Default for AcceptancePolicy {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            filter: FilterPolicy::Disabled,
        }
    }
}

impl AcceptancePolicy {
    /// Build from raw tunables.
    ///
    /// A threshold `<= 0` is treated as unset and replaced by
    /// [`DEFAULT_CONFIDENCE_THRESHOLD`]; above 1 (or NaN) is an error. The
    /// filter is enabled only when both `mean_k` and `sigma` are positive.
    pub fn new(confidence_threshold: f64, mean_k: i64, sigma: f64) -> Result<Self, SegmentError> {
        if confidence_threshold.is_nan() || confidence_threshold > 1.0 {
            return Err(SegmentError::config(
                "confidence_threshold_pct",
                format!("must be in (0, 1], got {}", confidence_threshold),
            ));
        }
        let confidence_threshold = if confidence_threshold > 0.0 {
            confidence_threshold
        } else {
            DEFAULT_CONFIDENCE_THRESHOLD
        };
        Ok(Self {
            confidence_threshold,
            filter: FilterPolicy::from_params(mean_k, sigma),
        })
    }

    pub fn accepts(&self, detection: &Detection) -> bool {
        detection.score >= self.confidence_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::BoundingBox;

    #[test]
    fn keys_match_service_attributes() {
        let cfg: SegmenterConfig = serde_json::from_str(
            r#"{"detector_name":"det","confidence_threshold_pct":0.7,"mean_k":3,"sigma":1.5,"camera_name":"cam"}"#,
        )
        .unwrap();
        assert_eq!(cfg.detector_name, "det");
        assert_eq!(cfg.confidence_threshold, 0.7);
        assert_eq!(cfg.mean_k, 3);
        assert_eq!(cfg.sigma, 1.5);
        assert_eq!(cfg.default_camera(), Some("cam"));

        let minimal: SegmenterConfig = serde_json::from_str(r#"{"detector_name":"det"}"#).unwrap();
        assert_eq!(minimal, SegmenterConfig::new("det"));
    }

    #[test]
    fn validate_lists_dependencies_camera_first() {
        let cfg = SegmenterConfig {
            camera_name: Some("cam".into()),
            ..SegmenterConfig::new("det")
        };
        let v = cfg.validate().unwrap();
        assert_eq!(v.dependencies, vec!["cam".to_string(), "det".to_string()]);
        assert!(v.warnings.is_empty());
    }

    #[test]
    fn validate_rejects_empty_detector_name() {
        let err = SegmenterConfig::default().validate().unwrap_err();
        match err {
            SegmentError::Configuration { parameter, .. } => assert_eq!(parameter, "detector_name"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn half_configured_filter_warns_but_passes() {
        let cfg = SegmenterConfig {
            mean_k: 10,
            ..SegmenterConfig::new("det")
        };
        let v = cfg.validate().unwrap();
        assert_eq!(v.warnings.len(), 1);
        assert_eq!(cfg.policy().unwrap().filter, FilterPolicy::Disabled);
    }

    #[test]
    fn threshold_defaults_and_bounds() {
        assert_eq!(
            AcceptancePolicy::new(0.0, 0, 0.0).unwrap().confidence_threshold,
            DEFAULT_CONFIDENCE_THRESHOLD
        );
        assert_eq!(
            AcceptancePolicy::new(-3.0, 0, 0.0).unwrap().confidence_threshold,
            DEFAULT_CONFIDENCE_THRESHOLD
        );
        assert_eq!(AcceptancePolicy::new(1.0, 0, 0.0).unwrap().confidence_threshold, 1.0);
        assert!(AcceptancePolicy::new(1.2, 0, 0.0).is_err());
        assert!(AcceptancePolicy::new(f64::NAN, 0, 0.0).is_err());
    }

    #[test]
    fn acceptance_is_inclusive_at_threshold() {
        let policy = AcceptancePolicy::new(0.6, 0, 0.0).unwrap();
        let bbox = BoundingBox::new(0, 0, 1, 1);
        assert!(policy.accepts(&Detection::new(bbox, 0.6, "a")));
        assert!(!policy.accepts(&Detection::new(bbox, 0.5, "b")));
    }
}
