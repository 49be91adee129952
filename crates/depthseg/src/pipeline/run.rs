//! Per-call orchestration: detections -> projection -> filtering -> objects.

use std::sync::atomic::AtomicBool;

use super::FramePair;
use crate::config::AcceptancePolicy;
use crate::detection::Detection;
use crate::error::{GeometryError, SegmentError};
use crate::object::Object;
use crate::outlier::StatisticalOutlierFilter;
use crate::pointcloud::PointCloud;
use crate::projector::Projector;

/// Lift a single detection's box into a point cloud.
pub(crate) fn detection_to_point_cloud(
    detection: &Detection,
    frames: &FramePair,
    projector: Option<&Projector>,
) -> Result<PointCloud, SegmentError> {
    let bbox = detection
        .bounding_box
        .as_ref()
        .ok_or(GeometryError::MissingBoundingBox)?;
    let projector = projector.ok_or(GeometryError::UnsetCameraModel)?;
    projector.project(&frames.color, &frames.depth, bbox)
}

fn filter_cloud(
    filter: &StatisticalOutlierFilter,
    cloud: &PointCloud,
    cancel: Option<&AtomicBool>,
) -> Result<PointCloud, SegmentError> {
    // The filtered cloud is built fresh in the camera frame (zero pose).
    match cancel {
        Some(flag) => filter.apply_with_cancel(cloud, flag),
        None => Ok(filter.apply(cloud)),
    }
}

/// Turn accepted detections into objects, in detector emission order.
///
/// Low-confidence detections and clouds that end up empty are skipped;
/// any geometry failure aborts the whole call.
pub(crate) fn run(
    frames: &FramePair,
    detections: &[Detection],
    projector: &Projector,
    policy: &AcceptancePolicy,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<Object>, SegmentError> {
    let filter = policy.filter.build();
    let mut objects = Vec::with_capacity(detections.len());
    let mut n_low_confidence = 0usize;
    let mut n_empty = 0usize;

    for (i, det) in detections.iter().enumerate() {
        if !policy.accepts(det) {
            n_low_confidence += 1;
            tracing::trace!(
                "detection {} ({}) rejected: score {:.3} < {:.3}",
                i,
                det.label,
                det.score,
                policy.confidence_threshold
            );
            continue;
        }

        let mut cloud = detection_to_point_cloud(det, frames, Some(projector))?;
        let n_projected = cloud.len();
        if let Some(filter) = &filter {
            cloud = filter_cloud(filter, &cloud, cancel)?;
        }
        tracing::debug!(
            "detection {} ({}): {} points projected, {} after filtering",
            i,
            det.label,
            n_projected,
            cloud.len()
        );

        match Object::with_label(cloud, det.label.clone()) {
            Some(obj) => objects.push(obj),
            None => n_empty += 1,
        }
    }

    tracing::info!(
        "{} objects from {} detections ({} below confidence, {} empty)",
        objects.len(),
        detections.len(),
        n_low_confidence,
        n_empty
    );
    Ok(objects)
}
