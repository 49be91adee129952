//! Camera geometry primitives: intrinsics, lens distortion, reported properties.

mod distortion;
mod intrinsics;

pub use distortion::{RadialTangentialDistortion, UndistortConfig};
pub use intrinsics::CameraIntrinsics;

use serde::{Deserialize, Serialize};

/// Geometric properties a camera reports about itself.
///
/// Both fields are optional: a camera without intrinsics is still usable,
/// it just gets the parallel-projection fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraProperties {
    /// Pinhole intrinsics, if calibrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsics: Option<CameraIntrinsics>,
    /// Lens distortion coefficients, if calibrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distortion: Option<RadialTangentialDistortion>,
}
