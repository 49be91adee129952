//! Scriptable collaborators and fixtures for unit tests.

use image::{Luma, RgbaImage};

use crate::collaborators::{Camera, Detector, NamedImage};
use crate::detection::{BoundingBox, Detection};
use crate::error::BoxError;
use crate::pixelmap::CameraProperties;
use crate::projector::DepthMap;

/// Depth cells `(x, y, depth)` of the reference scene.
pub(crate) const SCENE_CELLS: [(u32, u32, u16); 6] = [
    (0, 0, 5),
    (0, 100, 6),
    (50, 0, 8),
    (50, 100, 4),
    (15, 15, 3),
    (16, 14, 10),
];

/// 150x150 red frame with six populated depth cells.
pub(crate) fn scene_frames() -> (RgbaImage, DepthMap) {
    let color = RgbaImage::from_pixel(150, 150, image::Rgba([255, 0, 0, 255]));
    let mut depth = DepthMap::new(150, 150);
    for &(x, y, d) in &SCENE_CELLS {
        depth.put_pixel(x, y, Luma([d]));
    }
    (color, depth)
}

pub(crate) struct FakeCamera {
    pub frames: Option<Vec<NamedImage>>,
    pub properties: Option<CameraProperties>,
}

impl FakeCamera {
    /// Camera serving [`scene_frames`] without intrinsics.
    pub fn scene() -> Self {
        let (color, depth) = scene_frames();
        Self {
            frames: Some(vec![
                NamedImage::new("color", color),
                NamedImage::new("depth", depth),
            ]),
            properties: Some(CameraProperties::default()),
        }
    }
}

impl Camera for FakeCamera {
    fn name(&self) -> &str {
        "fakeCamera"
    }

    fn images(&self) -> Result<Vec<NamedImage>, BoxError> {
        self.frames.clone().ok_or_else(|| "no images".into())
    }

    fn properties(&self) -> Result<CameraProperties, BoxError> {
        self.properties.ok_or_else(|| "no properties".into())
    }
}

pub(crate) struct FakeDetector {
    pub detections: Option<Vec<Detection>>,
}

impl FakeDetector {
    pub fn single(bbox: BoundingBox, score: f64, label: &str) -> Self {
        Self {
            detections: Some(vec![Detection::new(bbox, score, label)]),
        }
    }

    pub fn failing() -> Self {
        Self { detections: None }
    }
}

impl Detector for FakeDetector {
    fn detect(&self, _image: &RgbaImage) -> Result<Vec<Detection>, BoxError> {
        self.detections.clone().ok_or_else(|| "detector exploded".into())
    }
}
