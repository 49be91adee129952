#![allow(dead_code)]

use std::sync::Arc;

use depthseg::{
    BoundingBox, BoxError, Camera, CameraProperties, DepthMap, Detection, Detector, NamedImage,
};
use image::{Luma, Rgba, RgbaImage};

/// `(x, y, depth)` of the populated cells in [`scene`].
pub const CELLS: [(u32, u32, u16); 6] = [
    (0, 0, 5),
    (0, 100, 6),
    (50, 0, 8),
    (50, 100, 4),
    (15, 15, 3),
    (16, 14, 10),
];

/// 150x150 red color frame and a depth map with [`CELLS`] set.
pub fn scene() -> (RgbaImage, DepthMap) {
    let color = RgbaImage::from_pixel(150, 150, Rgba([255, 0, 0, 255]));
    let mut depth = DepthMap::new(150, 150);
    for &(x, y, d) in &CELLS {
        depth.put_pixel(x, y, Luma([d]));
    }
    (color, depth)
}

pub enum Frames {
    Scene,
    Fail(&'static str),
}

pub struct TestCamera {
    pub frames: Frames,
    pub properties: CameraProperties,
}

impl TestCamera {
    pub fn scene() -> Self {
        Self {
            frames: Frames::Scene,
            properties: CameraProperties::default(),
        }
    }

    pub fn failing(msg: &'static str) -> Self {
        Self {
            frames: Frames::Fail(msg),
            properties: CameraProperties::default(),
        }
    }
}

impl Camera for TestCamera {
    fn name(&self) -> &str {
        "fakeCamera"
    }

    fn images(&self) -> Result<Vec<NamedImage>, BoxError> {
        match self.frames {
            Frames::Scene => {
                let (color, depth) = scene();
                Ok(vec![
                    NamedImage::new("color", color),
                    NamedImage::new("depth", depth),
                ])
            }
            Frames::Fail(msg) => Err(msg.into()),
        }
    }

    fn properties(&self) -> Result<CameraProperties, BoxError> {
        Ok(self.properties)
    }
}

/// Detector that always reports the given detections.
pub fn fixed_detector(detections: Vec<Detection>) -> Arc<dyn Detector> {
    Arc::new(move |_: &RgbaImage| -> Result<Vec<Detection>, BoxError> { Ok(detections.clone()) })
}

pub fn whole_frame() -> BoundingBox {
    BoundingBox::new(0, 0, 150, 150)
}
