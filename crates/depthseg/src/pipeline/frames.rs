//! Pairing of the color and depth frames returned by a camera.

use image::{DynamicImage, ImageBuffer, Luma, RgbaImage};

use crate::collaborators::NamedImage;
use crate::error::{Modality, SegmentError};
use crate::projector::DepthMap;

/// Color frame plus the depth map registered to it.
#[derive(Debug, Clone)]
pub(crate) struct FramePair {
    pub color: RgbaImage,
    pub depth: DepthMap,
}

impl FramePair {
    /// Pick the `"color"` and `"depth"` frames out of a camera response.
    ///
    /// When a tag appears more than once the last frame wins.
    pub fn from_named_images(camera: &str, images: Vec<NamedImage>) -> Result<Self, SegmentError> {
        let mut color = None;
        let mut depth = None;
        for named in images {
            if named.source_name == Modality::Color.tag() {
                color = Some(named.image);
            } else if named.source_name == Modality::Depth.tag() {
                depth = Some(named.image);
            }
        }

        let missing = |modality| SegmentError::MissingModality {
            camera: camera.to_string(),
            modality,
            detail: None,
        };
        let color = color.ok_or_else(|| missing(Modality::Color))?;
        let depth = depth.ok_or_else(|| missing(Modality::Depth))?;

        Ok(Self {
            color: color.to_rgba8(),
            depth: to_depth_map(camera, depth)?,
        })
    }
}

/// 16-bit gray is taken as-is; 8-bit gray is widened without rescaling.
fn to_depth_map(camera: &str, image: DynamicImage) -> Result<DepthMap, SegmentError> {
    match image {
        DynamicImage::ImageLuma16(buf) => Ok(buf),
        DynamicImage::ImageLuma8(buf) => {
            let (w, h) = buf.dimensions();
            Ok(ImageBuffer::from_fn(w, h, |x, y| {
                Luma([buf.get_pixel(x, y)[0] as u16])
            }))
        }
        other => Err(SegmentError::MissingModality {
            camera: camera.to_string(),
            modality: Modality::Depth,
            detail: Some(format!(
                "expected a single-channel depth image, got {:?}",
                other.color()
            )),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn pairs_color_and_depth() {
        let mut depth = DepthMap::new(4, 3);
        depth.put_pixel(1, 2, Luma([700]));
        let images = vec![
            NamedImage::new("ir", GrayImage::new(4, 3)),
            NamedImage::new("depth", depth),
            NamedImage::new("color", RgbaImage::new(4, 3)),
        ];
        let pair = FramePair::from_named_images("cam", images).unwrap();
        assert_eq!(pair.color.dimensions(), (4, 3));
        assert_eq!(pair.depth.get_pixel(1, 2)[0], 700);
    }

    #[test]
    fn missing_depth_is_reported() {
        let images = vec![NamedImage::new("color", RgbaImage::new(4, 3))];
        let err = FramePair::from_named_images("cam", images).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::MissingModality {
                modality: Modality::Depth,
                detail: None,
                ..
            }
        ));
    }

    #[test]
    fn eight_bit_depth_is_widened() {
        let mut gray = GrayImage::new(2, 2);
        gray.put_pixel(0, 1, Luma([200]));
        let images = vec![
            NamedImage::new("color", RgbaImage::new(2, 2)),
            NamedImage::new("depth", gray),
        ];
        let pair = FramePair::from_named_images("cam", images).unwrap();
        assert_eq!(pair.depth.get_pixel(0, 1)[0], 200);
    }

    #[test]
    fn color_depth_frame_is_rejected() {
        let images = vec![
            NamedImage::new("color", RgbaImage::new(2, 2)),
            NamedImage::new("depth", RgbaImage::new(2, 2)),
        ];
        let err = FramePair::from_named_images("cam", images).unwrap_err();
        assert!(matches!(
            err,
            SegmentError::MissingModality {
                modality: Modality::Depth,
                detail: Some(_),
                ..
            }
        ));
    }
}
