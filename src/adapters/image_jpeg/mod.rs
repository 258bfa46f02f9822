// JPEG image adapter - Thumbnail scaling and encoding using the image crate

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Image encoder backed by the `image` crate
#[derive(Debug, Default)]
pub struct JpegImageAdapter;

impl JpegImageAdapter {
    pub fn new() -> Self {
        Self
    }

    fn to_image(frame: &RawFrame) -> Result<RgbImage, DomainError> {
        RgbImage::from_raw(frame.width, frame.height, frame.pixels.clone()).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "Frame buffer does not match {}x{} RGB",
                frame.width, frame.height
            ))
        })
    }
}

impl ImageEncoderPort for JpegImageAdapter {
    fn scale(&self, frame: &RawFrame, width: u32, height: u32) -> Result<RawFrame, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::InvalidArgument(format!(
                "Cannot scale to {}x{}",
                width, height
            )));
        }
        if frame.width == width && frame.height == height {
            return Ok(frame.clone());
        }

        let image = Self::to_image(frame)?;
        let resized = imageops::resize(&image, width, height, FilterType::Triangle);
        RawFrame::new(width, height, resized.into_raw())
    }

    fn encode_jpeg(&self, frame: &RawFrame, quality: u8) -> Result<Vec<u8>, DomainError> {
        let image = Self::to_image(frame)?;
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode_image(&image)
            .map_err(|e| DomainError::EngineFailure(format!("JPEG encoding failed: {}", e)))?;
        Ok(bytes)
    }
}
