use crate::{EncodedImage, RgbaFrame};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Anything that can hand out the frame currently on screen.
pub trait FrameSource {
    fn current_frame(&self) -> Option<&RgbaFrame>;
}

/// Snapshots the displayed frame as a JPEG at native resolution.
#[derive(Debug, Clone, Copy)]
pub struct FrameCapturer {
    quality: u8,
}

impl Default for FrameCapturer {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl FrameCapturer {
    /// `None` when nothing has been decoded yet or the frame has no pixels.
    pub fn capture(&self, source: &dyn FrameSource) -> Option<EncodedImage> {
        let Some(frame) = source.current_frame() else {
            debug!("capture skipped: no frame displayed");
            return None;
        };
        if !frame.is_valid() {
            debug!(
                "capture skipped: {}x{} frame with {} bytes",
                frame.width,
                frame.height,
                frame.data.len()
            );
            return None;
        }
        match encode_jpeg(frame, self.quality) {
            Ok(bytes) => Some(EncodedImage::from_bytes("image/jpeg", &bytes)),
            Err(e) => {
                debug!("capture failed: {e}");
                None
            }
        }
    }
}

pub fn encode_jpeg(frame: &RgbaFrame, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or_else(
        || {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        },
    )?;
    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode_image(&rgb)?;
    Ok(out)
}
