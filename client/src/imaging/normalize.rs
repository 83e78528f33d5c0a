use std::io::Cursor;

use image::ImageReader;
use image::codecs::jpeg::JpegEncoder;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to encode image: {0}")]
    Encode(String),
}

/// Display-only metadata; downstream stages never branch on it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub mode: String,
    pub format: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub info: ImageInfo,
}

/// Re-encodes to JPEG at the configured quality. An alpha channel is
/// dropped, not blended against a background: lossy.
pub fn normalize(bytes: &[u8], jpeg_quality: u8) -> Result<NormalizedImage, NormalizeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| NormalizeError::Decode(e.to_string()))?;
    let format = reader.format().map(|f| format!("{:?}", f));

    let decoded = reader
        .decode()
        .map_err(|e| NormalizeError::Decode(e.to_string()))?;
    let mode = format!("{:?}", decoded.color());

    let rgb = decoded.to_rgb8();
    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut encoded, jpeg_quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| NormalizeError::Encode(e.to_string()))?;

    Ok(NormalizedImage {
        bytes: encoded,
        info: ImageInfo {
            width: rgb.width(),
            height: rgb.height(),
            mode,
            format,
        },
    })
}
