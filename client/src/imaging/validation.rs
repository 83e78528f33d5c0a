use std::io::Cursor;
use std::path::Path;

use image::ImageReader;
use thiserror::Error;

use crate::config::Config;
use crate::imaging::UploadedImage;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("file size exceeds {limit} byte limit ({declared} bytes declared)")]
    TooLarge { declared: u64, limit: u64 },
    #[error("invalid image file: {0}")]
    Undecodable(String),
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),
}

/// Read-only: later stages see the exact bytes the user provided.
pub fn validate(upload: &UploadedImage, config: &Config) -> Result<(), ValidationError> {
    if upload.declared_size > config.max_upload_bytes {
        return Err(ValidationError::TooLarge {
            declared: upload.declared_size,
            limit: config.max_upload_bytes,
        });
    }

    if let Some(name) = &upload.file_name {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !config.allowed_extensions.contains(&extension) {
            return Err(ValidationError::UnsupportedExtension(extension));
        }
    }

    // Header-only decode: confirms the codec recognizes the bytes
    // without materializing pixel data.
    let reader = ImageReader::new(Cursor::new(&upload.bytes))
        .with_guessed_format()
        .map_err(|e| ValidationError::Undecodable(e.to_string()))?;
    reader
        .into_dimensions()
        .map_err(|e| ValidationError::Undecodable(e.to_string()))?;

    Ok(())
}
