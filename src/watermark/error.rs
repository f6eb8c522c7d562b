//! Watermark error types.
//!
//! Defines errors that can occur while watermarking an upload, with a
//! mapping to HTTP status codes for the boundary.

use std::fmt;

/// Errors that can occur during watermark processing.
#[derive(Debug, Clone)]
pub enum WatermarkError {
    /// Upload bytes are not a decodable image
    Decode(String),

    /// Decoding produced a zero-area raster
    DegenerateImage { width: u32, height: u32 },

    /// No candidate font loaded and the built-in fallback failed.
    /// Should be unreachable; kept for loader diagnostics.
    FontUnavailable(String),

    /// Failed to render the watermark tile
    Render(String),

    /// Failed to composite the tiled layer onto the image
    Composite(String),

    /// Failed to encode the watermarked result
    Encode(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "Failed to decode uploaded image: {}", msg),
            Self::DegenerateImage { width, height } => {
                write!(f, "Image has degenerate dimensions {}x{}", width, height)
            }
            Self::FontUnavailable(msg) => write!(f, "No usable font available: {}", msg),
            Self::Render(msg) => write!(f, "Failed to render watermark tile: {}", msg),
            Self::Composite(msg) => write!(f, "Failed to composite watermark: {}", msg),
            Self::Encode(msg) => write!(f, "Failed to encode output image: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}

impl WatermarkError {
    /// Maps watermark errors to HTTP status codes
    ///
    /// Status mapping:
    /// - Decode, DegenerateImage → 422 (Unprocessable Entity): the upload
    ///   passed content-type validation but is not a usable image
    /// - FontUnavailable, Render, Composite, Encode → 500 (Internal
    ///   Server Error): a deployment or processing defect
    pub fn to_http_status(&self) -> u16 {
        match self {
            Self::Decode(_) | Self::DegenerateImage { .. } => 422,
            Self::FontUnavailable(_) | Self::Render(_) | Self::Composite(_) | Self::Encode(_) => {
                500
            }
        }
    }
}
