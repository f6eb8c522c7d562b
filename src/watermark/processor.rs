//! Watermark processor: the full per-request pipeline.
//!
//! One deterministic pass over the upload:
//!
//! 1. Decode the bytes and reject degenerate rasters
//! 2. Correct camera orientation and convert to RGBA
//! 3. Resolve the font size and outline width from the image dimensions
//! 4. Render one rotated, outlined tile
//! 5. Stamp the tile across a staggered grid on a transparent layer
//! 6. Composite the layer over the image, flatten, encode as JPEG
//!
//! The processor holds only read-only style configuration and the cached
//! font, so one instance serves any number of concurrent requests.

use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbImage, Rgba};
use std::io::Cursor;

use super::compositor::{build_layer, composite_over, flatten_to_rgb};
use super::config::WatermarkStyle;
use super::error::WatermarkError;
use super::font::{resolve_font_size, resolve_stroke_width, FontLoader};
use super::orientation;
use super::position::{resolve_spacing, staggered_positions, ImageDimensions, TileDimensions};
use super::text_renderer::{render_tile, TileSpec};
use crate::config::Config;

/// Stateless watermarking engine shared across requests.
pub struct WatermarkProcessor {
    style: WatermarkStyle,
    fonts: FontLoader,
}

impl WatermarkProcessor {
    pub fn new(style: WatermarkStyle, fonts: FontLoader) -> Self {
        Self { style, fonts }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.watermark.clone(), FontLoader::new(&config.fonts))
    }

    /// Watermark an uploaded image.
    ///
    /// Returns the watermarked image encoded as JPEG, with the same pixel
    /// dimensions as the orientation-corrected input. Empty or absent text
    /// resolves to the configured default. Identical inputs produce
    /// byte-identical output.
    pub fn apply(&self, bytes: &[u8], text: Option<&str>) -> Result<Vec<u8>, WatermarkError> {
        let decoded = decode_image(bytes)?;

        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(WatermarkError::DegenerateImage {
                width: decoded.width(),
                height: decoded.height(),
            });
        }

        let correction = orientation::detect(bytes);
        let base = orientation::apply(decoded, correction).to_rgba8();
        let (width, height) = base.dimensions();

        let text = resolve_text(text, &self.style.default_text);
        let font_size = resolve_font_size(width, height, &self.style);
        let stroke_width = resolve_stroke_width(font_size, &self.style);

        let tile = render_tile(
            self.fonts.load(),
            &TileSpec {
                text: text.to_string(),
                font_size,
                stroke_width,
                fill: Rgba(self.style.fill_color),
                stroke: Rgba(self.style.stroke_color),
                rotation_degrees: self.style.rotation_degrees,
            },
        )?;

        let image_dims = ImageDimensions { width, height };
        let tile_dims = TileDimensions {
            width: tile.width(),
            height: tile.height(),
        };

        let (spacing_x, spacing_y) = resolve_spacing(
            &self.style.spacing,
            &tile_dims,
            font_size,
            self.style.fixed_font_size,
        );
        let positions = staggered_positions(&image_dims, &tile_dims, spacing_x, spacing_y);

        tracing::debug!(
            width,
            height,
            font_size,
            tile_width = tile_dims.width,
            tile_height = tile_dims.height,
            spacing_x,
            spacing_y,
            placements = positions.len(),
            "Watermark tiling resolved"
        );

        let layer = build_layer(&image_dims, &tile, &positions);
        let composited = composite_over(&base, &layer);
        let flattened = flatten_to_rgb(&composited);

        encode_jpeg(&flattened, self.style.jpeg_quality)
    }
}

/// Substitute the configured default for empty or absent text.
fn resolve_text<'a>(text: Option<&'a str>, default: &'a str) -> &'a str {
    match text {
        Some(value) if !value.trim().is_empty() => value,
        _ => default,
    }
}

fn decode_image(bytes: &[u8]) -> Result<DynamicImage, WatermarkError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| WatermarkError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| WatermarkError::Decode(e.to_string()))
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, WatermarkError> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgb8,
        )
        .map_err(|e| WatermarkError::Encode(e.to_string()))?;

    Ok(buffer)
}
