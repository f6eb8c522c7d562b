//! Font sizing and loading.
//!
//! Two concerns live here:
//!
//! - **Sizing**: pure functions mapping image dimensions to a font size
//!   and an outline width. Large images (both dimensions above the
//!   threshold) get a fixed size; small images scale with the shorter
//!   side, floored for legibility.
//! - **Loading**: an ordered probe over configured font file paths. The
//!   first file that parses as a font wins; when every candidate fails the
//!   loader falls back to a built-in 8x8 bitmap face, so the search is
//!   total and font loading can never fail a request.
//!
//! The probe result is cached for the lifetime of the loader; `ab_glyph`
//! fonts are scaled at render time, so one handle serves every request.

use ab_glyph::FontVec;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

use super::config::{FontConfig, WatermarkStyle};

/// A loaded font face.
pub enum FontHandle {
    /// An outline font parsed from a configured path
    Outline(FontVec),
    /// The built-in 8x8 bitmap face, scaled nearest-neighbor at render time
    Bitmap,
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outline(_) => f.write_str("FontHandle::Outline"),
            Self::Bitmap => f.write_str("FontHandle::Bitmap"),
        }
    }
}

/// Compute the font size for an image.
///
/// Both dimensions above the threshold use the fixed size; otherwise the
/// size is the shorter dimension divided by the configured divisor,
/// floored at the minimum. Pure and total.
pub fn resolve_font_size(width: u32, height: u32, style: &WatermarkStyle) -> u32 {
    if width > style.size_threshold && height > style.size_threshold {
        style.fixed_font_size
    } else {
        (width.min(height) / style.font_divisor).max(style.min_font_size)
    }
}

/// Compute the outline width for a font size.
///
/// Scales the configured width proportionally to the font size relative
/// to the fixed size, floored at one pixel so the outline never vanishes.
pub fn resolve_stroke_width(font_size: u32, style: &WatermarkStyle) -> u32 {
    ((style.stroke_width * font_size) / style.fixed_font_size).max(1)
}

/// Ordered font probe with a built-in terminal fallback.
pub struct FontLoader {
    search_paths: Vec<PathBuf>,
    cache: OnceLock<FontHandle>,
}

impl FontLoader {
    pub fn new(config: &FontConfig) -> Self {
        Self {
            search_paths: config.search_paths.iter().map(PathBuf::from).collect(),
            cache: OnceLock::new(),
        }
    }

    /// Get the loaded font, probing the candidates on first use.
    ///
    /// Never fails: the bitmap fallback is the terminal case of the
    /// search.
    pub fn load(&self) -> &FontHandle {
        self.cache.get_or_init(|| self.probe())
    }

    fn probe(&self) -> FontHandle {
        for path in &self.search_paths {
            let data = match std::fs::read(path) {
                Ok(data) => data,
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "Font candidate unreadable");
                    continue;
                }
            };

            match FontVec::try_from_vec(data) {
                Ok(font) => {
                    tracing::info!(path = %path.display(), "Loaded watermark font");
                    return FontHandle::Outline(font);
                }
                Err(err) => {
                    tracing::debug!(path = %path.display(), error = %err, "Font candidate unparsable");
                }
            }
        }

        tracing::warn!(
            candidates = self.search_paths.len(),
            "No font candidate loaded, using built-in bitmap face"
        );
        FontHandle::Bitmap
    }
}
