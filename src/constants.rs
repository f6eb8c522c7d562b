// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers improves maintainability
// and makes it easier to understand and modify defaults.

// =============================================================================
// Server defaults
// =============================================================================

/// Default listen address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 4;

/// Default maximum upload body size (10 MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

// =============================================================================
// Watermark defaults
// =============================================================================

/// Watermark text used when the caller supplies none
pub const DEFAULT_WATERMARK_TEXT: &str = "Sample";

/// Image dimension threshold for switching to the fixed font size.
/// Both width and height must exceed this value.
pub const LARGE_IMAGE_THRESHOLD: u32 = 1000;

/// Fixed font size for images larger than the threshold in both dimensions
pub const LARGE_IMAGE_FONT_SIZE: u32 = 72;

/// Divisor applied to the smaller image dimension for relative font sizing
pub const RELATIVE_FONT_DIVISOR: u32 = 8;

/// Minimum font size, so the text stays legible on small images
pub const MIN_FONT_SIZE: u32 = 24;

/// Fill color for the watermark text (near-white, partially transparent)
pub const DEFAULT_FILL_COLOR: [u8; 4] = [255, 255, 255, 150];

/// Outline color for the watermark text (near-black, partially transparent)
pub const DEFAULT_STROKE_COLOR: [u8; 4] = [0, 0, 0, 120];

/// Outline width in pixels at the fixed font size; scaled down with the font
pub const DEFAULT_STROKE_WIDTH: u32 = 4;

/// Rotation applied to each tile, in degrees (negative is clockwise)
pub const DEFAULT_ROTATION_DEGREES: f32 = -30.0;

/// JPEG quality of the encoded output
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Extra transparent pixels around the measured text, on top of the
/// outline width, so anti-aliased edges never clip
pub const TILE_CANVAS_PADDING: u32 = 4;

// =============================================================================
// Tile spacing defaults
// =============================================================================

/// Horizontal tile spacing at the fixed font size (fixed-base strategy)
pub const DEFAULT_BASE_SPACING_X: u32 = 280;

/// Vertical tile spacing at the fixed font size (fixed-base strategy)
pub const DEFAULT_BASE_SPACING_Y: u32 = 200;

/// Multiplier on the rotated tile size (margin-factor strategy)
pub const DEFAULT_MARGIN_FACTOR: f32 = 1.0;

/// Multiplier on the rotated tile size (overlap-factor strategy)
pub const DEFAULT_OVERLAP_FACTOR: f32 = 0.85;

// =============================================================================
// Font defaults
// =============================================================================

/// Candidate font files probed in order at startup. The list covers the
/// common Windows and Linux locations; deployments with other layouts
/// override it in the config file.
pub const DEFAULT_FONT_PATHS: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
];
