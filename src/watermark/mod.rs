//! Watermark engine: tiled text watermarking for uploaded images.
//!
//! Turns (image bytes, optional text) into JPEG bytes with the text tiled
//! across the image as a rotated, outlined, semi-transparent mark. The
//! pipeline is deterministic and stateless per request.
//!
//! # Stages
//!
//! - **Orientation** ([`orientation`]): EXIF-driven upright correction,
//!   total and never failing
//! - **Fonts** ([`font`]): image-size-driven font sizing plus an ordered
//!   font file probe with a built-in bitmap fallback
//! - **Tile rendering** ([`text_renderer`]): one rotated, outlined tile on
//!   a transparent canvas
//! - **Placement** ([`position`]): staggered brick grid with configurable
//!   spacing strategy
//! - **Compositing** ([`compositor`]): stamping, layering, flattening
//! - **Pipeline** ([`processor`]): ties the stages together and encodes
//!   the JPEG output

pub mod compositor;
pub mod config;
pub mod error;
pub mod font;
pub mod orientation;
pub mod position;
pub mod processor;
pub mod text_renderer;

// Re-export main types for convenience
pub use compositor::{build_layer, composite_over, flatten_to_rgb, stamp_tile};
pub use config::{FontConfig, SpacingConfig, SpacingStrategy, WatermarkStyle};
pub use error::WatermarkError;
pub use font::{resolve_font_size, resolve_stroke_width, FontHandle, FontLoader};
pub use orientation::OrientationCorrection;
pub use position::{
    resolve_spacing, staggered_positions, ImageDimensions, PlacementPosition, TileDimensions,
};
pub use processor::WatermarkProcessor;
pub use text_renderer::{measure_text, render_tile, TileSpec};
