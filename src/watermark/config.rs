//! Watermark configuration types.
//!
//! This module defines the watermark style configuration:
//! - Font sizing rules (threshold, fixed size, relative divisor, floor)
//! - Fill and outline colors with their alpha
//! - Tile rotation and output quality
//! - Tile spacing strategy
//! - Font search paths
//!
//! All values are deployment configuration with documented defaults, never
//! request input. Defaults are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BASE_SPACING_X, DEFAULT_BASE_SPACING_Y, DEFAULT_FILL_COLOR, DEFAULT_FONT_PATHS,
    DEFAULT_JPEG_QUALITY, DEFAULT_MARGIN_FACTOR, DEFAULT_OVERLAP_FACTOR, DEFAULT_ROTATION_DEGREES,
    DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, DEFAULT_WATERMARK_TEXT, LARGE_IMAGE_FONT_SIZE,
    LARGE_IMAGE_THRESHOLD, MIN_FONT_SIZE, RELATIVE_FONT_DIVISOR,
};

// Default values
fn default_text() -> String {
    DEFAULT_WATERMARK_TEXT.to_string()
}

fn default_size_threshold() -> u32 {
    LARGE_IMAGE_THRESHOLD
}

fn default_fixed_font_size() -> u32 {
    LARGE_IMAGE_FONT_SIZE
}

fn default_min_font_size() -> u32 {
    MIN_FONT_SIZE
}

fn default_font_divisor() -> u32 {
    RELATIVE_FONT_DIVISOR
}

fn default_stroke_width() -> u32 {
    DEFAULT_STROKE_WIDTH
}

fn default_fill_color() -> [u8; 4] {
    DEFAULT_FILL_COLOR
}

fn default_stroke_color() -> [u8; 4] {
    DEFAULT_STROKE_COLOR
}

fn default_rotation_degrees() -> f32 {
    DEFAULT_ROTATION_DEGREES
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_spacing_strategy() -> SpacingStrategy {
    SpacingStrategy::MarginFactor
}

fn default_margin_factor() -> f32 {
    DEFAULT_MARGIN_FACTOR
}

fn default_overlap_factor() -> f32 {
    DEFAULT_OVERLAP_FACTOR
}

fn default_base_spacing_x() -> u32 {
    DEFAULT_BASE_SPACING_X
}

fn default_base_spacing_y() -> u32 {
    DEFAULT_BASE_SPACING_Y
}

fn default_font_paths() -> Vec<String> {
    DEFAULT_FONT_PATHS.iter().map(|p| p.to_string()).collect()
}

/// How the distance between tile origins is derived.
///
/// One tiler serves all three formulas; the formula is a named,
/// swappable strategy chosen per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacingStrategy {
    /// Base spacing constants scaled by `font_size / fixed_font_size`
    FixedBase,
    /// Rotated tile dimensions multiplied by `margin_factor` (>= 1.0 adds
    /// a margin between tiles)
    MarginFactor,
    /// Rotated tile dimensions multiplied by `overlap_factor` (< 1.0 makes
    /// neighboring tiles overlap)
    OverlapFactor,
}

/// Tile spacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacingConfig {
    /// Spacing formula to use (default: margin-factor)
    #[serde(default = "default_spacing_strategy")]
    pub strategy: SpacingStrategy,

    /// Multiplier for the margin-factor strategy (default: 1.0)
    #[serde(default = "default_margin_factor")]
    pub margin_factor: f32,

    /// Multiplier for the overlap-factor strategy (default: 0.85)
    #[serde(default = "default_overlap_factor")]
    pub overlap_factor: f32,

    /// Horizontal base spacing for the fixed-base strategy (default: 280)
    #[serde(default = "default_base_spacing_x")]
    pub base_x: u32,

    /// Vertical base spacing for the fixed-base strategy (default: 200)
    #[serde(default = "default_base_spacing_y")]
    pub base_y: u32,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            strategy: default_spacing_strategy(),
            margin_factor: default_margin_factor(),
            overlap_factor: default_overlap_factor(),
            base_x: default_base_spacing_x(),
            base_y: default_base_spacing_y(),
        }
    }
}

/// Watermark style configuration.
///
/// One immutable value constructed at startup and shared by every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkStyle {
    /// Text rendered when the caller supplies none (default: "Sample")
    #[serde(default = "default_text")]
    pub default_text: String,

    /// Dimension threshold for the fixed font size; both width and height
    /// must exceed it (default: 1000)
    #[serde(default = "default_size_threshold")]
    pub size_threshold: u32,

    /// Font size for images above the threshold (default: 72)
    #[serde(default = "default_fixed_font_size")]
    pub fixed_font_size: u32,

    /// Font size floor for small images (default: 24)
    #[serde(default = "default_min_font_size")]
    pub min_font_size: u32,

    /// Divisor of the smaller dimension for relative sizing (default: 8)
    #[serde(default = "default_font_divisor")]
    pub font_divisor: u32,

    /// Outline width at the fixed font size, in pixels (default: 4)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,

    /// Text fill color as RGBA (default: white at alpha 150)
    #[serde(default = "default_fill_color")]
    pub fill_color: [u8; 4],

    /// Text outline color as RGBA (default: black at alpha 120)
    #[serde(default = "default_stroke_color")]
    pub stroke_color: [u8; 4],

    /// Tile rotation in degrees (default: -30)
    #[serde(default = "default_rotation_degrees")]
    pub rotation_degrees: f32,

    /// JPEG quality of the output, 1-100 (default: 95)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Tile spacing configuration
    #[serde(default)]
    pub spacing: SpacingConfig,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            default_text: default_text(),
            size_threshold: default_size_threshold(),
            fixed_font_size: default_fixed_font_size(),
            min_font_size: default_min_font_size(),
            font_divisor: default_font_divisor(),
            stroke_width: default_stroke_width(),
            fill_color: default_fill_color(),
            stroke_color: default_stroke_color(),
            rotation_degrees: default_rotation_degrees(),
            jpeg_quality: default_jpeg_quality(),
            spacing: SpacingConfig::default(),
        }
    }
}

impl WatermarkStyle {
    /// Check the style values for ranges that would break the pipeline.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_text.trim().is_empty() {
            return Err("Watermark default_text cannot be empty".to_string());
        }

        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(format!(
                "Watermark jpeg_quality must be 1-100, got {}",
                self.jpeg_quality
            ));
        }

        if self.font_divisor == 0 {
            return Err("Watermark font_divisor cannot be zero".to_string());
        }

        if self.fixed_font_size == 0 || self.min_font_size == 0 {
            return Err("Watermark font sizes must be positive".to_string());
        }

        if self.spacing.margin_factor <= 0.0 {
            return Err(format!(
                "Watermark spacing margin_factor must be positive, got {}",
                self.spacing.margin_factor
            ));
        }

        if self.spacing.overlap_factor <= 0.0 {
            return Err(format!(
                "Watermark spacing overlap_factor must be positive, got {}",
                self.spacing.overlap_factor
            ));
        }

        if self.spacing.base_x == 0 || self.spacing.base_y == 0 {
            return Err("Watermark spacing base_x and base_y must be positive".to_string());
        }

        Ok(())
    }
}

/// Font search configuration.
///
/// The candidate list is deployment configuration; the loader probes the
/// paths in order and falls back to the built-in bitmap face when none
/// loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Candidate font files, probed in order
    #[serde(default = "default_font_paths")]
    pub search_paths: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            search_paths: default_font_paths(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermark_style_defaults() {
        let style = WatermarkStyle::default();

        assert_eq!(style.default_text, "Sample");
        assert_eq!(style.size_threshold, 1000);
        assert_eq!(style.fixed_font_size, 72);
        assert_eq!(style.min_font_size, 24);
        assert_eq!(style.font_divisor, 8);
        assert_eq!(style.stroke_width, 4);
        assert_eq!(style.fill_color, [255, 255, 255, 150]);
        assert_eq!(style.stroke_color, [0, 0, 0, 120]);
        assert_eq!(style.rotation_degrees, -30.0);
        assert_eq!(style.jpeg_quality, 95);
        assert_eq!(style.spacing.strategy, SpacingStrategy::MarginFactor);
    }

    #[test]
    fn test_watermark_style_deserialize_defaults() {
        let yaml = "{}";
        let style: WatermarkStyle = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(style.default_text, "Sample");
        assert_eq!(style.fixed_font_size, 72);
        assert_eq!(style.spacing.margin_factor, 1.0);
    }

    #[test]
    fn test_watermark_style_deserialize_custom() {
        let yaml = r#"
default_text: "CONFIDENTIAL"
fixed_font_size: 96
fill_color: [200, 200, 200, 128]
spacing:
  strategy: overlap-factor
  overlap_factor: 0.7
"#;
        let style: WatermarkStyle = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(style.default_text, "CONFIDENTIAL");
        assert_eq!(style.fixed_font_size, 96);
        assert_eq!(style.fill_color, [200, 200, 200, 128]);
        assert_eq!(style.spacing.strategy, SpacingStrategy::OverlapFactor);
        assert_eq!(style.spacing.overlap_factor, 0.7);
        // Untouched fields keep their defaults
        assert_eq!(style.min_font_size, 24);
        assert_eq!(style.spacing.base_x, 280);
    }

    #[test]
    fn test_spacing_strategy_kebab_case() {
        let strategy: SpacingStrategy = serde_yaml::from_str("fixed-base").unwrap();
        assert_eq!(strategy, SpacingStrategy::FixedBase);

        let strategy: SpacingStrategy = serde_yaml::from_str("margin-factor").unwrap();
        assert_eq!(strategy, SpacingStrategy::MarginFactor);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(WatermarkStyle::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_default_text() {
        let style = WatermarkStyle {
            default_text: "   ".to_string(),
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_quality() {
        let style = WatermarkStyle {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(style.validate().is_err());

        let style = WatermarkStyle {
            jpeg_quality: 101,
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_divisor() {
        let style = WatermarkStyle {
            font_divisor: 0,
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nonpositive_factors() {
        let mut style = WatermarkStyle::default();
        style.spacing.margin_factor = 0.0;
        assert!(style.validate().is_err());

        let mut style = WatermarkStyle::default();
        style.spacing.overlap_factor = -0.5;
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_font_config_default_paths() {
        let config = FontConfig::default();

        assert_eq!(config.search_paths.len(), 3);
        assert!(config.search_paths[0].ends_with("arial.ttf"));
    }

    #[test]
    fn test_font_config_deserialize_custom_paths() {
        let yaml = r#"
search_paths:
  - "/opt/fonts/Custom.ttf"
"#;
        let config: FontConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.search_paths, vec!["/opt/fonts/Custom.ttf"]);
    }
}
