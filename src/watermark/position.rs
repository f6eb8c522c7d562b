//! Tile placement for the staggered watermark grid.
//!
//! This module decides where tile instances go. Spacing between tile
//! origins comes from a configurable strategy (see
//! [`SpacingStrategy`](super::config::SpacingStrategy)); the grid itself
//! starts one tile before the image on both axes and runs one tile past
//! it, with every other row shifted by half the horizontal spacing. That
//! guarantees the tiled area covers the whole image regardless of image
//! size, tile size, or rotation-induced bounding-box growth, and the
//! stagger avoids visible vertical seams.

use super::config::{SpacingConfig, SpacingStrategy};

/// Dimensions of the target image.
#[derive(Debug, Clone, Copy)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the rendered tile.
#[derive(Debug, Clone, Copy)]
pub struct TileDimensions {
    pub width: u32,
    pub height: u32,
}

/// A single position where a tile should be stamped.
///
/// Coordinates may be negative: edge tiles hang over the layer bounds and
/// are clipped when stamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Compute the spacing between tile origins.
///
/// Every strategy scales with the rendered tile one way or another:
/// margin-factor and overlap-factor multiply the rotated tile dimensions
/// directly, and fixed-base scales its base constants with the font size.
/// Spacing never collapses below one pixel.
pub fn resolve_spacing(
    spacing: &SpacingConfig,
    tile: &TileDimensions,
    font_size: u32,
    fixed_font_size: u32,
) -> (u32, u32) {
    let (x, y) = match spacing.strategy {
        SpacingStrategy::FixedBase => {
            let scale = font_size as f32 / fixed_font_size as f32;
            (
                (spacing.base_x as f32 * scale) as u32,
                (spacing.base_y as f32 * scale) as u32,
            )
        }
        SpacingStrategy::MarginFactor => (
            (tile.width as f32 * spacing.margin_factor) as u32,
            (tile.height as f32 * spacing.margin_factor) as u32,
        ),
        SpacingStrategy::OverlapFactor => (
            (tile.width as f32 * spacing.overlap_factor) as u32,
            (tile.height as f32 * spacing.overlap_factor) as u32,
        ),
    };

    (x.max(1), y.max(1))
}

/// Generate the staggered grid of tile positions for an image.
///
/// Rows start at `-tile_height` and advance by `spacing_y` until one tile
/// past the bottom edge; columns likewise on the horizontal axis. Odd rows
/// shift right by half the horizontal spacing (brick pattern).
pub fn staggered_positions(
    image: &ImageDimensions,
    tile: &TileDimensions,
    spacing_x: u32,
    spacing_y: u32,
) -> Vec<PlacementPosition> {
    let step_x = spacing_x.max(1) as i32;
    let step_y = spacing_y.max(1) as i32;
    let tile_w = tile.width as i32;
    let tile_h = tile.height as i32;

    let mut positions = Vec::new();

    let mut y = -tile_h;
    let mut row = 0u32;
    while y < image.height as i32 + tile_h {
        let offset = if row % 2 == 1 { step_x / 2 } else { 0 };

        let mut x = -tile_w + offset;
        while x < image.width as i32 + tile_w {
            positions.push(PlacementPosition::new(x, y));
            x += step_x;
        }

        y += step_y;
        row += 1;
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(w: u32, h: u32) -> ImageDimensions {
        ImageDimensions {
            width: w,
            height: h,
        }
    }

    fn tile(w: u32, h: u32) -> TileDimensions {
        TileDimensions {
            width: w,
            height: h,
        }
    }

    fn spacing_config(strategy: SpacingStrategy) -> SpacingConfig {
        SpacingConfig {
            strategy,
            ..Default::default()
        }
    }

    // Test: margin-factor spacing follows the tile dimensions
    #[test]
    fn test_margin_factor_spacing() {
        let mut config = spacing_config(SpacingStrategy::MarginFactor);
        config.margin_factor = 1.0;
        assert_eq!(resolve_spacing(&config, &tile(120, 80), 72, 72), (120, 80));

        config.margin_factor = 1.5;
        assert_eq!(resolve_spacing(&config, &tile(120, 80), 72, 72), (180, 120));
    }

    // Test: spacing scales with text length through the tile width
    #[test]
    fn test_margin_factor_spacing_scales_with_tile() {
        let config = spacing_config(SpacingStrategy::MarginFactor);
        let (short_x, _) = resolve_spacing(&config, &tile(100, 60), 72, 72);
        let (long_x, _) = resolve_spacing(&config, &tile(400, 60), 72, 72);
        assert!(long_x > short_x);
    }

    #[test]
    fn test_overlap_factor_spacing() {
        let mut config = spacing_config(SpacingStrategy::OverlapFactor);
        config.overlap_factor = 0.5;
        assert_eq!(resolve_spacing(&config, &tile(120, 80), 72, 72), (60, 40));
    }

    // Test: fixed-base spacing scales with the font size
    #[test]
    fn test_fixed_base_spacing() {
        let config = spacing_config(SpacingStrategy::FixedBase);
        assert_eq!(resolve_spacing(&config, &tile(120, 80), 72, 72), (280, 200));
        assert_eq!(resolve_spacing(&config, &tile(120, 80), 36, 72), (140, 100));
        assert_eq!(resolve_spacing(&config, &tile(120, 80), 24, 72), (93, 66));
    }

    // Test: spacing never collapses to zero
    #[test]
    fn test_spacing_floor() {
        let mut config = spacing_config(SpacingStrategy::OverlapFactor);
        config.overlap_factor = 0.001;
        assert_eq!(resolve_spacing(&config, &tile(10, 10), 24, 72), (1, 1));
    }

    // Test: the grid starts before the image and ends past it
    #[test]
    fn test_grid_covers_image_bounds() {
        let cases = [
            (500, 500, 120, 90),
            (2000, 1500, 400, 250),
            (50, 50, 120, 90), // tile larger than image
            (1, 1, 10, 10),
            (800, 100, 64, 64),
        ];

        for (img_w, img_h, tile_w, tile_h) in cases {
            let positions =
                staggered_positions(&image(img_w, img_h), &tile(tile_w, tile_h), tile_w, tile_h);

            assert!(!positions.is_empty());

            let min_x = positions.iter().map(|p| p.x).min().unwrap();
            let min_y = positions.iter().map(|p| p.y).min().unwrap();
            let max_x = positions.iter().map(|p| p.x).max().unwrap();
            let max_y = positions.iter().map(|p| p.y).max().unwrap();

            // Starts at least one tile before the origin
            assert_eq!(min_x, -(tile_w as i32));
            assert_eq!(min_y, -(tile_h as i32));
            // Last origin within one step of the far edge, so the last
            // tile reaches past it
            assert!(max_x + tile_w as i32 >= img_w as i32);
            assert!(max_y + tile_h as i32 >= img_h as i32);
        }
    }

    // Test: with spacing equal to the tile size the rows are contiguous
    #[test]
    fn test_grid_no_uncovered_rows() {
        let positions = staggered_positions(&image(300, 300), &tile(100, 50), 100, 50);

        let mut ys: Vec<i32> = positions.iter().map(|p| p.y).collect();
        ys.sort_unstable();
        ys.dedup();

        for pair in ys.windows(2) {
            assert_eq!(pair[1] - pair[0], 50);
        }
    }

    // Test: alternate rows are offset by half the horizontal spacing
    #[test]
    fn test_grid_stagger_offset() {
        let positions = staggered_positions(&image(400, 400), &tile(100, 100), 100, 100);

        let even_row_min = positions
            .iter()
            .filter(|p| p.y == -100)
            .map(|p| p.x)
            .min()
            .unwrap();
        let odd_row_min = positions
            .iter()
            .filter(|p| p.y == 0)
            .map(|p| p.x)
            .min()
            .unwrap();

        assert_eq!(even_row_min, -100);
        assert_eq!(odd_row_min, -100 + 50);
    }

    #[test]
    fn test_grid_columns_step_by_spacing() {
        let positions = staggered_positions(&image(300, 100), &tile(50, 200), 60, 200);

        let mut first_row: Vec<i32> = positions
            .iter()
            .filter(|p| p.y == -200)
            .map(|p| p.x)
            .collect();
        first_row.sort_unstable();

        for pair in first_row.windows(2) {
            assert_eq!(pair[1] - pair[0], 60);
        }
    }

    #[test]
    fn test_zero_spacing_clamped() {
        // Degenerate spacing still terminates
        let positions = staggered_positions(&image(10, 10), &tile(5, 5), 0, 0);
        assert!(!positions.is_empty());
    }
}
