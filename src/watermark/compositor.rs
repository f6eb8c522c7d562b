//! Watermark compositing.
//!
//! Builds the watermark layer (a transparent raster the size of the
//! source image with the tile stamped at every grid position) and
//! composites it over the source. Stamping and compositing both use the
//! Porter-Duff "over" operator; out-of-bounds portions of edge tiles are
//! clipped by the layer bounds.

use image::{Rgba, RgbImage, RgbaImage};

use super::position::{ImageDimensions, PlacementPosition};

/// Blend two pixels using alpha compositing.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Stamp a tile onto the layer at the given position.
///
/// The visible region is clamped to the layer bounds; positions may be
/// negative or extend past the far edges.
pub fn stamp_tile(layer: &mut RgbaImage, tile: &RgbaImage, position: PlacementPosition) {
    let layer_width = layer.width() as i32;
    let layer_height = layer.height() as i32;

    let tile_width = tile.width() as i32;
    let tile_height = tile.height() as i32;

    let x_start = position.x.max(0);
    let y_start = position.y.max(0);
    let x_end = (position.x + tile_width).min(layer_width);
    let y_end = (position.y + tile_height).min(layer_height);

    for ly in y_start..y_end {
        for lx in x_start..x_end {
            let tx = (lx - position.x) as u32;
            let ty = (ly - position.y) as u32;

            let tile_pixel = tile.get_pixel(tx, ty);
            if tile_pixel[3] == 0 {
                continue;
            }

            let layer_pixel = layer.get_pixel(lx as u32, ly as u32);
            let blended = blend_pixels(*layer_pixel, *tile_pixel);
            layer.put_pixel(lx as u32, ly as u32, blended);
        }
    }
}

/// Build the watermark layer: a transparent raster the size of the image
/// with the tile stamped at every position.
pub fn build_layer(
    image: &ImageDimensions,
    tile: &RgbaImage,
    positions: &[PlacementPosition],
) -> RgbaImage {
    let mut layer = RgbaImage::new(image.width, image.height);

    for position in positions {
        stamp_tile(&mut layer, tile, *position);
    }

    layer
}

/// Composite the watermark layer over the base image.
pub fn composite_over(base: &RgbaImage, layer: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(base.width(), base.height(), |x, y| {
        blend_pixels(*base.get_pixel(x, y), *layer.get_pixel(x, y))
    })
}

/// Flatten an RGBA image to opaque RGB by dropping the alpha channel.
pub fn flatten_to_rgb(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let pixel = image.get_pixel(x, y);
        image::Rgb([pixel[0], pixel[1], pixel[2]])
    })
}
