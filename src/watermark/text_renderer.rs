//! Watermark tile rendering.
//!
//! Renders one outlined, semi-transparent, rotated instance of the
//! watermark text onto a transparent canvas sized to the rotated
//! bounding box.
//! The tile is rendered once per request and stamped unchanged at every
//! grid position.
//!
//! Rendering is mask-based: the text is rasterized once into a coverage
//! mask, the outline is the mask dilated by the stroke radius, and the two
//! are composed as outline-under-fill. This keeps overlapping outline
//! passes from accumulating alpha.
//!
//! Two font paths exist: outline fonts rasterized through `ab_glyph`
//! (kerning and anti-aliased coverage) and the built-in 8x8 bitmap face
//! scaled nearest-neighbor.

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};

use super::compositor::blend_pixels;
use super::error::WatermarkError;
use super::font::FontHandle;
use crate::constants::TILE_CANVAS_PADDING;

/// Parameters for rendering one watermark tile.
#[derive(Debug, Clone)]
pub struct TileSpec {
    /// The text to render
    pub text: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Outline width in pixels
    pub stroke_width: u32,
    /// Fill color (RGBA)
    pub fill: Rgba<u8>,
    /// Outline color (RGBA)
    pub stroke: Rgba<u8>,
    /// Rotation in degrees, counter-clockwise
    pub rotation_degrees: f32,
}

/// Anti-aliased coverage values for a canvas, 0.0 to 1.0 per pixel.
#[derive(Clone)]
struct CoverageMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl CoverageMask {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; (width * height) as usize],
        }
    }

    fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    /// Merge coverage at a pixel, keeping the maximum. Out-of-bounds
    /// coordinates are ignored.
    fn put_max(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        if coverage > self.data[idx] {
            self.data[idx] = coverage;
        }
    }

    /// Expand coverage by a disc of the given radius, producing the
    /// outline silhouette.
    fn dilate(&self, radius: u32) -> CoverageMask {
        if radius == 0 {
            return self.clone();
        }

        let r = radius as i32;
        let mut out = CoverageMask::new(self.width, self.height);

        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy > r * r {
                    continue;
                }
                for y in 0..self.height as i32 {
                    let sy = y - dy;
                    if sy < 0 || sy >= self.height as i32 {
                        continue;
                    }
                    for x in 0..self.width as i32 {
                        let sx = x - dx;
                        if sx < 0 || sx >= self.width as i32 {
                            continue;
                        }
                        let coverage = self.get(sx as u32, sy as u32);
                        if coverage > 0.0 {
                            out.put_max(x, y, coverage);
                        }
                    }
                }
            }
        }

        out
    }
}

fn bitmap_scale(font_size: u32) -> u32 {
    (font_size / 8).max(1)
}

/// Calculate the dimensions of the text at the given size, before
/// outline padding and rotation.
///
/// Returns (width, height) in pixels.
pub fn measure_text(font: &FontHandle, text: &str, font_size: u32) -> (u32, u32) {
    match font {
        FontHandle::Outline(face) => {
            let scaled = face.as_scaled(PxScale::from(font_size as f32));

            let mut width = 0.0f32;
            let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

            for c in text.chars() {
                let glyph_id = scaled.glyph_id(c);
                if let Some(prev) = prev_glyph {
                    width += scaled.kern(prev, glyph_id);
                }
                width += scaled.h_advance(glyph_id);
                prev_glyph = Some(glyph_id);
            }

            (
                (width.ceil().max(1.0)) as u32,
                (scaled.height().ceil().max(1.0)) as u32,
            )
        }
        FontHandle::Bitmap => {
            let scale = bitmap_scale(font_size);
            let count = text.chars().count() as u32;
            ((count * 8 * scale).max(1), 8 * scale)
        }
    }
}

/// Rasterize the text into the mask with its top-left at (origin_x, origin_y).
fn rasterize_outline_font(
    face: &FontVec,
    text: &str,
    font_size: u32,
    origin_x: u32,
    origin_y: u32,
    mask: &mut CoverageMask,
) {
    let scale = PxScale::from(font_size as f32);
    let scaled = face.as_scaled(scale);

    let baseline_y = origin_y as f32 + scaled.ascent();
    let mut cursor_x = origin_x as f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled.glyph_id(c);

        if let Some(prev) = prev_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));

        if let Some(outlined) = face.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|px, py, coverage| {
                let x = px as i32 + bounds.min.x as i32;
                let y = py as i32 + bounds.min.y as i32;
                mask.put_max(x, y, coverage);
            });
        }

        cursor_x += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }
}

/// Rasterize the text with the built-in 8x8 face, scaled nearest-neighbor.
fn rasterize_bitmap_font(
    text: &str,
    font_size: u32,
    origin_x: u32,
    origin_y: u32,
    mask: &mut CoverageMask,
) {
    let scale = bitmap_scale(font_size);
    let mut cursor_x = origin_x;

    for ch in text.chars() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| BASIC_FONTS.get('?'))
            .unwrap_or_default();

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8u32 {
                if (*bits >> col) & 1 == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        mask.put_max(
                            (cursor_x + col * scale + sx) as i32,
                            (origin_y + row as u32 * scale + sy) as i32,
                            1.0,
                        );
                    }
                }
            }
        }

        cursor_x += 8 * scale;
    }
}

/// Render one watermark tile.
///
/// The canvas is sized to the measured text plus the padding the outline
/// needs, then rotated with bilinear sampling into its exact rotated
/// bounding box. The result is fully transparent outside the glyphs.
pub fn render_tile(font: &FontHandle, spec: &TileSpec) -> Result<RgbaImage, WatermarkError> {
    if spec.text.is_empty() {
        return Err(WatermarkError::Render(
            "cannot render empty text".to_string(),
        ));
    }

    let (text_width, text_height) = measure_text(font, &spec.text, spec.font_size);
    let padding = spec.stroke_width + TILE_CANVAS_PADDING;
    let canvas_width = text_width + 2 * padding;
    let canvas_height = text_height + 2 * padding;

    let mut mask = CoverageMask::new(canvas_width, canvas_height);
    match font {
        FontHandle::Outline(face) => {
            rasterize_outline_font(face, &spec.text, spec.font_size, padding, padding, &mut mask);
        }
        FontHandle::Bitmap => {
            rasterize_bitmap_font(&spec.text, spec.font_size, padding, padding, &mut mask);
        }
    }

    let outline = mask.dilate(spec.stroke_width);

    let mut canvas = RgbaImage::new(canvas_width, canvas_height);
    for y in 0..canvas_height {
        for x in 0..canvas_width {
            let outline_coverage = outline.get(x, y);
            let fill_coverage = mask.get(x, y);
            if outline_coverage <= 0.0 && fill_coverage <= 0.0 {
                continue;
            }

            let outline_pixel = with_coverage(spec.stroke, outline_coverage);
            let fill_pixel = with_coverage(spec.fill, fill_coverage);
            canvas.put_pixel(x, y, blend_pixels(outline_pixel, fill_pixel));
        }
    }

    Ok(rotate_expand(&canvas, spec.rotation_degrees))
}

/// Scale a color's alpha by a coverage value.
fn with_coverage(color: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    Rgba([
        color[0],
        color[1],
        color[2],
        (color[3] as f32 * coverage.clamp(0.0, 1.0)) as u8,
    ])
}

/// Rotate an image counter-clockwise, expanding the canvas to the exact
/// rotated bounding box. Sampling is bilinear; pixels that fall outside
/// the source stay transparent.
fn rotate_expand(image: &RgbaImage, degrees: f32) -> RgbaImage {
    let radians = degrees.to_radians();
    let cos = radians.cos();
    let sin = radians.sin();

    let src_w = image.width() as f32;
    let src_h = image.height() as f32;
    let cx = src_w / 2.0;
    let cy = src_h / 2.0;

    // Rotated bounding box from the transformed source corners
    let corners = [
        (-cx, -cy),
        (src_w - cx, -cy),
        (-cx, src_h - cy),
        (src_w - cx, src_h - cy),
    ];

    let mut min_x = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for (x, y) in corners {
        let rx = x * cos - y * sin;
        let ry = x * sin + y * cos;
        min_x = min_x.min(rx);
        max_x = max_x.max(rx);
        min_y = min_y.min(ry);
        max_y = max_y.max(ry);
    }

    // Small epsilon so float fuzz at axis-aligned angles does not grow
    // the box by a pixel
    let dst_w = (((max_x - min_x) - 0.001).ceil() as u32).max(1);
    let dst_h = (((max_y - min_y) - 0.001).ceil() as u32).max(1);

    let mut rotated = RgbaImage::new(dst_w, dst_h);

    let dst_cx = dst_w as f32 / 2.0;
    let dst_cy = dst_h as f32 / 2.0;

    // Inverse rotation for sampling source pixels
    let inv_cos = (-radians).cos();
    let inv_sin = (-radians).sin();

    for dy in 0..dst_h {
        for dx in 0..dst_w {
            let rx = dx as f32 - dst_cx;
            let ry = dy as f32 - dst_cy;

            let sx = rx * inv_cos - ry * inv_sin + cx;
            let sy = rx * inv_sin + ry * inv_cos + cy;

            if sx < 0.0 || sx >= src_w - 1.0 || sy < 0.0 || sy >= src_h - 1.0 {
                continue;
            }

            let x0 = sx.floor() as u32;
            let y0 = sy.floor() as u32;
            let fx = sx - x0 as f32;
            let fy = sy - y0 as f32;

            let p00 = image.get_pixel(x0, y0);
            let p10 = image.get_pixel(x0 + 1, y0);
            let p01 = image.get_pixel(x0, y0 + 1);
            let p11 = image.get_pixel(x0 + 1, y0 + 1);

            let interpolate = |c: usize| -> u8 {
                let v = p00[c] as f32 * (1.0 - fx) * (1.0 - fy)
                    + p10[c] as f32 * fx * (1.0 - fy)
                    + p01[c] as f32 * (1.0 - fx) * fy
                    + p11[c] as f32 * fx * fy;
                v.clamp(0.0, 255.0) as u8
            };

            rotated.put_pixel(
                dx,
                dy,
                Rgba([
                    interpolate(0),
                    interpolate(1),
                    interpolate(2),
                    interpolate(3),
                ]),
            );
        }
    }

    rotated
}
