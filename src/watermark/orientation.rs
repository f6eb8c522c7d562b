//! Camera orientation normalization.
//!
//! Phone cameras record the sensor data as captured and store the display
//! rotation in an EXIF tag. The watermark must be applied to the upright
//! pixels, so the pipeline corrects orientation before anything else.
//!
//! Detection is total: missing metadata, unreadable metadata, or a
//! container without EXIF all mean "no correction needed". It never fails
//! a request.

use exif::{In, Tag};
use image::DynamicImage;
use std::io::Cursor;

/// Rotation needed to display an image upright, in counter-clockwise
/// degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationCorrection {
    None,
    Rotate90,
    Rotate180,
    Rotate270,
}

/// Read the EXIF orientation tag from encoded image bytes.
///
/// Only the three rotation-only orientation values are corrected; mirrored
/// variants and unknown values are treated as upright.
pub fn detect(bytes: &[u8]) -> OrientationCorrection {
    let mut cursor = Cursor::new(bytes);

    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return OrientationCorrection::None,
    };

    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));

    match orientation {
        Some(3) => OrientationCorrection::Rotate180,
        Some(6) => OrientationCorrection::Rotate270,
        Some(8) => OrientationCorrection::Rotate90,
        _ => OrientationCorrection::None,
    }
}

/// Rotate the decoded pixels so the image displays upright.
///
/// The image crate's rotations are clockwise, so the counter-clockwise
/// corrections map to their complements.
pub fn apply(image: DynamicImage, correction: OrientationCorrection) -> DynamicImage {
    match correction {
        OrientationCorrection::None => image,
        OrientationCorrection::Rotate90 => image.rotate270(),
        OrientationCorrection::Rotate180 => image.rotate180(),
        OrientationCorrection::Rotate270 => image.rotate90(),
    }
}
