//! RGB to luminance conversion.

use common::Buffer2;
use image::DynamicImage;

/// BT.601 weights in 14-bit fixed point; they sum to `1 << 14`.
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;
const ROUND: u32 = 1 << (SHIFT - 1);

/// Weighted luminance of a single 8-bit RGB pixel.
#[inline]
pub(crate) fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT + ROUND) >> SHIFT) as u8
}

/// Convert any decoded image to an 8-bit luminance grid.
///
/// Alpha is ignored. Gray 8-bit input is copied as-is; everything else is
/// reduced to 8-bit RGB first.
pub(crate) fn to_luma(image: &DynamicImage) -> Buffer2<u8> {
    let width = image.width() as usize;
    let height = image.height() as usize;

    if let DynamicImage::ImageLuma8(gray) = image {
        return Buffer2::new(width, height, gray.as_raw().clone());
    }

    let rgb = image.to_rgb8();
    let pixels = rgb
        .pixels()
        .map(|p| rgb_to_luma(p.0[0], p.0[1], p.0[2]))
        .collect();
    Buffer2::new(width, height, pixels)
}
