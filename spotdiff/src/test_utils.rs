//! Synthetic image pairs for tests.

use image::{DynamicImage, Rgb, RgbImage};

pub const BACKGROUND: Rgb<u8> = Rgb([40, 120, 200]);
pub const EDIT: Rgb<u8> = Rgb([250, 250, 20]);

/// Solid-color RGB image.
pub fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
}

/// Copy of `base` with each `(x, y, w, h)` block painted in `color`.
pub fn with_blocks(base: &DynamicImage, blocks: &[(u32, u32, u32, u32)], color: Rgb<u8>) -> DynamicImage {
    let mut img = base.to_rgb8();
    for &(bx, by, bw, bh) in blocks {
        for y in by..by + bh {
            for x in bx..bx + bw {
                img.put_pixel(x, y, color);
            }
        }
    }
    DynamicImage::ImageRgb8(img)
}

/// A background image and its edited twin.
pub fn edited_pair(
    width: u32,
    height: u32,
    blocks: &[(u32, u32, u32, u32)],
) -> (DynamicImage, DynamicImage) {
    let base = solid_image(width, height, BACKGROUND);
    let edited = with_blocks(&base, blocks, EDIT);
    (base, edited)
}
