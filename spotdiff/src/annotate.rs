//! Preview rendering of detected regions.
//!
//! Draws numbered outlines on copies of both images and places them side by
//! side. Purely a consumer of a detection result.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::region::DifferenceRegion;

/// Outline color.
pub const OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels.
const OUTLINE_THICKNESS: u32 = 3;

/// Previews taller than this are scaled down, keeping aspect ratio.
pub const MAX_PREVIEW_HEIGHT: u32 = 800;

/// Size of one glyph cell in pixels.
const GLYPH_SCALE: u32 = 4;

/// 3x5 digit glyphs, one row per byte, low 3 bits, MSB on the left.
const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Render both images with numbered region outlines, side by side.
///
/// Region numbers start at 1 and follow the order of `regions`.
pub fn render_preview(
    image1: &DynamicImage,
    image2: &DynamicImage,
    regions: &[DifferenceRegion],
) -> RgbImage {
    let mut marked1 = image1.to_rgb8();
    let mut marked2 = image2.to_rgb8();
    mark_regions(&mut marked1, regions);
    mark_regions(&mut marked2, regions);

    let marked1 = fit_height(marked1, MAX_PREVIEW_HEIGHT);
    let marked2 = fit_height(marked2, MAX_PREVIEW_HEIGHT);

    let height = marked1.height().max(marked2.height());
    let mut combined = RgbImage::new(marked1.width() + marked2.width(), height);
    imageops::replace(&mut combined, &marked1, 0, 0);
    imageops::replace(&mut combined, &marked2, marked1.width() as i64, 0);

    tracing::debug!(
        width = combined.width(),
        height = combined.height(),
        regions = regions.len(),
        "Rendered preview"
    );

    combined
}

/// Draw numbered outlines for `regions` onto `image` in place.
pub fn mark_regions(image: &mut RgbImage, regions: &[DifferenceRegion]) {
    for (i, region) in regions.iter().enumerate() {
        for inset in 0..OUTLINE_THICKNESS {
            let w = region.width.saturating_sub(2 * inset);
            let h = region.height.saturating_sub(2 * inset);
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32).of_size(w, h);
            draw_hollow_rect_mut(image, rect, OUTLINE_COLOR);
        }

        draw_number(image, i + 1, region.x + 5, region.y + 5);
    }
}

fn draw_number(image: &mut RgbImage, number: usize, x: u32, y: u32) {
    let digits = number.to_string();
    for (i, ch) in digits.bytes().enumerate() {
        let glyph = &DIGITS[(ch - b'0') as usize];
        let origin_x = x + i as u32 * 4 * GLYPH_SCALE;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) == 0 {
                    continue;
                }
                let rect = Rect::at(
                    (origin_x + col * GLYPH_SCALE) as i32,
                    (y + row as u32 * GLYPH_SCALE) as i32,
                )
                .of_size(GLYPH_SCALE, GLYPH_SCALE);
                draw_filled_rect_mut(image, rect, OUTLINE_COLOR);
            }
        }
    }
}

fn fit_height(image: RgbImage, max_height: u32) -> RgbImage {
    if image.height() <= max_height {
        return image;
    }
    let scale = max_height as f64 / image.height() as f64;
    let width = ((image.width() as f64 * scale) as u32).max(1);
    imageops::resize(&image, width, max_height, FilterType::Triangle)
}
