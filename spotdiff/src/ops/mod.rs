//! Low-level image operations used by the detector.
//!
//! The detector only needs four transformations: luminance conversion,
//! thresholded absolute difference, square dilation and connected component
//! extraction. [`ImageOps`] names them so another backend can be swapped in;
//! [`CpuOps`] is the single-threaded default.

pub(crate) mod dilation;
pub(crate) mod labeling;
pub(crate) mod luma;
pub(crate) mod threshold;

use common::{BitBuffer2, Buffer2};
use image::DynamicImage;

use crate::region::Component;

pub trait ImageOps {
    /// Single-channel 8-bit luminance of `image`.
    fn luma(&self, image: &DynamicImage) -> Buffer2<u8>;

    /// Mask of pixels where `|a - b| > threshold`.
    fn threshold_diff(&self, a: &Buffer2<u8>, b: &Buffer2<u8>, threshold: u8) -> BitBuffer2;

    /// Square dilation: every set pixel grows by `radius` in each direction.
    fn dilate(&self, mask: &BitBuffer2, radius: usize) -> BitBuffer2;

    /// Outer 8-connected components of `merged` in raster scan order.
    ///
    /// Boxes span the merged pixels; areas count the `changed` pixels inside
    /// each component. Components enclosed by another are folded into it.
    fn components(&self, merged: &BitBuffer2, changed: &BitBuffer2) -> Vec<Component>;
}

/// Portable scalar implementation of [`ImageOps`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuOps;

impl ImageOps for CpuOps {
    fn luma(&self, image: &DynamicImage) -> Buffer2<u8> {
        luma::to_luma(image)
    }

    fn threshold_diff(&self, a: &Buffer2<u8>, b: &Buffer2<u8>, threshold: u8) -> BitBuffer2 {
        threshold::threshold_abs_diff(a, b, threshold)
    }

    fn dilate(&self, mask: &BitBuffer2, radius: usize) -> BitBuffer2 {
        let mut output = BitBuffer2::new_filled(mask.width(), mask.height(), false);
        dilation::dilate_mask(mask, radius, &mut output);
        output
    }

    fn components(&self, merged: &BitBuffer2, changed: &BitBuffer2) -> Vec<Component> {
        labeling::label_components(merged, changed)
    }
}
