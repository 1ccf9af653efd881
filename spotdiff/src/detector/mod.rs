//! Difference detection between two equally sized images.
//!
//! The pipeline is a single synchronous pass:
//! luminance → absolute difference → threshold → dilation → connected
//! components → area filter → rank by area → truncate to the target count.

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::Path;

use image::DynamicImage;

use crate::config::{Config, DIFF_THRESHOLD, DILATION_ITERATIONS};
use crate::error::{Error, ImageShape, ImageSlot, Result};
use crate::loader::load_image;
use crate::ops::{CpuOps, ImageOps};
use crate::region::{Component, DifferenceRegion, RankedComponent};

/// Advisory about how the number of surviving regions compares to the
/// requested target. Never aborts a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionCountWarning {
    /// Fewer regions passed the area filter than requested.
    Insufficient { found: usize, target: usize },
    /// More regions passed the area filter than requested; the smallest
    /// ones were dropped.
    Excess { found: usize, target: usize },
}

impl RegionCountWarning {
    fn check(found: usize, target: usize) -> Option<Self> {
        match found.cmp(&target) {
            std::cmp::Ordering::Less => Some(Self::Insufficient { found, target }),
            std::cmp::Ordering::Greater => Some(Self::Excess { found, target }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for RegionCountWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insufficient { found, target } => write!(
                f,
                "only found {} differences (expected {}); try decreasing min_region_area or merge_radius",
                found, target
            ),
            Self::Excess { found, target } => write!(
                f,
                "found {} differences (expected {}); using the {} largest, consider increasing min_region_area or merge_radius",
                found, target, target
            ),
        }
    }
}

/// Result of one detection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Regions ordered by component area, largest first.
    pub regions: Vec<DifferenceRegion>,
    /// Number of components that passed the area filter, before truncation.
    pub candidates: usize,
    /// Set when `candidates` differs from the configured target count.
    pub warning: Option<RegionCountWarning>,
}

impl Detection {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.regions.len()
    }
}

/// Finds ranked difference regions between image pairs.
///
/// Holds no per-call state; one detector can serve many threads.
#[derive(Debug, Clone, Default)]
pub struct DifferenceDetector<O: ImageOps = CpuOps> {
    ops: O,
}

impl DifferenceDetector<CpuOps> {
    pub fn new() -> Self {
        Self { ops: CpuOps }
    }
}

impl<O: ImageOps> DifferenceDetector<O> {
    /// Detector backed by a custom [`ImageOps`] implementation.
    pub fn with_ops(ops: O) -> Self {
        Self { ops }
    }

    /// Compare two decoded images.
    ///
    /// Fails without a partial result when the config is invalid or the
    /// images differ in shape.
    pub fn detect(
        &self,
        image1: &DynamicImage,
        image2: &DynamicImage,
        config: &Config,
    ) -> Result<Detection> {
        config.validate()?;

        let first = ImageShape::of(image1);
        let second = ImageShape::of(image2);
        if first != second {
            return Err(Error::DimensionMismatch { first, second });
        }

        tracing::debug!(
            width = first.width,
            height = first.height,
            channels = first.channels,
            min_region_area = config.min_region_area,
            merge_radius = config.merge_radius,
            target_count = config.target_count,
            "Detecting differences"
        );

        let components = self.extract_components(image1, image2, config.merge_radius);
        let total = components.len();
        let ranked = rank_components(components, config.min_region_area);
        let candidates = ranked.len();

        let regions: Vec<DifferenceRegion> = ranked
            .into_iter()
            .take(config.target_count)
            .map(DifferenceRegion::from)
            .collect();

        tracing::info!(
            components = total,
            candidates,
            regions = regions.len(),
            "Found {} differences (using top {})",
            candidates,
            regions.len()
        );

        let warning = RegionCountWarning::check(candidates, config.target_count);
        if let Some(warning) = &warning {
            tracing::warn!("{}", warning);
        }

        Ok(Detection {
            regions,
            candidates,
            warning,
        })
    }

    /// Load both images from disk and compare them.
    pub fn detect_files(
        &self,
        path1: impl AsRef<Path>,
        path2: impl AsRef<Path>,
        config: &Config,
    ) -> Result<Detection> {
        let image1 = load_image(path1, ImageSlot::First)?;
        let image2 = load_image(path2, ImageSlot::Second)?;
        self.detect(&image1, &image2, config)
    }

    /// Luminance, difference mask, dilation and labeling.
    pub(crate) fn extract_components(
        &self,
        image1: &DynamicImage,
        image2: &DynamicImage,
        merge_radius: usize,
    ) -> Vec<Component> {
        let luma1 = self.ops.luma(image1);
        let luma2 = self.ops.luma(image2);

        let changed = self.ops.threshold_diff(&luma1, &luma2, DIFF_THRESHOLD);
        tracing::debug!(changed_pixels = changed.count_ones(), "Thresholded difference");

        let mut merged = changed.clone();
        for _ in 0..DILATION_ITERATIONS {
            merged = self.ops.dilate(&merged, merge_radius);
        }

        self.ops.components(&merged, &changed)
    }
}

/// Drop components smaller than `min_area` and sort the rest by area,
/// largest first.
///
/// The sort is stable: equal areas keep the labeling scan order. Callers
/// must not rely on that tie order.
pub(crate) fn rank_components(components: Vec<Component>, min_area: usize) -> Vec<RankedComponent> {
    let mut ranked: Vec<RankedComponent> = components
        .into_iter()
        .filter(|c| c.area >= min_area)
        .map(RankedComponent::from)
        .collect();
    ranked.sort_by(|a, b| b.area.cmp(&a.area));
    ranked
}

/// Compare two images with the default CPU backend.
pub fn detect(image1: &DynamicImage, image2: &DynamicImage, config: &Config) -> Result<Detection> {
    DifferenceDetector::new().detect(image1, image2, config)
}
