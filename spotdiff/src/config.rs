//! Configuration for difference detection.
//!
//! [`Config`] is immutable for the duration of one detection run. The
//! binarization threshold and the number of dilation passes are fixed
//! constants of the pipeline and live here next to the tunable fields.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Luminance difference above which a pixel counts as changed.
/// Separates compression noise and slight lighting shifts from real edits.
pub const DIFF_THRESHOLD: u8 = 30;

/// Number of dilation passes applied to the change mask.
pub const DILATION_ITERATIONS: usize = 1;

/// Parameters for one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Components with fewer changed pixels than this are dropped as noise.
    pub min_region_area: usize,
    /// Dilation distance in pixels. Changed pixels closer than
    /// `2 * merge_radius` end up in the same region.
    pub merge_radius: usize,
    /// Maximum number of regions returned, largest first.
    pub target_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_region_area: 900,
            merge_radius: 50,
            target_count: 5,
        }
    }
}

impl Config {
    /// Fewer, larger regions for busy images with scattered edits.
    pub fn coarse() -> Self {
        Self {
            min_region_area: 1600,
            merge_radius: 80,
            ..Self::default()
        }
    }

    /// Smaller regions for small images or tightly packed edits.
    pub fn fine() -> Self {
        Self {
            min_region_area: 400,
            merge_radius: 20,
            ..Self::default()
        }
    }

    /// Reject non-positive parameters.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("min_region_area", self.min_region_area),
            ("merge_radius", self.merge_radius),
            ("target_count", self.target_count),
        ];
        for (parameter, value) in fields {
            if value == 0 {
                return Err(Error::InvalidConfig { parameter, value });
            }
        }
        Ok(())
    }
}
