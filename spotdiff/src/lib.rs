//! Spotdiff - difference region detection for spot-the-difference puzzles.
//!
//! Given two images of the same scene that differ in a handful of edited
//! areas, the detector returns up to `target_count` axis-aligned rectangles
//! covering those areas, largest first.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spotdiff::{Config, DifferenceDetector};
//!
//! let detector = DifferenceDetector::new();
//! let detection = detector.detect_files("image1.png", "image2.png", &Config::default())?;
//!
//! for region in &detection.regions {
//!     println!("{} {} {} {}", region.x, region.y, region.width, region.height);
//! }
//! ```

pub mod annotate;
pub mod catalog;
mod config;
mod detector;
mod error;
pub mod loader;
pub mod ops;
mod region;

#[cfg(test)]
mod test_utils;

pub mod prelude;

// ============================================================================
// Detection
// ============================================================================

pub use config::{Config, DIFF_THRESHOLD, DILATION_ITERATIONS};
pub use detector::{Detection, DifferenceDetector, RegionCountWarning, detect};
pub use error::{Error, ImageShape, ImageSlot, Result};
pub use ops::{CpuOps, ImageOps};
pub use region::{Aabb, Component, DifferenceRegion};

// ============================================================================
// Catalog and output
// ============================================================================

pub use annotate::render_preview;
pub use catalog::{Catalog, Difficulty, PuzzleSet, Upsert};
pub use loader::load_image;
