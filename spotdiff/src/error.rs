//! Error types for difference detection.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the two compared images an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    First,
    Second,
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSlot::First => write!(f, "image 1"),
            ImageSlot::Second => write!(f, "image 2"),
        }
    }
}

/// Pixel grid shape of an image: dimensions and channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl ImageShape {
    pub fn of(image: &image::DynamicImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            channels: image.color().channel_count(),
        }
    }
}

impl fmt::Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}

/// Errors that abort a detection call. No partial result is produced.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to load {slot} '{}': {source}", path.display())]
    Load {
        slot: ImageSlot,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image dimensions don't match: image 1 is {first}, image 2 is {second}")]
    DimensionMismatch {
        first: ImageShape,
        second: ImageShape,
    },

    #[error("Invalid config: {parameter} must be positive, got {value}")]
    InvalidConfig {
        parameter: &'static str,
        value: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
