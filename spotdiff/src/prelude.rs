//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use spotdiff::prelude::*;
//! ```

pub use crate::{Config, Detection, DifferenceDetector, DifferenceRegion, Error, detect};

pub use crate::{Catalog, Difficulty, PuzzleSet, render_preview};
