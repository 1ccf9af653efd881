//! Region types: the public [`DifferenceRegion`] and the internal ranking record.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with inclusive `usize` pixel bounds.
///
/// A pixel at (x, y) is inside if `x_min <= x <= x_max` and
/// `y_min <= y <= y_max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

impl Aabb {
    #[inline]
    pub const fn new(x_min: usize, x_max: usize, y_min: usize, y_max: usize) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Inverted bounds, so the first `include_run` sets the real ones.
    #[inline]
    pub const fn empty() -> Self {
        Self {
            x_min: usize::MAX,
            x_max: 0,
            y_min: usize::MAX,
            y_max: 0,
        }
    }

    /// Expand to cover the horizontal run `[x_start, x_end)` on row `y`.
    #[inline]
    pub fn include_run(&mut self, x_start: usize, x_end: usize, y: usize) {
        debug_assert!(x_end > x_start);
        self.x_min = self.x_min.min(x_start);
        self.x_max = self.x_max.max(x_end - 1);
        self.y_min = self.y_min.min(y);
        self.y_max = self.y_max.max(y);
    }

    /// Merge another box into this one.
    #[inline]
    pub fn union(&mut self, other: &Aabb) {
        self.x_min = self.x_min.min(other.x_min);
        self.x_max = self.x_max.max(other.x_max);
        self.y_min = self.y_min.min(other.y_min);
        self.y_max = self.y_max.max(other.y_max);
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min) + 1
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min) + 1
    }
}

/// One merged region of the difference mask, as produced by labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub bbox: Aabb,
    /// Number of changed pixels inside the region, counted before dilation.
    pub area: usize,
}

/// A component that survived the area filter, kept while ranking.
///
/// `area` only exists for sorting; it never crosses the public boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RankedComponent {
    pub bbox: Aabb,
    pub area: usize,
}

impl From<Component> for RankedComponent {
    fn from(component: Component) -> Self {
        Self {
            bbox: component.bbox,
            area: component.area,
        }
    }
}

/// A rectangle flagged as differing between the two images.
///
/// `(x, y)` is the top-left corner in pixel coordinates. Width and height
/// are always positive and the rectangle lies inside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifferenceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl DifferenceRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether `other` lies fully inside this region.
    pub const fn contains(&self, other: &DifferenceRegion) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl From<RankedComponent> for DifferenceRegion {
    fn from(ranked: RankedComponent) -> Self {
        let bbox = ranked.bbox;
        Self {
            x: bbox.x_min as u32,
            y: bbox.y_min as u32,
            width: bbox.width() as u32,
            height: bbox.height() as u32,
        }
    }
}
