//! Connected component extraction using run-length encoding and union-find.
//!
//! Rows of the merged mask are split into horizontal runs of set pixels. Runs
//! that touch a run on the previous row (8-connectivity) share a label. Labels
//! are handed out in raster order and every union keeps the smaller root, so a
//! component's final label is the one of its first run in scan order. That
//! gives a stable component order without a second pass over the pixels.
//!
//! Only outer components are reported. The gaps between foreground runs are
//! labeled as 4-connected background; background that never reaches the
//! image border is a hole, and any component sitting inside a hole is folded
//! into the outer component that encloses it.


use common::BitBuffer2;

use crate::region::{Aabb, Component};

/// Pixel adjacency used when merging runs of neighbouring rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connectivity {
    /// Edge neighbours only. Used for background.
    Four,
    /// Edge and corner neighbours. Used for foreground.
    Eight,
}

/// A horizontal run of set pixels on one row.
#[derive(Debug, Clone, Copy)]
pub(super) struct Run {
    start: u32, // inclusive
    end: u32,   // exclusive
    label: u32,
}

impl Run {
    /// Window of previous-row x positions a run can touch.
    #[inline]
    fn search_window(&self, connectivity: Connectivity) -> (u32, u32) {
        match connectivity {
            Connectivity::Four => (self.start, self.end),
            Connectivity::Eight => (self.start.saturating_sub(1), self.end + 1),
        }
    }
}

/// Whether two runs on adjacent rows touch.
#[inline]
fn runs_connected(prev: &Run, curr: &Run, connectivity: Connectivity) -> bool {
    match connectivity {
        Connectivity::Four => prev.start < curr.end && prev.end > curr.start,
        Connectivity::Eight => prev.start < curr.end + 1 && prev.end + 1 > curr.start,
    }
}

/// Extract runs from one row of packed mask words.
///
/// Fully empty and fully set words are skipped whole; mixed words are walked
/// with trailing-zero counts.
pub(super) fn extract_runs_from_row(row: &[u64], width: usize, runs: &mut Vec<Run>) {
    let width = width as u32;
    let mut in_run = false;
    let mut run_start = 0u32;

    for (word_idx, &word) in row.iter().enumerate() {
        let base_x = word_idx as u32 * 64;

        if word == 0 {
            if in_run {
                runs.push(Run {
                    start: run_start,
                    end: base_x.min(width),
                    label: 0,
                });
                in_run = false;
            }
            continue;
        }

        if word == !0u64 {
            if !in_run {
                run_start = base_x;
                in_run = true;
            }
            continue;
        }

        let word_end = (base_x + 64).min(width);
        let mut pos = base_x;
        while pos < word_end {
            let remaining = word >> (pos - base_x);
            if in_run {
                let end_pos = pos + (!remaining).trailing_zeros();
                if end_pos >= word_end {
                    break;
                }
                runs.push(Run {
                    start: run_start,
                    end: end_pos,
                    label: 0,
                });
                in_run = false;
                pos = end_pos;
            } else {
                if remaining == 0 {
                    break;
                }
                let start_pos = pos + remaining.trailing_zeros();
                if start_pos >= word_end {
                    break;
                }
                run_start = start_pos;
                in_run = true;
                pos = start_pos;
            }
        }
    }

    if in_run {
        runs.push(Run {
            start: run_start,
            end: width,
            label: 0,
        });
    }
}

/// Assign labels to `curr_runs`, merging with touching runs in `prev_runs`.
fn merge_runs_with_prev(
    curr_runs: &mut [Run],
    prev_runs: &[Run],
    connectivity: Connectivity,
    uf: &mut UnionFind,
) {
    let mut prev_idx = 0;
    for run in curr_runs.iter_mut() {
        let (search_start, search_end) = run.search_window(connectivity);

        while prev_idx < prev_runs.len() && prev_runs[prev_idx].end <= search_start {
            prev_idx += 1;
        }

        let mut assigned_label = None;
        let mut check_idx = prev_idx;
        while check_idx < prev_runs.len() && prev_runs[check_idx].start < search_end {
            let prev_run = &prev_runs[check_idx];
            if runs_connected(prev_run, run, connectivity) {
                match assigned_label {
                    Some(label) if label != prev_run.label => uf.union(label, prev_run.label),
                    None => assigned_label = Some(prev_run.label),
                    _ => {}
                }
            }
            check_idx += 1;
        }

        run.label = assigned_label.unwrap_or_else(|| uf.make_set());
    }
}

/// Gaps between the foreground runs of one row, as background runs.
fn complement_runs(foreground: &[Run], width: u32, out: &mut Vec<Run>) {
    let mut x = 0;
    for run in foreground {
        if run.start > x {
            out.push(Run {
                start: x,
                end: run.start,
                label: 0,
            });
        }
        x = run.end;
    }
    if x < width {
        out.push(Run {
            start: x,
            end: width,
            label: 0,
        });
    }
}

/// Number of set bits in `[start, end)` of one packed row.
fn count_ones_in_range(row: &[u64], start: usize, end: usize) -> usize {
    if start >= end {
        return 0;
    }
    let first_word = start / 64;
    let last_word = (end - 1) / 64;

    let mut count = 0;
    for (word_idx, &word) in row.iter().enumerate().take(last_word + 1).skip(first_word) {
        let mut bits = word;
        if word_idx == first_word {
            bits &= !0u64 << (start % 64);
        }
        if word_idx == last_word {
            let tail = end - last_word * 64;
            if tail < 64 {
                bits &= (1u64 << tail) - 1;
            }
        }
        count += bits.count_ones() as usize;
    }
    count
}

/// Runs of every row stored back to back, with per-row offsets.
#[derive(Debug)]
struct RunRows {
    runs: Vec<Run>,
    offsets: Vec<usize>,
}

impl RunRows {
    fn with_height(height: usize) -> Self {
        let mut offsets = Vec::with_capacity(height + 1);
        offsets.push(0);
        Self {
            runs: Vec::new(),
            offsets,
        }
    }

    fn push_row(&mut self, row: &[Run]) {
        self.runs.extend_from_slice(row);
        self.offsets.push(self.runs.len());
    }

    #[inline]
    fn row(&self, y: usize) -> &[Run] {
        &self.runs[self.offsets[y]..self.offsets[y + 1]]
    }

    /// Run on row `y` covering column `x`, if any.
    fn run_at(&self, x: u32, y: usize) -> Option<&Run> {
        let row = self.row(y);
        let idx = row.partition_point(|r| r.end <= x);
        row.get(idx).filter(|r| r.start <= x)
    }

    /// Label every run, merging with the previous row under `connectivity`.
    fn label(&mut self, connectivity: Connectivity, uf: &mut UnionFind) {
        for y in 0..self.offsets.len() - 1 {
            let (before, rest) = self.runs.split_at_mut(self.offsets[y]);
            let curr = &mut rest[..self.offsets[y + 1] - self.offsets[y]];
            let prev = if y == 0 {
                &before[..0]
            } else {
                &before[self.offsets[y - 1]..]
            };
            merge_runs_with_prev(curr, prev, connectivity, uf);
        }
    }
}

/// Label the merged mask and return one [`Component`] per outer region,
/// ordered by the position of each component's first pixel in raster scan.
///
/// Bounding boxes come from `merged`. Areas count the `changed` pixels that
/// fall inside each region, including those of components folded in from
/// its holes.
pub(crate) fn label_components(merged: &BitBuffer2, changed: &BitBuffer2) -> Vec<Component> {
    assert_eq!(merged.width(), changed.width(), "width mismatch");
    assert_eq!(merged.height(), changed.height(), "height mismatch");

    let width = merged.width();
    let height = merged.height();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut foreground = RunRows::with_height(height);
    let mut background = RunRows::with_height(height);
    let mut row_runs: Vec<Run> = Vec::with_capacity(width / 4);
    let mut gap_runs: Vec<Run> = Vec::with_capacity(width / 4);

    for y in 0..height {
        row_runs.clear();
        gap_runs.clear();
        extract_runs_from_row(merged.row_words(y), width, &mut row_runs);
        complement_runs(&row_runs, width as u32, &mut gap_runs);
        foreground.push_row(&row_runs);
        background.push_row(&gap_runs);
    }

    let mut fg_uf = UnionFind::new();
    foreground.label(Connectivity::Eight, &mut fg_uf);
    let mut bg_uf = UnionFind::new();
    background.label(Connectivity::Four, &mut bg_uf);

    // Background reaching the border is outside every component.
    let mut outside = vec![false; bg_uf.len() + 1];
    for y in 0..height {
        for run in background.row(y) {
            if y == 0 || y == height - 1 || run.start == 0 || run.end as usize == width {
                let root = bg_uf.find(run.label) as usize;
                outside[root] = true;
            }
        }
    }

    // Accumulate per root; roots are the smallest label of each component.
    let mut stats: Vec<Option<Component>> = vec![None; fg_uf.len() + 1];
    let mut first_pixel: Vec<(u32, usize)> = vec![(0, 0); fg_uf.len() + 1];
    for y in 0..height {
        let changed_row = changed.row_words(y);
        for run in foreground.row(y) {
            let root = fg_uf.find(run.label) as usize;
            let component = stats[root].get_or_insert_with(|| {
                first_pixel[root] = (run.start, y);
                Component {
                    bbox: Aabb::empty(),
                    area: 0,
                }
            });
            component
                .bbox
                .include_run(run.start as usize, run.end as usize, y);
            component.area +=
                count_ones_in_range(changed_row, run.start as usize, run.end as usize);
        }
    }

    // A component is outer when the pixel above its first pixel is outside
    // background. Anything else sits in a hole of another component.
    let mut is_outer = vec![false; stats.len()];
    for (root, component) in stats.iter().enumerate() {
        if component.is_none() {
            continue;
        }
        let (x, y) = first_pixel[root];
        is_outer[root] = y == 0
            || background
                .run_at(x, y - 1)
                .is_some_and(|run| outside[bg_uf.find(run.label) as usize]);
    }

    // Fold nested components into the first outer component straight above
    // them; a ray leaving a hole must cross the component that encloses it.
    for root in 0..stats.len() {
        if is_outer[root] {
            continue;
        }
        let Some(nested) = stats[root] else {
            continue;
        };
        let (x, y) = first_pixel[root];
        let enclosing = (0..y).rev().find_map(|yy| {
            let run = foreground.run_at(x, yy)?;
            let candidate = fg_uf.find(run.label) as usize;
            is_outer[candidate].then_some(candidate)
        });

        match enclosing {
            Some(outer_root) => {
                if let Some(outer) = stats[outer_root].as_mut() {
                    outer.bbox.union(&nested.bbox);
                    outer.area += nested.area;
                }
                stats[root] = None;
            }
            None => is_outer[root] = true,
        }
    }

    stats
        .into_iter()
        .zip(is_outer)
        .filter_map(|(component, outer)| component.filter(|_| outer))
        .collect()
}

/// Union-find over 1-based labels. Roots are always the smallest label
/// of their set.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        Self {
            parent: Vec::with_capacity(256),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    fn make_set(&mut self) -> u32 {
        let label = self.parent.len() as u32 + 1;
        self.parent.push(label);
        label
    }

    /// Find root with two-pass path compression.
    fn find(&mut self, label: u32) -> u32 {
        let mut root = label;
        while self.parent[(root - 1) as usize] != root {
            root = self.parent[(root - 1) as usize];
        }

        let mut current = label;
        while current != root {
            let next = self.parent[(current - 1) as usize];
            self.parent[(current - 1) as usize] = root;
            current = next;
        }

        root
    }

    fn union(&mut self, a: u32, b: u32) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        let (keep, merge) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[(merge - 1) as usize] = keep;
    }
}
