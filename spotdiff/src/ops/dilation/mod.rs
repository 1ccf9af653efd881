//! Morphological dilation for binary masks.
//!
//! Merges nearby changed pixels that belong to the same edit (an outline
//! broken up by anti-aliasing, a recolored object with a flat interior) so
//! they come out as one region.


use common::BitBuffer2;

/// Dilate a binary mask with a `(2 * radius + 1)` square structuring element.
///
/// Separable: a horizontal pass over packed words followed by a vertical
/// sliding-window pass over word columns. Pixels outside the image are
/// treated as unset, so growth is clipped at the border.
pub(crate) fn dilate_mask(mask: &BitBuffer2, radius: usize, output: &mut BitBuffer2) {
    assert_eq!(mask.width(), output.width(), "width mismatch");
    assert_eq!(mask.height(), output.height(), "height mismatch");

    if radius == 0 {
        output.words_mut().copy_from_slice(mask.words());
        return;
    }

    let width = mask.width();
    let height = mask.height();
    let words_per_row = mask.words_per_row();
    if width == 0 || height == 0 {
        return;
    }
    // Growth past the larger side already covers the whole image.
    let radius = radius.min(width.max(height));
    let tail_mask = mask.tail_mask();

    // Horizontal pass
    {
        let output_words = output.words_mut();
        for y in 0..height {
            let row = mask.row_words(y);
            let row_start = y * words_per_row;

            for word_idx in 0..words_per_row {
                let mut result = if radius <= 63 {
                    dilate_word_fast(row, word_idx, radius)
                } else {
                    dilate_word_slow(row, word_idx, width, radius)
                };

                if word_idx + 1 == words_per_row {
                    result &= tail_mask;
                }

                output_words[row_start + word_idx] = result;
            }
        }
    }

    // Vertical pass
    let output_words = output.words_mut();
    let mut column = vec![0u64; height];
    let mut dilated = vec![0u64; height];

    for word_idx in 0..words_per_row {
        for (y, col) in column.iter_mut().enumerate() {
            *col = output_words[y * words_per_row + word_idx];
        }

        dilate_column_sliding(&column, &mut dilated, radius);

        for (y, &val) in dilated.iter().enumerate() {
            output_words[y * words_per_row + word_idx] = val;
        }
    }
}

/// Vertical dilation of one word column.
///
/// `output[y]` is the OR of `column[y - radius..=y + radius]`, clipped to the
/// column. The window OR is updated incrementally and only recomputed when a
/// non-zero word leaves the window, which keeps sparse masks linear.
fn dilate_column_sliding(column: &[u64], output: &mut [u64], radius: usize) {
    let height = column.len();
    if height == 0 {
        return;
    }

    let mut window_or = column[..=radius.min(height - 1)]
        .iter()
        .fold(0u64, |acc, &v| acc | v);
    output[0] = window_or;

    for y in 1..height {
        if y > radius && column[y - radius - 1] != 0 {
            let y_min = y - radius;
            let y_max = y.saturating_add(radius).min(height - 1);
            window_or = column[y_min..=y_max].iter().fold(0u64, |acc, &v| acc | v);
        } else if y.saturating_add(radius) < height {
            window_or |= column[y + radius];
        }

        output[y] = window_or;
    }
}

/// Horizontal dilation of one word using bit smearing (radius <= 63).
#[inline]
fn dilate_word_fast(row: &[u64], word_idx: usize, radius: usize) -> u64 {
    let current = row[word_idx];
    let mut result = current;

    for shift in 1..=radius {
        result |= current << shift;
        result |= current >> shift;
    }

    // Left neighbour reaches into our low bits
    if word_idx > 0 {
        let prev = row[word_idx - 1];
        if prev != 0 {
            for shift in 1..=radius {
                result |= prev >> (64 - shift);
            }
        }
    }

    // Right neighbour reaches into our high bits
    if word_idx + 1 < row.len() {
        let next = row[word_idx + 1];
        if next != 0 {
            for shift in 1..=radius {
                result |= next << (64 - shift);
            }
        }
    }

    result
}

/// Horizontal dilation of one word by per-bit range checks (radius > 63).
fn dilate_word_slow(row: &[u64], word_idx: usize, width: usize, radius: usize) -> u64 {
    let base_x = word_idx * 64;
    let mut result = 0u64;

    for bit in 0..64usize {
        let x = base_x + bit;
        if x >= width {
            break;
        }

        let x_min = x.saturating_sub(radius);
        let x_max = x.saturating_add(radius).min(width - 1);

        if has_set_bit_in_range(row, x_min, x_max) {
            result |= 1u64 << bit;
        }
    }

    result
}

/// Whether any bit in `[x_min, x_max]` is set.
fn has_set_bit_in_range(row: &[u64], x_min: usize, x_max: usize) -> bool {
    let word_min = x_min / 64;
    let word_max = (x_max / 64).min(row.len() - 1);

    for (i, &word) in row[word_min..=word_max].iter().enumerate() {
        if word == 0 {
            continue;
        }

        let word_start = (word_min + i) * 64;
        let bit_start = x_min.saturating_sub(word_start);
        let bit_end = (x_max - word_start).min(63);

        let mask = if bit_end >= 63 {
            !0u64 << bit_start
        } else {
            ((1u64 << (bit_end + 1)) - 1) & (!0u64 << bit_start)
        };

        if word & mask != 0 {
            return true;
        }
    }

    false
}
