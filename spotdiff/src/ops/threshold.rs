//! Absolute difference + binary threshold into a packed mask.

use common::{BitBuffer2, Buffer2};

/// Mask of pixels whose luminance differs by strictly more than `threshold`.
///
/// Packs 64 pixels per word while scanning each row once.
pub(crate) fn threshold_abs_diff(a: &Buffer2<u8>, b: &Buffer2<u8>, threshold: u8) -> BitBuffer2 {
    assert_eq!(a.width(), b.width(), "width mismatch");
    assert_eq!(a.height(), b.height(), "height mismatch");

    let width = a.width();
    let height = a.height();
    let mut mask = BitBuffer2::new_filled(width, height, false);
    let words_per_row = mask.words_per_row();
    let words = mask.words_mut();

    for y in 0..height {
        let row_words = &mut words[y * words_per_row..(y + 1) * words_per_row];
        let pairs = a.row(y).chunks(64).zip(b.row(y).chunks(64));
        for (word, (chunk_a, chunk_b)) in row_words.iter_mut().zip(pairs) {
            let mut bits = 0u64;
            for (bit, (&pa, &pb)) in chunk_a.iter().zip(chunk_b).enumerate() {
                if pa.abs_diff(pb) > threshold {
                    bits |= 1u64 << bit;
                }
            }
            *word = bits;
        }
    }

    mask
}
