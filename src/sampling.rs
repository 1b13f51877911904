//! Shuffle and sampling primitives shared by every trial generator.
//!
//! All functions take the RNG explicitly so a session can be replayed from a
//! seed, and none of them touch their input: generators own static tables
//! and must never have them reordered between calls.

use anyhow::{bail, Result};
use rand::Rng;

/// Returns a uniformly shuffled copy of `items` (Fisher-Yates, last index down to 1).
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffle_in_place(&mut shuffled, rng);
    shuffled
}

/// In-place Fisher-Yates for vectors the caller already owns.
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Draws `n` items without replacement.
///
/// Asking for more items than the pool holds is an error. Generators that
/// want to pad a short pool must say so with [`cycle_to`].
pub fn sample<T: Clone, R: Rng + ?Sized>(items: &[T], n: usize, rng: &mut R) -> Result<Vec<T>> {
    if n > items.len() {
        bail!(
            "cannot sample {n} items without replacement from a pool of {}",
            items.len()
        );
    }

    let mut shuffled = shuffle(items, rng);
    shuffled.truncate(n);
    Ok(shuffled)
}

/// Repeats `items` in order until `n` elements are produced.
///
/// An empty pool yields an empty vector regardless of `n`.
pub fn cycle_to<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    if items.is_empty() {
        return Vec::new();
    }
    items.iter().cycle().take(n).cloned().collect()
}

/// Splits `0..len` into three contiguous bands at `len/3` and `2*len/3`.
///
/// 12 → 4/4/4, 13 → 4/4/5, 14 → 4/5/5, 15 → 5/5/5.
pub fn band_ranges(len: usize) -> [std::ops::Range<usize>; 3] {
    let first = len / 3;
    let second = 2 * len / 3;
    [0..first, first..second, second..len]
}

/// Splits an already sorted slice into `parts` contiguous chunks of
/// `len / parts` items; the last chunk takes the remainder.
pub fn contiguous_strata<T: Clone>(sorted: &[T], parts: usize) -> Vec<Vec<T>> {
    if parts == 0 {
        return Vec::new();
    }

    let size = sorted.len() / parts;
    (0..parts)
        .map(|index| {
            let start = index * size;
            let end = if index + 1 == parts {
                sorted.len()
            } else {
                start + size
            };
            sorted[start..end].to_vec()
        })
        .collect()
}
