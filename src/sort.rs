// Row pixel sorter.
// Visual: short horizontal streaks where pixels settle into sorted order,
// on every other scanline, with tiny untouched gaps between streaks.

use crate::types::PixelBuffer;
use rayon::prelude::*;
use tracing::debug;

/// Untouched pixels between two sorted runs.
const GAP: usize = 3;
const MIN_RUN: f32 = 20.0;
const RUN_RANGE: f32 = 180.0;
/// Amounts at or below this don't sort anything.
const THRESHOLD: f32 = 0.01;

/// Nominal run length for a sort amount in [0,1].
pub fn run_length(amount: f32) -> usize {
    (MIN_RUN + amount.clamp(0.0, 1.0) * RUN_RANGE).round() as usize
}

/// Sort runs within one row ascending by packed value, skipping `GAP` pixels after each.
fn sort_row(row: &mut [u32], run: usize) {
    let mut x = 0;
    while x < row.len() {
        let seg = run.min(row.len() - x);
        row[x..x + seg].sort_unstable();
        x += seg + GAP;
    }
}

/// Sort even rows of `src` in runs. Odd rows are left alone.
/// Packed order is alpha, then red, then green, then blue.
pub fn sort_rows(mut src: PixelBuffer, amount: f32) -> PixelBuffer {
    if !(amount > THRESHOLD) || src.pixels.is_empty() {
        return src;
    }
    let run = run_length(amount);
    debug!(amount, run, "row sort");
    let w = src.width;
    src.pixels
        .par_chunks_mut(w)
        .enumerate()
        .filter(|(y, _)| y % 2 == 0)
        .for_each(|(_, row)| sort_row(row, run));
    src
}
