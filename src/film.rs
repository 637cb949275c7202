// Film synthesizer: dark scanlines on every other row, then grainy noise.
// Visual outcomes:
// - Scanlines: faint horizontal black bars, like an old CRT.
// - Noise: each pixel brightens or darkens by a random amount; the same offset
//   goes to R, G and B so the grain is gray rather than colored confetti.

use crate::types::{blend_over, pack, unpack, PixelBuffer};
use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

/// Scanline opacity at full strength, out of 255.
const SCANLINE_ALPHA_MAX: f32 = 40.0;
/// Largest per-pixel noise offset at full amount.
const NOISE_MAX: f32 = 60.0;

/// Additively nudge one pixel's RGB by `n`, saturating at 0 and 255. Alpha untouched.
#[inline]
fn add_gray_saturating(px: u32, n: i32) -> u32 {
    let [r, g, b, a] = unpack(px);
    let add = |c: u8| (c as i32 + n).clamp(0, 255) as u8;
    pack(add(r), add(g), add(b), a)
}

/// Darken every even row with black at `strength * 40 / 255` opacity.
pub fn scanlines(mut src: PixelBuffer, strength: f32) -> PixelBuffer {
    if !(strength > 0.0) || src.pixels.is_empty() {
        return src;
    }
    let alpha8 = (strength * SCANLINE_ALPHA_MAX).round().clamp(0.0, 255.0);
    if alpha8 == 0.0 {
        return src;
    }
    let alpha = alpha8 / 255.0;
    debug!(strength, alpha8, "scanlines");
    let w = src.width;
    src.pixels
        .par_chunks_mut(w)
        .enumerate()
        .filter(|(y, _)| y % 2 == 0)
        .for_each(|(_, row)| {
            for px in row {
                *px = blend_over(*px, [0, 0, 0], alpha);
            }
        });
    src
}

/// Add uniform integer noise in [-round(amount*60), +round(amount*60)] to each pixel.
/// Draws happen in raster order so a seeded generator gives repeatable grain.
pub fn add_noise<R: Rng + ?Sized>(
    mut src: PixelBuffer,
    amount: f32,
    rng: &mut R,
) -> PixelBuffer {
    if !(amount > 0.0) {
        return src;
    }
    let scale = (amount * NOISE_MAX).round() as i32;
    if scale <= 0 {
        return src;
    }
    debug!(amount, scale, "noise");
    for px in src.pixels.iter_mut() {
        let n = rng.gen_range(-scale..=scale);
        *px = add_gray_saturating(*px, n);
    }
    src
}

/// Scanlines first, then noise on top.
pub fn synthesize<R: Rng + ?Sized>(
    src: PixelBuffer,
    scanline_strength: f32,
    noise_amount: f32,
    rng: &mut R,
) -> PixelBuffer {
    let out = scanlines(src, scanline_strength);
    add_noise(out, noise_amount, rng)
}
