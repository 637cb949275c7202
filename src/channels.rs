// Channel splitter: chromatic aberration by pulling red and blue apart.
// Visual: red fringes slide up-right, blue fringes slide down-left, green stays put.
// An optional slightly enlarged "ghost" of the original is faded in on top.

use crate::types::{blend_over, pack, unpack, PixelBuffer};
use rayon::prelude::*;
use tracing::debug;

/// Ghost scale grows by this much per unit of aberration strength.
const GHOST_SCALE_PER_STRENGTH: f32 = 0.02;
/// Ghost opacity at full strength, out of 255.
const GHOST_ALPHA_MAX: f32 = 80.0;

/// Recombine three translated copies of `src`: red moved by (+s,-s), green
/// untouched, blue moved by (-s,+s). Channels shifted in from outside the
/// buffer are empty (0). Alpha comes from the untranslated pixel.
pub fn split_channels(src: PixelBuffer, shift_pixels: f32, aberration: f32) -> PixelBuffer {
    let s = if shift_pixels.is_finite() { shift_pixels.round().max(0.0) as i64 } else { 0 };
    let aberration = if aberration.is_finite() { aberration.clamp(0.0, 1.0) } else { 0.0 };
    if (s == 0 && aberration <= 0.0) || src.pixels.is_empty() {
        return src;
    }
    debug!(shift = s, aberration, "channel split");

    let w = src.width;
    let mut pixels = vec![0u32; src.pixels.len()];
    pixels.par_chunks_mut(w).enumerate().for_each(|(y, row_out)| {
        for (x, out) in row_out.iter_mut().enumerate() {
            let [_, g, _, a] = unpack(src.get(x, y));
            let (x, y) = (x as i64, y as i64);
            let r = src.get_checked(x - s, y + s).map_or(0, |p| unpack(p)[0]);
            let b = src.get_checked(x + s, y - s).map_or(0, |p| unpack(p)[2]);
            *out = pack(r, g, b, a);
        }
    });
    let mut out = PixelBuffer { width: w, height: src.height, pixels };

    if aberration > 0.0 {
        overlay_ghost(&mut out, &src, aberration);
    }
    out
}

/// Composite a center-anchored, uniformly enlarged copy of `original` over `dst`.
fn overlay_ghost(dst: &mut PixelBuffer, original: &PixelBuffer, strength: f32) {
    let scale = 1.0 + GHOST_SCALE_PER_STRENGTH * strength;
    let alpha = (strength * GHOST_ALPHA_MAX / 255.0).clamp(0.0, 1.0);
    let cx = original.width as f32 / 2.0;
    let cy = original.height as f32 / 2.0;
    let w = dst.width;

    dst.pixels.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        // Inverse map: which original pixel lands here once enlarged about the center.
        let sy = ((y as f32 + 0.5 - cy) / scale + cy - 0.5).round() as i64;
        for (x, px) in row.iter_mut().enumerate() {
            let sx = ((x as f32 + 0.5 - cx) / scale + cx - 0.5).round() as i64;
            if let Some(ghost) = original.get_checked(sx, sy) {
                let [r, g, b, _] = unpack(ghost);
                *px = blend_over(*px, [r, g, b], alpha);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: usize, h: usize) -> PixelBuffer {
        let pixels = (0..w * h)
            .map(|i| {
                let (r, g, b) = (i * 7 % 256, i * 13 % 256, i * 29 % 256);
                pack(r as u8, g as u8, b as u8, 255)
            })
            .collect();
        PixelBuffer::new(w, h, pixels).unwrap()
    }

    #[test]
    fn zero_shift_and_aberration_is_identity() {
        let src = gradient(9, 5);
        assert_eq!(split_channels(src.clone(), 0.0, 0.0), src);
        // 0.4 rounds to no shift.
        assert_eq!(split_channels(src.clone(), 0.4, 0.0), src);
    }

    #[test]
    fn red_and_blue_move_in_opposite_directions() {
        let src = gradient(8, 8);
        let out = split_channels(src.clone(), 2.0, 0.0);
        let (x, y) = (4, 4);
        let here = unpack(out.get(x, y));
        assert_eq!(here[0], unpack(src.get(x - 2, y + 2))[0]);
        assert_eq!(here[1], unpack(src.get(x, y))[1]);
        assert_eq!(here[2], unpack(src.get(x + 2, y - 2))[2]);
        assert_eq!(here[3], 255);
    }

    #[test]
    fn channels_shifted_in_from_outside_are_empty() {
        let src = PixelBuffer::filled(6, 6, pack(200, 150, 100, 255));
        let out = split_channels(src, 3.0, 0.0);
        // Left column: red source at x-3 is off-buffer.
        assert_eq!(unpack(out.get(0, 3)), [0, 150, 100, 255]);
        // Top row: blue source at y-3 is off-buffer.
        assert_eq!(unpack(out.get(3, 0)), [200, 150, 0, 255]);
        // Bottom-right corner loses both.
        assert_eq!(unpack(out.get(5, 5)), [0, 150, 0, 255]);
    }

    #[test]
    fn ghost_on_flat_image_changes_nothing() {
        // Blending a flat color over itself leaves it as is.
        let src = PixelBuffer::filled(10, 10, pack(60, 70, 80, 255));
        let out = split_channels(src.clone(), 0.0, 1.0);
        assert_eq!(out, src);
    }

    #[test]
    fn ghost_blends_enlarged_copy_on_gradient() {
        let src = gradient(100, 100);
        let out = split_channels(src.clone(), 0.0, 1.0);
        let alpha = 80.0 / 255.0;

        // At scale 1.02 the corner samples (0.5 - 50) / 1.02 + 49.5 = 0.97 -> 1.
        let [r, g, b, _] = unpack(src.get(1, 1));
        let expected = blend_over(src.get(0, 0), [r, g, b], alpha);
        assert_eq!(out.get(0, 0), expected);
        assert_ne!(out.get(0, 0), src.get(0, 0));

        // The far corner maps inward the other way: 99 -> 98.
        let [r, g, b, _] = unpack(src.get(98, 98));
        assert_eq!(out.get(99, 99), blend_over(src.get(99, 99), [r, g, b], alpha));

        // The center samples itself.
        assert_eq!(out.get(50, 50), src.get(50, 50));
    }

    #[test]
    fn empty_buffer_passes_through() {
        let empty = PixelBuffer { width: 0, height: 0, pixels: vec![] };
        assert_eq!(split_channels(empty.clone(), 3.0, 1.0), empty);
    }
}
