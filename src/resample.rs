// Area-preserving (box) resampling, done as two separable passes like a box blur:
// rows first into a float scratch image, then columns into the packed output.
// Each destination pixel is the coverage-weighted average of the source pixels
// its footprint overlaps, so the same code shrinks and enlarges.

use crate::types::{pack, to_u8, unpack, PixelBuffer};
use rayon::prelude::*;

/// Source taps for one destination index: (source index, weight), weights sum to 1.
fn area_taps(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|d| {
            let start = d as f64 * scale;
            let end = ((d + 1) as f64 * scale).min(src_len as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).clamp(first + 1, src_len);
            let span = end - start;
            (first..last)
                .filter_map(|i| {
                    let cover = end.min(i as f64 + 1.0) - start.max(i as f64);
                    (cover > 0.0).then(|| (i, (cover / span) as f32))
                })
                .collect()
        })
        .collect()
}

/// Output size for a working scale; never collapses an axis to zero.
pub fn scaled_dimensions(width: usize, height: usize, scale: f32) -> (usize, usize) {
    let w = ((width as f32 * scale).round() as usize).max(1);
    let h = ((height as f32 * scale).round() as usize).max(1);
    (w, h)
}

/// Resample `src` to `dst_w` x `dst_h` with box filtering.
/// Same-size requests return a plain copy. With nothing to sample from, or
/// nothing to fill, the result is transparent black.
pub fn resample_box(src: &PixelBuffer, dst_w: usize, dst_h: usize) -> PixelBuffer {
    if src.width == dst_w && src.height == dst_h {
        return src.clone();
    }
    if src.pixels.is_empty() || dst_w == 0 || dst_h == 0 {
        return PixelBuffer::filled(dst_w, dst_h, 0);
    }
    let (sw, sh) = (src.width, src.height);
    let x_taps = area_taps(sw, dst_w);
    let y_taps = area_taps(sh, dst_h);

    /* ---- Pass 1: horizontal, src rows -> tmp (dst_w x sh) ---- */
    let mut tmp = vec![[0.0f32; 4]; dst_w * sh];
    tmp.par_chunks_mut(dst_w).enumerate().for_each(|(y, row_out)| {
        let row_in = &src.pixels[y * sw..(y + 1) * sw];
        for (out, taps) in row_out.iter_mut().zip(&x_taps) {
            let mut acc = [0.0f32; 4];
            for &(sx, w) in taps {
                let c = unpack(row_in[sx]);
                for k in 0..4 {
                    acc[k] += c[k] as f32 * w;
                }
            }
            *out = acc;
        }
    });

    /* ---- Pass 2: vertical, tmp columns -> dst (dst_w x dst_h) ---- */
    let mut pixels = vec![0u32; dst_w * dst_h];
    pixels.par_chunks_mut(dst_w).enumerate().for_each(|(y, row_out)| {
        let taps = &y_taps[y];
        for (x, out) in row_out.iter_mut().enumerate() {
            let mut acc = [0.0f32; 4];
            for &(sy, w) in taps {
                let c = tmp[sy * dst_w + x];
                for k in 0..4 {
                    acc[k] += c[k] * w;
                }
            }
            *out = pack(to_u8(acc[0]), to_u8(acc[1]), to_u8(acc[2]), to_u8(acc[3]));
        }
    });

    PixelBuffer { width: dst_w, height: dst_h, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taps_cover_the_whole_source() {
        for (s, d) in [(10, 3), (3, 10), (7, 7), (1600, 1), (1, 5)] {
            for taps in area_taps(s, d) {
                let total: f32 = taps.iter().map(|t| t.1).sum();
                assert!((total - 1.0).abs() < 1e-4, "{s}->{d}: {total}");
            }
        }
    }

    #[test]
    fn downscale_averages_blocks() {
        // 2x1 -> 1x1 averages black and white to mid gray.
        let pixels = vec![pack(0, 0, 0, 255), pack(255, 255, 255, 255)];
        let src = PixelBuffer::new(2, 1, pixels).unwrap();
        let out = resample_box(&src, 1, 1);
        assert_eq!(out.pixels, vec![pack(128, 128, 128, 255)]);
    }

    #[test]
    fn integer_upscale_replicates_pixels() {
        let pixels = vec![pack(10, 20, 30, 255), pack(200, 100, 50, 255)];
        let src = PixelBuffer::new(2, 1, pixels).unwrap();
        let out = resample_box(&src, 4, 2);
        assert_eq!(out.width, 4);
        assert_eq!(out.height, 2);
        for y in 0..2 {
            assert_eq!(out.get(0, y), src.pixels[0]);
            assert_eq!(out.get(1, y), src.pixels[0]);
            assert_eq!(out.get(2, y), src.pixels[1]);
            assert_eq!(out.get(3, y), src.pixels[1]);
        }
    }

    #[test]
    fn uniform_image_survives_round_trip() {
        let src = PixelBuffer::filled(37, 11, pack(90, 140, 200, 255));
        let (w, h) = scaled_dimensions(37, 11, 0.43);
        let back = resample_box(&resample_box(&src, w, h), 37, 11);
        assert_eq!(back, src);
    }

    #[test]
    fn scaled_dimensions_never_zero() {
        assert_eq!(scaled_dimensions(3000, 2, 0.1), (300, 1));
    }

    #[test]
    fn empty_source_or_target_gives_blank_buffer() {
        let empty = PixelBuffer { width: 0, height: 0, pixels: vec![] };
        assert_eq!(resample_box(&empty, 3, 2), PixelBuffer::filled(3, 2, 0));
        assert_eq!(resample_box(&empty, 0, 0), empty);

        let src = PixelBuffer::filled(4, 4, pack(1, 2, 3, 255));
        let out = resample_box(&src, 0, 4);
        assert_eq!((out.width, out.height, out.pixels.len()), (0, 4, 0));
    }
}
