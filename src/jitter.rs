// Block jitter: the image is cut into square tiles and each tile is pasted
// back slightly off its home position.
// Visual: blocky "corrupted stream" tearing. Tiles are pasted in raster order,
// so a later tile may cover part of an earlier one (last write wins).

use crate::types::PixelBuffer;
use rand::Rng;
use tracing::debug;

/// Smallest tile side, in pixels.
const MIN_STEP: usize = 4;

/// Displace `step`-sized tiles of `src` by random offsets in [-step/2, step/2).
/// Returns `src` untouched when `block_size` is 0.
pub fn jitter_blocks<R: Rng + ?Sized>(
    src: PixelBuffer,
    block_size: u32,
    rng: &mut R,
) -> PixelBuffer {
    if block_size == 0 || src.pixels.is_empty() {
        return src;
    }
    let step = (block_size as usize).max(MIN_STEP);
    // Integer half: an odd step of 5 draws from [-2, 2).
    let half = (step / 2) as i64;
    let (w, h) = (src.width, src.height);
    debug!(step, "block jitter");

    let mut out = src.clone();
    for ty in (0..h).step_by(step) {
        let tile_h = step.min(h - ty);
        for tx in (0..w).step_by(step) {
            let tile_w = step.min(w - tx);
            let dx = rng.gen_range(-half..half);
            let dy = rng.gen_range(-half..half);

            // Keep the whole pasted tile inside the buffer.
            let dst_x = (tx as i64 + dx).clamp(0, (w - tile_w) as i64) as usize;
            let dst_y = (ty as i64 + dy).clamp(0, (h - tile_h) as i64) as usize;
            paste(&mut out, &src, (tx, ty), (tile_w, tile_h), (dst_x, dst_y));
        }
    }
    out
}

/// Copy the `size` tile at `from` in `src` to `to` in `out`, row by row.
/// Both rectangles must lie inside their buffers.
fn paste(
    out: &mut PixelBuffer,
    src: &PixelBuffer,
    from: (usize, usize),
    size: (usize, usize),
    to: (usize, usize),
) {
    let (tile_w, tile_h) = size;
    for row in 0..tile_h {
        let a = (from.1 + row) * src.width + from.0;
        let b = (to.1 + row) * out.width + to.0;
        out.pixels[b..b + tile_w].copy_from_slice(&src.pixels[a..a + tile_w]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pack;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn numbered(w: usize, h: usize) -> PixelBuffer {
        let pixels = (0..w * h)
            .map(|i| pack((i % 256) as u8, (i / 256) as u8, 7, 255))
            .collect();
        PixelBuffer::new(w, h, pixels).unwrap()
    }

    #[test]
    fn zero_size_is_noop() {
        let src = numbered(10, 10);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(jitter_blocks(src.clone(), 0, &mut rng), src);
    }

    #[test]
    fn same_seed_same_output() {
        let src = numbered(33, 21);
        let a = jitter_blocks(src.clone(), 8, &mut StdRng::seed_from_u64(42));
        let b = jitter_blocks(src.clone(), 8, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.width, 33);
        assert_eq!(a.height, 21);
    }

    #[test]
    fn every_output_pixel_exists_in_input() {
        let src = numbered(40, 30);
        let out = jitter_blocks(src.clone(), 6, &mut StdRng::seed_from_u64(9));
        assert!(out.pixels.iter().all(|p| src.pixels.contains(p)));
    }

    #[test]
    fn tile_larger_than_image_stays_in_place() {
        // A single clipped tile has nowhere to go once clamped.
        let src = numbered(5, 3);
        let out = jitter_blocks(src.clone(), 64, &mut StdRng::seed_from_u64(3));
        assert_eq!(out, src);
    }

    #[test]
    fn tiny_sizes_use_minimum_step() {
        // With step 4 on a 4x4 image there is one tile and it cannot move.
        let src = numbered(4, 4);
        let out = jitter_blocks(src.clone(), 1, &mut StdRng::seed_from_u64(11));
        assert_eq!(out, src);
    }

    #[test]
    fn tiles_actually_move() {
        let src = numbered(32, 32);
        let out = jitter_blocks(src.clone(), 8, &mut StdRng::seed_from_u64(5));
        assert_ne!(out, src);
    }

    #[test]
    fn offsets_stay_in_range_and_tiles_stay_inside() {
        // Replays the draws in the same order (dx then dy, tiles in raster
        // order) and rebuilds the expected result by hand.
        let (w, h, step) = (37usize, 29usize, 8usize);
        let half = (step / 2) as i64;
        let src = numbered(w, h);
        let out = jitter_blocks(src.clone(), step as u32, &mut StdRng::seed_from_u64(77));

        let mut rng = StdRng::seed_from_u64(77);
        let mut expected = src.clone();
        for ty in (0..h).step_by(step) {
            let th = step.min(h - ty);
            for tx in (0..w).step_by(step) {
                let tw = step.min(w - tx);
                let dx: i64 = rng.gen_range(-half..half);
                let dy: i64 = rng.gen_range(-half..half);
                assert!((-half..half).contains(&dx) && (-half..half).contains(&dy));

                let x = (tx as i64 + dx).clamp(0, (w - tw) as i64) as usize;
                let y = (ty as i64 + dy).clamp(0, (h - th) as i64) as usize;
                assert!(x + tw <= w && y + th <= h);
                for row in 0..th {
                    for col in 0..tw {
                        expected.pixels[(y + row) * w + x + col] = src.get(tx + col, ty + row);
                    }
                }
            }
        }
        assert_eq!(out, expected);
    }

    #[test]
    fn later_tile_overwrites_earlier_one() {
        let src = numbered(8, 4);
        let mut out = PixelBuffer::filled(8, 4, 0);
        // Tile (0,0) lands at x=2; tile (4,0) then lands at x=3 on top of it.
        paste(&mut out, &src, (0, 0), (4, 4), (2, 0));
        paste(&mut out, &src, (4, 0), (4, 4), (3, 0));
        for y in 0..4 {
            assert_eq!(out.get(2, y), src.get(0, y));
            for x in 3..7 {
                assert_eq!(out.get(x, y), src.get(x + 1, y));
            }
        }
    }

    #[test]
    fn empty_buffer_passes_through() {
        let empty = PixelBuffer { width: 0, height: 0, pixels: vec![] };
        let out = jitter_blocks(empty.clone(), 8, &mut StdRng::seed_from_u64(1));
        assert_eq!(out, empty);
    }
}
