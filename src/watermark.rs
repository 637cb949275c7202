// Boost-mode watermark: the 5x7 text mark tiled across the whole image on a
// diagonal, in translucent pink.
// Visual: faint slanted rows of "GLITCHCORE", every other row shifted by half
// a word so the marks don't line up into a rigid grid.

use crate::draw::{text_pixel, GLYPH_ADVANCE, GLYPH_H};
use crate::types::{blend_over, PixelBuffer};
use rayon::prelude::*;
use tracing::debug;

pub const WATERMARK_TEXT: &str = "GLITCHCORE";
const TINT: [u8; 3] = [255, 105, 180];
const ALPHA: f32 = 90.0 / 255.0;
/// Text rises this many degrees from left to right.
const ANGLE_DEGREES: f32 = -30.0;
/// Extra blank space after each word and between rows, in font pixels.
const WORD_GAP: usize = 4;
const ROW_GAP: usize = 9;
/// Roughly how many font pixels should span the image width.
const FONT_PIXELS_ACROSS: usize = 240;

/// Tile the watermark over `src`. Every output pixel is computed by rotating
/// it back into text space, so the tiling always covers the whole buffer.
pub fn overlay(mut src: PixelBuffer) -> PixelBuffer {
    if src.pixels.is_empty() {
        return src;
    }
    let text: Vec<char> = WATERMARK_TEXT.chars().collect();
    let cell = (src.width / FONT_PIXELS_ACROSS).max(1) as f32; // screen pixels per font pixel
    let word_w = text.len() * GLYPH_ADVANCE + WORD_GAP;
    let row_h = GLYPH_H + ROW_GAP;
    let (sin, cos) = ANGLE_DEGREES.to_radians().sin_cos();
    debug!(cell, word_w, row_h, "watermark");

    let w = src.width;
    src.pixels.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, px) in row.iter_mut().enumerate() {
            // Inverse rotation of the pixel center, in font-pixel units.
            let (fx, fy) = ((x as f32 + 0.5) / cell, (y as f32 + 0.5) / cell);
            let u = fx * cos + fy * sin;
            let v = -fx * sin + fy * cos;

            let band = (v / row_h as f32).floor() as i64;
            let stagger = if band.rem_euclid(2) == 1 { word_w as f32 / 2.0 } else { 0.0 };
            let col = (u + stagger).floor().rem_euclid(word_w as f32) as usize;
            let line = v.floor().rem_euclid(row_h as f32) as usize;

            if text_pixel(&text, col, line) {
                *px = blend_over(*px, TINT, ALPHA);
            }
        }
    });
    src
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{pack, unpack};

    #[test]
    fn marks_appear_throughout_the_image() {
        let (w, h) = (240, 240);
        let out = overlay(PixelBuffer::filled(w, h, pack(0, 0, 0, 255)));
        let black = pack(0, 0, 0, 255);
        let touched =
            |y0: usize, y1: usize| (y0..y1).any(|y| (0..w).any(|x| out.get(x, y) != black));
        assert!(touched(0, 40));
        assert!(touched(100, 140));
        assert!(touched(200, 240));
    }

    #[test]
    fn marked_pixels_are_pink_tinted_and_keep_alpha() {
        let out = overlay(PixelBuffer::filled(120, 120, pack(0, 0, 0, 200)));
        let marked: Vec<[u8; 4]> =
            out.pixels.iter().map(|&p| unpack(p)).filter(|c| c[0] > 0).collect();
        assert!(!marked.is_empty());
        for c in marked {
            // 90/255 of pink over black.
            assert_eq!(c, [90, 37, 64, 200]);
        }
    }

    #[test]
    fn single_pixel_buffer_is_fine() {
        let out = overlay(PixelBuffer::filled(1, 1, pack(1, 2, 3, 4)));
        assert_eq!(out.width, 1);
        assert_eq!(out.pixels.len(), 1);
    }

    #[test]
    fn empty_buffer_passes_through() {
        let empty = PixelBuffer { width: 0, height: 0, pixels: vec![] };
        assert_eq!(overlay(empty.clone()), empty);
    }
}
