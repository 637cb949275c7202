// Attractor wave displacer.
// Visual: concentric ripples swirl around each attractor point; pixels are
// pushed tangentially (around the point, not away from it).
//
// Backward warp: every output pixel pulls exactly one input pixel, so there
// are never holes or double writes.

use crate::types::{AttractorPoint, PixelBuffer};
use rayon::prelude::*;
use tracing::debug;

/// Avoids a zero divide for pixels sitting on an attractor.
const EPSILON: f32 = 1e-3;
/// Shortest allowed ripple wavelength divisor, in pixels.
const MIN_WAVELENGTH: f32 = 6.0;
const BASE_WAVELENGTH: f32 = 120.0;

/// Below this amplitude the warp moves nothing visible.
pub const MIN_AMPLITUDE: f32 = 1.0;

/// Radius divisor for the sine: higher frequency, tighter rings.
#[inline]
fn wavelength(frequency: f32) -> f32 {
    (BASE_WAVELENGTH / (1.0 + frequency)).max(MIN_WAVELENGTH)
}

/// Summed tangential displacement at (x,y) from every attractor (given in pixels).
#[inline]
fn displacement(
    x: f32,
    y: f32,
    centers: &[(f32, f32)],
    amplitude: f32,
    wavelength: f32,
) -> (f32, f32) {
    let mut dx = 0.0f32;
    let mut dy = 0.0f32;
    for &(ox, oy) in centers {
        let ry = y - oy;
        let rx = x - ox;
        let r = (rx * rx + ry * ry).sqrt();
        let a = amplitude * (r / wavelength).sin();
        dx += -ry / (r + EPSILON) * a;
        dy += rx / (r + EPSILON) * a;
    }
    (dx, dy)
}

/// Warp `src` around `attractors`. No-op (returns `src` as is) when the
/// amplitude is under one pixel, the frequency is not positive, or there
/// are no attractors.
pub fn displace(
    src: PixelBuffer,
    attractors: &[AttractorPoint],
    amplitude: f32,
    frequency: f32,
) -> PixelBuffer {
    // Negated comparisons so NaN also takes the no-op path.
    if !(amplitude >= MIN_AMPLITUDE)
        || !(frequency > 0.0)
        || attractors.is_empty()
        || src.pixels.is_empty()
    {
        return src;
    }
    let (w, h) = (src.width, src.height);
    let centers: Vec<(f32, f32)> = attractors.iter().map(|p| p.to_pixels(w, h)).collect();
    let wl = wavelength(frequency);
    debug!(
        amplitude,
        frequency,
        wavelength = wl,
        attractors = centers.len(),
        "wave displace"
    );

    let mut pixels = vec![0u32; src.pixels.len()];
    pixels.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let (dx, dy) = displacement(x as f32, y as f32, &centers, amplitude, wl);
            // Non-finite offsets (absurd amplitudes) fall back to no movement.
            let sx = if dx.is_finite() { (x as f32 + dx).round() as i64 } else { x as i64 };
            let sy = if dy.is_finite() { (y as f32 + dy).round() as i64 } else { y as i64 };
            *out = src.get_clamped(sx, sy);
        }
    });

    PixelBuffer { width: w, height: h, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pack;

    fn checker(w: usize, h: usize) -> PixelBuffer {
        let pixels = (0..h)
            .flat_map(|y| {
                (0..w).map(move |x| {
                    pack((x * 9) as u8, (y * 9) as u8, ((x + y) % 2 * 255) as u8, 255)
                })
            })
            .collect();
        PixelBuffer::new(w, h, pixels).unwrap()
    }

    #[test]
    fn below_threshold_returns_input() {
        let src = checker(16, 16);
        let pts = [AttractorPoint::new(0.5, 0.5)];
        assert_eq!(displace(src.clone(), &pts, 0.99, 3.0), src);
        assert_eq!(displace(src.clone(), &pts, 20.0, 0.0), src);
        assert_eq!(displace(src.clone(), &[], 20.0, 3.0), src);
    }

    #[test]
    fn wavelength_has_a_floor() {
        assert_eq!(wavelength(0.0), 120.0);
        assert_eq!(wavelength(1000.0), MIN_WAVELENGTH);
    }

    #[test]
    fn displacement_is_tangential() {
        // Pixel straight to the right of the attractor moves purely vertically.
        let wl = wavelength(1.0);
        let (dx, dy) = displacement(40.0, 10.0, &[(10.0, 10.0)], 5.0, wl);
        assert!(dx.abs() < 1e-4);
        let expected = 5.0 * (30.0f32 / wl).sin() * (30.0 / (30.0 + EPSILON));
        assert!((dy - expected).abs() < 1e-3);
    }

    #[test]
    fn attractor_center_is_fixed_point() {
        let (dx, dy) = displacement(8.0, 8.0, &[(8.0, 8.0)], 50.0, 10.0);
        assert_eq!((dx, dy), (0.0, 0.0));
    }

    #[test]
    fn output_pixels_come_from_the_input() {
        let src = checker(24, 18);
        let pts = [AttractorPoint::new(0.3, 0.6), AttractorPoint::new(0.8, 0.2)];
        let out = displace(src.clone(), &pts, 6.0, 2.0);
        assert_eq!(out.width, 24);
        assert_eq!(out.height, 18);
        assert_ne!(out, src);
        assert!(out.pixels.iter().all(|p| src.pixels.contains(p)));
    }

    #[test]
    fn empty_buffer_passes_through() {
        let empty = PixelBuffer { width: 0, height: 0, pixels: vec![] };
        let pts = [AttractorPoint::new(0.5, 0.5)];
        assert_eq!(displace(empty.clone(), &pts, 10.0, 2.0), empty);
    }
}
