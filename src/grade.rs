// Color grader: brightness, saturation, a planar "hue" twist, contrast crush.
// Visual: the overall mood of the glitch. Everything happens per pixel in
// normalized [0,1] floats. Channels are clamped after brightness, after the
// rotation and after the crush, so extreme settings saturate to flat colors
// instead of wrapping around. Saturation alone may leave [0,1]; the rotation
// sees those raw values.
//
// The hue step rotates (r,g) as a 2D vector and leaves blue alone. It is not
// an HSV hue rotation, and the look depends on that.

use crate::types::{pack, to_u8, unpack, PixelBuffer};
use rayon::prelude::*;
use tracing::debug;

/// Grading knobs, in the units the pipeline hands over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grade {
    pub brightness: f32, // added to each channel
    pub saturation: f32, // 1 = unchanged, 0 = gray
    pub hue_degrees: f32,
    pub crush: f32, // 0 = off, 1 = contrast x3
}

impl Default for Grade {
    fn default() -> Self {
        Self { brightness: 0.0, saturation: 1.0, hue_degrees: 0.0, crush: 0.0 }
    }
}

impl Grade {
    /// True when applying this grade cannot change any pixel.
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0
            && self.saturation == 1.0
            && self.hue_degrees == 0.0
            && self.crush <= 0.0
    }

    /// Grade one [r,g,b] triplet in [0,1].
    #[inline]
    pub fn apply_rgb(&self, [r, g, b]: [f32; 3], rotation: (f32, f32)) -> [f32; 3] {
        // (a) brightness
        let r = (r + self.brightness).clamp(0.0, 1.0);
        let g = (g + self.brightness).clamp(0.0, 1.0);
        let b = (b + self.brightness).clamp(0.0, 1.0);

        // (b) saturation around the plain channel average
        let l = (r + g + b) / 3.0;
        let r = l + (r - l) * self.saturation;
        let g = l + (g - l) * self.saturation;
        let b = l + (b - l) * self.saturation;

        // (c) rotate in the r-g plane
        let (sin, cos) = rotation;
        let rr = (r * cos - g * sin).clamp(0.0, 1.0);
        let gg = (r * sin + g * cos).clamp(0.0, 1.0);

        // (d) crush around mid gray
        if self.crush > 0.0 {
            let k = 1.0 + 2.0 * self.crush;
            let f = |x: f32| (k * (x - 0.5) + 0.5).clamp(0.0, 1.0);
            [f(rr), f(gg), f(b)]
        } else {
            [rr, gg, b]
        }
    }
}

/// Apply `settings` to every pixel of `src`; alpha passes through.
pub fn grade(mut src: PixelBuffer, settings: &Grade) -> PixelBuffer {
    if settings.is_identity() || src.pixels.is_empty() {
        return src;
    }
    debug!(?settings, "color grade");
    let rotation = settings.hue_degrees.to_radians().sin_cos();
    let w = src.width;
    src.pixels.par_chunks_mut(w).for_each(|row| {
        for px in row {
            let [r, g, b, a] = unpack(*px);
            let rgb = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
            let [r, g, b] = settings.apply_rgb(rgb, rotation);
            *px = pack(to_u8(r * 255.0), to_u8(g * 255.0), to_u8(b * 255.0), a);
        }
    });
    src
}
