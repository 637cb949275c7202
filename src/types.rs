// Core types shared by every stage of the glitch pipeline.
// Pixels are packed 0xAARRGGBB: the same 0x00RRGGBB layout minifb wants,
// with straight alpha in the top byte.

use crate::error::Error;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: usize,     // pixels per row
    pub height: usize,    // number of rows
    pub pixels: Vec<u32>, // length = width * height, index = y * width + x
}

impl PixelBuffer {
    /// Wrap an existing pixel vector, checking that it matches the dimensions.
    pub fn new(width: usize, height: usize, pixels: Vec<u32>) -> Result<Self, Error> {
        let buf = Self { width, height, pixels };
        buf.validate()?;
        Ok(buf)
    }

    /// A buffer where every pixel is `color`.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    /// Fails with `InvalidInput` for an empty or mis-sized buffer.
    pub fn validate(&self) -> Result<(), Error> {
        let expected = self.width.checked_mul(self.height);
        if self.width == 0 || self.height == 0 || expected != Some(self.pixels.len()) {
            return Err(Error::InvalidInput {
                width: self.width,
                height: self.height,
                len: self.pixels.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    /// Pixel at (x,y) with both coordinates clamped into the buffer.
    #[inline]
    pub fn get_clamped(&self, x: i64, y: i64) -> u32 {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[cy * self.width + cx]
    }

    /// Pixel at (x,y), or None when the coordinate falls outside the buffer.
    #[inline]
    pub fn get_checked(&self, x: i64, y: i64) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.pixels[y as usize * self.width + x as usize])
    }

    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let (w, h) = img.dimensions();
        let pixels = img.pixels().map(|p| pack(p[0], p[1], p[2], p[3])).collect();
        Self { width: w as usize, height: h as usize, pixels }
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut raw = Vec::with_capacity(self.pixels.len() * 4);
        for &px in &self.pixels {
            raw.extend_from_slice(&unpack(px));
        }
        // The length always matches width*height*4 for a validated buffer; an
        // invalid one degrades to an empty image instead of panicking.
        RgbaImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }
}

/// Split a packed pixel into [r, g, b, a].
#[inline]
pub fn unpack(px: u32) -> [u8; 4] {
    [
        ((px >> 16) & 0xFF) as u8,
        ((px >> 8) & 0xFF) as u8,
        (px & 0xFF) as u8,
        (px >> 24) as u8,
    ]
}

#[inline]
pub fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Round a float channel to the nearest byte, saturating at 0 and 255.
#[inline]
pub fn to_u8(v: f32) -> u8 {
    if v.is_nan() { 0 } else { v.round().clamp(0.0, 255.0) as u8 }
}

/// Mix `over` on top of `base` with coverage `alpha` in [0,1]; base alpha is kept.
#[inline]
pub fn blend_over(base: u32, over: [u8; 3], alpha: f32) -> u32 {
    let [r, g, b, a] = unpack(base);
    let inv = 1.0 - alpha;
    pack(
        to_u8(r as f32 * inv + over[0] as f32 * alpha),
        to_u8(g as f32 * inv + over[1] as f32 * alpha),
        to_u8(b as f32 * inv + over[2] as f32 * alpha),
        a,
    )
}

/// A draggable point that bends the wave field, in normalized [0,1] coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct AttractorPoint {
    pub x: f32,
    pub y: f32,
}

impl AttractorPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Position in pixels for a buffer of the given size.
    pub fn to_pixels(self, width: usize, height: usize) -> (f32, f32) {
        (self.x.clamp(0.0, 1.0) * width as f32, self.y.clamp(0.0, 1.0) * height as f32)
    }
}

/// Every knob the pipeline reads. Built fresh per invocation; never mutated by the core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlitchParams {
    pub rgb_shift_pixels: f32,     // >= 0
    pub aberration_strength: f32,  // [0,1]
    pub block_jitter_size: u32,    // 0 disables
    pub noise_amount: f32,         // [0,1]
    pub scanline_strength: f32,    // [0,1]
    pub wave_amplitude: f32,       // >= 0, pixels at 1600 px wide
    pub wave_frequency: f32,       // >= 0
    pub pixel_sort_amount: f32,    // [0,1]
    pub contrast_crush: f32,       // [0,1]
    pub saturation: f32,           // >= 0, 1 = unchanged
    pub hue_degrees: f32,          // [-180,180]
    pub brightness_offset: f32,    // [-0.5,0.5]
    pub attractors: Vec<AttractorPoint>,
    pub boost_mode: bool,
    /// Fixes jitter + noise randomness. None draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self {
            rgb_shift_pixels: 0.0,
            aberration_strength: 0.0,
            block_jitter_size: 0,
            noise_amount: 0.0,
            scanline_strength: 0.0,
            wave_amplitude: 0.0,
            wave_frequency: 0.0,
            pixel_sort_amount: 0.0,
            contrast_crush: 0.0,
            saturation: 1.0,
            hue_degrees: 0.0,
            brightness_offset: 0.0,
            attractors: Vec::new(),
            boost_mode: false,
            seed: None,
        }
    }
}

/// Clamp into [lo,hi]; NaN falls back to `neutral`, infinities saturate.
fn clamp_or(v: f32, lo: f32, hi: f32, neutral: f32) -> f32 {
    if v.is_nan() { neutral } else { v.clamp(lo, hi) }
}

// Upper bounds for the open-ended ranges, so an absurd slider value
// saturates instead of walking off into enormous offsets.
const MAX_SHIFT_PIXELS: f32 = 512.0;
const MAX_WAVE_AMPLITUDE: f32 = 1024.0;
const MAX_WAVE_FREQUENCY: f32 = 1024.0;
const MAX_SATURATION: f32 = 8.0;

impl GlitchParams {
    /// Copy with every field forced into its documented range.
    pub fn sanitized(&self) -> Self {
        Self {
            rgb_shift_pixels: clamp_or(self.rgb_shift_pixels, 0.0, MAX_SHIFT_PIXELS, 0.0),
            aberration_strength: clamp_or(self.aberration_strength, 0.0, 1.0, 0.0),
            block_jitter_size: self.block_jitter_size,
            noise_amount: clamp_or(self.noise_amount, 0.0, 1.0, 0.0),
            scanline_strength: clamp_or(self.scanline_strength, 0.0, 1.0, 0.0),
            wave_amplitude: clamp_or(self.wave_amplitude, 0.0, MAX_WAVE_AMPLITUDE, 0.0),
            wave_frequency: clamp_or(self.wave_frequency, 0.0, MAX_WAVE_FREQUENCY, 0.0),
            pixel_sort_amount: clamp_or(self.pixel_sort_amount, 0.0, 1.0, 0.0),
            contrast_crush: clamp_or(self.contrast_crush, 0.0, 1.0, 0.0),
            saturation: clamp_or(self.saturation, 0.0, MAX_SATURATION, 1.0),
            hue_degrees: clamp_or(self.hue_degrees, -180.0, 180.0, 0.0),
            brightness_offset: clamp_or(self.brightness_offset, -0.5, 0.5, 0.0),
            attractors: self
                .attractors
                .iter()
                .map(|p| {
                    AttractorPoint::new(clamp_or(p.x, 0.0, 1.0, 0.5), clamp_or(p.y, 0.0, 1.0, 0.5))
                })
                .collect(),
            boost_mode: self.boost_mode,
            seed: self.seed,
        }
    }
}
