// The top-level API: one call takes a decoded image plus parameters and
// returns the glitched image at the original size.
//
// Stage order is fixed:
//   downscale -> channel split -> wave -> block jitter -> row sort
//   -> film (scanlines + noise) -> color grade -> watermark -> upscale
// Each stage takes the previous buffer by value and hands back the next one,
// so no buffer is ever shared between stages.

use crate::channels::split_channels;
use crate::error::Error;
use crate::film::synthesize;
use crate::grade::{grade, Grade};
use crate::jitter::jitter_blocks;
use crate::resample::{resample_box, scaled_dimensions};
use crate::sort::sort_rows;
use crate::types::{GlitchParams, PixelBuffer};
use crate::wave::displace;
use crate::watermark;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, debug_span};

pub const DEFAULT_MAX_WORKING_WIDTH: usize = 1600;

/// Boost mode's hue nudge, in degrees.
const BOOST_HUE_DEGREES: f32 = 30.0;
const BOOST_SATURATION: f32 = 1.1;

/// Orchestrator tuning that isn't part of the per-call look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Inputs wider than this are processed at a reduced size and scaled back up.
    pub max_working_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_working_width: DEFAULT_MAX_WORKING_WIDTH }
    }
}

impl PipelineConfig {
    /// min(1, max_working_width / width). A zero budget means "never downscale".
    pub fn working_scale(&self, width: usize) -> f32 {
        if self.max_working_width == 0 || width <= self.max_working_width {
            1.0
        } else {
            self.max_working_width as f32 / width as f32
        }
    }
}

/// Run every stage with the default config. See [`apply_all_with`].
pub fn apply_all(source: &PixelBuffer, params: &GlitchParams) -> Result<PixelBuffer, Error> {
    apply_all_with(&PipelineConfig::default(), source, params)
}

/// Run every stage over `source` and return a new buffer of the same size.
/// `source` is never modified. The only failure is an invalid buffer shape.
pub fn apply_all_with(
    config: &PipelineConfig,
    source: &PixelBuffer,
    params: &GlitchParams,
) -> Result<PixelBuffer, Error> {
    source.validate()?;
    let p = params.sanitized();
    let _span = debug_span!("apply_all", width = source.width, height = source.height).entered();

    let mut rng = match p.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Work at a bounded size; pixel-measured knobs shrink with it.
    let scale = config.working_scale(source.width);
    let (ww, wh) = scaled_dimensions(source.width, source.height, scale);
    debug!(scale, ww, wh, "working size");
    let work = resample_box(source, ww, wh);

    let work = split_channels(work, p.rgb_shift_pixels * scale, p.aberration_strength);
    let work = displace(work, &p.attractors, p.wave_amplitude * scale, p.wave_frequency);
    let work = jitter_blocks(work, p.block_jitter_size, &mut rng);
    let work = sort_rows(work, p.pixel_sort_amount);
    let work = synthesize(work, p.scanline_strength, p.noise_amount, &mut rng);
    let work = grade(work, &grade_for(&p));
    let work = if p.boost_mode { watermark::overlay(work) } else { work };

    Ok(resample_box(&work, source.width, source.height))
}

/// Color-grade settings for a parameter set, including boost mode's bias.
pub fn grade_for(p: &GlitchParams) -> Grade {
    let (hue, sat) = if p.boost_mode {
        (p.hue_degrees + BOOST_HUE_DEGREES, p.saturation * BOOST_SATURATION)
    } else {
        (p.hue_degrees, p.saturation)
    };
    Grade {
        brightness: p.brightness_offset,
        saturation: sat,
        hue_degrees: hue,
        crush: p.contrast_crush,
    }
}
