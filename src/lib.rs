// glitchcore: turns a decoded RGBA image into a glitched one.
//
// The whole public surface is `pipeline::apply_all` plus the types it takes:
// a `PixelBuffer` in, a `GlitchParams` record describing the look, a new
// `PixelBuffer` out. Decoding, encoding and any UI live outside (see main.rs).

pub mod channels;
pub mod draw;
pub mod error;
pub mod film;
pub mod grade;
pub mod jitter;
pub mod pipeline;
pub mod presets;
pub mod resample;
pub mod sort;
pub mod types;
pub mod watermark;
pub mod wave;

pub use error::Error;
pub use pipeline::{apply_all, apply_all_with, PipelineConfig};
pub use presets::Preset;
pub use types::{AttractorPoint, GlitchParams, PixelBuffer};
