// Command-line glue around the glitch pipeline.
// What happens:
// • `glitchcore apply IN OUT` decodes IN, runs every stage, writes OUT.
// • The look comes from a preset, a JSON parameter file, and/or individual flags
//   (applied in that order, later ones win).
// • `--preview` also opens a window with the result; attractors are marked with
//   yellow crosshairs. ESC or closing the window quits.
// • `glitchcore presets` lists the built-in presets.

use clap::{Args, Parser, Subcommand};
use glitchcore::draw::{draw_crosshair, draw_text_5x7, Drawer};
use glitchcore::resample::{resample_box, scaled_dimensions};
use glitchcore::{
    apply_all_with, AttractorPoint, Error, GlitchParams, PipelineConfig, PixelBuffer, Preset,
};
use image::codecs::jpeg::JpegEncoder;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const JPEG_QUALITY: u8 = 95;
/// Preview windows wider than this show a shrunken copy.
const PREVIEW_MAX_WIDTH: usize = 1280;

#[derive(Parser)]
#[command(name = "glitchcore", version, about = "Glitch-art image filter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Glitch one image file into another.
    Apply(ApplyArgs),
    /// List the built-in presets.
    Presets,
}

#[derive(Args)]
struct ApplyArgs {
    input: PathBuf,
    output: PathBuf,

    /// Start from a named preset.
    #[arg(long)]
    preset: Option<String>,
    /// JSON file with GlitchParams fields (camelCase); missing fields keep their value.
    #[arg(long)]
    params: Option<PathBuf>,
    /// Fix the randomness of block jitter and noise.
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    boost: bool,
    /// Working-resolution budget in pixels (0 = never downscale).
    #[arg(long, default_value_t = glitchcore::pipeline::DEFAULT_MAX_WORKING_WIDTH)]
    max_width: usize,
    /// Show the result in a window.
    #[arg(long)]
    preview: bool,

    #[arg(long)]
    rgb_shift: Option<f32>,
    #[arg(long)]
    aberration: Option<f32>,
    #[arg(long)]
    jitter: Option<u32>,
    #[arg(long)]
    noise: Option<f32>,
    #[arg(long)]
    scanlines: Option<f32>,
    #[arg(long)]
    wave_amplitude: Option<f32>,
    #[arg(long)]
    wave_frequency: Option<f32>,
    #[arg(long)]
    sort: Option<f32>,
    #[arg(long)]
    crush: Option<f32>,
    #[arg(long)]
    saturation: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    hue: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    brightness: Option<f32>,
    /// Attractor as "x,y" in [0,1]; repeat for more. Replaces any earlier list.
    #[arg(long = "attractor", value_parser = parse_attractor)]
    attractors: Vec<AttractorPoint>,
}

fn parse_attractor(s: &str) -> Result<AttractorPoint, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in {s:?}: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in {s:?}: {e}"))?;
    Ok(AttractorPoint::new(x, y))
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    match Cli::parse().command {
        Command::Presets => {
            for p in Preset::all() {
                println!("{:<10} {}", p.name, p.description);
            }
            Ok(())
        }
        Command::Apply(args) => run(args),
    }
}

fn run(args: ApplyArgs) -> Result<(), Error> {
    /* 1) Build the parameter record: preset -> file -> flags. */
    let params = build_params(&args)?;
    debug!(?params, "parameters");

    /* 2) Decode the source image into a packed RGBA buffer. */
    let src_img = image::open(&args.input)?.to_rgba8();
    let source = PixelBuffer::from_rgba_image(&src_img);
    info!(input = %args.input.display(), width = source.width, height = source.height, "loaded");

    /* 3) Glitch it. */
    let config = PipelineConfig { max_working_width: args.max_width };
    let started = Instant::now();
    let result = apply_all_with(&config, &source, &params)?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "glitched");

    /* 4) Encode to the output path. */
    save(&result, &args.output)?;
    info!(output = %args.output.display(), "saved");

    /* 5) Optional on-screen preview. */
    if args.preview {
        preview(&result, &params)?;
    }
    Ok(())
}

fn build_params(args: &ApplyArgs) -> Result<GlitchParams, Error> {
    let mut p = match &args.preset {
        Some(name) => {
            Preset::find(name)
                .ok_or_else(|| Error::UnknownPreset(name.clone()))?
                .params
        }
        None => GlitchParams::default(),
    };

    if let Some(path) = &args.params {
        // Fields absent from the file keep what the preset set.
        let mut merged = serde_json::to_value(&p)?;
        let overrides: serde_json::Value = serde_json::from_reader(File::open(path)?)?;
        if let (Some(base), serde_json::Value::Object(extra)) =
            (merged.as_object_mut(), overrides)
        {
            base.extend(extra);
        }
        p = serde_json::from_value(merged)?;
    }

    macro_rules! set { ($($flag:ident => $field:ident),* $(,)?) => {
        $( if let Some(v) = args.$flag { p.$field = v; } )*
    }; }
    set!(
        rgb_shift => rgb_shift_pixels,
        aberration => aberration_strength,
        jitter => block_jitter_size,
        noise => noise_amount,
        scanlines => scanline_strength,
        wave_amplitude => wave_amplitude,
        wave_frequency => wave_frequency,
        sort => pixel_sort_amount,
        crush => contrast_crush,
        saturation => saturation,
        hue => hue_degrees,
        brightness => brightness_offset,
    );
    if !args.attractors.is_empty() {
        p.attractors = args.attractors.clone();
    }
    if args.seed.is_some() {
        p.seed = args.seed;
    }
    p.boost_mode |= args.boost;
    Ok(p)
}

/// JPEG at quality 95 (alpha dropped); every other extension via `image`'s defaults.
fn save(buf: &PixelBuffer, path: &Path) -> Result<(), Error> {
    let img = buf.to_rgba_image();
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => {
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            let writer = BufWriter::new(File::create(path)?);
            rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, JPEG_QUALITY))?;
        }
        _ => img.save(path)?,
    }
    Ok(())
}

fn preview(result: &PixelBuffer, params: &GlitchParams) -> Result<(), Error> {
    // Shrink very wide results so the window fits on screen.
    let scale = (PREVIEW_MAX_WIDTH as f32 / result.width as f32).min(1.0);
    let (w, h) = scaled_dimensions(result.width, result.height, scale);
    let mut screen = resample_box(result, w, h);

    for a in &params.attractors {
        let (x, y) = a.to_pixels(w, h);
        draw_crosshair(&mut screen, x as i32, y as i32, 12, 0xFF_FF_CC_33); // yellow +
    }
    draw_text_5x7(&mut screen, 8, 8, "ESC: CLOSE", 0xFF_FF_FF_FF);

    let mut drawer = Drawer::new("glitchcore preview", w, h)?;
    while drawer.is_open() && !drawer.esc_pressed() {
        drawer.present(&screen)?;
    }
    Ok(())
}
