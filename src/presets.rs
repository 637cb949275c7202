// Named starting points for the parameter set.
// Each preset is a complete GlitchParams, already inside every documented range.

use crate::types::{AttractorPoint, GlitchParams};

#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub params: GlitchParams,
}

impl Preset {
    pub fn all() -> Vec<Preset> {
        let neutral = GlitchParams::default();
        vec![
            Preset {
                name: "clean",
                description: "everything off",
                params: neutral.clone(),
            },
            Preset {
                name: "vhs",
                description: "soft channel bleed, scanlines and tape grain",
                params: GlitchParams {
                    rgb_shift_pixels: 6.0,
                    aberration_strength: 0.4,
                    noise_amount: 0.25,
                    scanline_strength: 0.8,
                    saturation: 0.85,
                    hue_degrees: -6.0,
                    brightness_offset: 0.03,
                    ..neutral.clone()
                },
            },
            Preset {
                name: "datamosh",
                description: "blocky tearing and sorted streaks",
                params: GlitchParams {
                    rgb_shift_pixels: 10.0,
                    block_jitter_size: 24,
                    pixel_sort_amount: 0.6,
                    noise_amount: 0.1,
                    contrast_crush: 0.2,
                    saturation: 1.2,
                    ..neutral.clone()
                },
            },
            Preset {
                name: "melt",
                description: "rippling warp around two attractors",
                params: GlitchParams {
                    wave_amplitude: 28.0,
                    wave_frequency: 3.0,
                    attractors: vec![
                        AttractorPoint::new(0.3, 0.35),
                        AttractorPoint::new(0.7, 0.65),
                    ],
                    aberration_strength: 0.6,
                    saturation: 1.3,
                    hue_degrees: 20.0,
                    ..neutral.clone()
                },
            },
            Preset {
                name: "neon",
                description: "hot colors, wide split, hard contrast",
                params: GlitchParams {
                    rgb_shift_pixels: 14.0,
                    aberration_strength: 1.0,
                    saturation: 1.8,
                    hue_degrees: 45.0,
                    contrast_crush: 0.4,
                    brightness_offset: 0.05,
                    ..neutral.clone()
                },
            },
            Preset {
                name: "crushed",
                description: "washed-out grayscale with heavy grain",
                params: GlitchParams {
                    noise_amount: 0.6,
                    scanline_strength: 0.5,
                    contrast_crush: 0.9,
                    saturation: 0.0,
                    brightness_offset: -0.1,
                    ..neutral
                },
            },
        ]
    }

    /// Case-insensitive lookup by name.
    pub fn find(name: &str) -> Option<Preset> {
        Self::all().into_iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }
}
