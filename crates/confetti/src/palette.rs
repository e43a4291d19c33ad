use bevy::prelude::*;
use rand::Rng;

/// A fixed list of RGB triples a particle can take its base color from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Display name.
    pub name: &'static str,
    /// Colors as 8-bit sRGB triples.
    pub colors: &'static [[u8; 3]],
}

impl Palette {
    /// Red through violet.
    pub const RAINBOW: Palette = Palette {
        name: "rainbow",
        colors: &[
            [255, 0, 0],
            [255, 165, 0],
            [255, 255, 0],
            [0, 255, 0],
            [0, 0, 255],
            [75, 0, 130],
            [238, 130, 238],
        ],
    };

    /// Gold, silver, bronze and a hot pink accent.
    pub const METALLIC: Palette = Palette {
        name: "metallic",
        colors: &[[255, 215, 0], [192, 192, 192], [205, 127, 50], [255, 20, 147]],
    };

    /// Saturated fluorescent tones.
    pub const NEON: Palette = Palette {
        name: "neon",
        colors: &[[57, 255, 20], [255, 20, 147], [0, 191, 255], [255, 105, 180]],
    };

    /// Every built-in palette.
    pub const ALL: [Palette; 3] = [Self::RAINBOW, Self::METALLIC, Self::NEON];

    /// Picks a palette uniformly, then a color from it uniformly.
    pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> [u8; 3] {
        let palette = &Self::ALL[rng.random_range(0..Self::ALL.len())];
        palette.colors[rng.random_range(0..palette.colors.len())]
    }
}

/// Scales an RGB triple by `brightness` and attaches an 8-bit alpha.
///
/// Channels saturate at 255, matching integer truncation of the scaled value.
pub fn shade(rgb: [u8; 3], brightness: f32, alpha: u8) -> Srgba {
    let channel = |c: u8| (f32::from(c) * brightness).clamp(0.0, 255.0) as u8;
    Srgba::rgba_u8(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), alpha)
}
