// ============================================================================
// PRESET CATALOG — fixed, append-only table of named looks
// ============================================================================
//
// Consumers iterate `PRESETS` in declaration order; the thumbnail strip
// derives its layout from that order, so entries must only ever be appended.
// "Normal" is the identity transform and always comes first.
// ============================================================================

use super::params::FilterParams;

/// A named, read-only parameter set.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub params: FilterParams,
}

const fn preset(
    name: &'static str,
    strength: f32,
    exposure: f32,
    contrast: f32,
    saturation: f32,
    temp: f32,
    tint: f32,
    fade: f32,
    vignette: f32,
    grain: f32,
) -> Preset {
    Preset {
        name,
        params: FilterParams {
            strength,
            exposure,
            contrast,
            saturation,
            temp,
            tint,
            fade,
            vignette,
            grain,
        },
    }
}

/// The full catalog. Tuning values are hand-picked approximations of
/// well-known Instagram / Google Photos looks, hence the "-ish" names.
#[rustfmt::skip]
pub const PRESETS: &[Preset] = &[
    //     name                  strength exposure contrast saturation temp  tint   fade  vignette grain
    preset("Normal",              1.00, 0.00, 1.00, 1.00,  0.00,  0.00, 0.00, 0.00, 0.00),
    // Instagram-ish
    preset("Clarendon-ish",       0.85, 0.03, 1.22, 1.18,  0.05,  0.00, 0.06, 0.18, 0.06),
    preset("Gingham-ish",         0.90, 0.06, 0.98, 0.92,  0.02, -0.02, 0.20, 0.15, 0.07),
    preset("Juno-ish",            0.85, 0.04, 1.10, 1.28,  0.10,  0.00, 0.08, 0.18, 0.07),
    preset("Lark-ish",            0.85, 0.08, 1.05, 1.06, -0.02,  0.00, 0.10, 0.12, 0.05),
    preset("Valencia-ish",        0.90, 0.05, 0.96, 1.10,  0.12,  0.02, 0.16, 0.10, 0.06),
    preset("Lo-Fi-ish",           0.90, 0.02, 1.40, 1.25,  0.04,  0.00, 0.04, 0.38, 0.08),
    // "Inkwell-ish(BW)" has no space before the parenthesis; the name is a
    // stable lookup key (CLI --preset), so the historical spelling stays
    preset("Inkwell-ish(BW)",     1.00, 0.02, 1.35, 0.00,  0.00,  0.00, 0.10, 0.22, 0.08),
    preset("X-Pro-ish",           0.90, 0.00, 1.25, 1.12,  0.06,  0.04, 0.06, 0.30, 0.10),
    preset("Reyes-ish",           0.90, 0.10, 0.90, 0.75,  0.10, -0.02, 0.00, 0.00, 0.00),
    preset("Slumber-ish",         0.90, 0.05, 0.95, 0.66,  0.05,  0.05, 0.15, 0.20, 0.00),
    preset("Crema-ish",           0.90, 0.05, 1.00, 0.90, -0.05,  0.00, 0.10, 0.20, 0.05),
    preset("Ludwig-ish",          0.90, 0.05, 1.05, 0.95,  0.03,  0.00, 0.05, 0.05, 0.00),
    preset("Aden-ish",            0.90, 0.04, 0.90, 0.85,  0.08,  0.08, 0.12, 0.10, 0.00),
    preset("Perpetua-ish",        0.90, 0.00, 1.10, 1.10, -0.05,  0.00, 0.05, 0.15, 0.05),
    // Google Photos-ish
    preset("West-ish",            0.90, 0.05, 1.15, 0.90,  0.08,  0.02, 0.10, 0.15, 0.05),
    preset("Palma-ish",           0.90, 0.10, 1.05, 1.30,  0.06, -0.02, 0.00, 0.05, 0.00),
    preset("Metro-ish",           0.95, 0.02, 1.20, 1.05, -0.05,  0.08, 0.00, 0.10, 0.00),
    preset("Eiffel-ish",          0.90, 0.00, 1.10, 0.95, -0.04,  0.04, 0.12, 0.15, 0.04),
    preset("Blush-ish",           0.90, 0.05, 0.95, 1.10,  0.05,  0.12, 0.05, 0.00, 0.00),
    preset("Modena-ish",          0.90, 0.08, 1.15, 0.90,  0.10,  0.00, 0.00, 0.10, 0.00),
    preset("Reel-ish",            0.90, 0.05, 1.10, 1.00,  0.00,  0.00, 0.00, 0.00, 0.12),
    preset("Vogue-ish (BW)",      1.00, 0.05, 1.30, 0.00,  0.00,  0.00, 0.05, 0.15, 0.00),
    preset("Ollie-ish (BW)",      1.00, 0.00, 1.05, 0.00,  0.00,  0.00, 0.25, 0.10, 0.08),
    preset("Bazaar-ish",          0.95, 0.02, 1.25, 1.15,  0.02, -0.05, 0.00, 0.20, 0.00),
];

/// Look up a preset by its exact name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}
