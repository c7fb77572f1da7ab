// ============================================================================
// COLOR FUNCTIONS — pure scalar math shared by every grading stage
// ============================================================================
//
// Everything here is stateless and side-effect free. All channel values are
// normalized f32 in [0,1]; each function clamps its own output so extreme
// parameter values degrade into extreme-but-valid pixels, never NaN.
// Quantization back to u8 happens only at the final buffer write in the
// pipeline, never here.
// ============================================================================

/// Clamp a channel value to the normalized [0,1] range.
#[inline]
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Linear interpolation. No bounds are enforced on `t`; callers pass
/// `t ∈ [0,1]` by convention.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// RGB → HSL. Hue is normalized to [0,1) (not degrees); saturation and
/// lightness are in [0,1].
pub fn rgb_to_hsl(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        // Achromatic — hue is undefined, report 0
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let mut h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h /= 6.0;

    (h, s, l)
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// HSL → RGB. Inverse of [`rgb_to_hsl`]; the round-trip is exact to within
/// floating-point tolerance (≈1e-6) for inputs inside [0,1]³.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (l, l, l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

/// Contrast curve pivoting around mid-gray. `c = 1` is identity, `c > 1`
/// steepens, `c < 1` flattens, `c = 0` collapses to flat 0.5.
#[inline]
pub fn apply_contrast(x: f32, c: f32) -> f32 {
    clamp01((x - 0.5) * c + 0.5)
}

/// "Fade / matte" tone curve: lifts blacks, then softens highlight rolloff.
/// `amount ∈ [0, 0.5]`.
#[inline]
pub fn apply_fade(x: f32, amount: f32) -> f32 {
    // Lift blacks and compress the overall range
    let y = x * (1.0 - 0.25 * amount) + 0.08 * amount;
    // Soften highlights
    let y = lerp(y, y.powf(0.9), 0.35 * amount);
    clamp01(y)
}

/// Temperature shift: positive `t` warms (more red, less blue), negative
/// cools. `t ∈ [−0.3, 0.3]`. Green is untouched.
#[inline]
pub fn apply_temperature(r: f32, g: f32, b: f32, t: f32) -> (f32, f32, f32) {
    (clamp01(r * (1.0 + t)), g, clamp01(b * (1.0 - t)))
}

/// Tint shift: positive `t` pushes toward magenta (raise R/B, lower G),
/// negative toward green. `t ∈ [−0.3, 0.3]`.
#[inline]
pub fn apply_tint(r: f32, g: f32, b: f32, t: f32) -> (f32, f32, f32) {
    (
        clamp01(r * (1.0 + t * 0.5)),
        clamp01(g * (1.0 - t)),
        clamp01(b * (1.0 + t * 0.5)),
    )
}

/// Radial darkening factor for the pixel at `(x, y)` in a `w × h` image.
/// Returns exactly 1.0 when `strength ≤ 0` so a disabled vignette is a
/// bit-stable no-op.
pub fn vignette_factor(x: u32, y: u32, w: u32, h: u32, strength: f32) -> f32 {
    if strength <= 0.0 {
        return 1.0;
    }
    // Map to normalized [-1,1]² coordinates (corner pixels land exactly on ±1)
    let nx = (x as f32 / (w.saturating_sub(1)).max(1) as f32) * 2.0 - 1.0;
    let ny = (y as f32 / (h.saturating_sub(1)).max(1) as f32) * 2.0 - 1.0;
    let d = (nx * nx + ny * ny).sqrt();
    let v = 1.0 - strength * d.min(1.0).powf(1.7);
    v.max(0.0)
}

/// Deterministic integer-hash pseudo-random noise in [0,1).
///
/// Same `(x, y, seed)` always yields the same value — required so grain is
/// reproducible across repeated renders with the same seed. All arithmetic
/// wraps; distinct seeds at a fixed position produce different values.
pub fn noise2d(x: u32, y: u32, seed: u32) -> f32 {
    let mut n = x
        .wrapping_mul(374_761_393)
        .wrapping_add(y.wrapping_mul(668_265_263))
        .wrapping_add(seed.wrapping_mul(1_442_695_041));
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^= n >> 16;
    n as f32 / 4_294_967_296.0
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap deterministic generator for test inputs (no rand dependency).
    fn pseudo(seq: &mut u32) -> f32 {
        *seq = seq.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (*seq >> 8) as f32 / 16_777_216.0
    }

    #[test]
    fn clamp01_bounds() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(0.2, 0.8, 0.0), 0.2);
        assert_eq!(lerp(0.2, 0.8, 1.0), 0.8);
        assert!((lerp(0.0, 1.0, 0.5) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn hsl_round_trip_random_triples() {
        let mut seq = 0x1234_5678u32;
        for _ in 0..1000 {
            let r = pseudo(&mut seq);
            let g = pseudo(&mut seq);
            let b = pseudo(&mut seq);
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let (r2, g2, b2) = hsl_to_rgb(h, s, l);
            assert!(
                (r - r2).abs() < 1e-5 && (g - g2).abs() < 1e-5 && (b - b2).abs() < 1e-5,
                "round trip drifted: ({r},{g},{b}) -> ({r2},{g2},{b2})"
            );
        }
    }

    #[test]
    fn hsl_hue_is_normalized() {
        let mut seq = 0xDEAD_BEEFu32;
        for _ in 0..200 {
            let (h, s, l) = rgb_to_hsl(pseudo(&mut seq), pseudo(&mut seq), pseudo(&mut seq));
            assert!((0.0..1.0).contains(&h), "hue out of [0,1): {h}");
            assert!((0.0..=1.0).contains(&s));
            assert!((0.0..=1.0).contains(&l));
        }
    }

    #[test]
    fn contrast_identity_and_monotonicity() {
        for x in [0.0f32, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0] {
            assert!((apply_contrast(x, 1.0) - x).abs() < 1e-6);
        }
        // c > 1 pushes values away from mid-gray
        assert!(apply_contrast(0.3, 1.5) < 0.3);
        assert!(apply_contrast(0.7, 1.5) > 0.7);
        // c = 0 collapses everything to 0.5
        assert_eq!(apply_contrast(0.1, 0.0), 0.5);
        assert_eq!(apply_contrast(0.9, 0.0), 0.5);
    }

    #[test]
    fn fade_lifts_blacks_and_stays_in_range() {
        assert_eq!(apply_fade(0.5, 0.0), 0.5);
        // Black floor gets raised
        assert!(apply_fade(0.0, 0.4) > 0.0);
        // Highlights get compressed, never pushed past 1
        assert!(apply_fade(1.0, 0.4) < 1.0);
        for x in [0.0f32, 0.25, 0.5, 0.75, 1.0] {
            let y = apply_fade(x, 0.5);
            assert!((0.0..=1.0).contains(&y));
        }
    }

    #[test]
    fn temperature_warms_and_cools() {
        let (r, g, b) = apply_temperature(0.5, 0.5, 0.5, 0.2);
        assert!(r > 0.5 && b < 0.5);
        assert_eq!(g, 0.5);
        let (r, _, b) = apply_temperature(0.5, 0.5, 0.5, -0.2);
        assert!(r < 0.5 && b > 0.5);
    }

    #[test]
    fn tint_shifts_magenta_and_green() {
        let (r, g, b) = apply_tint(0.5, 0.5, 0.5, 0.2);
        assert!(r > 0.5 && b > 0.5 && g < 0.5);
        let (r, g, b) = apply_tint(0.5, 0.5, 0.5, -0.2);
        assert!(r < 0.5 && b < 0.5 && g > 0.5);
    }

    #[test]
    fn vignette_center_and_corner() {
        // Disabled vignette is an exact no-op
        assert_eq!(vignette_factor(3, 17, 100, 100, 0.0), 1.0);
        assert_eq!(vignette_factor(3, 17, 100, 100, -1.0), 1.0);
        // Exact center of an odd-sized image: d = 0 → factor 1
        assert_eq!(vignette_factor(50, 50, 101, 101, 0.8), 1.0);
        // Far corner is darkened
        assert!(vignette_factor(100, 100, 101, 101, 0.8) < 1.0);
        // Never negative, even at absurd strength
        assert_eq!(vignette_factor(100, 100, 101, 101, 50.0), 0.0);
    }

    #[test]
    fn noise_is_deterministic_and_seed_sensitive() {
        let a = noise2d(12, 34, 99);
        let b = noise2d(12, 34, 99);
        assert_eq!(a, b);
        assert_ne!(noise2d(12, 34, 99), noise2d(12, 34, 100));
        assert_ne!(noise2d(12, 34, 99), noise2d(13, 34, 99));
        for i in 0..500u32 {
            let n = noise2d(i, i.wrapping_mul(7), 42);
            assert!((0.0..1.0).contains(&n));
        }
    }
}
