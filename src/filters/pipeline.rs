// ============================================================================
// CPU PIPELINE EXECUTOR — the 9-stage grade, one pixel at a time
// ============================================================================
//
// This is one of the two implementations of the grading contract (the other
// is the WGSL compute shader in gpu/shaders.rs). Both apply the same
// formulas in the same fixed order; the stages are tuned assuming earlier
// stages already ran, so the order must never change:
//
//   exposure → contrast → saturation → temperature → tint → fade →
//   vignette → grain → strength blend
//
// Rows are processed in parallel via rayon. The source buffer is never
// mutated; the output is freshly allocated with alpha forced to opaque.
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;

use super::color::{
    apply_contrast, apply_fade, apply_temperature, apply_tint, clamp01, hsl_to_rgb, lerp, noise2d,
    rgb_to_hsl, vignette_factor,
};
use super::params::FilterParams;

/// Rec. 709 luma weights, shared by the saturation-independent grain stage.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Grade a single pixel. Channels are normalized [0,1]; `(x, y)` is the
/// pixel's own position in a `w × h` image (only vignette and grain use it).
/// No dependency on neighboring pixel values.
pub fn grade_pixel(
    r0: f32,
    g0: f32,
    b0: f32,
    params: &FilterParams,
    x: u32,
    y: u32,
    w: u32,
    h: u32,
    seed: u32,
) -> (f32, f32, f32) {
    // 1. Exposure (additive)
    let mut r = clamp01(r0 + params.exposure);
    let mut g = clamp01(g0 + params.exposure);
    let mut b = clamp01(b0 + params.exposure);

    // 2. Contrast (pivot around mid-gray)
    r = apply_contrast(r, params.contrast);
    g = apply_contrast(g, params.contrast);
    b = apply_contrast(b, params.contrast);

    // 3. Saturation (scaled in HSL space; 0 fully desaturates)
    let (hh, ss, ll) = rgb_to_hsl(r, g, b);
    let ss = clamp01(ss * params.saturation);
    (r, g, b) = hsl_to_rgb(hh, ss, ll);

    // 4. Temperature
    (r, g, b) = apply_temperature(r, g, b, params.temp);

    // 5. Tint
    (r, g, b) = apply_tint(r, g, b, params.tint);

    // 6. Fade / matte
    if params.fade > 0.0 {
        r = apply_fade(r, params.fade);
        g = apply_fade(g, params.fade);
        b = apply_fade(b, params.fade);
    }

    // 7. Vignette (factor is exactly 1.0 when disabled)
    let v = vignette_factor(x, y, w, h, params.vignette);
    r *= v;
    g *= v;
    b *= v;

    // 8. Grain (midtone-weighted; skipped entirely at 0 so the identity
    //    preset stays bit-stable)
    if params.grain > 0.0 {
        let n = noise2d(x, y, seed) * 2.0 - 1.0;
        let lum = LUMA_R * r + LUMA_G * g + LUMA_B * b;
        let mid_w = 1.0 - (lum - 0.5).abs() * 2.0;
        let gn = n * (0.03 + 0.12 * params.grain) * mid_w;
        r = clamp01(r + gn);
        g = clamp01(g + gn);
        b = clamp01(b + gn);
    }

    // 9. Blend with the original by strength
    (
        lerp(r0, r, params.strength),
        lerp(g0, g, params.strength),
        lerp(b0, b, params.strength),
    )
}

/// Grade a full buffer. Pure with respect to `source`: the result is a new
/// allocation of identical dimensions, alpha forced to 255. Quantization to
/// 8 bits happens only here, never mid-pipeline.
pub fn render(source: &RgbaImage, params: &FilterParams, seed: u32) -> RgbaImage {
    let w = source.width();
    let h = source.height();
    if w == 0 || h == 0 {
        return RgbaImage::new(w, h);
    }

    let src_raw = source.as_raw();
    let stride = w as usize * 4;
    let mut dst_raw = vec![0u8; stride * h as usize];

    dst_raw
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row_out)| {
            let row_in = &src_raw[y * stride..(y + 1) * stride];
            for x in 0..w as usize {
                let pi = x * 4;
                let r0 = row_in[pi] as f32 / 255.0;
                let g0 = row_in[pi + 1] as f32 / 255.0;
                let b0 = row_in[pi + 2] as f32 / 255.0;

                let (r, g, b) =
                    grade_pixel(r0, g0, b0, params, x as u32, y as u32, w, h, seed);

                row_out[pi] = (r * 255.0 + 0.5) as u8;
                row_out[pi + 1] = (g * 255.0 + 0.5) as u8;
                row_out[pi + 2] = (b * 255.0 + 0.5) as u8;
                row_out[pi + 3] = 255;
            }
        });

    RgbaImage::from_raw(w, h, dst_raw).expect("output buffer sized from source dimensions")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// A small buffer with varied colors, gradients and extremes.
    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(16, 12, |x, y| {
            Rgba([
                (x * 16) as u8,
                (y * 21) as u8,
                ((x + y) * 9) as u8,
                255,
            ])
        })
    }

    #[test]
    fn neutral_params_are_exact_identity() {
        let src = test_image();
        let out = render(&src, &FilterParams::default(), 7);
        assert_eq!(src.as_raw(), out.as_raw());
    }

    #[test]
    fn strength_zero_reproduces_source_exactly() {
        let src = test_image();
        // Wild knobs everywhere — strength 0 must still win
        let params = FilterParams {
            strength: 0.0,
            exposure: 0.4,
            contrast: 1.9,
            saturation: 0.0,
            temp: 0.3,
            tint: -0.3,
            fade: 0.5,
            vignette: 1.0,
            grain: 1.0,
        };
        let out = render(&src, &params, 123);
        assert_eq!(src.as_raw(), out.as_raw());
    }

    #[test]
    fn saturation_zero_yields_grayscale() {
        let src = test_image();
        let params = FilterParams {
            saturation: 0.0,
            ..Default::default()
        };
        let out = render(&src, &params, 0);
        for p in out.pixels() {
            let [r, g, b, _] = p.0;
            // Quantization can split equal channels by at most one step
            assert!(r.abs_diff(g) <= 1 && g.abs_diff(b) <= 1, "not gray: {:?}", p.0);
        }
    }

    #[test]
    fn grain_zero_is_bitwise_noop() {
        let src = test_image();
        let base = FilterParams {
            exposure: 0.05,
            contrast: 1.1,
            ..Default::default()
        };
        let with_zero_grain = FilterParams { grain: 0.0, ..base };
        // Different seeds must not matter when grain is off
        let a = render(&src, &with_zero_grain, 1);
        let b = render(&src, &with_zero_grain, 2);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn grain_is_reproducible_per_seed() {
        let src = test_image();
        let params = FilterParams {
            grain: 0.5,
            ..Default::default()
        };
        let a = render(&src, &params, 42);
        let b = render(&src, &params, 42);
        let c = render(&src, &params, 43);
        assert_eq!(a.as_raw(), b.as_raw());
        assert_ne!(a.as_raw(), c.as_raw());
    }

    #[test]
    fn vignette_darkens_corners_not_center() {
        let src = RgbaImage::from_pixel(33, 33, Rgba([128, 128, 128, 255]));
        let params = FilterParams {
            vignette: 0.8,
            ..Default::default()
        };
        let out = render(&src, &params, 0);
        let center = out.get_pixel(16, 16).0;
        let corner = out.get_pixel(0, 0).0;
        assert_eq!(center, [128, 128, 128, 255]);
        assert!(corner[0] < 128);
    }

    #[test]
    fn output_alpha_is_always_opaque() {
        let mut src = test_image();
        src.put_pixel(3, 3, Rgba([10, 20, 30, 0]));
        src.put_pixel(4, 4, Rgba([10, 20, 30, 77]));
        let out = render(
            &src,
            &FilterParams {
                exposure: 0.1,
                ..Default::default()
            },
            0,
        );
        for p in out.pixels() {
            assert_eq!(p.0[3], 255);
        }
    }

    #[test]
    fn source_is_not_mutated_and_dimensions_match() {
        let src = test_image();
        let before = src.clone();
        let params = FilterParams {
            contrast: 1.5,
            vignette: 0.5,
            ..Default::default()
        };
        let out = render(&src, &params, 9);
        assert_eq!(src.as_raw(), before.as_raw());
        assert_eq!(out.dimensions(), src.dimensions());
    }

    #[test]
    fn extreme_params_stay_in_range() {
        let src = test_image();
        let params = FilterParams {
            strength: 2.0,
            exposure: 5.0,
            contrast: -3.0,
            saturation: 10.0,
            temp: 2.0,
            tint: -2.0,
            fade: 3.0,
            vignette: 9.0,
            grain: 4.0,
        };
        // Must not panic; u8 output is valid by construction, just make
        // sure the blend's unclamped extrapolation survived quantization.
        let out = render(&src, &params, 5);
        assert_eq!(out.dimensions(), src.dimensions());
    }

    #[test]
    fn empty_buffer_is_handled() {
        let src = RgbaImage::new(0, 0);
        let out = render(&src, &FilterParams::default(), 0);
        assert_eq!(out.dimensions(), (0, 0));
    }
}
