// ============================================================================
// GPU SHADERS — all WGSL code kept inline for containment
// ============================================================================

// ============================================================================
// GRADE SHADER — the full 9-stage color grade as one compute pass
// ============================================================================
//
// This is the GPU twin of filters/pipeline.rs. Same formulas, same stage
// order, same parameter semantics; exact floating-point parity with the
// CPU path is not guaranteed (and the grain hash is a different function —
// only the qualitative grain character has to match).
pub const GRADE_SHADER: &str = r#"
struct GradeUniforms {
    strength: f32,
    exposure: f32,
    contrast: f32,
    saturation: f32,
    temp: f32,
    tint: f32,
    fade: f32,
    vignette: f32,
    grain: f32,
    seed: f32,
    width: f32,
    height: f32,
};

@group(0) @binding(0) var src_tex: texture_2d<f32>;
@group(0) @binding(1) var dst_tex: texture_storage_2d<rgba8unorm, write>;
@group(0) @binding(2) var<uniform> u: GradeUniforms;

fn rgb_to_hsl(c: vec3<f32>) -> vec3<f32> {
    let mx = max(c.r, max(c.g, c.b));
    let mn = min(c.r, min(c.g, c.b));
    let l = (mx + mn) * 0.5;
    if (mx == mn) {
        // Achromatic
        return vec3<f32>(0.0, 0.0, l);
    }
    let d = mx - mn;
    var s: f32;
    if (l > 0.5) {
        s = d / (2.0 - mx - mn);
    } else {
        s = d / (mx + mn);
    }
    var h: f32;
    if (mx == c.r) {
        h = (c.g - c.b) / d + select(0.0, 6.0, c.g < c.b);
    } else if (mx == c.g) {
        h = (c.b - c.r) / d + 2.0;
    } else {
        h = (c.r - c.g) / d + 4.0;
    }
    return vec3<f32>(h / 6.0, s, l);
}

fn hue_to_rgb(p: f32, q: f32, t_in: f32) -> f32 {
    var t = t_in;
    if (t < 0.0) { t = t + 1.0; }
    if (t > 1.0) { t = t - 1.0; }
    if (t < 1.0 / 6.0) { return p + (q - p) * 6.0 * t; }
    if (t < 0.5) { return q; }
    if (t < 2.0 / 3.0) { return p + (q - p) * (2.0 / 3.0 - t) * 6.0; }
    return p;
}

fn hsl_to_rgb(hsl: vec3<f32>) -> vec3<f32> {
    let h = hsl.x;
    let s = hsl.y;
    let l = hsl.z;
    if (s == 0.0) {
        return vec3<f32>(l, l, l);
    }
    var q: f32;
    if (l < 0.5) {
        q = l * (1.0 + s);
    } else {
        q = l + s - l * s;
    }
    let p = 2.0 * l - q;
    return vec3<f32>(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    );
}

// Pseudo-random grain noise (fract-dot hash; deterministic per position+seed)
fn hash12(p: vec2<f32>) -> f32 {
    var p3 = fract(vec3<f32>(p.x, p.y, p.x) * 0.1031);
    p3 = p3 + dot(p3, p3.yzx + vec3<f32>(33.33));
    return fract((p3.x + p3.y) * p3.z);
}

@compute @workgroup_size(16, 16)
fn cs_grade(@builtin(global_invocation_id) gid: vec3<u32>) {
    let dims = textureDimensions(src_tex);
    if (gid.x >= dims.x || gid.y >= dims.y) {
        return;
    }
    let coord = vec2<i32>(i32(gid.x), i32(gid.y));
    let original = textureLoad(src_tex, coord, 0).rgb;
    var col = original;

    // 1. Exposure (additive)
    col = clamp(col + vec3<f32>(u.exposure), vec3<f32>(0.0), vec3<f32>(1.0));

    // 2. Contrast (pivot around mid-gray)
    col = clamp((col - vec3<f32>(0.5)) * u.contrast + vec3<f32>(0.5),
                vec3<f32>(0.0), vec3<f32>(1.0));

    // 3. Saturation (HSL scale; 0 fully desaturates)
    var hsl = rgb_to_hsl(col);
    hsl.y = clamp(hsl.y * u.saturation, 0.0, 1.0);
    col = hsl_to_rgb(hsl);

    // 4. Temperature: warm raises R, lowers B
    col.r = clamp(col.r * (1.0 + u.temp), 0.0, 1.0);
    col.b = clamp(col.b * (1.0 - u.temp), 0.0, 1.0);

    // 5. Tint: magenta raises R/B and lowers G; green is the reverse
    col.r = clamp(col.r * (1.0 + u.tint * 0.5), 0.0, 1.0);
    col.g = clamp(col.g * (1.0 - u.tint), 0.0, 1.0);
    col.b = clamp(col.b * (1.0 + u.tint * 0.5), 0.0, 1.0);

    // 6. Fade / matte
    if (u.fade > 0.0) {
        let y = col * (1.0 - 0.25 * u.fade) + vec3<f32>(0.08 * u.fade);
        col = clamp(mix(y, pow(y, vec3<f32>(0.9)), 0.35 * u.fade),
                    vec3<f32>(0.0), vec3<f32>(1.0));
    }

    // 7. Vignette — same pixel-coordinate mapping as the CPU path
    if (u.vignette > 0.0) {
        let nx = (f32(gid.x) / max(u.width - 1.0, 1.0)) * 2.0 - 1.0;
        let ny = (f32(gid.y) / max(u.height - 1.0, 1.0)) * 2.0 - 1.0;
        let d = sqrt(nx * nx + ny * ny);
        let v = max(0.0, 1.0 - u.vignette * pow(min(d, 1.0), 1.7));
        col = col * v;
    }

    // 8. Grain (midtone-weighted)
    if (u.grain > 0.0) {
        let n = hash12(vec2<f32>(f32(gid.x), f32(gid.y)) + vec2<f32>(u.seed)) * 2.0 - 1.0;
        let lum = dot(col, vec3<f32>(0.2126, 0.7152, 0.0722));
        let mid_w = 1.0 - abs(lum - 0.5) * 2.0;
        let gn = n * (0.03 + 0.12 * u.grain) * mid_w;
        col = clamp(col + vec3<f32>(gn), vec3<f32>(0.0), vec3<f32>(1.0));
    }

    // 9. Blend with the original by strength; alpha forced opaque
    col = mix(original, col, u.strength);
    textureStore(dst_tex, coord, vec4<f32>(col, 1.0));
}
"#;
