//! WGSL sources for the sharpen-and-resize kernels.
//!
//! Four variants exist: {display, linear} transfer x {general, fixed-ratio}
//! scaling. The transfer pair is fixed at pipeline creation; the scaling
//! variant is picked per dispatch. Sources are assembled from immutable
//! fragments and never change afterwards.

use crate::pipeline::{KernelColorSpace, ScalingVariant};

/// Square workgroup edge; each workgroup covers a 16x16 destination tile.
pub const WORKGROUP_DIM: u32 = 16;

/// Number of workgroups needed to cover a destination image.
#[inline]
pub fn dispatch_extent(dst_w: u32, dst_h: u32) -> (u32, u32, u32) {
    (
        dst_w.div_ceil(WORKGROUP_DIM),
        dst_h.div_ceil(WORKGROUP_DIM),
        1,
    )
}

/// Assembles the WGSL source for one kernel variant.
pub fn source(color: KernelColorSpace, scaling: ScalingVariant) -> String {
    let transfer = match color {
        KernelColorSpace::Display => TRANSFER_DISPLAY,
        KernelColorSpace::Linear => TRANSFER_LINEAR,
    };
    let body = match scaling {
        ScalingVariant::General => BODY_GENERAL,
        ScalingVariant::FixedRatio => BODY_FIXED_RATIO,
    };
    [transfer, COMMON, body].concat()
}

/// Bindings, parameter layout, and pixel access shared by all variants.
const COMMON: &str = r#"
struct Params {
    const0: vec4<f32>,
    const1: vec4<f32>,
    src_size: vec2<u32>,
    dst_size: vec2<u32>,
}

@group(0) @binding(0) var<storage, read> src: array<f32>;
@group(0) @binding(1) var<storage, read_write> dst: array<f32>;
@group(0) @binding(2) var<uniform> params: Params;

fn src_base(p: vec2<i32>) -> u32 {
    let size = vec2<i32>(params.src_size);
    let q = clamp(p, vec2<i32>(0, 0), size - vec2<i32>(1, 1));
    return (u32(q.y) * params.src_size.x + u32(q.x)) * 4u;
}

fn load_rgb(p: vec2<i32>) -> vec3<f32> {
    let base = src_base(p);
    return input_transfer(vec3<f32>(src[base], src[base + 1u], src[base + 2u]));
}

fn load_alpha(p: vec2<i32>) -> f32 {
    return src[src_base(p) + 3u];
}

fn store_pixel(p: vec2<u32>, rgb: vec3<f32>, alpha: f32) {
    let base = (p.y * params.dst_size.x + p.x) * 4u;
    let encoded = output_transfer(rgb);
    dst[base] = encoded.x;
    dst[base + 1u] = encoded.y;
    dst[base + 2u] = encoded.z;
    dst[base + 3u] = alpha;
}
"#;

/// Display-encoded variant: taps are linearized on load and re-encoded on
/// store.
const TRANSFER_DISPLAY: &str = r#"
fn input_transfer(c: vec3<f32>) -> vec3<f32> {
    let lo = c / 12.92;
    let hi = pow((c + vec3<f32>(0.055)) / 1.055, vec3<f32>(2.4));
    return select(lo, hi, c > vec3<f32>(0.04045));
}

fn output_transfer(c: vec3<f32>) -> vec3<f32> {
    let lo = c * 12.92;
    let hi = 1.055 * pow(c, vec3<f32>(1.0 / 2.4)) - vec3<f32>(0.055);
    return select(lo, hi, c > vec3<f32>(0.0031308));
}
"#;

/// Linear variant: values are filtered as stored.
const TRANSFER_LINEAR: &str = r#"
fn input_transfer(c: vec3<f32>) -> vec3<f32> {
    return c;
}

fn output_transfer(c: vec3<f32>) -> vec3<f32> {
    return c;
}
"#;

/// Fixed-ratio-1 kernel: sharpening only, no scaling logic.
const BODY_FIXED_RATIO: &str = r#"
@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if id.x >= params.dst_size.x || id.y >= params.dst_size.y {
        return;
    }
    let ip = vec2<i32>(id.xy);

    // 3x3 neighborhood, corners unused:
    //   . b .
    //   d e f
    //   . h .
    let b = load_rgb(ip + vec2<i32>(0, -1));
    let d = load_rgb(ip + vec2<i32>(-1, 0));
    let e = load_rgb(ip);
    let f = load_rgb(ip + vec2<i32>(1, 0));
    let h = load_rgb(ip + vec2<i32>(0, 1));

    let mn = min(min(min(d, e), f), min(b, h));
    let mx = max(max(max(d, e), f), max(b, h));

    // Soft distance to the signal limit over the local max, sqrt shaped.
    let amp = sqrt(clamp(
        min(mn, 2.0 - mx) / max(mx, vec3<f32>(1.0e-5)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    ));
    let peak = params.const1.x;
    let w = amp * peak;

    let rcp_weight = vec3<f32>(1.0) / (vec3<f32>(1.0) + 4.0 * w);
    let rgb = clamp(
        ((b + d + f + h) * w + e) * rcp_weight,
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    );
    store_pixel(id.xy, rgb, load_alpha(ip));
}
"#;

/// General kernel: adaptively blends four sharpened results around the
/// source footprint of each destination pixel.
const BODY_GENERAL: &str = r#"
@compute @workgroup_size(16, 16)
fn main(@builtin(global_invocation_id) id: vec3<u32>) {
    if id.x >= params.dst_size.x || id.y >= params.dst_size.y {
        return;
    }

    // Destination pixel mapped into the source footprint.
    var pp = vec2<f32>(vec2<i32>(id.xy)) * params.const0.xy + params.const0.zw;
    let fp = floor(pp);
    pp = pp - fp;
    let sp = vec2<i32>(fp);

    // 12-tap pattern around the footprint, corners unused:
    //     b c
    //   e f g h
    //   i j k l
    //     n o
    let b = load_rgb(sp + vec2<i32>(0, -1));
    let c = load_rgb(sp + vec2<i32>(1, -1));
    let e = load_rgb(sp + vec2<i32>(-1, 0));
    let f = load_rgb(sp);
    let g = load_rgb(sp + vec2<i32>(1, 0));
    let h = load_rgb(sp + vec2<i32>(2, 0));
    let i = load_rgb(sp + vec2<i32>(-1, 1));
    let j = load_rgb(sp + vec2<i32>(0, 1));
    let k = load_rgb(sp + vec2<i32>(1, 1));
    let l = load_rgb(sp + vec2<i32>(2, 1));
    let n = load_rgb(sp + vec2<i32>(0, 2));
    let o = load_rgb(sp + vec2<i32>(1, 2));

    // Soft min/max of the plus-shaped ring around each of the four
    // nearest taps.
    let mn_f = min(min(min(b, e), min(f, g)), j);
    let mx_f = max(max(max(b, e), max(f, g)), j);
    let mn_g = min(min(min(c, f), min(g, h)), k);
    let mx_g = max(max(max(c, f), max(g, h)), k);
    let mn_j = min(min(min(f, i), min(j, k)), n);
    let mx_j = max(max(max(f, i), max(j, k)), n);
    let mn_k = min(min(min(g, j), min(k, l)), o);
    let mx_k = max(max(max(g, j), max(k, l)), o);

    let peak = params.const1.x;
    let w_f = peak * sqrt(clamp(
        min(mn_f, 2.0 - mx_f) / max(mx_f, vec3<f32>(1.0e-5)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    ));
    let w_g = peak * sqrt(clamp(
        min(mn_g, 2.0 - mx_g) / max(mx_g, vec3<f32>(1.0e-5)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    ));
    let w_j = peak * sqrt(clamp(
        min(mn_j, 2.0 - mx_j) / max(mx_j, vec3<f32>(1.0e-5)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    ));
    let w_k = peak * sqrt(clamp(
        min(mn_k, 2.0 - mx_k) / max(mx_k, vec3<f32>(1.0e-5)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    ));

    // Bilinear weights, thinned on edges to hide the interpolation.
    var s = (1.0 - pp.x) * (1.0 - pp.y);
    var t = pp.x * (1.0 - pp.y);
    var u = (1.0 - pp.x) * pp.y;
    var v = pp.x * pp.y;
    let thin = 1.0 / 32.0;
    s = s / (thin + mx_f.y - mn_f.y);
    t = t / (thin + mx_g.y - mn_g.y);
    u = u / (thin + mx_j.y - mn_j.y);
    v = v / (thin + mx_k.y - mn_k.y);

    let accum = b * (w_f * s) + c * (w_g * t)
        + e * (w_f * s)
        + f * (vec3<f32>(s) + w_g * t + w_j * u)
        + g * (vec3<f32>(t) + w_f * s + w_k * v)
        + h * (w_g * t)
        + i * (w_j * u)
        + j * (vec3<f32>(u) + w_f * s + w_k * v)
        + k * (vec3<f32>(v) + w_g * t + w_j * u)
        + l * (w_k * v)
        + n * (w_j * u)
        + o * (w_k * v);
    let total = (vec3<f32>(1.0) + 4.0 * w_f) * s
        + (vec3<f32>(1.0) + 4.0 * w_g) * t
        + (vec3<f32>(1.0) + 4.0 * w_j) * u
        + (vec3<f32>(1.0) + 4.0 * w_k) * v;
    let rgb = clamp(
        accum / max(total, vec3<f32>(1.0e-5)),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    );

    let alpha = load_alpha(sp) * (1.0 - pp.x) * (1.0 - pp.y)
        + load_alpha(sp + vec2<i32>(1, 0)) * pp.x * (1.0 - pp.y)
        + load_alpha(sp + vec2<i32>(0, 1)) * (1.0 - pp.x) * pp.y
        + load_alpha(sp + vec2<i32>(1, 1)) * pp.x * pp.y;
    store_pixel(id.xy, rgb, alpha);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_extent_tiles() {
        assert_eq!(dispatch_extent(50, 50), (4, 4, 1));
        assert_eq!(dispatch_extent(200, 200), (13, 13, 1));
        assert_eq!(dispatch_extent(16, 16), (1, 1, 1));
        assert_eq!(dispatch_extent(17, 16), (2, 1, 1));
        assert_eq!(dispatch_extent(1, 1), (1, 1, 1));
    }

    #[test]
    fn test_variants_are_distinct() {
        let a = source(KernelColorSpace::Display, ScalingVariant::General);
        let b = source(KernelColorSpace::Display, ScalingVariant::FixedRatio);
        let c = source(KernelColorSpace::Linear, ScalingVariant::General);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert!(a.contains("@workgroup_size(16, 16)"));
    }

    #[test]
    fn test_all_variants_validate() {
        for color in [KernelColorSpace::Display, KernelColorSpace::Linear] {
            for scaling in [ScalingVariant::General, ScalingVariant::FixedRatio] {
                let wgsl = source(color, scaling);
                let module = naga::front::wgsl::parse_str(&wgsl)
                    .unwrap_or_else(|e| panic!("{color:?}/{scaling:?}: {e}"));
                naga::valid::Validator::new(
                    naga::valid::ValidationFlags::all(),
                    naga::valid::Capabilities::default(),
                )
                .validate(&module)
                .unwrap_or_else(|e| panic!("{color:?}/{scaling:?}: {e:?}"));
            }
        }
    }
}
