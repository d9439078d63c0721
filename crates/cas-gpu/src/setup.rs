//! Sharpening kernel parameter derivation.
//!
//! Packs the scaling and sharpness terms consumed by the compute kernel
//! into two constant vectors, the layout the kernel reads them in.

/// Largest supported destination/source area ratio for the scaling kernel.
///
/// Exceeding it degrades quality but is not an error; callers emit a
/// warning and proceed.
pub const AREA_LIMIT: f32 = 4.0;

/// Derives the two packed constant vectors for a dispatch.
///
/// `sharpness` arrives unvalidated and is saturated to [0, 1] here. The
/// peak sharpening coefficient maps 0 to -1/8 and 1 to -1/5.
pub fn derive_constants(
    sharpness: f32,
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
) -> ([f32; 4], [f32; 4]) {
    let (src_w, src_h) = (src_w as f32, src_h as f32);
    let (dst_w, dst_h) = (dst_w as f32, dst_h as f32);

    // Scaling terms: rcp-scale and half-texel offset.
    let scale_x = src_w / dst_w;
    let scale_y = src_h / dst_h;
    let const0 = [scale_x, scale_y, 0.5 * scale_x - 0.5, 0.5 * scale_y - 0.5];

    let t = sharpness.clamp(0.0, 1.0);
    let peak = -1.0 / (8.0 + (5.0 - 8.0) * t);
    let const1 = [peak, 0.0, 8.0 * scale_x, 0.0];

    (const0, const1)
}

/// Whether the destination/source area ratio is within the supported range.
pub fn scale_supported(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> bool {
    let src_area = src_w as f32 * src_h as f32;
    let dst_area = dst_w as f32 * dst_h as f32;
    dst_area / src_area <= AREA_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_peak_range() {
        let (_, c1) = derive_constants(0.0, 100, 100, 100, 100);
        assert_relative_eq!(c1[0], -1.0 / 8.0);

        let (_, c1) = derive_constants(1.0, 100, 100, 100, 100);
        assert_relative_eq!(c1[0], -1.0 / 5.0);
    }

    #[test]
    fn test_sharpness_is_saturated_not_rejected() {
        let (_, at_max) = derive_constants(1.0, 100, 100, 100, 100);
        let (_, beyond) = derive_constants(5.0, 100, 100, 100, 100);
        assert_relative_eq!(beyond[0], at_max[0]);

        let (_, at_min) = derive_constants(0.0, 100, 100, 100, 100);
        let (_, below) = derive_constants(-3.0, 100, 100, 100, 100);
        assert_relative_eq!(below[0], at_min[0]);
    }

    #[test]
    fn test_scaling_terms() {
        let (c0, c1) = derive_constants(0.0, 100, 100, 50, 50);
        assert_relative_eq!(c0[0], 2.0);
        assert_relative_eq!(c0[1], 2.0);
        assert_relative_eq!(c0[2], 0.5);
        assert_relative_eq!(c0[3], 0.5);
        assert_relative_eq!(c1[2], 16.0);
    }

    #[test]
    fn test_identity_scaling_terms() {
        let (c0, _) = derive_constants(0.5, 64, 48, 64, 48);
        assert_relative_eq!(c0[0], 1.0);
        assert_relative_eq!(c0[1], 1.0);
        assert_relative_eq!(c0[2], 0.0);
        assert_relative_eq!(c0[3], 0.0);
    }

    #[test]
    fn test_area_limit_boundary() {
        // Exactly 4x the area is still supported.
        assert!(scale_supported(100, 100, 200, 200));
        assert!(!scale_supported(100, 100, 201, 200));
        // Identity and downscale always are.
        assert!(scale_supported(200, 200, 200, 200));
        assert!(scale_supported(200, 200, 50, 50));
    }
}
