//! Pixel-math contracts for the filter stage kernels, checked on the CPU
//! mirrors of the shader functions.

use glam::{Vec2, Vec3};
use phosphor::effects::{CurvatureParams, ScanlineParams};
use phosphor::renderer::kernel::{
    blur_step, bright_pass, combine_pixel, curvature_remap, hash_noise, is_cut_off, luminance,
    noise_block_px, scanline_factor, vignette_factor, GAUSSIAN_TAPS, GAUSSIAN_WEIGHTS,
    LUMA_WEIGHTS, MIN_BLUR_SCALE, NOISE_BLOCK_REF, REFERENCE_LINE_HEIGHT,
};

fn assert_approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() < eps, "expected {b}, got {a}");
}

#[test]
fn luma_weights_sum_to_one() {
    assert_approx(LUMA_WEIGHTS.element_sum(), 1.0, 1e-6);
    assert_approx(luminance(Vec3::ONE), 1.0, 1e-6);
    assert_approx(luminance(Vec3::ZERO), 0.0, 1e-6);
}

#[test]
fn gaussian_kernel_is_normalized_and_symmetric() {
    // Center tap once, every other weight mirrored.
    let total: f32 = GAUSSIAN_WEIGHTS[0] + 2.0 * GAUSSIAN_WEIGHTS[1..].iter().sum::<f32>();
    assert_approx(total, 1.0, 1e-3);
    assert_eq!(GAUSSIAN_TAPS, 9);
    // Strictly decreasing away from center.
    for pair in GAUSSIAN_WEIGHTS.windows(2) {
        assert!(pair[0] > pair[1]);
    }
}

#[test]
fn bright_pass_is_strictly_greater() {
    let gray = Vec3::splat(0.5);
    let threshold = luminance(gray);
    // Exactly at threshold resolves to black.
    assert_eq!(bright_pass(gray, threshold), Vec3::ZERO);
    assert_eq!(bright_pass(gray, threshold - 1e-4), gray);
    assert_eq!(bright_pass(gray, threshold + 1e-4), Vec3::ZERO);
}

#[test]
fn bright_pass_keeps_color_not_luma() {
    let red = Vec3::new(1.0, 0.0, 0.0);
    assert_eq!(bright_pass(red, 0.1), red);
}

#[test]
fn blur_step_clamps_small_scales() {
    assert_approx(blur_step(2.0, 1.0), 2.0, 1e-6);
    assert_approx(blur_step(2.0, 0.5), 1.0, 1e-6);
    // Scales below the floor use the floor.
    assert_approx(blur_step(2.0, 0.1), 2.0 * MIN_BLUR_SCALE, 1e-6);
    assert_approx(blur_step(2.0, MIN_BLUR_SCALE), 2.0 * MIN_BLUR_SCALE, 1e-6);
}

fn neutral_curvature() -> CurvatureParams {
    CurvatureParams {
        curvature: 0.0,
        vignette_strength: 0.0,
        vignette_size: 0.7,
        screen_scale: 1.0,
    }
}

#[test]
fn curvature_zero_is_identity() {
    let params = neutral_curvature();
    for uv in [
        Vec2::new(0.0, 0.0),
        Vec2::new(0.25, 0.75),
        Vec2::new(1.0, 1.0),
    ] {
        let out = curvature_remap(uv, &params);
        assert_approx(out.x, uv.x, 1e-6);
        assert_approx(out.y, uv.y, 1e-6);
    }
}

#[test]
fn curvature_fixes_center_and_pushes_corners_out() {
    let params = CurvatureParams {
        curvature: 0.2,
        ..neutral_curvature()
    };
    let center = curvature_remap(Vec2::splat(0.5), &params);
    assert_approx(center.x, 0.5, 1e-6);
    assert_approx(center.y, 0.5, 1e-6);

    let corner = curvature_remap(Vec2::ZERO, &params);
    assert!(corner.x < 0.0 && corner.y < 0.0);
    assert!(is_cut_off(corner));
    assert!(!is_cut_off(center));
}

#[test]
fn cut_off_boundary_is_inclusive_of_unit_square() {
    assert!(!is_cut_off(Vec2::new(0.0, 0.0)));
    assert!(!is_cut_off(Vec2::new(1.0, 1.0)));
    assert!(is_cut_off(Vec2::new(-0.001, 0.5)));
    assert!(is_cut_off(Vec2::new(0.5, 1.001)));
}

#[test]
fn scanline_intensity_zero_is_neutral() {
    let params = ScanlineParams {
        intensity: 0.0,
        frequency: 1.0,
        speed: 2.0,
        offset: 0.0,
    };
    for y in [0.0, 13.0, 512.0] {
        assert_approx(scanline_factor(y, 24.0, 3.7, &params), 1.0, 1e-6);
    }
}

#[test]
fn scanline_factor_stays_in_unit_range() {
    let params = ScanlineParams {
        intensity: 0.5,
        frequency: 1.0,
        speed: 2.0,
        offset: 0.3,
    };
    for y in 0..200 {
        let f = scanline_factor(y as f32, 24.0, 1.0, &params);
        assert!((0.0..=1.0).contains(&f));
    }
}

#[test]
fn noise_block_scales_with_line_height() {
    assert_approx(noise_block_px(REFERENCE_LINE_HEIGHT), NOISE_BLOCK_REF, 1e-6);
    assert_approx(
        noise_block_px(REFERENCE_LINE_HEIGHT / 2.0),
        NOISE_BLOCK_REF / 2.0,
        1e-6,
    );
    // Tiny line heights still produce at least one pixel.
    assert_approx(noise_block_px(0.5), 1.0, 1e-6);
}

#[test]
fn hash_noise_matches_floor_based_fract() {
    // The shader's fract is x - floor(x); the hash must agree even where
    // the sine product goes negative.
    let mut saw_negative = false;
    for bx in 0..8 {
        for by in 0..8 {
            let p = Vec2::new(bx as f32, by as f32) + Vec2::splat(5.0);
            let v = (p.dot(Vec2::new(12.9898, 78.233))).sin() * 43_758.547;
            saw_negative |= v < 0.0;
            let expected = v - v.floor();
            assert_approx(hash_noise(Vec2::new(bx as f32, by as f32), 5.0), expected, 1e-6);
        }
    }
    assert!(saw_negative);
}

#[test]
fn hash_noise_is_deterministic_and_bounded() {
    let a = hash_noise(Vec2::new(3.0, 7.0), 12.0);
    let b = hash_noise(Vec2::new(3.0, 7.0), 12.0);
    assert_eq!(a, b);
    for bx in 0..16 {
        for by in 0..16 {
            let v = hash_noise(Vec2::new(bx as f32, by as f32), 5.0);
            assert!((0.0..1.0).contains(&v));
        }
    }
}

#[test]
fn vignette_strength_zero_is_neutral() {
    let params = neutral_curvature();
    assert_approx(vignette_factor(Vec2::splat(0.5), &params), 1.0, 1e-6);
    assert_approx(vignette_factor(Vec2::ZERO, &params), 1.0, 1e-6);
}

#[test]
fn vignette_darkens_corners_not_center() {
    let params = CurvatureParams {
        vignette_strength: 0.4,
        ..neutral_curvature()
    };
    let center = vignette_factor(Vec2::splat(0.5), &params);
    let corner = vignette_factor(Vec2::ZERO, &params);
    assert_approx(center, 1.0, 1e-6);
    assert!(corner < center);
    assert!(corner >= 1.0 - params.vignette_strength - 1e-6);
}

#[test]
fn combine_with_zero_intensity_is_tinted_original() {
    let original = Vec3::new(0.2, 0.4, 0.6);
    let layers = [Vec3::splat(0.9); 3];
    let tint = Vec3::new(0.5, 1.0, 0.8);
    let out = combine_pixel(original, &layers, tint, 0.0, 0.0, 1.0, 1.0);
    let expected = original * tint;
    assert_approx(out.x, expected.x, 1e-6);
    assert_approx(out.y, expected.y, 1e-6);
    assert_approx(out.z, expected.z, 1e-6);
}

#[test]
fn combine_neutral_effects_is_original_plus_scaled_bloom() {
    let original = Vec3::splat(0.25);
    let layers = [
        Vec3::splat(0.1),
        Vec3::splat(0.2),
        Vec3::splat(0.3),
    ];
    let intensity = 0.8;
    let out = combine_pixel(original, &layers, Vec3::ONE, intensity, 0.0, 1.0, 1.0);
    let expected = 0.25 + (0.1 + 0.2 + 0.3) * intensity;
    assert_approx(out.x, expected, 1e-6);
    assert_approx(out.y, expected, 1e-6);
    assert_approx(out.z, expected, 1e-6);
}

#[test]
fn combine_applies_multiplicative_factors_last() {
    let out = combine_pixel(Vec3::ONE, &[], Vec3::ONE, 1.0, 0.0, 0.5, 0.5);
    assert_approx(out.x, 0.25, 1e-6);
}

// Full-white frame through the whole chain at threshold 0.99 and neutral
// effects: bright-pass keeps white, a normalized blur of a constant field
// stays constant, and the combine output saturates at white.
#[test]
fn white_frame_stays_white_through_the_chain() {
    let white = Vec3::ONE;
    let bright = bright_pass(white, 0.99);
    assert_eq!(bright, white);

    // Constant input: the convolution reduces to the kernel sum.
    let kernel_sum = GAUSSIAN_WEIGHTS[0] + 2.0 * GAUSSIAN_WEIGHTS[1..].iter().sum::<f32>();
    let blurred = bright * kernel_sum;
    assert_approx(blurred.x, 1.0, 1e-3);

    let out = combine_pixel(white, &[blurred], Vec3::ONE, 1.0, 0.0, 1.0, 1.0);
    // Saturates above 1; an unorm target clamps this to exactly white.
    assert!(out.min_element() >= 1.0 - 1e-3);
}
