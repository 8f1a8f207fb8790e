//! Filter Stage Math
//!
//! Canonical definitions of the per-pixel math used by the WGSL filter
//! stages. The shader sources in `renderer/shaders/` mirror these functions
//! and constant tables exactly; the CPU side is used for parameter
//! derivation (blur step sizes, noise block sizing) and for verifying the
//! pixel-level contracts without a GPU adapter.

use glam::{Vec2, Vec3};

use crate::effects::{CurvatureParams, ScanlineParams};

// ─── Constant Tables ──────────────────────────────────────────────────────────

/// Rec. 601 luma coefficients used by the bright-pass stage.
pub const LUMA_WEIGHTS: Vec3 = Vec3::new(0.299, 0.587, 0.114);

/// One-sided Gaussian weights, center tap first. The blur stage samples the
/// center once and each remaining weight twice (mirrored), for
/// [`GAUSSIAN_TAPS`] taps total. The table sums to 1 across the full kernel.
pub const GAUSSIAN_WEIGHTS: [f32; 5] = [0.227_027, 0.194_594_6, 0.121_621_6, 0.054_054, 0.016_216];

/// Total tap count of the separable Gaussian kernel.
pub const GAUSSIAN_TAPS: usize = GAUSSIAN_WEIGHTS.len() * 2 - 1;

/// Lower bound on the per-pass radius multiplier. Empirical tuning constant
/// carried over from the original effect: without it, low-resolution blur
/// iterations sample too tightly and the widest bloom ring collapses.
pub const MIN_BLUR_SCALE: f32 = 0.3;

/// Text row height, in device pixels, at which the effect was tuned.
/// Scanline frequency and noise block size scale by
/// `line_height / REFERENCE_LINE_HEIGHT`.
pub const REFERENCE_LINE_HEIGHT: f32 = 48.0;

/// Noise block edge length, in device pixels, at the reference line height.
pub const NOISE_BLOCK_REF: f32 = 6.0;

/// Noise refresh rate in blocks-of-time per second. Quantizing time at this
/// rate makes the static flicker coarsely instead of shimmering per frame.
pub const NOISE_RATE: f32 = 12.0;

// ─── Bright Pass ──────────────────────────────────────────────────────────────

/// Rec. 601 luminance of a linear RGB color.
#[must_use]
pub fn luminance(color: Vec3) -> f32 {
    color.dot(LUMA_WEIGHTS)
}

/// Bright-pass classification: the original color when its luminance
/// strictly exceeds `threshold`, otherwise black. The boundary
/// `luminance == threshold` resolves to black.
#[must_use]
pub fn bright_pass(color: Vec3, threshold: f32) -> Vec3 {
    if luminance(color) > threshold {
        color
    } else {
        Vec3::ZERO
    }
}

// ─── Blur ─────────────────────────────────────────────────────────────────────

/// Sample spacing for one blur pass: the configured radius scaled by the
/// pass's resolution scale, clamped below by [`MIN_BLUR_SCALE`].
#[must_use]
pub fn blur_step(radius: f32, scale: f32) -> f32 {
    radius * scale.max(MIN_BLUR_SCALE)
}

// ─── Combine Stage ────────────────────────────────────────────────────────────

/// Barrel-distortion remap of a normalized sampling coordinate.
///
/// `curvature == 0` and `screen_scale == 1` leave the coordinate untouched.
/// Positive curvature pushes coordinates outward quadratically with distance
/// from center, so corners can land outside the unit square (see
/// [`is_cut_off`]).
#[must_use]
pub fn curvature_remap(uv: Vec2, params: &CurvatureParams) -> Vec2 {
    let centered = (uv - 0.5) / params.screen_scale;
    let warped = centered * (1.0 + params.curvature * centered.length_squared());
    warped + 0.5
}

/// True when a remapped coordinate falls outside `[0,1]²` and the output
/// pixel must be opaque black (the CRT-edge cutoff).
#[must_use]
pub fn is_cut_off(uv: Vec2) -> bool {
    uv.x < 0.0 || uv.x > 1.0 || uv.y < 0.0 || uv.y > 1.0
}

/// Scanline darkening factor in `(0, 1]` for a pixel `y_px` device pixels
/// from the top. Intensity 0 yields exactly 1.0.
#[must_use]
pub fn scanline_factor(y_px: f32, line_height: f32, time: f32, params: &ScanlineParams) -> f32 {
    let rows = y_px / line_height.max(1.0);
    let phase = rows * params.frequency * std::f32::consts::TAU + time * params.speed + params.offset;
    1.0 - params.intensity * (0.5 + 0.5 * phase.sin())
}

/// Noise block edge length in device pixels for the configured text row
/// height, clamped to at least one pixel.
#[must_use]
pub fn noise_block_px(line_height: f32) -> f32 {
    (line_height * NOISE_BLOCK_REF / REFERENCE_LINE_HEIGHT).max(1.0)
}

/// Deterministic per-block pseudo-random value in `[0, 1)`.
///
/// The classic fract-sin hash. `block` is the quantized block coordinate,
/// `time_step` the time quantized at [`NOISE_RATE`]. `rem_euclid` is the
/// floor-based fractional part, matching the shader's `fract` for negative
/// values too.
#[must_use]
pub fn hash_noise(block: Vec2, time_step: f32) -> f32 {
    let p = block + Vec2::splat(time_step);
    let v = (p.dot(Vec2::new(12.9898, 78.233))).sin() * 43_758.547;
    v.rem_euclid(1.0)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Radial vignette factor in `(0, 1]`. Strength 0 yields exactly 1.0.
///
/// Darkening ramps from `vignette_size` (normalized center distance, where
/// 1.0 reaches the screen edges) out to the corner distance `sqrt(2)`.
#[must_use]
pub fn vignette_factor(uv: Vec2, params: &CurvatureParams) -> f32 {
    let dist = (uv - 0.5).length() * 2.0;
    1.0 - params.vignette_strength * smoothstep(params.vignette_size, std::f32::consts::SQRT_2, dist)
}

/// The combine equation for one pixel, given already-sampled inputs.
///
/// The tinted original plus the tinted blur-layer sum scaled by
/// `intensity`, then additive noise, then the multiplicative scanline and
/// vignette factors. With every effect scalar neutral (noise 0, scanline
/// factor 1, vignette factor 1, tint white) the result is exactly
/// `original + sum(layers) * intensity`.
#[must_use]
pub fn combine_pixel(
    original: Vec3,
    layers: &[Vec3],
    tint: Vec3,
    intensity: f32,
    noise: f32,
    scanline: f32,
    vignette: f32,
) -> Vec3 {
    let bloom: Vec3 = layers.iter().copied().sum::<Vec3>() * intensity;
    ((original + bloom) * tint + Vec3::splat(noise)) * scanline * vignette
}
