//! Effect Parameter Store
//!
//! The tunable configuration read once per frame by the effect pipeline and
//! mutated at arbitrary times between frames by host controls (UI sliders,
//! key bindings). There is no validation and no locking: readers and writers
//! share the render thread, and out-of-range values produce visually
//! degenerate but non-crashing output.
//!
//! The structure is serde-derivable so hosts can persist slider settings.

use serde::{Deserialize, Serialize};

/// Fixed tint palette cycled by [`EffectParameters::next_theme`].
///
/// Classic phosphor colors: green, amber, cool white, cyan. Linear RGB.
pub const THEME_PALETTE: [[f32; 3]; 4] = [
    [0.20, 1.00, 0.40],
    [1.00, 0.72, 0.18],
    [0.85, 0.92, 1.00],
    [0.25, 0.85, 0.95],
];

/// Scanline oscillation parameters.
///
/// The darkening factor is a `sin`-based oscillation along the vertical
/// axis whose base frequency is tied to the text row height, so scanlines
/// align with character rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanlineParams {
    /// Darkening strength. 0 disables scanlines.
    pub intensity: f32,
    /// Oscillations per text row.
    pub frequency: f32,
    /// Vertical drift speed in radians per second.
    pub speed: f32,
    /// Constant phase offset in radians.
    pub offset: f32,
}

/// Barrel distortion and vignette parameters for the combine stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvatureParams {
    /// Barrel distortion amount. 0 leaves sampling coordinates untouched.
    pub curvature: f32,
    /// Corner darkening strength. 0 disables the vignette.
    pub vignette_strength: f32,
    /// Normalized distance from center at which the vignette begins.
    pub vignette_size: f32,
    /// Uniform zoom applied around the screen center before distortion.
    pub screen_scale: f32,
}

/// Flat record of every tunable effect scalar, read once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParameters {
    /// Bright-pass luminance threshold in `[0, 1]`. Pixels at or below the
    /// threshold are discarded to opaque black (strictly-greater test).
    pub threshold: f32,
    /// Bloom contribution multiplier applied to the summed blur layers.
    pub intensity: f32,
    /// Gaussian sample spacing in source texels at full resolution.
    pub radius: f32,
    /// Ordered blur scale factors, each in `(0, 1]`. The first entry is
    /// conventionally `1.0` (full resolution); each subsequent entry adds
    /// one blur iteration at that fraction of the output resolution.
    pub scales: Vec<f32>,
    /// Scanline oscillation settings.
    pub scanline: ScanlineParams,
    /// Blocky static strength. 0 disables noise.
    pub noise_intensity: f32,
    /// Curvature and vignette settings.
    pub curvature: CurvatureParams,
    /// Text row height in device pixels. Cross-component parameter: the
    /// text renderer decides it, and the pipeline derives scanline
    /// frequency and noise block size from it.
    pub line_height: f32,
    /// Index into [`THEME_PALETTE`].
    pub theme: usize,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            threshold: 0.30,
            intensity: 0.80,
            radius: 1.50,
            scales: vec![1.0, 0.5, 0.25],
            scanline: ScanlineParams {
                intensity: 0.25,
                frequency: 1.0,
                speed: 2.0,
                offset: 0.0,
            },
            noise_intensity: 0.08,
            curvature: CurvatureParams {
                curvature: 0.08,
                vignette_strength: 0.30,
                vignette_size: 0.70,
                screen_scale: 1.0,
            },
            line_height: 24.0,
            theme: 0,
        }
    }
}

impl EffectParameters {
    /// Advances the active tint color through the palette, wrapping at the
    /// end.
    pub fn next_theme(&mut self) {
        self.theme = (self.theme + 1) % THEME_PALETTE.len();
    }

    /// Linear RGB tint of the active theme. Out-of-range indices wrap
    /// rather than panic.
    #[must_use]
    pub fn theme_tint(&self) -> [f32; 3] {
        THEME_PALETTE[self.theme % THEME_PALETTE.len()]
    }
}
