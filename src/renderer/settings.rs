//! Renderer Settings
//!
//! Host-facing configuration fixed at startup. Per-frame effect tuning
//! lives in [`crate::effects::EffectParameters`] instead.

/// Startup configuration for the compositor.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// GPU adapter selection preference.
    pub power_preference: wgpu::PowerPreference,
    /// Present with vertical sync. Disabling trades tearing for latency.
    pub vsync: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            vsync: true,
        }
    }
}
