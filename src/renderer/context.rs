//! wgpu Context
//!
//! [`WgpuContext`] holds the core GPU handles: device, queue, surface, and
//! surface configuration. It owns window-surface management and resize
//! handling; everything else (targets, pipelines) lives above it.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{PhosphorError, Result};
use crate::renderer::settings::RenderSettings;

/// Core wgpu context holding GPU handles.
pub struct WgpuContext {
    /// The wgpu device for GPU operations
    pub device: wgpu::Device,
    /// The command queue for submitting work
    pub queue: wgpu::Queue,
    /// The window surface for presentation
    pub surface: wgpu::Surface<'static>,
    /// Surface configuration
    pub config: wgpu::SurfaceConfiguration,
}

impl WgpuContext {
    /// Creates the instance, surface, adapter, and device.
    ///
    /// Fatal on any failure: there is no fallback rendering path, so a
    /// missing adapter or unsupported surface aborts initialization.
    pub async fn new<W>(
        window: W,
        settings: &RenderSettings,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|e| PhosphorError::AdapterRequestFailed(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| PhosphorError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| {
                PhosphorError::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        log::info!(
            "Surface configured: {}x{} {:?}, present mode {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode,
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    /// Reconfigures the surface to a new physical-pixel size. Zero-sized
    /// requests (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 && (width, height) != self.size() {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Returns the surface color format.
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current surface dimensions in device pixels.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
