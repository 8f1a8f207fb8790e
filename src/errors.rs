//! Error Types
//!
//! All fallible setup paths return [`Result<T>`], an alias for
//! `std::result::Result<T, PhosphorError>`.
//!
//! The error taxonomy is deliberately front-loaded: everything that can fail
//! does so during initialization (adapter/device acquisition, shader
//! compilation, render target allocation). Steady-state frames do not produce
//! recoverable errors — a backend fault mid-frame aborts the frame loop.

use thiserror::Error;

/// The main error type for the phosphor compositor.
#[derive(Error, Debug)]
pub enum PhosphorError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter or surface.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// A filter stage failed to compile or link. Fatal: there is no
    /// fallback rendering path.
    #[error("Shader compilation failed for stage '{stage}': {message}")]
    ShaderCompile {
        /// Name of the filter stage that failed
        stage: &'static str,
        /// Backend diagnostic text
        message: String,
    },

    /// The backend rejected a render target allocation. Fatal: this
    /// indicates a resource-limit violation, not a transient condition.
    #[error("Render target allocation failed at {width}x{height}: {message}")]
    TargetAllocation {
        width: u32,
        height: u32,
        /// Backend diagnostic text
        message: String,
    },

    /// The surface was permanently lost or ran out of memory mid-frame.
    #[error("Surface error: {0}")]
    SurfaceError(#[from] wgpu::SurfaceError),

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),
}

/// Alias for `Result<T, PhosphorError>`.
pub type Result<T> = std::result::Result<T, PhosphorError>;
