//! Utility Module
//!
//! - [`Timer`]: frame timing (elapsed, delta, frame count)
//! - [`FpsCounter`]: rolling frame-rate measurement
//! - [`FrameState`]: per-frame timing snapshot handed to application code

pub mod time;

pub use time::{FpsCounter, FrameState, Timer};
