//! Source Image Contract
//!
//! The compositor does not rasterize text itself. An external collaborator
//! (the terminal's text renderer) produces one RGBA8 [`SourceImage`] per
//! frame at the current display resolution; the pipeline uploads it, runs
//! the effect chain, and never retains the borrow past the frame.

use crate::utils::FrameState;

/// A borrowed RGBA8 pixel surface for one frame.
///
/// `pixels` is tightly packed, row-major, `width * height * 4` bytes, sized
/// in device pixels to match the display surface exactly.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

impl<'a> SourceImage<'a> {
    /// Wraps a pixel slice.
    ///
    /// # Panics
    ///
    /// Panics if the slice length does not match `width * height * 4`.
    #[must_use]
    pub fn new(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "SourceImage pixel slice must be width * height * 4 bytes",
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    #[must_use]
    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }
}

/// Per-frame source image provider.
///
/// The frame driver calls [`rasterize`](Self::rasterize) once per display
/// refresh, *after* establishing the frame's output resolution, so the
/// returned image always matches the surface in device pixels.
pub trait FrameSource {
    /// Produces the source image for the current frame.
    fn rasterize(&mut self, width: u32, height: u32, frame: &FrameState) -> SourceImage<'_>;
}
