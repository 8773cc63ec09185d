/// Framebuffer trait - the color buffer a render pass renders into
///
/// Framebuffers are created directly for offscreen rendering, or owned by
/// a swapchain (one per swapchain image). Pixel readback follows the
/// window coordinate convention: row 0 is the bottom row.

use std::any::Any;
use crate::error::Result;
use crate::graphics_device::Color;

/// Pixel formats for framebuffer color attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    /// 8-bit RGBA, unsigned normalized
    R8G8B8A8_UNORM,
    /// 8-bit BGRA, unsigned normalized
    B8G8R8A8_UNORM,
}

impl TextureFormat {
    /// Returns size in bytes per pixel for this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            TextureFormat::R8G8B8A8_UNORM | TextureFormat::B8G8R8A8_UNORM => 4,
        }
    }
}

impl Default for TextureFormat {
    fn default() -> Self {
        TextureFormat::R8G8B8A8_UNORM
    }
}

/// Descriptor for creating a framebuffer
#[derive(Debug, Clone)]
pub struct FramebufferDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format of the color attachment
    pub format: TextureFormat,
}

impl Default for FramebufferDesc {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: TextureFormat::default(),
        }
    }
}

/// Framebuffer trait for the color buffer that draws render into
///
/// Created via `GraphicsDevice::create_framebuffer()` or owned by a
/// swapchain. Contents persist between frames until cleared or drawn over.
pub trait Framebuffer: Send + Sync {
    /// Get the width in pixels
    fn width(&self) -> u32;

    /// Get the height in pixels
    fn height(&self) -> u32;

    /// Get the pixel format
    fn format(&self) -> TextureFormat;

    /// Read back a single pixel
    ///
    /// `(0, 0)` is the bottom-left pixel.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the coordinates are outside the buffer.
    fn read_pixel(&self, x: u32, y: u32) -> Result<Color>;

    /// Read back the whole color buffer as tightly packed bytes
    ///
    /// Rows are ordered bottom-up: the first `width * 4` bytes are the
    /// bottom row of the image.
    fn read_pixels(&self) -> Result<Vec<u8>>;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
