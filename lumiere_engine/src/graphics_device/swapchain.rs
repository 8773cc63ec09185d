/// Swapchain trait - double-buffered presentation

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Framebuffer, TextureFormat};

/// Descriptor for creating a swapchain
#[derive(Debug, Clone)]
pub struct SwapchainDesc {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format of the swapchain images
    pub format: TextureFormat,
    /// Number of images (2 = double buffering)
    pub image_count: usize,
}

impl Default for SwapchainDesc {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: TextureFormat::default(),
            image_count: 2,
        }
    }
}

/// Swapchain for presenting rendered images
///
/// Manages a front and a back image: rendering always targets the back
/// image, and `present()` swaps the two at the end of a frame. Completely
/// separated from rendering logic.
pub trait Swapchain: Send + Sync {
    /// Acquire the next available swapchain image
    ///
    /// Returns the back image index and its framebuffer; record the
    /// frame's render pass against that framebuffer.
    fn acquire_next_image(&mut self) -> Result<(u32, Arc<dyn Framebuffer>)>;

    /// Present the rendered image
    ///
    /// Swaps front and back. After this call the image rendered during the
    /// frame is the front image, and the next acquire returns the other one.
    fn present(&mut self) -> Result<()>;

    /// The image currently presented (the front image)
    ///
    /// This is what would be on screen; useful for readback and tests.
    fn front_image(&self) -> Result<Arc<dyn Framebuffer>>;

    /// Recreate the swapchain (e.g., after a target resize)
    ///
    /// All image contents are discarded.
    ///
    /// # Arguments
    ///
    /// * `width` - New width in pixels
    /// * `height` - New height in pixels
    fn recreate(&mut self, width: u32, height: u32) -> Result<()>;

    /// Get the number of images in the swapchain
    fn image_count(&self) -> usize;

    /// Get the width of the swapchain images in pixels
    fn width(&self) -> u32;

    /// Get the height of the swapchain images in pixels
    fn height(&self) -> u32;

    /// Get the pixel format of the swapchain images
    fn format(&self) -> TextureFormat;
}
