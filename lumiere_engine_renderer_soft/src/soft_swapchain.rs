/// SoftSwapchain - double-buffered presentation for the software backend
///
/// Two framebuffers alternate roles: rendering targets the back image and
/// `present()` swaps the pair, so the frame just rendered becomes the
/// front image. Completely separated from rendering logic; image contents
/// persist across frames until cleared or drawn over.

use std::sync::{Arc, Mutex};

use lumiere_engine::lumiere::Result;
use lumiere_engine::lumiere::render::{Framebuffer, Swapchain, TextureFormat};
use lumiere_engine::engine_warn;

use crate::soft::Registry;
use crate::soft_framebuffer::SoftFramebuffer;

/// Software swapchain implementation
pub struct SoftSwapchain {
    images: Vec<Arc<SoftFramebuffer>>,
    /// Index of the image the next frame renders into
    back_index: usize,
    width: u32,
    height: u32,
    format: TextureFormat,
    registry: Arc<Mutex<Registry>>,
}

impl SoftSwapchain {
    pub(crate) fn new(
        width: u32,
        height: u32,
        format: TextureFormat,
        image_count: usize,
        registry: Arc<Mutex<Registry>>,
    ) -> Result<Self> {
        if image_count != 2 {
            engine_warn!(
                "lumiere::soft::Swapchain",
                "Image count {} not supported; using double buffering",
                image_count
            );
        }
        let images = Self::allocate_images(width, height, format, &registry)?;
        Ok(Self {
            images,
            back_index: 0,
            width,
            height,
            format,
            registry,
        })
    }

    fn allocate_images(
        width: u32,
        height: u32,
        format: TextureFormat,
        registry: &Arc<Mutex<Registry>>,
    ) -> Result<Vec<Arc<SoftFramebuffer>>> {
        Ok(vec![
            Arc::new(SoftFramebuffer::new(width, height, format, registry.clone())?),
            Arc::new(SoftFramebuffer::new(width, height, format, registry.clone())?),
        ])
    }
}

impl Swapchain for SoftSwapchain {
    fn acquire_next_image(&mut self) -> Result<(u32, Arc<dyn Framebuffer>)> {
        let image: Arc<dyn Framebuffer> = self.images[self.back_index].clone();
        Ok((self.back_index as u32, image))
    }

    fn present(&mut self) -> Result<()> {
        self.back_index = 1 - self.back_index;
        Ok(())
    }

    fn front_image(&self) -> Result<Arc<dyn Framebuffer>> {
        Ok(self.images[1 - self.back_index].clone())
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        self.images = Self::allocate_images(width, height, self.format, &self.registry)?;
        self.back_index = 0;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }
}
