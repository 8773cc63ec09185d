/// SoftFramebuffer - CPU-resident implementation of the Framebuffer trait
///
/// The color buffer is a tightly packed byte vector in the framebuffer's
/// declared format, rows ordered bottom-up per the GL window convention.
/// Pixels are behind a mutex so command execution can write through the
/// shared handles the swapchain and the renderer hold.

use std::any::Any;
use std::sync::{Arc, Mutex};

use lumiere_engine::{engine_bail, engine_err};
use lumiere_engine::lumiere::{Error, Result};
use lumiere_engine::lumiere::render::{Color, Framebuffer, TextureFormat};

use crate::soft::{Registry, ResourceKey};

/// Byte offset of pixel `(x, y)`, widened so large buffers cannot wrap
pub(crate) fn pixel_offset(width: u32, x: u32, y: u32) -> usize {
    (y as usize * width as usize + x as usize) * 4
}

/// Software framebuffer implementation
pub struct SoftFramebuffer {
    width: u32,
    height: u32,
    format: TextureFormat,
    /// Packed pixel bytes, `width * height * 4`, bottom row first
    pixels: Mutex<Vec<u8>>,
    registry: Arc<Mutex<Registry>>,
    key: ResourceKey,
}

impl SoftFramebuffer {
    /// Create a framebuffer filled with transparent black
    pub(crate) fn new(
        width: u32,
        height: u32,
        format: TextureFormat,
        registry: Arc<Mutex<Registry>>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            engine_bail!(
                "lumiere::soft::Framebuffer",
                "framebuffer size {}x{} must be non-zero",
                width,
                height
            );
        }
        let size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.size_bytes() as usize))
            .ok_or(Error::OutOfMemory)?;

        let key = registry
            .lock()
            .map_err(|_| engine_err!("lumiere::soft::Device", "Resource registry lock poisoned"))?
            .framebuffers
            .insert(());

        Ok(Self {
            width,
            height,
            format,
            pixels: Mutex::new(vec![0u8; size]),
            registry,
            key,
        })
    }

    fn encode(&self, color: Color) -> [u8; 4] {
        let [r, g, b, a] = color.to_rgba8();
        match self.format {
            TextureFormat::R8G8B8A8_UNORM => [r, g, b, a],
            TextureFormat::B8G8R8A8_UNORM => [b, g, r, a],
        }
    }

    fn decode(&self, bytes: [u8; 4]) -> Color {
        match self.format {
            TextureFormat::R8G8B8A8_UNORM => Color::from_rgba8(bytes),
            TextureFormat::B8G8R8A8_UNORM => {
                Color::from_rgba8([bytes[2], bytes[1], bytes[0], bytes[3]])
            }
        }
    }

    /// Fill the whole buffer with one color
    pub(crate) fn clear(&self, color: Color) {
        let encoded = self.encode(color);
        if let Ok(mut pixels) = self.pixels.lock() {
            for chunk in pixels.chunks_exact_mut(4) {
                chunk.copy_from_slice(&encoded);
            }
        }
    }

    /// Write one pixel; callers guarantee in-bounds coordinates
    pub(crate) fn write_pixel(&self, x: u32, y: u32, color: Color) {
        debug_assert!(x < self.width && y < self.height);
        let encoded = self.encode(color);
        if let Ok(mut pixels) = self.pixels.lock() {
            let offset = pixel_offset(self.width, x, y);
            pixels[offset..offset + 4].copy_from_slice(&encoded);
        }
    }
}

impl Framebuffer for SoftFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn format(&self) -> TextureFormat {
        self.format
    }

    fn read_pixel(&self, x: u32, y: u32) -> Result<Color> {
        if x >= self.width || y >= self.height {
            return Err(Error::InvalidOperation(format!(
                "read_pixel ({}, {}) outside {}x{} framebuffer",
                x, y, self.width, self.height
            )));
        }
        let pixels = self
            .pixels
            .lock()
            .map_err(|_| engine_err!("lumiere::soft::Framebuffer", "Framebuffer lock poisoned"))?;
        let offset = pixel_offset(self.width, x, y);
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&pixels[offset..offset + 4]);
        Ok(self.decode(bytes))
    }

    fn read_pixels(&self) -> Result<Vec<u8>> {
        let pixels = self
            .pixels
            .lock()
            .map_err(|_| engine_err!("lumiere::soft::Framebuffer", "Framebuffer lock poisoned"))?;
        Ok(pixels.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for SoftFramebuffer {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.framebuffers.remove(self.key);
        }
    }
}
