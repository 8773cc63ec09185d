/// Graphics device module - all rendering-related types and traits

// Module declarations
pub mod graphics_device;
pub mod shader;
pub mod program;
pub mod vertex;
pub mod color;
pub mod framebuffer;
pub mod command_list;
pub mod swapchain;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use shader::*;
pub use program::*;
pub use vertex::*;
pub use color::*;
pub use framebuffer::*;
pub use command_list::*;
pub use swapchain::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
