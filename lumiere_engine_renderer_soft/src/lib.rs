/*!
# Lumiere Engine - Software Renderer Backend

CPU software rasterizer implementation of the lumiere_engine traits.

The backend compiles a GLSL subset on the CPU, rasterizes triangles with
edge functions and the top-left fill rule, and writes pixels into
memory-resident framebuffers. No GPU, window system or graphics API is
involved, so every rendered pixel is directly readable in tests.

## Example

```
use lumiere_engine::lumiere::render::DeviceConfig;
use lumiere_engine_renderer_soft::SoftDevice;

let device = SoftDevice::new(DeviceConfig::default())?;
# Ok::<(), lumiere_engine::lumiere::Error>(())
```
*/

// Shader front end and rasterizer
pub mod glsl;
pub mod raster;

// Device and resource implementations
mod soft;
mod soft_buffer;
mod soft_command_list;
mod soft_framebuffer;
mod soft_program;
mod soft_shader;
mod soft_swapchain;

pub use soft::SoftDevice;
pub use soft_buffer::SoftBuffer;
pub use soft_command_list::SoftCommandList;
pub use soft_framebuffer::SoftFramebuffer;
pub use soft_program::SoftProgram;
pub use soft_shader::SoftShader;
pub use soft_swapchain::SoftSwapchain;
