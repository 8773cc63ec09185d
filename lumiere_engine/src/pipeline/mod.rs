/// Pipeline module - the high-level shader walkthrough API
///
/// ProgramBuilder turns a vertex/fragment source pair into a linked
/// program; FrameRenderer drives the per-frame clear/bind/draw/present
/// sequence against a swapchain or an offscreen framebuffer.

pub mod program_builder;
pub mod frame_renderer;

pub use program_builder::*;
pub use frame_renderer::*;
