/// GraphicsDevice trait - main resource factory interface

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    CommandList, Framebuffer, FramebufferDesc, Program, ProgramDesc,
    Shader, ShaderDesc, Swapchain, SwapchainDesc, Vertex, VertexBuffer,
};

// ============================================================================
// Configuration and statistics
// ============================================================================

/// Graphics device configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Enable validation/debug checks
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Lumiere Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

/// Graphics device statistics
///
/// Draw and triangle counts are cumulative since device creation; the
/// live counts reflect currently existing resources and drop when the
/// last handle to a resource is released.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceStats {
    /// Number of draw calls executed
    pub draw_calls: u64,
    /// Number of triangles rasterized
    pub triangles: u64,
    /// Compiled shaders currently alive
    pub live_shaders: usize,
    /// Linked programs currently alive
    pub live_programs: usize,
    /// Vertex buffers currently alive
    pub live_buffers: usize,
    /// Framebuffers currently alive (including swapchain images)
    pub live_framebuffers: usize,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Main graphics device trait
///
/// This is the central factory interface for creating rendering resources
/// and executing recorded command lists. Implemented by backend-specific
/// devices (e.g., SoftDevice).
pub trait GraphicsDevice: Send + Sync {
    /// Compile a shader from source
    ///
    /// # Arguments
    ///
    /// * `desc` - Shader descriptor holding the tagged source
    ///
    /// # Returns
    ///
    /// A shared pointer to the compiled shader
    ///
    /// # Errors
    ///
    /// Returns `CompileError` if the source is rejected (bad grammar,
    /// missing or unsupported `#version` directive, ...)
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Link compiled shaders into a program
    ///
    /// # Arguments
    ///
    /// * `desc` - Program descriptor holding the compiled stages
    ///
    /// # Returns
    ///
    /// A shared pointer to the linked program
    ///
    /// # Errors
    ///
    /// Returns `LinkError` if the stage interfaces do not match (e.g., a
    /// fragment `in` with no matching vertex `out`)
    fn create_program(&mut self, desc: &ProgramDesc) -> Result<Arc<dyn Program>>;

    /// Create a vertex buffer from vertex data
    ///
    /// # Arguments
    ///
    /// * `vertices` - Vertex data to upload
    ///
    /// # Returns
    ///
    /// A shared pointer to the created buffer
    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<Arc<dyn VertexBuffer>>;

    /// Create an offscreen framebuffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Framebuffer descriptor
    ///
    /// # Returns
    ///
    /// A shared pointer to the created framebuffer
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a command list for recording
    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>>;

    /// Create a swapchain
    ///
    /// # Arguments
    ///
    /// * `desc` - Swapchain descriptor
    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> Result<Box<dyn Swapchain>>;

    /// Execute a recorded command list
    ///
    /// Execution is synchronous: when this returns, all commands have run
    /// and their effects are visible in the targeted framebuffers.
    ///
    /// # Arguments
    ///
    /// * `command_list` - A command list that has finished recording
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the list is still recording.
    fn submit(&mut self, command_list: &dyn CommandList) -> Result<()>;

    /// Wait for all device operations to complete
    fn wait_idle(&mut self) -> Result<()>;

    /// Get statistics about the device
    fn stats(&self) -> DeviceStats;

    /// Backend name (e.g., "soft")
    fn name(&self) -> &str;
}
