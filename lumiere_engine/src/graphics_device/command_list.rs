/// CommandList trait - for recording rendering commands

use std::any::Any;
use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Color, Framebuffer, Program, VertexBuffer};

/// Primitive topologies a draw call can assemble vertices into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Every 3 consecutive vertices form an independent triangle;
    /// 1-2 leftover vertices are ignored
    TriangleList,
    /// Sliding window of 3 vertices with alternating winding
    TriangleStrip,
    /// One point per vertex
    PointList,
}

impl Default for PrimitiveTopology {
    fn default() -> Self {
        PrimitiveTopology::TriangleList
    }
}

/// Value for a program uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(glam::Vec2),
    Vec3(glam::Vec3),
    Vec4(glam::Vec4),
}

/// Command list for recording rendering commands
///
/// Commands are recorded and later executed via `GraphicsDevice::submit()`.
/// Binding and nesting mistakes are caught at record time, including the
/// vertex range of a draw against the currently bound buffer, so a bad
/// frame is rejected before anything reaches the device.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass targeting a framebuffer
    ///
    /// The framebuffer's color buffer is cleared to `clear_color` when the
    /// pass executes, before any draw.
    ///
    /// # Arguments
    ///
    /// * `framebuffer` - The framebuffer to render into
    /// * `clear_color` - Clear value for the color buffer
    fn begin_render_pass(
        &mut self,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_color: Color,
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Bind a linked program for subsequent draws
    ///
    /// # Arguments
    ///
    /// * `program` - Program to bind
    fn bind_program(&mut self, program: &Arc<dyn Program>) -> Result<()>;

    /// Bind a vertex buffer for subsequent draws
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to bind
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn VertexBuffer>) -> Result<()>;

    /// Set a uniform on the bound program
    ///
    /// Setting a uniform the program does not declare is not an error: the
    /// value is ignored and a warning is logged when the command executes.
    ///
    /// # Arguments
    ///
    /// * `name` - Uniform name as declared in the shader source
    /// * `value` - Value to set
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()>;

    /// Draw a vertex range from the bound buffer
    ///
    /// Processes vertices `[first_vertex, first_vertex + vertex_count)`.
    /// A count of zero is valid and draws nothing.
    ///
    /// # Arguments
    ///
    /// * `topology` - How to assemble the vertices into primitives
    /// * `first_vertex` - Index of first vertex
    /// * `vertex_count` - Number of vertices to draw
    ///
    /// # Errors
    ///
    /// Returns `DrawError` if no program or vertex buffer is bound, if
    /// called outside a render pass, or if the vertex range extends past
    /// the end of the bound buffer.
    fn draw(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
    ) -> Result<()>;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
