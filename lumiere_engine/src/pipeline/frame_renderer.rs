/// Frame renderer - drives the per-frame clear / bind / draw / present loop
///
/// Each frame is recorded into a fresh command list and submitted
/// synchronously. A failing frame is abandoned without retries and leaves
/// the renderer ready for the next one.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::graphics_device::{
    Color, Framebuffer, GraphicsDevice, PrimitiveTopology, Swapchain,
    UniformValue, VertexBuffer,
};
use crate::pipeline::program_builder::LinkedProgram;

// ============================================================================
// Draw call description
// ============================================================================

/// One draw within a frame
///
/// Covers the vertex range `[first_vertex, first_vertex + vertex_count)`
/// of the bound buffer.
#[derive(Debug, Clone)]
pub struct DrawCall {
    /// How the vertices are assembled into primitives
    pub topology: PrimitiveTopology,
    /// Index of the first vertex
    pub first_vertex: u32,
    /// Number of vertices to draw (zero is valid and draws nothing)
    pub vertex_count: u32,
    /// Uniform values set before the draw, in order
    pub uniforms: Vec<(String, UniformValue)>,
}

impl DrawCall {
    /// Draw `vertex_count` vertices starting at `first_vertex` as a
    /// triangle list
    pub fn new(first_vertex: u32, vertex_count: u32) -> Self {
        Self {
            topology: PrimitiveTopology::default(),
            first_vertex,
            vertex_count,
            uniforms: Vec::new(),
        }
    }

    /// Override the primitive topology
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Add a uniform value to set before the draw
    pub fn with_uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.uniforms.push((name.into(), value));
        self
    }
}

// ============================================================================
// Frame renderer
// ============================================================================

/// Renders single-draw frames against a swapchain or an offscreen target
///
/// The renderer binds the program for the duration of the frame and
/// unbinds it afterwards, whether the frame succeeded or not, so the
/// program is always back in its linked state when `render_frame` returns.
/// `frames_rendered` counts successful frames only.
pub struct FrameRenderer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    clear_color: Color,
    frames_rendered: u64,
}

impl FrameRenderer {
    /// Create a frame renderer for the given device
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            clear_color: Color::new(0.2, 0.3, 0.3, 1.0),
            frames_rendered: 0,
        }
    }

    /// Set the clear color applied at the start of every frame
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// The clear color applied at the start of every frame
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Number of frames rendered successfully
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Render one frame to the swapchain and present it
    ///
    /// The frame clears the acquired back image, binds the program and the
    /// vertex buffer, executes the draw and presents. Returns the image
    /// the frame was rendered into, which is the front image after the
    /// present.
    ///
    /// # Errors
    ///
    /// Any error aborts the frame; nothing is presented, the program is
    /// unbound and the next frame can proceed normally.
    pub fn render_frame(
        &mut self,
        swapchain: &mut dyn Swapchain,
        program: &LinkedProgram,
        vertex_buffer: &Arc<dyn VertexBuffer>,
        draw: &DrawCall,
    ) -> Result<Arc<dyn Framebuffer>> {
        program.bind()?;
        let result = self.record_frame(swapchain, program, vertex_buffer, draw);
        // Unbind even when the frame failed; the failure is fatal to the
        // frame, not to the program
        program.unbind()?;

        let framebuffer = result?;
        self.frames_rendered += 1;
        Ok(framebuffer)
    }

    /// Render one frame into an offscreen framebuffer
    ///
    /// Same sequence as [`render_frame`](Self::render_frame) without the
    /// swapchain acquire/present bracket.
    pub fn render_to(
        &mut self,
        framebuffer: &Arc<dyn Framebuffer>,
        program: &LinkedProgram,
        vertex_buffer: &Arc<dyn VertexBuffer>,
        draw: &DrawCall,
    ) -> Result<()> {
        program.bind()?;
        let result = self.record_and_submit(framebuffer, program, vertex_buffer, draw);
        program.unbind()?;

        result?;
        self.frames_rendered += 1;
        Ok(())
    }

    fn record_frame(
        &self,
        swapchain: &mut dyn Swapchain,
        program: &LinkedProgram,
        vertex_buffer: &Arc<dyn VertexBuffer>,
        draw: &DrawCall,
    ) -> Result<Arc<dyn Framebuffer>> {
        let (image_index, back_image) = swapchain.acquire_next_image()?;
        crate::engine_trace!(
            "lumiere::FrameRenderer",
            "Frame {}: rendering into swapchain image {}",
            self.frames_rendered,
            image_index
        );

        self.record_and_submit(&back_image, program, vertex_buffer, draw)?;
        swapchain.present()?;

        Ok(back_image)
    }

    fn record_and_submit(
        &self,
        target: &Arc<dyn Framebuffer>,
        program: &LinkedProgram,
        vertex_buffer: &Arc<dyn VertexBuffer>,
        draw: &DrawCall,
    ) -> Result<()> {
        let mut device = self
            .device
            .lock()
            .map_err(|_| Error::BackendError("Device lock poisoned".to_string()))?;

        let mut cmd = device.create_command_list()?;
        cmd.begin()?;
        cmd.begin_render_pass(target, self.clear_color)?;
        cmd.bind_program(program.handle())?;
        cmd.bind_vertex_buffer(vertex_buffer)?;
        for (name, value) in &draw.uniforms {
            cmd.set_uniform(name, *value)?;
        }
        cmd.draw(draw.topology, draw.first_vertex, draw.vertex_count)?;
        cmd.end_render_pass()?;
        cmd.end()?;

        device.submit(cmd.as_ref())
    }
}

#[cfg(test)]
#[path = "frame_renderer_tests.rs"]
mod tests;
