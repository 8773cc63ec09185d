/// Mock graphics device for unit tests (no GPU required)
///
/// This mock device allows testing the program builder, frame renderer and
/// engine registry without a real backend. Command lists record command
/// names as strings so tests can assert on the recorded sequence, and the
/// validation rules of the real contract (binding, pass nesting, vertex
/// ranges) are enforced the same way a real backend would.

use std::any::Any;
use std::sync::{Arc, Mutex, Weak};

use crate::error::{Error, Result};
use crate::graphics_device::{
    Color, CommandList, DeviceStats, Framebuffer, FramebufferDesc, GraphicsDevice,
    PrimitiveTopology, Program, ProgramDesc, Shader, ShaderDesc, ShaderStage,
    Swapchain, SwapchainDesc, TextureFormat, UniformValue, Vertex, VertexBuffer,
};

// ============================================================================
// Mock Shader
// ============================================================================

#[derive(Debug)]
pub struct MockShader {
    pub stage: ShaderStage,
}

impl Shader for MockShader {
    fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Program
// ============================================================================

#[derive(Debug)]
pub struct MockProgram;

impl Program for MockProgram {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock VertexBuffer
// ============================================================================

#[derive(Debug)]
pub struct MockVertexBuffer {
    pub vertex_count: u32,
}

impl VertexBuffer for MockVertexBuffer {
    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Framebuffer
// ============================================================================

/// Mock framebuffer; reads back as fully transparent black
#[derive(Debug)]
pub struct MockFramebuffer {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl MockFramebuffer {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self { width, height, format }
    }
}

impl Framebuffer for MockFramebuffer {
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
        Ok(Color::TRANSPARENT)
    }

    fn read_pixels(&self) -> Result<Vec<u8>> {
        Ok(vec![0u8; (self.width * self.height * 4) as usize])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock Swapchain
// ============================================================================

/// Double-buffered mock swapchain
#[derive(Debug)]
pub struct MockSwapchain {
    images: [Arc<MockFramebuffer>; 2],
    back_index: usize,
    width: u32,
    height: u32,
    format: TextureFormat,
    /// Number of successful presents, for tests
    pub presents: u64,
}

impl MockSwapchain {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            images: [
                Arc::new(MockFramebuffer::new(width, height, format)),
                Arc::new(MockFramebuffer::new(width, height, format)),
            ],
            back_index: 0,
            width,
            height,
            format,
            presents: 0,
        }
    }
}

impl Swapchain for MockSwapchain {
    fn acquire_next_image(&mut self) -> Result<(u32, Arc<dyn Framebuffer>)> {
        let image: Arc<dyn Framebuffer> = self.images[self.back_index].clone();
        Ok((self.back_index as u32, image))
    }

    fn present(&mut self) -> Result<()> {
        self.back_index = 1 - self.back_index;
        self.presents += 1;
        Ok(())
    }

    fn front_image(&self) -> Result<Arc<dyn Framebuffer>> {
        Ok(self.images[1 - self.back_index].clone())
    }

    fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        self.images = [
            Arc::new(MockFramebuffer::new(width, height, self.format)),
            Arc::new(MockFramebuffer::new(width, height, self.format)),
        ];
        self.back_index = 0;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn image_count(&self) -> usize {
        2
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

// ============================================================================
// Mock CommandList
// ============================================================================

/// Records command names and enforces the recording contract
#[derive(Debug)]
pub struct MockCommandList {
    pub commands: Vec<String>,
    recording: bool,
    finished: bool,
    in_pass: bool,
    program_bound: bool,
    bound_vertex_count: Option<u32>,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            recording: false,
            finished: false,
            in_pass: false,
            program_bound: false,
            bound_vertex_count: None,
        }
    }

    /// Whether `end()` has been called
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording || self.finished {
            return Err(Error::InvalidOperation(
                "command list already recording or finished".to_string(),
            ));
        }
        self.recording = true;
        self.commands.push("begin".to_string());
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidOperation(
                "command list is not recording".to_string(),
            ));
        }
        if self.in_pass {
            return Err(Error::InvalidOperation(
                "render pass still open at end of recording".to_string(),
            ));
        }
        self.recording = false;
        self.finished = true;
        self.commands.push("end".to_string());
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        _framebuffer: &Arc<dyn Framebuffer>,
        _clear_color: Color,
    ) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidOperation(
                "command list is not recording".to_string(),
            ));
        }
        if self.in_pass {
            return Err(Error::InvalidOperation(
                "render pass already open".to_string(),
            ));
        }
        self.in_pass = true;
        self.commands.push("begin_render_pass".to_string());
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if !self.in_pass {
            return Err(Error::InvalidOperation(
                "no render pass open".to_string(),
            ));
        }
        self.in_pass = false;
        self.commands.push("end_render_pass".to_string());
        Ok(())
    }

    fn bind_program(&mut self, _program: &Arc<dyn Program>) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidOperation(
                "command list is not recording".to_string(),
            ));
        }
        self.program_bound = true;
        self.commands.push("bind_program".to_string());
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn VertexBuffer>) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidOperation(
                "command list is not recording".to_string(),
            ));
        }
        self.bound_vertex_count = Some(buffer.vertex_count());
        self.commands.push("bind_vertex_buffer".to_string());
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, _value: UniformValue) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidOperation(
                "command list is not recording".to_string(),
            ));
        }
        self.commands.push(format!("set_uniform {}", name));
        Ok(())
    }

    fn draw(
        &mut self,
        _topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
    ) -> Result<()> {
        if !self.recording || !self.in_pass {
            return Err(Error::DrawError(
                "draw outside a render pass".to_string(),
            ));
        }
        if !self.program_bound {
            return Err(Error::DrawError("no program bound".to_string()));
        }
        let buffer_count = match self.bound_vertex_count {
            Some(count) => count,
            None => return Err(Error::DrawError("no vertex buffer bound".to_string())),
        };
        let end = first_vertex.checked_add(vertex_count).ok_or_else(|| {
            Error::DrawError("vertex range overflows".to_string())
        })?;
        if end > buffer_count {
            return Err(Error::DrawError(format!(
                "vertex range [{}, {}) exceeds buffer of {} vertices",
                first_vertex, end, buffer_count
            )));
        }
        self.commands.push("draw".to_string());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock device that tracks created resources without a GPU
///
/// Shader creation only checks for a leading `#version` directive;
/// program creation only checks that the stage pair is vertex + fragment.
/// The tracking vectors are shared so tests can keep a clone of the
/// handles after the device moves behind `Arc<Mutex<dyn GraphicsDevice>>`.
#[derive(Debug)]
pub struct MockGraphicsDevice {
    /// Names of created shaders
    pub created_shaders: Arc<Mutex<Vec<String>>>,
    /// Names of created programs
    pub created_programs: Arc<Mutex<Vec<String>>>,
    /// Names of created vertex buffers
    pub created_buffers: Arc<Mutex<Vec<String>>>,
    /// Names of created framebuffers
    pub created_framebuffers: Arc<Mutex<Vec<String>>>,
    shader_refs: Vec<Weak<dyn Shader>>,
    program_refs: Vec<Weak<dyn Program>>,
    buffer_refs: Vec<Weak<dyn VertexBuffer>>,
    framebuffer_refs: Vec<Weak<dyn Framebuffer>>,
    draw_calls: u64,
}

impl MockGraphicsDevice {
    /// Create a new mock device
    pub fn new() -> Self {
        Self {
            created_shaders: Arc::new(Mutex::new(Vec::new())),
            created_programs: Arc::new(Mutex::new(Vec::new())),
            created_buffers: Arc::new(Mutex::new(Vec::new())),
            created_framebuffers: Arc::new(Mutex::new(Vec::new())),
            shader_refs: Vec::new(),
            program_refs: Vec::new(),
            buffer_refs: Vec::new(),
            framebuffer_refs: Vec::new(),
            draw_calls: 0,
        }
    }

    /// Get names of created shaders
    pub fn get_created_shaders(&self) -> Vec<String> {
        self.created_shaders.lock().unwrap().clone()
    }

    /// Get names of created programs
    pub fn get_created_programs(&self) -> Vec<String> {
        self.created_programs.lock().unwrap().clone()
    }

    /// Get names of created vertex buffers
    pub fn get_created_buffers(&self) -> Vec<String> {
        self.created_buffers.lock().unwrap().clone()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        if !desc.source.text().trim_start().starts_with("#version") {
            return Err(Error::CompileError {
                stage: desc.source.stage(),
                message: "0:1: expected '#version' directive".to_string(),
            });
        }
        let name = format!("shader_{}", desc.source.stage());
        self.created_shaders.lock().unwrap().push(name);
        let shader: Arc<dyn Shader> = Arc::new(MockShader { stage: desc.source.stage() });
        self.shader_refs.push(Arc::downgrade(&shader));
        Ok(shader)
    }

    fn create_program(&mut self, desc: &ProgramDesc) -> Result<Arc<dyn Program>> {
        if desc.vertex_shader.stage() != ShaderStage::Vertex
            || desc.fragment_shader.stage() != ShaderStage::Fragment
        {
            return Err(Error::LinkError(
                "program requires one vertex and one fragment shader".to_string(),
            ));
        }
        self.created_programs.lock().unwrap().push("program".to_string());
        let program: Arc<dyn Program> = Arc::new(MockProgram);
        self.program_refs.push(Arc::downgrade(&program));
        Ok(program)
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<Arc<dyn VertexBuffer>> {
        let name = format!("buffer_{}", vertices.len());
        self.created_buffers.lock().unwrap().push(name);
        let buffer: Arc<dyn VertexBuffer> = Arc::new(MockVertexBuffer {
            vertex_count: vertices.len() as u32,
        });
        self.buffer_refs.push(Arc::downgrade(&buffer));
        Ok(buffer)
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        let name = format!("framebuffer_{}x{}", desc.width, desc.height);
        self.created_framebuffers.lock().unwrap().push(name);
        let framebuffer: Arc<dyn Framebuffer> =
            Arc::new(MockFramebuffer::new(desc.width, desc.height, desc.format));
        self.framebuffer_refs.push(Arc::downgrade(&framebuffer));
        Ok(framebuffer)
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(MockCommandList::new()))
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> Result<Box<dyn Swapchain>> {
        Ok(Box::new(MockSwapchain::new(desc.width, desc.height, desc.format)))
    }

    fn submit(&mut self, command_list: &dyn CommandList) -> Result<()> {
        let mock = command_list
            .as_any()
            .downcast_ref::<MockCommandList>()
            .ok_or_else(|| {
                Error::BackendError("submit: foreign command list".to_string())
            })?;
        if !mock.is_finished() {
            return Err(Error::InvalidOperation(
                "command list is still recording".to_string(),
            ));
        }
        self.draw_calls += mock.commands.iter().filter(|c| *c == "draw").count() as u64;
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<()> {
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        DeviceStats {
            draw_calls: self.draw_calls,
            triangles: 0,
            live_shaders: self.shader_refs.iter().filter(|w| w.strong_count() > 0).count(),
            live_programs: self.program_refs.iter().filter(|w| w.strong_count() > 0).count(),
            live_buffers: self.buffer_refs.iter().filter(|w| w.strong_count() > 0).count(),
            live_framebuffers: self.framebuffer_refs.iter().filter(|w| w.strong_count() > 0).count(),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
