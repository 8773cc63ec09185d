/// SoftCommandList - record-then-submit implementation of CommandList
///
/// Commands are recorded into a plain vector and validated as they are
/// recorded: binding order, render-pass nesting and the draw's vertex
/// range against the bound buffer. A frame with a bad command never
/// reaches the device; `SoftDevice::submit` only ever executes lists
/// whose every command already passed validation.

use std::any::Any;
use std::sync::Arc;

use lumiere_engine::lumiere::{Error, Result};
use lumiere_engine::lumiere::render::{
    Color, CommandList, Framebuffer, PrimitiveTopology, Program, UniformValue, VertexBuffer,
};

use crate::soft_buffer::SoftBuffer;
use crate::soft_framebuffer::SoftFramebuffer;
use crate::soft_program::SoftProgram;

/// One recorded command
pub(crate) enum Command {
    BeginRenderPass {
        framebuffer: Arc<dyn Framebuffer>,
        clear_color: Color,
    },
    EndRenderPass,
    BindProgram(Arc<dyn Program>),
    BindVertexBuffer(Arc<dyn VertexBuffer>),
    SetUniform {
        name: String,
        value: UniformValue,
    },
    Draw {
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
    },
}

/// Software command list implementation
pub struct SoftCommandList {
    pub(crate) commands: Vec<Command>,
    /// Whether the command list is currently recording
    recording: bool,
    /// Whether recording has finished (the list is submittable)
    finished: bool,
    /// Whether we're inside a render pass
    in_render_pass: bool,
    program_bound: bool,
    /// Vertex count of the bound buffer, for draw-range validation
    bound_vertex_count: Option<u32>,
}

impl SoftCommandList {
    pub(crate) fn new() -> Self {
        Self {
            commands: Vec::new(),
            recording: false,
            finished: false,
            in_render_pass: false,
            program_bound: false,
            bound_vertex_count: None,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    fn require_recording(&self) -> Result<()> {
        if !self.recording {
            return Err(Error::InvalidOperation(
                "command list is not recording".to_string(),
            ));
        }
        Ok(())
    }
}

impl CommandList for SoftCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording || self.finished {
            return Err(Error::InvalidOperation(
                "command list already recording or finished".to_string(),
            ));
        }
        self.recording = true;
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.require_recording()?;
        if self.in_render_pass {
            return Err(Error::InvalidOperation(
                "render pass still open at end of recording".to_string(),
            ));
        }
        self.recording = false;
        self.finished = true;
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_color: Color,
    ) -> Result<()> {
        self.require_recording()?;
        if self.in_render_pass {
            return Err(Error::InvalidOperation(
                "render pass already open".to_string(),
            ));
        }
        if framebuffer.as_any().downcast_ref::<SoftFramebuffer>().is_none() {
            return Err(Error::InvalidResource(
                "framebuffer was not created by the soft backend".to_string(),
            ));
        }
        self.in_render_pass = true;
        self.commands.push(Command::BeginRenderPass {
            framebuffer: framebuffer.clone(),
            clear_color,
        });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.require_recording()?;
        if !self.in_render_pass {
            return Err(Error::InvalidOperation("no render pass open".to_string()));
        }
        self.in_render_pass = false;
        self.commands.push(Command::EndRenderPass);
        Ok(())
    }

    fn bind_program(&mut self, program: &Arc<dyn Program>) -> Result<()> {
        self.require_recording()?;
        if program.as_any().downcast_ref::<SoftProgram>().is_none() {
            return Err(Error::InvalidResource(
                "program was not created by the soft backend".to_string(),
            ));
        }
        self.program_bound = true;
        self.commands.push(Command::BindProgram(program.clone()));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn VertexBuffer>) -> Result<()> {
        self.require_recording()?;
        if buffer.as_any().downcast_ref::<SoftBuffer>().is_none() {
            return Err(Error::InvalidResource(
                "vertex buffer was not created by the soft backend".to_string(),
            ));
        }
        self.bound_vertex_count = Some(buffer.vertex_count());
        self.commands.push(Command::BindVertexBuffer(buffer.clone()));
        Ok(())
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<()> {
        self.require_recording()?;
        self.commands.push(Command::SetUniform {
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn draw(
        &mut self,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
    ) -> Result<()> {
        if !self.recording || !self.in_render_pass {
            return Err(Error::DrawError("draw outside a render pass".to_string()));
        }
        if !self.program_bound {
            return Err(Error::DrawError("no program bound".to_string()));
        }
        let buffer_count = self
            .bound_vertex_count
            .ok_or_else(|| Error::DrawError("no vertex buffer bound".to_string()))?;
        let end = first_vertex
            .checked_add(vertex_count)
            .ok_or_else(|| Error::DrawError("vertex range overflows".to_string()))?;
        if end > buffer_count {
            return Err(Error::DrawError(format!(
                "vertex range [{}, {}) exceeds buffer of {} vertices",
                first_vertex, end, buffer_count
            )));
        }
        self.commands.push(Command::Draw {
            topology,
            first_vertex,
            vertex_count,
        });
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
