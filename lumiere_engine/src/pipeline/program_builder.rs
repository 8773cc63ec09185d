/// Program builder - compiles and links a shader pair through an explicit lifecycle
///
/// The lifecycle is linear: Unbuilt -> Compiling -> Linked -> Bound -> Released,
/// with Failed reachable from Compiling. Released and Failed are terminal; a
/// failed builder cannot be retried and must be replaced.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Program, ProgramDesc, ShaderDesc, ShaderSource,
};

// ============================================================================
// Program lifecycle state
// ============================================================================

/// Lifecycle states of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProgramState {
    /// No build attempted yet
    Unbuilt = 0,
    /// Sources are being compiled and linked
    Compiling = 1,
    /// Successfully linked, ready to bind
    Linked = 2,
    /// Bound for drawing in the current frame
    Bound = 3,
    /// Handle released (terminal)
    Released = 4,
    /// Compile or link failed (terminal)
    Failed = 5,
}

impl ProgramState {
    /// Whether this state admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgramState::Released | ProgramState::Failed)
    }

    /// Whether a transition from `self` to `next` is allowed
    pub fn can_transition(self, next: ProgramState) -> bool {
        use ProgramState::*;
        matches!(
            (self, next),
            (Unbuilt, Compiling)
                | (Compiling, Linked)
                | (Compiling, Failed)
                | (Linked, Bound)
                | (Bound, Linked)
                | (Linked, Released)
                | (Bound, Released)
        )
    }

    fn from_u8(value: u8) -> ProgramState {
        match value {
            0 => ProgramState::Unbuilt,
            1 => ProgramState::Compiling,
            2 => ProgramState::Linked,
            3 => ProgramState::Bound,
            4 => ProgramState::Released,
            _ => ProgramState::Failed,
        }
    }
}

// ============================================================================
// Linked program handle
// ============================================================================

/// A successfully linked program with its lifecycle state
///
/// Only produced by `ProgramBuilder::build()`, so holding one proves the
/// link succeeded. The frame renderer drives Linked <-> Bound around each
/// frame; `release()` retires the handle for good.
///
/// Dropping a LinkedProgram releases the underlying device resource once
/// no other handle clones remain.
pub struct LinkedProgram {
    program: Arc<dyn Program>,
    state: AtomicU8,
}

impl LinkedProgram {
    fn new(program: Arc<dyn Program>) -> Self {
        Self {
            program,
            state: AtomicU8::new(ProgramState::Linked as u8),
        }
    }

    /// Current lifecycle state (Linked, Bound, or Released)
    pub fn state(&self) -> ProgramState {
        ProgramState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The underlying device program handle
    pub fn handle(&self) -> &Arc<dyn Program> {
        &self.program
    }

    /// Transition Linked -> Bound (binding an already bound program is an error)
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the program is released or already bound.
    pub fn bind(&self) -> Result<()> {
        self.transition(ProgramState::Linked, ProgramState::Bound, "bind")
    }

    /// Transition Bound -> Linked at the end of a frame
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the program is not bound.
    pub fn unbind(&self) -> Result<()> {
        self.transition(ProgramState::Bound, ProgramState::Linked, "unbind")
    }

    /// Retire the program (terminal)
    ///
    /// After this, binding or rendering with the program is an error. The
    /// device resource is freed when the last handle clone drops.
    pub fn release(&self) -> Result<()> {
        let current = self.state();
        if current.is_terminal() {
            return Err(Error::InvalidOperation(format!(
                "cannot release program in state {:?}", current
            )));
        }
        self.state.store(ProgramState::Released as u8, Ordering::Release);
        crate::engine_debug!("lumiere::LinkedProgram", "Program released");
        Ok(())
    }

    /// Whether the program has been released
    pub fn is_released(&self) -> bool {
        self.state() == ProgramState::Released
    }

    fn transition(&self, from: ProgramState, to: ProgramState, verb: &str) -> Result<()> {
        match self.state.compare_exchange(
            from as u8,
            to as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(()),
            Err(actual) => Err(Error::InvalidOperation(format!(
                "cannot {} program in state {:?}",
                verb,
                ProgramState::from_u8(actual)
            ))),
        }
    }
}

// ============================================================================
// Program builder
// ============================================================================

/// Builds a linked program from a vertex/fragment source pair
///
/// Compilation and linking happen inside a single `build()` call; the
/// compiled shader handles are scoped to that call and released as soon as
/// the program holds everything it needs.
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use lumiere_engine::lumiere::GraphicsDevice;
/// use lumiere_engine::lumiere::pipeline::ProgramBuilder;
/// use lumiere_engine::sample;
///
/// # fn demo(device: Arc<Mutex<dyn GraphicsDevice>>) -> lumiere_engine::lumiere::Result<()> {
/// let program = ProgramBuilder::new(device)
///     .with_vertex_source(sample::TRIANGLE_VERTEX_SHADER)
///     .with_fragment_source(sample::TRIANGLE_FRAGMENT_SHADER)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ProgramBuilder {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    vertex_source: Option<ShaderSource>,
    fragment_source: Option<ShaderSource>,
    state: ProgramState,
}

impl ProgramBuilder {
    /// Create a builder targeting the given device
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            vertex_source: None,
            fragment_source: None,
            state: ProgramState::Unbuilt,
        }
    }

    /// Set the vertex stage source text
    pub fn with_vertex_source(mut self, text: impl Into<String>) -> Self {
        self.vertex_source = Some(ShaderSource::vertex(text));
        self
    }

    /// Set the fragment stage source text
    pub fn with_fragment_source(mut self, text: impl Into<String>) -> Self {
        self.fragment_source = Some(ShaderSource::fragment(text));
        self
    }

    /// Current lifecycle state of the builder
    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Compile both stages and link them into a program
    ///
    /// On success the builder is `Linked` and a [`LinkedProgram`] is
    /// returned. On compile or link failure the builder becomes `Failed`,
    /// which is terminal: further `build()` calls are rejected and a new
    /// builder must be created. There are no retries.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if a source is missing, the builder already
    ///   built once, or a previous build failed
    /// - `CompileError` if either stage's source is rejected
    /// - `LinkError` if the stage interfaces do not match
    pub fn build(&mut self) -> Result<LinkedProgram> {
        match self.state {
            ProgramState::Unbuilt => {}
            ProgramState::Failed => {
                return Err(Error::InvalidOperation(
                    "previous build failed; create a new builder".to_string(),
                ));
            }
            other => {
                return Err(Error::InvalidOperation(format!(
                    "build already ran (state {:?}); create a new builder", other
                )));
            }
        }

        let vertex_source = self.vertex_source.as_ref().ok_or_else(|| {
            Error::InvalidOperation("no vertex source set".to_string())
        })?;
        let fragment_source = self.fragment_source.as_ref().ok_or_else(|| {
            Error::InvalidOperation("no fragment source set".to_string())
        })?;

        self.state = ProgramState::Compiling;
        crate::engine_debug!("lumiere::ProgramBuilder", "Compiling shader pair");

        match Self::compile_and_link(&self.device, vertex_source, fragment_source) {
            Ok(program) => {
                self.state = ProgramState::Linked;
                crate::engine_info!("lumiere::ProgramBuilder", "Program linked successfully");
                Ok(LinkedProgram::new(program))
            }
            Err(error) => {
                self.state = ProgramState::Failed;
                crate::engine_error!("lumiere::ProgramBuilder", "Build failed: {}", error);
                Err(error)
            }
        }
    }

    /// Compile both stages and link them; the shader handles are scoped to
    /// this call and dropped once the program holds them
    fn compile_and_link(
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        vertex_source: &ShaderSource,
        fragment_source: &ShaderSource,
    ) -> Result<Arc<dyn Program>> {
        let mut device = device
            .lock()
            .map_err(|_| Error::BackendError("Device lock poisoned".to_string()))?;

        let vertex_shader = device.create_shader(&ShaderDesc { source: vertex_source })?;
        let fragment_shader = device.create_shader(&ShaderDesc { source: fragment_source })?;

        device.create_program(&ProgramDesc {
            vertex_shader,
            fragment_shader,
        })
    }
}

#[cfg(test)]
#[path = "program_builder_tests.rs"]
mod tests;
