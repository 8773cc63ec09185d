/// Linked program resource trait and descriptor

use std::any::Any;
use std::sync::Arc;
use crate::graphics_device::Shader;

/// Descriptor for linking a program from compiled shaders
#[derive(Clone)]
pub struct ProgramDesc {
    /// Compiled vertex stage
    pub vertex_shader: Arc<dyn Shader>,
    /// Compiled fragment stage
    pub fragment_shader: Arc<dyn Shader>,
}

/// Linked program resource trait
///
/// An opaque handle to a successfully linked program. Only produced by
/// `GraphicsDevice::create_program()`, which validates that the fragment
/// stage's inputs are satisfied by the vertex stage's outputs.
pub trait Program: Send + Sync {
    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
