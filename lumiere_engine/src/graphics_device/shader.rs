/// Shader stage, source holder, and shader resource trait

use std::any::Any;
use std::fmt;

/// Shader stages supported by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader stage
    Vertex,
    /// Fragment shader stage
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Immutable shader source text tagged with its stage
///
/// The text is expected to start with a `#version` directive; this is
/// checked when the source is compiled, not at construction.
///
/// # Example
///
/// ```
/// use lumiere_engine::lumiere::render::{ShaderSource, ShaderStage};
///
/// let source = ShaderSource::vertex("#version 330 core\nvoid main() { gl_Position = vec4(0.0, 0.0, 0.0, 1.0); }");
/// assert_eq!(source.stage(), ShaderStage::Vertex);
/// ```
#[derive(Debug, Clone)]
pub struct ShaderSource {
    stage: ShaderStage,
    text: String,
}

impl ShaderSource {
    /// Create a shader source for the given stage
    pub fn new(stage: ShaderStage, text: impl Into<String>) -> Self {
        Self {
            stage,
            text: text.into(),
        }
    }

    /// Create a vertex shader source
    pub fn vertex(text: impl Into<String>) -> Self {
        Self::new(ShaderStage::Vertex, text)
    }

    /// Create a fragment shader source
    pub fn fragment(text: impl Into<String>) -> Self {
        Self::new(ShaderStage::Fragment, text)
    }

    /// The stage this source is written for
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The source text
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Descriptor for compiling a shader
#[derive(Debug, Clone)]
pub struct ShaderDesc<'a> {
    /// The source to compile
    pub source: &'a ShaderSource,
}

/// Compiled shader resource trait
///
/// An opaque handle to a successfully compiled shader. Only produced by
/// `GraphicsDevice::create_shader()`; a failed compile never yields one.
/// The shader is automatically destroyed when the last handle is dropped.
pub trait Shader: Send + Sync {
    /// Stage this shader was compiled for
    fn stage(&self) -> ShaderStage;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
