//! Error types for the Lumiere engine
//!
//! This module defines the error types used throughout the engine,
//! covering shader compilation, program linking, drawing, and
//! device/resource management.

use std::fmt;

use crate::graphics_device::ShaderStage;

/// Result type for Lumiere engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumiere engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Shader source rejected by the compiler (bad grammar, bad `#version`, ...)
    CompileError {
        /// Stage whose source failed to compile
        stage: ShaderStage,
        /// Compiler diagnostic, with a line number where available
        message: String,
    },

    /// Program link failed (stage interface mismatch, conflicting uniforms, ...)
    LinkError(String),

    /// Draw call rejected (invalid vertex range, nothing bound, ...)
    DrawError(String),

    /// Operation not valid in the current state (double begin, released program, ...)
    InvalidOperation(String),

    /// Invalid resource (shader, buffer, framebuffer, ...)
    InvalidResource(String),

    /// Out of device memory
    OutOfMemory,

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),

    /// Backend-specific error
    BackendError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CompileError { stage, message } => {
                write!(f, "Shader compile error ({} stage): {}", stage, message)
            }
            Error::LinkError(msg) => write!(f, "Program link error: {}", msg),
            Error::DrawError(msg) => write!(f, "Draw error: {}", msg),
            Error::InvalidOperation(msg) => write!(f, "Invalid operation: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::OutOfMemory => write!(f, "Out of device memory"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
