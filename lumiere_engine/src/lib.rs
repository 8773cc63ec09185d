/*!
# Lumiere Engine

Core traits and types for the Lumiere rendering engine.

This crate provides the platform-agnostic API for shader-based rendering using
trait-based dynamic polymorphism. Backend implementations (the software
rasterizer, or a GPU API) provide concrete types behind these traits.

## Architecture

- **GraphicsDevice**: Factory trait for creating rendering resources
- **Shader**: Compiled shader resource trait
- **Program**: Linked program resource trait
- **CommandList**: Command recording trait (record, then submit)
- **Swapchain**: Double-buffered presentation trait
- **ProgramBuilder / FrameRenderer**: High-level pipeline walkthrough API

Backend implementations provide concrete types that implement these traits.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod pipeline;
pub mod sample;

// Main lumiere namespace module
pub mod lumiere {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Graphics device factory trait
    pub use crate::graphics_device::GraphicsDevice;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::graphics_device::*;
    }

    // Pipeline sub-module with the high-level walkthrough API
    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    // Sample shaders and geometry
    pub mod sample {
        pub use crate::sample::*;
    }
}

// Re-export math library at crate root
pub use glam;
