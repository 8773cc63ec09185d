/// Vertex type and vertex buffer resource trait

use std::any::Any;
use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// A single vertex: a 2-component position in normalized device coordinates
///
/// Components are expected in `[-1, 1]`; positions outside that range are
/// clipped away by the rasterizer. The layout is `#[repr(C)]` and Pod so
/// whole slices upload to the device as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in normalized device coordinates
    pub position: Vec2,
}

impl Vertex {
    /// Create a vertex from NDC coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
        }
    }
}

/// Vertex buffer resource trait
///
/// Implemented by backend-specific buffer types. The buffer is
/// automatically destroyed when the last handle is dropped.
pub trait VertexBuffer: Send + Sync {
    /// Number of vertices stored in the buffer
    fn vertex_count(&self) -> u32;

    /// Downcast support for backends
    fn as_any(&self) -> &dyn Any;
}
