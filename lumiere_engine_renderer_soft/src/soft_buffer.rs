/// SoftBuffer - vertex buffer resource of the software backend
///
/// Vertices are uploaded as raw bytes, the way a GPU buffer would
/// receive them, and cast back to typed vertices when a draw executes.

use std::any::Any;
use std::sync::{Arc, Mutex};

use glam::Vec2;

use lumiere_engine::engine_err;
use lumiere_engine::lumiere::Result;
use lumiere_engine::lumiere::render::{Vertex, VertexBuffer};

use crate::soft::{Registry, ResourceKey};

/// Software vertex buffer implementation
pub struct SoftBuffer {
    /// Raw vertex bytes, `vertex_count * size_of::<Vertex>()`
    data: Vec<u8>,
    vertex_count: u32,
    registry: Arc<Mutex<Registry>>,
    key: ResourceKey,
}

impl SoftBuffer {
    pub(crate) fn new(vertices: &[Vertex], registry: Arc<Mutex<Registry>>) -> Result<Self> {
        let key = registry
            .lock()
            .map_err(|_| engine_err!("lumiere::soft::Device", "Resource registry lock poisoned"))?
            .buffers
            .insert(());
        Ok(Self {
            data: bytemuck::cast_slice(vertices).to_vec(),
            vertex_count: vertices.len() as u32,
            registry,
            key,
        })
    }

    /// Position of the vertex at `index`; callers guarantee the index is
    /// inside the buffer
    pub(crate) fn position(&self, index: u32) -> Vec2 {
        let vertices: &[Vertex] = bytemuck::cast_slice(&self.data);
        vertices[index as usize].position
    }
}

impl VertexBuffer for SoftBuffer {
    fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for SoftBuffer {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.buffers.remove(self.key);
        }
    }
}
