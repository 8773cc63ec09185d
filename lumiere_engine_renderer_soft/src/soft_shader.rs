/// SoftShader - compiled shader resource of the software backend
///
/// The compiled artifact is a validated [`glsl::ShaderModule`]. The
/// program copies the module at link time, so shader handles can be
/// dropped as soon as linking is done.

use std::any::Any;
use std::sync::{Arc, Mutex};

use lumiere_engine::engine_err;
use lumiere_engine::lumiere::Result;
use lumiere_engine::lumiere::render::{Shader, ShaderStage};

use crate::glsl::ShaderModule;
use crate::soft::{Registry, ResourceKey};

/// Software shader implementation
pub struct SoftShader {
    pub(crate) module: ShaderModule,
    registry: Arc<Mutex<Registry>>,
    key: ResourceKey,
}

impl SoftShader {
    pub(crate) fn new(module: ShaderModule, registry: Arc<Mutex<Registry>>) -> Result<Self> {
        let key = registry
            .lock()
            .map_err(|_| engine_err!("lumiere::soft::Device", "Resource registry lock poisoned"))?
            .shaders
            .insert(());
        Ok(Self { module, registry, key })
    }
}

impl Shader for SoftShader {
    fn stage(&self) -> ShaderStage {
        self.module.stage
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for SoftShader {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.shaders.remove(self.key);
        }
    }
}
