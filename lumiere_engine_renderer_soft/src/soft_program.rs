/// SoftProgram - linked program resource of the software backend
///
/// Linking validates the interface between the two stages the way GL
/// does: every fragment `in` must be fed by a vertex `out` of the same
/// name and type, and a uniform declared in both stages must agree on its
/// type. The program keeps its own copies of the stage modules so the
/// shader handles can be released right after the link.

use std::any::Any;
use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec4};
use rustc_hash::FxHashMap;

use lumiere_engine::engine_err;
use lumiere_engine::lumiere::{Error, Result};
use lumiere_engine::lumiere::render::Program;

use crate::glsl::{expand_attribute, GlslType, ShaderModule, Value};
use crate::soft::{Registry, ResourceKey};

/// Software program implementation
pub struct SoftProgram {
    pub(crate) vertex: ShaderModule,
    pub(crate) fragment: ShaderModule,
    /// Uniform names and types merged across both stages
    uniforms: FxHashMap<String, GlslType>,
    registry: Arc<Mutex<Registry>>,
    key: ResourceKey,
}

impl SoftProgram {
    /// Link two compiled stages, validating their interface
    pub(crate) fn link(
        vertex: ShaderModule,
        fragment: ShaderModule,
        registry: Arc<Mutex<Registry>>,
    ) -> Result<Self> {
        // Every fragment input must be fed by a matching vertex output
        for input in &fragment.inputs {
            match vertex.outputs.iter().find(|out| out.name == input.name) {
                Some(out) if out.ty == input.ty => {}
                Some(out) => {
                    return Err(Error::LinkError(format!(
                        "varying '{}' is '{}' in the vertex stage but '{}' in the fragment stage",
                        input.name,
                        out.ty.name(),
                        input.ty.name()
                    )));
                }
                None => {
                    return Err(Error::LinkError(format!(
                        "fragment input '{}' has no matching vertex output",
                        input.name
                    )));
                }
            }
        }

        let mut uniforms: FxHashMap<String, GlslType> = FxHashMap::default();
        for decl in vertex.uniforms.iter().chain(fragment.uniforms.iter()) {
            if let Some(&existing) = uniforms.get(&decl.name) {
                if existing != decl.ty {
                    return Err(Error::LinkError(format!(
                        "uniform '{}' declared as both '{}' and '{}'",
                        decl.name,
                        existing.name(),
                        decl.ty.name()
                    )));
                }
            } else {
                uniforms.insert(decl.name.clone(), decl.ty);
            }
        }

        let key = registry
            .lock()
            .map_err(|_| engine_err!("lumiere::soft::Device", "Resource registry lock poisoned"))?
            .programs
            .insert(());

        Ok(Self { vertex, fragment, uniforms, registry, key })
    }

    /// Declared type of a uniform, if the program has one by that name
    pub(crate) fn uniform_type(&self, name: &str) -> Option<GlslType> {
        self.uniforms.get(name).copied()
    }

    /// Run the vertex stage for one vertex
    ///
    /// The buffer attribute feeds the input at location 0 (or the first
    /// declared input); any other input reads the GL default attribute
    /// `(0, 0, 0, 1)`. Returns the clip-space position and the varyings
    /// the stage wrote.
    pub(crate) fn run_vertex(
        &self,
        position: Vec2,
        uniforms: &FxHashMap<String, Value>,
    ) -> (Vec4, FxHashMap<String, Value>) {
        let attribute_input = self
            .vertex
            .inputs
            .iter()
            .position(|decl| decl.location == Some(0))
            .unwrap_or(0);

        let mut inputs = FxHashMap::default();
        for (index, decl) in self.vertex.inputs.iter().enumerate() {
            let source = if index == attribute_input {
                position
            } else {
                Vec2::ZERO
            };
            inputs.insert(decl.name.clone(), expand_attribute(source, decl.ty));
        }

        let mut written = self.vertex.run(&inputs, uniforms);
        let clip = written
            .remove("gl_Position")
            .map(Value::to_vec4)
            .unwrap_or(Vec4::new(0.0, 0.0, 0.0, 1.0));
        (clip, written)
    }

    /// Run the fragment stage for one covered pixel
    ///
    /// `varyings` supplies the interpolated values for the stage's inputs;
    /// linking guarantees each input has one. Returns the color output.
    pub(crate) fn run_fragment(
        &self,
        varyings: &FxHashMap<String, Value>,
        uniforms: &FxHashMap<String, Value>,
    ) -> Vec4 {
        let written = self.fragment.run(varyings, uniforms);
        let output = &self.fragment.outputs[0];
        written
            .get(&output.name)
            .copied()
            .map(Value::to_vec4)
            .unwrap_or(Vec4::ZERO)
    }
}

impl Program for SoftProgram {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for SoftProgram {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.registry.lock() {
            registry.programs.remove(self.key);
        }
    }
}
