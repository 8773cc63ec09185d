/// SoftDevice - software rasterizer implementation of GraphicsDevice
///
/// Resources are tracked in a slotmap registry shared with the handles
/// they produce, so `DeviceStats` live counts are exact: dropping the
/// last handle to a resource unregisters it. Command lists execute
/// synchronously in `submit`; when it returns, every pixel the frame
/// produced is readable from the targeted framebuffers.

use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec4};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use lumiere_engine::lumiere::{Error, Result};
use lumiere_engine::lumiere::render::{
    Color, CommandList, DeviceConfig, DeviceStats, Framebuffer, FramebufferDesc, GraphicsDevice,
    PrimitiveTopology, Program, ProgramDesc, Shader, ShaderDesc, ShaderStage, Swapchain,
    SwapchainDesc, UniformValue, Vertex, VertexBuffer,
};
use lumiere_engine::{engine_debug, engine_info, engine_trace, engine_warn};

use crate::glsl::{self, Value};
use crate::raster;
use crate::soft_buffer::SoftBuffer;
use crate::soft_command_list::{Command, SoftCommandList};
use crate::soft_framebuffer::SoftFramebuffer;
use crate::soft_program::SoftProgram;
use crate::soft_shader::SoftShader;
use crate::soft_swapchain::SoftSwapchain;

new_key_type! {
    /// Key identifying a live resource in the registry
    pub(crate) struct ResourceKey;
}

/// Live-resource registry shared between the device and its resources
///
/// Resources insert themselves on creation and remove themselves in
/// `Drop`; the maps carry no data, only liveness.
#[derive(Default)]
pub(crate) struct Registry {
    pub(crate) shaders: SlotMap<ResourceKey, ()>,
    pub(crate) programs: SlotMap<ResourceKey, ()>,
    pub(crate) buffers: SlotMap<ResourceKey, ()>,
    pub(crate) framebuffers: SlotMap<ResourceKey, ()>,
}

/// Software rasterizer graphics device
pub struct SoftDevice {
    config: DeviceConfig,
    registry: Arc<Mutex<Registry>>,
    draw_calls: u64,
    triangles: u64,
}

impl SoftDevice {
    /// Create a software device
    pub fn new(config: DeviceConfig) -> Result<Self> {
        engine_info!(
            "lumiere::soft::Device",
            "Software device created for '{}' (validation: {})",
            config.app_name,
            config.enable_validation
        );
        Ok(Self {
            config,
            registry: Arc::new(Mutex::new(Registry::default())),
            draw_calls: 0,
            triangles: 0,
        })
    }

    /// Execute one draw: vertex stage, assembly, rasterization, fragment
    /// stage, pixel writes (no blending; last write wins)
    fn execute_draw(
        &mut self,
        target: &SoftFramebuffer,
        program: &SoftProgram,
        buffer: &SoftBuffer,
        uniforms: &FxHashMap<String, Value>,
        topology: PrimitiveTopology,
        first_vertex: u32,
        vertex_count: u32,
    ) {
        self.draw_calls += 1;

        // Vertex stage: one conceptual invocation per index in the range
        let mut positions = Vec::with_capacity(vertex_count as usize);
        let mut varyings = Vec::with_capacity(vertex_count as usize);
        for index in first_vertex..first_vertex + vertex_count {
            let (clip, outs) = program.run_vertex(buffer.position(index), uniforms);
            // Perspective divide; varyings stay affine (w = 1 in this model)
            let w = if clip.w != 0.0 { clip.w } else { 1.0 };
            positions.push(Vec2::new(clip.x / w, clip.y / w));
            varyings.push(outs);
        }

        let width = target.width();
        let height = target.height();

        if topology == PrimitiveTopology::PointList {
            for (position, outs) in positions.iter().zip(&varyings) {
                let inputs = Self::fragment_inputs_from(program, outs);
                raster::rasterize_point(width, height, *position, |x, y| {
                    let color = color_from(program.run_fragment(&inputs, uniforms));
                    target.write_pixel(x, y, color);
                });
            }
            return;
        }

        for tri in raster::assemble_triangles(topology, vertex_count) {
            self.triangles += 1;
            let corners = [
                positions[tri[0] as usize],
                positions[tri[1] as usize],
                positions[tri[2] as usize],
            ];
            raster::rasterize_triangle(width, height, corners, |x, y, weights| {
                let inputs = Self::interpolate_inputs(program, &varyings, tri, weights);
                let color = color_from(program.run_fragment(&inputs, uniforms));
                target.write_pixel(x, y, color);
            });
        }
    }

    /// Fragment inputs for a point: the single vertex's varyings, unweighted
    fn fragment_inputs_from(
        program: &SoftProgram,
        outs: &FxHashMap<String, Value>,
    ) -> FxHashMap<String, Value> {
        let mut inputs = FxHashMap::default();
        for decl in &program.fragment.inputs {
            let value = outs
                .get(&decl.name)
                .copied()
                .unwrap_or(Value::zero(decl.ty));
            inputs.insert(decl.name.clone(), value);
        }
        inputs
    }

    /// Interpolate the fragment inputs across a triangle by barycentric
    /// weights; a varying the vertex stage never wrote reads as zero
    fn interpolate_inputs(
        program: &SoftProgram,
        varyings: &[FxHashMap<String, Value>],
        tri: [u32; 3],
        weights: [f32; 3],
    ) -> FxHashMap<String, Value> {
        let mut inputs = FxHashMap::default();
        for decl in &program.fragment.inputs {
            let components = decl.ty.components();
            let mut blended = [0.0f32; 4];
            for corner in 0..3 {
                let value = varyings[tri[corner] as usize]
                    .get(&decl.name)
                    .copied()
                    .unwrap_or(Value::zero(decl.ty));
                let parts = value.to_array();
                for c in 0..components {
                    blended[c] += weights[corner] * parts[c];
                }
            }
            inputs.insert(decl.name.clone(), Value::from_components(&blended[..components]));
        }
        inputs
    }
}

/// The fragment stage's vec4 color output as an engine color
fn color_from(color: Vec4) -> Color {
    Color::new(color.x, color.y, color.z, color.w)
}

/// Convert an engine uniform value to a shading-language value
fn uniform_value(value: UniformValue) -> Value {
    match value {
        UniformValue::Float(x) => Value::Float(x),
        UniformValue::Vec2(v) => Value::Vec2(v),
        UniformValue::Vec3(v) => Value::Vec3(v),
        UniformValue::Vec4(v) => Value::Vec4(v),
    }
}

impl GraphicsDevice for SoftDevice {
    fn create_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        let module = glsl::compile(desc.source.stage(), desc.source.text())?;
        engine_debug!(
            "lumiere::soft::Device",
            "Compiled {} shader (GLSL {})",
            module.stage,
            module.version
        );
        Ok(Arc::new(SoftShader::new(module, self.registry.clone())?))
    }

    fn create_program(&mut self, desc: &ProgramDesc) -> Result<Arc<dyn Program>> {
        if desc.vertex_shader.stage() != ShaderStage::Vertex
            || desc.fragment_shader.stage() != ShaderStage::Fragment
        {
            return Err(Error::LinkError(
                "program requires one vertex and one fragment shader".to_string(),
            ));
        }
        let vertex = desc
            .vertex_shader
            .as_any()
            .downcast_ref::<SoftShader>()
            .ok_or_else(|| {
                Error::InvalidResource("vertex shader was not created by the soft backend".to_string())
            })?;
        let fragment = desc
            .fragment_shader
            .as_any()
            .downcast_ref::<SoftShader>()
            .ok_or_else(|| {
                Error::InvalidResource("fragment shader was not created by the soft backend".to_string())
            })?;

        let program = SoftProgram::link(
            vertex.module.clone(),
            fragment.module.clone(),
            self.registry.clone(),
        )?;
        engine_debug!("lumiere::soft::Device", "Program linked");
        Ok(Arc::new(program))
    }

    fn create_vertex_buffer(&mut self, vertices: &[Vertex]) -> Result<Arc<dyn VertexBuffer>> {
        Ok(Arc::new(SoftBuffer::new(vertices, self.registry.clone())?))
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>> {
        Ok(Arc::new(SoftFramebuffer::new(
            desc.width,
            desc.height,
            desc.format,
            self.registry.clone(),
        )?))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        Ok(Box::new(SoftCommandList::new()))
    }

    fn create_swapchain(&mut self, desc: &SwapchainDesc) -> Result<Box<dyn Swapchain>> {
        Ok(Box::new(SoftSwapchain::new(
            desc.width,
            desc.height,
            desc.format,
            desc.image_count,
            self.registry.clone(),
        )?))
    }

    fn submit(&mut self, command_list: &dyn CommandList) -> Result<()> {
        let list = command_list
            .as_any()
            .downcast_ref::<SoftCommandList>()
            .ok_or_else(|| {
                Error::BackendError("submit: command list was not created by the soft backend".to_string())
            })?;
        if !list.is_finished() {
            return Err(Error::InvalidOperation(
                "command list is still recording".to_string(),
            ));
        }
        if self.config.enable_validation {
            engine_trace!(
                "lumiere::soft::Device",
                "Executing command list with {} commands",
                list.commands.len()
            );
        }

        // Record-time validation guarantees the playback below never sees
        // an out-of-range draw or a missing binding inside a pass
        let mut target: Option<&SoftFramebuffer> = None;
        let mut program: Option<&SoftProgram> = None;
        let mut buffer: Option<&SoftBuffer> = None;
        let mut uniforms: FxHashMap<String, Value> = FxHashMap::default();

        for command in &list.commands {
            match command {
                Command::BeginRenderPass { framebuffer, clear_color } => {
                    let fb = framebuffer
                        .as_any()
                        .downcast_ref::<SoftFramebuffer>()
                        .ok_or_else(|| Error::InvalidResource("foreign framebuffer".to_string()))?;
                    fb.clear(*clear_color);
                    target = Some(fb);
                }
                Command::EndRenderPass => {
                    target = None;
                }
                Command::BindProgram(handle) => {
                    program = Some(
                        handle
                            .as_any()
                            .downcast_ref::<SoftProgram>()
                            .ok_or_else(|| Error::InvalidResource("foreign program".to_string()))?,
                    );
                }
                Command::BindVertexBuffer(handle) => {
                    buffer = Some(
                        handle
                            .as_any()
                            .downcast_ref::<SoftBuffer>()
                            .ok_or_else(|| Error::InvalidResource("foreign vertex buffer".to_string()))?,
                    );
                }
                Command::SetUniform { name, value } => {
                    // GL location -1 semantics: unknown uniforms warn and
                    // are otherwise ignored
                    match program.and_then(|p| p.uniform_type(name)) {
                        Some(ty) => {
                            let converted = uniform_value(*value);
                            if converted.ty() == ty {
                                uniforms.insert(name.clone(), converted);
                            } else {
                                engine_warn!(
                                    "lumiere::soft::Device",
                                    "Uniform '{}' is '{}' but was set with '{}'; value ignored",
                                    name,
                                    ty.name(),
                                    converted.ty().name()
                                );
                            }
                        }
                        None => {
                            engine_warn!(
                                "lumiere::soft::Device",
                                "Uniform '{}' not found in program; value ignored",
                                name
                            );
                        }
                    }
                }
                Command::Draw { topology, first_vertex, vertex_count } => {
                    let (target, program, buffer) = match (target, program, buffer) {
                        (Some(t), Some(p), Some(b)) => (t, p, b),
                        _ => {
                            return Err(Error::DrawError(
                                "draw executed with incomplete bindings".to_string(),
                            ));
                        }
                    };
                    self.execute_draw(
                        target,
                        program,
                        buffer,
                        &uniforms,
                        *topology,
                        *first_vertex,
                        *vertex_count,
                    );
                }
            }
        }
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<()> {
        // Execution is synchronous; nothing is ever in flight
        Ok(())
    }

    fn stats(&self) -> DeviceStats {
        let registry = match self.registry.lock() {
            Ok(registry) => registry,
            Err(_) => return DeviceStats::default(),
        };
        DeviceStats {
            draw_calls: self.draw_calls,
            triangles: self.triangles,
            live_shaders: registry.shaders.len(),
            live_programs: registry.programs.len(),
            live_buffers: registry.buffers.len(),
            live_framebuffers: registry.framebuffers.len(),
        }
    }

    fn name(&self) -> &str {
        "soft"
    }
}

#[cfg(test)]
#[path = "soft_tests.rs"]
mod tests;
