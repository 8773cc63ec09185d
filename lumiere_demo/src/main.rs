//! Lumiere demo - renders the tutorial frames with the software backend
//!
//! Renders three frames (flat orange triangle, interpolated gradient, uniform
//! tint) and writes them as PNG files in the working directory.

use std::sync::{Arc, Mutex};

use lumiere_engine::lumiere::pipeline::{DrawCall, FrameRenderer, ProgramBuilder};
use lumiere_engine::lumiere::render::{
    DeviceConfig, Framebuffer, GraphicsDevice, SwapchainDesc, TextureFormat, UniformValue,
    VertexBuffer,
};
use glam::Vec4;
use lumiere_engine::lumiere::{sample, Engine, Error, Result};
use lumiere_engine_renderer_soft::SoftDevice;

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;

fn main() {
    if let Err(error) = run() {
        eprintln!("Demo failed: {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    Engine::initialize()?;

    let device = Engine::create_device(
        "main",
        SoftDevice::new(DeviceConfig {
            app_name: "Lumiere Demo".to_string(),
            ..Default::default()
        })?,
    )?;

    let buffer = device
        .lock()
        .map_err(|_| Error::BackendError("device lock poisoned".to_string()))?
        .create_vertex_buffer(&sample::triangle_vertices())?;

    render_png(
        &device,
        &buffer,
        sample::TRIANGLE_VERTEX_SHADER,
        sample::TRIANGLE_FRAGMENT_SHADER,
        DrawCall::new(0, 3),
        "triangle.png",
    )?;
    render_png(
        &device,
        &buffer,
        sample::GRADIENT_VERTEX_SHADER,
        sample::GRADIENT_FRAGMENT_SHADER,
        DrawCall::new(0, 3),
        "gradient.png",
    )?;
    render_png(
        &device,
        &buffer,
        sample::TRIANGLE_VERTEX_SHADER,
        sample::UNIFORM_FRAGMENT_SHADER,
        DrawCall::new(0, 3)
            .with_uniform("uColor", UniformValue::Vec4(Vec4::new(0.4, 0.8, 0.2, 1.0))),
        "tinted.png",
    )?;

    let stats = device
        .lock()
        .map_err(|_| Error::BackendError("device lock poisoned".to_string()))?
        .stats();
    println!(
        "Rendered 3 frames: {} draw calls, {} triangles",
        stats.draw_calls, stats.triangles
    );

    Engine::destroy_device("main")?;
    Engine::shutdown();
    Ok(())
}

/// Build a program from the given sources, render one frame and save it
fn render_png(
    device: &Arc<Mutex<dyn GraphicsDevice>>,
    buffer: &Arc<dyn VertexBuffer>,
    vertex_source: &str,
    fragment_source: &str,
    draw: DrawCall,
    path: &str,
) -> Result<()> {
    let program = ProgramBuilder::new(device.clone())
        .with_vertex_source(vertex_source)
        .with_fragment_source(fragment_source)
        .build()?;

    let mut swapchain = device
        .lock()
        .map_err(|_| Error::BackendError("device lock poisoned".to_string()))?
        .create_swapchain(&SwapchainDesc {
            width: WIDTH,
            height: HEIGHT,
            format: TextureFormat::R8G8B8A8_UNORM,
            image_count: 2,
        })?;

    let mut renderer = FrameRenderer::new(device.clone());
    let frame = renderer.render_frame(swapchain.as_mut(), &program, buffer, &draw)?;
    save_png(frame.as_ref(), path)?;
    println!("Wrote {}", path);

    program.release()?;
    Ok(())
}

/// Save a framebuffer as a PNG, flipping rows so the image is top-down
fn save_png(frame: &dyn Framebuffer, path: &str) -> Result<()> {
    let pixels = frame.read_pixels()?;
    let (width, height) = (frame.width(), frame.height());

    // read_pixels returns rows bottom to top; PNG rows go top to bottom
    let row_bytes = (width * 4) as usize;
    let mut flipped = Vec::with_capacity(pixels.len());
    for row in pixels.chunks_exact(row_bytes).rev() {
        flipped.extend_from_slice(row);
    }

    let image = image::RgbaImage::from_raw(width, height, flipped)
        .ok_or_else(|| Error::BackendError("pixel data does not match dimensions".to_string()))?;
    image
        .save(path)
        .map_err(|error| Error::BackendError(format!("failed to save {}: {}", path, error)))?;
    Ok(())
}
