//! Canonical sample shaders and geometry
//!
//! The classic first-triangle material: a vertex/fragment pair that passes
//! positions through and paints orange, a gradient pair that interpolates
//! position into color, and a uniform-tinted fragment shader.

use crate::graphics_device::Vertex;

/// Pass-through vertex shader: expands the 2D position to a clip-space point
pub const TRIANGLE_VERTEX_SHADER: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;

void main() {
    gl_Position = vec4(aPos, 0.0, 1.0);
}
"#;

/// Solid orange fragment shader
pub const TRIANGLE_FRAGMENT_SHADER: &str = r#"#version 330 core
out vec4 FragColor;

void main() {
    FragColor = vec4(1.0, 0.5, 0.2, 1.0);
}
"#;

/// Vertex shader that also hands the position to the fragment stage
pub const GRADIENT_VERTEX_SHADER: &str = r#"#version 330 core
layout (location = 0) in vec2 aPos;
out vec2 vertexPos;

void main() {
    gl_Position = vec4(aPos, 0.0, 1.0);
    vertexPos = aPos;
}
"#;

/// Fragment shader that colors by interpolated position
pub const GRADIENT_FRAGMENT_SHADER: &str = r#"#version 330 core
in vec2 vertexPos;
out vec4 FragColor;

void main() {
    FragColor = vec4(vertexPos.x, vertexPos.y, 0.5, 1.0);
}
"#;

/// Fragment shader tinted by a uniform color
pub const UNIFORM_FRAGMENT_SHADER: &str = r#"#version 330 core
uniform vec4 uColor;
out vec4 FragColor;

void main() {
    FragColor = uColor;
}
"#;

/// The tutorial triangle: bottom-left, bottom-right, top-center
pub fn triangle_vertices() -> [Vertex; 3] {
    [
        Vertex::new(-0.5, -0.5),
        Vertex::new(0.5, -0.5),
        Vertex::new(0.0, 0.5),
    ]
}
