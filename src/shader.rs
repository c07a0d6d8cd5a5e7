//! GPU-side vertex and uniform layouts, and the debug-draw WGSL.

use bytemuck::{Pod, Zeroable};

use crate::draw::DrawVertex;

/// One vertex of the per-frame vertex buffer.
///
/// Used per-vertex for lines and triangles, and per-instance for points.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    /// Point diameter in pixels. Ignored by line and triangle pipelines.
    pub size: f32,
    pub color: [f32; 4],
}

impl GpuVertex {
    pub fn new(vertex: &DrawVertex, size: f32) -> Self {
        Self {
            position: vertex.position.to_array(),
            size,
            color: vertex.color.to_array(),
        }
    }

    /// Vertex attributes: position, size, color.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32, 2 => Float32x4];
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Surface size in pixels.
    pub viewport: [f32; 2],
    pub _padding: [f32; 2],
}

pub const DEBUG_DRAW_WGSL: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    viewport: vec2<f32>,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec4<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@vertex
fn vs_point(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) color: vec4<f32>,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = corners[vertex_index];

    // Half a diameter in pixels is size / viewport in NDC.
    let offset = corner * size / max(uniforms.viewport, vec2<f32>(1.0, 1.0));

    var clip = uniforms.view_proj * vec4<f32>(position, 1.0);
    clip.x += offset.x * clip.w;
    clip.y += offset.y * clip.w;

    var out: VertexOutput;
    out.clip_position = clip;
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_packed() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 32);
        assert_eq!(GpuVertex::ATTRIBUTES[1].offset, 12);
        assert_eq!(GpuVertex::ATTRIBUTES[2].offset, 16);
    }

    #[test]
    fn test_uniforms_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }
}
