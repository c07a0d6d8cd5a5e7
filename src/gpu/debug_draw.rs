//! Immediate-mode debug drawing of a [`DrawList`].
//!
//! Every frame the batches are flattened into one vertex buffer and a short
//! list of draw calls. Each call selects one of twelve pre-built pipelines by
//! its [`PipelineKey`]. Wireframe triangles become line lists here, so no
//! `POLYGON_MODE_LINE` device feature is needed. Points are drawn as
//! instanced screen-aligned quads sized in pixels.

use std::collections::HashMap;
use std::ops::Range;

use glam::Mat4;
use wgpu::util::DeviceExt;

use super::DEPTH_FORMAT;
use crate::draw::{Blend, DrawList, FillMode, Primitive};
use crate::shader::{GpuVertex, Uniforms, DEBUG_DRAW_WGSL};

/// Rasterized primitive after wireframe expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    Triangles,
}

impl Topology {
    pub const ALL: [Topology; 3] = [Topology::Points, Topology::Lines, Topology::Triangles];
}

/// Render state a draw call needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub topology: Topology,
    pub blend: Blend,
    pub depth_test: bool,
}

impl PipelineKey {
    /// All twelve combinations.
    pub fn all() -> impl Iterator<Item = PipelineKey> {
        Topology::ALL.into_iter().flat_map(|topology| {
            [Blend::Opaque, Blend::Alpha].into_iter().flat_map(move |blend| {
                [false, true].into_iter().map(move |depth_test| PipelineKey {
                    topology,
                    blend,
                    depth_test,
                })
            })
        })
    }
}

/// A contiguous range of the frame's vertex buffer drawn with one pipeline.
///
/// For [`Topology::Points`] the range is an instance range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub key: PipelineKey,
    pub range: Range<u32>,
}

/// Flatten a draw list into GPU vertices and draw calls, in batch order.
///
/// Adjacent batches with the same key share one call.
pub fn build_draw_calls(list: &DrawList) -> (Vec<GpuVertex>, Vec<DrawCall>) {
    let mut vertices: Vec<GpuVertex> = Vec::with_capacity(list.vertex_count());
    let mut calls: Vec<DrawCall> = Vec::new();

    for batch in list.batches() {
        let topology = match (batch.primitive, batch.fill) {
            (Primitive::Points, _) => Topology::Points,
            (Primitive::Lines, _) => Topology::Lines,
            (Primitive::Triangles, FillMode::Solid) => Topology::Triangles,
            (Primitive::Triangles, FillMode::Wireframe) => Topology::Lines,
        };
        let key = PipelineKey {
            topology,
            blend: batch.blend,
            depth_test: batch.depth_test,
        };

        let start = vertices.len() as u32;
        if batch.primitive == Primitive::Triangles && batch.fill == FillMode::Wireframe {
            for tri in batch.vertices.chunks_exact(3) {
                for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                    vertices.push(GpuVertex::new(&tri[a], batch.point_size));
                    vertices.push(GpuVertex::new(&tri[b], batch.point_size));
                }
            }
        } else {
            vertices.extend(
                batch
                    .vertices
                    .iter()
                    .map(|v| GpuVertex::new(v, batch.point_size)),
            );
        }
        let end = vertices.len() as u32;

        match calls.last_mut() {
            Some(last) if last.key == key && last.range.end == start => last.range.end = end,
            _ => calls.push(DrawCall {
                key,
                range: start..end,
            }),
        }
    }

    (vertices, calls)
}

/// Pipelines and buffers for drawing a [`DrawList`].
pub struct DebugDrawState {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: Option<wgpu::Buffer>,
    /// Vertex buffer capacity in vertices.
    capacity: usize,
    calls: Vec<DrawCall>,
}

impl DebugDrawState {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniforms = Uniforms {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            viewport: [1.0, 1.0],
            _padding: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Debug Draw Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Debug Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Debug Draw Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Debug Draw Shader"),
            source: wgpu::ShaderSource::Wgsl(DEBUG_DRAW_WGSL.into()),
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Debug Draw Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines = PipelineKey::all()
            .map(|key| {
                let pipeline = create_pipeline(device, &layout, &shader, surface_format, key);
                (key, pipeline)
            })
            .collect();

        Self {
            pipelines,
            uniform_buffer,
            bind_group,
            vertex_buffer: None,
            capacity: 0,
            calls: Vec::new(),
        }
    }

    /// Upload this frame's vertices and uniforms.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        list: &DrawList,
        view_proj: Mat4,
        viewport: [f32; 2],
    ) {
        let uniforms = Uniforms {
            view_proj: view_proj.to_cols_array_2d(),
            viewport,
            _padding: [0.0; 2],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let (vertices, calls) = build_draw_calls(list);
        self.calls = calls;
        if vertices.is_empty() {
            return;
        }

        if vertices.len() > self.capacity || self.vertex_buffer.is_none() {
            let capacity = vertices.len().next_power_of_two().max(1024);
            self.vertex_buffer = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Debug Draw Vertex Buffer"),
                size: (capacity * std::mem::size_of::<GpuVertex>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
            log::debug!("debug draw vertex buffer grown to {capacity} vertices");
        }

        if let Some(buffer) = &self.vertex_buffer {
            queue.write_buffer(buffer, 0, bytemuck::cast_slice(&vertices));
        }
    }

    /// Record the prepared draw calls.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let Some(buffer) = &self.vertex_buffer else {
            return;
        };
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, buffer.slice(..));

        for call in &self.calls {
            let Some(pipeline) = self.pipelines.get(&call.key) else {
                continue;
            };
            pass.set_pipeline(pipeline);
            match call.key.topology {
                Topology::Points => pass.draw(0..6, call.range.clone()),
                Topology::Lines | Topology::Triangles => pass.draw(call.range.clone(), 0..1),
            }
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    key: PipelineKey,
) -> wgpu::RenderPipeline {
    let (entry_point, step_mode, topology) = match key.topology {
        Topology::Points => (
            "vs_point",
            wgpu::VertexStepMode::Instance,
            wgpu::PrimitiveTopology::TriangleList,
        ),
        Topology::Lines => (
            "vs_main",
            wgpu::VertexStepMode::Vertex,
            wgpu::PrimitiveTopology::LineList,
        ),
        Topology::Triangles => (
            "vs_main",
            wgpu::VertexStepMode::Vertex,
            wgpu::PrimitiveTopology::TriangleList,
        ),
    };
    let blend = match key.blend {
        Blend::Opaque => wgpu::BlendState::REPLACE,
        Blend::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("Debug Draw Pipeline {key:?}")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(entry_point),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuVertex>() as wgpu::BufferAddress,
                step_mode,
                attributes: &GpuVertex::ATTRIBUTES,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            // Translucent batches never occlude what is drawn after them.
            depth_write_enabled: key.blend == Blend::Opaque,
            depth_compare: if key.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::{Batch, Category};
    use glam::{Vec3, Vec4};

    fn triangle(category: Category) -> Batch {
        let mut batch = Batch::new(category, Primitive::Triangles);
        for p in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            batch.push(p, Vec4::ONE);
        }
        batch
    }

    #[test]
    fn test_twelve_distinct_keys() {
        let keys: std::collections::HashSet<_> = PipelineKey::all().collect();
        assert_eq!(keys.len(), 12);
    }

    #[test]
    fn test_wireframe_expands_to_lines() {
        let mut list = DrawList::new();
        list.push(triangle(Category::LevelSet).with_fill(FillMode::Wireframe));

        let (vertices, calls) = build_draw_calls(&list);
        assert_eq!(vertices.len(), 6);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].key.topology, Topology::Lines);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[5].position, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_adjacent_batches_merge() {
        let mut list = DrawList::new();
        list.push(triangle(Category::ClothFaces));
        list.push(triangle(Category::LevelSet));
        list.push(triangle(Category::LevelSet).with_blend(Blend::Alpha));

        let (vertices, calls) = build_draw_calls(&list);
        assert_eq!(vertices.len(), 9);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].range, 0..6);
        assert_eq!(calls[1].range, 6..9);
        assert_eq!(calls[1].key.blend, Blend::Alpha);
    }

    #[test]
    fn test_points_carry_size() {
        let mut list = DrawList::new();
        let mut points =
            Batch::new(Category::QuadraturePoints, Primitive::Points).with_point_size(5.0);
        points.push(Vec3::ONE, Vec4::ONE);
        list.push(points);

        let (vertices, calls) = build_draw_calls(&list);
        assert_eq!(vertices[0].size, 5.0);
        assert_eq!(calls[0].key.topology, Topology::Points);
    }
}
