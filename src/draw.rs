//! Backend-independent primitive batches.
//!
//! [`FrameRenderer`](crate::FrameRenderer) produces a [`DrawList`] per frame.
//! A backend (the wgpu one in this crate, or a test) consumes the batches in
//! order. Nothing here is retained between frames.

use glam::{Vec3, Vec4};

/// What part of the scene a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ClothFaces,
    Fibers,
    Springs,
    QuadraturePoints,
    Buckets,
    Cohesion,
    NodeOverlay,
    FaceCenterOverlay,
    EdgeCenterOverlay,
    CellCenterOverlay,
    FluidParticles,
    Vertices,
    VertexVelocity,
    QuadratureVelocity,
    FluidVelocity,
    DeformationGradient,
    LevelSet,
}

/// Primitive type of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// One vertex per point.
    Points,
    /// Two vertices per segment.
    Lines,
    /// Three vertices per triangle.
    Triangles,
}

impl Primitive {
    /// Vertices per primitive.
    pub fn arity(&self) -> usize {
        match self {
            Primitive::Points => 1,
            Primitive::Lines => 2,
            Primitive::Triangles => 3,
        }
    }
}

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    #[default]
    Solid,
    /// Triangle outlines only.
    Wireframe,
}

/// How a batch combines with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Blend {
    #[default]
    Opaque,
    /// Standard source-over alpha blending.
    Alpha,
}

/// A colored vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawVertex {
    pub position: Vec3,
    pub color: Vec4,
}

/// A run of primitives sharing one render state.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub category: Category,
    pub primitive: Primitive,
    pub fill: FillMode,
    pub blend: Blend,
    /// Whether the batch is depth tested against earlier opaque batches.
    pub depth_test: bool,
    /// Point diameter in pixels.
    pub point_size: f32,
    /// Line width in pixels. Backends may clamp to 1.
    pub line_width: f32,
    pub vertices: Vec<DrawVertex>,
}

impl Batch {
    /// An empty opaque, solid, non-depth-tested batch.
    pub fn new(category: Category, primitive: Primitive) -> Self {
        Self {
            category,
            primitive,
            fill: FillMode::Solid,
            blend: Blend::Opaque,
            depth_test: false,
            point_size: 1.0,
            line_width: 1.0,
            vertices: Vec::new(),
        }
    }

    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_blend(mut self, blend: Blend) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_depth_test(mut self, depth_test: bool) -> Self {
        self.depth_test = depth_test;
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }

    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Append one vertex.
    #[inline]
    pub fn push(&mut self, position: Vec3, color: Vec4) {
        self.vertices.push(DrawVertex { position, color });
    }

    /// Append a segment with one color.
    #[inline]
    pub fn push_line(&mut self, a: Vec3, b: Vec3, color: Vec4) {
        self.push(a, color);
        self.push(b, color);
    }

    /// Number of complete primitives.
    pub fn primitive_count(&self) -> usize {
        self.vertices.len() / self.primitive.arity()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Ordered batches for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    batches: Vec<Batch>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch. Empty batches are dropped.
    pub fn push(&mut self, batch: Batch) {
        debug_assert_eq!(
            batch.vertices.len() % batch.primitive.arity(),
            0,
            "incomplete primitive in {:?} batch",
            batch.category
        );
        if !batch.is_empty() {
            self.batches.push(batch);
        }
    }

    /// All batches in submission order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Batches of one category, in submission order.
    pub fn category(&self, category: Category) -> impl Iterator<Item = &Batch> + '_ {
        self.batches.iter().filter(move |b| b.category == category)
    }

    /// Primitives of one category summed over its batches.
    pub fn primitive_count(&self, category: Category) -> usize {
        self.category(category).map(Batch::primitive_count).sum()
    }

    /// Total vertex count.
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
