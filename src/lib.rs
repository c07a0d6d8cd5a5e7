//! # wetcloth-viz
//!
//! Render-mode dispatch and scalar-to-color mapping for visualizing a coupled
//! cloth, fiber and fluid simulation.
//!
//! The crate turns a read-only [`SceneView`] into ordered, colored primitive
//! batches ([`DrawList`]) according to a [`RenderConfig`]. Building a frame is
//! a pure CPU step with no GPU involvement, so it can be tested and
//! benchmarked headless. A small wgpu/winit [`Viewer`] draws the batches on
//! screen.
//!
//! ## Quick Start
//!
//! ```
//! use wetcloth_viz::prelude::*;
//! use wetcloth_viz::draw::Category;
//!
//! let scene = demo::wet_cloth(8);
//! let mut renderer = FrameRenderer::new(&scene);
//! renderer.config_mut().render_buckets = true;
//!
//! let frame = renderer.render_frame(&scene, 1.0 / 60.0);
//! assert!(frame.primitive_count(Category::Buckets) > 0);
//! ```
//!
//! ## Core Concepts
//!
//! ### Scene
//!
//! [`SceneView`] is the accessor surface a simulation exposes: particle
//! arrays, cloth faces, fiber edges, quadrature points, attachment springs,
//! level-set boundaries and per-bucket grid nodes. [`SceneSnapshot`] is an
//! owned implementation.
//!
//! ### Configuration
//!
//! [`RenderConfig`] holds one flag per drawable category, four grid-node view
//! selectors and two scalar lengths. Any combination is valid.
//!
//! ### Color
//!
//! Cloth and fibers blend toward the fluid color by per-particle saturation.
//! Fibers start from a grayscale [`GroupColorTable`] color. Scalar fields go
//! through a [`ColorMap`](color::ColorMap).
//!
//! ## Feature Overview
//!
//! | Category | Drawn as |
//! |----------|----------|
//! | Cloth faces | filled triangles + wireframe |
//! | Fibers, springs, cohesion rays | lines |
//! | Quadrature points, particles, vertices, grid nodes | points |
//! | Velocities, deformation gradients | translucent lines |
//! | Bucket lattice | translucent lines |
//! | Level sets | translucent triangles + wireframe |

pub mod color;
pub mod config;
pub mod demo;
pub mod draw;
mod error;
pub mod gpu;
pub mod groups;
pub mod palette;
#[cfg(feature = "egui")]
pub mod panel;
mod renderer;
pub mod scene;
pub mod shader;
mod viewer;
pub mod walker;

pub use config::{
    CellCenterView, EdgeCenterView, FaceCenterView, NodeView, RenderConfig, RenderToggle,
};
pub use draw::DrawList;
pub use error::{GpuError, ViewerError};
pub use glam::{Mat3, Vec3, Vec4};
pub use groups::GroupColorTable;
pub use palette::RenderPalette;
pub use renderer::{bucket_lattice_lines, FrameRenderer};
pub use scene::{SceneSnapshot, SceneView};
pub use viewer::{ViewControls, Viewer};
pub use walker::BucketFieldWalker;

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use wetcloth_viz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::ColorMap;
    pub use crate::config::{
        CellCenterView, EdgeCenterView, FaceCenterView, NodeView, RenderConfig, RenderToggle,
    };
    pub use crate::demo;
    pub use crate::draw::DrawList;
    pub use crate::error::{GpuError, ViewerError};
    pub use crate::palette::RenderPalette;
    pub use crate::renderer::FrameRenderer;
    pub use crate::scene::{
        Attachment, BoundaryField, BoundaryUsage, BucketGrid, MeshBoundary, MeshPart, RayHit,
        RigidTransform, SceneSnapshot, SceneView,
    };
    pub use crate::viewer::Viewer;
    pub use crate::{Mat3, Vec3, Vec4};
    #[cfg(feature = "egui")]
    pub use egui;
}
