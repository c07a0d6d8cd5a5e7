//! Fixed colors used by the frame renderer.

use glam::{Vec3, Vec4};

use crate::color::ColorMap;
use crate::scene::{BoundaryUsage, NodeKind};

/// Every fixed color the renderer draws with, plus the scalar color map.
///
/// Passed to [`FrameRenderer`](crate::FrameRenderer) at construction and not
/// changed afterwards. `Default` gives the reference look: light gray cloth,
/// blue fluid, grayscale fiber groups.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPalette {
    /// Dry cloth face fill.
    pub face: Vec3,
    /// Dry cloth face wireframe.
    pub face_wire: Vec3,
    /// Fluid tint blended into wet cloth and fibers.
    pub fluid: Vec3,
    /// Soft/elastic vertices and their velocity vectors.
    pub vertex: Vec3,
    /// Quadrature points and their velocity vectors.
    pub quadrature: Vec3,
    /// Deformation-gradient axes.
    pub deformation_gradient: Vec3,
    /// Attachment springs.
    pub attachment: Vec3,
    /// Solid-phi nodes in constant view.
    pub node_solid_phi: Vec3,
    /// Face-center nodes per axis in constant view.
    pub face_centers: [Vec3; 3],
    /// Edge-center nodes per axis in constant view.
    pub edge_centers: [Vec3; 3],
    /// Cell-center nodes in constant view.
    pub cell_center: Vec3,
    /// Bucket lattice lines.
    pub bucket_grid: Vec4,
    /// Fluid particles.
    pub fluid_particle: Vec4,
    /// Solid level-set boundaries.
    pub level_set_solid: Vec4,
    /// Terminator level-set boundaries.
    pub level_set_terminator: Vec4,
    /// Alpha of grid-node overlays.
    pub overlay_alpha: f32,
    /// Alpha of velocity and deformation-gradient vectors.
    pub vector_alpha: f32,
    /// Ramp for scalar fields and cohesion rays.
    pub scalar_map: ColorMap,
}

impl Default for RenderPalette {
    fn default() -> Self {
        Self {
            face: Vec3::splat(0.75),
            face_wire: Vec3::splat(0.45),
            fluid: Vec3::new(0.0, 0.0, 1.0),
            vertex: Vec3::new(0.650980392156863, 0.294117647058824, 0.0),
            quadrature: Vec3::new(0.388235294117647, 0.388235294117647, 0.0),
            deformation_gradient: Vec3::new(0.85, 0.45, 0.0),
            attachment: Vec3::new(1.0, 0.0, 0.0),
            node_solid_phi: Vec3::new(0.85, 0.85, 0.0),
            face_centers: [
                Vec3::new(0.650980392156863, 0.1470588235, 0.1470588235),
                Vec3::new(0.1470588235, 0.650980392156863, 0.1470588235),
                Vec3::new(0.1470588235, 0.650980392156863, 0.650980392156863),
            ],
            edge_centers: [
                Vec3::new(0.451, 0.054, 0.298),
                Vec3::new(0.298, 0.451, 0.054),
                Vec3::new(0.054, 0.298, 0.451),
            ],
            cell_center: Vec3::ZERO,
            bucket_grid: Vec4::new(0.5, 0.5, 0.5, 0.25),
            fluid_particle: Vec4::new(0.0, 0.0, 1.0, 0.1),
            level_set_solid: Vec4::new(0.0, 0.0, 0.0, 0.02),
            level_set_terminator: Vec4::new(0.0, 0.0, 1.0, 0.02),
            overlay_alpha: 0.8,
            vector_alpha: 0.25,
            scalar_map: ColorMap::default(),
        }
    }
}

impl RenderPalette {
    /// Constant-view color of a grid node kind.
    pub fn node_color(&self, kind: NodeKind) -> Vec3 {
        match kind {
            NodeKind::SolidPhi => self.node_solid_phi,
            NodeKind::FaceCenter(axis) => self.face_centers[axis.index()],
            NodeKind::EdgeCenter(axis) => self.edge_centers[axis.index()],
            NodeKind::CellCenter => self.cell_center,
        }
    }

    /// Fill color of a boundary, or `None` if that usage is not drawn.
    pub fn boundary_color(&self, usage: BoundaryUsage) -> Option<Vec4> {
        match usage {
            BoundaryUsage::Solid => Some(self.level_set_solid),
            BoundaryUsage::Terminator => Some(self.level_set_terminator),
            BoundaryUsage::Source | BoundaryUsage::Pressure => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_colors_are_distinct() {
        let palette = RenderPalette::default();
        let colors: Vec<Vec3> = NodeKind::ALL.iter().map(|k| palette.node_color(*k)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_boundary_colors() {
        let palette = RenderPalette::default();
        assert_eq!(palette.boundary_color(BoundaryUsage::Solid), Some(palette.level_set_solid));
        assert_eq!(
            palette.boundary_color(BoundaryUsage::Terminator),
            Some(palette.level_set_terminator)
        );
        assert_eq!(palette.boundary_color(BoundaryUsage::Source), None);
        assert_eq!(palette.boundary_color(BoundaryUsage::Pressure), None);
    }
}
