//! Walking per-bucket grid node arrays.
//!
//! The scene stores staggered-grid nodes bucket by bucket, one position array
//! per [`NodeKind`] and one scalar array per [`NodeField`]. A
//! [`BucketFieldWalker`] flattens one kind across all buckets into colored
//! points. [`grid_overlays`] turns the four view selectors of a
//! [`RenderConfig`] into the list of walks to perform.

use glam::{Vec3, Vec4};

use crate::color::ColorMap;
use crate::config::{CellCenterView, EdgeCenterView, FaceCenterView, NodeView, RenderConfig};
use crate::draw::Category;
use crate::palette::RenderPalette;
use crate::scene::{Axis, NodeField, NodeKind, SceneView};

/// Signed distances are shown over `[-SDF_RANGE_CELLS * dx, SDF_RANGE_CELLS * dx]`.
pub const SDF_RANGE_CELLS: f32 = 3.0;

/// How walked nodes get their color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeColoring {
    /// Every node the same color.
    Constant(Vec4),
    /// Color from a scalar field mapped over `[lo, hi]`.
    Field {
        field: NodeField,
        lo: f32,
        hi: f32,
        alpha: f32,
    },
}

/// One walk over a node kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOverlay {
    pub category: Category,
    pub kind: NodeKind,
    pub coloring: NodeColoring,
}

impl GridOverlay {
    /// Constant-colored walk.
    pub fn constant(category: Category, kind: NodeKind, color: Vec4) -> Self {
        Self {
            category,
            kind,
            coloring: NodeColoring::Constant(color),
        }
    }

    /// Field-colored walk over the nodes the field is sampled at.
    pub fn field(category: Category, field: NodeField, lo: f32, hi: f32, alpha: f32) -> Self {
        Self {
            category,
            kind: field.kind(),
            coloring: NodeColoring::Field { field, lo, hi, alpha },
        }
    }

    /// Walk the scene's buckets for this overlay.
    pub fn walk<'a, S: SceneView + ?Sized>(
        &self,
        scene: &'a S,
        color_map: &'a ColorMap,
    ) -> BucketFieldWalker<'a, S> {
        BucketFieldWalker::new(scene, self.kind, self.coloring, color_map)
    }
}

/// The walks requested by the node, face-center, edge-center and cell-center
/// selectors, in that order.
///
/// `cell_size` sets the signed-distance domain.
pub fn grid_overlays(
    config: &RenderConfig,
    palette: &RenderPalette,
    cell_size: f32,
) -> Vec<GridOverlay> {
    let alpha = palette.overlay_alpha;
    let constant = |category, kind| {
        GridOverlay::constant(category, kind, palette.node_color(kind).extend(alpha))
    };
    let sdf = SDF_RANGE_CELLS * cell_size;
    let mut overlays = Vec::new();

    match config.node_view {
        NodeView::None => {}
        NodeView::Constant => overlays.push(constant(Category::NodeOverlay, NodeKind::SolidPhi)),
        NodeView::SolidPhi => overlays.push(GridOverlay::field(
            Category::NodeOverlay,
            NodeField::SolidPhi,
            -sdf,
            sdf,
            alpha,
        )),
    }

    for axis in Axis::ALL {
        let overlay = match config.face_center_view {
            FaceCenterView::None => continue,
            FaceCenterView::Constant => {
                constant(Category::FaceCenterOverlay, NodeKind::FaceCenter(axis))
            }
            FaceCenterView::SolidVolume => GridOverlay::field(
                Category::FaceCenterOverlay,
                NodeField::SolidVolume(axis),
                0.0,
                1.0,
                alpha,
            ),
            FaceCenterView::LiquidVolume => GridOverlay::field(
                Category::FaceCenterOverlay,
                NodeField::LiquidVolume(axis),
                0.0,
                1.0,
                alpha,
            ),
        };
        overlays.push(overlay);
    }

    if config.edge_center_view == EdgeCenterView::Constant {
        for axis in Axis::ALL {
            overlays.push(constant(Category::EdgeCenterOverlay, NodeKind::EdgeCenter(axis)));
        }
    }

    match config.cell_center_view {
        CellCenterView::None => {}
        CellCenterView::Constant => {
            overlays.push(constant(Category::CellCenterOverlay, NodeKind::CellCenter))
        }
        CellCenterView::LiquidPhi => overlays.push(GridOverlay::field(
            Category::CellCenterOverlay,
            NodeField::LiquidPhi,
            -sdf,
            sdf,
            alpha,
        )),
    }

    overlays
}

/// Lazy `(position, color)` sequence over one node kind of every bucket.
///
/// Buckets are visited in ascending index, nodes in array order. A bucket with
/// no nodes of the kind contributes nothing.
pub struct BucketFieldWalker<'a, S: SceneView + ?Sized> {
    scene: &'a S,
    kind: NodeKind,
    coloring: NodeColoring,
    color_map: &'a ColorMap,
    num_buckets: usize,
    next_bucket: usize,
    nodes: &'a [Vec3],
    values: &'a [f32],
    index: usize,
}

impl<'a, S: SceneView + ?Sized> BucketFieldWalker<'a, S> {
    /// Walk `kind` with the given coloring.
    ///
    /// A field coloring must be sampled at `kind`.
    pub fn new(
        scene: &'a S,
        kind: NodeKind,
        coloring: NodeColoring,
        color_map: &'a ColorMap,
    ) -> Self {
        if let NodeColoring::Field { field, .. } = coloring {
            debug_assert_eq!(field.kind(), kind, "{field:?} is not sampled at {kind:?}");
        }
        Self {
            scene,
            kind,
            coloring,
            color_map,
            num_buckets: scene.num_buckets(),
            next_bucket: 0,
            nodes: &[],
            values: &[],
            index: 0,
        }
    }

    fn load_bucket(&mut self, bucket: usize) {
        let scene = self.scene;
        self.nodes = scene.bucket_nodes(bucket, self.kind);
        self.values = match self.coloring {
            NodeColoring::Constant(_) => &[],
            NodeColoring::Field { field, .. } => {
                let values = scene.bucket_field(bucket, field);
                debug_assert_eq!(
                    values.len(),
                    self.nodes.len(),
                    "bucket {bucket}: {field:?} has {} values for {} nodes",
                    values.len(),
                    self.nodes.len()
                );
                values
            }
        };
        self.index = 0;
    }

    fn color_at(&self, index: usize) -> Vec4 {
        match self.coloring {
            NodeColoring::Constant(color) => color,
            NodeColoring::Field { lo, hi, alpha, .. } => {
                self.color_map.map(self.values[index], lo, hi).extend(alpha)
            }
        }
    }
}

impl<S: SceneView + ?Sized> Iterator for BucketFieldWalker<'_, S> {
    type Item = (Vec3, Vec4);

    fn next(&mut self) -> Option<Self::Item> {
        while self.index >= self.nodes.len() {
            if self.next_bucket >= self.num_buckets {
                return None;
            }
            let bucket = self.next_bucket;
            self.next_bucket += 1;
            self.load_bucket(bucket);
        }
        let i = self.index;
        self.index += 1;
        Some((self.nodes[i], self.color_at(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{BucketData, SceneSnapshot};

    fn scene_with_buckets(buckets: Vec<BucketData>) -> SceneSnapshot {
        SceneSnapshot {
            cell_size: 0.1,
            buckets,
            ..Default::default()
        }
    }

    #[test]
    fn test_walk_order_and_empty_buckets() {
        let mut b0 = BucketData::new();
        b0.set_nodes(
            NodeKind::CellCenter,
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
        );
        let b1 = BucketData::new();
        let mut b2 = BucketData::new();
        b2.set_nodes(NodeKind::CellCenter, vec![Vec3::new(2.0, 0.0, 0.0)]);
        let scene = scene_with_buckets(vec![b0, b1, b2]);

        let map = ColorMap::default();
        let color = Vec4::new(0.0, 0.0, 0.0, 0.8);
        let xs: Vec<f32> = BucketFieldWalker::new(
            &scene,
            NodeKind::CellCenter,
            NodeColoring::Constant(color),
            &map,
        )
        .map(|(p, c)| {
            assert_eq!(c, color);
            p.x
        })
        .collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_walk_other_kind_is_empty() {
        let mut b0 = BucketData::new();
        b0.set_nodes(NodeKind::CellCenter, vec![Vec3::ZERO]);
        let scene = scene_with_buckets(vec![b0]);
        let map = ColorMap::default();
        let walker = BucketFieldWalker::new(
            &scene,
            NodeKind::EdgeCenter(Axis::X),
            NodeColoring::Constant(Vec4::ONE),
            &map,
        );
        assert_eq!(walker.count(), 0);
    }

    #[test]
    fn test_walk_no_buckets() {
        let scene = scene_with_buckets(Vec::new());
        let map = ColorMap::default();
        let walker = BucketFieldWalker::new(
            &scene,
            NodeKind::SolidPhi,
            NodeColoring::Constant(Vec4::ONE),
            &map,
        );
        assert_eq!(walker.count(), 0);
    }

    #[test]
    fn test_field_coloring() {
        let mut b0 = BucketData::new();
        b0.set_nodes(NodeKind::FaceCenter(Axis::Y), vec![Vec3::ZERO, Vec3::Y, Vec3::Z])
            .set_field(NodeField::LiquidVolume(Axis::Y), vec![-1.0, 0.5, 2.0]);
        let scene = scene_with_buckets(vec![b0]);
        let map = ColorMap::default();
        let overlay = GridOverlay::field(
            Category::FaceCenterOverlay,
            NodeField::LiquidVolume(Axis::Y),
            0.0,
            1.0,
            0.8,
        );
        let colors: Vec<Vec4> = overlay.walk(&scene, &map).map(|(_, c)| c).collect();
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], map.low().extend(0.8));
        assert_eq!(colors[1], map.map_unit(0.5).extend(0.8));
        assert_eq!(colors[2], map.high().extend(0.8));
    }

    #[test]
    fn test_overlays_from_default_config() {
        let config = RenderConfig::default();
        let overlays = grid_overlays(&config, &RenderPalette::default(), 0.1);
        assert!(overlays.is_empty());
    }

    #[test]
    fn test_overlays_from_selectors() {
        let palette = RenderPalette::default();
        let mut config = RenderConfig::default();
        config.node_view = NodeView::SolidPhi;
        config.face_center_view = FaceCenterView::Constant;
        config.edge_center_view = EdgeCenterView::Constant;
        config.cell_center_view = CellCenterView::LiquidPhi;

        let overlays = grid_overlays(&config, &palette, 0.5);
        assert_eq!(overlays.len(), 1 + 3 + 3 + 1);

        assert_eq!(
            overlays[0].coloring,
            NodeColoring::Field { field: NodeField::SolidPhi, lo: -1.5, hi: 1.5, alpha: 0.8 }
        );
        assert_eq!(overlays[1].kind, NodeKind::FaceCenter(Axis::X));
        assert_eq!(
            overlays[2].coloring,
            NodeColoring::Constant(palette.face_centers[1].extend(0.8))
        );
        assert_eq!(overlays[6].kind, NodeKind::EdgeCenter(Axis::Z));
        assert_eq!(overlays[7].category, Category::CellCenterOverlay);
        assert_eq!(overlays[7].kind, NodeKind::CellCenter);
    }

    #[test]
    fn test_face_volume_views_pick_matching_field() {
        let palette = RenderPalette::default();
        let mut config = RenderConfig::default();
        config.face_center_view = FaceCenterView::SolidVolume;
        let overlays = grid_overlays(&config, &palette, 1.0);
        let fields: Vec<_> = overlays
            .iter()
            .map(|o| match o.coloring {
                NodeColoring::Field { field, .. } => field,
                NodeColoring::Constant(_) => panic!("expected field coloring"),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                NodeField::SolidVolume(Axis::X),
                NodeField::SolidVolume(Axis::Y),
                NodeField::SolidVolume(Axis::Z),
            ]
        );
    }
}
