//! Render configuration: which categories are drawn, and how grid nodes are
//! colored.
//!
//! [`RenderConfig`] is a flat value. Every flag and selector is independent
//! of the others; any combination is valid.
//!
//! # Usage
//!
//! ```
//! use wetcloth_viz::config::{FaceCenterView, RenderConfig, RenderToggle};
//!
//! let mut config = RenderConfig::default();
//! config.face_center_view = FaceCenterView::LiquidVolume;
//! config.toggle(RenderToggle::Buckets);
//! assert!(config.render_buckets);
//! ```

/// How solid-phase boundary nodes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeView {
    /// Not drawn (default).
    #[default]
    None,
    /// Fixed color.
    Constant,
    /// Colored by solid signed distance.
    SolidPhi,
}

/// How staggered face-center nodes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCenterView {
    /// Not drawn (default).
    #[default]
    None,
    /// Fixed color per axis.
    Constant,
    /// Colored by solid volume fraction.
    SolidVolume,
    /// Colored by liquid volume fraction.
    LiquidVolume,
}

/// How edge-center nodes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeCenterView {
    /// Not drawn (default).
    #[default]
    None,
    /// Fixed color per axis.
    Constant,
}

/// How cell-center (pressure) nodes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellCenterView {
    /// Not drawn (default).
    #[default]
    None,
    /// Fixed color.
    Constant,
    /// Colored by liquid signed distance.
    LiquidPhi,
}

macro_rules! view_selector {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in cycling order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Human-readable name.
            pub fn label(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }

            /// The variant after this one, wrapping around.
            pub fn next(&self) -> Self {
                let all = Self::ALL;
                let idx = all.iter().position(|v| v == self).unwrap_or(0);
                all[(idx + 1) % all.len()]
            }

            /// Whether anything is drawn for this selector.
            pub fn is_visible(&self) -> bool {
                !matches!(self, $ty::None)
            }
        }
    };
}

view_selector!(NodeView {
    None => "None",
    Constant => "Constant",
    SolidPhi => "Solid SDF",
});

view_selector!(FaceCenterView {
    None => "None",
    Constant => "Constant",
    SolidVolume => "Solid Volume",
    LiquidVolume => "Liquid Volume",
});

view_selector!(EdgeCenterView {
    None => "None",
    Constant => "Constant",
});

view_selector!(CellCenterView {
    None => "None",
    Constant => "Constant",
    LiquidPhi => "Liquid SDF",
});

/// Names one boolean flag of [`RenderConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderToggle {
    /// Fluid particles.
    Particles,
    /// Soft/elastic vertices.
    Vertices,
    /// Quadrature points.
    QuadraturePoints,
    /// Cloth faces.
    Cloth,
    /// Fiber (yarn) edges.
    Fibers,
    /// Level-set boundaries.
    LevelSet,
    /// Attachment springs.
    Springs,
    /// Cohesion rays.
    Cohesion,
    /// Vertex velocity vectors.
    VertexVelocity,
    /// Quadrature point velocity vectors.
    QuadratureVelocity,
    /// Fluid particle velocity vectors.
    FluidVelocity,
    /// Bucket lattice wireframe.
    Buckets,
}

impl RenderToggle {
    /// Every flag.
    pub const ALL: [RenderToggle; 12] = [
        RenderToggle::Particles,
        RenderToggle::Vertices,
        RenderToggle::QuadraturePoints,
        RenderToggle::Cloth,
        RenderToggle::Fibers,
        RenderToggle::LevelSet,
        RenderToggle::Springs,
        RenderToggle::Cohesion,
        RenderToggle::VertexVelocity,
        RenderToggle::QuadratureVelocity,
        RenderToggle::FluidVelocity,
        RenderToggle::Buckets,
    ];

    /// Human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            RenderToggle::Particles => "Fluid particles",
            RenderToggle::Vertices => "Vertices",
            RenderToggle::QuadraturePoints => "Quadrature points",
            RenderToggle::Cloth => "Cloth",
            RenderToggle::Fibers => "Fibers",
            RenderToggle::LevelSet => "Level set",
            RenderToggle::Springs => "Springs",
            RenderToggle::Cohesion => "Cohesion",
            RenderToggle::VertexVelocity => "Vertex velocity",
            RenderToggle::QuadratureVelocity => "Quadrature velocity",
            RenderToggle::FluidVelocity => "Fluid velocity",
            RenderToggle::Buckets => "Buckets",
        }
    }
}

/// Per-frame view configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Draw fluid particles.
    pub render_particles: bool,
    /// Draw soft/elastic vertices.
    pub render_vertices: bool,
    /// Draw quadrature points.
    pub render_quadrature_points: bool,
    /// Draw cloth faces.
    pub render_cloth: bool,
    /// Draw fiber edges.
    pub render_fibers: bool,
    /// Draw level-set boundaries.
    pub render_level_set: bool,
    /// Draw attachment springs.
    pub render_springs: bool,
    /// Draw cohesion rays.
    pub render_cohesion: bool,
    /// Draw vertex velocity vectors.
    pub render_vertex_velocity: bool,
    /// Draw quadrature point velocity vectors.
    pub render_quadrature_velocity: bool,
    /// Draw fluid particle velocity vectors.
    pub render_fluid_velocity: bool,
    /// Draw the bucket lattice wireframe.
    pub render_buckets: bool,
    /// Solid-phase boundary node view.
    pub node_view: NodeView,
    /// Face-center node view.
    pub face_center_view: FaceCenterView,
    /// Edge-center node view.
    pub edge_center_view: EdgeCenterView,
    /// Cell-center node view.
    pub cell_center_view: CellCenterView,
    /// Length of deformation-gradient axes. The overlay is drawn iff `> 0`.
    pub deformation_gradient_length: f32,
    /// Multiplier on `velocity * dt` for velocity vectors.
    pub velocity_scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_particles: true,
            render_vertices: false,
            render_quadrature_points: false,
            render_cloth: true,
            render_fibers: true,
            render_level_set: true,
            render_springs: true,
            render_cohesion: false,
            render_vertex_velocity: false,
            render_quadrature_velocity: false,
            render_fluid_velocity: false,
            render_buckets: false,
            node_view: NodeView::None,
            face_center_view: FaceCenterView::None,
            edge_center_view: EdgeCenterView::None,
            cell_center_view: CellCenterView::None,
            deformation_gradient_length: 0.0,
            velocity_scale: 10.0,
        }
    }
}

impl RenderConfig {
    /// Create a configuration with the default view.
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration with every flag off and every selector at `None`.
    pub fn none() -> Self {
        let mut config = Self::default();
        for toggle in RenderToggle::ALL {
            config.set(toggle, false);
        }
        config
    }

    fn flag_mut(&mut self, toggle: RenderToggle) -> &mut bool {
        match toggle {
            RenderToggle::Particles => &mut self.render_particles,
            RenderToggle::Vertices => &mut self.render_vertices,
            RenderToggle::QuadraturePoints => &mut self.render_quadrature_points,
            RenderToggle::Cloth => &mut self.render_cloth,
            RenderToggle::Fibers => &mut self.render_fibers,
            RenderToggle::LevelSet => &mut self.render_level_set,
            RenderToggle::Springs => &mut self.render_springs,
            RenderToggle::Cohesion => &mut self.render_cohesion,
            RenderToggle::VertexVelocity => &mut self.render_vertex_velocity,
            RenderToggle::QuadratureVelocity => &mut self.render_quadrature_velocity,
            RenderToggle::FluidVelocity => &mut self.render_fluid_velocity,
            RenderToggle::Buckets => &mut self.render_buckets,
        }
    }

    /// Whether a flag is on.
    pub fn is_enabled(&self, toggle: RenderToggle) -> bool {
        match toggle {
            RenderToggle::Particles => self.render_particles,
            RenderToggle::Vertices => self.render_vertices,
            RenderToggle::QuadraturePoints => self.render_quadrature_points,
            RenderToggle::Cloth => self.render_cloth,
            RenderToggle::Fibers => self.render_fibers,
            RenderToggle::LevelSet => self.render_level_set,
            RenderToggle::Springs => self.render_springs,
            RenderToggle::Cohesion => self.render_cohesion,
            RenderToggle::VertexVelocity => self.render_vertex_velocity,
            RenderToggle::QuadratureVelocity => self.render_quadrature_velocity,
            RenderToggle::FluidVelocity => self.render_fluid_velocity,
            RenderToggle::Buckets => self.render_buckets,
        }
    }

    /// Set a flag.
    pub fn set(&mut self, toggle: RenderToggle, enabled: bool) -> &mut Self {
        *self.flag_mut(toggle) = enabled;
        self
    }

    /// Flip a flag, returning its new state.
    pub fn toggle(&mut self, toggle: RenderToggle) -> bool {
        let flag = self.flag_mut(toggle);
        *flag = !*flag;
        *flag
    }

    /// Whether deformation-gradient axes are drawn.
    pub fn deformation_gradient_visible(&self) -> bool {
        self.deformation_gradient_length > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baseline() {
        let config = RenderConfig::default();
        assert!(config.render_particles);
        assert!(config.render_cloth);
        assert!(config.render_fibers);
        assert!(config.render_springs);
        assert!(config.render_level_set);

        assert!(!config.render_quadrature_points);
        assert!(!config.render_vertices);
        assert!(!config.render_vertex_velocity);
        assert!(!config.render_quadrature_velocity);
        assert!(!config.render_fluid_velocity);
        assert!(!config.render_buckets);
        assert!(!config.render_cohesion);

        assert_eq!(config.node_view, NodeView::None);
        assert_eq!(config.face_center_view, FaceCenterView::None);
        assert_eq!(config.edge_center_view, EdgeCenterView::None);
        assert_eq!(config.cell_center_view, CellCenterView::None);
        assert!(!config.deformation_gradient_visible());
        assert_eq!(config.velocity_scale, 10.0);
    }

    #[test]
    fn test_set_touches_one_flag() {
        for toggle in RenderToggle::ALL {
            let base = RenderConfig::default();
            let mut changed = base.clone();
            changed.set(toggle, !base.is_enabled(toggle));

            for other in RenderToggle::ALL {
                if other == toggle {
                    assert_ne!(changed.is_enabled(other), base.is_enabled(other));
                } else {
                    assert_eq!(changed.is_enabled(other), base.is_enabled(other));
                }
            }
            assert_eq!(changed.node_view, base.node_view);
            assert_eq!(changed.face_center_view, base.face_center_view);
        }
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut config = RenderConfig::default();
        assert!(config.toggle(RenderToggle::Cohesion));
        assert!(config.render_cohesion);
        assert!(!config.toggle(RenderToggle::Cohesion));
        assert_eq!(config, RenderConfig::default());
    }

    #[test]
    fn test_none_disables_everything() {
        let config = RenderConfig::none();
        assert!(RenderToggle::ALL.iter().all(|t| !config.is_enabled(*t)));
        assert!(!config.node_view.is_visible());
    }

    #[test]
    fn test_selector_cycle() {
        assert_eq!(NodeView::None.next(), NodeView::Constant);
        assert_eq!(NodeView::SolidPhi.next(), NodeView::None);
        assert_eq!(FaceCenterView::LiquidVolume.next(), FaceCenterView::None);
        assert_eq!(EdgeCenterView::Constant.next(), EdgeCenterView::None);

        let mut view = CellCenterView::None;
        for _ in 0..CellCenterView::ALL.len() {
            view = view.next();
        }
        assert_eq!(view, CellCenterView::None);
    }

    #[test]
    fn test_labels_unique() {
        let labels: std::collections::HashSet<_> =
            RenderToggle::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels.len(), RenderToggle::ALL.len());
        assert_eq!(FaceCenterView::SolidVolume.label(), "Solid Volume");
    }
}
