//! Per-frame render pass over a scene.
//!
//! [`FrameRenderer::render_frame`] reads the [`RenderConfig`] once, then for
//! each enabled category pulls arrays from the scene and emits colored
//! batches. Categories are emitted in a fixed order so that surfaces land
//! before the translucent overlays drawn on top of them:
//!
//! 1. cloth faces (fill, then wireframe)
//! 2. fiber edges
//! 3. attachment springs
//! 4. quadrature points
//! 5. bucket lattice
//! 6. cohesion rays
//! 7. grid node overlays
//! 8. fluid particles
//! 9. soft/elastic vertices
//! 10. velocity vectors
//! 11. deformation-gradient axes
//! 12. level-set boundaries (fill, then wireframe)

use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::color::{blend_by_saturation, saturation};
use crate::config::RenderConfig;
use crate::draw::{Batch, Blend, Category, DrawList, FillMode, Primitive};
use crate::groups::GroupColorTable;
use crate::palette::RenderPalette;
use crate::scene::{debug_validate, BucketGrid, SceneView};
use crate::walker::grid_overlays;

const QUADRATURE_POINT_SIZE: f32 = 5.0;
const PARTICLE_POINT_SIZE: f32 = 4.0;
const GRID_NODE_POINT_SIZE: f32 = 3.0;
const FIBER_LINE_WIDTH: f32 = 3.0;
/// Share of the dry wireframe color mixed back into wet cloth outlines.
const WIRE_BASE_SHARE: f32 = 0.15;

/// Draws a scene according to a [`RenderConfig`].
///
/// Holds the configuration, the palette and the group color table. The scene
/// itself is only borrowed during [`render_frame`](Self::render_frame).
///
/// # Example
///
/// ```
/// use wetcloth_viz::{FrameRenderer, SceneSnapshot};
/// use wetcloth_viz::draw::Category;
/// use glam::Vec3;
///
/// let mut scene = SceneSnapshot::from_particles(vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
/// scene.faces.push([0, 1, 2]);
///
/// let renderer = FrameRenderer::new(&scene);
/// let frame = renderer.render_frame(&scene, 1.0 / 60.0);
/// assert_eq!(frame.primitive_count(Category::ClothFaces), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    config: RenderConfig,
    palette: RenderPalette,
    group_colors: GroupColorTable,
}

impl FrameRenderer {
    /// Create a renderer with the default configuration and palette.
    ///
    /// The group color table is sized from the scene's group ids now and is
    /// not rebuilt later.
    pub fn new<S: SceneView + ?Sized>(scene: &S) -> Self {
        Self::with_palette(scene, RenderPalette::default())
    }

    /// Create a renderer with a custom palette.
    pub fn with_palette<S: SceneView + ?Sized>(scene: &S, palette: RenderPalette) -> Self {
        let group_colors = GroupColorTable::build(scene.groups());
        log::info!(
            "frame renderer ready: {} particle groups, {} buckets",
            group_colors.len(),
            scene.num_buckets()
        );
        Self {
            config: RenderConfig::default(),
            palette,
            group_colors,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    pub fn palette(&self) -> &RenderPalette {
        &self.palette
    }

    pub fn group_colors(&self) -> &GroupColorTable {
        &self.group_colors
    }

    /// Build the primitive batches for one frame.
    ///
    /// `dt` is the simulation step; velocity vectors span `velocity * dt *
    /// velocity_scale`.
    pub fn render_frame<S: SceneView + ?Sized>(&self, scene: &S, dt: f32) -> DrawList {
        debug_validate(scene);
        let config = &self.config;
        let mut list = DrawList::new();

        if config.render_cloth {
            self.draw_cloth(scene, &mut list);
        }
        if config.render_fibers {
            self.draw_fibers(scene, &mut list);
        }
        if config.render_springs {
            self.draw_springs(scene, &mut list);
        }
        if config.render_quadrature_points {
            self.draw_quadrature_points(scene, &mut list);
        }
        if config.render_buckets {
            self.draw_buckets(&scene.bucket_grid(), &mut list);
        }
        if config.render_cohesion {
            self.draw_cohesion(scene, &mut list);
        }
        self.draw_grid_overlays(scene, &mut list);
        if config.render_particles {
            self.draw_fluid_particles(scene, &mut list);
        }
        if config.render_vertices {
            self.draw_vertices(scene, &mut list);
        }
        self.draw_velocities(scene, dt, &mut list);
        if config.deformation_gradient_visible() {
            self.draw_deformation_gradients(scene, &mut list);
        }
        if config.render_level_set {
            self.draw_level_sets(scene, &mut list);
        }

        log::debug!(
            "frame: {} batches, {} vertices",
            list.batches().len(),
            list.vertex_count()
        );
        list
    }

    fn particle_saturation<S: SceneView + ?Sized>(scene: &S, particle: usize) -> f32 {
        saturation(scene.fluid_volumes()[particle], scene.volumes()[particle])
    }

    fn draw_cloth<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let x = scene.positions();
        let palette = &self.palette;

        let mut fill = Batch::new(Category::ClothFaces, Primitive::Triangles).with_depth_test(true);
        let mut wire = Batch::new(Category::ClothFaces, Primitive::Triangles)
            .with_fill(FillMode::Wireframe)
            .with_depth_test(true);

        for face in scene.faces() {
            for &v in face {
                let sat = Self::particle_saturation(scene, v);
                let p = x[v].xyz();
                fill.push(p, blend_by_saturation(palette.face, palette.fluid, sat).extend(1.0));

                let wet_wire = blend_by_saturation(palette.face_wire, palette.fluid, sat);
                let outline =
                    wet_wire * (1.0 - WIRE_BASE_SHARE) + palette.face_wire * WIRE_BASE_SHARE;
                wire.push(p, outline.extend(1.0));
            }
        }

        list.push(fill);
        list.push(wire);
    }

    fn draw_fibers<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let x = scene.positions();
        let groups = scene.groups();
        let mut batch = Batch::new(Category::Fibers, Primitive::Lines)
            .with_depth_test(true)
            .with_line_width(FIBER_LINE_WIDTH);

        for edge in scene.edges() {
            for &v in edge {
                let sat = Self::particle_saturation(scene, v);
                let base = self.group_colors.color_of(groups[v]);
                let color = blend_by_saturation(base, self.palette.fluid, sat);
                batch.push(x[v].xyz(), color.extend(1.0));
            }
        }

        list.push(batch);
    }

    fn draw_springs<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let x = scene.positions();
        let rest = scene.rest_positions();
        let color = self.palette.attachment.extend(1.0);
        let mut batch = Batch::new(Category::Springs, Primitive::Lines);

        for attach in scene.attachments() {
            if attach.stiffness == 0.0 {
                continue;
            }
            batch.push_line(x[attach.particle].xyz(), rest[attach.particle].xyz(), color);
        }

        list.push(batch);
    }

    fn draw_quadrature_points<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let color = self.palette.quadrature.extend(1.0);
        let mut batch = Batch::new(Category::QuadraturePoints, Primitive::Points)
            .with_point_size(QUADRATURE_POINT_SIZE);
        for p in scene.quadrature_positions() {
            batch.push(p.xyz(), color);
        }
        list.push(batch);
    }

    fn draw_buckets(&self, grid: &BucketGrid, list: &mut DrawList) {
        let color = self.palette.bucket_grid;
        let mut batch = Batch::new(Category::Buckets, Primitive::Lines).with_blend(Blend::Alpha);
        for (a, b) in bucket_lattice_lines(grid) {
            batch.push_line(a, b, color);
        }
        list.push(batch);
    }

    fn draw_cohesion<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let gx = scene.quadrature_positions();
        let map = &self.palette.scalar_map;
        let mut batch = Batch::new(Category::Cohesion, Primitive::Lines);

        for (origin, hits) in gx.iter().zip(scene.intersections()) {
            for hit in hits {
                let color = map.map_unit(hit.volume_fraction).extend(1.0);
                batch.push_line(origin.xyz(), hit.end, color);
            }
        }

        list.push(batch);
    }

    fn draw_grid_overlays<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let map = &self.palette.scalar_map;
        for overlay in grid_overlays(&self.config, &self.palette, scene.cell_size()) {
            let mut batch = Batch::new(overlay.category, Primitive::Points)
                .with_blend(Blend::Alpha)
                .with_point_size(GRID_NODE_POINT_SIZE);
            for (p, color) in overlay.walk(scene, map) {
                batch.push(p, color);
            }
            list.push(batch);
        }
    }

    fn draw_fluid_particles<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let x = scene.positions();
        let color = self.palette.fluid_particle;
        let mut batch = Batch::new(Category::FluidParticles, Primitive::Points)
            .with_blend(Blend::Alpha)
            .with_point_size(PARTICLE_POINT_SIZE);
        for &i in scene.fluid_indices() {
            batch.push(x[i].xyz(), color);
        }
        list.push(batch);
    }

    fn draw_vertices<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let x = scene.positions();
        let color = self.palette.vertex.extend(1.0);
        let mut batch = Batch::new(Category::Vertices, Primitive::Points)
            .with_point_size(PARTICLE_POINT_SIZE);
        for p in &x[..scene.num_soft_elasto_particles()] {
            batch.push(p.xyz(), color);
        }
        list.push(batch);
    }

    fn draw_velocities<S: SceneView + ?Sized>(&self, scene: &S, dt: f32, list: &mut DrawList) {
        let config = &self.config;
        let palette = &self.palette;
        let step = dt * config.velocity_scale;
        let x = scene.positions();

        if config.render_vertex_velocity {
            let n = scene.num_soft_elasto_particles();
            let lines = x[..n].iter().zip(&scene.velocities()[..n]);
            list.push(velocity_batch(
                Category::VertexVelocity,
                lines,
                step,
                palette.vertex.extend(palette.vector_alpha),
            ));
        }

        if config.render_quadrature_velocity {
            let lines = scene.quadrature_positions().iter().zip(scene.quadrature_velocities());
            list.push(velocity_batch(
                Category::QuadratureVelocity,
                lines,
                step,
                palette.quadrature.extend(palette.vector_alpha),
            ));
        }

        if config.render_fluid_velocity {
            let fv = scene.fluid_velocities();
            let lines = scene.fluid_indices().iter().map(|&i| (&x[i], &fv[i]));
            list.push(velocity_batch(
                Category::FluidVelocity,
                lines,
                step,
                palette.fluid.extend(palette.vector_alpha),
            ));
        }
    }

    fn draw_deformation_gradients<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        let length = self.config.deformation_gradient_length;
        let color = self
            .palette
            .deformation_gradient
            .extend(self.palette.vector_alpha);
        let mut batch =
            Batch::new(Category::DeformationGradient, Primitive::Lines).with_blend(Blend::Alpha);

        for (p, fe) in scene
            .quadrature_positions()
            .iter()
            .zip(scene.deformation_gradients())
        {
            let origin = p.xyz();
            for axis in [fe.x_axis, fe.y_axis, fe.z_axis] {
                batch.push_line(origin, origin + axis * length, color);
            }
        }

        list.push(batch);
    }

    fn draw_level_sets<S: SceneView + ?Sized>(&self, scene: &S, list: &mut DrawList) {
        for boundary in scene.boundaries() {
            let usage = boundary.usage();
            let Some(color) = self.palette.boundary_color(usage) else {
                log::trace!("skipping {usage:?} boundary");
                continue;
            };

            for fill in [FillMode::Solid, FillMode::Wireframe] {
                for mesh in boundary.meshes() {
                    let mut batch = Batch::new(Category::LevelSet, Primitive::Triangles)
                        .with_fill(fill)
                        .with_blend(Blend::Alpha);
                    for tri in mesh.world_triangles() {
                        for p in tri {
                            batch.push(p, color);
                        }
                    }
                    list.push(batch);
                }
            }
        }
    }
}

fn velocity_batch<'a>(
    category: Category,
    lines: impl Iterator<Item = (&'a Vec4, &'a Vec4)>,
    step: f32,
    color: Vec4,
) -> Batch {
    let mut batch = Batch::new(category, Primitive::Lines).with_blend(Blend::Alpha);
    for (x, v) in lines {
        let p = x.xyz();
        batch.push_line(p, p + v.xyz() * step, color);
    }
    batch
}

/// Segments of the bucket lattice: every line parallel to x, then y, then z.
pub fn bucket_lattice_lines(grid: &BucketGrid) -> Vec<(Vec3, Vec3)> {
    let [ni, nj, nk] = grid.dims.to_array();
    let corner = grid.min_corner;
    let len = grid.bucket_length;
    let at = |i: u32, j: u32, k: u32| corner + Vec3::new(i as f32, j as f32, k as f32) * len;

    let mut lines = Vec::with_capacity(
        ((nj + 1) * (nk + 1) + (ni + 1) * (nk + 1) + (ni + 1) * (nj + 1)) as usize,
    );

    // Parallel to x (vary j, k)
    for k in 0..=nk {
        for j in 0..=nj {
            lines.push((at(0, j, k), at(ni, j, k)));
        }
    }

    // Parallel to y (vary i, k)
    for k in 0..=nk {
        for i in 0..=ni {
            lines.push((at(i, 0, k), at(i, nj, k)));
        }
    }

    // Parallel to z (vary i, j)
    for j in 0..=nj {
        for i in 0..=ni {
            lines.push((at(i, j, 0), at(i, j, nk)));
        }
    }

    lines
}
