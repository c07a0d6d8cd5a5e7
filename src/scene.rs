//! Read-only view of a coupled cloth/fiber/fluid simulation.
//!
//! The renderer never owns simulation data. It borrows everything through
//! [`SceneView`] for the duration of one frame. [`SceneSnapshot`] is an owned
//! implementation used by the demo, tests and benchmarks.
//!
//! Particle state is 4-component (`xyz` plus a twist angle), matching the
//! layout simulations hand out; only `xyz` is drawn.

use glam::{Mat3, Quat, UVec3, Vec3, Vec4};

/// Coordinate axis of a staggered grid location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// 0, 1 or 2.
    pub fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// One of the 8 kinds of grid node a bucket stores positions for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Nodes sampling the solid signed distance.
    SolidPhi,
    /// Face centers normal to an axis.
    FaceCenter(Axis),
    /// Edge centers along an axis.
    EdgeCenter(Axis),
    /// Cell centers.
    CellCenter,
}

impl NodeKind {
    /// Number of node kinds.
    pub const COUNT: usize = 8;

    /// Every node kind in storage order.
    pub const ALL: [NodeKind; 8] = [
        NodeKind::SolidPhi,
        NodeKind::FaceCenter(Axis::X),
        NodeKind::FaceCenter(Axis::Y),
        NodeKind::FaceCenter(Axis::Z),
        NodeKind::EdgeCenter(Axis::X),
        NodeKind::EdgeCenter(Axis::Y),
        NodeKind::EdgeCenter(Axis::Z),
        NodeKind::CellCenter,
    ];

    /// Storage slot in `0..COUNT`.
    pub fn index(&self) -> usize {
        match self {
            NodeKind::SolidPhi => 0,
            NodeKind::FaceCenter(axis) => 1 + axis.index(),
            NodeKind::EdgeCenter(axis) => 4 + axis.index(),
            NodeKind::CellCenter => 7,
        }
    }
}

/// A scalar field sampled at one node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// Solid signed distance at solid-phi nodes.
    SolidPhi,
    /// Solid volume fraction at face centers.
    SolidVolume(Axis),
    /// Liquid volume fraction (saturation) at face centers.
    LiquidVolume(Axis),
    /// Liquid signed distance at cell centers.
    LiquidPhi,
}

impl NodeField {
    /// Number of node fields.
    pub const COUNT: usize = 8;

    /// Every field in storage order.
    pub const ALL: [NodeField; 8] = [
        NodeField::SolidPhi,
        NodeField::SolidVolume(Axis::X),
        NodeField::SolidVolume(Axis::Y),
        NodeField::SolidVolume(Axis::Z),
        NodeField::LiquidVolume(Axis::X),
        NodeField::LiquidVolume(Axis::Y),
        NodeField::LiquidVolume(Axis::Z),
        NodeField::LiquidPhi,
    ];

    /// Storage slot in `0..COUNT`.
    pub fn index(&self) -> usize {
        match self {
            NodeField::SolidPhi => 0,
            NodeField::SolidVolume(axis) => 1 + axis.index(),
            NodeField::LiquidVolume(axis) => 4 + axis.index(),
            NodeField::LiquidPhi => 7,
        }
    }

    /// The node kind whose positions this field is sampled at.
    pub fn kind(&self) -> NodeKind {
        match *self {
            NodeField::SolidPhi => NodeKind::SolidPhi,
            NodeField::SolidVolume(axis) | NodeField::LiquidVolume(axis) => {
                NodeKind::FaceCenter(axis)
            }
            NodeField::LiquidPhi => NodeKind::CellCenter,
        }
    }
}

/// What a boundary level set is used for in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryUsage {
    /// Solid obstacle.
    Solid,
    /// Fluid source.
    Source,
    /// Fluid sink that removes particles.
    Terminator,
    /// Prescribed pressure region.
    Pressure,
}

/// Local-to-world rigid transform: rotate, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    pub fn new(rotation: Quat, translation: Vec3) -> Self {
        Self { rotation, translation }
    }

    /// Map a local point to world space.
    #[inline]
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.translation
    }
}

/// One triangle mesh of a boundary, in local coordinates.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryMesh<'a> {
    pub vertices: &'a [Vec3],
    pub triangles: &'a [[u32; 3]],
    pub transform: RigidTransform,
}

impl BoundaryMesh<'_> {
    /// World-space corners of every triangle, in index order.
    pub fn world_triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let transform = self.transform;
        self.triangles.iter().map(move |tri| {
            tri.map(|i| transform.apply(self.vertices[i as usize]))
        })
    }
}

/// A level-set boundary that can describe itself as triangle meshes.
pub trait BoundaryField {
    /// What the boundary is used for.
    fn usage(&self) -> BoundaryUsage;

    /// The boundary's meshes. Each call starts a fresh traversal.
    fn meshes(&self) -> Box<dyn Iterator<Item = BoundaryMesh<'_>> + '_>;
}

/// An attachment spring pinning a particle to its rest position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub particle: usize,
    pub stiffness: f32,
}

/// A cohesion ray cast from a quadrature point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Liquid volume fraction along the ray.
    pub volume_fraction: f32,
    /// Where the ray ended.
    pub end: Vec3,
}

/// The bucket lattice the scene is partitioned into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketGrid {
    pub min_corner: Vec3,
    pub bucket_length: f32,
    /// Buckets per axis.
    pub dims: UVec3,
}

impl Default for BucketGrid {
    fn default() -> Self {
        Self {
            min_corner: Vec3::ZERO,
            bucket_length: 1.0,
            dims: UVec3::ZERO,
        }
    }
}

impl BucketGrid {
    /// Opposite corner of the lattice.
    pub fn max_corner(&self) -> Vec3 {
        self.min_corner + self.dims.as_vec3() * self.bucket_length
    }

    /// Center of the lattice.
    pub fn center(&self) -> Vec3 {
        (self.min_corner + self.max_corner()) * 0.5
    }

    /// Total bucket count.
    pub fn bucket_count(&self) -> usize {
        (self.dims.x * self.dims.y * self.dims.z) as usize
    }
}

/// Read-only accessors the renderer pulls from every frame.
///
/// Per-particle arrays (`positions`, `rest_positions`, `velocities`,
/// `fluid_velocities`, `volumes`, `fluid_volumes`, `volume_fractions`,
/// `groups`) share one length. Per-quadrature-point arrays
/// (`quadrature_positions`, `quadrature_velocities`, `deformation_gradients`,
/// `intersections`) share another. Each `bucket_field` has the length of the
/// `bucket_nodes` array of its [`NodeField::kind`].
pub trait SceneView {
    fn positions(&self) -> &[Vec4];
    fn rest_positions(&self) -> &[Vec4];
    fn velocities(&self) -> &[Vec4];
    fn fluid_velocities(&self) -> &[Vec4];
    fn volumes(&self) -> &[f32];
    fn fluid_volumes(&self) -> &[f32];
    fn volume_fractions(&self) -> &[f32];
    fn groups(&self) -> &[usize];

    /// Particles `0..n` are soft/elastic vertices.
    fn num_soft_elasto_particles(&self) -> usize;
    fn fluid_indices(&self) -> &[usize];

    fn faces(&self) -> &[[usize; 3]];
    fn edges(&self) -> &[[usize; 2]];

    fn quadrature_positions(&self) -> &[Vec4];
    fn quadrature_velocities(&self) -> &[Vec4];
    /// Deformation gradient per quadrature point; columns are the material axes.
    fn deformation_gradients(&self) -> &[Mat3];
    /// Cohesion ray hits per quadrature point.
    fn intersections(&self) -> &[Vec<RayHit>];

    fn attachments(&self) -> &[Attachment];
    fn boundaries(&self) -> &[Box<dyn BoundaryField>];

    /// Grid cell size.
    fn cell_size(&self) -> f32;
    fn bucket_grid(&self) -> BucketGrid;
    fn num_buckets(&self) -> usize;
    fn bucket_nodes(&self, bucket: usize, kind: NodeKind) -> &[Vec3];
    fn bucket_field(&self, bucket: usize, field: NodeField) -> &[f32];
}

/// Check the array-length invariants of a scene. Debug builds only.
pub(crate) fn debug_validate<S: SceneView + ?Sized>(scene: &S) {
    if !cfg!(debug_assertions) {
        return;
    }
    let n = scene.positions().len();
    debug_assert_eq!(scene.rest_positions().len(), n, "rest positions");
    debug_assert_eq!(scene.velocities().len(), n, "velocities");
    debug_assert_eq!(scene.fluid_velocities().len(), n, "fluid velocities");
    debug_assert_eq!(scene.volumes().len(), n, "volumes");
    debug_assert_eq!(scene.fluid_volumes().len(), n, "fluid volumes");
    debug_assert_eq!(scene.groups().len(), n, "groups");
    debug_assert!(scene.num_soft_elasto_particles() <= n, "soft/elastic count");

    let q = scene.quadrature_positions().len();
    debug_assert_eq!(scene.quadrature_velocities().len(), q, "quadrature velocities");
    debug_assert_eq!(scene.deformation_gradients().len(), q, "deformation gradients");
    debug_assert_eq!(scene.intersections().len(), q, "intersections");
}

/// Node positions and fields of one bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketData {
    nodes: [Vec<Vec3>; NodeKind::COUNT],
    fields: [Vec<f32>; NodeField::COUNT],
}

impl BucketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self, kind: NodeKind) -> &[Vec3] {
        &self.nodes[kind.index()]
    }

    pub fn field(&self, field: NodeField) -> &[f32] {
        &self.fields[field.index()]
    }

    pub fn set_nodes(&mut self, kind: NodeKind, positions: Vec<Vec3>) -> &mut Self {
        self.nodes[kind.index()] = positions;
        self
    }

    pub fn set_field(&mut self, field: NodeField, values: Vec<f32>) -> &mut Self {
        self.fields[field.index()] = values;
        self
    }
}

/// A boundary made of owned meshes.
#[derive(Debug, Clone)]
pub struct MeshBoundary {
    pub usage: BoundaryUsage,
    pub parts: Vec<MeshPart>,
}

/// One mesh of a [`MeshBoundary`].
#[derive(Debug, Clone, Default)]
pub struct MeshPart {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
    pub transform: RigidTransform,
}

impl MeshPart {
    /// Axis-aligned box centered on the local origin.
    pub fn cuboid(half_extents: Vec3, transform: RigidTransform) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let triangles = vec![
            // -z
            [0, 2, 1],
            [0, 3, 2],
            // +z
            [4, 5, 6],
            [4, 6, 7],
            // -y
            [0, 1, 5],
            [0, 5, 4],
            // +y
            [3, 7, 6],
            [3, 6, 2],
            // -x
            [0, 4, 7],
            [0, 7, 3],
            // +x
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self {
            vertices,
            triangles,
            transform,
        }
    }
}

impl MeshBoundary {
    pub fn new(usage: BoundaryUsage, parts: Vec<MeshPart>) -> Self {
        Self { usage, parts }
    }
}

impl BoundaryField for MeshBoundary {
    fn usage(&self) -> BoundaryUsage {
        self.usage
    }

    fn meshes(&self) -> Box<dyn Iterator<Item = BoundaryMesh<'_>> + '_> {
        Box::new(self.parts.iter().map(|part| BoundaryMesh {
            vertices: &part.vertices,
            triangles: &part.triangles,
            transform: part.transform,
        }))
    }
}

/// Owned scene state implementing [`SceneView`].
#[derive(Default)]
pub struct SceneSnapshot {
    pub positions: Vec<Vec4>,
    pub rest_positions: Vec<Vec4>,
    pub velocities: Vec<Vec4>,
    pub fluid_velocities: Vec<Vec4>,
    pub volumes: Vec<f32>,
    pub fluid_volumes: Vec<f32>,
    pub volume_fractions: Vec<f32>,
    pub groups: Vec<usize>,
    pub num_soft_elasto: usize,
    pub fluid_indices: Vec<usize>,
    pub faces: Vec<[usize; 3]>,
    pub edges: Vec<[usize; 2]>,
    pub quadrature_positions: Vec<Vec4>,
    pub quadrature_velocities: Vec<Vec4>,
    pub deformation_gradients: Vec<Mat3>,
    pub intersections: Vec<Vec<RayHit>>,
    pub attachments: Vec<Attachment>,
    pub boundaries: Vec<Box<dyn BoundaryField>>,
    pub cell_size: f32,
    pub bucket_grid: BucketGrid,
    pub buckets: Vec<BucketData>,
}

impl SceneSnapshot {
    /// A scene of soft/elastic particles at rest: zero velocity, unit volume,
    /// dry, all in group 0.
    pub fn from_particles(positions: Vec<Vec3>) -> Self {
        let n = positions.len();
        let positions: Vec<Vec4> = positions.into_iter().map(|p| p.extend(0.0)).collect();
        Self {
            rest_positions: positions.clone(),
            positions,
            velocities: vec![Vec4::ZERO; n],
            fluid_velocities: vec![Vec4::ZERO; n],
            volumes: vec![1.0; n],
            fluid_volumes: vec![0.0; n],
            volume_fractions: vec![1.0; n],
            groups: vec![0; n],
            num_soft_elasto: n,
            cell_size: 1.0,
            ..Default::default()
        }
    }

    /// Append quadrature points with zero velocity, identity deformation and
    /// no cohesion hits.
    pub fn push_quadrature_points(&mut self, points: impl IntoIterator<Item = Vec3>) {
        for p in points {
            self.quadrature_positions.push(p.extend(0.0));
            self.quadrature_velocities.push(Vec4::ZERO);
            self.deformation_gradients.push(Mat3::IDENTITY);
            self.intersections.push(Vec::new());
        }
    }
}

impl SceneView for SceneSnapshot {
    fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    fn rest_positions(&self) -> &[Vec4] {
        &self.rest_positions
    }

    fn velocities(&self) -> &[Vec4] {
        &self.velocities
    }

    fn fluid_velocities(&self) -> &[Vec4] {
        &self.fluid_velocities
    }

    fn volumes(&self) -> &[f32] {
        &self.volumes
    }

    fn fluid_volumes(&self) -> &[f32] {
        &self.fluid_volumes
    }

    fn volume_fractions(&self) -> &[f32] {
        &self.volume_fractions
    }

    fn groups(&self) -> &[usize] {
        &self.groups
    }

    fn num_soft_elasto_particles(&self) -> usize {
        self.num_soft_elasto
    }

    fn fluid_indices(&self) -> &[usize] {
        &self.fluid_indices
    }

    fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    fn quadrature_positions(&self) -> &[Vec4] {
        &self.quadrature_positions
    }

    fn quadrature_velocities(&self) -> &[Vec4] {
        &self.quadrature_velocities
    }

    fn deformation_gradients(&self) -> &[Mat3] {
        &self.deformation_gradients
    }

    fn intersections(&self) -> &[Vec<RayHit>] {
        &self.intersections
    }

    fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    fn boundaries(&self) -> &[Box<dyn BoundaryField>] {
        &self.boundaries
    }

    fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn bucket_grid(&self) -> BucketGrid {
        self.bucket_grid
    }

    fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_nodes(&self, bucket: usize, kind: NodeKind) -> &[Vec3] {
        self.buckets[bucket].nodes(kind)
    }

    fn bucket_field(&self, bucket: usize, field: NodeField) -> &[f32] {
        self.buckets[bucket].field(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kind_and_field_slots_are_distinct() {
        let kinds: HashSet<_> = NodeKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(kinds.len(), NodeKind::COUNT);
        let fields: HashSet<_> = NodeField::ALL.iter().map(|f| f.index()).collect();
        assert_eq!(fields.len(), NodeField::COUNT);
    }

    #[test]
    fn test_field_pairs_with_kind() {
        assert_eq!(NodeField::SolidPhi.kind(), NodeKind::SolidPhi);
        assert_eq!(NodeField::SolidVolume(Axis::Y).kind(), NodeKind::FaceCenter(Axis::Y));
        assert_eq!(NodeField::LiquidVolume(Axis::Z).kind(), NodeKind::FaceCenter(Axis::Z));
        assert_eq!(NodeField::LiquidPhi.kind(), NodeKind::CellCenter);
    }

    #[test]
    fn test_rigid_transform_rotates_then_translates() {
        let t = RigidTransform::new(
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let p = t.apply(Vec3::X);
        assert!((p - Vec3::new(10.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_mesh_boundary_traversal_restarts() {
        let boundary = MeshBoundary::new(
            BoundaryUsage::Solid,
            vec![MeshPart::cuboid(Vec3::ONE, RigidTransform::IDENTITY)],
        );
        assert_eq!(boundary.meshes().count(), 1);
        assert_eq!(boundary.meshes().count(), 1);
        let mesh = boundary.meshes().next().unwrap();
        assert_eq!(mesh.world_triangles().count(), 12);
    }

    #[test]
    fn test_bucket_grid_extent() {
        let grid = BucketGrid {
            min_corner: Vec3::splat(-1.0),
            bucket_length: 0.5,
            dims: UVec3::new(4, 2, 2),
        };
        assert_eq!(grid.max_corner(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(grid.bucket_count(), 16);
        assert_eq!(grid.center(), Vec3::new(0.0, -0.5, -0.5));
    }

    #[test]
    fn test_from_particles_is_consistent() {
        let scene = SceneSnapshot::from_particles(vec![Vec3::ZERO, Vec3::X]);
        debug_validate(&scene);
        assert_eq!(scene.num_soft_elasto_particles(), 2);
        assert_eq!(scene.rest_positions()[1], Vec4::new(1.0, 0.0, 0.0, 0.0));
    }
}
