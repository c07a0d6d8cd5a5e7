//! A small procedurally generated wet-cloth scene.
//!
//! Used by the `wetcloth-viz` binary, the integration tests and the frame
//! benchmark. The scene is a square cloth patch hanging from two pinned
//! corners with a block of fluid particles falling onto it, a solid floor,
//! a terminator box, and a 2x2x2 bucket lattice filled with every kind of
//! grid node.
//!
//! # Example
//!
//! ```
//! use wetcloth_viz::demo;
//! use wetcloth_viz::SceneView;
//!
//! let mut scene = demo::wet_cloth(8);
//! demo::advance(&mut scene, 0.5);
//! assert_eq!(scene.num_buckets(), 8);
//! ```

use std::f32::consts::TAU;

use glam::{Mat3, Quat, UVec3, Vec3, Vec4, Vec4Swizzles};

use crate::color::saturation;
use crate::scene::{
    Attachment, Axis, BoundaryUsage, BucketData, BucketGrid, MeshBoundary, MeshPart, NodeField,
    NodeKind, RayHit, RigidTransform, SceneSnapshot,
};

/// Number of fiber groups in the demo cloth.
pub const FIBER_GROUPS: usize = 3;

const CLOTH_HEIGHT: f32 = 0.25;
const CLOTH_HALF_WIDTH: f32 = 0.6;
const FLOOR_TOP: f32 = -0.75;
const PIN_STIFFNESS: f32 = 1.0e4;
const WAVE_AMPLITUDE: f32 = 0.06;
const FALL_HEIGHT: f32 = 0.6;
const FALL_PERIOD: f32 = 2.0;
const COHESION_RAY_LENGTH: f32 = 0.08;

/// Build the demo scene with `resolution` cloth vertices per side.
///
/// Resolutions below 2 are raised to 2.
pub fn wet_cloth(resolution: usize) -> SceneSnapshot {
    let n = resolution.max(2);
    let spacing = 2.0 * CLOTH_HALF_WIDTH / (n - 1) as f32;

    let mut cloth = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            cloth.push(Vec3::new(
                -CLOTH_HALF_WIDTH + col as f32 * spacing,
                CLOTH_HEIGHT,
                -CLOTH_HALF_WIDTH + row as f32 * spacing,
            ));
        }
    }

    let mut scene = SceneSnapshot::from_particles(cloth);
    let index = |row: usize, col: usize| row * n + col;

    // Fibers run along rows; row r belongs to group r % FIBER_GROUPS.
    for row in 0..n {
        for col in 0..n {
            scene.groups[index(row, col)] = row % FIBER_GROUPS;
            if col + 1 < n {
                scene.edges.push([index(row, col), index(row, col + 1)]);
            }
        }
    }

    for row in 0..n - 1 {
        for col in 0..n - 1 {
            let (a, b) = (index(row, col), index(row, col + 1));
            let (c, d) = (index(row + 1, col), index(row + 1, col + 1));
            scene.faces.push([a, b, d]);
            scene.faces.push([a, d, c]);
        }
    }

    for corner in [index(0, 0), index(0, n - 1)] {
        scene.attachments.push(Attachment {
            particle: corner,
            stiffness: PIN_STIFFNESS,
        });
    }
    // Released pin: present in the scene but not drawn.
    scene.attachments.push(Attachment {
        particle: index(n - 1, n / 2),
        stiffness: 0.0,
    });

    add_fluid_block(&mut scene, (n / 2).max(2), spacing);

    let face_count = scene.faces.len();
    let edge_count = scene.edges.len();
    scene.push_quadrature_points(std::iter::repeat(Vec3::ZERO).take(edge_count + face_count));

    scene.boundaries.push(Box::new(MeshBoundary::new(
        BoundaryUsage::Solid,
        vec![MeshPart::cuboid(
            Vec3::new(1.0, 0.1, 1.0),
            RigidTransform::new(Quat::IDENTITY, Vec3::new(0.0, FLOOR_TOP - 0.1, 0.0)),
        )],
    )));
    scene.boundaries.push(Box::new(MeshBoundary::new(
        BoundaryUsage::Terminator,
        vec![MeshPart::cuboid(
            Vec3::splat(0.15),
            RigidTransform::new(
                Quat::from_rotation_y(TAU / 8.0),
                Vec3::new(0.8, FLOOR_TOP + 0.15, 0.8),
            ),
        )],
    )));
    scene.boundaries.push(Box::new(MeshBoundary::new(
        BoundaryUsage::Source,
        vec![MeshPart::cuboid(
            Vec3::splat(0.1),
            RigidTransform::new(Quat::IDENTITY, Vec3::new(0.0, 0.9, 0.0)),
        )],
    )));

    let cells_per_bucket = (n / 4).max(2) as u32;
    scene.bucket_grid = BucketGrid {
        min_corner: Vec3::splat(-1.0),
        bucket_length: 1.0,
        dims: UVec3::splat(2),
    };
    scene.cell_size = 1.0 / cells_per_bucket as f32;
    scene.buckets = build_buckets(&scene.bucket_grid, cells_per_bucket);

    advance(&mut scene, 0.0);

    log::info!(
        "demo scene: {} cloth vertices, {} fluid particles, {} quadrature points, {} buckets",
        scene.num_soft_elasto,
        scene.fluid_indices.len(),
        scene.quadrature_positions.len(),
        scene.buckets.len()
    );
    scene
}

fn add_fluid_block(scene: &mut SceneSnapshot, side: usize, spacing: f32) {
    let origin = Vec3::new(
        -0.5 * spacing * (side - 1) as f32,
        CLOTH_HEIGHT + 0.2,
        -0.5 * spacing * (side - 1) as f32,
    );
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                let p = origin + Vec3::new(i as f32, j as f32, k as f32) * spacing;
                scene.fluid_indices.push(scene.positions.len());
                scene.positions.push(p.extend(0.0));
                scene.rest_positions.push(p.extend(0.0));
                scene.velocities.push(Vec4::ZERO);
                scene.fluid_velocities.push(Vec4::ZERO);
                scene.volumes.push(1.0);
                scene.fluid_volumes.push(1.0);
                scene.volume_fractions.push(1.0);
                scene.groups.push(0);
            }
        }
    }
}

/// Staggered node lattices for every bucket, `cells` cells per side.
fn build_buckets(grid: &BucketGrid, cells: u32) -> Vec<BucketData> {
    let dx = grid.bucket_length / cells as f32;
    let mut buckets = Vec::with_capacity(grid.bucket_count());

    for bk in 0..grid.dims.z {
        for bj in 0..grid.dims.y {
            for bi in 0..grid.dims.x {
                let origin = grid.min_corner
                    + Vec3::new(bi as f32, bj as f32, bk as f32) * grid.bucket_length;
                let lattice = |offset: Vec3| -> Vec<Vec3> {
                    let mut nodes = Vec::with_capacity((cells * cells * cells) as usize);
                    for k in 0..cells {
                        for j in 0..cells {
                            for i in 0..cells {
                                let ijk = Vec3::new(i as f32, j as f32, k as f32);
                                nodes.push(origin + (ijk + offset) * dx);
                            }
                        }
                    }
                    nodes
                };

                let mut bucket = BucketData::new();
                for kind in NodeKind::ALL {
                    bucket.set_nodes(kind, lattice(node_offset(kind)));
                }
                for field in NodeField::ALL {
                    let values = bucket
                        .nodes(field.kind())
                        .iter()
                        .map(|&p| sample_field(field, p, dx))
                        .collect();
                    bucket.set_field(field, values);
                }
                buckets.push(bucket);
            }
        }
    }

    buckets
}

/// Position of a node kind inside its cell, in cell units.
fn node_offset(kind: NodeKind) -> Vec3 {
    let half = |axis: Axis| match axis {
        Axis::X => Vec3::X * 0.5,
        Axis::Y => Vec3::Y * 0.5,
        Axis::Z => Vec3::Z * 0.5,
    };
    match kind {
        NodeKind::SolidPhi => Vec3::ZERO,
        NodeKind::FaceCenter(axis) => Vec3::splat(0.5) - half(axis),
        NodeKind::EdgeCenter(axis) => half(axis),
        NodeKind::CellCenter => Vec3::splat(0.5),
    }
}

/// Analytic stand-ins for the simulation's grid fields.
fn sample_field(field: NodeField, p: Vec3, dx: f32) -> f32 {
    let floor_phi = p.y - FLOOR_TOP;
    let pool_phi = (p - Vec3::new(0.0, FLOOR_TOP, 0.0)).length() - 0.5;
    match field {
        NodeField::SolidPhi => floor_phi,
        NodeField::SolidVolume(_) => (0.5 - floor_phi / dx).clamp(0.0, 1.0),
        NodeField::LiquidVolume(_) => (0.5 - pool_phi / dx).clamp(0.0, 1.0),
        NodeField::LiquidPhi => pool_phi,
    }
}

/// Move the scene to `time` seconds.
///
/// The cloth ripples between its pinned corners and soaks up fluid from the
/// center outward; the fluid block falls and restarts every couple of
/// seconds. Quadrature points, deformation gradients and cohesion hits
/// follow the cloth.
pub fn advance(scene: &mut SceneSnapshot, time: f32) {
    let soft = scene.num_soft_elasto;
    let wetting = (time / FALL_PERIOD).min(1.0);

    for i in 0..soft {
        let rest = scene.rest_positions[i].xyz();
        let pinned = (rest.z + CLOTH_HALF_WIDTH) / (2.0 * CLOTH_HALF_WIDTH);
        let phase = TAU * 0.5 * time + rest.x * 4.0;
        let dy = WAVE_AMPLITUDE * pinned * phase.sin();
        let vy = WAVE_AMPLITUDE * pinned * TAU * 0.5 * phase.cos();
        scene.positions[i] = (rest + Vec3::Y * dy).extend(0.0);
        scene.velocities[i] = Vec4::new(0.0, vy, 0.0, 0.0);

        let radius = Vec3::new(rest.x, 0.0, rest.z).length() / CLOTH_HALF_WIDTH;
        let sat = (wetting * 1.2 - radius).clamp(0.0, 1.0);
        scene.fluid_volumes[i] = sat * scene.volumes[i];
    }

    let t = time.rem_euclid(FALL_PERIOD);
    let fall = FALL_HEIGHT * (t / FALL_PERIOD).powi(2);
    let speed = FALL_HEIGHT * 2.0 * t / (FALL_PERIOD * FALL_PERIOD);
    for &i in &scene.fluid_indices {
        let rest = scene.rest_positions[i];
        scene.positions[i] = rest - Vec4::Y * fall;
        scene.fluid_velocities[i] = Vec4::new(0.0, -speed, 0.0, 0.0);
    }

    update_quadrature(scene);
}

/// Recompute quadrature state: edge midpoints first, then face centroids.
fn update_quadrature(scene: &mut SceneSnapshot) {
    let edge_count = scene.edges.len();
    let mut gauss = 0;

    for e in 0..edge_count {
        let [a, b] = scene.edges[e];
        let x = (scene.positions[a] + scene.positions[b]) * 0.5;
        let v = (scene.velocities[a] + scene.velocities[b]) * 0.5;
        let tangent = (scene.positions[b] - scene.positions[a]).xyz();
        let rest = (scene.rest_positions[b] - scene.rest_positions[a]).xyz();
        let stretch = tangent.length() / rest.length().max(f32::EPSILON);

        scene.quadrature_positions[gauss] = x;
        scene.quadrature_velocities[gauss] = v;
        scene.deformation_gradients[gauss] =
            Mat3::from_cols(tangent.normalize_or_zero() * stretch, Vec3::Y, Vec3::Z);
        scene.intersections[gauss].clear();
        gauss += 1;
    }

    for f in 0..scene.faces.len() {
        let [a, b, c] = scene.faces[f];
        let (pa, pb, pc) = (
            scene.positions[a].xyz(),
            scene.positions[b].xyz(),
            scene.positions[c].xyz(),
        );
        let centroid = (pa + pb + pc) / 3.0;
        let v = (scene.velocities[a] + scene.velocities[b] + scene.velocities[c]) / 3.0;
        let normal = (pb - pa).cross(pc - pa).normalize_or_zero();

        let i = f + edge_count;
        debug_assert_eq!(i, gauss);
        scene.quadrature_positions[i] = centroid.extend(0.0);
        scene.quadrature_velocities[i] = v;
        scene.deformation_gradients[i] = Mat3::from_cols(pb - pa, pc - pa, normal);

        let sat = [a, b, c]
            .iter()
            .map(|&p| saturation(scene.fluid_volumes[p], scene.volumes[p]))
            .sum::<f32>()
            / 3.0;
        let hits = &mut scene.intersections[i];
        hits.clear();
        if sat > 0.0 {
            for dir in [normal, -normal] {
                hits.push(RayHit {
                    volume_fraction: sat,
                    end: centroid + dir * COHESION_RAY_LENGTH,
                });
            }
        }
        gauss += 1;
    }
}
