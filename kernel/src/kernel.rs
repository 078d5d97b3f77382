//! The geometry kernel boundary
//!
//! Procedural generators talk to geometry only through [`GeometryKernel`].
//! [`MeshKernel`] is the in-crate implementation backed by the modules of
//! this crate; tests substitute wrappers that record or fail calls.

use glam::{Mat4, Vec3};

use crate::csg::{self, SubtractReport};
use crate::edit;
use crate::error::KernelError;
use crate::falloff::SoftMove;
use crate::modifiers::{MeshModifier, Pivot, Transform, TransformVertices};
use crate::primitives;
use crate::remesh;
use crate::shell::Thicken;
use crate::subdivide::Subdivide;
use crate::topology;
use crate::types::{Aabb, Mesh};

/// Primitive construction, deformation, boolean and query operations
///
/// Implementations must be stateless with respect to the meshes they are
/// given so one kernel can serve many builds at once.
pub trait GeometryKernel: Send + Sync {
    /// UV sphere, see [`primitives::generate_sphere`]
    fn sphere(&self, radius: f32, segments: u32, rings: u32) -> Result<Mesh, KernelError>;

    /// Capped cylinder along +Y, see [`primitives::generate_cylinder`]
    fn cylinder(
        &self,
        radius: f32,
        height: f32,
        segments: u32,
        height_segments: u32,
    ) -> Result<Mesh, KernelError>;

    /// Triangular prism along +Y
    fn prism(&self, side: f32, length: f32) -> Result<Mesh, KernelError>;

    /// Axis-aligned box
    fn cuboid(&self, width: f32, height: f32, depth: f32) -> Result<Mesh, KernelError>;

    /// Transform the whole mesh and bake the result
    fn transform(&self, mesh: &mut Mesh, matrix: Mat4);

    /// Indices of the vertices whose position satisfies `predicate`
    fn select_vertices(&self, mesh: &Mesh, predicate: &dyn Fn(Vec3) -> bool) -> Vec<u32>;

    /// Transform a vertex selection about a pivot
    fn transform_vertices(&self, mesh: &mut Mesh, selection: &[u32], matrix: Mat4, pivot: Pivot);

    /// Falloff-weighted move around an anchor vertex
    fn soft_move(&self, mesh: &mut Mesh, soft_move: SoftMove);

    /// Insert an edge loop along a meridian; returns the new vertices
    fn insert_meridian_loop(&self, mesh: &mut Mesh, angle_degrees: f32) -> Vec<u32>;

    /// Triangles whose corners all lie in `vertices`
    fn faces_within(&self, mesh: &Mesh, vertices: &[u32]) -> Vec<usize>;

    /// Extrude triangles by an offset; returns the moved vertices
    fn extrude(&self, mesh: &mut Mesh, faces: &[usize], offset: Vec3) -> Result<Vec<u32>, KernelError>;

    /// Crease every edge running between two of `vertices`
    fn crease(&self, mesh: &mut Mesh, vertices: &[u32], sharpness: f32);

    /// Crease-aware Loop subdivision
    fn smooth(&self, mesh: &mut Mesh, levels: u32);

    /// Split edges until none exceeds `max_edge_length`
    fn remesh(&self, mesh: &mut Mesh, max_edge_length: f32) -> Result<(), KernelError>;

    /// Hollow shell with the given wall thickness
    fn thicken(&self, mesh: &Mesh, thickness: f32) -> Result<Mesh, KernelError>;

    /// `body` minus the union of `cutters`; the cutters are consumed
    fn subtract(&self, body: &Mesh, cutters: Vec<Mesh>) -> (Mesh, SubtractReport);

    /// Weld coincident vertices, drop degenerate triangles, recompute normals
    fn flatten(&self, mesh: &mut Mesh);

    /// Merge several meshes into one object
    fn unite(&self, meshes: &[&Mesh]) -> Mesh;

    fn bounds(&self, mesh: &Mesh) -> Aabb;

    /// Signed enclosed volume
    fn volume(&self, mesh: &Mesh) -> f32;

    /// Edges not shared by exactly two triangles; zero for a closed solid
    fn open_edges(&self, mesh: &Mesh) -> usize;
}

/// Tolerance used by [`GeometryKernel::flatten`]
pub const FLATTEN_TOLERANCE: f32 = 1e-5;

/// Geometry kernel backed by this crate's mesh operations
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshKernel;

impl GeometryKernel for MeshKernel {
    fn sphere(&self, radius: f32, segments: u32, rings: u32) -> Result<Mesh, KernelError> {
        primitives::generate_sphere(radius, segments, rings)
    }

    fn cylinder(
        &self,
        radius: f32,
        height: f32,
        segments: u32,
        height_segments: u32,
    ) -> Result<Mesh, KernelError> {
        primitives::generate_cylinder(radius, height, segments, height_segments)
    }

    fn prism(&self, side: f32, length: f32) -> Result<Mesh, KernelError> {
        primitives::generate_prism(side, length)
    }

    fn cuboid(&self, width: f32, height: f32, depth: f32) -> Result<Mesh, KernelError> {
        primitives::generate_cuboid(width, height, depth)
    }

    fn transform(&self, mesh: &mut Mesh, matrix: Mat4) {
        Transform::from_matrix(matrix).apply(mesh);
    }

    fn select_vertices(&self, mesh: &Mesh, predicate: &dyn Fn(Vec3) -> bool) -> Vec<u32> {
        (0..mesh.vertex_count() as u32)
            .filter(|&i| predicate(mesh.position(i)))
            .collect()
    }

    fn transform_vertices(&self, mesh: &mut Mesh, selection: &[u32], matrix: Mat4, pivot: Pivot) {
        TransformVertices {
            selection,
            matrix,
            pivot,
        }
        .apply(mesh);
    }

    fn soft_move(&self, mesh: &mut Mesh, soft_move: SoftMove) {
        soft_move.apply(mesh);
    }

    fn insert_meridian_loop(&self, mesh: &mut Mesh, angle_degrees: f32) -> Vec<u32> {
        edit::insert_meridian_loop(mesh, angle_degrees)
    }

    fn faces_within(&self, mesh: &Mesh, vertices: &[u32]) -> Vec<usize> {
        edit::faces_within(mesh, vertices)
    }

    fn extrude(&self, mesh: &mut Mesh, faces: &[usize], offset: Vec3) -> Result<Vec<u32>, KernelError> {
        edit::extrude_faces(mesh, faces, offset)
    }

    fn crease(&self, mesh: &mut Mesh, vertices: &[u32], sharpness: f32) {
        let edges = edit::edges_within(mesh, vertices);
        mesh.set_creases(&edges, sharpness);
    }

    fn smooth(&self, mesh: &mut Mesh, levels: u32) {
        Subdivide { iterations: levels }.apply(mesh);
    }

    fn remesh(&self, mesh: &mut Mesh, max_edge_length: f32) -> Result<(), KernelError> {
        remesh::remesh(mesh, max_edge_length)
    }

    fn thicken(&self, mesh: &Mesh, thickness: f32) -> Result<Mesh, KernelError> {
        Thicken { thickness }.build(mesh)
    }

    fn subtract(&self, body: &Mesh, cutters: Vec<Mesh>) -> (Mesh, SubtractReport) {
        csg::subtract(body, &cutters)
    }

    fn flatten(&self, mesh: &mut Mesh) {
        topology::weld(mesh, FLATTEN_TOLERANCE);
    }

    fn unite(&self, meshes: &[&Mesh]) -> Mesh {
        let mut merged = crate::combine::combine(meshes);
        merged.recompute_normals();
        merged
    }

    fn bounds(&self, mesh: &Mesh) -> Aabb {
        mesh.bounds()
    }

    fn volume(&self, mesh: &Mesh) -> f32 {
        mesh.volume()
    }

    fn open_edges(&self, mesh: &Mesh) -> usize {
        topology::open_edge_count(mesh)
    }
}
