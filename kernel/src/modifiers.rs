//! Mesh modifiers
//!
//! Modifiers operate on a [`Mesh`] in place. Whole-mesh transforms, partial
//! (selection) transforms and normal recomputation live here; topology
//! editing lives in [`crate::edit`], subdivision in [`crate::subdivide`].
//!
//! # Fluent API
//!
//! Use the `MeshApply` extension trait for method chaining:
//! ```
//! use pumpkin_kernel::*;
//!
//! let mut mesh = generate_sphere(1.0, 11, 11).unwrap();
//! mesh.apply(Transform::scale(1.0, 0.8, 1.0))
//!     .apply(Transform::translate(0.0, 0.5, 0.0))
//!     .apply(RecomputeNormals);
//! ```

use glam::{Mat4, Vec3};

use crate::types::Mesh;

/// Trait for mesh modifiers
///
/// Implement this trait to create custom mesh modifiers that can be applied
/// to `Mesh` instances.
pub trait MeshModifier {
    /// Apply this modifier to a mesh, modifying it in place
    fn apply(&self, mesh: &mut Mesh);
}

/// Extension trait for fluent modifier application
pub trait MeshApply {
    /// Apply a modifier and return `&mut Self` for chaining
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self;
}

impl MeshApply for Mesh {
    fn apply<M: MeshModifier>(&mut self, modifier: M) -> &mut Self {
        modifier.apply(self);
        self
    }
}

/// Transform mesh vertices and normals using a 4x4 matrix
///
/// Normals are transformed using the inverse-transpose to handle non-uniform
/// scaling correctly. A mirroring matrix (negative determinant) also flips
/// triangle winding so the mesh stays outward-facing.
///
/// # Example
/// ```
/// use pumpkin_kernel::*;
///
/// let mut mesh = generate_cuboid(1.0, 1.0, 1.0).unwrap();
///
/// // Scale non-uniformly
/// Transform::scale(2.0, 1.0, 1.0).apply(&mut mesh);
///
/// // Rotate 45 degrees around X axis
/// Transform::rotate_x(45.0).apply(&mut mesh);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    matrix: Mat4,
}

impl Transform {
    /// Create an identity transform (no change)
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// Create a translation transform
    pub fn translate(x: f32, y: f32, z: f32) -> Self {
        Self {
            matrix: Mat4::from_translation(Vec3::new(x, y, z)),
        }
    }

    /// Create a non-uniform scale transform
    pub fn scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            matrix: Mat4::from_scale(Vec3::new(x, y, z)),
        }
    }

    /// Create a uniform scale transform
    pub fn scale_uniform(s: f32) -> Self {
        Self::scale(s, s, s)
    }

    /// Create a rotation around the X axis (in degrees)
    pub fn rotate_x(degrees: f32) -> Self {
        Self {
            matrix: Mat4::from_rotation_x(degrees.to_radians()),
        }
    }

    /// Create a rotation around the Y axis (in degrees)
    pub fn rotate_y(degrees: f32) -> Self {
        Self {
            matrix: Mat4::from_rotation_y(degrees.to_radians()),
        }
    }

    /// Create a rotation around the Z axis (in degrees)
    pub fn rotate_z(degrees: f32) -> Self {
        Self {
            matrix: Mat4::from_rotation_z(degrees.to_radians()),
        }
    }

    /// Create a transform from a custom 4x4 matrix
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// The underlying matrix
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }
}

impl MeshModifier for Transform {
    fn apply(&self, mesh: &mut Mesh) {
        let normal_matrix = self.matrix.inverse().transpose();

        for pos in &mut mesh.positions {
            *pos = self.matrix.transform_point3(Vec3::from(*pos)).to_array();
        }

        for norm in &mut mesh.normals {
            let n = normal_matrix.transform_vector3(Vec3::from(*norm));
            *norm = n.normalize_or_zero().to_array();
        }

        if self.matrix.determinant() < 0.0 {
            FlipWinding.apply(mesh);
        }
    }
}

/// Where a partial transform is anchored
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pivot {
    /// Centroid of the selected vertices
    Centroid,
    /// A fixed point in mesh space
    Point(Vec3),
}

/// Transform a subset of vertices about a pivot
///
/// The matrix is applied in pivot-relative coordinates, so a scale or a
/// rotation acts "in place" the way a component transform does in a
/// modelling tool. Normals are left stale; follow with [`RecomputeNormals`].
#[derive(Clone, Debug)]
pub struct TransformVertices<'a> {
    /// Vertex indices to move (duplicates are ignored)
    pub selection: &'a [u32],
    /// Transform applied relative to the pivot
    pub matrix: Mat4,
    pub pivot: Pivot,
}

impl TransformVertices<'_> {
    /// Resolve the pivot to a point
    pub fn pivot_point(&self, mesh: &Mesh) -> Vec3 {
        match self.pivot {
            Pivot::Point(p) => p,
            Pivot::Centroid => centroid(mesh, self.selection),
        }
    }
}

impl MeshModifier for TransformVertices<'_> {
    fn apply(&self, mesh: &mut Mesh) {
        if self.selection.is_empty() {
            return;
        }
        let pivot = self.pivot_point(mesh);
        let full = Mat4::from_translation(pivot) * self.matrix * Mat4::from_translation(-pivot);

        let mut seen = hashbrown::HashSet::with_capacity(self.selection.len());
        for &i in self.selection {
            if seen.insert(i) {
                let p = full.transform_point3(mesh.position(i));
                mesh.set_position(i, p);
            }
        }
    }
}

/// Mean position of a set of vertices (origin when empty)
pub fn centroid(mesh: &Mesh, selection: &[u32]) -> Vec3 {
    if selection.is_empty() {
        return Vec3::ZERO;
    }
    let sum: Vec3 = selection.iter().map(|&i| mesh.position(i)).sum();
    sum / selection.len() as f32
}

/// Recompute smooth vertex normals from the current positions
#[derive(Clone, Copy, Debug, Default)]
pub struct RecomputeNormals;

impl MeshModifier for RecomputeNormals {
    fn apply(&self, mesh: &mut Mesh) {
        mesh.recompute_normals();
    }
}

/// Reverse the winding of every triangle and negate the normals
#[derive(Clone, Copy, Debug, Default)]
pub struct FlipWinding;

impl MeshModifier for FlipWinding {
    fn apply(&self, mesh: &mut Mesh) {
        for tri in mesh.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
        for n in &mut mesh.normals {
            *n = (-Vec3::from(*n)).to_array();
        }
    }
}
