//! Geometry kernel for procedural pumpkin meshes
//!
//! An indexed, welded triangle mesh plus the operations a procedural
//! modelling pipeline needs: closed primitives, whole-mesh and partial
//! transforms, falloff (soft) moves, edge-loop insertion, extrusion, creased
//! Loop subdivision, remeshing, wall thickening and boolean subtraction.
//!
//! Generators reach these operations through the [`GeometryKernel`] trait;
//! [`MeshKernel`] implements it.
//!
//! # Example
//! ```
//! use pumpkin_kernel::*;
//!
//! let mut body = generate_sphere(1.0, 11, 11)?;
//! body.apply(Transform::scale(1.0, 0.8, 1.0))
//!     .apply(Subdivide { iterations: 1 });
//!
//! let mut hole = generate_cylinder(0.1, 1.5, 8, 1)?;
//! hole.apply(Transform::rotate_z(90.0))
//!     .apply(Transform::translate(1.0, 0.0, 0.0));
//!
//! let (carved, report) = MeshKernel.subtract(&body, vec![hole]);
//! assert_eq!(report.applied, 1);
//! assert!(carved.volume() < body.volume());
//! # Ok::<(), KernelError>(())
//! ```

pub mod combine;
pub mod csg;
pub mod edit;
pub mod error;
pub mod export;
pub mod falloff;
pub mod kernel;
pub mod modifiers;
pub mod primitives;
pub mod remesh;
pub mod shell;
pub mod subdivide;
pub mod topology;
pub mod types;

pub use combine::combine;
pub use csg::SubtractReport;
pub use error::KernelError;
pub use export::{save_obj, write_obj};
pub use falloff::{FalloffCurve, FalloffMode, SoftMove};
pub use kernel::{GeometryKernel, MeshKernel};
pub use modifiers::{
    FlipWinding, MeshApply, MeshModifier, Pivot, RecomputeNormals, Transform, TransformVertices,
    centroid,
};
pub use primitives::{generate_cuboid, generate_cylinder, generate_prism, generate_sphere};
pub use shell::Thicken;
pub use subdivide::Subdivide;
pub use types::{Aabb, EdgeKey, Mesh, edge_key};
