//! Procedural jack-o'-lantern generator
//!
//! Builds carved pumpkin meshes from a seed: a ridged, dimpled body with a
//! thin wall, a flared and tilted stem, and a face cut through the front by
//! boolean subtraction. Batches are laid out on a grid.
//!
//! All geometry goes through [`pumpkin_kernel::GeometryKernel`], so the
//! pipeline can run against any kernel implementation.
//!
//! # Example
//! ```no_run
//! use pumpkin_generator::{BatchLayoutController, BatchOptions};
//! use pumpkin_kernel::MeshKernel;
//!
//! let options = BatchOptions {
//!     count: 6,
//!     seed: Some(31),
//!     add_point_light: true,
//!     ..BatchOptions::default()
//! };
//! let batch = BatchLayoutController::new(&MeshKernel).generate(&options)?;
//! for pumpkin in &batch.pumpkins {
//!     println!("{} at row {} col {}", pumpkin.name, pumpkin.cell.row, pumpkin.cell.col);
//! }
//! # Ok::<(), pumpkin_generator::PumpkinError>(())
//! ```

pub mod assembler;
pub mod batch;
pub mod body;
pub mod cutter;
pub mod error;
pub mod face;
pub mod params;
pub mod random;
pub mod scene;
pub mod stem;
pub mod style;

pub use assembler::{Assembler, CarveReport, PointLight, PumpkinMesh};
pub use batch::{
    Batch, BatchLayoutController, BatchOptions, BatchPlan, BuildFailure, GridCell, PumpkinPlan,
    build_pumpkin,
};
pub use body::BodyDeformer;
pub use cutter::{CutGroup, CutterSolid, CutterSolidFactory};
pub use error::{BooleanOpFailure, PumpkinError, Result};
pub use face::{
    CutPlacement, CutShape, FaceCoordinate, FaceFeaturePlanner, FaceParameters, FeatureKind,
    MouthCut, MouthParameters, MouthShape, MouthStyle,
};
pub use params::{PumpkinParameters, ScaleParameters, StemParameters};
pub use random::RandomizationEngine;
pub use scene::{BuildContext, Namespace, Scene, WorkingNames};
pub use stem::StemBuilder;
pub use style::StyleConfig;
