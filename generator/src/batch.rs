//! Batch generation and grid layout

use glam::Vec3;
use pumpkin_kernel::GeometryKernel;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assembler::{Assembler, PumpkinMesh};
use crate::body::BodyDeformer;
use crate::cutter::CutterSolidFactory;
use crate::error::{PumpkinError, Result};
use crate::face::{CutPlacement, FaceFeaturePlanner, MouthShape};
use crate::params::PumpkinParameters;
use crate::random::RandomizationEngine;
use crate::scene::{BuildContext, Namespace, Scene};
use crate::stem::StemBuilder;
use crate::style::StyleConfig;

/// Position of a pumpkin in the batch grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    pub index: u32,
    pub row: u32,
    pub col: u32,
}

impl GridCell {
    /// Cell for 1-based `index` in rows of `row_width`
    pub fn for_index(index: u32, row_width: u32) -> Self {
        let i = index.saturating_sub(1);
        let width = row_width.max(1);
        Self {
            index,
            row: i / width,
            col: i % width,
        }
    }

    /// Rows stack along +Y and columns run along +Z
    pub fn offset(&self, spacing: f32) -> Vec3 {
        Vec3::new(0.0, self.row as f32 * spacing, self.col as f32 * spacing)
    }
}

/// What to generate
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub count: u32,
    pub add_point_light: bool,
    /// Mouth emotions to choose from; must not be empty
    pub mouth_shapes: Vec<MouthShape>,
    /// Batch seed; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Build pumpkins on the rayon pool
    pub parallel: bool,
    pub style: StyleConfig,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            count: 1,
            add_point_light: false,
            mouth_shapes: MouthShape::ALL.to_vec(),
            seed: None,
            parallel: false,
            style: StyleConfig::default(),
        }
    }
}

impl BatchOptions {
    /// Check everything that can be checked before geometry is built
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(PumpkinError::out_of_range("count", "at least one pumpkin is required"));
        }
        if self.mouth_shapes.is_empty() {
            return Err(PumpkinError::out_of_range(
                "mouth_shapes",
                "at least one mouth shape must be enabled",
            ));
        }
        self.style.validate()
    }

    fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            let seed = rand::random();
            info!(seed, "no seed given, drew one");
            seed
        })
    }
}

/// Parameters and placements of one pumpkin, without geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpkinPlan {
    pub index: u32,
    pub name: String,
    pub cell: GridCell,
    pub parameters: PumpkinParameters,
    pub placements: Vec<CutPlacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub seed: u64,
    pub pumpkins: Vec<PumpkinPlan>,
}

/// A pumpkin that could not be built
#[derive(Debug)]
pub struct BuildFailure {
    pub index: u32,
    pub name: String,
    pub cell: GridCell,
    pub error: PumpkinError,
}

/// Result of a batch run, ordered by index
#[derive(Debug)]
pub struct Batch {
    pub seed: u64,
    pub pumpkins: Vec<PumpkinMesh>,
    pub failures: Vec<BuildFailure>,
}

impl Batch {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Build one pumpkin: draw, plan, build parts, carve and assemble
pub fn build_pumpkin(mut ctx: BuildContext<'_>, mouth_shapes: &[MouthShape]) -> Result<PumpkinMesh> {
    let style = ctx.style;
    let kernel = ctx.kernel;

    let parameters = PumpkinParameters::draw(&mut ctx.engine, style, mouth_shapes)?;
    let placements = FaceFeaturePlanner::new(style).plan(&parameters.face, &parameters.mouth);

    let body = BodyDeformer::new(kernel, &style.body).build()?;
    let (stem, cap) = StemBuilder::new(kernel, &style.stem).build(&parameters.stem)?;
    let cuts = CutterSolidFactory::new(kernel, &style.cutters)
        .make_group(&ctx.namespace.cuts, &placements)?;

    Assembler::new(&ctx).assemble(body, stem, cap, cuts, parameters, placements)
}

/// Generates batches of pumpkins laid out on a grid
pub struct BatchLayoutController<'k> {
    kernel: &'k dyn GeometryKernel,
    scene: Scene,
}

impl<'k> BatchLayoutController<'k> {
    pub fn new(kernel: &'k dyn GeometryKernel) -> Self {
        Self {
            kernel,
            scene: Scene::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Build `options.count` pumpkins
    ///
    /// Options are validated before any geometry is built. Geometry and
    /// boolean failures are recorded per pumpkin; other errors abort.
    /// Repeated calls add new pumpkins to the same scene, numbered after the
    /// ones already there; grid cells and random streams follow the position
    /// within the batch.
    pub fn generate(&mut self, options: &BatchOptions) -> Result<Batch> {
        options.validate()?;
        let seed = options.resolve_seed();

        let mut jobs = Vec::with_capacity(options.count as usize);
        for index in 1..=options.count {
            let namespace = self.scene.next_namespace();
            jobs.push((index, self.scene.allocate(namespace)?));
        }
        info!(count = options.count, seed, parallel = options.parallel, "generating batch");

        let working = self.scene.working_names();
        let run = |(index, namespace): &(u32, Namespace)| {
            let ctx = BuildContext::new(self.kernel, &options.style, seed, namespace.clone(), *index)
                .with_point_light(options.add_point_light)
                .with_working_names(working.clone());
            build_pumpkin(ctx, &options.mouth_shapes)
        };
        let results: Vec<Result<PumpkinMesh>> = if options.parallel {
            use rayon::prelude::*;
            jobs.par_iter().map(run).collect()
        } else {
            jobs.iter().map(run).collect()
        };

        self.scene.clear_working_state();

        let layout = &options.style.layout;
        let mut batch = Batch {
            seed,
            pumpkins: Vec::with_capacity(jobs.len()),
            failures: Vec::new(),
        };
        for ((index, namespace), result) in jobs.into_iter().zip(results) {
            let cell = GridCell::for_index(index, layout.row_width);
            match result {
                Ok(mut pumpkin) => {
                    pumpkin.translate(cell.offset(layout.spacing));
                    info!(
                        name = %pumpkin.name,
                        row = cell.row,
                        col = cell.col,
                        triangles = pumpkin.mesh.triangle_count(),
                        "pumpkin built"
                    );
                    batch.pumpkins.push(pumpkin);
                }
                Err(error) if error.is_isolated() => {
                    warn!(name = %namespace.pumpkin, %error, "pumpkin failed");
                    batch.failures.push(BuildFailure {
                        index,
                        name: namespace.pumpkin,
                        cell,
                        error,
                    });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(batch)
    }

    /// Draw parameters and placements for every pumpkin without building geometry
    pub fn plan(&self, options: &BatchOptions) -> Result<BatchPlan> {
        options.validate()?;
        let seed = options.resolve_seed();
        let style = &options.style;
        let planner = FaceFeaturePlanner::new(style);

        let pumpkins = (1..=options.count)
            .map(|index| {
                let mut engine = RandomizationEngine::for_pumpkin(seed, index);
                let parameters = PumpkinParameters::draw(&mut engine, style, &options.mouth_shapes)?;
                let placements = planner.plan(&parameters.face, &parameters.mouth);
                Ok(PumpkinPlan {
                    index,
                    name: Namespace::for_index(index).pumpkin,
                    cell: GridCell::for_index(index, style.layout.row_width),
                    parameters,
                    placements,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(BatchPlan { seed, pumpkins })
    }
}
