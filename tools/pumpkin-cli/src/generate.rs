//! Generate and plan commands

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pumpkin_generator::BatchLayoutController;
use pumpkin_kernel::MeshKernel;

use crate::export::write_batch;
use crate::manifest::BatchArgs;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Output directory (overrides batch.output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Write the plan to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs) -> Result<()> {
    let manifest = args.batch.manifest()?;
    let output = args.output.clone().unwrap_or_else(|| manifest.batch.output.clone());
    let options = args.batch.options(manifest);

    let mut controller = BatchLayoutController::new(&MeshKernel);
    let batch = controller
        .generate(&options)
        .context("Failed to generate pumpkins")?;

    let scene = write_batch(&batch, &output)?;

    println!(
        "Generated {} pumpkin(s) into {} (seed {})",
        scene.pumpkins.len(),
        output.display(),
        scene.seed
    );
    for failure in &scene.failures {
        println!("  {} failed: {}", failure.name, failure.error);
    }
    Ok(())
}

/// Execute the plan command
pub fn execute_plan(args: PlanArgs) -> Result<()> {
    let manifest = args.batch.manifest()?;
    let options = args.batch.options(manifest);

    let plan = BatchLayoutController::new(&MeshKernel)
        .plan(&options)
        .context("Failed to plan pumpkins")?;
    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;

    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write plan")?;
        }
    }
    Ok(())
}
