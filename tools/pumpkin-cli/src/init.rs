//! Init command - create a new pumpkin.toml manifest

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to write pumpkin.toml into (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Overwrite an existing pumpkin.toml
    #[arg(long)]
    pub force: bool,
}

/// Default manifest with every section commented
pub const TEMPLATE: &str = r#"# Pumpkin batch manifest

[batch]
# Number of pumpkins, laid out in rows of style.layout.row_width
count = 6
# Fixed seed for reproducible batches; remove to draw a new one each run
seed = 31
# Place a point light inside every pumpkin
point_light = true
# Mouth emotions to pick from (happy, sad, neutral)
mouth_shapes = ["happy", "sad", "neutral"]
# Build pumpkins on all cores
parallel = false
# Output directory for OBJ files and scene.json
output = "pumpkins"

# Any style value can be overridden; everything else keeps its default.

[style.body]
segments = 11
wall_thickness = 0.04

[style.face]
eye_y = { min = 0.75, max = 0.81 }

[style.finish]
overall_scale = { min = 0.7, max = 1.4 }
jitter = { min = -0.1, max = 0.15 }

[style.layout]
row_width = 3
spacing = 2.7
"#;

/// Execute the init command
pub fn execute(args: InitArgs) -> Result<()> {
    let dir = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let manifest_path = dir.join("pumpkin.toml");

    if manifest_path.exists() && !args.force {
        anyhow::bail!(
            "pumpkin.toml already exists at {}\nUse --force to overwrite",
            manifest_path.display()
        );
    }

    std::fs::write(&manifest_path, TEMPLATE)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
    println!("Created {}", manifest_path.display());
    Ok(())
}
