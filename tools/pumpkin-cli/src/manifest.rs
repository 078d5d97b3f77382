//! pumpkin.toml manifest parsing
//!
//! The manifest holds batch settings under `[batch]` and any style override
//! under `[style]`. Command-line flags take precedence over the manifest.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pumpkin_generator::{BatchOptions, MouthShape, StyleConfig};
use serde::{Deserialize, Serialize};

/// pumpkin.toml manifest structure
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpkinManifest {
    pub batch: BatchSection,
    pub style: StyleConfig,
}

/// Batch settings section
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    pub count: u32,
    pub seed: Option<u64>,
    pub point_light: bool,
    pub mouth_shapes: Vec<MouthShape>,
    pub parallel: bool,
    /// Output directory for `pumpkin generate`
    pub output: PathBuf,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            count: 1,
            seed: None,
            point_light: false,
            mouth_shapes: MouthShape::ALL.to_vec(),
            parallel: false,
            output: PathBuf::from("pumpkins"),
        }
    }
}

impl PumpkinManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse pumpkin.toml")
    }
}

/// Batch flags shared by `generate` and `plan`
#[derive(Args, Debug, Default)]
pub struct BatchArgs {
    /// Path to pumpkin.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of pumpkins
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Batch seed (random when omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Add a point light inside each pumpkin
    #[arg(long)]
    pub light: bool,

    /// Enabled mouth shapes, comma separated (happy,sad,neutral)
    #[arg(long, value_delimiter = ',')]
    pub mouth: Option<Vec<MouthShape>>,

    /// Build pumpkins in parallel
    #[arg(long)]
    pub parallel: bool,
}

impl BatchArgs {
    /// Manifest named by `--config`, or defaults
    pub fn manifest(&self) -> Result<PumpkinManifest> {
        match &self.config {
            Some(path) => PumpkinManifest::load(path),
            None => Ok(PumpkinManifest::default()),
        }
    }

    /// Merge flags over the manifest into generator options
    pub fn options(&self, manifest: PumpkinManifest) -> BatchOptions {
        let batch = manifest.batch;
        BatchOptions {
            count: self.count.unwrap_or(batch.count),
            add_point_light: self.light || batch.point_light,
            mouth_shapes: self.mouth.clone().unwrap_or(batch.mouth_shapes),
            seed: self.seed.or(batch.seed),
            parallel: self.parallel || batch.parallel,
            style: manifest.style,
        }
    }
}
