//! Pumpkin CLI - procedural jack-o'-lantern batches
//!
//! # Commands
//!
//! - `pumpkin init` - Create a new pumpkin.toml manifest
//! - `pumpkin generate` - Build a batch and write OBJ files plus scene.json
//! - `pumpkin plan` - Print the drawn parameters and cut placements as JSON
//!
//! # Usage
//!
//! ```bash
//! # Six pumpkins with lights, reproducible
//! pumpkin generate --count 6 --seed 31 --light -o out
//!
//! # Only happy or neutral mouths, built on all cores
//! pumpkin generate -n 12 --mouth happy,neutral --parallel
//!
//! # Inspect what a seed would produce
//! pumpkin plan -n 3 --seed 31
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

mod export;
mod generate;
mod init;
mod manifest;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Pumpkin CLI - procedural jack-o'-lantern batches
#[derive(Parser)]
#[command(name = "pumpkin")]
#[command(about = "Generate batches of carved pumpkin meshes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new pumpkin.toml manifest
    Init(init::InitArgs),

    /// Build a batch of pumpkins and export it
    Generate(generate::GenerateArgs),

    /// Draw parameters and placements without building geometry
    Plan(generate::PlanArgs),
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init::execute(args),
        Commands::Generate(args) => generate::execute(args),
        Commands::Plan(args) => generate::execute_plan(args),
    }
}
