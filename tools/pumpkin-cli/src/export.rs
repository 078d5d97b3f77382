//! Batch export: one OBJ per pumpkin plus a scene.json description

use std::path::Path;

use anyhow::{Context, Result};
use pumpkin_generator::{
    Batch, CarveReport, CutPlacement, GridCell, PointLight, PumpkinMesh, PumpkinParameters,
};
use pumpkin_kernel::save_obj;
use serde::Serialize;

/// Contents of scene.json
#[derive(Debug, Serialize)]
pub struct SceneFile {
    pub seed: u64,
    pub pumpkins: Vec<SceneEntry>,
    pub failures: Vec<FailureEntry>,
}

#[derive(Debug, Serialize)]
pub struct SceneEntry {
    pub name: String,
    pub index: u32,
    pub file: String,
    pub cell: GridCell,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub pivot: [f32; 3],
    pub light: Option<PointLight>,
    pub triangles: usize,
    pub carve: CarveReport,
    pub parameters: PumpkinParameters,
    pub placements: Vec<CutPlacement>,
}

#[derive(Debug, Serialize)]
pub struct FailureEntry {
    pub name: String,
    pub index: u32,
    pub cell: GridCell,
    pub error: String,
}

impl SceneEntry {
    fn new(pumpkin: &PumpkinMesh, file: String) -> Self {
        Self {
            name: pumpkin.name.clone(),
            index: pumpkin.index,
            file,
            cell: pumpkin.cell,
            bounds_min: pumpkin.bounds.min.to_array(),
            bounds_max: pumpkin.bounds.max.to_array(),
            pivot: pumpkin.pivot.to_array(),
            light: pumpkin.light,
            triangles: pumpkin.mesh.triangle_count(),
            carve: pumpkin.carve,
            parameters: pumpkin.parameters.clone(),
            placements: pumpkin.placements.clone(),
        }
    }
}

/// Write every pumpkin and scene.json into `dir`
pub fn write_batch(batch: &Batch, dir: &Path) -> Result<SceneFile> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut pumpkins = Vec::with_capacity(batch.pumpkins.len());
    for pumpkin in &batch.pumpkins {
        let file = format!("{}.obj", pumpkin.name);
        let path = dir.join(&file);
        save_obj(&pumpkin.mesh, &pumpkin.name, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote mesh");
        pumpkins.push(SceneEntry::new(pumpkin, file));
    }

    let failures = batch
        .failures
        .iter()
        .map(|f| FailureEntry {
            name: f.name.clone(),
            index: f.index,
            cell: f.cell,
            error: f.error.to_string(),
        })
        .collect();

    let scene = SceneFile {
        seed: batch.seed,
        pumpkins,
        failures,
    };
    let path = dir.join("scene.json");
    let json = serde_json::to_string_pretty(&scene).context("Failed to serialize scene")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(scene)
}
