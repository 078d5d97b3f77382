//! Carving, merging, pivoting and scaling into the finished pumpkin

use glam::{Mat4, Vec3};
use pumpkin_kernel::{Aabb, Mesh};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::GridCell;
use crate::cutter::CutGroup;
use crate::error::{BooleanOpFailure, PumpkinError, Result};
use crate::face::CutPlacement;
use crate::params::PumpkinParameters;
use crate::scene::BuildContext;

/// Volumes closer than this count as unchanged
const VOLUME_EPSILON: f32 = 1e-7;

/// Glow placed inside a finished pumpkin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

/// What the carve step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CarveReport {
    pub cutters: usize,
    pub applied: usize,
    pub missed: usize,
    pub volume_before: f32,
    pub volume_after: f32,
}

/// A finished pumpkin
#[derive(Debug, Clone)]
pub struct PumpkinMesh {
    pub name: String,
    pub index: u32,
    pub mesh: Mesh,
    pub bounds: Aabb,
    /// Bottom centre of the bounds
    pub pivot: Vec3,
    pub light: Option<PointLight>,
    pub cell: GridCell,
    pub parameters: PumpkinParameters,
    pub placements: Vec<CutPlacement>,
    pub carve: CarveReport,
}

impl PumpkinMesh {
    /// Move the pumpkin, its pivot and its light by `offset`
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.mesh.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
        self.bounds = self.bounds.translated(offset);
        self.pivot += offset;
        if let Some(light) = &mut self.light {
            light.position = (Vec3::from_array(light.position) + offset).to_array();
        }
    }
}

/// Finishes one pumpkin from its parts
pub struct Assembler<'c, 'a> {
    ctx: &'c BuildContext<'a>,
}

impl<'c, 'a> Assembler<'c, 'a> {
    pub fn new(ctx: &'c BuildContext<'a>) -> Self {
        Self { ctx }
    }

    /// Subtract the cut group from the remeshed body
    ///
    /// The group is consumed and its working name released. An empty or
    /// open result, or a non-empty group that leaves the enclosed volume
    /// unchanged, is a boolean failure.
    pub fn carve(&self, mut body: Mesh, cuts: CutGroup) -> Result<(Mesh, CarveReport)> {
        let kernel = self.ctx.kernel;
        kernel.remesh(&mut body, self.ctx.style.finish.remesh_edge)?;

        let cutters = cuts.len();
        let group = cuts.name().to_string();
        let volume_before = kernel.volume(&body);
        let (carved, outcome) = kernel.subtract(&body, cuts.into_meshes());
        self.ctx.release_cuts();

        if carved.is_empty() {
            return Err(PumpkinError::BooleanOp(BooleanOpFailure::Empty));
        }
        let open_edges = kernel.open_edges(&carved);
        if open_edges > 0 {
            return Err(PumpkinError::BooleanOp(BooleanOpFailure::NonManifold { open_edges }));
        }
        let volume_after = kernel.volume(&carved);
        if cutters > 0 && volume_after >= volume_before - VOLUME_EPSILON {
            return Err(PumpkinError::BooleanOp(BooleanOpFailure::Unchanged {
                cutters,
                volume: volume_after,
            }));
        }
        if outcome.missed > 0 {
            warn!(
                group = %group,
                missed = outcome.missed,
                cutters,
                "cutters did not touch the body"
            );
        }
        debug!(group = %group, volume_before, volume_after, "carved");

        Ok((
            carved,
            CarveReport {
                cutters,
                applied: outcome.applied,
                missed: outcome.missed,
                volume_before,
                volume_after,
            },
        ))
    }

    /// Carve, merge with stem and cap, move the pivot to the origin and scale
    pub fn assemble(
        &self,
        body: Mesh,
        stem: Mesh,
        cap: Mesh,
        cuts: CutGroup,
        parameters: PumpkinParameters,
        placements: Vec<CutPlacement>,
    ) -> Result<PumpkinMesh> {
        let kernel = self.ctx.kernel;
        let (mut carved, carve) = self.carve(body, cuts)?;
        kernel.flatten(&mut carved);

        let mut mesh = kernel.unite(&[&carved, &stem, &cap]);

        let pivot = kernel.bounds(&mesh).bottom_center();
        kernel.transform(&mut mesh, Mat4::from_translation(-pivot));

        let factors = parameters.scale.factors();
        if factors.min_element() <= 0.0 {
            return Err(PumpkinError::out_of_range(
                "scale",
                format!("scale factors must be positive, got {factors}"),
            ));
        }
        kernel.transform(&mut mesh, Mat4::from_scale(factors));
        let bounds = kernel.bounds(&mesh);

        let light = self.ctx.add_point_light.then(|| {
            let finish = &self.ctx.style.finish;
            PointLight {
                position: bounds.center().to_array(),
                color: finish.light_color,
                intensity: finish.light_intensity,
            }
        });

        Ok(PumpkinMesh {
            name: self.ctx.namespace.pumpkin.clone(),
            index: self.ctx.index,
            mesh,
            bounds,
            pivot: Vec3::ZERO,
            light,
            cell: GridCell::for_index(self.ctx.index, self.ctx.style.layout.row_width),
            parameters,
            placements,
            carve,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Namespace;
    use crate::style::StyleConfig;
    use pumpkin_kernel::{GeometryKernel, MeshKernel};

    fn ctx<'a>(style: &'a StyleConfig) -> BuildContext<'a> {
        BuildContext::new(&MeshKernel, style, 1, Namespace::for_index(1), 1)
    }

    #[test]
    fn test_empty_group_keeps_volume() {
        let style = StyleConfig::default();
        let ctx = ctx(&style);
        let body = MeshKernel.sphere(1.0, 16, 12).unwrap();
        let volume = body.volume();
        let (carved, report) = Assembler::new(&ctx).carve(body, CutGroup::new("pumpkin1_cuts")).unwrap();
        assert_eq!(report.cutters, 0);
        // remeshing only splits edges
        assert!((carved.volume() - volume).abs() < 1e-4);
    }

    #[test]
    fn test_carve_releases_cut_group() {
        let style = StyleConfig::default();
        let working = crate::scene::WorkingNames::default();
        let ctx = ctx(&style).with_working_names(working.clone());
        working.insert("pumpkin1_cuts");
        working.insert("pumpkin2_cuts");

        let body = MeshKernel.sphere(1.0, 16, 12).unwrap();
        let mut drill = MeshKernel.cylinder(0.1, 1.0, 8, 1).unwrap();
        MeshKernel.transform(&mut drill, Mat4::from_rotation_z(90f32.to_radians()));
        MeshKernel.transform(&mut drill, Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        let mut group = CutGroup::new("pumpkin1_cuts");
        group.push(crate::cutter::CutterSolid {
            placement: CutPlacement {
                kind: crate::face::FeatureKind::Nose,
                shape: crate::face::CutShape::Rectangle,
                coord: crate::face::FaceCoordinate::new(0.5, 0.5),
                scale_a: 1.0,
                scale_b: 1.0,
                rotation_degrees: 0.0,
            },
            mesh: drill,
        });

        let (carved, report) = Assembler::new(&ctx).carve(body, group).unwrap();
        assert_eq!(report.applied, 1);
        assert!(pumpkin_kernel::topology::is_closed(&carved));
        assert!(!working.contains("pumpkin1_cuts"));
        assert!(working.contains("pumpkin2_cuts"));
    }

    #[test]
    fn test_missing_cutter_is_unchanged_failure() {
        let style = StyleConfig::default();
        let ctx = ctx(&style);
        let body = MeshKernel.sphere(1.0, 16, 12).unwrap();
        let mut far = MeshKernel.cuboid(0.1, 0.1, 0.1).unwrap();
        MeshKernel.transform(&mut far, Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));

        let mut group = CutGroup::new("pumpkin1_cuts");
        group.push(crate::cutter::CutterSolid {
            placement: CutPlacement {
                kind: crate::face::FeatureKind::Nose,
                shape: crate::face::CutShape::Rectangle,
                coord: crate::face::FaceCoordinate::new(0.5, 0.5),
                scale_a: 1.0,
                scale_b: 1.0,
                rotation_degrees: 0.0,
            },
            mesh: far,
        });
        match Assembler::new(&ctx).carve(body, group) {
            Err(PumpkinError::BooleanOp(BooleanOpFailure::Unchanged { cutters, .. })) => {
                assert_eq!(cutters, 1)
            }
            other => panic!("expected unchanged failure, got {other:?}"),
        }
    }

    #[test]
    fn test_translate_moves_everything() {
        let style = StyleConfig::default();
        let ctx = ctx(&style).with_point_light(true);
        let body = MeshKernel.sphere(1.0, 12, 8).unwrap();
        let stem = MeshKernel.cuboid(0.1, 0.3, 0.1).unwrap();
        let cap = MeshKernel.cuboid(0.1, 0.1, 0.1).unwrap();
        let mut engine = crate::random::RandomizationEngine::from_seed(2);
        let parameters =
            PumpkinParameters::draw(&mut engine, &style, &crate::face::MouthShape::ALL).unwrap();

        let mut pumpkin = Assembler::new(&ctx)
            .assemble(body, stem, cap, CutGroup::new("pumpkin1_cuts"), parameters, Vec::new())
            .unwrap();
        assert!(pumpkin.bounds.min.y.abs() < 1e-5);
        assert!(pumpkin.light.is_some());

        let offset = Vec3::new(0.0, 2.7, 5.4);
        pumpkin.translate(offset);
        assert_eq!(pumpkin.pivot, offset);
        assert!((pumpkin.bounds.min.y - 2.7).abs() < 1e-5);
        let light = pumpkin.light.unwrap();
        assert!((Vec3::from_array(light.position) - pumpkin.bounds.center()).length() < 1e-4);
    }
}
