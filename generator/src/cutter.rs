//! Cutter solids
//!
//! One primitive per [`CutShape`], scaled, turned and moved onto the face so
//! that its axis runs along X through the front wall of the body.

use glam::{Mat4, Vec3};
use pumpkin_kernel::{GeometryKernel, Mesh};
use tracing::debug;

use crate::error::Result;
use crate::face::{CutPlacement, CutShape};
use crate::style::CutterStyle;

/// A cutter primitive and the placement it realizes
#[derive(Debug, Clone)]
pub struct CutterSolid {
    pub placement: CutPlacement,
    pub mesh: Mesh,
}

impl CutterSolid {
    pub fn shape(&self) -> CutShape {
        self.placement.shape
    }
}

/// Ordered cutters for one pumpkin, consumed by the carve step
#[derive(Debug)]
pub struct CutGroup {
    name: String,
    cutters: Vec<CutterSolid>,
}

impl CutGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cutters: Vec::new(),
        }
    }

    pub fn push(&mut self, cutter: CutterSolid) {
        self.cutters.push(cutter);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.cutters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cutters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CutterSolid> {
        self.cutters.iter()
    }

    /// Give up the cutter meshes, dropping the group
    pub fn into_meshes(self) -> Vec<Mesh> {
        self.cutters.into_iter().map(|c| c.mesh).collect()
    }
}

/// Builds cutter solids from placements
#[derive(Clone, Copy)]
pub struct CutterSolidFactory<'a> {
    kernel: &'a dyn GeometryKernel,
    style: &'a CutterStyle,
}

impl<'a> CutterSolidFactory<'a> {
    pub fn new(kernel: &'a dyn GeometryKernel, style: &'a CutterStyle) -> Self {
        Self { kernel, style }
    }

    /// World matrix for a placement
    ///
    /// Scale in the primitive frame, turn the primitive axis onto X, spin
    /// about X, then move to the face position at the cutter depth.
    pub fn placement_matrix(&self, placement: &CutPlacement) -> Mat4 {
        let (a, b) = (placement.scale_a, placement.scale_b);
        let (scale, orient) = match placement.shape {
            // Y-axis primitives: X becomes the face vertical after the turn
            CutShape::Circle | CutShape::Triangle => (
                Vec3::new(a, 1.0, b),
                Mat4::from_rotation_z(90f32.to_radians()),
            ),
            CutShape::Rectangle => (Vec3::new(1.0, a, b), Mat4::IDENTITY),
        };
        let face = placement.coord.map();
        Mat4::from_translation(Vec3::new(self.style.depth, face.x, face.y))
            * Mat4::from_rotation_x(placement.rotation_degrees.to_radians())
            * orient
            * Mat4::from_scale(scale)
    }

    /// Cutter solid for one placement
    pub fn make(&self, placement: &CutPlacement) -> Result<CutterSolid> {
        let s = self.style;
        let mut mesh = match placement.shape {
            CutShape::Circle => {
                self.kernel
                    .cylinder(s.circle_radius, s.circle_length, s.circle_segments, 1)?
            }
            CutShape::Triangle => self.kernel.prism(s.prism_side, s.prism_length)?,
            CutShape::Rectangle => {
                let [w, h, d] = s.cuboid;
                self.kernel.cuboid(w, h, d)?
            }
        };
        self.kernel.transform(&mut mesh, self.placement_matrix(placement));
        Ok(CutterSolid {
            placement: *placement,
            mesh,
        })
    }

    /// Cutter solids for all placements, in order, collected under `name`
    pub fn make_group(&self, name: &str, placements: &[CutPlacement]) -> Result<CutGroup> {
        let mut group = CutGroup::new(name);
        for placement in placements {
            group.push(self.make(placement)?);
        }
        debug!(group = name, cutters = group.len(), "built cut group");
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{FaceCoordinate, FeatureKind};
    use pumpkin_kernel::MeshKernel;

    fn placement(shape: CutShape, rotation_degrees: f32) -> CutPlacement {
        CutPlacement {
            kind: FeatureKind::Eye,
            shape,
            coord: FaceCoordinate::new(0.5, 0.5),
            scale_a: 2.0,
            scale_b: 3.0,
            rotation_degrees,
        }
    }

    #[test]
    fn test_circle_axis_runs_along_x() {
        let style = CutterStyle::default();
        let factory = CutterSolidFactory::new(&MeshKernel, &style);
        let cutter = factory.make(&placement(CutShape::Circle, 0.0)).unwrap();
        let size = cutter.mesh.bounds().size();

        assert!((size.x - 1.5).abs() < 1e-5);
        assert!(size.y <= 2.0 * 0.05 * 2.0 + 1e-5);
        assert!(size.z <= 2.0 * 0.05 * 3.0 + 1e-5);
        assert!((cutter.mesh.bounds().center().x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_rectangle_diamond_extent() {
        let style = CutterStyle::default();
        let factory = CutterSolidFactory::new(&MeshKernel, &style);
        let mut p = placement(CutShape::Rectangle, 45.0);
        p.scale_b = 2.0;
        let cutter = factory.make(&p).unwrap();
        let size = cutter.mesh.bounds().size();

        // 0.2 x 0.2 square turned 45 degrees spans its diagonal
        let diagonal = 0.2 * std::f32::consts::SQRT_2;
        assert!((size.y - diagonal).abs() < 1e-5);
        assert!((size.z - diagonal).abs() < 1e-5);
        assert!((size.x - 1.3).abs() < 1e-5);
    }

    #[test]
    fn test_face_position() {
        let style = CutterStyle::default();
        let factory = CutterSolidFactory::new(&MeshKernel, &style);
        let mut p = placement(CutShape::Triangle, 0.0);
        p.coord = FaceCoordinate::new(1.0, 0.0);
        let m = factory.placement_matrix(&p);
        let origin = m.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(1.0, 0.4, -0.5)).length() < 1e-6);
    }

    #[test]
    fn test_group_keeps_order_and_volume() {
        let style = CutterStyle::default();
        let factory = CutterSolidFactory::new(&MeshKernel, &style);
        let placements = [
            placement(CutShape::Circle, 0.0),
            placement(CutShape::Rectangle, 45.0),
            placement(CutShape::Triangle, 10.0),
        ];
        let group = factory.make_group("pumpkin1_cuts", &placements).unwrap();
        assert_eq!(group.name(), "pumpkin1_cuts");
        let shapes: Vec<CutShape> = group.iter().map(CutterSolid::shape).collect();
        assert_eq!(shapes, vec![CutShape::Circle, CutShape::Rectangle, CutShape::Triangle]);
        for cutter in group.iter() {
            assert!(cutter.mesh.volume() > 0.0);
        }
        assert_eq!(group.into_meshes().len(), 3);
    }
}
