//! Face feature planning
//!
//! Turns drawn [`FaceParameters`] and [`MouthParameters`] into an ordered
//! list of [`CutPlacement`]s on the face plane. Nothing here touches
//! geometry; the placements are realized by
//! [`CutterSolidFactory`](crate::cutter::CutterSolidFactory).
//!
//! Face coordinates are normalized: `y` runs bottom to top and `z` left to
//! right across the front of the pumpkin, nominally in `[0, 1]`. Eyebrows and
//! the outer mouth cuts can land just outside that square; they are placed
//! where they land so the mouth keeps its spacing.

mod mouth;

pub use mouth::{MouthCut, MouthParameters, MouthShape, MouthStyle};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::random::RandomizationEngine;
use crate::style::StyleConfig;

/// Normalized position on the face plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceCoordinate {
    y: f32,
    z: f32,
}

impl FaceCoordinate {
    /// Coordinate at `(y, z)`, kept as given
    ///
    /// Values outside the unit square are logged, not moved.
    pub fn new(y: f32, z: f32) -> Self {
        let coord = Self { y, z };
        if !coord.in_domain() {
            warn!(y, z, "face coordinate outside the unit square");
        }
        coord
    }

    /// True when both components lie in `[0, 1]`
    pub fn in_domain(&self) -> bool {
        (0.0..=1.0).contains(&self.y) && (0.0..=1.0).contains(&self.z)
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn z(&self) -> f32 {
        self.z
    }

    /// Position on the local face plane: `(0.8y - 0.4, z - 0.5)`
    ///
    /// In-domain coordinates map into `[-0.4, 0.4] x [-0.5, 0.5]`.
    pub fn map(&self) -> Vec2 {
        Vec2::new(0.8 * self.y - 0.4, self.z - 0.5)
    }
}

/// Cross-section of a cutter solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutShape {
    Circle,
    Triangle,
    /// Square cross-section; shown as a diamond at its default rotation
    Rectangle,
}

impl CutShape {
    pub const ALL: [CutShape; 3] = [CutShape::Circle, CutShape::Rectangle, CutShape::Triangle];

    /// Rotation about the face normal used when a feature does not choose one
    pub fn default_rotation(self) -> f32 {
        match self {
            CutShape::Circle | CutShape::Triangle => 0.0,
            CutShape::Rectangle => 45.0,
        }
    }
}

/// Which facial feature a cut belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Eye,
    Eyebrow,
    Nose,
    Mouth,
}

/// One cut on the face plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPlacement {
    pub kind: FeatureKind,
    pub shape: CutShape,
    pub coord: FaceCoordinate,
    /// Scale along the face vertical
    pub scale_a: f32,
    /// Scale along the face horizontal
    pub scale_b: f32,
    /// Rotation about the face normal, in degrees
    pub rotation_degrees: f32,
}

/// Eyes, eyebrows and nose, in draw order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceParameters {
    pub left_eye: [f32; 2],
    pub right_eye: [f32; 2],
    pub eye_shape: CutShape,
    /// Eyebrow `(rise, jitter)` relative to the left eye
    pub left_eyebrow: [f32; 2],
    pub right_eyebrow: [f32; 2],
    pub eyebrow_shape: CutShape,
    pub eyebrow_angle: f32,
    pub nose_y: f32,
    pub nose_shape: CutShape,
    pub nose_rotation: f32,
    pub nose_scale: f32,
}

impl FaceParameters {
    /// Draw eyes, then eyebrows, then the nose
    pub fn draw(engine: &mut RandomizationEngine, style: &StyleConfig) -> Result<Self> {
        let f = &style.face;

        let left_eye = [f.eye_y.draw(engine), f.left_eye_z.draw(engine)];
        let right_eye = [f.eye_y.draw(engine), f.right_eye_z.draw(engine)];
        let eye_shape = *engine.choice(&CutShape::ALL)?;

        let left_eyebrow = [f.eyebrow_rise.draw(engine), f.eyebrow_jitter.draw(engine)];
        let right_eyebrow = [f.eyebrow_rise.draw(engine), f.eyebrow_jitter.draw(engine)];
        let eyebrow_shape = *engine.choice(&CutShape::ALL)?;
        let eyebrow_angle = f.eyebrow_angle.draw(engine);

        let nose_y = f.nose_y.draw(engine);
        let nose_shape = *engine.choice(&CutShape::ALL)?;
        let nose_rotation = f.nose_rotation.draw(engine);
        let nose_scale = f.nose_scale.draw(engine);

        Ok(Self {
            left_eye,
            right_eye,
            eye_shape,
            left_eyebrow,
            right_eyebrow,
            eyebrow_shape,
            eyebrow_angle,
            nose_y,
            nose_shape,
            nose_rotation,
            nose_scale,
        })
    }

    /// Horizontal midpoint between the eyes; nose and mouth centre on it
    pub fn center_z(&self) -> f32 {
        (self.left_eye[1] + self.right_eye[1]) / 2.0
    }
}

/// Maps drawn face and mouth parameters to cut placements
#[derive(Debug, Clone, Copy)]
pub struct FaceFeaturePlanner<'a> {
    style: &'a StyleConfig,
}

impl<'a> FaceFeaturePlanner<'a> {
    pub fn new(style: &'a StyleConfig) -> Self {
        Self { style }
    }

    /// All placements: eyes, eyebrows, nose, then the mouth
    pub fn plan(&self, face: &FaceParameters, mouth: &MouthParameters) -> Vec<CutPlacement> {
        let mut placements = Vec::with_capacity(7 + mouth.number_cuts as usize);
        placements.extend(self.eyes(face));
        placements.extend(self.eyebrows(face));
        placements.push(self.nose(face));
        placements.extend(self.mouth(face, mouth));
        placements
    }

    /// Left and right eye
    pub fn eyes(&self, face: &FaceParameters) -> [CutPlacement; 2] {
        let scales = &self.style.face.eye_scales;
        let (left, right) = match face.eye_shape {
            CutShape::Circle => (scales.circle_left, scales.circle_right),
            CutShape::Rectangle => (scales.rectangle, scales.rectangle),
            CutShape::Triangle => (scales.triangle, scales.triangle),
        };
        let rotation = face.eye_shape.default_rotation();
        let eye = |pos: [f32; 2], scale: [f32; 2]| CutPlacement {
            kind: FeatureKind::Eye,
            shape: face.eye_shape,
            coord: FaceCoordinate::new(pos[0], pos[1]),
            scale_a: scale[0],
            scale_b: scale[1],
            rotation_degrees: rotation,
        };
        [eye(face.left_eye, left), eye(face.right_eye, right)]
    }

    /// Eyebrows above each eye, tilted symmetrically
    pub fn eyebrows(&self, face: &FaceParameters) -> [CutPlacement; 2] {
        let [a, b] = self.style.face.eyebrow_scale;
        let brow = |eye: [f32; 2], offset: [f32; 2], rotation: f32| CutPlacement {
            kind: FeatureKind::Eyebrow,
            shape: face.eyebrow_shape,
            coord: FaceCoordinate::new(eye[0] + offset[0], eye[1] + offset[1]),
            scale_a: a,
            scale_b: b,
            rotation_degrees: rotation,
        };
        [
            brow(face.left_eye, face.left_eyebrow, -face.eyebrow_angle),
            brow(face.right_eye, face.right_eyebrow, face.eyebrow_angle),
        ]
    }

    pub fn nose(&self, face: &FaceParameters) -> CutPlacement {
        let r = face.nose_scale;
        let long = r + self.style.face.nose_stretch;
        // round noses stretch vertically, the others horizontally
        let (scale_a, scale_b) = match face.nose_shape {
            CutShape::Circle => (long, r),
            CutShape::Rectangle | CutShape::Triangle => (r, long),
        };
        CutPlacement {
            kind: FeatureKind::Nose,
            shape: face.nose_shape,
            coord: FaceCoordinate::new(face.nose_y, face.center_z()),
            scale_a,
            scale_b,
            rotation_degrees: face.nose_rotation,
        }
    }

    /// Central mouth cut followed by the side cuts
    pub fn mouth(&self, face: &FaceParameters, mouth: &MouthParameters) -> Vec<CutPlacement> {
        let cfg = &self.style.mouth;
        let center_z = face.center_z();
        let center_size = cfg.center_scale * mouth.base_scale;

        let mut placements = Vec::with_capacity(mouth.number_cuts as usize + 2);
        placements.push(CutPlacement {
            kind: FeatureKind::Mouth,
            shape: mouth.cut_shape,
            coord: FaceCoordinate::new(mouth.baseline, center_z + cfg.center_offset),
            scale_a: center_size,
            scale_b: center_size,
            rotation_degrees: mouth.cut_shape.default_rotation(),
        });
        placements.extend(mouth.cuts(center_z).into_iter().map(|cut| CutPlacement {
            kind: FeatureKind::Mouth,
            shape: mouth.cut_shape,
            coord: FaceCoordinate::new(cut.y, cut.z),
            scale_a: cut.size,
            scale_b: cut.size,
            rotation_degrees: mouth.rotation,
        }));
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(eye_shape: CutShape) -> FaceParameters {
        FaceParameters {
            left_eye: [0.78, 0.1],
            right_eye: [0.8, 0.9],
            eye_shape,
            left_eyebrow: [0.2, -0.05],
            right_eyebrow: [0.21, 0.15],
            eyebrow_shape: CutShape::Triangle,
            eyebrow_angle: 30.0,
            nose_y: 0.6,
            nose_shape: CutShape::Circle,
            nose_rotation: 90.0,
            nose_scale: 2.0,
        }
    }

    #[test]
    fn test_coordinate_outside_square_is_kept() {
        let c = FaceCoordinate::new(1.2, -0.3);
        assert_eq!((c.y(), c.z()), (1.2, -0.3));
        assert!(!c.in_domain());
        let m = c.map();
        assert!((m.x - 0.56).abs() < 1e-6);
        assert!((m.y + 0.8).abs() < 1e-6);
        assert!(FaceCoordinate::new(0.5, 1.0).in_domain());
    }

    #[test]
    fn test_map_corners() {
        let lo = FaceCoordinate::new(0.0, 0.0).map();
        let hi = FaceCoordinate::new(1.0, 1.0).map();
        assert_eq!(lo, Vec2::new(-0.4, -0.5));
        assert!((hi - Vec2::new(0.4, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_default_rotations() {
        assert_eq!(CutShape::Circle.default_rotation(), 0.0);
        assert_eq!(CutShape::Triangle.default_rotation(), 0.0);
        assert_eq!(CutShape::Rectangle.default_rotation(), 45.0);
    }

    #[test]
    fn test_circle_eyes_are_asymmetric() {
        let style = StyleConfig::default();
        let [left, right] = FaceFeaturePlanner::new(&style).eyes(&face(CutShape::Circle));
        assert_eq!((left.scale_a, left.scale_b), (2.0, 2.0));
        assert_eq!((right.scale_a, right.scale_b), (2.5, 2.0));
        assert_eq!(left.rotation_degrees, 0.0);
    }

    #[test]
    fn test_rectangle_eyes_are_diamonds() {
        let style = StyleConfig::default();
        let eyes = FaceFeaturePlanner::new(&style).eyes(&face(CutShape::Rectangle));
        for eye in eyes {
            assert_eq!(eye.rotation_degrees, 45.0);
            assert_eq!((eye.scale_a, eye.scale_b), (2.0, 2.5));
        }
    }

    #[test]
    fn test_eyebrows_mirror_angle() {
        let style = StyleConfig::default();
        let [left, right] = FaceFeaturePlanner::new(&style).eyebrows(&face(CutShape::Circle));
        assert_eq!(left.rotation_degrees, -30.0);
        assert_eq!(right.rotation_degrees, 30.0);
        assert!((left.coord.y() - 0.98).abs() < 1e-6);
        assert!((left.coord.z() - 0.05).abs() < 1e-6);
        // right brow pushed past the edge stays where it was drawn
        assert!((right.coord.z() - 1.05).abs() < 1e-6);
        assert!(!right.coord.in_domain());
    }

    #[test]
    fn test_nose_centred_between_eyes() {
        let style = StyleConfig::default();
        let nose = FaceFeaturePlanner::new(&style).nose(&face(CutShape::Circle));
        assert!((nose.coord.z() - 0.5).abs() < 1e-6);
        assert_eq!((nose.scale_a, nose.scale_b), (2.5, 2.0));
        assert_eq!(nose.rotation_degrees, 90.0);
    }

    #[test]
    fn test_mouth_side_cuts_keep_spacing() {
        let style = StyleConfig::default();
        let face = face(CutShape::Circle);
        let mouth = MouthParameters {
            shape: MouthShape::Happy,
            cut_shape: CutShape::Rectangle,
            baseline: 0.05,
            top: 0.25,
            number_cuts: 7,
            separated: false,
            base_scale: 0.8,
            spacing: 0.08,
            style: MouthStyle::Larger,
            rotation: 10.0,
        };
        let placements = FaceFeaturePlanner::new(&style).mouth(&face, &mouth);
        let cuts = mouth.cuts(face.center_z());
        assert_eq!(placements.len(), cuts.len() + 1);

        for (placement, cut) in placements[1..].iter().zip(&cuts) {
            let expected = face.center_z() + cut.j as f32 * mouth.spacing;
            assert!((placement.coord.z() - expected).abs() < 1e-6);
            assert_eq!(placement.coord.y(), cut.y);
        }
        // j = -7 and j = 8 reach past both edges
        assert!(placements[7].coord.z() < 0.0);
        assert!(placements[8].coord.z() > 1.0);
        for (i, a) in placements[1..].iter().enumerate() {
            for b in &placements[i + 2..] {
                assert_ne!(a.coord.z(), b.coord.z());
            }
        }
    }

    #[test]
    fn test_draw_respects_ranges() {
        let style = StyleConfig::default();
        for seed in 0..50 {
            let mut engine = RandomizationEngine::from_seed(seed);
            let face = FaceParameters::draw(&mut engine, &style).unwrap();
            assert!((0.75..=0.81).contains(&face.left_eye[0]));
            assert!((0.0..=0.25).contains(&face.left_eye[1]));
            assert!((0.75..=1.0).contains(&face.right_eye[1]));
            assert!((0.0..=45.0).contains(&face.eyebrow_angle));
            assert!((1.9..=2.2).contains(&face.nose_scale));
        }
    }
}
