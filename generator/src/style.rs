//! Style configuration
//!
//! Every constant and random range the generator uses, grouped by the
//! component that reads it. All fields have defaults, so a TOML `[style]`
//! table only needs the values it overrides:
//!
//! ```toml
//! [style.face]
//! eye_y = { min = 0.7, max = 0.8 }
//!
//! [style.finish]
//! overall_scale = { min = 1.0, max = 1.0 }
//! ```

use pumpkin_kernel::{FalloffCurve, FalloffMode};
use serde::{Deserialize, Serialize};

use crate::error::{PumpkinError, Result};
use crate::random::RandomizationEngine;

/// Closed interval a value is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformRange {
    pub min: f32,
    pub max: f32,
}

impl UniformRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value from this range
    pub fn draw(&self, engine: &mut RandomizationEngine) -> f32 {
        engine.uniform(self.min, self.max)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(PumpkinError::out_of_range(name, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(PumpkinError::out_of_range(
                name,
                format!("min {} is greater than max {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Complete style: body, stem, face, mouth, cutters, finish and layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub body: BodyStyle,
    pub stem: StemStyle,
    pub face: FaceStyle,
    pub mouth: MouthConfig,
    pub cutters: CutterStyle,
    pub finish: FinishStyle,
    pub layout: LayoutStyle,
}

/// Body construction (spheroid, dimples, ridges, smoothing, wall)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyStyle {
    pub radius: f32,
    /// Longitude divisions; also the number of ridges
    pub segments: u32,
    /// Latitude bands
    pub rings: u32,
    /// Vertical squash of the spheroid
    pub aspect_y: f32,
    /// Latitude rows (plus the pole) flattened at each end
    pub pole_rings: u32,
    /// Vertical scale applied to the pole regions
    pub pole_flatten: f32,
    /// Vertical move of the top pole (negative pulls it in)
    pub top_dimple: f32,
    /// Vertical move of the bottom pole (positive pushes it in)
    pub bottom_dimple: f32,
    pub falloff_radius: f32,
    pub falloff_curve: FalloffCurve,
    pub falloff_mode: FalloffMode,
    /// Offset of the duplicated ridge loops, as a fraction of the segment angle
    pub ridge_offset: f32,
    /// Scale applied to each original meridian loop about its centroid
    pub ridge_scale: f32,
    pub smooth_levels: u32,
    pub wall_thickness: f32,
}

impl Default for BodyStyle {
    fn default() -> Self {
        Self {
            radius: 1.0,
            segments: 11,
            rings: 11,
            aspect_y: 0.8,
            pole_rings: 2,
            pole_flatten: 0.93,
            top_dimple: -0.4,
            bottom_dimple: 0.24,
            falloff_radius: 0.53,
            falloff_curve: FalloffCurve::Smooth,
            falloff_mode: FalloffMode::Surface,
            ridge_offset: 0.1,
            ridge_scale: 0.9,
            smooth_levels: 1,
            wall_thickness: 0.04,
        }
    }
}

/// Stem and base cap construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemStyle {
    pub radius: f32,
    pub height: f32,
    pub segments: u32,
    pub height_segments: u32,
    /// Uniform scale applied to the raw cylinder
    pub scale: f32,
    /// Height of the stem centre
    pub y: f32,
    /// Downward move of the middle edge ring
    pub middle_nudge: f32,
    pub flare_x: UniformRange,
    pub flare_y: f32,
    pub flare_z: UniformRange,
    /// Tilt of the top cap about X, in degrees
    pub tilt: UniformRange,
    pub extrude_x: UniformRange,
    pub extrude_y: UniformRange,
    pub extrude_z: UniformRange,
    pub bottom_crease: f32,
    pub top_crease: f32,
    pub smooth_levels: u32,
    pub cap_radius: f32,
    pub cap_segments: u32,
    pub cap_rings: u32,
    pub cap_y: f32,
    pub cap_flatten: f32,
}

impl Default for StemStyle {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height: 2.0,
            segments: 10,
            height_segments: 2,
            scale: 0.12,
            y: 0.67,
            middle_nudge: 0.07,
            flare_x: UniformRange::new(2.0, 2.2),
            flare_y: 2.0,
            flare_z: UniformRange::new(2.0, 2.2),
            tilt: UniformRange::new(-45.0, 45.0),
            extrude_x: UniformRange::new(0.01, 0.03),
            extrude_y: UniformRange::new(0.1, 0.2),
            extrude_z: UniformRange::new(0.01, 0.03),
            bottom_crease: 10.0,
            top_crease: 5.0,
            smooth_levels: 1,
            cap_radius: 0.1,
            cap_segments: 20,
            cap_rings: 10,
            cap_y: -0.51,
            cap_flatten: 0.4,
        }
    }
}

/// Cutter scales `[vertical, horizontal]` per eye shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeScales {
    pub circle_left: [f32; 2],
    pub circle_right: [f32; 2],
    pub rectangle: [f32; 2],
    pub triangle: [f32; 2],
}

impl Default for EyeScales {
    fn default() -> Self {
        Self {
            circle_left: [2.0, 2.0],
            circle_right: [2.5, 2.0],
            rectangle: [2.0, 2.5],
            triangle: [2.0, 2.5],
        }
    }
}

/// Eyes, eyebrows and nose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceStyle {
    pub eye_y: UniformRange,
    pub left_eye_z: UniformRange,
    pub right_eye_z: UniformRange,
    pub eye_scales: EyeScales,
    pub eyebrow_rise: UniformRange,
    pub eyebrow_jitter: UniformRange,
    /// Eyebrow tilt in degrees (left negated, right as drawn)
    pub eyebrow_angle: UniformRange,
    pub eyebrow_scale: [f32; 2],
    pub nose_y: UniformRange,
    pub nose_rotation: UniformRange,
    pub nose_scale: UniformRange,
    /// Added to one nose axis to make it oblong
    pub nose_stretch: f32,
}

impl Default for FaceStyle {
    fn default() -> Self {
        Self {
            eye_y: UniformRange::new(0.75, 0.81),
            left_eye_z: UniformRange::new(0.0, 0.25),
            right_eye_z: UniformRange::new(0.75, 1.0),
            eye_scales: EyeScales::default(),
            eyebrow_rise: UniformRange::new(0.20, 0.21),
            eyebrow_jitter: UniformRange::new(-0.05, 0.1),
            eyebrow_angle: UniformRange::new(0.0, 45.0),
            eyebrow_scale: [0.5, 2.0],
            nose_y: UniformRange::new(0.5, 0.75),
            nose_rotation: UniformRange::new(0.0, 180.0),
            nose_scale: UniformRange::new(1.9, 2.2),
            nose_stretch: 0.5,
        }
    }
}

/// Mouth pattern ranges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouthConfig {
    pub baseline: UniformRange,
    /// Minimum gap between baseline and top
    pub top_gap: f32,
    /// Upper bound of the mouth top
    pub top_max: f32,
    /// Odd cut counts are drawn from `[cuts_min, cuts_max]`
    pub cuts_min: u32,
    pub cuts_max: u32,
    pub separated_scale: UniformRange,
    pub separated_spacing: f32,
    pub combined_scale: UniformRange,
    pub combined_spacing: f32,
    /// Horizontal offset of the central cut from the eye midpoint
    pub center_offset: f32,
    /// Central cut size relative to the base scale
    pub center_scale: f32,
    /// Shared rotation of the side cuts, in degrees
    pub rotation: UniformRange,
}

impl Default for MouthConfig {
    fn default() -> Self {
        Self {
            baseline: UniformRange::new(0.0, 0.1),
            top_gap: 0.1,
            top_max: 0.3,
            cuts_min: 5,
            cuts_max: 7,
            separated_scale: UniformRange::new(1.0, 1.3),
            separated_spacing: 0.07,
            combined_scale: UniformRange::new(0.5, 0.8),
            combined_spacing: 0.08,
            center_offset: 0.035,
            center_scale: 1.5,
            rotation: UniformRange::new(0.0, 20.0),
        }
    }
}

/// Cutter primitive dimensions, before placement scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterStyle {
    /// Outward depth the cutters are centred at
    pub depth: f32,
    pub circle_radius: f32,
    pub circle_length: f32,
    pub circle_segments: u32,
    pub prism_side: f32,
    pub prism_length: f32,
    /// Cuboid extents `[depth, height, width]`
    pub cuboid: [f32; 3],
}

impl Default for CutterStyle {
    fn default() -> Self {
        Self {
            depth: 1.0,
            circle_radius: 0.05,
            circle_length: 1.5,
            circle_segments: 5,
            prism_side: 0.1,
            prism_length: 1.0,
            cuboid: [1.3, 0.1, 0.1],
        }
    }
}

/// Remesh, final scale and light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinishStyle {
    /// Longest edge allowed on the body before carving
    pub remesh_edge: f32,
    pub overall_scale: UniformRange,
    /// Per-axis jitter added to the overall scale
    pub jitter: UniformRange,
    pub light_color: [f32; 3],
    pub light_intensity: f32,
}

impl Default for FinishStyle {
    fn default() -> Self {
        Self {
            remesh_edge: 0.25,
            overall_scale: UniformRange::new(0.7, 1.4),
            jitter: UniformRange::new(-0.1, 0.15),
            light_color: [1.0, 0.51, 0.18],
            light_intensity: 5.0,
        }
    }
}

/// Batch grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutStyle {
    pub row_width: u32,
    pub spacing: f32,
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            row_width: 3,
            spacing: 2.7,
        }
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PumpkinError::out_of_range(name, format!("must be > 0, got {value}")))
    }
}

fn finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PumpkinError::out_of_range(name, "must be finite"))
    }
}

impl StyleConfig {
    /// Reject ranges that cannot produce a valid pumpkin
    ///
    /// Resolutions are left to the kernel, which reports them as geometry
    /// construction failures for the pumpkin being built.
    pub fn validate(&self) -> Result<()> {
        let b = &self.body;
        positive("body.radius", b.radius)?;
        positive("body.aspect_y", b.aspect_y)?;
        positive("body.pole_flatten", b.pole_flatten)?;
        positive("body.falloff_radius", b.falloff_radius)?;
        positive("body.ridge_scale", b.ridge_scale)?;
        positive("body.wall_thickness", b.wall_thickness)?;
        finite("body.top_dimple", b.top_dimple)?;
        finite("body.bottom_dimple", b.bottom_dimple)?;
        if !(0.0..0.5).contains(&b.ridge_offset) {
            return Err(PumpkinError::out_of_range(
                "body.ridge_offset",
                "must lie in [0, 0.5) of the segment angle",
            ));
        }

        let s = &self.stem;
        positive("stem.radius", s.radius)?;
        positive("stem.height", s.height)?;
        positive("stem.scale", s.scale)?;
        positive("stem.flare_y", s.flare_y)?;
        positive("stem.cap_radius", s.cap_radius)?;
        positive("stem.cap_flatten", s.cap_flatten)?;
        finite("stem.y", s.y)?;
        finite("stem.middle_nudge", s.middle_nudge)?;
        finite("stem.cap_y", s.cap_y)?;
        for (name, range) in [
            ("stem.flare_x", &s.flare_x),
            ("stem.flare_z", &s.flare_z),
            ("stem.tilt", &s.tilt),
            ("stem.extrude_x", &s.extrude_x),
            ("stem.extrude_y", &s.extrude_y),
            ("stem.extrude_z", &s.extrude_z),
        ] {
            range.validate(name)?;
        }
        if s.flare_x.min <= 0.0 || s.flare_z.min <= 0.0 {
            return Err(PumpkinError::out_of_range("stem.flare", "flare factors must be > 0"));
        }

        let f = &self.face;
        for (name, range) in [
            ("face.eye_y", &f.eye_y),
            ("face.left_eye_z", &f.left_eye_z),
            ("face.right_eye_z", &f.right_eye_z),
            ("face.eyebrow_rise", &f.eyebrow_rise),
            ("face.eyebrow_jitter", &f.eyebrow_jitter),
            ("face.eyebrow_angle", &f.eyebrow_angle),
            ("face.nose_y", &f.nose_y),
            ("face.nose_rotation", &f.nose_rotation),
            ("face.nose_scale", &f.nose_scale),
        ] {
            range.validate(name)?;
        }
        if f.left_eye_z.max > f.right_eye_z.min {
            return Err(PumpkinError::out_of_range(
                "face.left_eye_z",
                "left eye range must lie left of the right eye range",
            ));
        }

        let m = &self.mouth;
        for (name, range) in [
            ("mouth.baseline", &m.baseline),
            ("mouth.separated_scale", &m.separated_scale),
            ("mouth.combined_scale", &m.combined_scale),
            ("mouth.rotation", &m.rotation),
        ] {
            range.validate(name)?;
        }
        positive("mouth.top_gap", m.top_gap)?;
        if m.baseline.max + m.top_gap > m.top_max {
            return Err(PumpkinError::out_of_range(
                "mouth.top_max",
                "must leave room for top_gap above the highest baseline",
            ));
        }
        if m.cuts_min > m.cuts_max || (m.cuts_min | 1) > m.cuts_max {
            return Err(PumpkinError::out_of_range(
                "mouth.cuts_min",
                format!("no odd cut count in [{}, {}]", m.cuts_min, m.cuts_max),
            ));
        }
        if m.cuts_min < 3 {
            return Err(PumpkinError::out_of_range(
                "mouth.cuts_min",
                "at least 3 cuts are needed for one level",
            ));
        }
        positive("mouth.separated_spacing", m.separated_spacing)?;
        positive("mouth.combined_spacing", m.combined_spacing)?;
        positive("mouth.center_scale", m.center_scale)?;
        if m.separated_scale.min <= 0.0 || m.combined_scale.min <= 0.0 {
            return Err(PumpkinError::out_of_range("mouth.scale", "base scales must be > 0"));
        }

        let c = &self.cutters;
        positive("cutters.circle_radius", c.circle_radius)?;
        positive("cutters.circle_length", c.circle_length)?;
        positive("cutters.prism_side", c.prism_side)?;
        positive("cutters.prism_length", c.prism_length)?;
        for (axis, v) in c.cuboid.iter().enumerate() {
            positive(&format!("cutters.cuboid[{axis}]"), *v)?;
        }
        finite("cutters.depth", c.depth)?;

        let fin = &self.finish;
        positive("finish.remesh_edge", fin.remesh_edge)?;
        fin.overall_scale.validate("finish.overall_scale")?;
        fin.jitter.validate("finish.jitter")?;
        let smallest = fin.overall_scale.min + fin.jitter.min;
        if smallest <= 0.0 {
            return Err(PumpkinError::out_of_range(
                "finish.jitter",
                format!("overall_scale.min + jitter.min must be > 0, got {smallest}"),
            ));
        }
        finite("finish.light_intensity", fin.light_intensity)?;

        if self.layout.row_width == 0 {
            return Err(PumpkinError::out_of_range("layout.row_width", "must be >= 1"));
        }
        finite("layout.spacing", self.layout.spacing)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_style_is_valid() {
        StyleConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_smallest_scale_is_positive() {
        let finish = FinishStyle::default();
        let smallest = finish.overall_scale.min + finish.jitter.min;
        assert!((smallest - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let style: StyleConfig = toml::from_str(
            r#"
            [face]
            eye_y = { min = 0.7, max = 0.72 }

            [layout]
            row_width = 4
            "#,
        )
        .unwrap();
        assert_eq!(style.face.eye_y, UniformRange::new(0.7, 0.72));
        assert_eq!(style.layout.row_width, 4);
        assert_eq!(style.layout.spacing, 2.7);
        assert_eq!(style.body, BodyStyle::default());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let mut style = StyleConfig::default();
        style.face.nose_y = UniformRange::new(0.9, 0.1);
        let err = style.validate().unwrap_err();
        assert!(err.to_string().contains("face.nose_y"));
    }

    #[test]
    fn test_non_positive_scale_rejected() {
        let mut style = StyleConfig::default();
        style.finish.jitter = UniformRange::new(-0.8, 0.1);
        assert!(matches!(
            style.validate(),
            Err(PumpkinError::ParameterOutOfRange { .. })
        ));
    }

    #[test]
    fn test_even_only_cut_range_rejected() {
        let mut style = StyleConfig::default();
        style.mouth.cuts_min = 6;
        style.mouth.cuts_max = 6;
        assert!(style.validate().is_err());
    }
}
