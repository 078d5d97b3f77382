//! Per-pumpkin random parameters
//!
//! Everything random about one pumpkin is drawn here, in a fixed order,
//! before any geometry exists: stem, eyes, eyebrows, nose, mouth, then the
//! final scale.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::face::{FaceParameters, MouthParameters, MouthShape};
use crate::random::RandomizationEngine;
use crate::style::StyleConfig;

/// Stem flare, tilt and extrusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StemParameters {
    pub flare_x: f32,
    pub flare_z: f32,
    /// Top cap tilt about X, in degrees
    pub tilt_degrees: f32,
    pub extrude: [f32; 3],
}

impl StemParameters {
    pub fn draw(engine: &mut RandomizationEngine, style: &StyleConfig) -> Self {
        let s = &style.stem;
        let flare_x = s.flare_x.draw(engine);
        let flare_z = s.flare_z.draw(engine);
        let tilt_degrees = s.tilt.draw(engine);
        let extrude = [
            s.extrude_x.draw(engine),
            s.extrude_y.draw(engine),
            s.extrude_z.draw(engine),
        ];
        Self {
            flare_x,
            flare_z,
            tilt_degrees,
            extrude,
        }
    }
}

/// Overall scale plus per-axis jitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParameters {
    pub overall: f32,
    pub jitter: [f32; 3],
}

impl ScaleParameters {
    pub fn draw(engine: &mut RandomizationEngine, style: &StyleConfig) -> Self {
        let f = &style.finish;
        let overall = f.overall_scale.draw(engine);
        let jitter = [f.jitter.draw(engine), f.jitter.draw(engine), f.jitter.draw(engine)];
        Self { overall, jitter }
    }

    /// Final per-axis scale factors
    pub fn factors(&self) -> Vec3 {
        Vec3::splat(self.overall) + Vec3::from_array(self.jitter)
    }
}

/// All random choices for one pumpkin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpkinParameters {
    pub stem: StemParameters,
    pub face: FaceParameters,
    pub mouth: MouthParameters,
    pub scale: ScaleParameters,
}

impl PumpkinParameters {
    pub fn draw(
        engine: &mut RandomizationEngine,
        style: &StyleConfig,
        mouth_shapes: &[MouthShape],
    ) -> Result<Self> {
        let stem = StemParameters::draw(engine, style);
        let face = FaceParameters::draw(engine, style)?;
        let mouth = MouthParameters::draw(engine, style, mouth_shapes)?;
        let scale = ScaleParameters::draw(engine, style);
        Ok(Self {
            stem,
            face,
            mouth,
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_stream_same_parameters() {
        let style = StyleConfig::default();
        let a = PumpkinParameters::draw(
            &mut RandomizationEngine::for_pumpkin(99, 4),
            &style,
            &MouthShape::ALL,
        )
        .unwrap();
        let b = PumpkinParameters::draw(
            &mut RandomizationEngine::for_pumpkin(99, 4),
            &style,
            &MouthShape::ALL,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scale_factors_positive() {
        let style = StyleConfig::default();
        for seed in 0..200 {
            let mut engine = RandomizationEngine::from_seed(seed);
            let params = PumpkinParameters::draw(&mut engine, &style, &MouthShape::ALL).unwrap();
            let f = params.scale.factors();
            assert!(f.min_element() > 0.0, "seed {seed}: {f}");
        }
    }

    #[test]
    fn test_stem_ranges() {
        let style = StyleConfig::default();
        let mut engine = RandomizationEngine::from_seed(5);
        for _ in 0..100 {
            let stem = StemParameters::draw(&mut engine, &style);
            assert!((2.0..=2.2).contains(&stem.flare_x));
            assert!((-45.0..=45.0).contains(&stem.tilt_degrees));
            assert!((0.1..=0.2).contains(&stem.extrude[1]));
        }
    }
}
