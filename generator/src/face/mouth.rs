//! Mouth parameters and the level-based cut pattern

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CutShape;
use crate::error::{PumpkinError, Result};
use crate::random::RandomizationEngine;
use crate::style::StyleConfig;

/// Emotion of the mouth curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouthShape {
    /// Corners rise toward the top
    Happy,
    /// Corners drop toward the baseline
    Sad,
    /// Flat along the baseline
    Neutral,
}

impl MouthShape {
    pub const ALL: [MouthShape; 3] = [MouthShape::Happy, MouthShape::Sad, MouthShape::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            MouthShape::Happy => "happy",
            MouthShape::Sad => "sad",
            MouthShape::Neutral => "neutral",
        }
    }
}

impl fmt::Display for MouthShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MouthShape {
    type Err = PumpkinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(MouthShape::Happy),
            "sad" => Ok(MouthShape::Sad),
            "neutral" => Ok(MouthShape::Neutral),
            other => Err(PumpkinError::out_of_range(
                "mouth_shape",
                format!("unknown mouth shape `{other}` (expected happy, sad or neutral)"),
            )),
        }
    }
}

/// How cut size changes from the centre to the corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouthStyle {
    /// Cuts shrink toward the corners
    Smaller,
    /// Cuts grow toward the corners
    Larger,
}

/// One side cut of the mouth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouthCut {
    /// Position in the cut sequence
    pub i: u32,
    /// Signed slot offset from the centre, in units of the spacing
    pub j: i32,
    /// Level reached so far; rises on every even `i`
    pub level: u32,
    pub y: f32,
    pub z: f32,
    pub size: f32,
}

/// Drawn mouth pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouthParameters {
    pub shape: MouthShape,
    pub cut_shape: CutShape,
    pub baseline: f32,
    pub top: f32,
    /// Odd cut count; the pattern places `number_cuts + 1` side cuts
    pub number_cuts: u32,
    pub separated: bool,
    pub base_scale: f32,
    pub spacing: f32,
    pub style: MouthStyle,
    pub rotation: f32,
}

impl MouthParameters {
    /// Draw a mouth whose emotion comes from `enabled`
    pub fn draw(
        engine: &mut RandomizationEngine,
        style: &StyleConfig,
        enabled: &[MouthShape],
    ) -> Result<Self> {
        let cfg = &style.mouth;

        let shape = *engine.choice(enabled)?;
        let cut_shape = *engine.choice(&CutShape::ALL)?;
        let baseline = cfg.baseline.draw(engine);
        let top = engine.uniform(baseline + cfg.top_gap, cfg.top_max);
        let number_cuts = engine.odd_in_range(cfg.cuts_min, cfg.cuts_max)?;

        let separated = engine.boolean();
        let (base_scale, spacing) = if separated {
            (cfg.separated_scale.draw(engine), cfg.separated_spacing)
        } else {
            (cfg.combined_scale.draw(engine), cfg.combined_spacing)
        };

        let style = *engine.choice(&[MouthStyle::Smaller, MouthStyle::Larger])?;
        let rotation = cfg.rotation.draw(engine);

        Ok(Self {
            shape,
            cut_shape,
            baseline,
            top,
            number_cuts,
            separated,
            base_scale,
            spacing,
            style,
            rotation,
        })
    }

    pub fn total_levels(&self) -> u32 {
        (self.number_cuts - 1) / 2
    }

    /// Side cuts around `center_z`, alternating left and right
    ///
    /// Even steps open a new level on the left; odd steps mirror it on the
    /// right. The final level is `total_levels + 1`, so happy and sad mouths
    /// overshoot `top` and `baseline` by half a level at the outermost cut.
    pub fn cuts(&self, center_z: f32) -> Vec<MouthCut> {
        let total = self.total_levels().max(1) as f32;
        let rise = self.top - self.baseline;
        let mut level = 0u32;

        (0..=self.number_cuts)
            .map(|i| {
                let j = if i % 2 == 0 {
                    level += 1;
                    -(i as i32 + 1)
                } else {
                    i as i32 + 1
                };
                let t = level as f32 / total;
                let y = match self.shape {
                    MouthShape::Sad => self.top - t * rise,
                    MouthShape::Happy => self.baseline + t * rise,
                    MouthShape::Neutral => self.baseline,
                };
                let size = match self.style {
                    MouthStyle::Larger => self.base_scale + t,
                    MouthStyle::Smaller => {
                        2.0 * self.base_scale + (total - level as f32) / total
                    }
                };
                MouthCut {
                    i,
                    j,
                    level,
                    y,
                    z: center_z + j as f32 * self.spacing,
                    size,
                }
            })
            .collect()
    }
}
