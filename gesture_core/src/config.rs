//! Tunable thresholds for the recognizer and the fist detector.
//!
//! Every field has a default matching the tuned values; a JSON config file
//! only needs to name the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};

// ════════════════════════════════════════════════════════════════════════════
// RecognizerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Thresholds for [`CircleGestureRecognizer`](crate::CircleGestureRecognizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Trajectory buffer size (≈ 1.5 s at 30 fps).
    pub capacity:         usize,
    /// Minimum buffered points before any detection is attempted.
    pub min_points:       usize,
    /// Minimum mean radius, in normalized units.
    pub min_radius:       f32,
    /// Accepted bounding-box width/height range.
    pub min_aspect:       f32,
    pub max_aspect:       f32,
    /// `circle_error` below this counts as a circle.
    pub circle_threshold: f32,
    /// `circle_error` at which the graded score reaches zero.
    pub score_falloff:    f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        RecognizerConfig {
            capacity:         40,
            min_points:       20,
            min_radius:       0.05,
            min_aspect:       0.5,
            max_aspect:       2.0,
            circle_threshold: 0.25,
            score_falloff:    0.3,
        }
    }
}

impl RecognizerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_points == 0 {
            return Err(invalid("min_points must be at least 1"));
        }
        if self.min_points > self.capacity {
            return Err(invalid(format!(
                "min_points ({}) exceeds capacity ({})",
                self.min_points, self.capacity
            )));
        }
        if !(self.min_radius > 0.0) {
            return Err(invalid("min_radius must be positive"));
        }
        if !(self.min_aspect > 0.0) || !(self.min_aspect <= self.max_aspect) {
            return Err(invalid(format!(
                "aspect range [{}, {}] is empty or non-positive",
                self.min_aspect, self.max_aspect
            )));
        }
        if !(self.circle_threshold > 0.0) || !(self.score_falloff > 0.0) {
            return Err(invalid("circle_threshold and score_falloff must be positive"));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FistConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FistConfig {
    /// A fingertip is folded when closer to the wrist than
    /// `fold_ratio × |wrist − middle MCP|`.
    pub fold_ratio:      f32,
    /// How many of the four tracked fingertips must be folded.
    pub required_folded: usize,
}

impl Default for FistConfig {
    fn default() -> Self {
        FistConfig { fold_ratio: 1.5, required_folded: 4 }
    }
}

impl FistConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.fold_ratio > 0.0) || !self.fold_ratio.is_finite() {
            return Err(invalid("fold_ratio must be a positive finite number"));
        }
        if !(1..=4).contains(&self.required_folded) {
            return Err(invalid(format!(
                "required_folded must be 1–4, got {}",
                self.required_folded
            )));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerConfig
// ════════════════════════════════════════════════════════════════════════════

/// Everything [`FrameUpdatePolicy`](crate::FrameUpdatePolicy) needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub recognizer: RecognizerConfig,
    pub fist:       FistConfig,
    /// Mirror raw detector x (`x → 1 − x`) before use.
    pub mirror_x:   bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            recognizer: RecognizerConfig::default(),
            fist:       FistConfig::default(),
            mirror_x:   true,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        self.recognizer.validate()?;
        self.fist.validate()
    }
}

fn invalid(msg: impl Into<String>) -> GestureError {
    GestureError::InvalidConfig(msg.into())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RecognizerConfig::default().validate().is_ok());
        assert!(FistConfig::default().validate().is_ok());
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn min_points_above_capacity_rejected() {
        let cfg = RecognizerConfig { capacity: 10, min_points: 20, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(GestureError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_aspect_range_rejected() {
        let cfg = RecognizerConfig { min_aspect: 3.0, max_aspect: 2.0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn nan_radius_rejected() {
        let cfg = RecognizerConfig { min_radius: f32::NAN, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn required_folded_out_of_range() {
        let cfg = FistConfig { required_folded: 5, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = FistConfig { required_folded: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: TrackerConfig =
            serde_json::from_str(r#"{ "recognizer": { "min_radius": 0.08 } }"#).unwrap();
        assert_eq!(cfg.recognizer.min_radius, 0.08);
        assert_eq!(cfg.recognizer.capacity, 40);
        assert_eq!(cfg.fist, FistConfig::default());
        assert!(cfg.mirror_x);
    }
}
