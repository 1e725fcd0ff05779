//! Per-hand presence and landmark state for exactly two hands.
//!
//! The right hand draws; the left hand stabilizes.  The aggregator keeps
//! one [`HandEntry`] per side and re-derives two global flags after every
//! update:
//!
//! * `present` — at least one hand is tracked;
//! * `is_fist` — either hand's current landmarks form a fist.
//!
//! Fist detection re-runs on **both** hands every time either one changes,
//! so the flag always reflects the latest snapshot of the pair.

use std::fmt;
use std::str::FromStr;

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::FistConfig;
use crate::error::{GestureError, Result};
use crate::geometry::Landmark;
use crate::skeleton::{FOLD_TIPS, LANDMARK_COUNT, MIDDLE_MCP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// HandSide
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandSide {
    Left,
    Right,
}

impl HandSide {
    pub const ALL: [HandSide; 2] = [HandSide::Right, HandSide::Left];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandSide::Left  => "left",
            HandSide::Right => "right",
        }
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses detector handedness labels (`"Left"` / `"Right"`, any case).
impl FromStr for HandSide {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        if label.eq_ignore_ascii_case("left") {
            Ok(HandSide::Left)
        } else if label.eq_ignore_ascii_case("right") {
            Ok(HandSide::Right)
        } else {
            Err(GestureError::UnknownHandedness(s.to_string()))
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandEntry
// ════════════════════════════════════════════════════════════════════════════

/// Tracking state of one hand.
///
/// `x`/`y` are left stale when the hand is lost; check `present` first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandEntry {
    pub present:   bool,
    pub x:         f32,
    pub y:         f32,
    /// Empty, or exactly 21 landmarks.
    pub landmarks: Vec<Landmark>,
}

impl HandEntry {
    fn mark_absent(&mut self) {
        self.present = false;
        self.landmarks.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Fist detection
// ════════════════════════════════════════════════════════════════════════════

/// True when all four tracked fingertips are curled toward the wrist.
///
/// Uses the default [`FistConfig`].  Fewer than 21 landmarks is never a fist.
pub fn detect_fist(landmarks: &[Landmark]) -> bool {
    detect_fist_with(landmarks, &FistConfig::default())
}

/// Fist detection with explicit thresholds.
///
/// The wrist → middle-MCP distance is the hand's scale reference, so the
/// test is independent of how far the hand is from the camera.
pub fn detect_fist_with(landmarks: &[Landmark], cfg: &FistConfig) -> bool {
    if landmarks.len() < LANDMARK_COUNT {
        return false;
    }
    let wrist = &landmarks[WRIST];
    let palm = wrist.distance(&landmarks[MIDDLE_MCP]);
    let threshold = palm * cfg.fold_ratio;

    let folded = FOLD_TIPS.iter()
        .filter(|&&tip| wrist.distance(&landmarks[tip]) < threshold)
        .count();

    trace!("fist check: palm={:.3} threshold={:.3} folded={}", palm, threshold, folded);
    folded >= cfg.required_folded
}

// ════════════════════════════════════════════════════════════════════════════
// HandStateAggregator
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct HandStateAggregator {
    right:   HandEntry,
    left:    HandEntry,
    present: bool,
    is_fist: bool,
    fist:    FistConfig,
}

impl HandStateAggregator {
    pub fn new(fist: FistConfig) -> Self {
        HandStateAggregator { fist, ..Default::default() }
    }

    /// Record the latest observation for one hand and refresh the global
    /// flags.
    ///
    /// When `present` is false the entry's landmarks are cleared and `x`/`y`
    /// are left untouched.  A present hand with a non-finite position, a
    /// landmark count other than 0 or 21, or any non-finite landmark is
    /// rejected: the entry is marked absent exactly as if the hand had been
    /// lost, the global flags are refreshed, and the reason is returned.
    pub fn update_hand_entry(
        &mut self,
        side: HandSide,
        x: f32,
        y: f32,
        present: bool,
        landmarks: Vec<Landmark>,
    ) -> Result<()> {
        let outcome = if present {
            validate(side, x, y, &landmarks)
        } else {
            Ok(())
        };

        let entry = self.entry_mut(side);
        match outcome {
            Ok(()) if present => {
                entry.present   = true;
                entry.x         = x;
                entry.y         = y;
                entry.landmarks = landmarks;
            }
            Ok(()) => entry.mark_absent(),
            Err(ref e) => {
                warn!("rejecting {} hand update: {}", side, e);
                entry.mark_absent();
            }
        }

        self.refresh_globals();
        outcome
    }

    fn refresh_globals(&mut self) {
        self.present = self.right.present || self.left.present;
        let fist_on = |e: &HandEntry| e.present && detect_fist_with(&e.landmarks, &self.fist);
        self.is_fist = fist_on(&self.right) || fist_on(&self.left);
    }

    pub fn entry(&self, side: HandSide) -> &HandEntry {
        match side {
            HandSide::Right => &self.right,
            HandSide::Left  => &self.left,
        }
    }

    fn entry_mut(&mut self, side: HandSide) -> &mut HandEntry {
        match side {
            HandSide::Right => &mut self.right,
            HandSide::Left  => &mut self.left,
        }
    }

    pub fn right(&self)   -> &HandEntry { &self.right }
    pub fn left(&self)    -> &HandEntry { &self.left }
    pub fn present(&self) -> bool       { self.present }
    pub fn is_fist(&self) -> bool       { self.is_fist }
}

fn validate(side: HandSide, x: f32, y: f32, landmarks: &[Landmark]) -> Result<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(GestureError::NonFinitePosition { side });
    }
    if !landmarks.is_empty() && landmarks.len() != LANDMARK_COUNT {
        return Err(GestureError::MalformedLandmarks { side, len: landmarks.len() });
    }
    if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
        return Err(GestureError::NonFiniteLandmark { side, index });
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
