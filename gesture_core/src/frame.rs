//! Per-frame orchestration: detector output in, published hand state out.
//!
//! One call per video frame, fully synchronous:
//!
//! 1. mirror every landmark (`x → 1 − x`) and route each detection to its
//!    hand by handedness label;
//! 2. mark hands with no detection absent — losing the right hand also
//!    wipes the trajectory, with no grace period;
//! 3. feed the right index fingertip, aspect-corrected, to the recognizer;
//! 4. score the trajectory, and zero the score unless the left
//!    (stabilizer) hand is present;
//! 5. write everything the renderer reads into [`HandData`].
//!
//! The published state is an explicit value owned by the caller and passed
//! in each frame, not a global.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::error::{GestureError, Result};
use crate::geometry::{Landmark, Point3};
use crate::hand_state::{HandEntry, HandSide, HandStateAggregator};
use crate::recognizer::{CircleGestureRecognizer, GestureResult};
use crate::skeleton::{INDEX_TIP, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// Input / output types
// ════════════════════════════════════════════════════════════════════════════

/// One hand as reported by the landmark detector, in raw camera space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    /// `"Left"` or `"Right"`.
    pub handedness: String,
    pub landmarks:  Vec<Landmark>,
}

impl HandDetection {
    pub fn new(handedness: impl Into<String>, landmarks: Vec<Landmark>) -> Self {
        HandDetection { handedness: handedness.into(), landmarks }
    }
}

/// Everything the renderer reads between ticks.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HandData {
    /// At least one hand tracked.
    pub present:       bool,
    pub right:         HandEntry,
    pub left:          HandEntry,
    /// Circle confidence, forced to 0 without the left hand.
    pub gesture_score: f32,
    pub is_gesturing:  bool,
    /// Either hand is a fist.
    pub is_fist:       bool,
}

// ════════════════════════════════════════════════════════════════════════════
// update_frame
// ════════════════════════════════════════════════════════════════════════════

/// Apply one detector frame to `hands` and `recognizer`, publishing into
/// `out`.  Returns the raw (ungated) recognizer result.
///
/// `viewport_aspect` is width / height of the display surface; a
/// non-finite or non-positive value is treated as 1.
pub fn update_frame(
    hands: &mut HandStateAggregator,
    recognizer: &mut CircleGestureRecognizer,
    detections: &[HandDetection],
    viewport_aspect: f32,
    mirror_x: bool,
    out: &mut HandData,
) -> GestureResult {
    let mut seen = [false; 2]; // [right, left]

    // ── 1. route detections ──────────────────────────────────────────────
    for det in detections {
        let side = match det.handedness.parse::<HandSide>() {
            Ok(s)  => s,
            Err(e) => { warn!("skipping detection: {}", e); continue; }
        };
        let idx = slot(side);
        if seen[idx] {
            debug!("duplicate {} hand in frame; keeping the first", side);
            continue;
        }
        seen[idx] = true;

        let landmarks: Vec<Landmark> = if mirror_x {
            det.landmarks.iter().map(Point3::mirrored).collect()
        } else {
            det.landmarks.clone()
        };
        let (x, y) = match fingertip(side, &landmarks) {
            Ok(tip) => tip,
            Err(e)  => {
                warn!("rejecting detection: {}", e);
                let _ = hands.update_hand_entry(side, 0.0, 0.0, false, Vec::new());
                continue;
            }
        };
        // Rejections are logged inside and leave the hand absent.
        let _ = hands.update_hand_entry(side, x, y, true, landmarks);
    }

    // ── 2. lost hands ────────────────────────────────────────────────────
    for side in HandSide::ALL {
        if !seen[slot(side)] {
            let _ = hands.update_hand_entry(side, 0.0, 0.0, false, Vec::new());
        }
    }

    let right_present = hands.right().present;
    let left_present  = hands.left().present;

    // ── 3. trajectory ────────────────────────────────────────────────────
    if right_present {
        let aspect = if viewport_aspect.is_finite() && viewport_aspect > 0.0 {
            viewport_aspect
        } else {
            1.0
        };
        let r = hands.right();
        recognizer.add_point(Point3::new(r.x * aspect, r.y, 0.0));
    } else if !recognizer.is_empty() {
        debug!("right hand lost; clearing {} trajectory points", recognizer.len());
        recognizer.clear();
    }

    // ── 4. score + two-hand gate ─────────────────────────────────────────
    let gesture = recognizer.detect_circle();
    let final_score = if left_present { gesture.score } else { 0.0 };

    // ── 5. publish ───────────────────────────────────────────────────────
    out.present       = hands.present();
    out.right.clone_from(hands.right());
    out.left.clone_from(hands.left());
    out.is_fist       = hands.is_fist();
    out.gesture_score = final_score;
    out.is_gesturing  = gesture.is_circle && left_present;

    gesture
}

/// Tracked position of a detected hand: its index fingertip.  A detector
/// frame must carry the full skeleton.
fn fingertip(side: HandSide, landmarks: &[Landmark]) -> Result<(f32, f32)> {
    if landmarks.len() != LANDMARK_COUNT {
        return Err(GestureError::MalformedLandmarks { side, len: landmarks.len() });
    }
    let tip = landmarks[INDEX_TIP];
    Ok((tip.x, tip.y))
}

fn slot(side: HandSide) -> usize {
    match side {
        HandSide::Right => 0,
        HandSide::Left  => 1,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameUpdatePolicy
// ════════════════════════════════════════════════════════════════════════════

/// Owns the session-lifetime aggregator and recognizer and applies
/// [`update_frame`] to them.
#[derive(Clone, Debug)]
pub struct FrameUpdatePolicy {
    hands:      HandStateAggregator,
    recognizer: CircleGestureRecognizer,
    mirror_x:   bool,
}

impl Default for FrameUpdatePolicy {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl FrameUpdatePolicy {
    pub fn new(cfg: TrackerConfig) -> Self {
        FrameUpdatePolicy {
            hands:      HandStateAggregator::new(cfg.fist),
            recognizer: CircleGestureRecognizer::new(cfg.recognizer),
            mirror_x:   cfg.mirror_x,
        }
    }

    pub fn apply(
        &mut self,
        detections: &[HandDetection],
        viewport_aspect: f32,
        out: &mut HandData,
    ) -> GestureResult {
        update_frame(
            &mut self.hands,
            &mut self.recognizer,
            detections,
            viewport_aspect,
            self.mirror_x,
            out,
        )
    }

    pub fn hands(&self)      -> &HandStateAggregator     { &self.hands }
    pub fn recognizer(&self) -> &CircleGestureRecognizer { &self.recognizer }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
