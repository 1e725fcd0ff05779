//! The 21-point hand skeleton.
//!
//! Index layout follows the common hand-landmark convention:
//!
//! ```text
//!            8   12  16  20        fingertips
//!            |   |   |   |
//!            7   11  15  19
//!        4   6   10  14  18
//!        |   |   |   |   |
//!        3   5───9───13──17        MCP knuckles
//!        2    \          /
//!         1    \        /
//!          \____\______/
//!                 0                wrist
//! ```
//!
//! [`synthetic_hand`] builds plausible skeletons for the keyboard/mouse
//! simulator and for tests.

use crate::geometry::{Landmark, Point2, Point3};

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_TIP:  usize = 20;

/// Fingertips considered by fist detection.  The thumb tip is left out:
/// its folded position overlaps the open-hand position too often.
pub const FOLD_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Pose used by [`synthetic_hand`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    Open,
    Fist,
}

// Horizontal offsets of the four fingers, in palm units.
const FINGER_DX: [f32; 4] = [-0.30, 0.0, 0.25, 0.48];

// Joint heights above the wrist (MCP, PIP, DIP, tip), in palm units.
// Image y grows downward, so "above" is negative.
const OPEN_DY: [f32; 4] = [-1.0, -1.4, -1.7, -2.0];
const FIST_DY: [f32; 4] = [-1.0, -1.3, -1.0, -0.8];

const THUMB_OPEN: [(f32, f32); 4] = [(-0.20, -0.20), (-0.40, -0.45), (-0.55, -0.70), (-0.65, -0.95)];
const THUMB_FIST: [(f32, f32); 4] = [(-0.20, -0.20), (-0.40, -0.45), (-0.35, -0.70), (-0.20, -0.80)];

/// Build a flat (z = 0) 21-point hand whose index fingertip sits at
/// `index_tip`.
///
/// `palm` is the wrist → middle-MCP distance in normalized units, so the
/// fist detector's reference scale equals `palm` exactly.
pub fn synthetic_hand(index_tip: Point2, palm: f32, pose: HandPose) -> Vec<Landmark> {
    let (finger_dy, thumb) = match pose {
        HandPose::Open => (&OPEN_DY, &THUMB_OPEN),
        HandPose::Fist => (&FIST_DY, &THUMB_FIST),
    };

    let wrist = Point2::new(
        index_tip.x - FINGER_DX[0] * palm,
        index_tip.y - finger_dy[3] * palm,
    );
    let at = |dx: f32, dy: f32| Point3::new(wrist.x + dx * palm, wrist.y + dy * palm, 0.0);

    let mut hand = Vec::with_capacity(LANDMARK_COUNT);
    hand.push(at(0.0, 0.0));
    for &(dx, dy) in thumb.iter() {
        hand.push(at(dx, dy));
    }
    for &dx in FINGER_DX.iter() {
        for &dy in finger_dy.iter() {
            hand.push(at(dx, dy));
        }
    }
    hand
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_hand_has_full_skeleton() {
        let h = synthetic_hand(Point2::new(0.5, 0.5), 0.1, HandPose::Open);
        assert_eq!(h.len(), LANDMARK_COUNT);
        let f = synthetic_hand(Point2::new(0.5, 0.5), 0.1, HandPose::Fist);
        assert_eq!(f.len(), LANDMARK_COUNT);
    }

    #[test]
    fn index_tip_is_anchored() {
        for pose in [HandPose::Open, HandPose::Fist] {
            let h = synthetic_hand(Point2::new(0.3, 0.6), 0.08, pose);
            assert!((h[INDEX_TIP].x - 0.3).abs() < 1e-6);
            assert!((h[INDEX_TIP].y - 0.6).abs() < 1e-6);
        }
    }

    #[test]
    fn palm_reference_matches_scale() {
        let h = synthetic_hand(Point2::new(0.5, 0.5), 0.12, HandPose::Open);
        assert!((h[WRIST].distance(&h[MIDDLE_MCP]) - 0.12).abs() < 1e-6);
    }

    #[test]
    fn named_indices_match_layout() {
        let h = synthetic_hand(Point2::new(0.5, 0.5), 0.1, HandPose::Open);
        // Knuckles form one row, ordered thumb side to pinky side.
        let mcps = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
        for pair in mcps.windows(2) {
            assert!((h[pair[0]].y - h[pair[1]].y).abs() < 1e-6);
            assert!(h[pair[0]].x < h[pair[1]].x);
        }
        // The thumb tip sits outside the index finger.
        assert!(h[THUMB_TIP].x < h[INDEX_MCP].x);
    }

    #[test]
    fn fingertips_above_wrist_when_open() {
        let h = synthetic_hand(Point2::new(0.5, 0.5), 0.1, HandPose::Open);
        for tip in FOLD_TIPS {
            assert!(h[tip].y < h[WRIST].y);
        }
    }
}
