//! # gesture_core
//!
//! Per-frame hand-state classification for a two-hand "portal" gesture:
//!
//! * the **right** hand's index fingertip traces a trajectory, and a
//!   [`CircleGestureRecognizer`] scores how closely that trajectory follows
//!   a circle;
//! * the **left** hand is the stabilizer — its mere presence is required
//!   for the gesture to count;
//! * either hand clenched into a fist raises a global fist flag that the
//!   renderer uses to collapse the portal.
//!
//! Everything here is single-threaded and cheap: one call to
//! [`FrameUpdatePolicy::apply`] per video frame, O(40) work.
//!
//! ## Data flow
//!
//! | Step | Component | Output |
//! |---|---|---|
//! | 1 | landmark detector (external) | `(handedness, 21 landmarks)` per hand |
//! | 2 | [`HandStateAggregator`] | per-hand presence, global presence, fist |
//! | 3 | [`CircleGestureRecognizer`] | [`GestureResult`] |
//! | 4 | [`FrameUpdatePolicy`] | published [`HandData`] |
//!
//! ## Quick start
//!
//! ```rust
//! use gesture_core::{FrameUpdatePolicy, HandData, HandDetection};
//! use gesture_core::skeleton::{synthetic_hand, HandPose};
//! use gesture_core::geometry::Point2;
//!
//! let mut policy = FrameUpdatePolicy::default();
//! let mut published = HandData::default();
//!
//! let hand = synthetic_hand(Point2::new(0.4, 0.5), 0.1, HandPose::Open);
//! let frame = vec![HandDetection::new("Right", hand)];
//!
//! policy.apply(&frame, 16.0 / 9.0, &mut published);
//! assert!(published.right.present);
//! assert_eq!(published.gesture_score, 0.0); // no left hand → no gesture
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod hand_state;
pub mod recognizer;
pub mod skeleton;

pub use config::{FistConfig, RecognizerConfig, TrackerConfig};
pub use error::GestureError;
pub use frame::{update_frame, FrameUpdatePolicy, HandData, HandDetection};
pub use geometry::{Landmark, Point2, Point3};
pub use hand_state::{detect_fist, HandEntry, HandSide, HandStateAggregator};
pub use recognizer::{CircleGestureRecognizer, GestureResult};
