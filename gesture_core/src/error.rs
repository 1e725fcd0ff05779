//! Error types for hand-state updates and configuration.
//!
//! None of these are fatal: a rejected hand update leaves that hand marked
//! absent for the frame, and the next frame starts clean.

use thiserror::Error;

use crate::hand_state::HandSide;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    /// The detector reported a handedness label other than Left/Right.
    #[error("unknown handedness label {0:?}")]
    UnknownHandedness(String),

    /// A present hand carried a landmark array of the wrong length.
    #[error("{side} hand: malformed landmark array of length {len}")]
    MalformedLandmarks { side: HandSide, len: usize },

    /// A landmark contained NaN or an infinity.
    #[error("{side} hand: landmark {index} is not finite")]
    NonFiniteLandmark { side: HandSide, index: usize },

    /// The tracked (x, y) position was NaN or infinite.
    #[error("{side} hand: tracked position is not finite")]
    NonFinitePosition { side: HandSide },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GestureError>;
