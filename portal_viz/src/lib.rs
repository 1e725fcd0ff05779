//! # portal_viz
//!
//! Two-hand portal visualizer built on [`gesture_core`].  Trace a circle
//! with the right index finger while the left hand is in view, and a
//! glowing portal charges up, opens, and throws sparks.  Clench either hand
//! into a fist to collapse it.
//!
//! ## Gesture → Effect mapping
//!
//! | Gesture | Hand | Effect |
//! |---|---|---|
//! | Move index fingertip | Right | Draws the trail |
//! | Trace a circle | Right, with Left present | Charges stability; portal grows |
//! | Strong circle (score > 0.5) | Right, with Left present | Sparks fly off the ring |
//! | Fist | Either | Portal drains fast and closes |
//! | Hand leaves view | Right | Trail wiped immediately |
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse is the right index finger.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Right index fingertip (leave the window to lose the hand) |
//! | `L` | Show / hide the left hand |
//! | `F` (hold) | Clench both hands into fists |
//! | `C` | Auto-trace a circle |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod source;
pub mod portal;
pub mod visualizer;
pub mod app;
