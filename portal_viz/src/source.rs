//! Landmark sources — LeapMotion hardware or mouse/keyboard simulation.
//!
//! The public interface is [`SourceEvent`] delivered over a `mpsc` channel.
//! Each event carries one detector frame in raw camera space (x not yet
//! mirrored), exactly what a camera-based hand-landmark model would emit.
//! Consumers don't need to know whether frames came from hardware or the
//! simulator.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::debug;

use gesture_core::geometry::{Point2, Point3};
use gesture_core::skeleton::{synthetic_hand, HandPose};
use gesture_core::HandDetection;

// ════════════════════════════════════════════════════════════════════════════
// SourceEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SourceEvent {
    /// Zero, one, or two detected hands for one video frame.
    Frame(Vec<HandDetection>),

    /// Quit the application.
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SourceEvent`]s over a channel.
pub trait LandmarkSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>);
}

/// Spawn a landmark source on its own thread and return the receiving end.
pub fn spawn_landmark_source<S: LandmarkSource>(source: S) -> Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapLandmarkSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Landmark source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Leap reports bones in millimetres above the device.  Each hand is mapped
/// onto the 21-point skeleton (wrist, then four joints per digit from the
/// thumb outward) and normalised against a fixed interaction box:
///
/// * x ∈ [−200, 200] mm → [0, 1], then flipped into camera space;
/// * y ∈ [80, 480] mm  → [1, 0] (image y grows downward);
/// * z scaled by the same 400 mm span.
#[cfg(feature = "leap")]
pub struct LeapLandmarkSource;

#[cfg(feature = "leap")]
impl LandmarkSource for LeapLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                log::error!("failed to create LeapC connection: {:?}", e);
                let _ = tx.send(SourceEvent::Quit);
                return;
            }
        };
        if let Err(e) = connection.open() {
            log::error!("failed to open LeapMotion device: {:?}", e);
            let _ = tx.send(SourceEvent::Quit);
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<HandDetection> = frame.hands()
                    .map(|h| {
                        let label = match h.hand_type() {
                            HandType::Left  => "Left",
                            HandType::Right => "Right",
                        };
                        HandDetection::new(label, leap_skeleton(&h))
                    })
                    .collect();

                if tx.send(SourceEvent::Frame(hands)).is_err() { return; }
            }
        }
    }
}

#[cfg(feature = "leap")]
fn leap_skeleton(hand: &leaprs::Hand) -> Vec<gesture_core::Landmark> {
    let wrist = hand.arm().next_joint();
    let mut out = Vec::with_capacity(gesture_core::skeleton::LANDMARK_COUNT);
    out.push(leap_to_camera(wrist.x, wrist.y, wrist.z));
    for digit in hand.digits() {
        for bone in [digit.proximal(), digit.intermediate(), digit.distal()] {
            let j = bone.prev_joint();
            out.push(leap_to_camera(j.x, j.y, j.z));
        }
        let tip = digit.distal().next_joint();
        out.push(leap_to_camera(tip.x, tip.y, tip.z));
    }
    out
}

#[cfg(feature = "leap")]
fn leap_to_camera(x: f32, y: f32, z: f32) -> Point3 {
    const SPAN: f32 = 400.0;
    let user = Point3::new((x + 200.0) / SPAN, 1.0 - (y - 80.0) / SPAN, z / SPAN);
    user.mirrored()
}

// ════════════════════════════════════════════════════════════════════════════
// SimLandmarkSource — mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Cursor position in user-facing normalized coordinates, or `None`
    /// when the cursor left the window (right hand lost).
    Cursor(Option<(f32, f32)>),
    KeyDown(SimKey),
    KeyUp(SimKey),
    /// One video frame elapsed; emit a detector frame.
    FrameTick,
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ToggleLeft,     // L
    Fist,           // F (held)
    AutoCircle,     // C
    Quit,           // Q
}

/// Landmark source driven by [`SimInput`] events from the visualizer window.
pub struct SimLandmarkSource {
    pub rx:    Receiver<SimInput>,
    pub hands: SimHands,
}

impl LandmarkSource for SimLandmarkSource {
    fn run(self: Box<Self>, tx: Sender<SourceEvent>) {
        let SimLandmarkSource { rx, mut hands } = *self;
        for input in rx {
            if let Some(event) = hands.apply(input) {
                let quit = event == SourceEvent::Quit;
                if tx.send(event).is_err() || quit { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHands — synthetic hand state behind the simulator
// ════════════════════════════════════════════════════════════════════════════

/// Tracks simulated input and turns it into skeletons.
///
/// The right index fingertip follows the cursor (or, in auto-circle mode,
/// traces a circle that is round on screen).  The left hand sits still at
/// a fixed spot and can be toggled in and out of view.
#[derive(Clone, Debug)]
pub struct SimHands {
    cursor:       Option<Point2>,
    left_visible: bool,
    fist:         bool,
    auto_phase:   Option<f32>,
    palm:         f32,
    aspect:       f32,
}

const LEFT_ANCHOR:   Point2 = Point2::new(0.18, 0.55);
const AUTO_CENTER:   Point2 = Point2::new(0.62, 0.5);
const AUTO_RADIUS:   f32    = 0.22;
/// One revolution per trajectory buffer at the default capacity.
const AUTO_STEP:     f32    = std::f32::consts::TAU / 40.0;

impl SimHands {
    /// `palm` is the simulated hand scale; `aspect` is the window's
    /// width / height, used to keep the auto circle round on screen.
    pub fn new(palm: f32, aspect: f32) -> Self {
        SimHands {
            cursor:       None,
            left_visible: false,
            fist:         false,
            auto_phase:   None,
            palm,
            aspect,
        }
    }

    pub fn apply(&mut self, input: SimInput) -> Option<SourceEvent> {
        match input {
            SimInput::Cursor(pos) => {
                self.cursor = pos.map(|(x, y)| Point2::new(x, y));
                None
            }
            SimInput::KeyDown(SimKey::ToggleLeft) => {
                self.left_visible = !self.left_visible;
                debug!("sim: left hand {}", if self.left_visible { "shown" } else { "hidden" });
                None
            }
            SimInput::KeyDown(SimKey::Fist) => { self.fist = true;  None }
            SimInput::KeyUp(SimKey::Fist)   => { self.fist = false; None }
            SimInput::KeyDown(SimKey::AutoCircle) => {
                self.auto_phase = match self.auto_phase {
                    Some(_) => None,
                    None    => Some(0.0),
                };
                None
            }
            SimInput::KeyDown(SimKey::Quit) => Some(SourceEvent::Quit),
            SimInput::KeyUp(_) => None,
            SimInput::FrameTick => Some(SourceEvent::Frame(self.frame())),
        }
    }

    fn frame(&mut self) -> Vec<HandDetection> {
        let pose = if self.fist { HandPose::Fist } else { HandPose::Open };
        let mut hands = Vec::with_capacity(2);

        let right_tip = match self.auto_phase.as_mut() {
            Some(phase) => {
                let (sin, cos) = phase.sin_cos();
                *phase = (*phase + AUTO_STEP) % std::f32::consts::TAU;
                Some(Point2::new(
                    AUTO_CENTER.x + AUTO_RADIUS * cos / self.aspect,
                    AUTO_CENTER.y + AUTO_RADIUS * sin,
                ))
            }
            None => self.cursor,
        };

        if let Some(tip) = right_tip {
            hands.push(HandDetection::new("Right", to_camera(synthetic_hand(tip, self.palm, pose))));
        }
        if self.left_visible {
            hands.push(HandDetection::new("Left", to_camera(synthetic_hand(LEFT_ANCHOR, self.palm, pose))));
        }
        hands
    }
}

fn to_camera(user: Vec<Point3>) -> Vec<Point3> {
    user.iter().map(Point3::mirrored).collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_core::skeleton::INDEX_TIP;
    use gesture_core::{FrameUpdatePolicy, HandData};

    fn frame(h: &mut SimHands) -> Vec<HandDetection> {
        match h.apply(SimInput::FrameTick) {
            Some(SourceEvent::Frame(f)) => f,
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn no_cursor_no_hands() {
        let mut h = SimHands::new(0.07, 1.0);
        assert!(frame(&mut h).is_empty());
    }

    #[test]
    fn cursor_drives_right_hand_in_camera_space() {
        let mut h = SimHands::new(0.07, 1.0);
        h.apply(SimInput::Cursor(Some((0.3, 0.4))));
        let f = frame(&mut h);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].handedness, "Right");
        // Camera space is mirrored.
        assert!((f[0].landmarks[INDEX_TIP].x - 0.7).abs() < 1e-6);
        assert!((f[0].landmarks[INDEX_TIP].y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn toggle_left_adds_second_hand() {
        let mut h = SimHands::new(0.07, 1.0);
        h.apply(SimInput::KeyDown(SimKey::ToggleLeft));
        let f = frame(&mut h);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].handedness, "Left");
        h.apply(SimInput::KeyDown(SimKey::ToggleLeft));
        assert!(frame(&mut h).is_empty());
    }

    #[test]
    fn quit_key_emits_quit() {
        let mut h = SimHands::new(0.07, 1.0);
        assert_eq!(h.apply(SimInput::KeyDown(SimKey::Quit)), Some(SourceEvent::Quit));
    }

    #[test]
    fn held_fist_is_detected_downstream() {
        let mut h = SimHands::new(0.07, 1.0);
        let mut policy = FrameUpdatePolicy::default();
        let mut out = HandData::default();

        h.apply(SimInput::Cursor(Some((0.5, 0.5))));
        h.apply(SimInput::KeyDown(SimKey::Fist));
        policy.apply(&frame(&mut h), 1.0, &mut out);
        assert!(out.is_fist);

        h.apply(SimInput::KeyUp(SimKey::Fist));
        policy.apply(&frame(&mut h), 1.0, &mut out);
        assert!(!out.is_fist);
    }

    #[test]
    fn auto_circle_with_left_hand_opens_gesture() {
        let aspect = 16.0 / 9.0;
        let mut h = SimHands::new(0.07, aspect);
        let mut policy = FrameUpdatePolicy::default();
        let mut out = HandData::default();

        h.apply(SimInput::KeyDown(SimKey::AutoCircle));
        h.apply(SimInput::KeyDown(SimKey::ToggleLeft));
        for _ in 0..40 {
            policy.apply(&frame(&mut h), aspect, &mut out);
        }
        assert!(out.is_gesturing);
        assert!(out.gesture_score > 0.9, "score = {}", out.gesture_score);
    }

    #[test]
    fn auto_circle_without_left_hand_is_gated() {
        let mut h = SimHands::new(0.07, 1.0);
        let mut policy = FrameUpdatePolicy::default();
        let mut out = HandData::default();

        h.apply(SimInput::KeyDown(SimKey::AutoCircle));
        for _ in 0..40 {
            policy.apply(&frame(&mut h), 1.0, &mut out);
        }
        assert!(!out.is_gesturing);
        assert_eq!(out.gesture_score, 0.0);
        assert!(policy.recognizer().detect_circle().is_circle);
    }

    #[test]
    fn sim_source_thread_forwards_frames() {
        let (sim_tx, sim_rx) = mpsc::channel();
        let rx = spawn_landmark_source(SimLandmarkSource {
            rx:    sim_rx,
            hands: SimHands::new(0.07, 1.0),
        });
        sim_tx.send(SimInput::Cursor(Some((0.5, 0.5)))).unwrap();
        sim_tx.send(SimInput::FrameTick).unwrap();
        sim_tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();

        match rx.recv().unwrap() {
            SourceEvent::Frame(f) => assert_eq!(f.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(rx.recv().unwrap(), SourceEvent::Quit);
    }
}
