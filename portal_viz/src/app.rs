//! Top-level application state machine.
//!
//! `AppState` owns the frame policy (hand aggregator + circle recognizer),
//! the published [`HandData`], the portal and its sparks.  It processes
//! `SourceEvent`s and drives the visualizer each frame.

use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, TryRecvError};
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use gesture_core::{FrameUpdatePolicy, GestureResult, HandData, HandDetection, TrackerConfig};

use crate::error::AppError;
use crate::portal::{PortalConfig, PortalState, PortalTransition, SparkField};
use crate::source::{spawn_landmark_source, SimHands, SimInput, SimLandmarkSource, SourceEvent};
use crate::visualizer::{Frame, Visualizer, MIN_WIN_H, MIN_WIN_W, WIN_H, WIN_W};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tracker:     TrackerConfig,
    pub portal:      PortalConfig,
    /// Wrist → middle-knuckle distance of simulated hands.
    pub sim_palm:    f32,
    pub spark_count: usize,
    /// Use the LeapMotion controller instead of the simulator.
    pub use_leap:    bool,
    /// Window size in pixels.
    pub window_w:    usize,
    pub window_h:    usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            tracker:     TrackerConfig::default(),
            portal:      PortalConfig::default(),
            sim_palm:    0.07,
            spark_count: 300,
            use_leap:    cfg!(feature = "leap"),
            window_w:    WIN_W,
            window_h:    WIN_H,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; fields not present keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: AppConfig = serde_json::from_str(&text).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        self.tracker.validate()?;
        self.portal.validate().map_err(AppError::InvalidConfig)?;
        if !(self.sim_palm > 0.0 && self.sim_palm < 0.5) {
            return Err(AppError::InvalidConfig(format!(
                "sim_palm must be in (0, 0.5), got {}",
                self.sim_palm
            )));
        }
        if self.window_w < MIN_WIN_W || self.window_h < MIN_WIN_H {
            return Err(AppError::InvalidConfig(format!(
                "window {}x{} is smaller than {}x{}",
                self.window_w, self.window_h, MIN_WIN_W, MIN_WIN_H
            )));
        }
        if self.use_leap && !cfg!(feature = "leap") {
            return Err(AppError::InvalidConfig(
                "use_leap requires building with --features leap".into(),
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── tracking ─────────────────────────────────────────────────────────
    policy:  FrameUpdatePolicy,
    hands:   HandData,
    last:    GestureResult,
    aspect:  f32,

    // ── visuals ──────────────────────────────────────────────────────────
    portal:  PortalState,
    sparks:  SparkField,

    // ── status message ───────────────────────────────────────────────────
    pub status: String,
}

impl AppState {
    pub fn new(cfg: AppConfig, aspect: f32) -> Self {
        AppState {
            policy:  FrameUpdatePolicy::new(cfg.tracker),
            hands:   HandData::default(),
            last:    GestureResult::NONE,
            aspect,
            sparks:  SparkField::new(cfg.spark_count, 0x5eed, cfg.portal.max_dt),
            portal:  PortalState::new(cfg.portal),
            status:  "Ready: move the mouse to draw, press L for the left hand".to_string(),
        }
    }

    // ── process one detector frame ───────────────────────────────────────

    pub fn handle_frame(&mut self, detections: &[HandDetection]) {
        self.last = self.policy.apply(detections, self.aspect, &mut self.hands);
        debug!(
            "frame: hands={} circle={} raw={:.2} published={:.2} fist={}",
            detections.len(), self.last.is_circle, self.last.score,
            self.hands.gesture_score, self.hands.is_fist,
        );
    }

    // ── per-frame tick ───────────────────────────────────────────────────

    pub fn tick(&mut self, dt: f32) {
        if let Some(t) = self.portal.tick(&self.hands, dt) {
            if t == PortalTransition::Closed && self.hands.is_fist {
                debug!("portal collapsed by fist");
            }
        }
        let emitting = self.portal.sparks_active(&self.hands);
        self.sparks.tick(dt, emitting);
        self.status = self.describe();
    }

    fn describe(&self) -> String {
        let h = &self.hands;
        if !h.present {
            return "No hands: move the mouse into the window".to_string();
        }
        if h.is_fist {
            return "FIST: portal collapsing".to_string();
        }
        if !h.left.present {
            return format!(
                "Right hand only (raw {:.2}): show the left hand (L) to stabilize",
                self.last.score
            );
        }
        if self.portal.is_open {
            return format!("Portal open  score={:.2}", h.gesture_score);
        }
        if h.is_gesturing {
            return format!("Circle held  score={:.2}  stability={:.2}", h.gesture_score, self.portal.stability);
        }
        let rec = self.policy.recognizer();
        format!("Tracing... {}/{} points", rec.len(), rec.config().min_points)
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn hands(&self)  -> &HandData    { &self.hands }
    pub fn portal(&self) -> &PortalState { &self.portal }
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            hands:  &self.hands,
            trail:  self.policy.recognizer().history(),
            portal: &self.portal,
            sparks: &self.sparks,
            status: &self.status,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the landmark source (simulation by default,
/// hardware with `--features leap` and `use_leap`), and drives the
/// event/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let aspect = cfg.window_w as f32 / cfg.window_h as f32;

    // ── Sim input channel ─────────────────────────────────────────────────
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();

    // ── Landmark source ───────────────────────────────────────────────────
    #[cfg(feature = "leap")]
    let source_rx = if cfg.use_leap {
        info!("landmark source: LeapMotion");
        spawn_landmark_source(crate::source::LeapLandmarkSource)
    } else {
        info!("landmark source: simulation");
        spawn_landmark_source(SimLandmarkSource { rx: sim_rx, hands: SimHands::new(cfg.sim_palm, aspect) })
    };
    #[cfg(not(feature = "leap"))]
    let source_rx = {
        info!("landmark source: simulation");
        spawn_landmark_source(SimLandmarkSource { rx: sim_rx, hands: SimHands::new(cfg.sim_palm, aspect) })
    };

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(cfg.window_w, cfg.window_h, sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(cfg, vis.aspect());
    let mut last_tick = Instant::now();

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Poll window input → SimInput (+ one frame tick)
        if !vis.poll_input() { break; }

        // 2. Apply the newest detector frame(s)
        loop {
            match source_rx.try_recv() {
                Ok(SourceEvent::Quit)    => return Ok(()),
                Ok(SourceEvent::Frame(f)) => app.handle_frame(&f),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        // 3. Per-frame animation
        let now = Instant::now();
        app.tick(now.duration_since(last_tick).as_secs_f32());
        last_tick = now;

        // 4. Render
        vis.render(&app.frame());
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
