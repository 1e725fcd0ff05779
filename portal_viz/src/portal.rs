//! Portal visual state.
//!
//! The portal does not follow the gesture score directly.  A *stability*
//! accumulator charges while a valid two-hand circle is held and drains
//! (fast) otherwise; only once it crosses a threshold does the portal start
//! to grow.  A fist on either hand drains it faster still, so clenching
//! collapses an open portal almost at once.
//!
//! Sparks are emitted from the ring while a strong circle is being traced.

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use gesture_core::HandData;

// ════════════════════════════════════════════════════════════════════════════
// PortalConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Minimum published score for the gesture to charge stability.
    pub gesture_min_score: f32,
    /// Minimum published score for sparks to spawn.
    pub spark_min_score:   f32,
    /// Stability gained per second while gesturing.
    pub charge_rate:       f32,
    /// Stability lost per second when not gesturing.
    pub drain_rate:        f32,
    /// Stability lost per second while a fist is held.
    pub fist_drain_rate:   f32,
    pub max_stability:     f32,
    /// Stability above which the portal grows.
    pub open_threshold:    f32,
    /// Progress gained per second while growing.
    pub grow_rate:         f32,
    /// Progress lost per second while shrinking.
    pub shrink_rate:       f32,
    /// Largest frame delta honoured, in seconds.
    pub max_dt:            f32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        PortalConfig {
            gesture_min_score: 0.15,
            spark_min_score:   0.5,
            charge_rate:       2.5,
            drain_rate:        4.0,
            fist_drain_rate:   10.0,
            max_stability:     2.0,
            open_threshold:    0.5,
            grow_rate:         0.6,
            shrink_rate:       3.0,
            max_dt:            0.1,
        }
    }
}

impl PortalConfig {
    pub fn validate(&self) -> Result<(), String> {
        let rates = [
            self.charge_rate, self.drain_rate, self.fist_drain_rate,
            self.grow_rate, self.shrink_rate, self.max_dt,
        ];
        if rates.iter().any(|r| !(*r > 0.0) || !r.is_finite()) {
            return Err("portal rates and max_dt must be positive".into());
        }
        if !(self.open_threshold >= 0.0 && self.open_threshold < self.max_stability) {
            return Err(format!(
                "open_threshold {} must lie in [0, max_stability = {})",
                self.open_threshold, self.max_stability
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PortalState
// ════════════════════════════════════════════════════════════════════════════

/// Edge reported by [`PortalState::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalTransition {
    Opened,
    Closed,
}

// Hysteresis on the "open" flag.
const OPEN_AT:  f32 = 0.95;
const CLOSE_AT: f32 = 0.1;

#[derive(Clone, Debug, Default)]
pub struct PortalState {
    /// Charge in `[0, max_stability]`.
    pub stability: f32,
    /// Visual size in `[0, 1]`.
    pub progress:  f32,
    pub is_open:   bool,
    cfg:           PortalConfig,
}

impl PortalState {
    pub fn new(cfg: PortalConfig) -> Self {
        PortalState { cfg, ..Default::default() }
    }

    /// Advance by `dt` seconds using this tick's published hand state.
    pub fn tick(&mut self, hands: &HandData, dt: f32) -> Option<PortalTransition> {
        let cfg = &self.cfg;
        let dt = dt.clamp(0.0, cfg.max_dt);

        let gesturing = hands.is_gesturing && hands.gesture_score > cfg.gesture_min_score;
        if gesturing && !hands.is_fist {
            self.stability += dt * cfg.charge_rate;
        } else {
            let rate = if hands.is_fist { cfg.fist_drain_rate } else { cfg.drain_rate };
            self.stability -= dt * rate;
        }
        self.stability = self.stability.clamp(0.0, cfg.max_stability);

        let was_open = self.is_open;
        if self.stability > cfg.open_threshold {
            self.progress += dt * cfg.grow_rate;
            if self.progress > OPEN_AT { self.is_open = true; }
        } else {
            self.progress -= dt * cfg.shrink_rate;
            if self.progress < CLOSE_AT { self.is_open = false; }
        }
        self.progress = self.progress.clamp(0.0, 1.0);

        match (was_open, self.is_open) {
            (false, true) => {
                info!("portal opened (stability {:.2})", self.stability);
                Some(PortalTransition::Opened)
            }
            (true, false) => {
                info!("portal closed (fist: {})", hands.is_fist);
                Some(PortalTransition::Closed)
            }
            _ => None,
        }
    }

    pub fn visible(&self) -> bool { self.progress > 0.01 }

    /// Opacity of the portal interior, easing in over the second half of
    /// the growth.
    pub fn content_opacity(&self) -> f32 {
        smoothstep(0.4, 1.0, self.progress)
    }

    pub fn sparks_active(&self, hands: &HandData) -> bool {
        hands.is_gesturing && hands.gesture_score > self.cfg.spark_min_score
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

// ════════════════════════════════════════════════════════════════════════════
// SparkField — particles flung off the ring
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default)]
pub struct Spark {
    /// Position relative to the portal centre, in ring radii.
    pub x:    f32,
    pub y:    f32,
    pub vx:   f32,
    pub vy:   f32,
    /// Remaining life in `[0, 1]`; dead at 0.
    pub life: f32,
}

/// Fixed pool of sparks; dead sparks respawn on the ring while emitting.
#[derive(Debug)]
pub struct SparkField {
    pub sparks: Vec<Spark>,
    rng:        StdRng,
    /// Largest frame delta honoured, shared with [`PortalConfig::max_dt`].
    max_dt:     f32,
}

const SPAWN_CHANCE: f64 = 0.05;
const SPARK_SPEED:  f32 = 5.0;
const GRAVITY:      f32 = 0.5;
const DECAY:        f32 = 1.5;

impl SparkField {
    pub fn new(count: usize, seed: u64, max_dt: f32) -> Self {
        SparkField {
            sparks: vec![Spark::default(); count],
            rng:    StdRng::seed_from_u64(seed),
            max_dt,
        }
    }

    pub fn tick(&mut self, dt: f32, emitting: bool) {
        let dt = dt.clamp(0.0, self.max_dt);
        for s in &mut self.sparks {
            if s.life > 0.0 {
                s.x += s.vx * dt * SPARK_SPEED;
                s.y += s.vy * dt * SPARK_SPEED;
                // Screen y grows downward.
                s.vy += dt * GRAVITY;
                s.life = (s.life - dt * DECAY).max(0.0);
            } else if emitting && self.rng.gen_bool(SPAWN_CHANCE) {
                let angle: f32 = self.rng.gen_range(0.0..std::f32::consts::TAU);
                let r: f32 = self.rng.gen_range(0.95..1.05);
                let (sin, cos) = angle.sin_cos();
                s.x = cos * r;
                s.y = sin * r;
                // Tangential fling plus a little outward drift.
                let speed: f32 = self.rng.gen_range(0.05..0.15);
                s.vx = (-sin + cos * 0.3) * speed;
                s.vy = (cos + sin * 0.3) * speed;
                s.life = 1.0;
            }
        }
    }

    pub fn alive(&self) -> usize {
        self.sparks.iter().filter(|s| s.life > 0.0).count()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn gesturing(score: f32) -> HandData {
        HandData { present: true, is_gesturing: true, gesture_score: score, ..Default::default() }
    }

    fn run(p: &mut PortalState, hands: &HandData, frames: usize) -> Vec<PortalTransition> {
        (0..frames).filter_map(|_| p.tick(hands, 1.0 / 60.0)).collect()
    }

    #[test]
    fn sustained_gesture_opens_portal() {
        let mut p = PortalState::new(PortalConfig::default());
        let events = run(&mut p, &gesturing(0.9), 180);
        assert!(p.is_open);
        assert_eq!(events, vec![PortalTransition::Opened]);
        assert_eq!(p.progress, 1.0);
        assert_eq!(p.stability, 2.0);
    }

    #[test]
    fn weak_score_never_charges() {
        let mut p = PortalState::new(PortalConfig::default());
        run(&mut p, &gesturing(0.1), 300);
        assert_eq!(p.stability, 0.0);
        assert!(!p.visible());
    }

    #[test]
    fn fist_collapses_faster_than_release() {
        let cfg = PortalConfig::default();

        let mut released = PortalState::new(cfg.clone());
        run(&mut released, &gesturing(0.9), 180);
        let mut fisted = released.clone();

        let idle = HandData::default();
        let fist = HandData { is_fist: true, ..gesturing(0.9) };
        run(&mut released, &idle, 6);
        run(&mut fisted, &fist, 6);
        assert!(fisted.stability < released.stability);
    }

    #[test]
    fn portal_closes_after_release() {
        let mut p = PortalState::new(PortalConfig::default());
        run(&mut p, &gesturing(0.9), 180);
        let events = run(&mut p, &HandData::default(), 120);
        assert_eq!(events, vec![PortalTransition::Closed]);
        assert!(!p.is_open);
        assert_eq!(p.progress, 0.0);
        assert!(!p.visible());
    }

    #[test]
    fn large_dt_is_clamped() {
        let mut p = PortalState::new(PortalConfig::default());
        p.tick(&gesturing(0.9), 10.0);
        assert!((p.stability - 0.25).abs() < 1e-6);
    }

    #[test]
    fn content_opacity_eases_in() {
        let mut p = PortalState::default();
        p.progress = 0.3;
        assert_eq!(p.content_opacity(), 0.0);
        p.progress = 0.7;
        assert!((p.content_opacity() - 0.5).abs() < 1e-6);
        p.progress = 1.0;
        assert_eq!(p.content_opacity(), 1.0);
    }

    #[test]
    fn sparks_need_strong_gesture() {
        let p = PortalState::new(PortalConfig::default());
        assert!(!p.sparks_active(&gesturing(0.4)));
        assert!(p.sparks_active(&gesturing(0.6)));
        assert!(!p.sparks_active(&HandData { gesture_score: 0.9, ..Default::default() }));
    }

    #[test]
    fn spark_field_emits_and_decays() {
        let mut f = SparkField::new(200, 7, 0.1);
        for _ in 0..30 { f.tick(1.0 / 60.0, true); }
        assert!(f.alive() > 0);
        for _ in 0..120 { f.tick(1.0 / 60.0, false); }
        assert_eq!(f.alive(), 0);
    }

    #[test]
    fn spark_dt_follows_configured_clamp() {
        let mut f = SparkField::new(200, 11, 0.1);
        while f.alive() == 0 { f.tick(1.0 / 60.0, true); }
        let born = f.alive();
        // A stalled frame may only age sparks by max_dt.
        f.tick(10.0, false);
        assert_eq!(f.alive(), born);
        assert!(f.sparks.iter().filter(|s| s.life > 0.0).all(|s| (s.life - 0.85).abs() < 1e-5));

        let mut short = SparkField::new(200, 11, 0.01);
        while short.alive() == 0 { short.tick(1.0 / 60.0, true); }
        short.tick(10.0, false);
        assert!(short.sparks.iter().filter(|s| s.life > 0.0).all(|s| (s.life - 0.985).abs() < 1e-5));
    }

    #[test]
    fn invalid_portal_config_rejected() {
        let cfg = PortalConfig { open_threshold: 3.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = PortalConfig { grow_rate: 0.0, ..Default::default() };
        assert!(cfg.validate().is_err());
        assert!(PortalConfig::default().validate().is_ok());
    }
}
