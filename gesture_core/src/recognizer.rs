//! Streaming circle detection over a bounded fingertip trajectory.
//!
//! # Algorithm
//!
//! The recognizer keeps the last `capacity` points in a FIFO.  On demand,
//! [`CircleGestureRecognizer::detect_circle`] treats the buffered (x, y)
//! positions as samples of a closed curve:
//!
//! 1. Centroid = mean of all points.
//! 2. Radius samples = distance of each point from the centroid.
//! 3. Reject if the mean radius is too small (hand barely moving), or if
//!    the bounding box is far from square (a line, not a loop).
//! 4. `circle_error` = population std-dev of the radius samples divided by
//!    their mean.  A perfect circle scores 0.
//! 5. Circle iff `circle_error < circle_threshold`; the score falls off
//!    linearly from 1 at error 0 to 0 at `score_falloff`.
//!
//! Depth (`z`) is carried in the buffer but ignored by detection.

use std::collections::VecDeque;

use log::trace;
use serde::Serialize;

use crate::config::RecognizerConfig;
use crate::geometry::{Point2, Point3};

// ════════════════════════════════════════════════════════════════════════════
// GestureResult
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of one [`CircleGestureRecognizer::detect_circle`] call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GestureResult {
    pub is_circle: bool,
    pub center:    Point2,
    /// Mean distance of the trajectory from its centroid.  Always ≥ 0.
    pub radius:    f32,
    /// Confidence in `[0, 1]`; 0 whenever `is_circle` is false.
    pub score:     f32,
}

impl GestureResult {
    /// Not enough data to say anything.
    pub const NONE: GestureResult = GestureResult {
        is_circle: false,
        center:    Point2::ORIGIN,
        radius:    0.0,
        score:     0.0,
    };

    fn rejected(center: Point2, radius: f32) -> Self {
        GestureResult { is_circle: false, center, radius, score: 0.0 }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CircleGestureRecognizer
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct CircleGestureRecognizer {
    config:  RecognizerConfig,
    history: VecDeque<Point3>,
}

impl Default for CircleGestureRecognizer {
    fn default() -> Self {
        Self::new(RecognizerConfig::default())
    }
}

impl CircleGestureRecognizer {
    /// `config` is assumed valid; see [`RecognizerConfig::validate`].
    pub fn new(config: RecognizerConfig) -> Self {
        let history = VecDeque::with_capacity(config.capacity + 1);
        CircleGestureRecognizer { config, history }
    }

    pub fn config(&self) -> &RecognizerConfig { &self.config }

    /// Append a trajectory point, evicting the oldest once over capacity.
    ///
    /// The caller must only pass finite coordinates.
    pub fn add_point(&mut self, p: Point3) {
        self.history.push_back(p);
        while self.history.len() > self.config.capacity {
            self.history.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Read-only view of the buffered trajectory, oldest first.
    pub fn history(&self) -> &VecDeque<Point3> { &self.history }

    pub fn len(&self) -> usize { self.history.len() }

    pub fn is_empty(&self) -> bool { self.history.is_empty() }

    /// Score the buffered trajectory.  Pure: the buffer is not modified.
    pub fn detect_circle(&self) -> GestureResult {
        let cfg = &self.config;
        if self.history.len() < cfg.min_points {
            return GestureResult::NONE;
        }
        let n = self.history.len() as f32;

        // ── centroid ─────────────────────────────────────────────────────
        let (sum_x, sum_y) = self.history.iter()
            .fold((0.0_f32, 0.0_f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        let center = Point2::new(sum_x / n, sum_y / n);

        // ── radius samples + bounding box ────────────────────────────────
        let mut radii = Vec::with_capacity(self.history.len());
        let mut sum_r = 0.0_f32;
        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);

        for p in &self.history {
            let r = p.xy().distance(&center);
            radii.push(r);
            sum_r += r;
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let mean_radius = sum_r / n;

        // Too small to be deliberate.  Also guards the division below.
        if !(mean_radius >= cfg.min_radius) {
            trace!("circle rejected: mean radius {:.4} below {}", mean_radius, cfg.min_radius);
            return GestureResult::rejected(center, mean_radius.max(0.0));
        }

        // Zero height gives inf (or NaN), which falls outside the range.
        let aspect = (max_x - min_x) / (max_y - min_y);
        if !(cfg.min_aspect..=cfg.max_aspect).contains(&aspect) {
            trace!("circle rejected: bounding-box aspect {:.3}", aspect);
            return GestureResult::rejected(center, mean_radius);
        }

        // ── radial dispersion ────────────────────────────────────────────
        let variance = radii.iter()
            .map(|r| (r - mean_radius) * (r - mean_radius))
            .sum::<f32>() / n;
        let circle_error = variance.sqrt() / mean_radius;

        let is_circle = circle_error < cfg.circle_threshold;
        let score = if is_circle {
            (1.0 - circle_error / cfg.score_falloff).clamp(0.0, 1.0)
        } else {
            0.0
        };

        GestureResult { is_circle, center, radius: mean_radius, score }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn circle_points(n: usize, cx: f32, cy: f32, r: f32) -> Vec<Point3> {
        (0..n)
            .map(|i| {
                let t = TAU * i as f32 / n as f32;
                Point3::new(cx + r * t.cos(), cy + r * t.sin(), 0.0)
            })
            .collect()
    }

    fn fed(points: &[Point3]) -> CircleGestureRecognizer {
        let mut rec = CircleGestureRecognizer::default();
        for &p in points { rec.add_point(p); }
        rec
    }

    #[test]
    fn too_few_points_is_zero_result() {
        for n in 0..20 {
            let rec = fed(&circle_points(n, 0.5, 0.5, 0.2));
            assert_eq!(rec.detect_circle(), GestureResult::NONE, "n = {}", n);
        }
    }

    #[test]
    fn twenty_five_sample_circle_scores_near_one() {
        let rec = fed(&circle_points(25, 0.5, 0.5, 0.2));
        let g = rec.detect_circle();
        assert!(g.is_circle);
        assert!(g.score > 0.99, "score = {}", g.score);
        assert!((g.center.x - 0.5).abs() < 1e-4);
        assert!((g.center.y - 0.5).abs() < 1e-4);
        assert!((g.radius - 0.2).abs() < 1e-4);
    }

    #[test]
    fn forty_point_circle_scores_high() {
        let rec = fed(&circle_points(40, 0.0, 0.0, 0.2));
        let g = rec.detect_circle();
        assert!(g.is_circle);
        assert!(g.score > 0.9);
    }

    #[test]
    fn collinear_points_rejected_by_aspect() {
        let pts: Vec<_> = (0..20)
            .map(|i| Point3::new(0.1 + 0.04 * i as f32, 0.5, 0.0))
            .collect();
        let g = fed(&pts).detect_circle();
        assert!(!g.is_circle);
        assert_eq!(g.score, 0.0);
        assert!(g.radius >= 0.05);
    }

    #[test]
    fn vertical_line_rejected_by_aspect() {
        let pts: Vec<_> = (0..20)
            .map(|i| Point3::new(0.5, 0.1 + 0.04 * i as f32, 0.0))
            .collect();
        let g = fed(&pts).detect_circle();
        assert!(!g.is_circle);
        assert_eq!(g.score, 0.0);
    }

    #[test]
    fn tiny_cluster_rejected_by_radius() {
        let rec = fed(&circle_points(30, 0.5, 0.5, 0.01));
        let g = rec.detect_circle();
        assert!(!g.is_circle);
        assert_eq!(g.score, 0.0);
        assert!(g.radius < 0.05);
        assert!((g.center.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn identical_points_do_not_produce_nan() {
        let rec = fed(&vec![Point3::new(0.3, 0.3, 0.0); 25]);
        let g = rec.detect_circle();
        assert!(!g.is_circle);
        assert_eq!(g.score, 0.0);
        assert!(g.radius.is_finite());
        assert!(g.radius < 1e-6, "radius = {}", g.radius);
    }

    #[test]
    fn square_scores_well_below_circle() {
        // Corners plus edge midpoints of a square, traced five times.
        let mut pts = Vec::new();
        for _ in 0..5 {
            pts.extend_from_slice(&[
                Point3::new(0.2, 0.2, 0.0), Point3::new(0.5, 0.2, 0.0),
                Point3::new(0.8, 0.2, 0.0), Point3::new(0.8, 0.5, 0.0),
                Point3::new(0.8, 0.8, 0.0), Point3::new(0.5, 0.8, 0.0),
                Point3::new(0.2, 0.8, 0.0), Point3::new(0.2, 0.5, 0.0),
            ]);
        }
        let g = fed(&pts).detect_circle();
        // Radii alternate between 0.3 and 0.424: error ≈ 0.17, still a
        // circle but with a visibly reduced score.
        assert!(g.is_circle);
        assert!(g.score < 0.5 && g.score > 0.0, "score = {}", g.score);
    }

    #[test]
    fn open_arc_score_is_consistent() {
        // Aspect sits right on the 2.0 boundary; either outcome is fine as
        // long as score and is_circle agree.
        let pts: Vec<_> = (0..30)
            .map(|i| {
                let t = std::f32::consts::PI * i as f32 / 29.0;
                Point3::new(0.5 + 0.3 * t.cos(), 0.5 + 0.3 * t.sin(), 0.0)
            })
            .collect();
        let g = fed(&pts).detect_circle();
        assert!(g.score <= 1.0 && g.score >= 0.0);
        if !g.is_circle { assert_eq!(g.score, 0.0); }
    }

    #[test]
    fn detect_is_idempotent() {
        let rec = fed(&circle_points(33, 0.4, 0.6, 0.15));
        let a = rec.detect_circle();
        let b = rec.detect_circle();
        let c = rec.detect_circle();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(rec.len(), 33);
    }

    #[test]
    fn fifo_keeps_most_recent_forty() {
        let mut rec = CircleGestureRecognizer::default();
        for i in 0..100 {
            rec.add_point(Point3::new(i as f32, 0.0, 0.0));
        }
        assert_eq!(rec.len(), 40);
        let xs: Vec<f32> = rec.history().iter().map(|p| p.x).collect();
        let expected: Vec<f32> = (60..100).map(|i| i as f32).collect();
        assert_eq!(xs, expected);
    }

    #[test]
    fn clear_resets_to_zero_result() {
        let mut rec = fed(&circle_points(40, 0.5, 0.5, 0.2));
        assert!(rec.detect_circle().is_circle);
        rec.clear();
        assert!(rec.is_empty());
        assert_eq!(rec.detect_circle(), GestureResult::NONE);
        for p in circle_points(19, 0.5, 0.5, 0.2) { rec.add_point(p); }
        assert_eq!(rec.detect_circle(), GestureResult::NONE);
    }

    #[test]
    fn depth_is_ignored() {
        let flat = circle_points(30, 0.5, 0.5, 0.2);
        let deep: Vec<_> = flat.iter()
            .enumerate()
            .map(|(i, p)| Point3::new(p.x, p.y, i as f32 * 0.3))
            .collect();
        assert_eq!(fed(&flat).detect_circle(), fed(&deep).detect_circle());
    }

    #[test]
    fn score_always_in_unit_range() {
        // Mixture of shapes: jittered circles of varying noise.
        for noise in [0.0_f32, 0.02, 0.05, 0.1, 0.2] {
            let pts: Vec<_> = (0..40)
                .map(|i| {
                    let t = TAU * i as f32 / 40.0;
                    let r = 0.2 + if i % 2 == 0 { noise } else { -noise };
                    Point3::new(0.5 + r * t.cos(), 0.5 + r * t.sin(), 0.0)
                })
                .collect();
            let g = fed(&pts).detect_circle();
            assert!((0.0..=1.0).contains(&g.score));
            assert!(g.radius >= 0.0);
            if !g.is_circle { assert_eq!(g.score, 0.0); }
        }
    }

    #[test]
    fn result_serializes_for_diagnostics() {
        let g = fed(&circle_points(25, 0.5, 0.5, 0.2)).detect_circle();
        let json = serde_json::to_value(g).unwrap();
        assert_eq!(json["is_circle"], serde_json::Value::Bool(true));
        assert!(json["score"].as_f64().unwrap() > 0.99);
        assert!(json["center"]["x"].is_number());
    }

    #[test]
    fn custom_thresholds_apply() {
        let cfg = RecognizerConfig { capacity: 10, min_points: 5, ..Default::default() };
        let mut rec = CircleGestureRecognizer::new(cfg);
        assert_eq!(rec.config().capacity, 10);
        for p in circle_points(8, 0.5, 0.5, 0.2) { rec.add_point(p); }
        assert!(rec.detect_circle().is_circle);
        for p in circle_points(30, 0.5, 0.5, 0.2) { rec.add_point(p); }
        assert_eq!(rec.len(), 10);
    }
}
