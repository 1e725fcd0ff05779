//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ [score bar ████████░░░░░░░░░░]                          FIST  2 HANDS │
//! │                                                                      │
//! │        ✋ left (stabilizer)          ·  ·  trail  ·  ·                │
//! │                                   ·    ╭──────╮    ·                 │
//! │                                  ·     │portal│     ·   ☝ right      │
//! │                                   ·    ╰──────╯    ·                 │
//! │                                                                      │
//! │ status line                                                          │
//! │ key legend                                                           │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Trajectory points are stored aspect-corrected (`x · width/height`); the
//! visualizer divides that back out before plotting.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use gesture_core::skeleton::{
    INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP,
    RING_MCP, RING_TIP, THUMB_TIP, WRIST,
};
use gesture_core::{HandData, HandEntry, Point3};

use crate::error::AppError;
use crate::portal::{PortalState, SparkField};
use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

/// Default window size.
pub const WIN_W:       usize = 960;
pub const WIN_H:       usize = 540;
/// Smallest window the layout fits in.
pub const MIN_WIN_W:   usize = 480;
pub const MIN_WIN_H:   usize = 270;
const BAR_X:           usize = 12;
const BAR_Y:           usize = 12;
const BAR_W:           usize = 240;
const BAR_H:           usize = 10;
/// Height of the status strip at the bottom.
const STATUS_H:        usize = 36;
/// Full-size portal ring radius, in pixels.
pub const RING_R:      f32   = 150.0;
const RING_THICKNESS:  f32   = 6.0;
const BG_COLOR:        u32   = 0xFF0B0B1A;
const TRAIL_COLOR:     u32   = 0xFF5AB4FF;
const TRAIL_ACTIVE:    u32   = 0xFFFFD700;  // gold while gesturing
const RIGHT_COLOR:     u32   = 0xFFFF9966;
const LEFT_COLOR:      u32   = 0xFF66DDAA;
const RING_COLOR:      u32   = 0xFFFF8C1A;
const PORTAL_FILL:     u32   = 0xFF3A1A66;
const SPARK_COLOR:     u32   = 0xFFFFE08A;
const FIST_COLOR:      u32   = 0xFFFF4444;
const TEXT_BG:         u32   = 0xFF14142E;

/// Bones of the 21-point skeleton, drawn as straight segments.
const BONES: [(usize, usize); 21] = [
    (WRIST, 1), (1, 2), (2, 3), (3, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, 6), (6, 7), (7, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, 10), (10, 11), (11, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, 14), (14, 15), (15, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, 18), (18, 19), (19, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Frame — everything one render call needs
// ════════════════════════════════════════════════════════════════════════════

pub struct Frame<'a> {
    pub hands:   &'a HandData,
    pub trail:   &'a VecDeque<Point3>,
    pub portal:  &'a PortalState,
    pub sparks:  &'a SparkField,
    pub status:  &'a str,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    buf:     Vec<u32>,
    w:       usize,
    h:       usize,
    sim_tx:  Sender<SimInput>,
}

impl Visualizer {
    /// Open a `w` × `h` window; the size is assumed to be at least
    /// `MIN_WIN_W` × `MIN_WIN_H`.
    pub fn new(w: usize, h: usize, sim_tx: Sender<SimInput>) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Portal: trace a circle, hold the left hand steady",
            w, h,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| AppError::Window(e.to_string()))?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; w * h],
            w,
            h,
            sim_tx,
        })
    }

    /// Width / height of the drawing surface.
    pub fn aspect(&self) -> f32 { self.w as f32 / self.h as f32 }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll mouse/keyboard and forward them as [`SimInput`], followed by a
    /// frame tick.  Returns false when the window should close.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let released = |k: Key| self.window.is_key_released(k);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Quit));
            return false;
        }
        if one_shot(Key::L) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::ToggleLeft));
        }
        if one_shot(Key::C) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::AutoCircle));
        }
        if one_shot(Key::F) {
            let _ = self.sim_tx.send(SimInput::KeyDown(SimKey::Fist));
        }
        if released(Key::F) {
            let _ = self.sim_tx.send(SimInput::KeyUp(SimKey::Fist));
        }

        let cursor = self.window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| (x / self.w as f32, y / self.h as f32));
        let _ = self.sim_tx.send(SimInput::Cursor(cursor));
        let _ = self.sim_tx.send(SimInput::FrameTick);

        true
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &Frame<'_>) {
        self.buf.fill(BG_COLOR);

        let aspect = self.aspect();
        let (w, h) = (self.w, self.h);
        let cx = w as f32 / 2.0;
        let cy = h as f32 / 2.0;

        // ── Portal ────────────────────────────────────────────────────────
        if frame.portal.visible() {
            let r = RING_R * frame.portal.progress;
            let fill = blend(BG_COLOR, PORTAL_FILL, frame.portal.content_opacity());
            self.fill_disc(cx, cy, r, fill);
            self.draw_ring(cx, cy, r, RING_THICKNESS * frame.portal.progress.max(0.3), RING_COLOR);
        }

        // ── Sparks ────────────────────────────────────────────────────────
        for s in frame.sparks.sparks.iter().filter(|s| s.life > 0.0) {
            let color = blend(BG_COLOR, SPARK_COLOR, s.life);
            let sx = cx + s.x * RING_R;
            let sy = cy + s.y * RING_R;
            self.fill_disc(sx, sy, 1.5, color);
        }

        // ── Trail ─────────────────────────────────────────────────────────
        let trail_color = if frame.hands.is_gesturing { TRAIL_ACTIVE } else { TRAIL_COLOR };
        let n = frame.trail.len().max(1) as f32;
        for (i, p) in frame.trail.iter().enumerate() {
            let age = (i + 1) as f32 / n;
            let px = p.x / aspect * w as f32;
            let py = p.y * h as f32;
            self.fill_disc(px, py, 1.0 + 2.0 * age, blend(BG_COLOR, trail_color, age));
        }

        // ── Hands ─────────────────────────────────────────────────────────
        let hand_tint = |base: u32| if frame.hands.is_fist { FIST_COLOR } else { base };
        self.draw_hand(&frame.hands.right, hand_tint(RIGHT_COLOR));
        self.draw_hand(&frame.hands.left,  hand_tint(LEFT_COLOR));

        // ── Score bar ─────────────────────────────────────────────────────
        self.draw_border(BAR_X, BAR_Y, BAR_W, BAR_H, 0xFF555577);
        let filled = (BAR_W as f32 * frame.hands.gesture_score.clamp(0.0, 1.0)) as usize;
        self.fill_rect(BAR_X + 1, BAR_Y + 1, filled.saturating_sub(2), BAR_H - 2, trail_color);
        self.draw_label(
            &format!("score {:.2}", frame.hands.gesture_score),
            BAR_X + BAR_W + 8, BAR_Y + 3, 0xFFCCCCCC,
        );

        let hand_count = frame.hands.right.present as usize + frame.hands.left.present as usize;
        self.draw_label(&format!("hands {}", hand_count), w - 60, BAR_Y + 3, 0xFFCCCCCC);
        if frame.hands.is_fist {
            self.draw_label("fist", w - 100, BAR_Y + 3, FIST_COLOR);
        }

        // ── Status bar ────────────────────────────────────────────────────
        let status_y = h - STATUS_H;
        self.fill_rect(0, status_y, w, STATUS_H, TEXT_BG);
        self.draw_label(frame.status, 10, status_y + 10, 0xFFEEEEEE);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_label(
            "mouse=right hand  L=left hand  F=fist (hold)  C=auto circle  Q=quit",
            10, h - 16, 0xFF888888,
        );

        self.window.update_with_buffer(&self.buf, w, h).ok();
    }

    // ── Hand skeleton ─────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &HandEntry, color: u32) {
        if !hand.present || hand.landmarks.is_empty() { return; }
        let (w, h) = (self.w as f32, self.h as f32);
        let to_px = |p: &Point3| (p.x * w, p.y * h);

        for &(a, b) in BONES.iter() {
            let (x0, y0) = to_px(&hand.landmarks[a]);
            let (x1, y1) = to_px(&hand.landmarks[b]);
            self.draw_line(x0, y0, x1, y1, blend(BG_COLOR, color, 0.6));
        }
        for p in &hand.landmarks {
            let (x, y) = to_px(p);
            self.fill_disc(x, y, 2.5, color);
        }
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y+h).min(self.h) {
            for col in x..(x+w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        let (bw, bh) = (self.w, self.h);
        for col in x..(x+w).min(bw) {
            if y < bh              { self.buf[y           * bw + col] = color; }
            if y+h-1 < bh          { self.buf[(y+h-1)     * bw + col] = color; }
        }
        for row in y..(y+h).min(bh) {
            if x < bw              { self.buf[row * bw + x    ] = color; }
            if x+w-1 < bw          { self.buf[row * bw + x+w-1] = color; }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.buf[y as usize * self.w + x as usize] = color;
        }
    }

    fn fill_disc(&mut self, cx: f32, cy: f32, r: f32, color: u32) {
        self.shade_annulus(cx, cy, 0.0, r, color);
    }

    fn draw_ring(&mut self, cx: f32, cy: f32, r: f32, thickness: f32, color: u32) {
        let half = thickness / 2.0;
        self.shade_annulus(cx, cy, (r - half).max(0.0), r + half, color);
    }

    fn shade_annulus(&mut self, cx: f32, cy: f32, r_in: f32, r_out: f32, color: u32) {
        if !(r_out > 0.0) { return; }
        let (x0, x1) = ((cx - r_out).floor() as isize, (cx + r_out).ceil() as isize);
        let (y0, y1) = ((cy - r_out).floor() as isize, (cy + r_out).ceil() as isize);
        let (in2, out2) = (r_in * r_in, r_out * r_out);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let d2 = dx * dx + dy * dy;
                if d2 <= out2 && d2 >= in2 {
                    self.set_pixel(x, y, color);
                }
            }
        }
    }

    /// Bresenham line.
    fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: u32) {
        let (mut x, mut y) = (x0.round() as isize, y0.round() as isize);
        let (xe, ye) = (x1.round() as isize, y1.round() as isize);
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == xe && y == ye { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// Minimal bitmap font, 3×5 characters for labels.
    /// Each character is encoded as 5 rows × 3 bits.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch).unwrap_or(FALLBACK_GLYPH);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel((cx + col) as isize, (y + row) as isize, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.w { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Drawn for characters the font has no glyph for.
const FALLBACK_GLYPH: [u8; 5] = [0b000, 0b000, 0b010, 0b000, 0b000];

pub(crate) fn char_glyph(c: char) -> Option<[u8; 5]> {
    let glyph = match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => return None,
    };
    Some(glyph)
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0-t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar,br) << 16) | (lerp(ag,bg) << 8) | lerp(ab,bb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn blend_clamps_t() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 7.0), 0xFFFFFFFF);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, -1.0), 0xFF000000);
    }

    #[test]
    fn every_landmark_is_on_a_bone() {
        for i in 0..gesture_core::skeleton::LANDMARK_COUNT {
            assert!(BONES.iter().any(|&(a, b)| a == i || b == i), "landmark {} unconnected", i);
        }
    }

    #[test]
    fn font_covers_legend_but_not_dashes() {
        assert!("mouse=right hand  L=left hand  F=fist (hold)  C=auto circle  Q=quit"
            .chars()
            .all(|c| char_glyph(c).is_some()));
        assert_eq!(char_glyph('\u{2014}'), None);
    }

    #[test]
    fn skeleton_bones_stay_in_range() {
        for (a, b) in BONES {
            assert!(a < gesture_core::skeleton::LANDMARK_COUNT);
            assert!(b < gesture_core::skeleton::LANDMARK_COUNT);
        }
    }
}
