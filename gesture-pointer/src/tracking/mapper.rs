//! Frame-to-screen coordinate mapping.
//!
//! A fixed pixel margin is cut from every edge of the camera frame and the
//! remaining inner rectangle is stretched over the whole screen, so a hand
//! that stays comfortably inside the frame can still reach the screen
//! corners.

use tracing::debug;

/// Margin cut from each frame edge, in camera pixels.
pub const DEFAULT_MARGIN_PX: f64 = 100.0;

/// Maps normalized landmark coordinates to screen pixels.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    pub margin_px: f64,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self {
            margin_px: DEFAULT_MARGIN_PX,
        }
    }
}

impl CoordinateMapper {
    pub fn new(margin_px: f64) -> Self {
        Self {
            margin_px: margin_px.max(0.0),
        }
    }

    /// Map `(x, y)` in [0, 1] of a `src_w` x `src_h` frame onto a
    /// `dst_w` x `dst_h` screen.
    pub fn map(
        &self,
        x: f32,
        y: f32,
        src_w: u32,
        src_h: u32,
        dst_w: i32,
        dst_h: i32,
    ) -> (i32, i32) {
        let nx = self.inset(x as f64, src_w as f64);
        let ny = self.inset(y as f64, src_h as f64);
        (
            (nx * dst_w as f64).round() as i32,
            (ny * dst_h as f64).round() as i32,
        )
    }

    /// Position along one axis re-normalized over the inset range.
    fn inset(&self, v: f64, dim: f64) -> f64 {
        let span = dim - 2.0 * self.margin_px;
        if span <= 0.0 {
            // Frame too small for the margin: map the full axis instead.
            debug!(dim, margin = self.margin_px, "frame smaller than mapping margin");
            return v.clamp(0.0, 1.0);
        }
        let px = (v * dim).clamp(self.margin_px, dim - self.margin_px);
        (px - self.margin_px) / span
    }
}

// ── Tests ──────────────────────────────────────────────────
