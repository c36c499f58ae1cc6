//! Per-axis cursor smoothing.
//!
//! `OneEuroFilter` adapts its cutoff to movement speed: heavy smoothing
//! when the hand is still (kills jitter), light smoothing when it moves
//! fast (keeps latency low).  `ExponentialFilter` is the fixed-factor
//! variant.  Both work in screen pixels with timestamps in seconds.

use std::f64::consts::PI;

use tracing::trace;

/// Default minimum cutoff (Hz).  Very heavy smoothing at rest.
pub const DEFAULT_MIN_CUTOFF: f64 = 0.01;

/// Default speed coefficient.  Low speed sensitivity for a "heavy" cursor.
pub const DEFAULT_BETA: f64 = 0.05;

/// Default derivative cutoff (Hz).
pub const DEFAULT_D_CUTOFF: f64 = 1.0;

/// Default factor for the exponential smoother.
pub const DEFAULT_EXP_FACTOR: f64 = 0.5;

/// Elapsed time used when timestamps fail to increase (seconds).
const MIN_ELAPSED_S: f64 = 1e-6;

// ── Axis filter trait ──────────────────────────────────────

/// A scalar filter fed one sample per frame.
pub trait AxisFilter: Send {
    /// Feed a raw sample taken at `t` seconds and return the filtered value.
    fn update(&mut self, t: f64, x: f64) -> f64;

    /// Forget all history; the next sample re-initializes the filter.
    fn reset(&mut self);
}

// ── One Euro ───────────────────────────────────────────────

/// Adaptive low-pass filter: smooth at rest, responsive during motion.
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    /// Minimum cutoff frequency (Hz) - lower = smoother at rest
    min_cutoff: f64,
    /// Speed coefficient - higher = less lag during fast motion
    beta: f64,
    /// Derivative cutoff frequency (Hz)
    d_cutoff: f64,

    x_prev: f64,
    dx_prev: f64,
    t_prev: f64,
    initialized: bool,
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f64, beta: f64) -> Self {
        Self {
            min_cutoff,
            beta,
            d_cutoff: DEFAULT_D_CUTOFF,
            x_prev: 0.0,
            dx_prev: 0.0,
            t_prev: 0.0,
            initialized: false,
        }
    }

    /// Smoothing factor for a first-order low-pass at `cutoff` Hz over `t_e` seconds.
    fn smoothing_factor(t_e: f64, cutoff: f64) -> f64 {
        let r = 2.0 * PI * cutoff * t_e;
        r / (r + 1.0)
    }

    /// Last derivative estimate (units per second).
    pub fn derivative(&self) -> f64 {
        self.dx_prev
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CUTOFF, DEFAULT_BETA)
    }
}

impl AxisFilter for OneEuroFilter {
    fn update(&mut self, t: f64, x: f64) -> f64 {
        if !self.initialized {
            self.x_prev = x;
            self.dx_prev = 0.0;
            self.t_prev = t;
            self.initialized = true;
            return x;
        }

        let mut t_e = t - self.t_prev;
        if t_e <= 0.0 {
            trace!(t, t_prev = self.t_prev, "non-increasing timestamp, clamping");
            t_e = MIN_ELAPSED_S;
        } else {
            self.t_prev = t;
        }

        // 1. Estimate derivative (velocity)
        let a_d = Self::smoothing_factor(t_e, self.d_cutoff);
        let dx = (x - self.x_prev) / t_e;
        let dx_hat = a_d * dx + (1.0 - a_d) * self.dx_prev;

        // 2. Adaptive cutoff: more smoothing when slow, less when fast
        let cutoff = self.min_cutoff + self.beta * dx_hat.abs();
        let a = Self::smoothing_factor(t_e, cutoff);

        // 3. Apply filter
        let x_hat = a * x + (1.0 - a) * self.x_prev;

        self.x_prev = x_hat;
        self.dx_prev = dx_hat;

        x_hat
    }

    fn reset(&mut self) {
        self.initialized = false;
        self.dx_prev = 0.0;
    }
}

// ── Exponential ────────────────────────────────────────────

/// Fixed-factor exponential smoothing: `prev + (x - prev) * factor`.
///
/// Higher factor = more responsive, lower = smoother.  Ignores time.
#[derive(Debug, Clone)]
pub struct ExponentialFilter {
    factor: f64,
    prev: Option<f64>,
}

impl ExponentialFilter {
    pub fn new(factor: f64) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            prev: None,
        }
    }
}

impl Default for ExponentialFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXP_FACTOR)
    }
}

impl AxisFilter for ExponentialFilter {
    fn update(&mut self, _t: f64, x: f64) -> f64 {
        let next = match self.prev {
            Some(prev) => prev + (x - prev) * self.factor,
            None => x,
        };
        self.prev = Some(next);
        next
    }

    fn reset(&mut self) {
        self.prev = None;
    }
}

// ── Mode selection ─────────────────────────────────────────

/// Which smoother drives the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmoothingMode {
    #[default]
    OneEuro,
    Exponential,
}

impl SmoothingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneEuro => "one-euro",
            Self::Exponential => "exponential",
        }
    }

    /// Parse the CLI spelling.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "one-euro" | "oneeuro" | "adaptive" => Some(Self::OneEuro),
            "exponential" | "exp" => Some(Self::Exponential),
            _ => None,
        }
    }

    /// Build one axis filter for this mode.
    pub fn build(&self) -> Box<dyn AxisFilter> {
        match self {
            Self::OneEuro => Box::new(OneEuroFilter::default()),
            Self::Exponential => Box::new(ExponentialFilter::default()),
        }
    }
}

// ── 2D ─────────────────────────────────────────────────────

/// Independent X and Y filters for a screen position.
pub struct CursorFilter {
    x: Box<dyn AxisFilter>,
    y: Box<dyn AxisFilter>,
}

impl CursorFilter {
    pub fn new(mode: SmoothingMode) -> Self {
        Self {
            x: mode.build(),
            y: mode.build(),
        }
    }

    pub fn update(&mut self, t: f64, pos: (f64, f64)) -> (f64, f64) {
        (self.x.update(t, pos.0), self.y.update(t, pos.1))
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }
}

impl Default for CursorFilter {
    fn default() -> Self {
        Self::new(SmoothingMode::OneEuro)
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_S: f64 = 1.0 / 30.0;

    #[test]
    fn test_first_sample_passes_through() {
        let mut f = OneEuroFilter::default();
        assert_eq!(f.update(0.0, 123.0), 123.0);
        assert_eq!(f.derivative(), 0.0);
    }

    #[test]
    fn test_constant_input_converges() {
        let mut f = OneEuroFilter::default();
        f.update(0.0, 0.0);
        let mut out = 0.0;
        for i in 1..=300 {
            out = f.update(i as f64 * FRAME_S, 1000.0);
        }
        assert!((out - 1000.0).abs() < 0.5, "expected ~1000, got {}", out);
    }

    #[test]
    fn test_steady_input_stays_put() {
        let mut f = OneEuroFilter::default();
        for i in 0..100 {
            let out = f.update(i as f64 * FRAME_S, 42.0);
            assert!((out - 42.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_min_cutoff_step_is_gradual() {
        // With no speed term the filter runs at min_cutoff only.
        let mut f = OneEuroFilter::new(DEFAULT_MIN_CUTOFF, 0.0);
        f.update(0.0, 0.0);
        let out = f.update(FRAME_S, 1000.0);
        assert!(out > 0.0, "output should move toward input, got {}", out);
        assert!(out < 10.0, "step should be heavily damped, got {}", out);
    }

    #[test]
    fn test_jitter_suppressed() {
        let mut f = OneEuroFilter::default();
        f.update(0.0, 500.0);
        let mut max_dev: f64 = 0.0;
        for i in 1..=300 {
            let raw = if i % 2 == 0 { 498.0 } else { 502.0 };
            let out = f.update(i as f64 * FRAME_S, raw);
            max_dev = max_dev.max((out - 500.0).abs());
        }
        assert!(max_dev < 1.0, "jitter leaked through: {}", max_dev);
    }

    #[test]
    fn test_fast_motion_tracks_closely() {
        let mut f = OneEuroFilter::default();
        f.update(0.0, 500.0);
        let mut out = 0.0;
        for i in 1..=30 {
            out = f.update(i as f64 * FRAME_S, 500.0 + i as f64 * 20.0);
        }
        assert!((out - 1100.0).abs() < 10.0, "lagging too far: {}", out);
    }

    #[test]
    fn test_non_increasing_timestamp_is_finite() {
        let mut f = OneEuroFilter::default();
        f.update(1.0, 100.0);
        let a = f.update(1.0, 200.0);
        let b = f.update(0.5, 300.0);
        let c = f.update(1.0 + FRAME_S, 300.0);
        for v in [a, b, c] {
            assert!(v.is_finite());
            assert!((100.0..=300.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn test_reset_reinitializes() {
        let mut f = OneEuroFilter::default();
        f.update(0.0, 0.0);
        f.update(FRAME_S, 10.0);
        f.reset();
        assert_eq!(f.update(2.0 * FRAME_S, 777.0), 777.0);
    }

    #[test]
    fn test_exponential_filter() {
        let mut f = ExponentialFilter::new(0.5);
        assert_eq!(f.update(0.0, 10.0), 10.0);
        assert_eq!(f.update(0.1, 20.0), 15.0);
        assert_eq!(f.update(0.2, 20.0), 17.5);
        f.reset();
        assert_eq!(f.update(0.3, 4.0), 4.0);
    }

    #[test]
    fn test_cursor_filter_axes_independent() {
        let mut f = CursorFilter::new(SmoothingMode::Exponential);
        assert_eq!(f.update(0.0, (0.0, 100.0)), (0.0, 100.0));
        assert_eq!(f.update(0.1, (10.0, 100.0)), (5.0, 100.0));
    }

    #[test]
    fn test_smoothing_mode_parse() {
        assert_eq!(SmoothingMode::parse("one-euro"), Some(SmoothingMode::OneEuro));
        assert_eq!(SmoothingMode::parse("exp"), Some(SmoothingMode::Exponential));
        assert_eq!(SmoothingMode::parse("kalman"), None);
        assert_eq!(SmoothingMode::Exponential.as_str(), "exponential");
    }
}
