//! Frame timing instrumentation for the producer loop.
//!
//! Tracks frame-to-frame intervals and per-frame processing time and
//! keeps rolling statistics for the status overlay.

use std::collections::VecDeque;

/// Rolling frame timing statistics over a window of samples.
#[derive(Debug)]
pub struct FrameTiming {
    /// Time between consecutive frame timestamps (ms).
    pub intervals: VecDeque<f64>,
    /// Capture-to-dispatch processing time per frame (ms).
    pub processing_times: VecDeque<f64>,
    /// Maximum number of samples to keep.
    pub window_size: usize,
    /// Total frames recorded.
    pub total_frames: u64,
    /// Frames whose processing exceeded the budget.
    pub slow_frames: u64,
    /// Processing budget in milliseconds (33.3 for a 30 fps camera).
    pub budget_ms: f64,
    last_timestamp: Option<f64>,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(120, 33.3)
    }
}

impl FrameTiming {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            intervals: VecDeque::with_capacity(window_size),
            processing_times: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
            total_frames: 0,
            slow_frames: 0,
            budget_ms,
            last_timestamp: None,
        }
    }

    /// Record a frame captured at `timestamp_s` that took `processing_ms`.
    ///
    /// Non-increasing timestamps record no interval.
    pub fn record_frame(&mut self, timestamp_s: f64, processing_ms: f64) {
        if let Some(prev) = self.last_timestamp {
            let dt_ms = (timestamp_s - prev) * 1000.0;
            if dt_ms > 0.0 {
                Self::push_sample(&mut self.intervals, dt_ms, self.window_size);
            }
        }
        self.last_timestamp = Some(timestamp_s);

        Self::push_sample(&mut self.processing_times, processing_ms, self.window_size);
        self.total_frames += 1;
        if processing_ms > self.budget_ms {
            self.slow_frames += 1;
        }
    }

    fn push_sample(samples: &mut VecDeque<f64>, value: f64, window_size: usize) {
        samples.push_back(value);
        while samples.len() > window_size {
            samples.pop_front();
        }
    }

    /// Compute percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn sorted(samples: &VecDeque<f64>) -> Vec<f64> {
        let mut v: Vec<f64> = samples.iter().copied().collect();
        v.sort_by(f64::total_cmp);
        v
    }

    /// Frames per second from the median interval (0 until two frames).
    pub fn fps(&self) -> f64 {
        let p50 = Self::percentile(&Self::sorted(&self.intervals), 50.0);
        if p50 > 0.0 {
            1000.0 / p50
        } else {
            0.0
        }
    }

    pub fn stats(&self) -> FrameTimingStats {
        let intervals = Self::sorted(&self.intervals);
        let processing = Self::sorted(&self.processing_times);
        let interval_p50 = Self::percentile(&intervals, 50.0);

        FrameTimingStats {
            interval_p50,
            interval_p99: Self::percentile(&intervals, 99.0),
            processing_p50: Self::percentile(&processing, 50.0),
            processing_p99: Self::percentile(&processing, 99.0),
            fps: if interval_p50 > 0.0 {
                1000.0 / interval_p50
            } else {
                0.0
            },
            slow_pct: if self.total_frames > 0 {
                (self.slow_frames as f64 / self.total_frames as f64) * 100.0
            } else {
                0.0
            },
            total_frames: self.total_frames,
            slow_frames: self.slow_frames,
        }
    }

    /// Format stats as an s-expression for status output.
    pub fn stats_sexp(&self) -> String {
        let s = self.stats();
        format!(
            "(:fps {:.1} :interval-p50 {:.1} :interval-p99 {:.1} :processing-p50 {:.2} :processing-p99 {:.2} :slow-pct {:.1} :total-frames {} :slow-frames {})",
            s.fps, s.interval_p50, s.interval_p99, s.processing_p50, s.processing_p99,
            s.slow_pct, s.total_frames, s.slow_frames,
        )
    }
}

/// Computed frame timing statistics.
#[derive(Debug, Clone)]
pub struct FrameTimingStats {
    pub interval_p50: f64,
    pub interval_p99: f64,
    pub processing_p50: f64,
    pub processing_p99: f64,
    pub fps: f64,
    pub slow_pct: f64,
    pub total_frames: u64,
    pub slow_frames: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let ft = FrameTiming::new(10, 33.3);
        let stats = ft.stats();
        assert_eq!(stats.total_frames, 0);
        assert_eq!(stats.fps, 0.0);
        assert_eq!(ft.fps(), 0.0);
    }

    #[test]
    fn test_first_frame_has_no_interval() {
        let mut ft = FrameTiming::default();
        ft.record_frame(5.0, 1.0);
        assert!(ft.intervals.is_empty());
        assert_eq!(ft.total_frames, 1);
        assert_eq!(ft.fps(), 0.0);
    }

    #[test]
    fn test_fps_from_intervals() {
        let mut ft = FrameTiming::default();
        for i in 0..31 {
            ft.record_frame(i as f64 * 0.04, 2.0);
        }
        assert!((ft.fps() - 25.0).abs() < 0.01, "fps {}", ft.fps());
        assert!((ft.stats().interval_p50 - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_slow_frame_detection() {
        let mut ft = FrameTiming::new(100, 10.0);
        ft.record_frame(0.0, 12.0);
        assert_eq!(ft.slow_frames, 1);
        ft.record_frame(0.1, 3.0);
        assert_eq!(ft.slow_frames, 1);
        assert!((ft.stats().slow_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_increasing_timestamp_skips_interval() {
        let mut ft = FrameTiming::default();
        ft.record_frame(1.0, 1.0);
        ft.record_frame(1.0, 1.0);
        ft.record_frame(0.5, 1.0);
        assert!(ft.intervals.is_empty());
        assert_eq!(ft.total_frames, 3);
    }

    #[test]
    fn test_window_size_trim() {
        let mut ft = FrameTiming::new(5, 33.3);
        for i in 0..10 {
            ft.record_frame(i as f64, 1.0);
        }
        assert_eq!(ft.processing_times.len(), 5);
        assert_eq!(ft.intervals.len(), 5);
        assert_eq!(ft.total_frames, 10);
    }

    #[test]
    fn test_stats_sexp_format() {
        let mut ft = FrameTiming::default();
        ft.record_frame(0.0, 2.0);
        ft.record_frame(0.05, 2.0);
        let sexp = ft.stats_sexp();
        assert!(sexp.starts_with("(:fps 20.0"), "got {}", sexp);
        assert!(sexp.contains(":total-frames 2"));
    }
}
