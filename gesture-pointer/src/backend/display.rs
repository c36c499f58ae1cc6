//! Headless display loop: observes the latest processed frame.
//!
//! Stands in for the feedback window: polls the shared cell, logs click
//! feedback and periodic status, and decides when to stop (signal,
//! exit timer, or the producer finishing).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::shared::{LatestFrame, ShutdownToken};

/// Global flag set by SIGTERM/SIGINT handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Display loop configuration.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Stop after this long (testing).
    pub exit_after: Option<Duration>,
    /// Interval between status log lines.
    pub status_interval: Duration,
    /// How often the shared cell is polled.
    pub poll_interval: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            exit_after: None,
            status_interval: Duration::from_secs(10),
            poll_interval: Duration::from_millis(5),
        }
    }
}

/// Why the display loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Signal,
    ExitTimer,
    ProducerDone,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::ExitTimer => "exit-timer",
            Self::ProducerDone => "producer-done",
        }
    }
}

/// Install signal handlers for graceful shutdown (SIGTERM, SIGINT).
pub fn install_signal_handlers() {
    unsafe {
        libc::signal(libc::SIGTERM, signal_handler as libc::sighandler_t);
        libc::signal(libc::SIGINT, signal_handler as libc::sighandler_t);
    }
}

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Run until a stop condition fires.  Does not cancel the token itself.
pub fn run_display(latest: &LatestFrame, token: &ShutdownToken, config: &DisplayConfig) -> StopReason {
    let start_time = Instant::now();
    let mut last_status_log = Instant::now();
    let mut last_sequence = 0;
    let mut last_color = None;

    info!(
        "Display loop started (poll {}ms, status every {}s)",
        config.poll_interval.as_millis(),
        config.status_interval.as_secs(),
    );

    let reason = loop {
        // Check global shutdown flag (set by signal handler)
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            break StopReason::Signal;
        }
        if token.is_cancelled() {
            break StopReason::ProducerDone;
        }
        if let Some(dur) = config.exit_after {
            if start_time.elapsed() >= dur {
                break StopReason::ExitTimer;
            }
        }

        if let Some(frame) = latest.snapshot() {
            if frame.sequence != last_sequence {
                last_sequence = frame.sequence;
                let color = frame.overlay.marker_color();
                if color != last_color {
                    debug!(
                        "Marker at ({}, {}): {}",
                        frame.overlay.marker.0,
                        frame.overlay.marker.1,
                        color.unwrap_or("none"),
                    );
                    last_color = color;
                }
            }

            // Periodic status logging
            if last_status_log.elapsed() >= config.status_interval {
                info!("Status: {}", frame.status_sexp());
                last_status_log = Instant::now();
            }
        }

        std::thread::sleep(config.poll_interval);
    };

    info!(
        "Display loop stopping ({}) after {:.1}s",
        reason.as_str(),
        start_time.elapsed().as_secs_f64()
    );
    reason
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::shared::{Overlay, ProcessedFrame};
    use crate::pointer::CursorMode;

    fn fast_config() -> DisplayConfig {
        DisplayConfig {
            exit_after: None,
            status_interval: Duration::from_millis(1),
            poll_interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_stops_when_token_cancelled() {
        let latest = LatestFrame::default();
        let token = ShutdownToken::default();
        token.cancel();
        assert_eq!(run_display(&latest, &token, &fast_config()), StopReason::ProducerDone);
    }

    #[test]
    fn test_exit_timer() {
        let latest = LatestFrame::default();
        latest.publish(ProcessedFrame {
            sequence: 1,
            timestamp_s: 0.0,
            fps: 0.0,
            hand_present: true,
            overlay: Overlay {
                marker: (10, 10),
                left_clicked: true,
                right_clicked: false,
                cursor_mode: CursorMode::Locked,
            },
        });
        let token = ShutdownToken::default();
        let config = DisplayConfig {
            exit_after: Some(Duration::from_millis(20)),
            ..fast_config()
        };
        let started = Instant::now();
        assert_eq!(run_display(&latest, &token, &config), StopReason::ExitTimer);
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_producer_finishing_mid_loop() {
        let latest = LatestFrame::default();
        let token = ShutdownToken::default();
        let remote = token.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            remote.cancel();
        });
        let config = DisplayConfig {
            exit_after: Some(Duration::from_secs(5)),
            ..fast_config()
        };
        assert_eq!(run_display(&latest, &token, &config), StopReason::ProducerDone);
        handle.join().unwrap();
    }
}
