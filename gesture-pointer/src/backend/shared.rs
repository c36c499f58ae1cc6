//! State shared between the producer and display threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::pointer::CursorMode;

/// Click-state feedback drawn over the camera image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    /// Index fingertip in frame pixels.
    pub marker: (i32, i32),
    pub left_clicked: bool,
    pub right_clicked: bool,
    pub cursor_mode: CursorMode,
}

impl Overlay {
    /// Color of the filled marker; none while no button is active.
    /// Right is drawn over left when both are active.
    pub fn marker_color(&self) -> Option<&'static str> {
        if self.right_clicked {
            Some("red")
        } else if self.left_clicked {
            Some("green")
        } else {
            None
        }
    }
}

/// Result of processing one captured frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame {
    /// Monotonic frame counter, starting at 1.
    pub sequence: u64,
    pub timestamp_s: f64,
    pub fps: f64,
    pub hand_present: bool,
    pub overlay: Overlay,
}

impl ProcessedFrame {
    /// Status as an s-expression.
    pub fn status_sexp(&self) -> String {
        let b = |v: bool| if v { "t" } else { "nil" };
        format!(
            "(:sequence {} :t {:.3} :fps {:.1} :hand {} :marker ({} {}) :color {} :left {} :right {} :mode {})",
            self.sequence,
            self.timestamp_s,
            self.fps,
            b(self.hand_present),
            self.overlay.marker.0,
            self.overlay.marker.1,
            self.overlay.marker_color().unwrap_or("nil"),
            b(self.overlay.left_clicked),
            b(self.overlay.right_clicked),
            self.overlay.cursor_mode.as_str(),
        )
    }
}

/// Single-slot cell holding the most recent processed frame.
///
/// The producer replaces it wholesale; readers copy it out.  Older
/// frames are simply overwritten.
#[derive(Debug, Clone, Default)]
pub struct LatestFrame {
    inner: Arc<Mutex<Option<ProcessedFrame>>>,
}

impl LatestFrame {
    pub fn publish(&self, frame: ProcessedFrame) {
        let mut slot = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(frame);
    }

    pub fn snapshot(&self) -> Option<ProcessedFrame> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Cooperative cancellation flag shared by both threads.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
