//! Producer loop: pull frames, run the pointer pipeline, drive the sink.

use std::time::Instant;

use tracing::{debug, info, warn};

use super::frame_timing::FrameTiming;
use super::shared::{LatestFrame, Overlay, ProcessedFrame, ShutdownToken};
use crate::pointer::{PointerAction, PointerController};
use crate::sink::{self, ActionSink};
use crate::source::{FrameSource, SourceEvent};

/// Counters reported when the producer stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub frames: u64,
    pub hand_frames: u64,
    pub capture_failures: u64,
    pub sink_errors: u64,
}

/// Run until the token is cancelled or the source closes.
///
/// Capture failures and sink errors are logged and skipped.  On exit the
/// left button is released if it is still held and the source is
/// dropped.  A closing source cancels the token so the display side
/// stops too.
pub fn run_producer(
    mut source: Box<dyn FrameSource>,
    sink: &mut dyn ActionSink,
    controller: &mut PointerController,
    latest: &LatestFrame,
    token: &ShutdownToken,
) -> ProducerStats {
    let mut stats = ProducerStats::default();
    let mut timing = FrameTiming::default();
    let mut hand_present = false;
    let (sw, sh) = sink.screen_size();
    let mut last_cursor = (sw / 2, sh / 2);

    info!("Producer started (source {}, sink {})", source.name(), sink.name());

    while !token.is_cancelled() {
        let frame = match source.next_event() {
            Ok(SourceEvent::Frame(frame)) => frame,
            Ok(SourceEvent::Idle) => continue,
            Ok(SourceEvent::Closed) => {
                info!("Landmark stream closed");
                token.cancel();
                break;
            }
            Err(e) => {
                stats.capture_failures += 1;
                warn!("Frame capture failed, skipping: {}", e);
                continue;
            }
        };
        let started = Instant::now();
        stats.frames += 1;

        let (actions, overlay) = match &frame.hand {
            Some(hand) => {
                if !hand_present {
                    debug!("Hand detected");
                }
                stats.hand_frames += 1;
                let cursor = sink.cursor_position().unwrap_or(last_cursor);
                let out = controller.process_frame(
                    hand,
                    (frame.width, frame.height),
                    frame.timestamp_s,
                    cursor,
                );
                let overlay = Overlay {
                    marker: out.marker,
                    left_clicked: out.left_clicked,
                    right_clicked: out.right_clicked,
                    cursor_mode: out.cursor_mode,
                };
                (out.actions, overlay)
            }
            None => {
                if hand_present {
                    debug!("Hand lost");
                }
                let actions = controller.hand_lost();
                let overlay = Overlay {
                    marker: (0, 0),
                    left_clicked: false,
                    right_clicked: false,
                    cursor_mode: controller.state().cursor_mode(),
                };
                (actions, overlay)
            }
        };
        hand_present = frame.hand.is_some();

        for action in &actions {
            if let PointerAction::Move { x, y } = action {
                last_cursor = (*x, *y);
            }
        }
        stats.sink_errors += sink::dispatch(sink, &actions) as u64;

        timing.record_frame(frame.timestamp_s, started.elapsed().as_secs_f64() * 1000.0);
        latest.publish(ProcessedFrame {
            sequence: stats.frames,
            timestamp_s: frame.timestamp_s,
            fps: timing.fps(),
            hand_present,
            overlay,
        });
    }

    let release = controller.release_all();
    stats.sink_errors += sink::dispatch(sink, &release) as u64;
    drop(source);

    info!(
        "Producer stopped: {} frame(s), {} with hand, {} capture failure(s), {} sink error(s), timing {}",
        stats.frames,
        stats.hand_frames,
        stats.capture_failures,
        stats.sink_errors,
        timing.stats_sexp(),
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::PointerConfig;
    use crate::sink::DryRunSink;
    use crate::source::script::pose;
    use crate::source::{CapturedFrame, ScriptedSource};
    use crate::tracking::HandLandmarks;

    const POINT: [bool; 4] = [true, false, false, false];

    fn frames(hands: Vec<Option<HandLandmarks>>) -> Vec<CapturedFrame> {
        hands
            .into_iter()
            .enumerate()
            .map(|(i, hand)| CapturedFrame {
                timestamp_s: i as f64 / 30.0,
                width: 640,
                height: 480,
                hand,
            })
            .collect()
    }

    fn pinch(d: f32) -> Option<HandLandmarks> {
        Some(pose((0.5, 0.55), POINT, d, None))
    }

    fn run(script: Vec<CapturedFrame>) -> (ProducerStats, DryRunSink, LatestFrame, ShutdownToken) {
        let mut sink = DryRunSink::new((1920, 1080));
        let mut controller = PointerController::new(PointerConfig::default(), (1920, 1080));
        let latest = LatestFrame::default();
        let token = ShutdownToken::default();
        let stats = run_producer(
            Box::new(ScriptedSource::unpaced(script)),
            &mut sink,
            &mut controller,
            &latest,
            &token,
        );
        (stats, sink, latest, token)
    }

    fn count(sink: &DryRunSink, action: PointerAction) -> usize {
        sink.history.iter().filter(|a| **a == action).count()
    }

    #[test]
    fn test_end_to_end_click() {
        let (stats, sink, latest, token) =
            run(frames(vec![pinch(0.2), pinch(0.03), pinch(0.02), pinch(0.07)]));
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.hand_frames, 4);
        assert_eq!(count(&sink, PointerAction::MouseDown), 1);
        assert_eq!(count(&sink, PointerAction::MouseUp), 1);
        assert!(!sink.is_left_down());
        assert!(token.is_cancelled(), "closed stream should cancel the token");

        let last = latest.snapshot().unwrap();
        assert_eq!(last.sequence, 4);
        assert!(!last.overlay.left_clicked);
    }

    #[test]
    fn test_stream_end_releases_held_button() {
        let (_, sink, _, _) = run(frames(vec![pinch(0.2), pinch(0.03), pinch(0.02)]));
        assert_eq!(sink.history.last(), Some(&PointerAction::MouseUp));
        assert!(!sink.is_left_down());
    }

    #[test]
    fn test_hand_loss_releases_button() {
        let (stats, sink, latest, _) = run(frames(vec![pinch(0.03), None, None]));
        assert_eq!(stats.hand_frames, 1);
        assert_eq!(count(&sink, PointerAction::MouseDown), 1);
        assert_eq!(count(&sink, PointerAction::MouseUp), 1);
        assert!(!sink.is_left_down());

        let last = latest.snapshot().unwrap();
        assert!(!last.hand_present);
        assert_eq!(last.overlay.marker_color(), None);
    }

    #[test]
    fn test_no_hand_emits_no_moves() {
        let (_, sink, _, _) = run(frames(vec![None, None, None]));
        assert!(sink.history.is_empty());
    }

    #[test]
    fn test_cancelled_token_stops_immediately() {
        let mut sink = DryRunSink::new((1920, 1080));
        let mut controller = PointerController::new(PointerConfig::default(), (1920, 1080));
        let latest = LatestFrame::default();
        let token = ShutdownToken::default();
        token.cancel();
        let stats = run_producer(
            Box::new(ScriptedSource::unpaced(frames(vec![pinch(0.2)]))),
            &mut sink,
            &mut controller,
            &latest,
            &token,
        );
        assert_eq!(stats.frames, 0);
        assert!(latest.snapshot().is_none());
        assert!(sink.history.is_empty());
    }

    /// Fails every other poll before yielding frames.
    struct Flaky {
        inner: ScriptedSource,
        fail_next: bool,
    }

    impl FrameSource for Flaky {
        fn next_event(&mut self) -> anyhow::Result<SourceEvent> {
            self.fail_next = !self.fail_next;
            if self.fail_next {
                anyhow::bail!("camera hiccup");
            }
            self.inner.next_event()
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[test]
    fn test_capture_failures_are_skipped() {
        let mut sink = DryRunSink::new((1920, 1080));
        let mut controller = PointerController::new(PointerConfig::default(), (1920, 1080));
        let latest = LatestFrame::default();
        let token = ShutdownToken::default();
        let source = Flaky {
            inner: ScriptedSource::unpaced(frames(vec![pinch(0.2), pinch(0.2)])),
            fail_next: false,
        };
        let stats = run_producer(Box::new(source), &mut sink, &mut controller, &latest, &token);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.capture_failures, 3);
        assert_eq!(latest.snapshot().map(|f| f.sequence), Some(2));
    }
}
