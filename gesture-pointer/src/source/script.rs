//! Scripted landmark source and the built-in demo gesture sequence.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::{wire, CapturedFrame, FrameSource, SourceEvent};
use crate::tracking::{HandJoint, HandLandmarks, Landmark, JOINT_COUNT};

/// Demo frame rate.
const DEMO_FPS: f64 = 30.0;

/// Replays a fixed list of frames.
///
/// Paced sources release each frame once the wall clock reaches its
/// timestamp; unpaced ones release them as fast as they are polled.
pub struct ScriptedSource {
    frames: VecDeque<CapturedFrame>,
    pacing: Option<Pacing>,
}

struct Pacing {
    start: Instant,
    poll_interval: Duration,
}

impl ScriptedSource {
    pub fn unpaced(frames: Vec<CapturedFrame>) -> Self {
        Self {
            frames: frames.into(),
            pacing: None,
        }
    }

    pub fn paced(frames: Vec<CapturedFrame>, poll_interval: Duration) -> Self {
        Self {
            pacing: Some(Pacing {
                start: Instant::now(),
                poll_interval,
            }),
            ..Self::unpaced(frames)
        }
    }
}

impl FrameSource for ScriptedSource {
    fn next_event(&mut self) -> anyhow::Result<SourceEvent> {
        let Some(next) = self.frames.front() else {
            return Ok(SourceEvent::Closed);
        };

        if let Some(pacing) = &self.pacing {
            let due = Duration::from_secs_f64(next.timestamp_s.max(0.0));
            let elapsed = pacing.start.elapsed();
            if elapsed < due {
                std::thread::sleep((due - elapsed).min(pacing.poll_interval));
                if pacing.start.elapsed() < due {
                    return Ok(SourceEvent::Idle);
                }
            }
        }

        Ok(match self.frames.pop_front() {
            Some(frame) => SourceEvent::Frame(frame),
            None => SourceEvent::Closed,
        })
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}

// ── Demo script ────────────────────────────────────────────

/// Build a plausible right hand.
///
/// - `mcp`: index knuckle position (the cursor anchor).
/// - `fingers_up`: index, middle, ring, pinky raised.
/// - `index_pinch`: thumb tip offset to the right of the index tip.
/// - `middle_pinch`: if set, the middle tip is placed this far below the
///   thumb tip.
pub fn pose(
    mcp: (f32, f32),
    fingers_up: [bool; 4],
    index_pinch: f32,
    middle_pinch: Option<f32>,
) -> HandLandmarks {
    let (cx, cy) = mcp;
    let mut hand = HandLandmarks::new([Landmark::new(cx, cy); JOINT_COUNT]);
    hand.set_joint(HandJoint::Wrist, Landmark::new(cx + 0.05, cy + 0.20));

    let fingers = [
        [HandJoint::IndexMcp, HandJoint::IndexPip, HandJoint::IndexDip, HandJoint::IndexTip],
        [HandJoint::MiddleMcp, HandJoint::MiddlePip, HandJoint::MiddleDip, HandJoint::MiddleTip],
        [HandJoint::RingMcp, HandJoint::RingPip, HandJoint::RingDip, HandJoint::RingTip],
        [HandJoint::PinkyMcp, HandJoint::PinkyPip, HandJoint::PinkyDip, HandJoint::PinkyTip],
    ];
    for (i, joints) in fingers.iter().enumerate() {
        let x = cx + i as f32 * 0.035;
        let base = cy + i as f32 * 0.005;
        let ys = if fingers_up[i] {
            [base, base - 0.06, base - 0.09, base - 0.12]
        } else {
            [base, base - 0.04, base - 0.02, base + 0.01]
        };
        for (joint, y) in joints.iter().zip(ys) {
            hand.set_joint(*joint, Landmark::new(x, y));
        }
    }

    let tip = hand.joint(HandJoint::IndexTip);
    hand.set_joint(HandJoint::ThumbCmc, Landmark::new(cx - 0.02, cy + 0.16));
    hand.set_joint(HandJoint::ThumbMcp, Landmark::new(cx - 0.05, cy + 0.10));
    hand.set_joint(HandJoint::ThumbIp, Landmark::new(cx - 0.06, cy + 0.05));
    let thumb = Landmark::new(tip.x + index_pinch, tip.y);
    hand.set_joint(HandJoint::ThumbTip, thumb);

    if let Some(d) = middle_pinch {
        hand.set_joint(HandJoint::MiddleTip, Landmark::new(thumb.x, thumb.y + d));
    }
    hand
}

/// A demo sequence exercising every gesture: hover, click, drag, right
/// click, hand loss, minimize and restore.
pub fn demo_script(frame_size: (u32, u32)) -> Vec<CapturedFrame> {
    const POINT: [bool; 4] = [true, false, false, false];
    const FIST: [bool; 4] = [false; 4];
    const PALM: [bool; 4] = [true; 4];
    const APART: f32 = 0.2;

    let mut frames = Vec::new();
    let mut t = 0.0;
    let mut push = |hand: Option<HandLandmarks>, count: usize| {
        for _ in 0..count {
            frames.push(CapturedFrame {
                timestamp_s: t,
                width: frame_size.0,
                height: frame_size.1,
                hand: hand.clone(),
            });
            t += 1.0 / DEMO_FPS;
        }
    };

    // Hover: one slow circle.
    for i in 0..60 {
        let a = i as f32 / 60.0 * std::f32::consts::TAU;
        let mcp = (0.5 + 0.12 * a.cos(), 0.55 + 0.10 * a.sin());
        push(Some(pose(mcp, POINT, APART, None)), 1);
    }

    // Click in place.
    let home = (0.62, 0.55);
    push(Some(pose(home, POINT, APART, None)), 6);
    push(Some(pose(home, POINT, 0.03, None)), 4);
    push(Some(pose(home, POINT, APART, None)), 20);

    // Drag to the left.
    for i in 0..45 {
        let x = 0.62 - 0.006 * i as f32;
        push(Some(pose((x, 0.55), POINT, 0.03, None)), 1);
    }
    push(Some(pose((0.35, 0.55), POINT, APART, None)), 15);

    // Right click.
    push(Some(pose((0.35, 0.55), POINT, APART, Some(0.03))), 3);
    push(Some(pose((0.35, 0.55), POINT, APART, None)), 12);

    // Hand leaves the frame.
    push(None, 15);

    // Fist minimizes, open palm restores after the cooldown.
    push(Some(pose((0.5, 0.5), FIST, APART, None)), 10);
    push(None, 30);
    push(Some(pose((0.5, 0.5), PALM, APART, None)), 10);
    push(Some(pose((0.5, 0.55), POINT, APART, None)), 15);

    frames
}

/// Write the demo sequence in wire format, one frame per line, so it can
/// be piped back in through `--source stdin`.  Returns the frame count.
pub fn write_demo_script<W: std::io::Write>(out: &mut W, frame_size: (u32, u32)) -> anyhow::Result<usize> {
    let frames = demo_script(frame_size);
    for frame in &frames {
        writeln!(out, "{}", wire::format_frame(frame))?;
    }
    out.flush()?;
    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::{PointerAction, PointerConfig, PointerController, WindowCommand};
    use crate::tracking::classifier::{self, HandPosture};

    #[test]
    fn test_pose_postures() {
        let fist = pose((0.5, 0.5), [false; 4], 0.2, None);
        let palm = pose((0.5, 0.5), [true; 4], 0.2, None);
        let point = pose((0.5, 0.5), [true, false, false, false], 0.2, None);
        assert_eq!(classifier::posture(&fist), HandPosture::Fist);
        assert_eq!(classifier::posture(&palm), HandPosture::OpenPalm);
        assert_eq!(classifier::posture(&point), HandPosture::Other);
    }

    #[test]
    fn test_pose_pinch_distances() {
        let hand = pose((0.5, 0.5), [true, false, false, false], 0.03, Some(0.04));
        assert!((classifier::index_pinch_distance(&hand) - 0.03).abs() < 1e-5);
        assert!((classifier::middle_pinch_distance(&hand) - 0.04).abs() < 1e-5);
    }

    #[test]
    fn test_unpaced_replays_then_closes() {
        let frames = demo_script((640, 480));
        let total = frames.len();
        let mut src = ScriptedSource::unpaced(frames);
        let mut seen = 0;
        while let SourceEvent::Frame(_) = src.next_event().unwrap() {
            seen += 1;
        }
        assert_eq!(seen, total);
        assert!(src.frames.is_empty());
        assert_eq!(src.next_event().unwrap(), SourceEvent::Closed);
    }

    #[test]
    fn test_paced_source_waits() {
        let frame = CapturedFrame {
            timestamp_s: 30.0,
            width: 640,
            height: 480,
            hand: None,
        };
        let mut src = ScriptedSource::paced(vec![frame], Duration::from_millis(1));
        assert_eq!(src.next_event().unwrap(), SourceEvent::Idle);
        assert_eq!(src.frames.len(), 1);
    }

    #[test]
    fn test_written_demo_parses_back() {
        let mut out = Vec::new();
        let written = write_demo_script(&mut out, (320, 240)).unwrap();
        let expected = demo_script((320, 240));
        assert_eq!(written, expected.len());

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), expected.len());
        for (line, frame) in lines.iter().zip(&expected) {
            let parsed = wire::parse_frame(line, (1, 1), -1.0).unwrap();
            assert_eq!(parsed.timestamp_s, frame.timestamp_s);
            assert_eq!((parsed.width, parsed.height), (320, 240));
            assert_eq!(parsed.hand.is_some(), frame.hand.is_some());
        }
    }

    #[test]
    fn test_demo_timestamps_increase() {
        let frames = demo_script((640, 480));
        assert!(frames.windows(2).all(|w| w[1].timestamp_s > w[0].timestamp_s));
    }

    #[test]
    fn test_demo_exercises_every_gesture() {
        let mut ctrl = PointerController::new(PointerConfig::default(), (1920, 1080));
        let mut cursor = (0, 0);
        let mut actions = Vec::new();
        for frame in demo_script((640, 480)) {
            let out = match &frame.hand {
                Some(hand) => ctrl
                    .process_frame(hand, (frame.width, frame.height), frame.timestamp_s, cursor)
                    .actions,
                None => ctrl.hand_lost(),
            };
            for a in &out {
                if let PointerAction::Move { x, y } = a {
                    cursor = (*x, *y);
                }
            }
            actions.extend(out);
        }

        let count = |want: PointerAction| actions.iter().filter(|a| **a == want).count();
        assert_eq!(count(PointerAction::MouseDown), 2, "click + drag");
        assert_eq!(count(PointerAction::MouseUp), 2);
        assert_eq!(count(PointerAction::RightClick), 1);
        assert_eq!(count(PointerAction::Hotkey(WindowCommand::Minimize)), 1);
        assert_eq!(count(PointerAction::Hotkey(WindowCommand::Restore)), 1);
    }
}
