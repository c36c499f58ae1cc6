//! Discrete hand signals derived from one landmark frame.
//!
//! Finger counting and pinch distances.  Stateless; the pointer state
//! machine adds hysteresis and debouncing on top.

use tracing::trace;

use super::landmarks::{HandJoint, HandLandmarks, Landmark};

/// Coarse hand shape used by the window gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPosture {
    /// No fingers up.
    Fist,
    /// All four fingers up (thumb is not considered).
    OpenPalm,
    /// Anything in between.
    Other,
}

impl HandPosture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fist => "fist",
            Self::OpenPalm => "open-palm",
            Self::Other => "other",
        }
    }
}

/// Count raised fingers among index, middle, ring and pinky.
///
/// A finger is up when its tip is above (smaller y than) its PIP joint.
/// The thumb is left out: its extension is sideways and depends on
/// handedness, which the tracker does not report here.
pub fn count_fingers(hand: &HandLandmarks) -> u8 {
    HandJoint::finger_tip_pip_pairs()
        .iter()
        .filter(|(tip, pip)| {
            let up = hand.joint(*tip).y < hand.joint(*pip).y;
            trace!(finger = tip.as_str(), up);
            up
        })
        .count() as u8
}

/// Map a finger count to a posture.
pub fn posture(hand: &HandLandmarks) -> HandPosture {
    match count_fingers(hand) {
        0 => HandPosture::Fist,
        4 => HandPosture::OpenPalm,
        _ => HandPosture::Other,
    }
}

/// Planar distance between two landmarks in normalized units (no depth).
pub fn calculate_distance(p1: Landmark, p2: Landmark) -> f32 {
    (p1.x - p2.x).hypot(p1.y - p2.y)
}

/// Thumb tip to index tip distance (left click / lock signal).
pub fn index_pinch_distance(hand: &HandLandmarks) -> f32 {
    calculate_distance(hand.joint(HandJoint::IndexTip), hand.joint(HandJoint::ThumbTip))
}

/// Thumb tip to middle tip distance (right click signal).
pub fn middle_pinch_distance(hand: &HandLandmarks) -> f32 {
    calculate_distance(hand.joint(HandJoint::MiddleTip), hand.joint(HandJoint::ThumbTip))
}

// ── Test helpers ───────────────────────────────────────────

/// A hand with every finger curled (tips below PIPs) and the thumb well
/// away from the fingertips.
#[cfg(test)]
pub(crate) fn make_fist() -> HandLandmarks {
    use super::landmarks::JOINT_COUNT;

    let mut hand = HandLandmarks::new([Landmark::new(0.5, 0.5); JOINT_COUNT]);
    for (i, (tip, pip)) in HandJoint::finger_tip_pip_pairs().iter().enumerate() {
        let x = 0.45 + i as f32 * 0.04;
        hand.set_joint(*pip, Landmark::new(x, 0.50));
        hand.set_joint(*tip, Landmark::new(x, 0.55));
    }
    hand.set_joint(HandJoint::ThumbTip, Landmark::new(0.20, 0.80));
    hand
}

/// Like `make_fist` but with all four fingers raised.
#[cfg(test)]
pub(crate) fn make_open_palm() -> HandLandmarks {
    let mut hand = make_fist();
    for (tip, pip) in HandJoint::finger_tip_pip_pairs() {
        let p = hand.joint(pip);
        hand.set_joint(tip, Landmark::new(p.x, p.y - 0.10));
    }
    hand
}

// ── Tests ──────────────────────────────────────────────────
