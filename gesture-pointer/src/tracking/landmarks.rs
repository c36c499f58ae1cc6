//! Hand landmark data structures.
//!
//! Models the 21 joints per hand reported by MediaPipe-style trackers,
//! in normalized image coordinates (x right, y down, both in [0, 1]).
//! The tracker owns these; the pointer pipeline only reads them.

use tracing::debug;

// ── Joint definitions ──────────────────────────────────────

/// The 21 hand joints in tracker output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of joints per hand.
pub const JOINT_COUNT: usize = 21;

impl HandJoint {
    /// Convert joint enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }

    /// (tip, pip) pairs for the four non-thumb fingers.
    pub fn finger_tip_pip_pairs() -> [(HandJoint, HandJoint); 4] {
        [
            (Self::IndexTip, Self::IndexPip),
            (Self::MiddleTip, Self::MiddlePip),
            (Self::RingTip, Self::RingPip),
            (Self::PinkyTip, Self::PinkyPip),
        ]
    }
}

// ── Landmark ───────────────────────────────────────────────

/// A single tracked point in normalized frame coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel position of this landmark inside a `width` x `height` frame.
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        (
            (self.x * width as f32) as i32,
            (self.y * height as f32) as i32,
        )
    }
}

// ── Hand landmarks ─────────────────────────────────────────

/// All 21 landmarks of one detected hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; JOINT_COUNT],
}

impl HandLandmarks {
    /// Build from a full joint array.
    pub fn new(points: [Landmark; JOINT_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice; `None` unless it holds exactly 21 landmarks.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        if points.len() != JOINT_COUNT {
            debug!(
                "Hand landmarks: expected {} joints, got {}",
                JOINT_COUNT,
                points.len(),
            );
            return None;
        }
        let mut out = [Landmark::default(); JOINT_COUNT];
        out.copy_from_slice(points);
        Some(Self { points: out })
    }

    /// Landmark of a given joint.
    pub fn joint(&self, joint: HandJoint) -> Landmark {
        self.points[joint.index()]
    }

    /// Overwrite a single joint.
    pub fn set_joint(&mut self, joint: HandJoint, landmark: Landmark) {
        self.points[joint.index()] = landmark;
    }

    /// Horizontally mirrored copy (x -> 1 - x), as seen in a selfie view.
    pub fn mirrored(&self) -> Self {
        let mut points = self.points;
        for p in &mut points {
            p.x = 1.0 - p.x;
        }
        Self { points }
    }

    pub fn points(&self) -> &[Landmark; JOINT_COUNT] {
        &self.points
    }
}

// ── Tests ──────────────────────────────────────────────────
