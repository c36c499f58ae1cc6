//! Hand tracking signal layer: landmarks, smoothing, mapping, classification.
//!
//! Everything here is per-frame and free of OS side effects.

pub mod classifier;
pub mod filter;
pub mod landmarks;
pub mod mapper;

pub use classifier::HandPosture;
pub use filter::{CursorFilter, SmoothingMode};
pub use landmarks::{HandJoint, HandLandmarks, Landmark, JOINT_COUNT};
pub use mapper::CoordinateMapper;
