//! Pointer control: the gesture state machine and the actions it emits.

pub mod action;
pub mod controller;

pub use action::{PointerAction, WindowCommand};
pub use controller::{CursorMode, FrameOutcome, PointerConfig, PointerController, PointerState};
