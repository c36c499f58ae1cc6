//! Discrete OS actions emitted by the pointer state machine.
//!
//! The state machine never touches the OS; it returns these values and an
//! `ActionSink` executes them.

/// Window-management request bound to the fist / open-palm gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    /// Hide all windows (fist).
    Minimize,
    /// Bring them back (open palm).
    Restore,
}

impl WindowCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimize => "minimize",
            Self::Restore => "restore",
        }
    }
}

/// One pointer action for the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Absolute cursor move in screen pixels.
    Move { x: i32, y: i32 },
    /// Press the left button.
    MouseDown,
    /// Release the left button.
    MouseUp,
    /// Single right click (press + release).
    RightClick,
    /// Window-management hotkey.
    Hotkey(WindowCommand),
}

impl PointerAction {
    /// Short name for logs and status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::MouseDown => "mouse-down",
            Self::MouseUp => "mouse-up",
            Self::RightClick => "right-click",
            Self::Hotkey(_) => "hotkey",
        }
    }

    /// True for everything except cursor motion.
    pub fn is_discrete(&self) -> bool {
        !matches!(self, Self::Move { .. })
    }
}
