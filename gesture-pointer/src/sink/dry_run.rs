//! Dry-run sink: a virtual cursor that logs instead of injecting input.

use tracing::{debug, info};

use super::ActionSink;
use crate::pointer::PointerAction;

/// Screen size used when none is given.
pub const DEFAULT_SCREEN: (i32, i32) = (1920, 1080);

/// Maximum number of actions kept in `history`.
const HISTORY_LIMIT: usize = 1024;

pub struct DryRunSink {
    screen: (i32, i32),
    cursor: (i32, i32),
    left_down: bool,
    /// Most recent actions, oldest first.
    pub history: Vec<PointerAction>,
}

impl DryRunSink {
    pub fn new(screen: (i32, i32)) -> Self {
        info!("Dry-run sink: virtual screen {}x{}", screen.0, screen.1);
        Self {
            screen,
            cursor: (screen.0 / 2, screen.1 / 2),
            left_down: false,
            history: Vec::new(),
        }
    }

    pub fn is_left_down(&self) -> bool {
        self.left_down
    }
}

impl ActionSink for DryRunSink {
    fn execute(&mut self, action: &PointerAction) -> anyhow::Result<()> {
        match *action {
            PointerAction::Move { x, y } => {
                self.cursor = (x.clamp(0, self.screen.0), y.clamp(0, self.screen.1));
                debug!("dry-run: cursor -> ({}, {})", self.cursor.0, self.cursor.1);
            }
            PointerAction::MouseDown => {
                if self.is_left_down() {
                    debug!("dry-run: mouse-down while the button is already held");
                }
                self.left_down = true;
            }
            PointerAction::MouseUp => {
                if !self.is_left_down() {
                    debug!("dry-run: mouse-up while the button is released");
                }
                self.left_down = false;
            }
            PointerAction::RightClick => {}
            PointerAction::Hotkey(cmd) => debug!("dry-run: hotkey {}", cmd.as_str()),
        }

        self.history.push(*action);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        Ok(())
    }

    fn cursor_position(&mut self) -> Option<(i32, i32)> {
        Some(self.cursor)
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
