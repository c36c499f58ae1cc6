//! OS input injection via enigo.

use enigo::{Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use tracing::{debug, info};

use super::ActionSink;
use crate::pointer::{PointerAction, WindowCommand};

pub struct EnigoSink {
    enigo: Enigo,
    screen: (i32, i32),
}

impl EnigoSink {
    /// Connect to the OS input system.  `screen` overrides the detected
    /// main display size.
    pub fn new(screen: Option<(i32, i32)>) -> anyhow::Result<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| anyhow::anyhow!("enigo init failed: {:?}", e))?;

        let screen = match screen {
            Some(s) => s,
            None => enigo
                .main_display()
                .map_err(|e| anyhow::anyhow!("cannot query display size: {:?}", e))?,
        };
        info!("OS input sink: screen {}x{}", screen.0, screen.1);

        Ok(Self { enigo, screen })
    }

    /// Super+D: the desktop-toggle shortcut on most desktops.
    fn toggle_desktop(&mut self) -> anyhow::Result<()> {
        self.enigo
            .key(Key::Meta, Direction::Press)
            .map_err(|e| anyhow::anyhow!("key press: {:?}", e))?;
        let tap = self
            .enigo
            .key(Key::Unicode('d'), Direction::Click)
            .map_err(|e| anyhow::anyhow!("key click: {:?}", e));
        // Always release the modifier, even if the tap failed.
        self.enigo
            .key(Key::Meta, Direction::Release)
            .map_err(|e| anyhow::anyhow!("key release: {:?}", e))?;
        tap
    }
}

impl ActionSink for EnigoSink {
    fn execute(&mut self, action: &PointerAction) -> anyhow::Result<()> {
        match *action {
            PointerAction::Move { x, y } => self
                .enigo
                .move_mouse(x, y, Coordinate::Abs)
                .map_err(|e| anyhow::anyhow!("move: {:?}", e)),
            PointerAction::MouseDown => self
                .enigo
                .button(Button::Left, Direction::Press)
                .map_err(|e| anyhow::anyhow!("left press: {:?}", e)),
            PointerAction::MouseUp => self
                .enigo
                .button(Button::Left, Direction::Release)
                .map_err(|e| anyhow::anyhow!("left release: {:?}", e)),
            PointerAction::RightClick => self
                .enigo
                .button(Button::Right, Direction::Click)
                .map_err(|e| anyhow::anyhow!("right click: {:?}", e)),
            PointerAction::Hotkey(cmd) => {
                debug!("Window {} via Super+D", cmd.as_str());
                match cmd {
                    WindowCommand::Minimize | WindowCommand::Restore => self.toggle_desktop(),
                }
            }
        }
    }

    fn cursor_position(&mut self) -> Option<(i32, i32)> {
        self.enigo.location().ok()
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn name(&self) -> &'static str {
        "enigo"
    }
}
