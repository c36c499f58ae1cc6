//! OS input stub: used when the `enigo` feature is not enabled.
//!
//! Lets the rest of the binary compile without input-injection
//! dependencies; construction always fails so `--sink auto` falls back
//! to dry-run.

use tracing::warn;

use super::ActionSink;
use crate::pointer::PointerAction;

/// Stub OS sink when enigo is not compiled in.
pub struct EnigoSink {
    screen: (i32, i32),
}

impl EnigoSink {
    pub fn new(_screen: Option<(i32, i32)>) -> anyhow::Result<Self> {
        warn!("OS input disabled (compiled without 'enigo' feature)");
        Err(anyhow::anyhow!("compiled without 'enigo' feature"))
    }
}

impl ActionSink for EnigoSink {
    fn execute(&mut self, _action: &PointerAction) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("compiled without 'enigo' feature"))
    }

    fn cursor_position(&mut self) -> Option<(i32, i32)> {
        None
    }

    fn screen_size(&self) -> (i32, i32) {
        self.screen
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
