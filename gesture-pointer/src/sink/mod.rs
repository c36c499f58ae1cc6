//! Action sinks: execute pointer actions against the OS (or pretend to).
//!
//! Provides:
//! - `DryRunSink`: virtual cursor, logs every action (always available)
//! - `EnigoSink`: real mouse/keyboard injection (gated behind `enigo` feature)

pub mod dry_run;

#[cfg(feature = "enigo")]
pub mod enigo_sink;

#[cfg(feature = "enigo")]
pub use enigo_sink::EnigoSink;

#[cfg(not(feature = "enigo"))]
pub mod stub;

#[cfg(not(feature = "enigo"))]
pub use stub::EnigoSink;

pub use dry_run::DryRunSink;

use tracing::{info, warn};

use crate::pointer::PointerAction;

/// Sink selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    /// Real injection when compiled in, dry-run otherwise.
    Auto,
    Enigo,
    DryRun,
}

impl SinkKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(Self::Auto),
            "enigo" | "os" => Some(Self::Enigo),
            "dry-run" | "dryrun" | "none" => Some(Self::DryRun),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Enigo => "enigo",
            Self::DryRun => "dry-run",
        }
    }
}

/// Executes pointer actions.  Fire-and-forget from the pipeline's view:
/// errors are reported to the caller, who logs them and moves on.
/// Built on the thread that uses it; OS handles need not be `Send`.
pub trait ActionSink {
    /// Execute one action.
    fn execute(&mut self, action: &PointerAction) -> anyhow::Result<()>;

    /// Current cursor position, if the sink can report it.
    fn cursor_position(&mut self) -> Option<(i32, i32)>;

    /// Screen size in pixels.
    fn screen_size(&self) -> (i32, i32);

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the sink for `kind`.
///
/// `screen` overrides the detected screen size (required for dry-run
/// when no display is available).
pub fn build(kind: SinkKind, screen: Option<(i32, i32)>) -> anyhow::Result<Box<dyn ActionSink>> {
    info!("Action sink requested: {}", kind.as_str());
    match kind {
        SinkKind::DryRun => Ok(Box::new(DryRunSink::new(
            screen.unwrap_or(dry_run::DEFAULT_SCREEN),
        ))),
        SinkKind::Enigo => Ok(Box::new(EnigoSink::new(screen)?)),
        SinkKind::Auto => match EnigoSink::new(screen) {
            Ok(sink) => Ok(Box::new(sink)),
            Err(e) => {
                warn!("OS input unavailable ({}), falling back to dry-run", e);
                Ok(Box::new(DryRunSink::new(
                    screen.unwrap_or(dry_run::DEFAULT_SCREEN),
                )))
            }
        },
    }
}

/// Execute a batch, logging failures instead of propagating them.
///
/// Returns the number of actions that failed.
pub fn dispatch(sink: &mut dyn ActionSink, actions: &[PointerAction]) -> usize {
    let mut failed = 0;
    for action in actions {
        if let Err(e) = sink.execute(action) {
            failed += 1;
            warn!(sink = sink.name(), "{} failed: {}", action.as_str(), e);
        } else if action.is_discrete() {
            info!(sink = sink.name(), "{:?}", action);
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::WindowCommand;

    /// Sink that fails every discrete action.
    struct FlakySink {
        moves: usize,
    }

    impl ActionSink for FlakySink {
        fn execute(&mut self, action: &PointerAction) -> anyhow::Result<()> {
            match action {
                PointerAction::Move { .. } => {
                    self.moves += 1;
                    Ok(())
                }
                other => Err(anyhow::anyhow!("cannot {}", other.as_str())),
            }
        }

        fn cursor_position(&mut self) -> Option<(i32, i32)> {
            None
        }

        fn screen_size(&self) -> (i32, i32) {
            (100, 100)
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    #[test]
    fn test_dispatch_continues_after_error() {
        let mut sink = FlakySink { moves: 0 };
        let actions = [
            PointerAction::MouseDown,
            PointerAction::Move { x: 1, y: 1 },
            PointerAction::Hotkey(WindowCommand::Minimize),
            PointerAction::Move { x: 2, y: 2 },
        ];
        assert_eq!(dispatch(&mut sink, &actions), 2);
        assert_eq!(sink.moves, 2);
    }

    #[test]
    fn test_build_dry_run() {
        let sink = build(SinkKind::DryRun, Some((800, 600))).unwrap();
        assert_eq!(sink.name(), "dry-run");
        assert_eq!(sink.screen_size(), (800, 600));
    }

    #[test]
    fn test_build_auto_always_succeeds_with_screen() {
        assert!(build(SinkKind::Auto, Some((800, 600))).is_ok());
    }

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!(SinkKind::parse("auto"), Some(SinkKind::Auto));
        assert_eq!(SinkKind::parse("dry-run"), Some(SinkKind::DryRun));
        assert_eq!(SinkKind::parse("enigo"), Some(SinkKind::Enigo));
        assert_eq!(SinkKind::parse("x11"), None);
        assert_eq!(SinkKind::DryRun.as_str(), "dry-run");
    }
}
