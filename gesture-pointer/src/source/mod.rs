//! Landmark sources: where hand frames come from.
//!
//! The hand tracker itself is an external process.  It writes one frame
//! per line (see `wire`) to stdin or a Unix socket; `demo` replays a
//! built-in gesture script instead.

pub mod script;
pub mod stream;
pub mod wire;

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::tracking::HandLandmarks;

pub use script::ScriptedSource;
pub use stream::LineSource;

/// Default camera frame size when a frame does not say.
pub const DEFAULT_FRAME_SIZE: (u32, u32) = (640, 480);

/// How long a source blocks before reporting `Idle`.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One captured frame: timestamp, frame size and at most one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedFrame {
    /// Capture time in seconds (monotonic).
    pub timestamp_s: f64,
    pub width: u32,
    pub height: u32,
    pub hand: Option<HandLandmarks>,
}

/// Result of polling a source once.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Frame(CapturedFrame),
    /// Nothing arrived within the poll interval.
    Idle,
    /// The stream ended; no more frames will come.
    Closed,
}

/// A producer of landmark frames.
///
/// `Err` is a failed capture: the caller skips it and polls again.
pub trait FrameSource: Send {
    fn next_event(&mut self) -> anyhow::Result<SourceEvent>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Source selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Stdin,
    Demo,
    Unix(PathBuf),
}

impl SourceKind {
    /// Parse `stdin`, `demo` or `unix:PATH`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stdin" | "-" => Some(Self::Stdin),
            "demo" => Some(Self::Demo),
            _ => {
                let path = s.strip_prefix("unix:")?;
                if path.is_empty() {
                    None
                } else {
                    Some(Self::Unix(PathBuf::from(path)))
                }
            }
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "stdin"),
            Self::Demo => write!(f, "demo"),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Source configuration.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Frame size assumed when the wire does not carry one.
    pub frame_size: (u32, u32),
    /// Flip landmarks horizontally (selfie view).
    pub mirror: bool,
    pub poll_interval: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Stdin,
            frame_size: DEFAULT_FRAME_SIZE,
            mirror: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Open the configured source.
pub fn build(config: &SourceConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    let source: Box<dyn FrameSource> = match &config.kind {
        SourceKind::Stdin => Box::new(LineSource::stdin(config.frame_size, config.poll_interval)),
        SourceKind::Unix(path) => Box::new(LineSource::unix(
            path,
            config.frame_size,
            config.poll_interval,
        )?),
        SourceKind::Demo => Box::new(ScriptedSource::paced(
            script::demo_script(config.frame_size),
            config.poll_interval,
        )),
    };
    info!(
        "Landmark source: {} (frame {}x{}, mirror {})",
        config.kind, config.frame_size.0, config.frame_size.1, config.mirror
    );

    if config.mirror {
        Ok(Box::new(Mirrored::new(source)))
    } else {
        Ok(source)
    }
}

/// Flips every hand horizontally.
pub struct Mirrored {
    inner: Box<dyn FrameSource>,
}

impl Mirrored {
    pub fn new(inner: Box<dyn FrameSource>) -> Self {
        Self { inner }
    }
}

impl FrameSource for Mirrored {
    fn next_event(&mut self) -> anyhow::Result<SourceEvent> {
        Ok(match self.inner.next_event()? {
            SourceEvent::Frame(mut frame) => {
                frame.hand = frame.hand.map(|h| h.mirrored());
                SourceEvent::Frame(frame)
            }
            other => other,
        })
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
