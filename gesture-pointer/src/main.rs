//! gesture-pointer - drive the mouse with hand gestures.
//!
//! Reads per-frame hand landmarks from an external tracker and turns
//! them into cursor motion, clicks, drags and window toggles.

mod backend;
pub mod pointer;
mod sink;
mod source;
pub mod tracking;

use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::backend::RunConfig;
use crate::pointer::PointerConfig;
use crate::sink::SinkKind;
use crate::source::{SourceConfig, SourceKind};
use crate::tracking::SmoothingMode;

#[derive(Parser, Debug)]
#[command(name = "gesture-pointer", about = "Hand-gesture mouse controller")]
struct Cli {
    /// Landmark source: stdin, demo, or unix:PATH
    #[arg(long, default_value = "stdin")]
    source: String,

    /// Action sink: auto, enigo, or dry-run
    #[arg(long, default_value = "auto")]
    sink: String,

    /// Screen size WxH (default: detected by the sink)
    #[arg(long)]
    screen: Option<String>,

    /// Camera frame size WxH for frames that do not carry one
    #[arg(long, default_value = "640x480")]
    frame: String,

    /// Mirror landmarks horizontally (selfie camera)
    #[arg(long)]
    mirror: bool,

    /// Cursor smoothing: one-euro or exponential
    #[arg(long, default_value = "one-euro")]
    smoothing: String,

    /// Exit after N seconds
    #[arg(long)]
    exit_after: Option<u64>,

    /// Seconds between status log lines
    #[arg(long, default_value_t = 10)]
    status_interval: u64,

    /// Print the demo gesture script in wire format and exit
    #[arg(long)]
    print_demo: bool,

    /// Show version and exit
    #[arg(long)]
    version: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<RunConfig> {
        let kind = SourceKind::parse(&self.source).ok_or_else(|| {
            anyhow::anyhow!("Unknown source: {}. Use: stdin, demo, or unix:PATH", self.source)
        })?;
        let sink = SinkKind::parse(&self.sink).ok_or_else(|| {
            anyhow::anyhow!("Unknown sink: {}. Use: auto, enigo, or dry-run", self.sink)
        })?;
        let smoothing = SmoothingMode::parse(&self.smoothing).ok_or_else(|| {
            anyhow::anyhow!("Unknown smoothing: {}. Use: one-euro or exponential", self.smoothing)
        })?;
        let (fw, fh) = RunConfig::parse_resolution(&self.frame)
            .ok_or_else(|| anyhow::anyhow!("Invalid frame size: {} (expected WxH)", self.frame))?;
        let screen = match &self.screen {
            Some(s) => Some(
                RunConfig::parse_resolution(s)
                    .ok_or_else(|| anyhow::anyhow!("Invalid screen size: {} (expected WxH)", s))?,
            ),
            None => None,
        };

        let mut config = RunConfig {
            source: SourceConfig {
                kind,
                frame_size: (fw as u32, fh as u32),
                mirror: self.mirror,
                ..SourceConfig::default()
            },
            sink,
            screen,
            pointer: PointerConfig {
                smoothing,
                ..PointerConfig::default()
            },
            ..RunConfig::default()
        };
        config.display.exit_after = self.exit_after.map(Duration::from_secs);
        config.display.status_interval = Duration::from_secs(self.status_interval.max(1));
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("gesture-pointer {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if cli.print_demo {
        let (w, h) = RunConfig::parse_resolution(&cli.frame)
            .ok_or_else(|| anyhow::anyhow!("Invalid frame size: {} (expected WxH)", cli.frame))?;
        source::script::write_demo_script(&mut std::io::stdout().lock(), (w as u32, h as u32))?;
        return Ok(());
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_pointer=info".into()),
        )
        .init();

    info!("gesture-pointer v{} starting", env!("CARGO_PKG_VERSION"));
    info!("source: {}, sink: {}", cli.source, cli.sink);

    let config = cli.into_config()?;
    backend::run(config)
}
