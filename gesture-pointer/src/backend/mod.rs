//! Runtime: producer thread plus headless display loop.
//!
//! The producer owns the source, the pointer controller and the sink.
//! The main thread runs the display loop over the shared latest-frame
//! cell.  Either side can end the run through the shutdown token.

pub mod display;
pub mod frame_timing;
pub mod producer;
pub mod shared;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::pointer::{PointerConfig, PointerController};
use crate::sink::{self, SinkKind};
use crate::source::{self, SourceConfig};

pub use display::DisplayConfig;
pub use shared::{LatestFrame, ShutdownToken};

/// How long main waits for the producer after shutdown.
const PRODUCER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Full runtime configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: SourceConfig,
    pub sink: SinkKind,
    /// Screen size override (None = ask the sink).
    pub screen: Option<(i32, i32)>,
    pub pointer: PointerConfig,
    pub display: DisplayConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            sink: SinkKind::Auto,
            screen: None,
            pointer: PointerConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse a "WxH" resolution string. Returns (width, height) or None.
    pub fn parse_resolution(s: &str) -> Option<(i32, i32)> {
        let (w, h) = s.split_once('x')?;
        let w = w.trim().parse::<i32>().ok()?;
        let h = h.trim().parse::<i32>().ok()?;
        if w > 0 && h > 0 {
            Some((w, h))
        } else {
            None
        }
    }
}

/// Run the pipeline until a signal, the exit timer, or end of stream.
pub fn run(config: RunConfig) -> anyhow::Result<()> {
    display::install_signal_handlers();

    let source = source::build(&config.source)?;
    let latest = LatestFrame::default();
    let token = ShutdownToken::default();

    // The sink is built on the producer thread; OS input handles are not
    // guaranteed to be Send.  Startup errors come back over `ready`.
    let (ready_tx, ready_rx) = mpsc::channel::<anyhow::Result<(i32, i32)>>();
    let producer = {
        let latest = latest.clone();
        let token = token.clone();
        let sink_kind = config.sink;
        let screen = config.screen;
        let pointer = config.pointer.clone();
        std::thread::Builder::new()
            .name("producer".into())
            .spawn(move || {
                let mut sink = match sink::build(sink_kind, screen) {
                    Ok(sink) => sink,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return producer::ProducerStats::default();
                    }
                };
                let screen = sink.screen_size();
                let _ = ready_tx.send(Ok(screen));

                let mut controller = PointerController::new(pointer, screen);
                producer::run_producer(source, sink.as_mut(), &mut controller, &latest, &token)
            })?
    };

    match ready_rx.recv() {
        Ok(Ok((w, h))) => info!("Pipeline running on {}x{} screen", w, h),
        Ok(Err(e)) => {
            let _ = producer.join();
            return Err(e);
        }
        Err(_) => anyhow::bail!("producer thread exited during startup"),
    }

    let reason = display::run_display(&latest, &token, &config.display);
    token.cancel();

    // Bounded wait: a producer stuck in a blocking read is abandoned.
    let deadline = Instant::now() + PRODUCER_JOIN_TIMEOUT;
    while !producer.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    if producer.is_finished() {
        match producer.join() {
            Ok(stats) => info!(
                "Shut down ({}): {} frame(s) processed",
                reason.as_str(),
                stats.frames
            ),
            Err(_) => warn!("Producer thread panicked"),
        }
    } else {
        warn!(
            "Producer did not stop within {}s, exiting anyway",
            PRODUCER_JOIN_TIMEOUT.as_secs()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(RunConfig::parse_resolution("1920x1080"), Some((1920, 1080)));
        assert_eq!(RunConfig::parse_resolution("640x480"), Some((640, 480)));
        assert_eq!(RunConfig::parse_resolution("0x480"), None);
        assert_eq!(RunConfig::parse_resolution("1920"), None);
        assert_eq!(RunConfig::parse_resolution("axb"), None);
        assert_eq!(RunConfig::parse_resolution("1x2x3"), None);
    }

    #[test]
    fn test_run_demo_dry_run_to_completion() {
        let config = RunConfig {
            source: SourceConfig {
                kind: SourceKind::Demo,
                ..SourceConfig::default()
            },
            sink: SinkKind::DryRun,
            screen: Some((1280, 720)),
            display: DisplayConfig {
                exit_after: Some(Duration::from_millis(300)),
                status_interval: Duration::from_millis(50),
                poll_interval: Duration::from_millis(5),
            },
            ..RunConfig::default()
        };
        let started = Instant::now();
        run(config).unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
