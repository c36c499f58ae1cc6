//! Line-oriented landmark streams: stdin or a Unix socket.
//!
//! A reader thread does the blocking I/O and hands complete lines over a
//! channel, so `next_event` can return `Idle` on a timeout and the
//! producer keeps polling its cancellation token.

use std::io::{BufRead, BufReader, Read};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::{wire, FrameSource, SourceEvent};

/// Maximum accepted line length (1 MiB).
const MAX_LINE_SIZE: usize = 1_048_576;

/// Frames read line by line from a byte stream.
pub struct LineSource {
    rx: Receiver<String>,
    name: &'static str,
    default_size: (u32, u32),
    poll_interval: Duration,
    clock: Instant,
    /// Socket file to remove on drop.
    socket_path: Option<PathBuf>,
}

impl LineSource {
    /// Read frames from any buffered reader (EOF closes the source).
    pub fn from_reader<R>(
        reader: R,
        name: &'static str,
        default_size: (u32, u32),
        poll_interval: Duration,
    ) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let rx = spawn_reader(name, move |tx| {
            pump_lines(reader, &tx);
        });
        Self::with_receiver(rx, name, default_size, poll_interval)
    }

    /// Read frames from stdin.
    pub fn stdin(default_size: (u32, u32), poll_interval: Duration) -> Self {
        Self::from_reader(
            BufReader::new(std::io::stdin()),
            "stdin",
            default_size,
            poll_interval,
        )
    }

    /// Listen on a Unix socket; one tracker connection at a time.
    ///
    /// A disconnect does not close the source: the next tracker to
    /// connect continues the stream.
    pub fn unix(
        socket_path: &Path,
        default_size: (u32, u32),
        poll_interval: Duration,
    ) -> anyhow::Result<Self> {
        // Remove stale socket
        if socket_path.exists() {
            std::fs::remove_file(socket_path)?;
        }

        let listener = UnixListener::bind(socket_path)
            .map_err(|e| anyhow::anyhow!("bind {}: {}", socket_path.display(), e))?;

        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(socket_path, std::fs::Permissions::from_mode(0o700))?;
        }

        info!(?socket_path, "Landmark socket listening");

        let rx = spawn_reader("unix", move |tx| {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        info!("Tracker connected");
                        if !pump_lines(BufReader::new(stream), &tx) {
                            return;
                        }
                        info!("Tracker disconnected");
                    }
                    Err(e) => warn!("accept error: {}", e),
                }
            }
        });

        let mut source = Self::with_receiver(rx, "unix", default_size, poll_interval);
        source.socket_path = Some(socket_path.to_path_buf());
        Ok(source)
    }

    fn with_receiver(
        rx: Receiver<String>,
        name: &'static str,
        default_size: (u32, u32),
        poll_interval: Duration,
    ) -> Self {
        Self {
            rx,
            name,
            default_size,
            poll_interval,
            clock: Instant::now(),
            socket_path: None,
        }
    }
}

impl FrameSource for LineSource {
    fn next_event(&mut self) -> anyhow::Result<SourceEvent> {
        let line = match self.rx.recv_timeout(self.poll_interval) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => return Ok(SourceEvent::Idle),
            Err(RecvTimeoutError::Disconnected) => return Ok(SourceEvent::Closed),
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            return Ok(SourceEvent::Idle);
        }

        let now = self.clock.elapsed().as_secs_f64();
        wire::parse_frame(line, self.default_size, now).map(SourceEvent::Frame)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for LineSource {
    fn drop(&mut self) {
        if let Some(path) = self.socket_path.take() {
            let _ = std::fs::remove_file(&path);
        }
    }
}

/// Spawn a detached reader thread feeding `tx`.
///
/// The thread ends at EOF or once the receiver is gone.  A thread stuck in
/// a blocking read is left behind at shutdown.
fn spawn_reader<F>(name: &'static str, body: F) -> Receiver<String>
where
    F: FnOnce(Sender<String>) + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let spawned = std::thread::Builder::new()
        .name(format!("landmarks-{}", name))
        .spawn(move || body(tx));
    if let Err(e) = spawned {
        // rx disconnects immediately; the source reports Closed.
        warn!("failed to spawn {} reader: {}", name, e);
    }
    rx
}

/// Forward lines until EOF.  Returns false if the receiver hung up.
///
/// At most `MAX_LINE_SIZE + 1` bytes are buffered per line; the rest of an
/// oversized line is skipped without being stored.
fn pump_lines<R: BufRead>(mut reader: R, tx: &Sender<String>) -> bool {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = Read::take(&mut reader, MAX_LINE_SIZE as u64 + 1).read_until(b'\n', &mut buf);
        match read {
            Ok(0) => return true,
            Ok(n) if n > MAX_LINE_SIZE => {
                let skipped = if buf.last() == Some(&b'\n') {
                    Ok(0)
                } else {
                    skip_line(&mut reader)
                };
                match skipped {
                    Ok(rest) => warn!("dropping oversized line ({} bytes)", n + rest),
                    Err(e) => {
                        warn!("read error: {}", e);
                        return true;
                    }
                }
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).into_owned();
                if tx.send(line).is_err() {
                    debug!("line receiver gone, stopping reader");
                    return false;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("read error: {}", e);
                return true;
            }
        }
    }
}

/// Discard input up to and including the next newline (or EOF).
/// Returns the number of bytes discarded.
fn skip_line<R: BufRead>(reader: &mut R) -> std::io::Result<usize> {
    let mut skipped = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(skipped);
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(skipped + i + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                skipped += len;
            }
        }
    }
}
