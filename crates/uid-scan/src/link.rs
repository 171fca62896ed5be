//! Timed line link to the bus
//!
//! One request at a time: a probe is written, flushed, and then at most one
//! reply line is awaited for the configured window. An expired window is
//! not an error; it is the "nobody answered" observation.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::time::timeout;
use tracing::{debug, trace};
use uid_protocol::{Command, EncodeCommand, Reply};

use crate::error::ScanError;

/// Line-framed request/response channel over a pair of async streams
pub struct LineLink<R, W> {
    lines: Lines<BufReader<R>>,
    writer: W,
    timeout: Duration,
}

impl<R, W> LineLink<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a link reading replies from `reader` and writing to `writer`
    pub fn new(reader: R, writer: W, timeout: Duration) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
            timeout,
        }
    }

    /// Get the reply window
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Write one command line and flush it
    pub async fn send(&mut self, command: &Command) -> Result<(), ScanError> {
        trace!("-> {:?}", command.to_line());
        self.writer.write_all(&command.encode()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Wait for one reply line; `None` when the window expires
    pub async fn recv(&mut self) -> Result<Option<String>, ScanError> {
        match timeout(self.timeout, self.lines.next_line()).await {
            Err(_) => {
                trace!("<- (timeout)");
                Ok(None)
            }
            Ok(Ok(Some(line))) => {
                let line = line.strip_suffix('\r').map(str::to_string).unwrap_or(line);
                trace!("<- {:?}", line);
                Ok(Some(line))
            }
            Ok(Ok(None)) => Err(ScanError::LinkClosed),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Discard lines that arrived after an earlier window had expired
    pub async fn drain_stale(&mut self) -> Result<usize, ScanError> {
        let mut dropped = 0;
        loop {
            match timeout(Duration::ZERO, self.lines.next_line()).await {
                Err(_) => return Ok(dropped),
                Ok(Ok(Some(line))) => {
                    debug!("Discarding late reply {:?}", line);
                    dropped += 1;
                }
                Ok(Ok(None)) => return Err(ScanError::LinkClosed),
                Ok(Err(e)) => return Err(e.into()),
            }
        }
    }

    /// Send a probe and classify whatever comes back
    pub async fn request(&mut self, command: &Command) -> Result<Reply, ScanError> {
        self.drain_stale().await?;
        self.send(command).await?;
        let line = self.recv().await?;
        Ok(Reply::classify(line.as_deref()))
    }

    /// Split the link back into its parts
    pub fn into_inner(self) -> (R, W) {
        (self.lines.into_inner().into_inner(), self.writer)
    }
}
