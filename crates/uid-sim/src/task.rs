//! Simulator actor task
//!
//! This module provides an async task that owns a DeviceSimulator and serves
//! one bus connection. The task:
//! - Reads controller lines from the stream and decodes them with the codec
//! - Writes each reply followed by a newline and flushes immediately
//! - Emits every handled command via a broadcast channel for observers

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uid_protocol::{Command, CommandCodec, ProtocolCodec};

use crate::DeviceSimulator;

/// Event emitted after the simulator handled a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimEvent {
    /// The decoded command
    pub command: Command,
    /// Line written back to the bus (without terminator), if any
    pub reply: Option<String>,
}

/// Run the simulator task until the reader reaches end of stream
pub async fn run_simulator_task<R, W>(
    mut reader: R,
    mut writer: W,
    mut simulator: DeviceSimulator,
    event_tx: broadcast::Sender<SimEvent>,
) -> io::Result<DeviceSimulator>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut codec = CommandCodec::new();
    let mut buf = [0u8; 1024];

    info!(
        "Starting device simulator with {} device(s), {:?} collisions",
        simulator.devices().len(),
        simulator.collision_strategy()
    );

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => {
                debug!("Simulator input closed");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!("Simulator read error: {}", e);
                return Err(e);
            }
        };

        codec.push_bytes(&buf[..n]);
        while let Some(command) = codec.next_command() {
            let reply = simulator.handle(&command);

            if let Some(line) = &reply {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }

            let _ = event_tx.send(SimEvent { command, reply });
        }
    }

    info!("Device simulator stopped");
    Ok(simulator)
}
