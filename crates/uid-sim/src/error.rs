//! Error types for the device simulator

use thiserror::Error;

/// Errors that can occur while handling control commands
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Control command named a UID that is not simulated
    #[error("unknown uid: {0}")]
    UnknownUid(String),

    /// Unmute named a UID that is already answering probes
    #[error("uid is not muted: {0}")]
    NotMuted(String),

    /// Simulator was created without any devices
    #[error("no devices to simulate")]
    NoDevices,
}
