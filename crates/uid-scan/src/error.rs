//! Error types for UID discovery

use thiserror::Error;

/// Errors that can occur during a scan
#[derive(Debug, Error)]
pub enum ScanError {
    /// The device side closed the link
    #[error("link closed by peer")]
    LinkClosed,

    /// An action was requested while a probe reply is still outstanding
    #[error("reply to probe {0:?} still pending")]
    ReplyPending(String),

    /// A reply was delivered while no probe was outstanding
    #[error("unexpected reply: no probe outstanding")]
    UnexpectedReply,

    /// I/O error on the link
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Returns true if the scan cannot continue with the next prefix
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::LinkClosed | ScanError::Io(_))
    }
}
