//! Line protocol between the discovery engine and the bus devices
//!
//! # Format
//! - Every line is terminated by `\n` (a preceding `\r` is ignored)
//! - Controller → devices: a bare probe pattern, or one of
//!   `MUTE:<uid>`, `UNMUTE:<uid>`, `RESET_ALL`
//! - Devices → controller: a full UID (single match), an empty line
//!   (collision), or nothing at all within the read window (no match)

use tracing::warn;

use crate::error::ParseError;
use crate::uid::{Uid, UID_LEN};
use crate::{EncodeCommand, ProtocolCodec};

/// Line terminator
pub const TERMINATOR: u8 = b'\n';

/// Maximum accepted line length (reasonable limit to prevent buffer growth)
pub const MAX_LINE_LEN: usize = 256;

const MUTE: &str = "MUTE:";
const UNMUTE: &str = "UNMUTE:";
const RESET_ALL: &str = "RESET_ALL";

// Spellings used by older controllers
const LEGACY_MUTE: &str = "SETADDR:";
const LEGACY_UNMUTE: &str = "RESETADDR:";
const LEGACY_RESET_ALL: &str = "RESETALL";

/// A line sent from the controller to the bus
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Probe pattern: anchor plus optional tail
    Probe(String),
    /// Stop the named device from answering probes
    Mute(String),
    /// Let the named device answer probes again
    Unmute(String),
    /// Unmute every device
    ResetAll,
}

impl Command {
    /// Interpret a single line (without terminator)
    pub fn parse(line: &str) -> Self {
        if let Some(uid) = line.strip_prefix(MUTE).or_else(|| line.strip_prefix(LEGACY_MUTE)) {
            return Command::Mute(uid.to_string());
        }
        if let Some(uid) = line
            .strip_prefix(UNMUTE)
            .or_else(|| line.strip_prefix(LEGACY_UNMUTE))
        {
            return Command::Unmute(uid.to_string());
        }
        if line == RESET_ALL || line == LEGACY_RESET_ALL {
            return Command::ResetAll;
        }
        Command::Probe(line.to_string())
    }

    /// Build a mute command for a discovered UID
    pub fn mute(uid: &Uid) -> Self {
        Command::Mute(uid.to_string())
    }

    /// Returns true for commands the bus never answers
    pub fn is_control(&self) -> bool {
        !matches!(self, Command::Probe(_))
    }

    /// Render the command as a line (without terminator)
    pub fn to_line(&self) -> String {
        match self {
            Command::Probe(pattern) => pattern.clone(),
            Command::Mute(uid) => format!("{MUTE}{uid}"),
            Command::Unmute(uid) => format!("{UNMUTE}{uid}"),
            Command::ResetAll => RESET_ALL.to_string(),
        }
    }
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        let mut bytes = self.to_line().into_bytes();
        bytes.push(TERMINATOR);
        bytes
    }
}

/// What the controller observed after sending a probe
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reply {
    /// No line arrived within the read window: nothing matched
    Silence,
    /// An empty or malformed line: several devices answered at once
    Collision,
    /// A well-formed full-length UID: apparently a single device
    Uid(Uid),
}

impl Reply {
    /// Classify a received line; `None` means the read window expired
    ///
    /// Anything that is not a well-formed UID of full length is a
    /// collision, never silence.
    pub fn classify(line: Option<&str>) -> Self {
        match line {
            None => Reply::Silence,
            Some(text) if text.len() != UID_LEN => Reply::Collision,
            Some(text) => Uid::parse(text).map(Reply::Uid).unwrap_or(Reply::Collision),
        }
    }

    /// Render the reply as the line a device would write, if any
    pub fn to_line(&self) -> Option<String> {
        match self {
            Reply::Silence => None,
            Reply::Collision => Some(String::new()),
            Reply::Uid(uid) => Some(uid.to_string()),
        }
    }
}

/// Streaming codec splitting controller traffic into [`Command`]s
///
/// Empty lines carry no command and are skipped.
pub struct CommandCodec {
    buffer: Vec<u8>,
    discarding: bool,
}

impl CommandCodec {
    /// Create a new command codec
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64),
            discarding: false,
        }
    }

    /// Split off the next complete line, if any
    fn next_line(&mut self) -> Option<Result<String, ParseError>> {
        loop {
            let Some(pos) = self.buffer.iter().position(|&b| b == TERMINATOR) else {
                if self.buffer.len() > MAX_LINE_LEN {
                    let dropped = self.buffer.len();
                    self.buffer.clear();
                    self.discarding = true;
                    return Some(Err(ParseError::LineTooLong(dropped)));
                }
                return None;
            };

            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }

            // Tail end of an oversized line that was already reported
            if self.discarding {
                self.discarding = false;
                continue;
            }

            if line.is_empty() {
                continue;
            }
            return Some(Ok(String::from_utf8_lossy(&line).into_owned()));
        }
    }
}

impl Default for CommandCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolCodec for CommandCodec {
    type Command = Command;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    fn next_command(&mut self) -> Option<Command> {
        loop {
            match self.next_line()? {
                Ok(line) => return Some(Command::parse(&line)),
                Err(e) => warn!("Discarding input: {}", e),
            }
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}
