//! UID Discovery Protocol Library
//!
//! This crate provides the shared vocabulary for anti-collision address
//! discovery on a half-duplex multidrop bus (RET-style antenna links):
//!
//! - **Identifiers**: 19-symbol UIDs made of a 2-symbol vendor prefix and a
//!   17-symbol suffix over a 64-symbol alphabet
//! - **Matching**: probe patterns split into an anchor (start of the UID)
//!   and a tail (end of the UID)
//! - **Collisions**: the bus observable when several devices answer at once
//! - **Wire format**: newline-terminated probe and control lines
//!
//! # Example
//!
//! ```rust
//! use uid_protocol::{matches, Command, CommandCodec, ProtocolCodec, Reply};
//!
//! assert!(matches("AB11", "AB00000000000000011"));
//!
//! let mut codec = CommandCodec::new();
//! codec.push_bytes(b"AB1\nRESET_ALL\n");
//! assert_eq!(codec.next_command(), Some(Command::Probe("AB1".into())));
//! assert_eq!(codec.next_command(), Some(Command::ResetAll));
//!
//! assert_eq!(Reply::classify(Some("")), Reply::Collision);
//! assert_eq!(Reply::classify(None), Reply::Silence);
//! ```

pub mod collision;
pub mod error;
pub mod matcher;
pub mod uid;
pub mod wire;

pub use collision::{sample_collision, CollisionSignal, CollisionStrategy};
pub use error::ParseError;
pub use matcher::matches;
pub use uid::{AlphabetOrder, Uid, VendorPrefix, ALPHABET, PREFIX_LEN, SUFFIX_LEN, UID_LEN};
pub use wire::{Command, CommandCodec, Reply};

/// Trait for codecs that can parse incoming data streams
pub trait ProtocolCodec {
    /// The command type produced by this codec
    type Command;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete command from the buffer
    fn next_command(&mut self) -> Option<Self::Command>;

    /// Clear the internal buffer
    fn clear(&mut self);
}

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
