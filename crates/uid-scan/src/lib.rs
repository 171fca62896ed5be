//! UID Discovery Library
//!
//! This crate discovers the UIDs of every device sharing a half-duplex bus by
//! anti-collision probing: probe with a pattern, watch for silence, a
//! collision, or a single UID, and narrow the pattern until every device has
//! been confirmed and muted.
//!
//! # Architecture
//!
//! - [`Discovery`]: sans-IO search engine for one vendor prefix
//! - [`Tentative`]: the two-phase confirmation state of a single-device reply
//! - [`LineLink`]: timed newline framing over tokio streams
//! - [`Scanner`]: drives discovery over a link, one prefix after another
//!
//! # Example
//!
//! ```rust
//! use uid_protocol::Command;
//! use uid_scan::Discovery;
//!
//! // A bus with a single device that honours mute commands
//! let device = "AB00000000000000042";
//! let mut muted = false;
//! let report = Discovery::new("AB".parse().unwrap())
//!     .run(|cmd| match cmd {
//!         Command::Probe(p) if !muted && uid_protocol::matches(p, device) => {
//!             Some(device.to_string())
//!         }
//!         Command::Mute(_) => {
//!             muted = true;
//!             None
//!         }
//!         _ => None,
//!     })
//!     .unwrap();
//!
//! assert_eq!(report.found.len(), 1);
//! ```

pub mod confirm;
pub mod error;
pub mod link;
pub mod scanner;
pub mod search;

pub use confirm::{Rejection, Stage, Tentative, Verdict};
pub use error::ScanError;
pub use link::LineLink;
pub use scanner::{ScanConfig, Scanner};
pub use search::{Action, Candidate, Discovery, ScanReport, SearchStats};
