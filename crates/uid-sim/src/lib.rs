//! UID Bus Simulation Library
//!
//! This crate simulates the device side of a multidrop bus for testing UID
//! discovery without physical hardware. It includes:
//!
//! - **DeviceSet**: the simulated UIDs and their mute states
//! - **DeviceSimulator**: answers probes and control lines
//! - **run_simulator_task**: serves a simulator over any async byte stream
//!
//! # Example
//!
//! ```rust
//! use uid_protocol::Command;
//! use uid_sim::{DeviceSet, DeviceSimulator};
//!
//! let devices = DeviceSet::new(["AB11111111111111111", "AB22222222222222222"]);
//! let mut sim = DeviceSimulator::new(devices).unwrap();
//!
//! // Both devices match the bare prefix: collision
//! assert_eq!(sim.handle(&Command::Probe("AB".into())), Some(String::new()));
//!
//! // Only one ends in "1"
//! assert_eq!(
//!     sim.handle(&Command::Probe("AB1".into())).as_deref(),
//!     Some("AB11111111111111111")
//! );
//! ```

pub mod devices;
pub mod error;
pub mod simulator;
pub mod task;

pub use devices::{Device, DeviceSet, DeviceState};
pub use error::SimError;
pub use simulator::{DeviceSimulator, ProbeOutcome, SimulatorConfig};
pub use task::{run_simulator_task, SimEvent};
