//! Device simulator
//!
//! Provides a purely reactive simulation of every device on the bus: control
//! lines change mute states, probe lines are answered with the matching UID,
//! a collision signal, or nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use uid_protocol::{matches, CollisionSignal, CollisionStrategy, Command, PREFIX_LEN};

use crate::devices::DeviceSet;
use crate::error::SimError;

/// Configuration for creating a device simulator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// How collisions are rendered on the bus
    pub collision: CollisionStrategy,
    /// Vendor anchors whose devices always collide with an empty line,
    /// whatever the strategy
    pub empty_collision_prefixes: Vec<String>,
    /// Seed for the collision sampler (entropy when unset)
    pub seed: Option<u64>,
}

/// Outcome of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Nobody matched
    NoMatch,
    /// Exactly one active device matched
    Single(String),
    /// Several active devices matched
    Collision(usize),
}

/// A simulated bus full of devices
#[derive(Debug)]
pub struct DeviceSimulator {
    devices: DeviceSet,
    collision: CollisionSignal,
    empty_collision_prefixes: Vec<String>,
}

impl DeviceSimulator {
    /// Create a simulator with default settings
    pub fn new(devices: DeviceSet) -> Result<Self, SimError> {
        Self::from_config(devices, SimulatorConfig::default())
    }

    /// Create a simulator from configuration
    pub fn from_config(devices: DeviceSet, config: SimulatorConfig) -> Result<Self, SimError> {
        if devices.is_empty() {
            return Err(SimError::NoDevices);
        }
        let collision = match config.seed {
            Some(seed) => CollisionSignal::with_seed(config.collision, seed),
            None => CollisionSignal::new(config.collision),
        };
        Ok(Self {
            devices,
            collision,
            empty_collision_prefixes: config.empty_collision_prefixes,
        })
    }

    /// Get the simulated devices
    pub fn devices(&self) -> &DeviceSet {
        &self.devices
    }

    /// Get the collision strategy in effect
    pub fn collision_strategy(&self) -> CollisionStrategy {
        self.collision.strategy()
    }

    /// Handle one command and return the line to put on the bus, if any
    pub fn handle(&mut self, command: &Command) -> Option<String> {
        match command {
            Command::Mute(uid) => {
                match self.devices.mute(uid) {
                    Ok(()) => debug!("Muted {}", uid),
                    Err(e) => warn!("Ignoring mute: {}", e),
                }
                None
            }
            Command::Unmute(uid) => {
                match self.devices.unmute(uid) {
                    Ok(()) => info!("Unmuted {}", uid),
                    Err(e) => warn!("Ignoring unmute: {}", e),
                }
                None
            }
            Command::ResetAll => {
                self.devices.reset_all();
                info!("Unmuted all devices");
                None
            }
            Command::Probe(pattern) => self.respond(pattern),
        }
    }

    /// Answer a probe pattern
    pub fn respond(&mut self, pattern: &str) -> Option<String> {
        let matched: Vec<&str> = self
            .devices
            .active()
            .filter(|uid| matches(pattern, uid))
            .collect();

        let reply = match matched.as_slice() {
            [] => None,
            [single] => Some(single.to_string()),
            many => {
                let quiet = many[0].get(..PREFIX_LEN).is_some_and(|anchor| {
                    self.empty_collision_prefixes.iter().any(|p| p == anchor)
                });
                if quiet {
                    Some(String::new())
                } else {
                    Some(self.collision.signal(many))
                }
            }
        };

        trace!(
            "Probe {:?}: {} match(es), reply {:?}",
            pattern,
            matched.len(),
            reply
        );
        reply
    }

    /// Classify a probe without producing bus output
    pub fn outcome(&self, pattern: &str) -> ProbeOutcome {
        let mut matched = self.devices.active().filter(|uid| matches(pattern, uid));
        match (matched.next(), matched.next()) {
            (None, _) => ProbeOutcome::NoMatch,
            (Some(uid), None) => ProbeOutcome::Single(uid.to_string()),
            (Some(_), Some(_)) => ProbeOutcome::Collision(2 + matched.count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "AB11111111111111111";
    const B: &str = "AB22222222222222222";

    fn sim(uids: &[&str]) -> DeviceSimulator {
        DeviceSimulator::new(DeviceSet::new(uids.iter().copied())).unwrap()
    }

    fn probe(s: &mut DeviceSimulator, pattern: &str) -> Option<String> {
        s.handle(&Command::Probe(pattern.to_string()))
    }

    #[test]
    fn test_requires_devices() {
        let empty: [&str; 0] = [];
        assert_eq!(
            DeviceSimulator::new(DeviceSet::new(empty)).unwrap_err(),
            SimError::NoDevices
        );
    }

    #[test]
    fn test_single_match_answers_with_uid() {
        let mut s = sim(&["12abc56"]);
        assert_eq!(probe(&mut s, "12bc56"), Some("12abc56".to_string()));
        assert_eq!(probe(&mut s, "12"), Some("12abc56".to_string()));
    }

    #[test]
    fn test_no_match_is_silent() {
        let mut s = sim(&["123456"]);
        assert_eq!(probe(&mut s, "13"), None);
        assert_eq!(probe(&mut s, ""), None);
        assert_eq!(probe(&mut s, "1234567"), None);
    }

    #[test]
    fn test_collision_is_empty_line_by_default() {
        let mut s = sim(&[A, B]);
        assert_eq!(probe(&mut s, "AB"), Some(String::new()));
        assert_eq!(s.outcome("AB"), ProbeOutcome::Collision(2));
        assert_eq!(probe(&mut s, "AB1"), Some(A.to_string()));
        assert_eq!(probe(&mut s, "AB3"), None);
    }

    #[test]
    fn test_sample_collision_strategy() {
        let config = SimulatorConfig {
            collision: CollisionStrategy::Sample,
            seed: Some(5),
            ..Default::default()
        };
        let mut s = DeviceSimulator::from_config(DeviceSet::new([A, B]), config).unwrap();
        let reply = probe(&mut s, "AB").unwrap();
        assert_eq!(reply.len(), 19);
        assert!(reply.starts_with("AB"));
        assert!(reply[2..].bytes().all(|b| b == b'1' || b == b'2'));
    }

    #[test]
    fn test_empty_collision_prefix_override() {
        let config = SimulatorConfig {
            collision: CollisionStrategy::Sample,
            empty_collision_prefixes: vec!["CB".into()],
            seed: Some(5),
        };
        let uids = [
            "CB11111111111111111",
            "CB22222222222222222",
            A,
            B,
        ];
        let mut s = DeviceSimulator::from_config(DeviceSet::new(uids), config).unwrap();
        assert_eq!(probe(&mut s, "CB"), Some(String::new()));
        assert_eq!(probe(&mut s, "AB").map(|r| r.len()), Some(19));
    }

    #[test]
    fn test_mute_produces_no_output_and_silences_device() {
        let mut s = sim(&[A, B]);
        assert_eq!(s.handle(&Command::Mute(A.into())), None);
        assert_eq!(probe(&mut s, "AB"), Some(B.to_string()));
        assert_eq!(probe(&mut s, "AB1"), None);
    }

    #[test]
    fn test_unknown_uid_control_is_ignored() {
        let mut s = sim(&[A, B]);
        assert_eq!(s.handle(&Command::Mute("AB33333333333333333".into())), None);
        assert_eq!(s.handle(&Command::Unmute(A.into())), None);
        assert_eq!(s.devices().muted_count(), 0);
        assert_eq!(probe(&mut s, "AB"), Some(String::new()));
    }

    #[test]
    fn test_mute_unmute_round_trip() {
        let mut s = sim(&[A, B]);
        let patterns = ["AB", "AB1", "AB2", "AB11", "AB21", "AB11111111111111111"];
        let before: Vec<_> = patterns.iter().map(|p| probe(&mut s, p)).collect();

        s.handle(&Command::Mute(A.into()));
        s.handle(&Command::Unmute(A.into()));

        let after: Vec<_> = patterns.iter().map(|p| probe(&mut s, p)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reset_all_twice_same_as_once() {
        let mut s = sim(&[A, B]);
        s.handle(&Command::Mute(A.into()));
        s.handle(&Command::Mute(B.into()));

        s.handle(&Command::ResetAll);
        let once = s.devices().clone();
        s.handle(&Command::ResetAll);
        assert_eq!(s.devices(), &once);
        assert_eq!(probe(&mut s, "AB"), Some(String::new()));
    }
}
