//! The simulated device population and its mute states

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SimError;

/// Whether a device answers probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceState {
    /// Answers probes
    #[default]
    Active,
    /// Silenced by a mute command
    Muted,
}

/// One simulated device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Identifier the device answers with
    pub uid: String,
    /// Current mute state
    pub state: DeviceState,
}

/// Ordered set of devices sharing the bus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    /// Build a device set; duplicate UIDs are collapsed
    pub fn new<I, S>(uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut devices: Vec<Device> = Vec::new();
        for uid in uids {
            let uid = uid.into();
            if devices.iter().any(|d| d.uid == uid) {
                warn!("Ignoring duplicate uid {}", uid);
                continue;
            }
            devices.push(Device {
                uid,
                state: DeviceState::Active,
            });
        }
        Self { devices }
    }

    /// Number of devices
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns true if there are no devices
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterate all devices in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Iterate the UIDs of devices currently answering probes
    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.devices
            .iter()
            .filter(|d| d.state == DeviceState::Active)
            .map(|d| d.uid.as_str())
    }

    /// Look up the state of a device
    pub fn state(&self, uid: &str) -> Option<DeviceState> {
        self.devices.iter().find(|d| d.uid == uid).map(|d| d.state)
    }

    /// Returns true if the device exists and is muted
    pub fn is_muted(&self, uid: &str) -> bool {
        self.state(uid) == Some(DeviceState::Muted)
    }

    /// Number of muted devices
    pub fn muted_count(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.state == DeviceState::Muted)
            .count()
    }

    /// Silence a device; muting an already muted device is not an error
    pub fn mute(&mut self, uid: &str) -> Result<(), SimError> {
        let device = self.find_mut(uid)?;
        device.state = DeviceState::Muted;
        Ok(())
    }

    /// Let a muted device answer again
    pub fn unmute(&mut self, uid: &str) -> Result<(), SimError> {
        let device = self.find_mut(uid)?;
        if device.state != DeviceState::Muted {
            return Err(SimError::NotMuted(uid.to_string()));
        }
        device.state = DeviceState::Active;
        Ok(())
    }

    /// Unmute every device
    pub fn reset_all(&mut self) {
        for device in &mut self.devices {
            device.state = DeviceState::Active;
        }
    }

    fn find_mut(&mut self, uid: &str) -> Result<&mut Device, SimError> {
        self.devices
            .iter_mut()
            .find(|d| d.uid == uid)
            .ok_or_else(|| SimError::UnknownUid(uid.to_string()))
    }
}
