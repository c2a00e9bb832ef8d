use serde::{Deserialize, Serialize};

/// Connection state of an input device at enumeration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Connected,
    Disconnected,
}

/// An audio input device as reported by the platform.
///
/// Descriptors are snapshots: hardware can disconnect right after
/// enumeration, so holders must tolerate attaching a device that has since
/// gone away. No identity is guaranteed across enumerations beyond the
/// platform `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDevice {
    /// Platform device identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub connectivity: Connectivity,
    pub suspended: bool,
    /// Whether the platform reports this as its default input.
    pub is_default: bool,
}

impl InputDevice {
    /// Whether the device can currently serve capture.
    pub fn is_available(&self) -> bool {
        self.connectivity == Connectivity::Connected && !self.suspended
    }
}
