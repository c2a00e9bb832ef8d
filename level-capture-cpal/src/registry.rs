//! Input device enumeration over the system cpal host.

use cpal::traits::{DeviceTrait, HostTrait};

use level_capture_core::models::device::{Connectivity, InputDevice};
use level_capture_core::traits::device_registry::DeviceRegistry;

/// Device registry backed by `cpal::default_host()`.
///
/// cpal only surfaces endpoints the platform reports as present, so every
/// descriptor returned here is connected. A device that refuses to produce
/// a default input config is treated as suspended and filtered out. cpal
/// exposes no identifier separate from the device name, so the name doubles
/// as the `id`.
pub struct CpalDeviceRegistry;

impl CpalDeviceRegistry {
    pub fn new() -> Self {
        Self
    }

    fn describe(device: &cpal::Device, default_name: Option<&str>) -> Option<InputDevice> {
        let name = device.name().ok()?;
        if device.default_input_config().is_err() {
            // Present but unusable: busy or suspended endpoint.
            return None;
        }
        Some(InputDevice {
            id: name.clone(),
            is_default: default_name == Some(name.as_str()),
            name,
            connectivity: Connectivity::Connected,
            suspended: false,
        })
    }
}

impl Default for CpalDeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for CpalDeviceRegistry {
    fn list_input_devices(&self) -> Vec<InputDevice> {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        match host.input_devices() {
            Ok(devices) => devices
                .filter_map(|device| Self::describe(&device, default_name.as_deref()))
                .collect(),
            Err(error) => {
                log::warn!("input device enumeration failed: {error}");
                Vec::new()
            }
        }
    }

    fn default_input_device(&self) -> Option<InputDevice> {
        let device = cpal::default_host().default_input_device()?;
        let name = device.name().ok()?;
        Self::describe(&device, Some(name.as_str()))
    }
}
