//! Microphone permission probing.
//!
//! The desktop hosts cpal targets (ALSA/PulseAudio, WASAPI shared mode,
//! CoreAudio) raise no per-app consent dialog for unpackaged processes;
//! access is governed by a global privacy toggle. Probing the default
//! capture endpoint is the closest observable signal: a device that is
//! present but refuses its input config is the shape a disabled toggle
//! takes.

use cpal::traits::{DeviceTrait, HostTrait};

use level_capture_core::traits::permission_gate::{AuthorizationStatus, PermissionGate};

/// Permission gate backed by an endpoint probe.
pub struct SystemPermissionGate;

impl SystemPermissionGate {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemPermissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionGate for SystemPermissionGate {
    fn status(&self) -> AuthorizationStatus {
        let Some(device) = cpal::default_host().default_input_device() else {
            // Missing hardware is a device problem, not a permission problem.
            return AuthorizationStatus::Authorized;
        };
        match device.default_input_config() {
            Ok(_) => AuthorizationStatus::Authorized,
            Err(error) => {
                log::warn!("default capture endpoint refused its config: {error}");
                AuthorizationStatus::Denied
            }
        }
    }

    fn request_access(&self) -> bool {
        // No OS prompt exists here; status() never reports not-determined.
        false
    }
}
