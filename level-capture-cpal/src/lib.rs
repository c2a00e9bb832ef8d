//! # level-capture-cpal
//!
//! cpal backend for the level-capture kit.
//!
//! Implements the core's platform seams — `PermissionGate`,
//! `DeviceRegistry`, and `CaptureProvider` — on top of cpal's
//! cross-platform capture hosts (ALSA/PulseAudio, WASAPI, CoreAudio).
//! Buffers are requested as 48 kHz interleaved 16-bit PCM and converted to
//! `f32` before they reach the registered sink.

mod permissions;
mod provider;
mod registry;

pub use permissions::SystemPermissionGate;
pub use provider::CpalCaptureProvider;
pub use registry::CpalDeviceRegistry;

use std::sync::Arc;

use level_capture_core::models::config::SessionConfig;
use level_capture_core::models::error::CaptureError;
use level_capture_core::session::controller::CaptureController;

/// Assemble a [`CaptureController`] wired to the system audio host.
///
/// ```no_run
/// use level_capture_cpal::system_controller;
///
/// let controller = system_controller(Default::default()).unwrap();
/// let mut levels = controller.subscribe_levels();
/// controller.start();
/// while let Some(sample) = levels.recv() {
///     println!("{:.1} dB", sample.level);
/// }
/// ```
pub fn system_controller(config: SessionConfig) -> Result<CaptureController, CaptureError> {
    CaptureController::spawn(
        config,
        Arc::new(SystemPermissionGate::new()),
        Arc::new(CpalDeviceRegistry::new()),
        CpalCaptureProvider::new,
    )
}
