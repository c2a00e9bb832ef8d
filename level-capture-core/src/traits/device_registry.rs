use crate::models::device::InputDevice;

/// Enumerates and selects audio input devices.
///
/// Pure queries with no side effects. Results are snapshots and can go stale
/// the moment they return — hardware disconnects asynchronously — so callers
/// must tolerate attaching a device that no longer exists.
pub trait DeviceRegistry: Send + Sync {
    /// Input devices that are connected and not suspended.
    fn list_input_devices(&self) -> Vec<InputDevice>;

    /// The platform-default input device, or `None` if no input hardware
    /// exists.
    fn default_input_device(&self) -> Option<InputDevice>;
}
