use std::sync::Arc;

use crate::models::config::CaptureFormat;
use crate::models::device::InputDevice;
use crate::models::error::CaptureError;
use crate::traits::buffer_sink::BufferSink;

/// Platform capture backend.
///
/// Owns the input endpoint (the device connection) and the output endpoint
/// (the buffer tap feeding a [`BufferSink`]). Buffers are delivered on a
/// context owned by the provider, never on the thread driving these calls.
///
/// Providers are driven from a single thread and need not be `Send`: the
/// session constructs its provider in place on its own management thread
/// (cpal streams, for one, cannot cross threads).
pub trait CaptureProvider {
    /// Connect `device` as the capture input, replacing any prior input —
    /// at most one is attached at a time. If capture is already started,
    /// the new input begins delivering without a separate `start`.
    fn attach_input(&mut self, device: &InputDevice) -> Result<(), CaptureError>;

    /// Drop the current input endpoint, if any. Capture continues silent.
    fn detach_input(&mut self);

    /// Register the buffer consumer and the PCM format it will receive.
    fn attach_output(
        &mut self,
        format: CaptureFormat,
        sink: Arc<dyn BufferSink>,
    ) -> Result<(), CaptureError>;

    /// Begin hardware capture.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop hardware capture.
    fn stop(&mut self);

    /// Whether an input endpoint is currently attached.
    fn has_input(&self) -> bool;
}
