use crate::models::buffer::AudioBuffer;

/// Consumer of raw capture buffers.
///
/// Registered with the [`CaptureProvider`](crate::traits::capture_provider::CaptureProvider)
/// at configuration time and called on the backend's capture context for
/// every delivered buffer. Implementations must not block — no I/O, no
/// unbounded allocation — or the hardware delivery path starves.
pub trait BufferSink: Send + Sync {
    fn on_buffer_ready(&self, buffer: AudioBuffer<'_>);
}
