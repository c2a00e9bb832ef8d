use thiserror::Error;

/// Errors raised by capture-session operations.
///
/// None of these are fatal: the session reports them through the logging
/// sink and stays in (or falls back to) a consistent state. Nothing is
/// retried internally; the caller re-invokes `start()`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no usable input device")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("endpoint attachment failed: {0}")]
    AttachmentFailed(String),

    #[error("capture stream failed: {0}")]
    StreamFailed(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
