//! # level-capture-core
//!
//! Platform-agnostic live input-level core.
//!
//! Continuously reduces raw capture buffers to one scalar loudness level per
//! buffer and broadcasts the levels to any number of subscribers. Platform
//! backends (cpal, or a bespoke WASAPI/CoreAudio layer) implement the
//! `PermissionGate`, `DeviceRegistry`, and `CaptureProvider` traits and plug
//! into the generic session.
//!
//! ## Architecture
//!
//! ```text
//! level-capture-core (this crate)
//! ├── traits/       ← PermissionGate, DeviceRegistry, CaptureProvider, BufferSink
//! ├── models/       ← LevelSample, InputDevice, AudioBuffer, CaptureError, SessionPhase
//! ├── processing/   ← LevelReducer (buffer → one dBFS level)
//! ├── stream        ← LevelStream (bounded drop-oldest broadcast)
//! └── session/      ← SessionStateMachine + CaptureController (serial worker)
//! ```
//!
//! ## Data flow
//!
//! ```text
//! [PermissionGate]   [DeviceRegistry]
//!        │                  │
//!        ▼                  ▼
//! [CaptureController] → [SessionStateMachine] → configures → [CaptureProvider]
//!                                                                  │ buffers
//!                                                                  ▼
//!                                   subscribers ◀── [LevelStream] ◀── [LevelReducer]
//! ```
//!
//! Three execution contexts: the caller's (issues commands, resolves
//! authorization), the session-management worker (sole writer of session
//! state), and the backend's capture callback (runs the reducer and the
//! broadcast publish). The worker and the capture path share no lock.

pub mod models;
pub mod processing;
pub mod session;
pub mod stream;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::buffer::{AudioBuffer, SILENCE_FLOOR_DB};
pub use models::config::{CaptureFormat, SessionConfig, DEFAULT_STREAM_CAPACITY};
pub use models::device::{Connectivity, InputDevice};
pub use models::error::CaptureError;
pub use models::sample::LevelSample;
pub use models::state::{SessionPhase, SessionSnapshot};
pub use processing::reducer::{sum_channel_powers, LevelReducer};
pub use session::controller::CaptureController;
pub use session::state_machine::SessionStateMachine;
pub use stream::{LevelPublisher, LevelStream, LevelSubscription};
pub use traits::buffer_sink::BufferSink;
pub use traits::capture_provider::CaptureProvider;
pub use traits::device_registry::DeviceRegistry;
pub use traits::permission_gate::{AuthorizationStatus, PermissionGate};
