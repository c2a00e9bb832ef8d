use serde::Serialize;

use super::device::InputDevice;

/// Capture session lifecycle phase.
///
/// Transitions:
/// ```text
/// uninitialized ──start──▶ configured ⇄ running
/// ```
/// `start`/`stop` move between `Configured` and `Running`; device changes
/// apply in place and never leave the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Uninitialized,
    Configured,
    Running,
}

impl SessionPhase {
    /// True once the pipeline has been configured, whether or not hardware
    /// capture is active. `Running` implies configured.
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured | Self::Running)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Read-only view of the session, published atomically after every state
/// mutation. Consumers never touch session state directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    /// Currently selected input device, if any.
    pub device: Option<InputDevice>,
    /// Whether an input endpoint is attached. False while running means
    /// capture is silent (e.g. after a failed device switch).
    pub input_attached: bool,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            device: None,
            input_attached: false,
        }
    }
}
