use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped loudness reading.
///
/// `level` is a dBFS-like figure: the sum of each channel's average power
/// over one hardware buffer. 0.0 is full scale; a silent channel bottoms out
/// at [`SILENCE_FLOOR_DB`](crate::models::buffer::SILENCE_FLOOR_DB).
///
/// Timestamps are strictly increasing within one producer, so consumers may
/// use them as sample identity for ordering and dedup. Samples are immutable
/// once created; the core retains no history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSample {
    /// Wall-clock instant the buffer was reduced.
    pub at: DateTime<Utc>,
    /// Loudness in dBFS (sum of per-channel average powers).
    pub level: f32,
}

impl LevelSample {
    pub fn new(at: DateTime<Utc>, level: f32) -> Self {
        Self { at, level }
    }
}
