/// Default level stream ring capacity, in samples.
pub const DEFAULT_STREAM_CAPACITY: usize = 256;

/// Linear-PCM capture format requested from the input hardware.
///
/// The hardware contract is 48 kHz / 16-bit / interleaved integer PCM (not
/// floating point); the default reproduces it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate_hz: u32,
    /// Bits per sample. Valid values: 16, 24, 32.
    pub bit_depth: u16,
    pub interleaved: bool,
}

impl CaptureFormat {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![16, 24, 32].contains(&self.bit_depth) {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        Ok(())
    }
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self {
            sample_rate_hz: 48_000,
            bit_depth: 16,
            interleaved: true,
        }
    }
}

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// PCM format requested from the input hardware.
    pub format: CaptureFormat,
    /// Level stream ring capacity, in samples. A subscriber that falls more
    /// than this far behind loses the oldest samples.
    pub stream_capacity: usize,
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.format.validate()?;
        if self.stream_capacity == 0 {
            return Err("stream capacity must be at least 1".into());
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            format: CaptureFormat::default(),
            stream_capacity: DEFAULT_STREAM_CAPACITY,
        }
    }
}
