//! cpal capture provider.
//!
//! The input endpoint is a cpal input stream for the selected device; the
//! output endpoint is the registered [`BufferSink`] fed from the stream
//! callback. The callback thread belongs to cpal: sample conversion and
//! everything downstream of it run there, never on the session thread.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};

use level_capture_core::models::buffer::AudioBuffer;
use level_capture_core::models::config::CaptureFormat;
use level_capture_core::models::device::InputDevice;
use level_capture_core::models::error::CaptureError;
use level_capture_core::traits::buffer_sink::BufferSink;
use level_capture_core::traits::capture_provider::CaptureProvider;

/// Convert interleaved 16-bit PCM to `f32`, reusing the output allocation.
pub(crate) fn pcm16_to_f32(pcm: &[i16], out: &mut Vec<f32>) {
    out.clear();
    out.extend(pcm.iter().map(|&s| f32::from(s) / f32::from(i16::MAX)));
}

/// Capture provider over a cpal input stream.
///
/// Requests the fixed 48 kHz / 16-bit / interleaved PCM contract from the
/// device and converts to `f32` before the sink sees the buffer. Holds the
/// live `cpal::Stream`, which is not `Send`: the session constructs and
/// drives this provider from its own worker thread.
pub struct CpalCaptureProvider {
    device: Option<cpal::Device>,
    output: Option<(CaptureFormat, Arc<dyn BufferSink>)>,
    stream: Option<cpal::Stream>,
    started: bool,
}

impl CpalCaptureProvider {
    pub fn new() -> Self {
        Self {
            device: None,
            output: None,
            stream: None,
            started: false,
        }
    }

    fn resolve(device: &InputDevice) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        let mut devices = host.input_devices().map_err(|error| {
            CaptureError::AttachmentFailed(format!("input enumeration failed: {error}"))
        })?;
        devices
            .find(|d| d.name().map(|n| n == device.id).unwrap_or(false))
            .ok_or(CaptureError::DeviceNotAvailable)
    }

    /// (Re)build the input stream for the current device/output pair. A
    /// stream only exists while both endpoints are attached; if capture was
    /// already started, the fresh stream resumes immediately.
    fn rebuild_stream(&mut self) -> Result<(), CaptureError> {
        self.stream = None;

        let (Some(device), Some((format, sink))) = (&self.device, &self.output) else {
            return Ok(());
        };

        let channels = device
            .default_input_config()
            .map(|config| config.channels())
            .unwrap_or(1)
            .max(1);

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(format.sample_rate_hz),
            buffer_size: BufferSize::Default,
        };

        let sink = Arc::clone(sink);
        let sample_rate_hz = format.sample_rate_hz;
        let mut scratch: Vec<f32> = Vec::new();

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    pcm16_to_f32(data, &mut scratch);
                    sink.on_buffer_ready(AudioBuffer::new(&scratch, channels, sample_rate_hz));
                },
                |error| log::error!("capture stream error: {error}"),
                None,
            )
            .map_err(|error| {
                CaptureError::AttachmentFailed(format!("input stream rejected: {error}"))
            })?;

        if self.started {
            stream
                .play()
                .map_err(|error| CaptureError::StreamFailed(error.to_string()))?;
        }
        self.stream = Some(stream);
        Ok(())
    }
}

impl Default for CpalCaptureProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureProvider for CpalCaptureProvider {
    fn attach_input(&mut self, device: &InputDevice) -> Result<(), CaptureError> {
        self.detach_input();
        self.device = Some(Self::resolve(device)?);
        self.rebuild_stream()
    }

    fn detach_input(&mut self) {
        self.stream = None;
        self.device = None;
    }

    fn attach_output(
        &mut self,
        format: CaptureFormat,
        sink: Arc<dyn BufferSink>,
    ) -> Result<(), CaptureError> {
        format.validate().map_err(CaptureError::ConfigurationFailed)?;
        if !format.interleaved {
            return Err(CaptureError::ConfigurationFailed(
                "capture delivers interleaved PCM only".into(),
            ));
        }
        self.output = Some((format, sink));
        self.rebuild_stream()
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.stream.is_none() {
            self.rebuild_stream()?;
        }
        if let Some(stream) = &self.stream {
            stream
                .play()
                .map_err(|error| CaptureError::StreamFailed(error.to_string()))?;
        }
        // Without an input the session runs silent; that is the caller's
        // documented trade-off after a failed device switch.
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = &self.stream {
            if let Err(error) = stream.pause() {
                log::warn!("pausing the capture stream failed: {error}");
            }
        }
        self.started = false;
    }

    fn has_input(&self) -> bool {
        self.device.is_some()
    }
}
