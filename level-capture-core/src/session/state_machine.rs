use std::sync::Arc;

use crate::models::config::CaptureFormat;
use crate::models::device::InputDevice;
use crate::models::error::CaptureError;
use crate::models::state::{SessionPhase, SessionSnapshot};
use crate::traits::buffer_sink::BufferSink;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::device_registry::DeviceRegistry;

/// The capture-session state machine.
///
/// Single-owner: exactly one thread — the session-management context —
/// drives these methods, so every mutation is serialized. Readers observe
/// state only through published [`SessionSnapshot`]s.
///
/// ```text
/// uninitialized ──start──▶ configured ⇄ running
/// ```
///
/// Configuration happens once, on the first successful `start`; device
/// changes afterwards apply in place without leaving the current phase and
/// without tearing down the output endpoint or the reducer registration.
pub struct SessionStateMachine<P: CaptureProvider> {
    provider: P,
    registry: Arc<dyn DeviceRegistry>,
    sink: Arc<dyn BufferSink>,
    format: CaptureFormat,
    device: Option<InputDevice>,
    configured: bool,
    running: bool,
}

impl<P: CaptureProvider> SessionStateMachine<P> {
    pub fn new(
        provider: P,
        registry: Arc<dyn DeviceRegistry>,
        sink: Arc<dyn BufferSink>,
        format: CaptureFormat,
    ) -> Self {
        Self {
            provider,
            registry,
            sink,
            format,
            device: None,
            configured: false,
            running: false,
        }
    }

    /// Select a default input device. No hardware is touched yet;
    /// configuration is deferred to the first `start`.
    pub fn initialize(&mut self) {
        self.device = self.registry.default_input_device();
        match &self.device {
            Some(device) => log::info!("selected default input device '{}'", device.name),
            None => log::warn!("no input hardware present"),
        }
    }

    /// Start capture, configuring the pipeline on first use.
    ///
    /// Idempotent while running. Every failure is logged and leaves the
    /// phase unchanged; nothing is retried.
    pub fn start(&mut self) {
        if self.running {
            return;
        }

        if !self.configured {
            if let Err(error) = self.configure() {
                log::error!("session configuration failed: {error}");
                return;
            }
        }
        self.begin_capture();
    }

    /// Stop hardware capture. No-op when not running, including when the
    /// session was never configured.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.provider.stop();
        self.running = false;
        log::info!("capture stopped");
    }

    /// Switch the capture input.
    ///
    /// Before configuration this only updates the pending selection. Once
    /// configured, the current input is detached and the new one attached in
    /// place, preserving the running/stopped phase. If the new input fails
    /// to attach, the session keeps its phase but has no input — capture
    /// runs silent until the next successful attach.
    pub fn select_device(&mut self, device: InputDevice) {
        if !self.configured {
            self.device = Some(device);
            return;
        }

        self.provider.detach_input();
        match self.provider.attach_input(&device) {
            Ok(()) => log::info!("capture input switched to '{}'", device.name),
            Err(error) => log::error!(
                "input attach failed for '{}', capture is silent: {error}",
                device.name
            ),
        }
        self.device = Some(device);
    }

    /// Stop capture and release endpoints ahead of teardown.
    pub fn shutdown(&mut self) {
        self.stop();
        self.provider.detach_input();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            device: self.device.clone(),
            input_attached: self.provider.has_input(),
        }
    }

    fn phase(&self) -> SessionPhase {
        match (self.configured, self.running) {
            (_, true) => SessionPhase::Running,
            (true, false) => SessionPhase::Configured,
            (false, false) => SessionPhase::Uninitialized,
        }
    }

    /// One-time pipeline configuration: input endpoint for the selected
    /// device, output endpoint in the fixed PCM format, sink registered as
    /// the buffer consumer.
    fn configure(&mut self) -> Result<(), CaptureError> {
        if self.device.is_none() {
            // The default may have appeared since initialize().
            self.device = self.registry.default_input_device();
        }
        let device = self.device.clone().ok_or(CaptureError::DeviceNotAvailable)?;

        self.provider.attach_input(&device)?;

        if let Err(error) = self
            .provider
            .attach_output(self.format, Arc::clone(&self.sink))
        {
            // A half-attached pipeline must not survive the failure.
            self.provider.detach_input();
            return Err(error);
        }

        self.configured = true;
        log::info!(
            "session configured for '{}' at {} Hz / {}-bit",
            device.name,
            self.format.sample_rate_hz,
            self.format.bit_depth
        );
        Ok(())
    }

    fn begin_capture(&mut self) {
        match self.provider.start() {
            Ok(()) => {
                self.running = true;
                log::info!("capture running");
            }
            Err(error) => log::error!("hardware capture failed to start: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::buffer::AudioBuffer;
    use crate::models::device::Connectivity;
    use parking_lot::Mutex;

    fn mic(name: &str) -> InputDevice {
        InputDevice {
            id: name.into(),
            name: name.into(),
            connectivity: Connectivity::Connected,
            suspended: false,
            is_default: false,
        }
    }

    struct FakeRegistry {
        default: Option<InputDevice>,
    }

    impl DeviceRegistry for FakeRegistry {
        fn list_input_devices(&self) -> Vec<InputDevice> {
            self.default.clone().into_iter().collect()
        }

        fn default_input_device(&self) -> Option<InputDevice> {
            self.default.clone()
        }
    }

    struct NoopSink;

    impl BufferSink for NoopSink {
        fn on_buffer_ready(&self, _buffer: AudioBuffer<'_>) {}
    }

    #[derive(Default)]
    struct ProviderLog {
        attach_input_calls: usize,
        detach_calls: usize,
        attach_output_calls: usize,
        start_calls: usize,
        stop_calls: usize,
        input_attached: bool,
    }

    #[derive(Default)]
    struct FakeProvider {
        log: Arc<Mutex<ProviderLog>>,
        fail_attach_input: bool,
        fail_attach_output: bool,
        fail_start: bool,
    }

    impl FakeProvider {
        fn with_log(log: Arc<Mutex<ProviderLog>>) -> Self {
            Self {
                log,
                ..Self::default()
            }
        }
    }

    impl CaptureProvider for FakeProvider {
        fn attach_input(&mut self, _device: &InputDevice) -> Result<(), CaptureError> {
            let mut log = self.log.lock();
            log.attach_input_calls += 1;
            if self.fail_attach_input {
                return Err(CaptureError::AttachmentFailed("refused".into()));
            }
            log.input_attached = true;
            Ok(())
        }

        fn detach_input(&mut self) {
            let mut log = self.log.lock();
            log.detach_calls += 1;
            log.input_attached = false;
        }

        fn attach_output(
            &mut self,
            _format: CaptureFormat,
            _sink: Arc<dyn BufferSink>,
        ) -> Result<(), CaptureError> {
            self.log.lock().attach_output_calls += 1;
            if self.fail_attach_output {
                return Err(CaptureError::AttachmentFailed("output refused".into()));
            }
            Ok(())
        }

        fn start(&mut self) -> Result<(), CaptureError> {
            self.log.lock().start_calls += 1;
            if self.fail_start {
                return Err(CaptureError::StreamFailed("hardware busy".into()));
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.log.lock().stop_calls += 1;
        }

        fn has_input(&self) -> bool {
            self.log.lock().input_attached
        }
    }

    fn machine_with(
        provider: FakeProvider,
        default: Option<InputDevice>,
    ) -> SessionStateMachine<FakeProvider> {
        SessionStateMachine::new(
            provider,
            Arc::new(FakeRegistry { default }),
            Arc::new(NoopSink),
            CaptureFormat::default(),
        )
    }

    fn assert_invariant(machine: &SessionStateMachine<FakeProvider>) {
        let snapshot = machine.snapshot();
        if snapshot.phase.is_running() {
            assert!(snapshot.phase.is_configured(), "running implies configured");
        }
    }

    #[test]
    fn first_start_configures_then_runs() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();

        machine.start();

        assert_eq!(machine.snapshot().phase, SessionPhase::Running);
        assert_invariant(&machine);
        let log = log.lock();
        assert_eq!(log.attach_input_calls, 1);
        assert_eq!(log.attach_output_calls, 1);
        assert_eq!(log.start_calls, 1);
    }

    #[test]
    fn double_start_activates_hardware_once() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();

        machine.start();
        machine.start();

        assert_eq!(log.lock().start_calls, 1);
        assert_eq!(machine.snapshot().phase, SessionPhase::Running);
    }

    #[test]
    fn stop_returns_to_configured_and_restart_skips_configuration() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();

        machine.start();
        machine.stop();
        assert_eq!(machine.snapshot().phase, SessionPhase::Configured);
        assert_invariant(&machine);

        machine.start();
        assert_eq!(machine.snapshot().phase, SessionPhase::Running);

        let log = log.lock();
        assert_eq!(log.attach_input_calls, 1, "configuration is one-time");
        assert_eq!(log.start_calls, 2);
        assert_eq!(log.stop_calls, 1);
    }

    #[test]
    fn stop_without_configuration_is_a_no_op() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));

        machine.stop();

        assert_eq!(machine.snapshot().phase, SessionPhase::Uninitialized);
        assert_eq!(log.lock().stop_calls, 0);
    }

    #[test]
    fn start_without_any_device_stays_uninitialized() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), None);
        machine.initialize();

        machine.start();

        assert_eq!(machine.snapshot().phase, SessionPhase::Uninitialized);
        let log = log.lock();
        assert_eq!(log.attach_input_calls, 0);
        assert_eq!(log.start_calls, 0);
    }

    #[test]
    fn input_attach_failure_aborts_configuration() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let provider = FakeProvider {
            fail_attach_input: true,
            ..FakeProvider::with_log(Arc::clone(&log))
        };
        let mut machine = machine_with(provider, Some(mic("usb")));
        machine.initialize();

        machine.start();

        assert_eq!(machine.snapshot().phase, SessionPhase::Uninitialized);
        assert_eq!(log.lock().start_calls, 0);
    }

    #[test]
    fn output_attach_failure_detaches_the_input() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let provider = FakeProvider {
            fail_attach_output: true,
            ..FakeProvider::with_log(Arc::clone(&log))
        };
        let mut machine = machine_with(provider, Some(mic("usb")));
        machine.initialize();

        machine.start();

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Uninitialized);
        assert!(!snapshot.input_attached);
        assert_eq!(log.lock().detach_calls, 1);
    }

    #[test]
    fn hardware_start_failure_leaves_the_session_configured() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let provider = FakeProvider {
            fail_start: true,
            ..FakeProvider::with_log(Arc::clone(&log))
        };
        let mut machine = machine_with(provider, Some(mic("usb")));
        machine.initialize();

        machine.start();

        assert_eq!(machine.snapshot().phase, SessionPhase::Configured);
        assert_invariant(&machine);
    }

    #[test]
    fn select_device_before_configuration_only_updates_the_selection() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();

        machine.select_device(mic("headset"));

        assert_eq!(log.lock().attach_input_calls, 0);
        assert_eq!(
            machine.snapshot().device.map(|d| d.name),
            Some("headset".into())
        );

        // The pending selection wins over the registry default.
        machine.start();
        assert_eq!(
            machine.snapshot().device.map(|d| d.name),
            Some("headset".into())
        );
    }

    #[test]
    fn select_device_while_running_keeps_running() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();
        machine.start();

        machine.select_device(mic("headset"));

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Running);
        assert!(snapshot.input_attached);
        assert_eq!(snapshot.device.map(|d| d.name), Some("headset".into()));
        let log = log.lock();
        assert_eq!(log.detach_calls, 1);
        assert_eq!(log.attach_input_calls, 2);
        assert_eq!(log.attach_output_calls, 1, "output endpoint survives the switch");
    }

    #[test]
    fn failed_device_switch_leaves_no_input_but_stays_running() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();
        machine.start();

        // Make the next attach fail.
        machine.provider.fail_attach_input = true;
        machine.select_device(mic("flaky"));

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Running, "phase is preserved");
        assert!(!snapshot.input_attached, "no revert to the previous input");
        assert_eq!(snapshot.device.map(|d| d.name), Some("flaky".into()));
    }

    #[test]
    fn invariant_holds_across_arbitrary_start_stop_sequences() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(log), Some(mic("usb")));
        machine.initialize();

        machine.stop();
        assert_invariant(&machine);
        machine.start();
        assert_invariant(&machine);
        machine.start();
        assert_invariant(&machine);
        machine.stop();
        assert_invariant(&machine);
        machine.stop();
        assert_invariant(&machine);
        machine.start();
        assert_invariant(&machine);
    }

    #[test]
    fn shutdown_stops_and_detaches() {
        let log = Arc::new(Mutex::new(ProviderLog::default()));
        let mut machine = machine_with(FakeProvider::with_log(Arc::clone(&log)), Some(mic("usb")));
        machine.initialize();
        machine.start();

        machine.shutdown();

        let log = log.lock();
        assert_eq!(log.stop_calls, 1);
        assert!(!log.input_attached);
    }
}
