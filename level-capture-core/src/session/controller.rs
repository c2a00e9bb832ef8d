use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::models::config::SessionConfig;
use crate::models::device::InputDevice;
use crate::models::error::CaptureError;
use crate::models::state::SessionSnapshot;
use crate::processing::reducer::LevelReducer;
use crate::stream::{LevelStream, LevelSubscription};
use crate::traits::buffer_sink::BufferSink;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::device_registry::DeviceRegistry;
use crate::traits::permission_gate::PermissionGate;

use super::state_machine::SessionStateMachine;

enum Command {
    Start,
    Stop,
    SelectDevice(InputDevice),
    Flush(Sender<()>),
    Shutdown,
}

/// Public handle to the capture session.
///
/// Owns the session-management context: a dedicated `capture-session` thread
/// that applies `start`/`stop`/`select_device` one at a time, in submission
/// order, and never shares a lock with the capture-callback path. Readers
/// get atomically-published snapshots.
///
/// Construct one per process with documented teardown: dropping the
/// controller stops the hardware and joins the worker. There is no lazy
/// global — tests build isolated instances over fake gates, registries, and
/// providers.
pub struct CaptureController {
    commands: Sender<Command>,
    snapshot: Arc<Mutex<SessionSnapshot>>,
    stream: LevelStream,
    gate: Arc<dyn PermissionGate>,
    registry: Arc<dyn DeviceRegistry>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CaptureController {
    /// Spawn the session worker.
    ///
    /// `make_provider` runs on the worker thread, so providers holding
    /// thread-bound handles (cpal streams are not `Send`) are constructed in
    /// place. The worker immediately selects a default input device;
    /// configuration waits for the first `start`.
    pub fn spawn<P, F>(
        config: SessionConfig,
        gate: Arc<dyn PermissionGate>,
        registry: Arc<dyn DeviceRegistry>,
        make_provider: F,
    ) -> Result<Self, CaptureError>
    where
        P: CaptureProvider + 'static,
        F: FnOnce() -> P + Send + 'static,
    {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let stream = LevelStream::new(config.stream_capacity);
        let reducer = Arc::new(LevelReducer::new(stream.publisher()));

        let (commands, inbox) = crossbeam_channel::unbounded();
        let snapshot = Arc::new(Mutex::new(SessionSnapshot::idle()));

        let worker_registry = Arc::clone(&registry);
        let worker_snapshot = Arc::clone(&snapshot);
        let format = config.format;

        let worker = thread::Builder::new()
            .name("capture-session".into())
            .spawn(move || {
                let sink: Arc<dyn BufferSink> = reducer;
                let machine =
                    SessionStateMachine::new(make_provider(), worker_registry, sink, format);
                run_session(machine, inbox, worker_snapshot);
            })
            .expect("failed to spawn session thread");

        Ok(Self {
            commands,
            snapshot,
            stream,
            gate,
            registry,
            worker: Some(worker),
        })
    }

    /// Begin capture.
    ///
    /// Authorization resolves on the calling thread — a permission prompt
    /// suspends the caller, never the session context — and a denial is
    /// logged and final for this call. The rest is fire-and-forget:
    /// configuration failures surface through logging only.
    pub fn start(&self) {
        if !self.gate.authorize() {
            log::warn!("microphone authorization denied, capture not started");
            return;
        }
        self.send(Command::Start);
    }

    /// Request capture stop. Returns once the request is queued; the
    /// hardware may still be winding down. Callers needing strict ordering
    /// observe [`is_running`](Self::is_running) after a [`flush`](Self::flush).
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Switch the capture input device.
    pub fn select_device(&self, device: InputDevice) {
        self.send(Command::SelectDevice(device));
    }

    /// Live level feed, delivering samples published from this moment on.
    pub fn subscribe_levels(&self) -> LevelSubscription {
        self.stream.subscribe()
    }

    /// Snapshot query: whether hardware capture is active.
    pub fn is_running(&self) -> bool {
        self.snapshot.lock().phase.is_running()
    }

    /// Full session snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.lock().clone()
    }

    /// Input devices currently usable for capture.
    pub fn available_devices(&self) -> Vec<InputDevice> {
        self.registry.list_input_devices()
    }

    /// Block until every previously submitted command has been applied.
    pub fn flush(&self) {
        let (ack, done) = crossbeam_channel::bounded(1);
        self.send(Command::Flush(ack));
        let _ = done.recv();
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::error!("session worker is gone, command dropped");
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_session<P: CaptureProvider>(
    mut machine: SessionStateMachine<P>,
    inbox: Receiver<Command>,
    snapshot: Arc<Mutex<SessionSnapshot>>,
) {
    machine.initialize();
    *snapshot.lock() = machine.snapshot();

    while let Ok(command) = inbox.recv() {
        match command {
            Command::Start => machine.start(),
            Command::Stop => machine.stop(),
            Command::SelectDevice(device) => machine.select_device(device),
            Command::Flush(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
        *snapshot.lock() = machine.snapshot();
    }

    machine.shutdown();
}
