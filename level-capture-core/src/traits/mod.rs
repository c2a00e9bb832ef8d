pub mod buffer_sink;
pub mod capture_provider;
pub mod device_registry;
pub mod permission_gate;
