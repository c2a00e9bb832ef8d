pub mod controller;
pub mod state_machine;
