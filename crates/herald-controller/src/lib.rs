//! Per-prefix health-and-announcement control loop (§4.6).

pub mod controller;

pub use controller::PrefixController;
