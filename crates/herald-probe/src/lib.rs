//! Health probe kinds, executors, and threshold bookkeeping.
//!
//! Modeled on Kubernetes pod probes: a [`Probe`] carries generic scheduling
//! knobs (delay, period, timeout, thresholds) plus exactly one probe kind.
//! [`manager::ProbeManager`] wraps a single probe slot with an outer timeout
//! and consecutive success/failure bookkeeping; it does not decide when to
//! act on thresholds, it only exposes them alongside the latest verdict.

pub mod error;
pub mod exec;
pub mod grpc;
pub mod http;
pub mod kind;
pub mod manager;
pub mod probe;
pub mod tcp;

pub use error::ProbeError;
pub use kind::{ExecProbeSpec, GrpcProbeSpec, HttpHeader, HttpProbeSpec, ProbeKind, TcpProbeSpec};
pub use manager::{ProbeManager, ProbeOutcome};
pub use probe::Probe;
