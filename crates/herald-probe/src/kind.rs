//! Probe kind configuration: one variant per probe executor.
//!
//! The wire format mirrors the source daemon's YAML shape — a probe carries
//! up to four optional nested blocks (`http`, `grpc`, `tcp`, `exec`) and
//! exactly one must be present. [`ProbeKind`] is the sum-type view used
//! internally once a [`crate::Probe`] has been validated.

use serde::Deserialize;

fn default_scheme() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

fn default_expected_status() -> Vec<u16> {
    vec![200]
}

fn default_exit_codes() -> Vec<i32> {
    vec![0]
}

/// A single HTTP request header to attach to an [`HttpProbeSpec`] probe.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpHeader {
    pub name: String,
    pub value: String,
}

/// HTTP GET probe: success iff the response status is in `expected_status`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpProbeSpec {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub http_headers: Vec<HttpHeader>,
    #[serde(default = "default_expected_status")]
    pub expected_status: Vec<u16>,
}

impl HttpProbeSpec {
    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}

/// Standard gRPC health-check probe: success iff status == SERVING.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcProbeSpec {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub service: Option<String>,
}

impl GrpcProbeSpec {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Bare TCP-connect probe.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpProbeSpec {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl TcpProbeSpec {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Exec probe: spawns a command, success iff its exit code is expected.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecProbeSpec {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default = "default_exit_codes")]
    pub exit_codes: Vec<i32>,
}

/// Sum-type view of a configured probe's kind, dispatched by the probe
/// manager. Avoids nominal inheritance between probe executors.
#[derive(Clone, Debug)]
pub enum ProbeKind {
    Http(HttpProbeSpec),
    Grpc(GrpcProbeSpec),
    Tcp(TcpProbeSpec),
    Exec(ExecProbeSpec),
}

impl ProbeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeKind::Http(_) => "http",
            ProbeKind::Grpc(_) => "grpc",
            ProbeKind::Tcp(_) => "tcp",
            ProbeKind::Exec(_) => "exec",
        }
    }
}
