//! Probe configuration: generic scheduling knobs plus exactly one kind.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProbeError, Result};
use crate::kind::{ExecProbeSpec, GrpcProbeSpec, HttpProbeSpec, ProbeKind, TcpProbeSpec};

fn default_period() -> Duration {
    Duration::from_secs(10)
}

fn default_timeout() -> Duration {
    Duration::from_secs(1)
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_success_threshold() -> u32 {
    1
}

/// A configured health probe: scheduling knobs common to startup, liveness,
/// and readiness slots, plus exactly one of `http` / `grpc` / `tcp` / `exec`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Probe {
    #[serde(default, with = "humantime_serde")]
    pub initial_delay: Duration,
    #[serde(default = "default_period", with = "humantime_serde")]
    pub period: Duration,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
    #[serde(default, with = "humantime_serde")]
    pub termination_grace_period: Duration,

    #[serde(default)]
    pub http: Option<HttpProbeSpec>,
    #[serde(default)]
    pub grpc: Option<GrpcProbeSpec>,
    #[serde(default)]
    pub tcp: Option<TcpProbeSpec>,
    #[serde(default)]
    pub exec: Option<ExecProbeSpec>,
}

impl Probe {
    /// Resolve the exactly-one configured kind. Thresholds are clamped to a
    /// minimum of 1 per spec (`failure_threshold`/`success_threshold` min 1).
    pub fn kind(&self) -> Result<ProbeKind> {
        match (
            self.http.clone(),
            self.grpc.clone(),
            self.tcp.clone(),
            self.exec.clone(),
        ) {
            (Some(h), None, None, None) => Ok(ProbeKind::Http(h)),
            (None, Some(g), None, None) => Ok(ProbeKind::Grpc(g)),
            (None, None, Some(t), None) => Ok(ProbeKind::Tcp(t)),
            (None, None, None, Some(e)) => Ok(ProbeKind::Exec(e)),
            _ => Err(ProbeError::NotConfigured),
        }
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold.max(1)
    }

    pub fn success_threshold(&self) -> u32 {
        self.success_threshold.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_requires_exactly_one() {
        let probe = Probe {
            initial_delay: Duration::ZERO,
            period: default_period(),
            timeout: default_timeout(),
            failure_threshold: 3,
            success_threshold: 1,
            termination_grace_period: Duration::ZERO,
            http: None,
            grpc: None,
            tcp: None,
            exec: None,
        };
        assert!(matches!(probe.kind(), Err(ProbeError::NotConfigured)));
    }

    #[test]
    fn kind_resolves_http() {
        let probe = Probe {
            initial_delay: Duration::ZERO,
            period: default_period(),
            timeout: default_timeout(),
            failure_threshold: 3,
            success_threshold: 1,
            termination_grace_period: Duration::ZERO,
            http: Some(HttpProbeSpec {
                scheme: "http".into(),
                host: "localhost".into(),
                port: 8080,
                path: "/".into(),
                http_headers: vec![],
                expected_status: vec![200],
            }),
            grpc: None,
            tcp: None,
            exec: None,
        };
        assert!(matches!(probe.kind(), Ok(ProbeKind::Http(_))));
    }

    #[test]
    fn thresholds_clamp_to_one() {
        let probe = Probe {
            initial_delay: Duration::ZERO,
            period: default_period(),
            timeout: default_timeout(),
            failure_threshold: 0,
            success_threshold: 0,
            termination_grace_period: Duration::ZERO,
            http: None,
            grpc: None,
            tcp: None,
            exec: Some(ExecProbeSpec {
                command: "true".into(),
                args: vec![],
                user: None,
                exit_codes: vec![0],
            }),
        };
        assert_eq!(probe.failure_threshold(), 1);
        assert_eq!(probe.success_threshold(), 1);
    }
}
