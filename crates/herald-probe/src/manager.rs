//! Probe manager: timeout, kind dispatch, and threshold bookkeeping.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::error::{ProbeError, Result as ProbeResult};
use crate::kind::ProbeKind;
use crate::probe::Probe;

/// Outcome of a single [`ProbeManager::run`] call: the verdict, how long it
/// took, and the counters *after* the threshold update.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub verdict: ProbeResult<()>,
    pub duration: Duration,
    pub failures: u32,
    pub successes: u32,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// Wraps one probe slot (startup, liveness, or readiness for a given
/// prefix) with consecutive failure/success bookkeeping. Counters are
/// informational: the manager does not decide when to act on thresholds,
/// it only exposes them alongside the latest verdict (the controller
/// interprets them, or in this design, ignores them and acts per-tick).
#[derive(Debug, Default)]
pub struct ProbeManager {
    failures: u32,
    successes: u32,
}

impl ProbeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn successes(&self) -> u32 {
        self.successes
    }

    /// Run `probe` once: dispatch to the configured kind under an outer
    /// timeout (applied over the whole probe, including connection setup),
    /// then update the saturating threshold counters.
    pub async fn run(&mut self, probe: &Probe, cancel: &CancellationToken) -> ProbeOutcome {
        let start = Instant::now();
        let kind = probe.kind();

        let verdict = match kind {
            Err(e) => Err(e),
            Ok(kind) => self.dispatch(&kind, probe.timeout, cancel).await,
        };

        let duration = start.elapsed();
        self.update_thresholds(&verdict, probe.failure_threshold(), probe.success_threshold());

        ProbeOutcome {
            verdict,
            duration,
            failures: self.failures,
            successes: self.successes,
        }
    }

    async fn dispatch(
        &self,
        kind: &ProbeKind,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> ProbeResult<()> {
        let run_fut = async {
            match kind {
                ProbeKind::Http(spec) => crate::http::run(spec, cancel.clone()).await,
                ProbeKind::Grpc(spec) => crate::grpc::run(spec, cancel.clone()).await,
                ProbeKind::Tcp(spec) => crate::tcp::run(spec, cancel.clone()).await,
                ProbeKind::Exec(spec) => crate::exec::run(spec, cancel.clone()).await,
            }
        };

        if timeout.is_zero() {
            return run_fut.await;
        }

        match tokio::time::timeout(timeout, run_fut).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout),
        }
    }

    fn update_thresholds(&mut self, verdict: &ProbeResult<()>, failure_threshold: u32, success_threshold: u32) {
        match verdict {
            Ok(()) => {
                self.failures = 0;
                if self.successes < success_threshold {
                    self.successes += 1;
                }
            }
            Err(_) => {
                self.successes = 0;
                if self.failures < failure_threshold {
                    self.failures += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_failure_then_recovers() {
        let mut mgr = ProbeManager::new();
        for _ in 0..4 {
            mgr.update_thresholds(&Err(ProbeError::Timeout), 3, 1);
        }
        assert_eq!(mgr.failures(), 3);
        assert_eq!(mgr.successes(), 0);

        mgr.update_thresholds(&Ok(()), 3, 1);
        assert_eq!(mgr.successes(), 1);
        assert_eq!(mgr.failures(), 0);
    }

    #[tokio::test]
    async fn no_probe_configured_is_a_failure() {
        let mut mgr = ProbeManager::new();
        let probe = Probe {
            initial_delay: Duration::ZERO,
            period: Duration::from_secs(10),
            timeout: Duration::from_secs(1),
            failure_threshold: 3,
            success_threshold: 1,
            termination_grace_period: Duration::ZERO,
            http: None,
            grpc: None,
            tcp: None,
            exec: None,
        };
        let outcome = mgr.run(&probe, &CancellationToken::new()).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.failures, 1);
    }
}
