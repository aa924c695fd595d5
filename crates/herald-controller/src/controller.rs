//! The per-prefix control loop (§4.6), run as one task per configured
//! prefix. Mirrors the source's `RunScheduler` sequence exactly:
//!
//! 1. Check the service precondition. No configured service, an inactive
//!    service, or a query error all abort the loop here.
//! 2. Run the startup probe once, if configured; a failure here aborts the
//!    whole loop without ever scheduling liveness or readiness.
//! 3. Run liveness checks on a recurring tick, restarting the service on
//!    failure.
//! 4. Run readiness checks on a recurring tick, announcing or withdrawing
//!    the prefix's path based on the latest verdict.
//! 5. On cancellation, withdraw the path if it is currently announced.
//!
//! All operational errors (probe failures, restart failures, BGP errors)
//! are absorbed into logs and metrics here; nothing propagates past `run`
//! (§7 Error Handling Design — only configuration and logger
//! initialization are fatal).

use std::sync::Arc;

use herald_bgp::Speaker;
use herald_core::config::Prefix;
use herald_metrics::{Metrics, ProbeLabels, ProbeType};
use herald_probe::{Probe, ProbeManager};
use tokio_util::sync::CancellationToken;

/// Owns one prefix's lifecycle: its config, a shared handle to the BGP
/// speaker, and the shared metrics registry.
pub struct PrefixController {
    prefix: Prefix,
    speaker: Arc<Speaker>,
    metrics: Arc<Metrics>,
    /// Whether graceful restart is enabled process-wide (§9). When `true`,
    /// shutdown leaves announced paths in place for the peer to keep using
    /// during the restart window instead of withdrawing them.
    graceful_restart: bool,
}

impl PrefixController {
    pub fn new(prefix: Prefix, speaker: Arc<Speaker>, metrics: Arc<Metrics>, graceful_restart: bool) -> Self {
        Self { prefix, speaker, metrics, graceful_restart }
    }

    pub async fn run(self, cancel: CancellationToken) {
        let name = self.prefix.metric_name().to_string();

        if !self.service_precondition_met(&name).await {
            return;
        }

        if let Some(startup) = self.prefix.startup_probe.clone() {
            if !self.run_startup(&startup, &name, &cancel).await {
                return;
            }
        }

        tokio::join!(
            self.run_liveness(&name, cancel.clone()),
            self.run_readiness(&name, cancel.clone()),
        );

        self.shutdown(&name).await;
    }

    /// §4.6 step 1. An unset service cannot be queried, so the controller
    /// cannot progress past this step (§4.6 "Tie-breaks and edge cases":
    /// "Missing service: if `prefix.service` is unset, the controller
    /// cannot progress past step 1.").
    async fn service_precondition_met(&self, name: &str) -> bool {
        let Some(service) = &self.prefix.service else {
            tracing::warn!(prefix = %self.prefix.ip_address, name, "no service configured, skipping prefix");
            return false;
        };
        match service.is_active().await {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(prefix = %self.prefix.ip_address, name, "service is not active, skipping prefix");
                false
            }
            Err(err) => {
                tracing::warn!(prefix = %self.prefix.ip_address, name, error = %err, "failed to query service state, skipping prefix");
                false
            }
        }
    }

    /// §4.6 step 2. Returns whether the controller should proceed to
    /// liveness/readiness scheduling.
    async fn run_startup(&self, probe: &Probe, name: &str, cancel: &CancellationToken) -> bool {
        let mut manager = ProbeManager::new();
        let outcome = herald_scheduler::run_once(probe.initial_delay, cancel, || async {
            manager.run(probe, cancel).await
        })
        .await;

        let Some(outcome) = outcome else {
            return false;
        };
        self.record_probe(ProbeType::Startup, name, &outcome);

        if outcome.is_success() {
            return true;
        }

        tracing::warn!(
            prefix = %self.prefix.ip_address,
            name,
            failures = outcome.failures,
            "startup probe failed, prefix will not be scheduled"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(probe.period) => {}
        }
        false
    }

    /// §4.6 step 3. A plain sleep/check loop rather than the shared
    /// `herald_scheduler::run_periodic` combinator: this tick's body needs
    /// `&mut` access to a probe manager that outlives every iteration, which
    /// a reusable `FnMut` combinator only complicates here.
    async fn run_liveness(&self, name: &str, cancel: CancellationToken) {
        let Some(probe) = &self.prefix.liveness_probe else {
            return;
        };
        if !probe.initial_delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(probe.initial_delay) => {}
            }
        }

        let mut manager = ProbeManager::new();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = self.liveness_tick(probe, &mut manager, name, &cancel) => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(probe.period) => {}
            }
        }
    }

    async fn liveness_tick(&self, probe: &Probe, manager: &mut ProbeManager, name: &str, cancel: &CancellationToken) {
        if let Some(service) = &self.prefix.service {
            match service.is_active().await {
                Ok(true) => {}
                _ => {
                    tracing::warn!(prefix = %self.prefix.ip_address, name, "liveness: service not active, restarting");
                    self.restart_service(service, name).await;
                    return;
                }
            }
        }

        let outcome = manager.run(probe, cancel).await;
        self.record_probe(ProbeType::Liveness, name, &outcome);

        if !outcome.is_success() {
            tracing::warn!(
                prefix = %self.prefix.ip_address,
                name,
                failures = outcome.failures,
                "liveness probe failed, restarting service"
            );
            if let Some(service) = &self.prefix.service {
                self.restart_service(service, name).await;
            }
        } else {
            tracing::debug!(prefix = %self.prefix.ip_address, name, successes = outcome.successes, "liveness probe ok");
        }
    }

    /// §4.6 step 4. Scheduled independently of liveness per the source's
    /// two separate `cron.AddFunc` registrations.
    async fn run_readiness(&self, name: &str, cancel: CancellationToken) {
        let Some(probe) = &self.prefix.readiness_probe else {
            return;
        };
        if !probe.initial_delay.is_zero() {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(probe.initial_delay) => {}
            }
        }

        let mut manager = ProbeManager::new();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = self.readiness_tick(probe, &mut manager, name, &cancel) => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(probe.period) => {}
            }
        }
    }

    async fn readiness_tick(&self, probe: &Probe, manager: &mut ProbeManager, name: &str, cancel: &CancellationToken) {
        let outcome = manager.run(probe, cancel).await;
        self.record_probe(ProbeType::Readiness, name, &outcome);

        if outcome.is_success() {
            match self.speaker.add_path(&self.prefix) {
                Ok(()) => {
                    tracing::info!(prefix = %self.prefix.ip_address, name, "readiness ok, path announced");
                    self.set_prefix_up(name, 1);
                }
                Err(err) => {
                    tracing::error!(prefix = %self.prefix.ip_address, name, error = %err, "failed to add path");
                }
            }
        } else {
            tracing::warn!(
                prefix = %self.prefix.ip_address,
                name,
                failures = outcome.failures,
                "readiness probe failed, withdrawing path"
            );
            match self.speaker.delete_path(&self.prefix) {
                Ok(()) => self.set_prefix_up(name, 0),
                Err(err) => {
                    tracing::error!(prefix = %self.prefix.ip_address, name, error = %err, "failed to delete path");
                }
            }
        }
    }

    /// §4.6 step 5 / §9: withdraw on shutdown if currently announced,
    /// unless graceful restart is enabled, in which case the path is left
    /// announced for the peer to keep routing through the restart window.
    async fn shutdown(&self, name: &str) {
        if self.graceful_restart {
            return;
        }
        if self.speaker.is_announced(&self.prefix) {
            tracing::info!(prefix = %self.prefix.ip_address, name, "withdrawing path on shutdown");
            if let Err(err) = self.speaker.delete_path(&self.prefix) {
                tracing::error!(prefix = %self.prefix.ip_address, name, error = %err, "failed to withdraw path on shutdown");
            }
            self.set_prefix_up(name, 0);
        }
    }

    async fn restart_service(&self, service: &herald_service::Service, name: &str) {
        if let Err(err) = service.restart().await {
            tracing::error!(name, error = %err, "failed to restart service");
            return;
        }
        self.metrics
            .service_restarts_total
            .get_or_create(&herald_metrics::ServiceLabels { name: name.to_string() })
            .inc();
    }

    fn record_probe(&self, probe_type: ProbeType, name: &str, outcome: &herald_probe::ProbeOutcome) {
        let labels = ProbeLabels {
            prefix: self.prefix.ip_address.clone(),
            probe_type,
            name: name.to_string(),
        };
        if outcome.is_success() {
            self.metrics.probe_success_total.get_or_create(&labels).inc();
        } else {
            self.metrics.probe_failure_total.get_or_create(&labels).inc();
        }
        self.metrics
            .probe_duration_seconds
            .get_or_create(&labels)
            .observe(outcome.duration.as_secs_f64());
    }

    fn set_prefix_up(&self, name: &str, value: i64) {
        self.metrics
            .prefix_up
            .get_or_create(&herald_metrics::PrefixLabels {
                prefix: self.prefix.ip_address.clone(),
                name: name.to_string(),
            })
            .set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::config::{ApiConfig, Config, Prefix, SpeakerConfig};
    use herald_probe::{ExecProbeSpec, TcpProbeSpec};
    use std::time::Duration;
    use tokio::net::TcpListener;

    fn test_speaker() -> Arc<Speaker> {
        let config = Config {
            speaker: SpeakerConfig {
                asn: 65000,
                router_id: "192.0.2.1".to_string(),
                graceful_restart_enabled: false,
                graceful_restart_restart_time: 0,
            },
            bfd: None,
            api: ApiConfig {
                listen_address: "127.0.0.1".to_string(),
                listen_port: 0,
            },
            neighbors: vec![],
            prefixes: vec![],
            logging: Default::default(),
            metrics: Default::default(),
        };
        let speaker = Speaker::new(&config);
        speaker.start(&[]).unwrap();
        Arc::new(speaker)
    }

    fn base_prefix(readiness: Option<Probe>, startup: Option<Probe>) -> Prefix {
        Prefix {
            ip_address: "10.0.0.1/32".to_string(),
            next_hop: "192.0.2.1".to_string(),
            asn: 65000,
            communities: vec![],
            as_path_prepend: vec![],
            multi_exit_discriminator: 0,
            withdraw_on_down: false,
            maintenance: String::new(),
            service: None,
            startup_probe: startup,
            liveness_probe: None,
            readiness_probe: readiness,
        }
    }

    fn tcp_probe(port: u16, period_ms: u64) -> Probe {
        Probe {
            initial_delay: Duration::ZERO,
            period: Duration::from_millis(period_ms),
            timeout: Duration::from_millis(200),
            failure_threshold: 3,
            success_threshold: 1,
            termination_grace_period: Duration::ZERO,
            http: None,
            grpc: None,
            tcp: Some(TcpProbeSpec {
                host: "127.0.0.1".to_string(),
                port,
            }),
            exec: None,
        }
    }

    /// §8: "add_path called once; prefix_up=1" for a readiness probe that
    /// succeeds. Drives `readiness_tick` directly — the per-tick decision
    /// is the subject under test here, independent of the service-gated
    /// entry sequence covered by `missing_service_blocks_readiness` below.
    #[tokio::test]
    async fn readiness_announces_on_success() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let prefix = base_prefix(None, None);
        let speaker = test_speaker();
        let metrics = Arc::new(Metrics::new());
        let controller = PrefixController::new(prefix.clone(), speaker.clone(), metrics, false);

        let probe = tcp_probe(port, 20);
        let mut manager = ProbeManager::new();
        let cancel = CancellationToken::new();
        controller.readiness_tick(&probe, &mut manager, "test", &cancel).await;

        assert!(speaker.is_announced(&prefix));
    }

    /// §8 scenario 1: a readiness tick that fails must withdraw the path
    /// (`delete_path`, `prefix_up=0`).
    #[tokio::test]
    async fn readiness_withdraws_when_probe_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener); // nothing listens on `port` from here on

        let prefix = base_prefix(None, None);
        let speaker = test_speaker();
        let metrics = Arc::new(Metrics::new());
        let controller = PrefixController::new(prefix.clone(), speaker.clone(), metrics, false);

        speaker.add_path(&prefix).unwrap();
        assert!(speaker.is_announced(&prefix));

        let probe = tcp_probe(port, 20);
        let mut manager = ProbeManager::new();
        let cancel = CancellationToken::new();
        controller.readiness_tick(&probe, &mut manager, "test", &cancel).await;

        assert!(!speaker.is_announced(&prefix));
    }

    /// §8: startup probe failure must return `false` (terminate without
    /// ever scheduling readiness) and must not touch the BGP RIB.
    #[tokio::test]
    async fn startup_failure_prevents_readiness_scheduling() {
        let startup = Probe {
            initial_delay: Duration::ZERO,
            period: Duration::from_millis(10),
            timeout: Duration::from_millis(200),
            failure_threshold: 3,
            success_threshold: 1,
            termination_grace_period: Duration::ZERO,
            http: None,
            grpc: None,
            tcp: None,
            exec: Some(ExecProbeSpec {
                command: "false".to_string(),
                args: vec![],
                user: None,
                exit_codes: vec![0],
            }),
        };

        let prefix = base_prefix(None, None);
        let speaker = test_speaker();
        let metrics = Arc::new(Metrics::new());
        let controller = PrefixController::new(prefix.clone(), speaker.clone(), metrics, false);

        let cancel = CancellationToken::new();
        let proceed = controller.run_startup(&startup, "test", &cancel).await;

        assert!(!proceed);
        assert!(!speaker.is_announced(&prefix));
    }

    /// §4.6 "Tie-breaks and edge cases": an unset service cannot progress
    /// past step 1 — the controller must terminate without ever scheduling
    /// readiness, even though a readiness probe is configured.
    #[tokio::test]
    async fn missing_service_blocks_readiness() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let prefix = base_prefix(Some(tcp_probe(port, 20)), None);
        assert!(prefix.service.is_none());

        let speaker = test_speaker();
        let metrics = Arc::new(Metrics::new());
        let controller = PrefixController::new(prefix.clone(), speaker.clone(), metrics, false);

        controller.run(CancellationToken::new()).await;

        assert!(!speaker.is_announced(&prefix));
    }
}
