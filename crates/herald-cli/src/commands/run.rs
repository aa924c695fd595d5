//! `heraldd run`: load configuration, start the embedded BGP speaker, and
//! drive every configured prefix's control loop until SIGINT/SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::Args;
use herald_bgp::Speaker;
use herald_controller::PrefixController;
use herald_core::Config;
use herald_metrics::{Metrics, PeerLabels, RouteTableLabels};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{CliError, CliResult};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the YAML configuration file.
    #[arg(long, env = "HERALD_CONFIG")]
    pub config: PathBuf,
}

pub async fn execute(args: RunArgs) -> CliResult<()> {
    let config = Config::load(&args.config)?;
    let _logging_guard = herald_core::logging::init(&config.logging)?;

    tracing::info!(config = %args.config.display(), "herald starting up");

    let metrics = Arc::new(Metrics::new());
    let speaker = Arc::new(Speaker::new(&config));

    if let Err(err) = speaker.start(&config.neighbors) {
        tracing::error!(error = %err, "failed to start bgp speaker, neighbors may not be configured");
    }

    if let Some(bfd) = &config.bfd {
        herald_bgp::bfd::announce(bfd, &config.neighbors);
    }

    let cancel = CancellationToken::new();
    let mut handles: Vec<JoinHandle<()>> = Vec::new();

    handles.push(spawn_signal_task(cancel.clone()));

    for prefix in &config.prefixes {
        let controller = PrefixController::new(
            prefix.clone(),
            speaker.clone(),
            metrics.clone(),
            config.speaker.graceful_restart_enabled,
        );
        let task_cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            controller.run(task_cancel).await;
        }));
    }

    if config.metrics.enabled {
        handles.push(spawn_metrics_server(&config, metrics.clone(), cancel.clone()).await?);
    }

    handles.push(spawn_bgp_stats_collector(speaker.clone(), metrics.clone(), config.metrics.interval, cancel.clone()));

    for handle in handles {
        let _ = handle.await;
    }

    speaker.stop();
    tracing::info!("herald shut down");
    Ok(())
}

fn spawn_signal_task(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("received shutdown signal");
        cancel.cancel();
    })
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGTERM handler, watching SIGINT only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn spawn_metrics_server(config: &Config, metrics: Arc<Metrics>, cancel: CancellationToken) -> CliResult<JoinHandle<()>> {
    let address = format!("{}:{}", config.metrics.listen_address, config.metrics.listen_port);
    let socket_addr = SocketAddr::from_str(&address).map_err(|e| CliError::MetricsBind {
        address: address.clone(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;

    let listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .map_err(|source| CliError::MetricsBind { address, source })?;

    tracing::info!(address = %socket_addr, "metrics server listening");
    let router = herald_metrics::router::MetricsRouter::new(metrics);

    Ok(tokio::spawn(async move {
        let shutdown = async move { cancel.cancelled().await };
        if let Err(err) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
            tracing::error!(error = %err, "metrics server exited with an error");
        }
    }))
}

/// §4.10: periodically snapshot the speaker's peer and route bookkeeping
/// into the shared metrics registry. Real per-peer session state and
/// message counters require a full BGP FSM, which herald's embedded
/// speaker does not implement (§8 Non-goals); `bgp_peer_up`/`bgp_peer_state`
/// reflect whether herald has asked to establish each session, not a
/// negotiated session state.
fn spawn_bgp_stats_collector(
    speaker: Arc<Speaker>,
    metrics: Arc<Metrics>,
    interval: std::time::Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        herald_scheduler::run_periodic(std::time::Duration::ZERO, interval, cancel, || {
            let speaker = &speaker;
            let metrics = &metrics;
            async move {
                for peer in speaker.peer_stats() {
                    let labels = PeerLabels {
                        peer_address: peer.address.clone(),
                        peer_asn: peer.asn.to_string(),
                    };
                    metrics.bgp_peer_up.get_or_create(&labels).set(peer.up as i64);
                    metrics.bgp_peer_state.get_or_create(&labels).set(peer.up as i64);
                }

                let routes = speaker.route_stats();
                metrics
                    .bgp_route_count
                    .get_or_create(&RouteTableLabels { route_table: "global".to_string() })
                    .set(routes.announced as i64);
            }
        })
        .await;
    })
}
