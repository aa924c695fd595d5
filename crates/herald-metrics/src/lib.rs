//! Prometheus metrics registry (§4.9) and the HTTP surface that exposes it.

pub mod router;

use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PrefixLabels {
    pub prefix: String,
    pub name: String,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum ProbeType {
    Startup,
    Liveness,
    Readiness,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ProbeLabels {
    pub prefix: String,
    pub probe_type: ProbeType,
    pub name: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PeerLabels {
    pub peer_address: String,
    pub peer_asn: String,
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum MessageType {
    Update,
    Notification,
    Open,
    Keepalive,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PeerMessageLabels {
    pub peer_address: String,
    pub peer_asn: String,
    pub message_type: MessageType,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RouteTableLabels {
    pub route_table: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ServiceLabels {
    pub name: String,
}

/// Every metric family herald exposes, plus the registry they're
/// registered against. Held by the process as a single `Arc<Metrics>` and
/// shared with every controller task and the BGP-stats collector.
pub struct Metrics {
    pub registry: Registry,
    pub prefix_up: Family<PrefixLabels, Gauge>,
    pub probe_success_total: Family<ProbeLabels, Counter>,
    pub probe_failure_total: Family<ProbeLabels, Counter>,
    pub probe_duration_seconds: Family<ProbeLabels, Histogram>,
    pub bgp_peer_up: Family<PeerLabels, Gauge>,
    pub bgp_peer_state: Family<PeerLabels, Gauge>,
    pub bgp_peer_messages_sent_total: Family<PeerMessageLabels, Counter>,
    pub bgp_peer_messages_received_total: Family<PeerMessageLabels, Counter>,
    pub bgp_route_count: Family<RouteTableLabels, Gauge>,
    pub service_restarts_total: Family<ServiceLabels, Counter>,
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("herald");

        let prefix_up = Family::<PrefixLabels, Gauge>::default();
        registry.register("prefix_up", "Whether a prefix is currently announced", prefix_up.clone());

        let probe_success_total = Family::<ProbeLabels, Counter>::default();
        registry.register(
            "probe_success_total",
            "Total successful probe executions",
            probe_success_total.clone(),
        );

        let probe_failure_total = Family::<ProbeLabels, Counter>::default();
        registry.register(
            "probe_failure_total",
            "Total failed probe executions",
            probe_failure_total.clone(),
        );

        let probe_duration_seconds =
            Family::<ProbeLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.005, 2.0, 12))
            });
        registry.register(
            "probe_duration_seconds",
            "Probe execution duration in seconds",
            probe_duration_seconds.clone(),
        );

        let bgp_peer_up = Family::<PeerLabels, Gauge>::default();
        registry.register("bgp_peer_up", "Whether a BGP peer session is established", bgp_peer_up.clone());

        let bgp_peer_state = Family::<PeerLabels, Gauge>::default();
        registry.register("bgp_peer_state", "Raw BGP peer session state", bgp_peer_state.clone());

        let bgp_peer_messages_sent_total = Family::<PeerMessageLabels, Counter>::default();
        registry.register(
            "bgp_peer_messages_sent_total",
            "Total BGP messages sent to a peer",
            bgp_peer_messages_sent_total.clone(),
        );

        let bgp_peer_messages_received_total = Family::<PeerMessageLabels, Counter>::default();
        registry.register(
            "bgp_peer_messages_received_total",
            "Total BGP messages received from a peer",
            bgp_peer_messages_received_total.clone(),
        );

        let bgp_route_count = Family::<RouteTableLabels, Gauge>::default();
        registry.register("bgp_route_count", "Number of routes in a route table", bgp_route_count.clone());

        let service_restarts_total = Family::<ServiceLabels, Counter>::default();
        registry.register(
            "service_restarts_total",
            "Total restarts issued for a service",
            service_restarts_total.clone(),
        );

        Self {
            registry,
            prefix_up,
            probe_success_total,
            probe_failure_total,
            probe_duration_seconds,
            bgp_peer_up,
            bgp_peer_state,
            bgp_peer_messages_sent_total,
            bgp_peer_messages_received_total,
            bgp_route_count,
            service_restarts_total,
        }
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)
            .expect("encoding to a String never fails");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
