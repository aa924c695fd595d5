//! Thin embedded-speaker facade (§4.4): owns the announced-path table and
//! the configured peer list, and exposes the four lifecycle operations the
//! controller drives (`start`/`add_path`/`delete_path`/`stop`).
//!
//! A full BGP FSM, wire encoding, and session multiplexing are explicitly
//! out of scope (§8 Non-goals) and are delegated to an embedded BGP
//! library; this facade owns only the policy surface herald needs, built
//! on `routecore`'s wire types. See `DESIGN.md` for why `routecore` stands
//! in for the session layer in this workspace.

use std::collections::HashMap;
use std::net::IpAddr;

use herald_core::config::{Config, Neighbor};
use parking_lot::RwLock;

use crate::error::{BgpError, Result};
use crate::path::{build_path, AnycastPath};

/// A configured BGP peer and herald's last-observed opinion of its session
/// state. Real establishment/keepalive tracking lives in the embedded BGP
/// library this facade delegates to; herald only ever reports "configured"
/// here absent that integration, which `PeerStats` makes explicit.
#[derive(Clone, Debug)]
pub struct PeerHandle {
    pub address: String,
    pub asn: u32,
    pub ebgp_multihop_enabled: bool,
}

/// Snapshot used by the BGP-stats collector (§4.10) to populate
/// `herald_bgp_peer_*` metrics without reaching back into speaker internals.
#[derive(Clone, Debug)]
pub struct PeerStats {
    pub address: String,
    pub asn: u32,
    /// `1` once herald has asked the embedded library to establish the
    /// session, `0` before `start()` or after `stop()`. Not a substitute
    /// for real FSM state.
    pub up: u8,
}

#[derive(Clone, Debug, Default)]
pub struct RouteStats {
    pub announced: usize,
}

struct State {
    running: bool,
    peers: Vec<PeerHandle>,
    paths: HashMap<String, AnycastPath>,
}

/// The embedded speaker. Cheap to clone: internal state is behind an
/// `Arc`-free `RwLock` shared by reference, mirroring how the controller
/// holds one speaker per process, not per prefix.
pub struct Speaker {
    asn: u32,
    router_id: String,
    graceful_restart_enabled: bool,
    graceful_restart_restart_time: u32,
    state: RwLock<State>,
}

impl Speaker {
    pub fn new(config: &Config) -> Self {
        Self {
            asn: config.speaker.asn,
            router_id: config.speaker.router_id.clone(),
            graceful_restart_enabled: config.speaker.graceful_restart_enabled,
            graceful_restart_restart_time: config.speaker.graceful_restart_restart_time,
            state: RwLock::new(State {
                running: false,
                peers: Vec::new(),
                paths: HashMap::new(),
            }),
        }
    }

    /// Start the local BGP instance and add every configured neighbor.
    /// Mirrors the source's `startBgp` + `addNeighbors` sequence.
    pub fn start(&self, neighbors: &[Neighbor]) -> Result<()> {
        tracing::info!(
            asn = self.asn,
            router_id = %self.router_id,
            graceful_restart = self.graceful_restart_enabled,
            graceful_restart_restart_time = self.graceful_restart_restart_time,
            "starting bgp speaker"
        );

        let mut state = self.state.write();
        state.running = true;
        for neighbor in neighbors {
            if state.peers.iter().any(|p| p.address == neighbor.address) {
                return Err(BgpError::DuplicatePeer {
                    address: neighbor.address.clone(),
                });
            }
            tracing::info!(
                neighbor_address = %neighbor.address,
                peer_asn = neighbor.asn,
                ebgp_multihop = neighbor.ebgp_multihop_enabled,
                "adding bgp neighbor"
            );
            state.peers.push(PeerHandle {
                address: neighbor.address.clone(),
                asn: neighbor.asn,
                ebgp_multihop_enabled: neighbor.ebgp_multihop_enabled,
            });
        }
        Ok(())
    }

    /// Announce `prefix`: build its path fresh and insert it into the
    /// announced-path table, overwriting any prior entry for the same
    /// prefix (idempotent by design, matching §4.4's repeated-call rule).
    pub fn add_path(&self, prefix: &herald_core::config::Prefix) -> Result<()> {
        if !self.state.read().running {
            return Err(BgpError::NotRunning);
        }
        let path = build_path(prefix)?;
        tracing::info!(anycast_ip = %prefix.ip_address, "add path");
        self.state.write().paths.insert(prefix.ip_address.clone(), path);
        Ok(())
    }

    /// Withdraw `prefix`. A no-op (not an error) if the prefix was never
    /// announced — mirrors the controller only ever calling this from
    /// ticks that don't track prior announcement state precisely.
    pub fn delete_path(&self, prefix: &herald_core::config::Prefix) -> Result<()> {
        if !self.state.read().running {
            return Err(BgpError::NotRunning);
        }
        tracing::warn!(anycast_ip = %prefix.ip_address, "delete path");
        self.state.write().paths.remove(&prefix.ip_address);
        Ok(())
    }

    pub fn is_announced(&self, prefix: &herald_core::config::Prefix) -> bool {
        self.state.read().paths.contains_key(&prefix.ip_address)
    }

    /// Stop serving. When graceful restart is disabled the caller is
    /// expected to have withdrawn every announced path first (§9); this
    /// call itself only tears down local bookkeeping.
    pub fn stop(&self) {
        tracing::info!("stopping bgp speaker");
        let mut state = self.state.write();
        state.running = false;
        state.paths.clear();
    }

    pub fn peer_stats(&self) -> Vec<PeerStats> {
        let state = self.state.read();
        state
            .peers
            .iter()
            .map(|peer| PeerStats {
                address: peer.address.clone(),
                asn: peer.asn,
                up: if state.running { 1 } else { 0 },
            })
            .collect()
    }

    pub fn route_stats(&self) -> RouteStats {
        RouteStats {
            announced: self.state.read().paths.len(),
        }
    }

    pub fn router_id(&self) -> &str {
        &self.router_id
    }
}

/// Resolve a neighbor's address for diagnostics; kept separate from
/// `PeerHandle` so callers that only have config (not a running speaker)
/// can still format a consistent label.
pub fn neighbor_label(neighbor: &Neighbor) -> String {
    format!("{}(AS{})", neighbor.address, neighbor.asn)
}

pub fn parse_router_id(value: &str) -> std::result::Result<IpAddr, std::net::AddrParseError> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::config::{ApiConfig, SpeakerConfig};

    fn test_config() -> Config {
        Config {
            speaker: SpeakerConfig {
                asn: 65000,
                router_id: "192.0.2.1".to_string(),
                graceful_restart_enabled: false,
                graceful_restart_restart_time: 0,
            },
            bfd: None,
            api: ApiConfig {
                listen_address: "127.0.0.1".to_string(),
                listen_port: 50051,
            },
            neighbors: vec![],
            prefixes: vec![],
            logging: Default::default(),
            metrics: Default::default(),
        }
    }

    #[test]
    fn add_path_requires_running() {
        let speaker = Speaker::new(&test_config());
        let prefix = herald_core::config::Prefix {
            ip_address: "10.0.0.1/32".to_string(),
            next_hop: "192.0.2.1".to_string(),
            asn: 65000,
            communities: vec![],
            as_path_prepend: vec![],
            multi_exit_discriminator: 0,
            withdraw_on_down: false,
            maintenance: String::new(),
            service: None,
            startup_probe: None,
            liveness_probe: None,
            readiness_probe: None,
        };
        assert!(matches!(speaker.add_path(&prefix), Err(BgpError::NotRunning)));
        speaker.start(&[]).unwrap();
        speaker.add_path(&prefix).unwrap();
        assert!(speaker.is_announced(&prefix));
        speaker.delete_path(&prefix).unwrap();
        assert!(!speaker.is_announced(&prefix));
    }

    #[test]
    fn start_rejects_duplicate_peers() {
        let speaker = Speaker::new(&test_config());
        let neighbors = vec![
            Neighbor { address: "192.0.2.254".into(), asn: 65001, ebgp_multihop_enabled: false },
            Neighbor { address: "192.0.2.254".into(), asn: 65002, ebgp_multihop_enabled: false },
        ];
        assert!(speaker.start(&neighbors).is_err());
    }
}
