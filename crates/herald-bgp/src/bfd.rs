//! BFD stub (§8 Non-goals: no BFD protocol implementation).
//!
//! The source wires a `BFDConfig` through to gobgp's `EnableBfd` call but
//! passes an empty peer list, so configured BFD settings have no observable
//! effect there. Rather than reproduce that bug, this stub makes the gap
//! explicit: when BFD is enabled in config, it logs which neighbors *would*
//! be monitored and at what interval, and nothing else. No session
//! liveness is tracked and no metric is emitted on its behalf.

use herald_core::config::{BfdConfig, Neighbor};

pub fn announce(config: &BfdConfig, neighbors: &[Neighbor]) {
    if !config.enabled {
        return;
    }
    if neighbors.is_empty() {
        tracing::warn!("bfd is enabled but no neighbors are configured, nothing to monitor");
        return;
    }
    for neighbor in neighbors {
        tracing::warn!(
            neighbor_address = %neighbor.address,
            min_rx = ?config.minimum_reception_interval,
            min_tx = ?config.minimum_transmission_interval,
            detection_multiplier = config.detection_multiplier,
            "bfd is enabled in configuration but not implemented; this neighbor's session liveness is not independently monitored"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn disabled_is_silent() {
        let config = BfdConfig {
            enabled: false,
            listen_address: "0.0.0.0".into(),
            listen_port: 3784,
            minimum_reception_interval: Duration::from_millis(300),
            minimum_transmission_interval: Duration::from_millis(300),
            detection_multiplier: 3,
            passive: false,
        };
        announce(&config, &[]);
    }
}
