//! Adapter to the host init manager (systemd, over D-Bus).
//!
//! Two operations only: query whether a unit is active, and restart a unit.
//! Each opens a fresh system-bus connection, performs exactly one method
//! call, and closes — no connection is retained between calls.

pub mod error;
pub mod systemd;

pub use error::ServiceError;

use serde::Deserialize;

/// A service the controller can query and restart.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// systemd unit name, e.g. `nginx.service`.
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl Service {
    /// True iff the unit's reported `ActiveState` is `"active"`.
    pub async fn is_active(&self) -> Result<bool, ServiceError> {
        systemd::is_active(&self.name).await
    }

    /// Request a unit restart with conflict-resolution mode `"replace"`.
    pub async fn restart(&self) -> Result<(), ServiceError> {
        systemd::restart(&self.name).await
    }
}
