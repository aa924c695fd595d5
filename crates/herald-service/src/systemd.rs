//! systemd D-Bus proxies and the two operations the controller needs.

use zbus::Connection;

use crate::error::ServiceError;

#[zbus::proxy(
    interface = "org.freedesktop.systemd1.Manager",
    default_service = "org.freedesktop.systemd1",
    default_path = "/org/freedesktop/systemd1"
)]
trait SystemdManager {
    fn get_unit(&self, name: &str) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
    fn restart_unit(
        &self,
        name: &str,
        mode: &str,
    ) -> zbus::Result<zbus::zvariant::OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.systemd1.Unit",
    default_service = "org.freedesktop.systemd1"
)]
trait SystemdUnit {
    #[zbus(property)]
    fn active_state(&self) -> zbus::Result<String>;
}

async fn connect() -> Result<Connection, ServiceError> {
    Connection::system()
        .await
        .map_err(|e| ServiceError::Connect(e.to_string()))
}

/// True iff the unit's reported `ActiveState` property is `"active"`; any
/// other state (or an error reaching it) yields `false` to the caller, but
/// errors are surfaced, not swallowed — the controller decides policy.
pub async fn is_active(unit: &str) -> Result<bool, ServiceError> {
    let conn = connect().await?;
    let manager = SystemdManagerProxy::new(&conn)
        .await
        .map_err(|e| ServiceError::Query {
            unit: unit.to_string(),
            source: e.to_string(),
        })?;

    let path = manager
        .get_unit(unit)
        .await
        .map_err(|e| ServiceError::Query {
            unit: unit.to_string(),
            source: e.to_string(),
        })?;

    let unit_proxy = SystemdUnitProxy::builder(&conn)
        .path(path)
        .map_err(|e| ServiceError::Query {
            unit: unit.to_string(),
            source: e.to_string(),
        })?
        .build()
        .await
        .map_err(|e| ServiceError::Query {
            unit: unit.to_string(),
            source: e.to_string(),
        })?;

    let state = unit_proxy
        .active_state()
        .await
        .map_err(|e| ServiceError::Query {
            unit: unit.to_string(),
            source: e.to_string(),
        })?;

    tracing::debug!(unit, state = %state, "queried unit active state");
    Ok(state == "active")
}

/// Request unit restart with conflict-resolution mode `"replace"`.
pub async fn restart(unit: &str) -> Result<(), ServiceError> {
    let conn = connect().await?;
    let manager = SystemdManagerProxy::new(&conn)
        .await
        .map_err(|e| ServiceError::Restart {
            unit: unit.to_string(),
            source: e.to_string(),
        })?;

    manager
        .restart_unit(unit, "replace")
        .await
        .map_err(|e| ServiceError::Restart {
            unit: unit.to_string(),
            source: e.to_string(),
        })?;

    Ok(())
}
