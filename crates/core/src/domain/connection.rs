//! Connection leaves
//!
//! Read side: list a port's connections, test membership, test whether the
//! port is the monitor. Write side: toggle/connect/disconnect against
//! another port, and designate the monitor.
//!
//! Connection lists are printed in whatever order the daemon reports them;
//! the order is not stable across daemon restarts.

use tracing::info;

use crate::domain::port::{Port, PortRef};
use crate::domain::request::ConnectionIntent;
use crate::domain::target::{MixerError, MixerTarget, Result};

/// Whether `other` appears in the port's connection list (exact match)
pub fn is_connected(port: &Port, other: &str) -> bool {
    port.is_connected_to(other)
}

/// Whether `port` is the daemon's current monitor port.
///
/// A daemon without a monitor monitors nothing, so that case is `false`.
pub async fn is_monitored<T: MixerTarget + ?Sized>(target: &T, port: &Port) -> Result<bool> {
    match target.monitor().await {
        Ok(monitor) => Ok(monitor.is_same_port(port)),
        Err(MixerError::NoMonitor) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Apply a connection change and return the refreshed port
pub async fn apply<T: MixerTarget + ?Sized>(
    target: &T,
    port: &PortRef,
    other: &str,
    intent: ConnectionIntent,
) -> Result<Port> {
    match intent {
        ConnectionIntent::Toggle => target.toggle_connection(port, other).await?,
        ConnectionIntent::Connect => target.connect(port, other).await?,
        ConnectionIntent::Disconnect => target.disconnect(port, other).await?,
    }
    info!(%port, other, ?intent, "Connection changed");

    target.port(port).await
}

/// Designate `port` as the monitor and return the daemon's monitor port
pub async fn mark_monitored<T: MixerTarget + ?Sized>(target: &T, port: &PortRef) -> Result<Port> {
    target.set_monitor(port).await?;
    info!(%port, "Monitor port changed");

    target.monitor().await
}
