//! Collaborator interface to the mixer daemon
//!
//! This trait is the only way the dispatcher talks to the daemon. The TCP
//! client and the in-process mixer used in tests live in the `infra` crate.

use crate::domain::port::{Direction, Port, PortRef, Property};
use async_trait::async_trait;
use thiserror::Error;

/// Errors reported by a mixer collaborator
#[derive(Debug, Error)]
pub enum MixerError {
    /// Named port does not exist on the daemon
    #[error("No {direction} port named '{name}'")]
    PortNotFound { direction: Direction, name: String },

    /// The daemon has no monitor port designated
    #[error("No monitor port is set")]
    NoMonitor,

    /// Connection to the daemon failed or dropped
    #[error("Daemon connection error")]
    Io(#[from] std::io::Error),

    /// The daemon answered with something we cannot decode
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The daemon rejected the request
    #[error("Daemon error: {0}")]
    Daemon(String),
}

impl MixerError {
    pub fn not_found(port: &PortRef) -> Self {
        MixerError::PortNotFound {
            direction: port.direction,
            name: port.name.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MixerError>;

/// Operations the mixer daemon exposes to a control client
///
/// Every call may perform network I/O. Implementations do no retrying of
/// their own beyond what their transport provides.
#[async_trait]
pub trait MixerTarget: Send + Sync {
    /// All ports on one side of the mixer, in daemon order
    async fn ports(&self, direction: Direction) -> Result<Vec<Port>>;

    /// Look up a single port; unknown names fail with `PortNotFound`
    async fn port(&self, port: &PortRef) -> Result<Port>;

    /// The currently designated monitor port
    async fn monitor(&self) -> Result<Port>;

    async fn set_volume(&self, port: &PortRef, volume: f32) -> Result<()>;

    async fn set_balance(&self, port: &PortRef, balance: f32) -> Result<()>;

    /// Connect to `other`; connecting an existing pair is a no-op
    async fn connect(&self, port: &PortRef, other: &str) -> Result<()>;

    /// Disconnect from `other`; disconnecting a missing pair is a no-op
    async fn disconnect(&self, port: &PortRef, other: &str) -> Result<()>;

    /// Flip the connection state with `other`
    async fn toggle_connection(&self, port: &PortRef, other: &str) -> Result<()>;

    /// Make `port` the monitor port
    async fn set_monitor(&self, port: &PortRef) -> Result<()>;

    /// Block until `property` of `port` changes and return the new snapshot.
    ///
    /// There is no timeout: if the daemon never reports a change this never
    /// returns.
    async fn wait_for_change(&self, port: &PortRef, property: Property) -> Result<Port>;
}
