//! Wait gate run before every read
//!
//! `get` can be told to block until the port's volume (`-V`) or balance
//! (`-B`) changes before printing. The gate runs for every read-style leaf,
//! also when no wait was requested, so each read has the same shape:
//! resolve, pass the gate, render.
//!
//! A wait cannot be cancelled or timed out from here. If the daemon never
//! reports a change the process blocks until it is terminated from outside.

use tracing::debug;

use crate::domain::grammar::UsageError;
use crate::domain::port::{Port, Property};
use crate::domain::target::{MixerTarget, Result};

/// What to wait for before reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitMode {
    #[default]
    None,
    OnVolumeChange,
    OnBalanceChange,
}

impl WaitMode {
    /// Property whose change releases the gate
    pub fn property(&self) -> Option<Property> {
        match self {
            WaitMode::None => None,
            WaitMode::OnVolumeChange => Some(Property::Volume),
            WaitMode::OnBalanceChange => Some(Property::Balance),
        }
    }

    /// Fold `-V` / `-B` into a mode; both at once is a usage error
    pub fn from_flags(volume: bool, balance: bool) -> std::result::Result<Self, UsageError> {
        match (volume, balance) {
            (true, true) => Err(UsageError::new("-V and -B are mutually exclusive")),
            (true, false) => Ok(WaitMode::OnVolumeChange),
            (false, true) => Ok(WaitMode::OnBalanceChange),
            (false, false) => Ok(WaitMode::None),
        }
    }
}

/// Blocking step built from a [`WaitMode`]
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    mode: WaitMode,
}

/// Build the waiter for `mode`
pub fn gate(mode: WaitMode) -> Waiter {
    Waiter { mode }
}

impl Waiter {
    /// Pass the gate and return the snapshot to read from.
    ///
    /// With [`WaitMode::None`] this returns `port` untouched without talking
    /// to the daemon. Otherwise it blocks until the daemon reports the change
    /// and returns the post-change snapshot.
    pub async fn wait<T: MixerTarget + ?Sized>(&self, target: &T, port: Port) -> Result<Port> {
        let Some(property) = self.mode.property() else {
            return Ok(port);
        };

        debug!(port = %port.name, %property, "Waiting for change");
        let changed = target.wait_for_change(&port.port_ref(), property).await?;
        debug!(
            port = %changed.name,
            %property,
            value = changed.property(property),
            "Change observed"
        );
        Ok(changed)
    }
}
