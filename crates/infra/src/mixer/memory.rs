//! In-process mixer
//!
//! Holds ports in memory and implements [`MixerTarget`] without a daemon.
//! Every collaborator call is counted, and changes are published on a
//! broadcast channel so `wait_for_change` behaves like the daemon's change
//! notification.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use jmctl_core::domain::port::{Direction, Port, PortRef, Property};
use jmctl_core::domain::target::{MixerError, MixerTarget, Result};

#[derive(Debug, Default)]
struct State {
    ports: Vec<Port>,
    monitor: Option<PortRef>,
}

impl State {
    fn find(&self, port: &PortRef) -> Result<&Port> {
        self.ports
            .iter()
            .find(|p| p.direction == port.direction && p.name == port.name)
            .ok_or_else(|| MixerError::not_found(port))
    }

    fn find_mut(&mut self, port: &PortRef) -> Result<&mut Port> {
        self.ports
            .iter_mut()
            .find(|p| p.direction == port.direction && p.name == port.name)
            .ok_or_else(|| MixerError::not_found(port))
    }
}

/// A mixer living entirely in this process
pub struct MemoryMixer {
    state: Mutex<State>,
    changes: broadcast::Sender<(PortRef, Property)>,
    calls: AtomicUsize,
}

impl MemoryMixer {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            state: Mutex::new(State::default()),
            changes,
            calls: AtomicUsize::new(0),
        }
    }

    /// Add a port (builder style)
    pub fn with_port(self, port: Port) -> Self {
        self.lock().ports.push(port);
        self
    }

    /// Designate the monitor port (builder style)
    pub fn with_monitor(self, port: PortRef) -> Self {
        self.lock().monitor = Some(port);
        self
    }

    /// Number of [`MixerTarget`] calls served so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Current snapshot of a port, without counting as a call
    pub fn snapshot(&self, port: &PortRef) -> Option<Port> {
        self.lock().find(port).ok().cloned()
    }

    /// Change a level from outside, as another client would, and notify waiters
    pub fn nudge(&self, port: &PortRef, property: Property, value: f32) -> Result<()> {
        {
            let mut state = self.lock();
            let target = state.find_mut(port)?;
            match property {
                Property::Volume => target.volume = value,
                Property::Balance => target.balance = value,
            }
        }
        self.publish(port, property);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Poisoned state is still plain data
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn count(&self, op: &'static str) {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(op, calls = n, "MemoryMixer call");
    }

    fn publish(&self, port: &PortRef, property: Property) {
        // No receivers simply means nobody is waiting
        let _ = self.changes.send((port.clone(), property));
    }

    fn set_level(&self, port: &PortRef, property: Property, value: f32) -> Result<()> {
        let changed = {
            let mut state = self.lock();
            let target = state.find_mut(port)?;
            let slot = match property {
                Property::Volume => &mut target.volume,
                Property::Balance => &mut target.balance,
            };
            let changed = *slot != value;
            *slot = value;
            changed
        };
        if changed {
            self.publish(port, property);
        }
        Ok(())
    }

    fn link(&self, port: &PortRef, other: &str, connect: Option<bool>) -> Result<()> {
        let mut state = self.lock();
        let peer_direction = match port.direction {
            Direction::Input => Direction::Output,
            Direction::Output => Direction::Input,
        };
        let peer = PortRef::new(peer_direction, other);
        state.find(&peer)?;

        let connected = state.find(port)?.is_connected_to(other);
        let connect = connect.unwrap_or(!connected);
        if connect == connected {
            return Ok(());
        }

        for (side, name) in [(port, other), (&peer, port.name.as_str())] {
            let entry = state.find_mut(side)?;
            if connect {
                entry.connections.push(name.to_string());
            } else {
                entry.connections.retain(|c| c != name);
            }
        }
        debug!(%port, other, connect, "MemoryMixer link changed");
        Ok(())
    }
}

impl Default for MemoryMixer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MixerTarget for MemoryMixer {
    async fn ports(&self, direction: Direction) -> Result<Vec<Port>> {
        self.count("ports");
        Ok(self
            .lock()
            .ports
            .iter()
            .filter(|p| p.direction == direction)
            .cloned()
            .collect())
    }

    async fn port(&self, port: &PortRef) -> Result<Port> {
        self.count("port");
        self.lock().find(port).cloned()
    }

    async fn monitor(&self) -> Result<Port> {
        self.count("monitor");
        let state = self.lock();
        let monitor = state.monitor.as_ref().ok_or(MixerError::NoMonitor)?;
        state.find(monitor).cloned()
    }

    async fn set_volume(&self, port: &PortRef, volume: f32) -> Result<()> {
        self.count("set_volume");
        self.set_level(port, Property::Volume, volume)
    }

    async fn set_balance(&self, port: &PortRef, balance: f32) -> Result<()> {
        self.count("set_balance");
        self.set_level(port, Property::Balance, balance)
    }

    async fn connect(&self, port: &PortRef, other: &str) -> Result<()> {
        self.count("connect");
        self.link(port, other, Some(true))
    }

    async fn disconnect(&self, port: &PortRef, other: &str) -> Result<()> {
        self.count("disconnect");
        self.link(port, other, Some(false))
    }

    async fn toggle_connection(&self, port: &PortRef, other: &str) -> Result<()> {
        self.count("toggle_connection");
        self.link(port, other, None)
    }

    async fn set_monitor(&self, port: &PortRef) -> Result<()> {
        self.count("set_monitor");
        let mut state = self.lock();
        state.find(port)?;
        state.monitor = Some(port.clone());
        Ok(())
    }

    async fn wait_for_change(&self, port: &PortRef, property: Property) -> Result<Port> {
        self.count("wait_for_change");
        let mut changes = self.changes.subscribe();
        self.lock().find(port)?;

        loop {
            match changes.recv().await {
                Ok((changed, prop)) if changed == *port && prop == property => {
                    return self.lock().find(port).cloned();
                }
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(MixerError::Daemon("change feed closed".to_string()));
                }
            }
        }
    }
}
