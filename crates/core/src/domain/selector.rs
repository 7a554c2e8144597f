//! Port selection
//!
//! `get` and `set` address exactly one port: an input by name, an output by
//! name, or whatever the daemon currently monitors. The raw flags collected
//! by the grammar are folded into a [`PortSelector`] here, and every
//! contradictory combination is turned away before the daemon is contacted.

use tracing::debug;

use crate::domain::grammar::UsageError;
use crate::domain::port::{Direction, Port, PortRef};
use crate::domain::target::{MixerTarget, Result};

/// Exactly one way of addressing a port
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    Input(String),
    Output(String),
    Monitor,
}

impl PortSelector {
    /// Identity of the addressed port, unless it is the monitor
    pub fn port_ref(&self) -> Option<PortRef> {
        match self {
            PortSelector::Input(name) => Some(PortRef::input(name.clone())),
            PortSelector::Output(name) => Some(PortRef::output(name.clone())),
            PortSelector::Monitor => None,
        }
    }

    /// Fetch the addressed port. Called once per invocation.
    pub async fn resolve<T: MixerTarget + ?Sized>(&self, target: &T) -> Result<Port> {
        let port = match self.port_ref() {
            Some(port_ref) => target.port(&port_ref).await?,
            None => target.monitor().await?,
        };
        debug!(selector = ?self, port = %port.name, "Resolved port");
        Ok(port)
    }
}

/// Selector flags exactly as they appeared on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorFlags {
    pub input: bool,
    pub output: bool,
    pub monitor: bool,
    pub name: Option<String>,
}

impl SelectorFlags {
    /// Whether `-i`/`-o` was given and still waits for its PORT
    pub fn wants_name(&self) -> bool {
        (self.input || self.output) && self.name.is_none()
    }

    /// Fold the flags into a selector, rejecting every other combination
    pub fn into_selector(self) -> std::result::Result<PortSelector, UsageError> {
        let chosen = [self.input, self.output, self.monitor]
            .iter()
            .filter(|set| **set)
            .count();

        if chosen == 0 {
            return Err(UsageError::new(
                "a port is required: use -i PORT, -o PORT or -m",
            ));
        }
        if chosen > 1 {
            return Err(UsageError::new(
                "-i, -o and -m are mutually exclusive",
            ));
        }

        if self.monitor {
            return match self.name {
                Some(name) => Err(UsageError::new(format!(
                    "-m takes no PORT, got '{name}'"
                ))),
                None => Ok(PortSelector::Monitor),
            };
        }

        let direction = if self.input {
            Direction::Input
        } else {
            Direction::Output
        };
        let name = match self.name {
            Some(name) if !name.is_empty() => name,
            Some(_) => return Err(UsageError::new("PORT must not be empty")),
            None => {
                let flag = if direction.is_input() { "-i" } else { "-o" };
                return Err(UsageError::new(format!("{flag} requires a PORT name")));
            }
        };

        Ok(match direction {
            Direction::Input => PortSelector::Input(name),
            Direction::Output => PortSelector::Output(name),
        })
    }
}
