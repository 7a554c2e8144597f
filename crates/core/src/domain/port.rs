//! Port model shared by every mixer collaborator
//!
//! A port is a named audio channel exposed by the mixer daemon, qualified as
//! an input or an output. The types here are plain snapshots: mutations go
//! through [`MixerTarget`](crate::domain::target::MixerTarget) and a fresh
//! snapshot is fetched afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the mixer a port lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn is_input(&self) -> bool {
        matches!(self, Direction::Input)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a port on the daemon: its direction and its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub direction: Direction,
    pub name: String,
}

impl PortRef {
    pub fn new(direction: Direction, name: impl Into<String>) -> Self {
        Self {
            direction,
            name: name.into(),
        }
    }

    pub fn input(name: impl Into<String>) -> Self {
        Self::new(Direction::Input, name)
    }

    pub fn output(name: impl Into<String>) -> Self {
        Self::new(Direction::Output, name)
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.name)
    }
}

/// Observable property a caller can wait on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Volume,
    Balance,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Volume => f.write_str("volume"),
            Property::Balance => f.write_str("balance"),
        }
    }
}

/// Snapshot of a port as reported by the daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub mono: bool,
    pub volume: f32,
    pub balance: f32,
    /// Names of the ports on the other side this port is connected to,
    /// in the order the daemon reports them.
    #[serde(default)]
    pub connections: Vec<String>,
}

impl Port {
    pub fn new(direction: Direction, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction,
            mono: false,
            volume: 1.0,
            balance: 0.0,
            connections: Vec::new(),
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction.is_input()
    }

    /// Identity of this port
    pub fn port_ref(&self) -> PortRef {
        PortRef::new(self.direction, self.name.clone())
    }

    /// Exact-match membership test on the connection list
    pub fn is_connected_to(&self, other: &str) -> bool {
        self.connections.iter().any(|c| c == other)
    }

    /// Same name and same direction
    pub fn is_same_port(&self, other: &Port) -> bool {
        self.name == other.name && self.direction == other.direction
    }

    pub fn property(&self, property: Property) -> f32 {
        match property {
            Property::Volume => self.volume,
            Property::Balance => self.balance,
        }
    }
}
