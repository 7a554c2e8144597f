//! Property leaves of `get`
//!
//! `name`, `is-input`, `is-mono`, `volume` and `balance` all read one value
//! off the resolved port and print it on a single line. Each leaf passes the
//! wait gate first and reads from the snapshot the gate hands back.

use std::fmt;

use crate::domain::alias::CanonicalOperation;
use crate::domain::port::Port;
use crate::domain::target::{MixerTarget, Result};
use crate::domain::wait::{self, WaitMode, Waiter};

/// Printable value of a port property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
    Level(f32),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => f.write_str(text),
            PropertyValue::Flag(flag) => write!(f, "{flag}"),
            // Shortest representation that round-trips: 0.75, 1, -0.5
            PropertyValue::Level(level) => write!(f, "{level}"),
        }
    }
}

/// Accessor for a scalar property; `None` for operations that are not properties
fn accessor(operation: CanonicalOperation) -> Option<fn(&Port) -> PropertyValue> {
    let accessor: fn(&Port) -> PropertyValue = match operation {
        CanonicalOperation::Name => |port| PropertyValue::Text(port.name.clone()),
        CanonicalOperation::IsInput => |port| PropertyValue::Flag(port.is_input()),
        CanonicalOperation::IsMono => |port| PropertyValue::Flag(port.mono),
        CanonicalOperation::Volume => |port| PropertyValue::Level(port.volume),
        CanonicalOperation::Balance => |port| PropertyValue::Level(port.balance),
        CanonicalOperation::Connections
        | CanonicalOperation::Connected
        | CanonicalOperation::Monitored => return None,
    };
    Some(accessor)
}

/// One property leaf: a wait gate followed by a read
#[derive(Debug, Clone, Copy)]
pub struct PropertyLeaf {
    waiter: Waiter,
    get: fn(&Port) -> PropertyValue,
}

impl PropertyLeaf {
    /// Leaf for `operation`, or `None` if it is not a scalar property
    pub fn new(operation: CanonicalOperation, wait: WaitMode) -> Option<Self> {
        Some(Self {
            waiter: wait::gate(wait),
            get: accessor(operation)?,
        })
    }

    /// Pass the gate, then read the value from the post-gate snapshot
    pub async fn run<T: MixerTarget + ?Sized>(&self, target: &T, port: Port) -> Result<PropertyValue> {
        let port = self.waiter.wait(target, port).await?;
        Ok((self.get)(&port))
    }
}
