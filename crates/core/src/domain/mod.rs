//! Domain entities and dispatch rules

pub mod alias;
pub mod config;
pub mod connection;
pub mod executor;
pub mod grammar;
pub mod port;
pub mod property;
pub mod request;
pub mod selector;
pub mod target;
pub mod wait;

// Re-export specific items to avoid ambiguous glob imports
pub use alias::{AliasError, AliasRegistry, AliasRegistryBuilder, AliasSet, CanonicalOperation};
pub use config::{ClientConfig, ConfigError, ConfigManager, DaemonConfig};
pub use executor::{execute, ExecError};
pub use grammar::{Grammar, LevelRange, Limits, UsageError};
pub use port::{Direction, Port, PortRef, Property};
pub use property::{PropertyLeaf, PropertyValue};
pub use request::{ConnectionIntent, GetRequest, Mutation, Query, Request, SetRequest};
pub use selector::{PortSelector, SelectorFlags};
pub use target::{MixerError, MixerTarget};
pub use wait::{WaitMode, Waiter};
