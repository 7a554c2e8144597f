//! Parsed invocations
//!
//! The grammar turns a command line into one [`Request`] value that holds
//! the whole intent of the invocation: which port, what to wait for and
//! which operation to run. The executor interprets it; nothing is captured
//! in closures along the way.

use crate::domain::alias::CanonicalOperation;
use crate::domain::port::Direction;
use crate::domain::selector::PortSelector;
use crate::domain::wait::WaitMode;

/// Read-only leaf of `get`
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Name,
    IsInput,
    IsMono,
    Volume,
    Balance,
    Connections,
    Connected { other: String },
    Monitored,
}

impl Query {
    pub fn operation(&self) -> CanonicalOperation {
        match self {
            Query::Name => CanonicalOperation::Name,
            Query::IsInput => CanonicalOperation::IsInput,
            Query::IsMono => CanonicalOperation::IsMono,
            Query::Volume => CanonicalOperation::Volume,
            Query::Balance => CanonicalOperation::Balance,
            Query::Connections => CanonicalOperation::Connections,
            Query::Connected { .. } => CanonicalOperation::Connected,
            Query::Monitored => CanonicalOperation::Monitored,
        }
    }
}

/// How `set ... connected OTHER` changes the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionIntent {
    Toggle,
    Connect,
    Disconnect,
}

/// Mutating leaf of `set`
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Volume(f32),
    Balance(f32),
    Connection {
        other: String,
        intent: ConnectionIntent,
    },
    Monitor,
}

impl Mutation {
    pub fn operation(&self) -> CanonicalOperation {
        match self {
            Mutation::Volume(_) => CanonicalOperation::Volume,
            Mutation::Balance(_) => CanonicalOperation::Balance,
            Mutation::Connection { .. } => CanonicalOperation::Connected,
            Mutation::Monitor => CanonicalOperation::Monitored,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetRequest {
    pub selector: PortSelector,
    pub wait: WaitMode,
    pub query: Query,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetRequest {
    pub selector: PortSelector,
    pub mutation: Mutation,
}

/// One complete invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// `get-all`: every port name on one side
    ListPorts(Direction),
    Get(GetRequest),
    Set(SetRequest),
}

impl Request {
    /// Leaf operation, if the request addresses a single port
    pub fn operation(&self) -> Option<CanonicalOperation> {
        match self {
            Request::ListPorts(_) => None,
            Request::Get(get) => Some(get.query.operation()),
            Request::Set(set) => Some(set.mutation.operation()),
        }
    }
}
