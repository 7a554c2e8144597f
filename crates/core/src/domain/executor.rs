//! Request executor
//!
//! Interprets a parsed [`Request`] against a [`MixerTarget`] and writes the
//! result lines. The port is resolved once per request and that snapshot is
//! reused by everything that follows; only mutations fetch a fresh one.

use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::connection;
use crate::domain::port::{Direction, Port};
use crate::domain::property::PropertyLeaf;
use crate::domain::request::{GetRequest, Mutation, Query, Request, SetRequest};
use crate::domain::target::{MixerError, MixerTarget};
use crate::domain::wait;

/// Errors that abort a request
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Mixer(#[from] MixerError),

    #[error("Failed to write output")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExecError>;

/// Run `request` and print its result lines to `out`
pub async fn execute<T, W>(target: &T, request: &Request, out: &mut W) -> Result<()>
where
    T: MixerTarget + ?Sized,
    W: Write,
{
    match request {
        Request::ListPorts(direction) => list_ports(target, *direction, out).await,
        Request::Get(get) => run_get(target, get, out).await,
        Request::Set(set) => run_set(target, set, out).await,
    }
}

async fn list_ports<T, W>(target: &T, direction: Direction, out: &mut W) -> Result<()>
where
    T: MixerTarget + ?Sized,
    W: Write,
{
    let ports = target.ports(direction).await?;
    debug!(%direction, count = ports.len(), "Listed ports");
    for port in &ports {
        writeln!(out, "{}", port.name)?;
    }
    Ok(())
}

async fn run_get<T, W>(target: &T, request: &GetRequest, out: &mut W) -> Result<()>
where
    T: MixerTarget + ?Sized,
    W: Write,
{
    let port = request.selector.resolve(target).await?;
    let operation = request.query.operation();

    if let Some(leaf) = PropertyLeaf::new(operation, request.wait) {
        let value = leaf.run(target, port).await?;
        writeln!(out, "{value}")?;
        return Ok(());
    }

    let port = wait::gate(request.wait).wait(target, port).await?;
    match &request.query {
        Query::Connections => print_connections(&port, out)?,
        Query::Connected { other } => {
            writeln!(out, "{}", connection::is_connected(&port, other))?;
        }
        Query::Monitored => {
            writeln!(out, "{}", connection::is_monitored(target, &port).await?)?;
        }
        Query::Name | Query::IsInput | Query::IsMono | Query::Volume | Query::Balance => {
            unreachable!("scalar properties are handled by PropertyLeaf")
        }
    }
    Ok(())
}

async fn run_set<T, W>(target: &T, request: &SetRequest, out: &mut W) -> Result<()>
where
    T: MixerTarget + ?Sized,
    W: Write,
{
    let port = request.selector.resolve(target).await?;
    let port_ref = port.port_ref();

    match &request.mutation {
        Mutation::Volume(volume) => {
            debug!(port = %port_ref, requested = volume, "Setting volume");
            target.set_volume(&port_ref, *volume).await?;
            let port = target.port(&port_ref).await?;
            info!(port = %port_ref, volume = port.volume, "Volume set");
            writeln!(out, "{}", port.volume)?;
        }
        Mutation::Balance(balance) => {
            debug!(port = %port_ref, requested = balance, "Setting balance");
            target.set_balance(&port_ref, *balance).await?;
            let port = target.port(&port_ref).await?;
            info!(port = %port_ref, balance = port.balance, "Balance set");
            writeln!(out, "{}", port.balance)?;
        }
        Mutation::Connection { other, intent } => {
            let port = connection::apply(target, &port_ref, other, *intent).await?;
            print_connections(&port, out)?;
        }
        Mutation::Monitor => {
            let monitor = connection::mark_monitored(target, &port_ref).await?;
            writeln!(out, "{}", monitor.name)?;
        }
    }
    Ok(())
}

fn print_connections<W: Write>(port: &Port, out: &mut W) -> std::io::Result<()> {
    for name in &port.connections {
        writeln!(out, "{name}")?;
    }
    Ok(())
}
