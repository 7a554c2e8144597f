//! jmctl command line
//!
//! The binary in `cli/main.rs` is a thin shell around this library so the
//! whole command path can be driven from tests with an in-process mixer.

pub mod args;
pub mod logging;

pub use args::{command, Cli, Command, GetAllArgs, TokenArgs};
pub use jmctl_core::domain::execute;

use clap::error::ErrorKind;
use std::error::Error as _;
use std::io::Write;
use thiserror::Error;
use tracing::debug;

use jmctl_core::domain::{DaemonConfig, Direction, ExecError, Grammar, Request, UsageError};

/// Exit status for a rejected command line
pub const EXIT_USAGE: u8 = 2;
/// Exit status for any failure after the command line was accepted
pub const EXIT_FAILURE: u8 = 1;

/// Why a run did not succeed
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Config, alias table or daemon connection
    #[error("{0:#}")]
    Startup(anyhow::Error),
}

impl Failure {
    pub fn exit_code(&self) -> u8 {
        match self {
            Failure::Usage(_) => EXIT_USAGE,
            Failure::Exec(_) | Failure::Startup(_) => EXIT_FAILURE,
        }
    }
}

/// Write `error: ...` with the full cause chain and return the exit status
pub fn report<W: Write>(failure: &Failure, err: &mut W) -> u8 {
    let mut line = failure.to_string();
    let mut source = failure.source();
    while let Some(cause) = source {
        line.push_str(": ");
        line.push_str(&cause.to_string());
        source = cause.source();
    }
    let _ = writeln!(err, "error: {line}");
    failure.exit_code()
}

/// A usage error formatted by clap against the subcommand that was invoked
pub fn usage_error(cli: &Cli, cmd: &mut clap::Command, usage: &UsageError) -> clap::Error {
    cmd.build();
    let name = match cli.command {
        Command::GetAll(_) => "get-all",
        Command::Get(_) => "get",
        Command::Set(_) => "set",
    };
    match cmd.find_subcommand_mut(name) {
        Some(sub) => sub.error(ErrorKind::InvalidValue, usage),
        None => cmd.error(ErrorKind::InvalidValue, usage),
    }
}

/// Turn parsed arguments into a request, without touching the daemon
pub fn build_request(cli: &Cli, grammar: &Grammar<'_>) -> Result<Request, UsageError> {
    let request = match &cli.command {
        Command::GetAll(args) => Request::ListPorts(args.direction()),
        Command::Get(args) => Request::Get(grammar.parse_get(&args.tokens)?),
        Command::Set(args) => Request::Set(grammar.parse_set(&args.tokens)?),
    };
    debug!(operation = ?request.operation(), ?request, "Parsed request");
    Ok(request)
}

/// Daemon address: flags and environment override the file
pub fn daemon_config(cli: &Cli, file: &DaemonConfig) -> DaemonConfig {
    DaemonConfig {
        host: cli.host.clone().unwrap_or_else(|| file.host.clone()),
        port: cli.port.unwrap_or(file.port),
    }
}

impl GetAllArgs {
    pub fn direction(&self) -> Direction {
        if self.input {
            Direction::Input
        } else {
            Direction::Output
        }
    }
}
