//! Command-line arguments
//!
//! clap handles the global options and the three top-level commands. The
//! tokens after `get`/`set` are kept raw and handed to the request grammar,
//! since alias tokens such as `-in` or `-v` are not clap flags and `--` must
//! survive as an escape for port names.

use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::fmt::Write;
use std::path::PathBuf;

use jmctl_core::domain::{AliasRegistry, CanonicalOperation};

#[derive(Debug, Parser)]
#[command(name = "jmctl")]
#[command(version, about = "Control a running jamyxer mixer daemon", long_about = None)]
pub struct Cli {
    /// Print diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Daemon host
    #[arg(long, env = "JMCTL_HOST")]
    pub host: Option<String>,

    /// Daemon port
    #[arg(long, env = "JMCTL_PORT")]
    pub port: Option<u16>,

    /// Configuration file (default: <config dir>/jmctl/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List all input or all output port names
    #[command(name = "get-all", visible_aliases = ["ga", "geta", "getall"])]
    GetAll(GetAllArgs),

    /// Read a property of a port
    #[command(visible_aliases = ["g", "ge"], short_flag = 'g', long_flag = "get")]
    Get(TokenArgs),

    /// Change a property of a port
    #[command(visible_aliases = ["se", "s"], short_flag = 's', long_flag = "set")]
    Set(TokenArgs),
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct GetAllArgs {
    /// List input ports
    #[arg(short, long)]
    pub input: bool,

    /// List output ports
    #[arg(short, long)]
    pub output: bool,
}

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// (-i PORT | -o PORT | -m) [-V | -B] OPERATION [ARGS]
    #[arg(
        value_name = "ARGS",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub tokens: Vec<String>,
}

impl Cli {
    /// Parse `std::env::args`, listing the leaf commands of `aliases` in `get`/`set` help
    pub fn parse_with(aliases: &AliasRegistry) -> Self {
        let matches = command(aliases).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}

/// The clap command with leaf command help attached to `get` and `set`
pub fn command(aliases: &AliasRegistry) -> clap::Command {
    Cli::command()
        .mut_subcommand("get", |get| get.after_help(leaf_help(aliases, false)))
        .mut_subcommand("set", |set| set.after_help(leaf_help(aliases, true)))
}

fn leaf_help(aliases: &AliasRegistry, set: bool) -> String {
    let mut help = String::from("Commands:\n");
    for entry in aliases.sets() {
        let op = entry.operation();
        if set && !op.is_settable() {
            continue;
        }

        let args = match (op, set) {
            (CanonicalOperation::Volume | CanonicalOperation::Balance, true) => " --val F",
            (CanonicalOperation::Connected, true) => " OTHER (-t | -c | -d)",
            (CanonicalOperation::Connected, false) => " OTHER",
            _ => "",
        };
        let verb = if set { "change" } else { "print" };
        let others: Vec<&str> = entry.tokens().iter().skip(1).map(String::as_str).collect();

        let _ = writeln!(help, "  {op}{args}");
        let _ = writeln!(help, "      {verb} {}", op.description());
        if !others.is_empty() {
            let _ = writeln!(help, "      aliases: {}", others.join(", "));
        }
    }
    help
}
