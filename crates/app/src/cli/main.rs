//! jmctl: command-line control for the jamyxer mixer daemon

use anyhow::Context;
use std::process::ExitCode;

use jmctl::{build_request, command, daemon_config, execute, logging, report, usage_error, Cli, Failure};
use jmctl_core::domain::{AliasRegistry, ClientConfig, ConfigManager, Grammar, Request};
use jmctl_infra::JamyxerClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let help_aliases = match AliasRegistry::standard() {
        Ok(aliases) => aliases,
        Err(e) => return fail(Failure::Startup(e.into())),
    };
    let cli = Cli::parse_with(&help_aliases);
    logging::init(cli.verbose);

    let startup = match prepare(&cli).await {
        Ok(startup) => startup,
        Err(e) => return fail(Failure::Startup(e)),
    };

    let grammar = Grammar::new(&startup.aliases, startup.config.limits);
    let request = match build_request(&cli, &grammar) {
        Ok(request) => request,
        Err(usage) => {
            let err = usage_error(&cli, &mut command(&startup.aliases), &usage);
            let _ = err.print();
            return ExitCode::from(Failure::Usage(usage).exit_code());
        }
    };

    match run(&cli, &startup.config, &request).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => fail(failure),
    }
}

struct Startup {
    config: ClientConfig,
    aliases: AliasRegistry,
}

async fn prepare(cli: &Cli) -> anyhow::Result<Startup> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(ConfigManager::default_config_dir()?),
    };
    let config = manager
        .load()
        .await
        .with_context(|| format!("Failed to load {}", manager.config_path().display()))?;
    let aliases =
        AliasRegistry::with_extra(&config.aliases).context("Invalid [aliases] in configuration")?;

    Ok(Startup { config, aliases })
}

async fn run(cli: &Cli, config: &ClientConfig, request: &Request) -> Result<(), Failure> {
    let daemon = daemon_config(cli, &config.daemon);
    let address = daemon.address();
    let client = JamyxerClient::connect(&address)
        .await
        .with_context(|| format!("Failed to connect to mixer daemon at {address}"))
        .map_err(Failure::Startup)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&client, request, &mut out).await?;
    Ok(())
}

fn fail(failure: Failure) -> ExitCode {
    ExitCode::from(report(&failure, &mut std::io::stderr()))
}
