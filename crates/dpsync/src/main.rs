mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use dpsync_core::catalog;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The appender guard must outlive the run so buffered log lines flush.
    let _log_guard = match init_tracing(cli.global.verbose, cli.global.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(error::exit_code::GENERAL);
        }
    };

    match run(cli).await {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    }
}

/// Console logging on stderr driven by `-v`; the optional `--log-file`
/// adds an append-only record of the run at info level.
fn init_tracing(
    verbosity: u8,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, CliError> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer)
                .with_filter(LevelFilter::INFO);
            tracing_subscriber::registry()
                .with(stderr_layer)
                .with(file_layer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry().with(stderr_layer).init();
            Ok(None)
        }
    }
}

async fn run(mut cli: Cli) -> Result<i32, CliError> {
    let cfg = config::load_config_or_default();
    config::apply_defaults(&mut cli.global, &cfg.defaults);

    match cli.command {
        // Config commands don't need a server connection
        Command::Config(args) => {
            commands::config_cmd::handle(args, &cli.global)?;
            Ok(error::exit_code::SUCCESS)
        }

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "dpsync", &mut std::io::stdout());
            Ok(error::exit_code::SUCCESS)
        }

        // Everything else talks to the site server
        Command::Nodes(args) => {
            let client = connect(&cli.global, &cfg).await?;
            commands::nodes::handle(&client, args, &cli.global).await?;
            Ok(error::exit_code::SUCCESS)
        }

        Command::Sync(args) => {
            let client = connect(&cli.global, &cfg).await?;
            commands::sync::handle(client, args, &cfg, &cli.global).await
        }
    }
}

/// Resolve the active profile and open an authenticated client.
async fn connect(
    global: &cli::GlobalOpts,
    cfg: &config::Config,
) -> Result<Arc<dpsync_core::SiteClient>, CliError> {
    let server_config = config::build_server_config(global, cfg)?;

    tracing::debug!(url = %server_config.url, site = %server_config.site, "connecting");
    let client = catalog::connect(&server_config).await?;
    Ok(client)
}
