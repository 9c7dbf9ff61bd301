mod cli;
mod commands;
mod error;
mod output;

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use smartdash_config::Config;
use smartdash_core::{Dashboard, DashboardConfig, TlsMode};

use crate::cli::{Cli, ColorMode, Command, DashboardArgs, DashboardCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let cfg = smartdash_config::load_config_or_default();
    resolve_presentation(&mut cli.global, &cfg);

    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "smartdash", &mut std::io::stdout());
            Ok(())
        }

        // Everything else talks to the backend
        cmd => {
            let mut dashboard_config = build_dashboard_config(&cfg, &cli.global)?;
            if let Command::Dashboard(DashboardArgs {
                command: DashboardCommand::Watch {
                    interval: Some(secs),
                },
            }) = &cmd
            {
                dashboard_config.refresh_interval = Duration::from_secs(*secs);
            }
            let session = cfg.open_session_store();
            let dashboard = Dashboard::new(dashboard_config, session)?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &dashboard, &cli.global).await;
            dashboard.shutdown();
            result
        }
    }
}

/// Output format and color: flag, then config file, then built-in default.
fn resolve_presentation(global: &mut GlobalOpts, cfg: &Config) {
    global.output = global
        .output_flag
        .clone()
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or_default();
    global.color = global
        .color_flag
        .clone()
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or_default();
}

/// Config file values with the CLI flag overrides applied.
fn build_dashboard_config(cfg: &Config, global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let mut cfg = cfg.clone();
    if let Some(ref url) = global.base_url {
        cfg.api.base_url.clone_from(url);
    }
    let mut dashboard = cfg.to_dashboard_config()?;
    if global.insecure {
        dashboard.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        dashboard.timeout = Duration::from_secs(secs);
    }
    Ok(dashboard)
}
