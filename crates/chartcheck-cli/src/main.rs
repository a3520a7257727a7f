//! # chartcheck CLI entry point
//!
//! Parses arguments, loads configuration, and dispatches to the subcommand
//! handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chartcheck_cli::render::{run_render, RenderArgs};
use chartcheck_cli::schema::{run_schema, SchemaArgs};
use chartcheck_cli::GlobalArgs;
use chartcheck_core::HarnessConfig;

/// Render Helm charts and validate their output against Kubernetes JSON
/// schemas.
#[derive(Parser, Debug)]
#[command(name = "chartcheck", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a chart and validate every object it emits.
    Render(RenderArgs),

    /// Resolve and cache the schema for an apiVersion and kind.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = match HarnessConfig::from_env() {
        Ok(config) => cli.global.apply(config),
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::from(2);
        }
    };
    tracing::debug!(
        schema_dir = %config.schema_dir.display(),
        chart_dir = %config.chart_dir.display(),
        offline = config.offline,
        "loaded configuration"
    );

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Render(args) => run_render(args, &config, &mut stdout),
        Commands::Schema(args) => run_schema(args, &config, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
