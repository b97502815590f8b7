mod cli;
mod commands;
mod config;
mod report;
mod store;

use clap::Parser;
use config::{CliOverrides, ResolvedRunConfig};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pixdiff=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { force } => {
            commands::init(force)?;
        }
        cli::Command::Compare {
            before,
            after,
            output,
            threshold,
            flag_color,
            size_policy,
            fit,
            max_ratio,
            parallel,
            json,
        } => {
            let overrides = CliOverrides {
                threshold,
                flag_color,
                size_policy,
                fit,
                max_ratio,
                parallel,
            };
            let config = ResolvedRunConfig::new(overrides)?;
            let code = commands::compare(config, &before, &after, output.as_deref(), json)?;
            std::process::exit(code);
        }
    }

    Ok(())
}
