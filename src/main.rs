use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use repo_quality::cli::{Cli, Commands};
use repo_quality::commands::{assess::handle_assess, init::init_config, score::handle_score};
use repo_quality::commands::{AssessConfig, ScoreConfig};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Assess {
            repo,
            output,
            fail_under,
            config,
            json,
            keep_clone,
            quiet,
            verbose: _,
        } => handle_assess(AssessConfig {
            repo,
            output,
            fail_under,
            config,
            json,
            keep_clone,
            quiet,
        }),
        Commands::Score {
            metrics,
            output,
            config,
            verbose: _,
        } => {
            handle_score(ScoreConfig {
                metrics,
                output,
                config,
            })?;
            Ok(true)
        }
        Commands::Init { force } => {
            init_config(force)?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.command.verbosity());

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
