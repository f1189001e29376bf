use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod domain;
mod error;
mod services;

use cli::{Cli, Commands};
use commands::{handle_inspect_commands, handle_pipeline_commands};
use error::PipelineError;
use services::config::load_config;
use services::output::print_failure;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (kind, code) = match e.downcast_ref::<PipelineError>() {
                Some(pe) => (pe.kind(), pe.exit_code()),
                None => ("other", 1),
            };
            if cli.json {
                print_failure(kind, &format!("{e:#}"));
            }
            eprintln!("error: {e:#}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }

    match cli.command {
        Commands::Run { .. } | Commands::Fetch { .. } | Commands::Clip { .. } => {
            handle_pipeline_commands(cli, &cfg)
        }
        _ => handle_inspect_commands(cli, &cfg),
    }
}

// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
