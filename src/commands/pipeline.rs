use crate::cli::{Cli, Commands, FetchArgs};
use crate::domain::models::{PipelineConfig, PipelineReport};
use crate::services::clipper::Osmconvert;
use crate::services::output::{human_bytes, print_report};
use crate::services::pipeline::{Pipeline, RunOptions, Scope};
use crate::services::transport::HttpTransport;
use std::time::Duration;

pub fn handle_pipeline_commands(cli: &Cli, cfg: &PipelineConfig) -> anyhow::Result<()> {
    let opts = match &cli.command {
        Commands::Run { fetch } => options(Scope::Full, fetch, cfg),
        Commands::Fetch { fetch } => options(Scope::FetchOnly, fetch, cfg),
        Commands::Clip { force } => RunOptions {
            scope: Scope::ClipOnly,
            force: *force,
            boundary_refresh: cfg.boundary_refresh,
        },
        _ => anyhow::bail!("not a pipeline command"),
    };

    let transport = HttpTransport::new(Duration::from_secs(cfg.timeouts.connect_secs));
    let clipper = Osmconvert::new(&cfg.clipper);
    let report = Pipeline::new(cfg, &transport, &clipper).run(opts)?;
    print_report(cli.json, &report, report_lines)
}

fn options(scope: Scope, args: &FetchArgs, cfg: &PipelineConfig) -> RunOptions {
    RunOptions {
        scope,
        force: args.force,
        boundary_refresh: args.refresh_boundary.unwrap_or(cfg.boundary_refresh),
    }
}

fn report_lines(r: &PipelineReport) -> Vec<String> {
    let mut lines: Vec<String> = r
        .steps
        .iter()
        .map(|s| {
            let size = s.bytes.map(human_bytes).unwrap_or_default();
            format!("{}\t{}\t{}\t{}", s.step, s.outcome, s.path, size)
                .trim_end()
                .to_string()
        })
        .collect();
    lines.push(format!("stage: {} ({})", r.stage, r.region));
    lines
}
