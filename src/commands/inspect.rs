use crate::cli::{Cli, Commands, ConfigCommands};
use crate::domain::models::PipelineConfig;
use crate::services::config::write_default;
use crate::services::inspect::{doctor, locate, status};
use crate::services::output::{human_bytes, print_report};

pub fn handle_inspect_commands(cli: &Cli, cfg: &PipelineConfig) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Status => {
            let report = status(cfg)?;
            print_report(cli.json, &report, |r| {
                let mut lines = vec![format!("osm_dir: {}", r.osm_dir)];
                for a in &r.artifacts {
                    let detail = match (a.size, &a.sha256) {
                        (Some(size), Some(sha)) => {
                            format!("{}\t{}", human_bytes(size), &sha[..12.min(sha.len())])
                        }
                        _ => "missing".to_string(),
                    };
                    lines.push(format!("{}\t{}\t{}", a.kind, a.file, detail));
                }
                if let Some(b) = &r.boundary {
                    lines.push(format!(
                        "boundary: {} ({} rings, {} holes, {} vertices) bbox {:?}",
                        b.name, b.rings, b.holes, b.vertices, b.bbox
                    ));
                }
                lines.push(format!("clip_up_to_date: {}", r.clip_up_to_date));
                lines
            })?;
        }
        Commands::Locate { name } => {
            let report = locate(cfg, name.as_deref())?;
            print_report(cli.json, &report, |r| vec![r.path.clone()])?;
        }
        Commands::Doctor => {
            let report = doctor(cfg);
            print_report(cli.json, &report, |r| {
                let mut lines: Vec<String> = r
                    .checks
                    .iter()
                    .map(|c| format!("{}\t{}", c.name, c.status))
                    .collect();
                lines.push(format!("overall: {}", r.overall));
                lines
            })?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                if cli.json {
                    print_report(true, cfg, |_| Vec::new())?;
                } else {
                    println!("{}", serde_json::to_string_pretty(cfg)?);
                }
            }
            ConfigCommands::Init { path } => {
                write_default(path)?;
                print_report(cli.json, &path.to_string_lossy(), |p| {
                    vec![format!("wrote {p}")]
                })?;
            }
        },
        _ => anyhow::bail!("not an inspection command"),
    }
    Ok(())
}
