//! Chemflow CLI
//!
//! - `trace`: cross-reference every source table for one CAS registry number and
//!   emit the result as JSON or the flow graph as Graphviz DOT
//! - `identify`: print the chemical identifier embedded in a file name

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use chemflow_core::{cross_reference, Casrn, LinkOutcome, MatchPolicy, PipelineConfig};
use chemflow_ingest::{identifier_for, load_sources, SourcePaths};

mod render;

use render::OutputFormat;

#[derive(Parser)]
#[command(name = "chemflow")]
#[command(
    author,
    version,
    about = "Chemflow: chemical condition-of-use cross-reference and flow graphs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-reference all sources for one chemical identifier.
    Trace(TraceArgs),

    /// Extract the chemical identifier from a file name.
    Identify {
        file_name: PathBuf,
        /// Regex whose first capture group is the identifier.
        #[arg(long, default_value = chemflow_core::DEFAULT_FILENAME_PATTERN)]
        pattern: String,
    },
}

#[derive(Args)]
struct TraceArgs {
    /// CAS registry number, e.g. `50-00-0`.
    casrn: String,

    /// Reporting-inventory table (JSON).
    #[arg(long)]
    inventory: PathBuf,
    /// Industrial processing-and-use table (JSON).
    #[arg(long)]
    industrial: PathBuf,
    /// Consumer/commercial-use table (JSON).
    #[arg(long)]
    consumer: PathBuf,
    /// Product-composition table(s) (JSON); repeatable.
    #[arg(long = "composition")]
    compositions: Vec<PathBuf>,
    /// PUC → NAICS crosswalk table (JSON).
    #[arg(long)]
    crosswalk: Option<PathBuf>,
    /// NAICS code → title table (JSON).
    #[arg(long)]
    naics_titles: Option<PathBuf>,

    /// Pipeline configuration (JSON); flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// keep-first | keep-last | keep-all
    #[arg(long)]
    policy: Option<MatchPolicy>,
    #[arg(long)]
    restrict_to_use_facilities: bool,
    /// Sort linked records by facility before assigning codes.
    #[arg(long)]
    presort: bool,

    /// json | dot
    #[arg(long, default_value = "json")]
    format: String,
    /// Render the simplified section graph instead of the detailed one (DOT only).
    #[arg(long)]
    sections: bool,
    /// Output file (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Trace(args) => cmd_trace(&args),
        Commands::Identify { file_name, pattern } => {
            let identifier = identifier_for(&file_name, &pattern)?;
            println!("{identifier}");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn effective_config(args: &TraceArgs) -> Result<PipelineConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(policy) = args.policy {
        config.match_policy = policy;
    }
    if args.restrict_to_use_facilities {
        config.graph.restrict_to_use_facilities = true;
    }
    if args.presort {
        config.presort = true;
    }
    Ok(config)
}

fn cmd_trace(args: &TraceArgs) -> Result<()> {
    let casrn = Casrn::parse(&args.casrn)?;
    let format = OutputFormat::parse(&args.format)?;
    let config = effective_config(args)?;

    let sources = load_sources(&SourcePaths {
        inventory: args.inventory.clone(),
        industrial: args.industrial.clone(),
        consumer: args.consumer.clone(),
        compositions: args.compositions.clone(),
        crosswalk: args.crosswalk.clone(),
        naics_titles: args.naics_titles.clone(),
    })?;

    let result = cross_reference(casrn.as_str(), &sources, &config);
    if result.outcome == LinkOutcome::NoIdentifierMatch {
        eprintln!(
            "{} no source lists {}",
            "warning:".yellow().bold(),
            casrn.to_string().bold()
        );
    }

    let rendered = match format {
        OutputFormat::Json => render::render_json(&result)?,
        OutputFormat::Dot => {
            let title = format!("Qualitative Mapping (CAS No. {casrn})");
            let graph = if args.sections {
                &result.sections
            } else {
                &result.graph
            };
            render::render_dot(graph, &title)
        }
    };

    match &args.out {
        Some(out) => {
            fs::write(out, &rendered)
                .with_context(|| format!("failed to write {}", out.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), out.display().to_string().bold());
        }
        None => println!("{rendered}"),
    }

    eprintln!(
        "{} {} linked, {} facilities, {} nodes, {} edges",
        "traced".green().bold(),
        result.linked_records,
        result.legend.len(),
        result.graph.nodes.len(),
        result.graph.edges.len()
    );
    for entry in result.legend.iter().filter(|e| e.conflicting_use_type) {
        eprintln!(
            "{} {} ({}) reported as both industrial and consumer",
            "note:".cyan().bold(),
            entry.code,
            entry.identity
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("config.json");
        fs::write(&config_path, r#"{"match_policy": "keep_all", "presort": false}"#)?;

        let cli = Cli::try_parse_from([
            "chemflow",
            "trace",
            "50-00-0",
            "--inventory",
            "tri.json",
            "--industrial",
            "ind.json",
            "--consumer",
            "con.json",
            "--config",
            config_path.to_str().unwrap(),
            "--presort",
        ])?;
        let Commands::Trace(args) = cli.command else {
            panic!("expected trace");
        };
        let config = effective_config(&args)?;
        assert_eq!(config.match_policy, MatchPolicy::KeepAll);
        assert!(config.presort);
        assert!(!config.graph.restrict_to_use_facilities);
        Ok(())
    }

    #[test]
    fn policy_flag_wins() -> Result<()> {
        let cli = Cli::try_parse_from([
            "chemflow", "trace", "50-00-0", "--inventory", "a", "--industrial", "b", "--consumer", "c",
            "--policy", "keep-first",
        ])?;
        let Commands::Trace(args) = cli.command else {
            panic!("expected trace");
        };
        assert_eq!(effective_config(&args)?.match_policy, MatchPolicy::KeepFirst);
        Ok(())
    }
}
