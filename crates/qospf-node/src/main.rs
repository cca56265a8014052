//! Q-OSPF admission runner — entry point.
//!
//! Loads an area scenario from a TOML file, builds the link-state database
//! and decides each QoS session request in order.

mod config;
mod scenario;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::ScenarioConfig;
use scenario::ScenarioRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Q-OSPF admission runner
#[derive(Parser, Debug)]
#[command(name = "qospf-node", version, about = "Q-OSPF QoS path computation and admission")]
struct Args {
    /// Path to the scenario file (TOML).
    #[arg(short, long, default_value = "qospf.toml")]
    scenario: PathBuf,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,

    /// Print the area database as hex-encoded advertisements and exit.
    #[arg(long)]
    dump_lsdb: bool,

    /// Generate an example scenario file and exit.
    #[arg(long)]
    init: bool,
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Handle --init flag
    if args.init {
        init_tracing(args.log_level.as_deref().unwrap_or("info"), "text");
        ScenarioConfig::example().save(&args.scenario)?;
        tracing::info!(path = %args.scenario.display(), "wrote example scenario");
        return Ok(());
    }

    let config = ScenarioConfig::load(&args.scenario)?;
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.qospf.effective_log_level().to_string());
    init_tracing(&level, &config.qospf.logging.format);

    tracing::info!(
        "Q-OSPF admission runner v{} ({} routers, {} requests)",
        env!("CARGO_PKG_VERSION"),
        config.routers.len(),
        config.requests.len()
    );

    let runner = ScenarioRunner::new(config)?;

    if args.dump_lsdb {
        println!("{}", hex::encode(runner.lsdb().to_wire()));
        return Ok(());
    }

    let report = runner.run()?;
    match args.output {
        OutputFormat::Text => println!("{}", report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}
