use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use datacenter_dispatch::{config, domain, optimizer, telemetry, DispatchError};
use config::Config;
use domain::Scenario;
use optimizer::DispatchOptimizer;
use serde_json::json;
use tracing::{error, info};

/// Solve the data-center dispatch LP for one reliability target or a sweep.
#[derive(Debug, Parser)]
#[command(name = "datacenter-dispatch", version)]
struct Cli {
    /// Scenario JSON file
    #[arg(long)]
    scenario: PathBuf,

    /// Solve every target in `reliability.sweep` instead of `reliability.target`
    #[arg(long)]
    pareto: bool,

    /// Settings file (defaults to config/default.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(err) => {
            telemetry::init_tracing("info");
            return report(err);
        }
    };
    telemetry::init_tracing(&cfg.telemetry.log_filter);

    match run(&cli, &cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(err),
    }
}

async fn run(cli: &Cli, cfg: &Config) -> Result<(), DispatchError> {
    let scenario = Scenario::from_json_path(&cli.scenario)?;
    let optimizer = DispatchOptimizer::new(cfg.optimizer.clone());
    info!(
        scenario = %scenario.name,
        horizon = scenario.horizon(),
        pareto = cli.pareto,
        value_of_lost_load = optimizer.settings().value_of_lost_load,
        max_parallel_solves = optimizer.settings().max_parallel_solves,
        "solving dispatch scenario"
    );

    let response = optimizer.respond(&scenario, cli.pareto).await?;
    print_json(&serde_json::to_value(&response).map_err(anyhow::Error::from)?)?;
    Ok(())
}

fn report(err: DispatchError) -> ExitCode {
    error!(category = err.category(), error = %err, "dispatch run failed");
    let body = json!({ "error": err.to_string(), "category": err.category() });
    if let Err(print_err) = print_json(&body) {
        error!(error = %print_err, "failed to write error body");
    }
    ExitCode::from(err.exit_code())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
