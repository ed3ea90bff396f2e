//! NIBOR Terminal
//!
//! Runs fixing scenarios through the reconciliation drawer and prints the
//! panel as text.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod metrics;
mod scenario;

use controller::{ScenarioSource, TerminalController};
use nibor_common::Tenor;
use nibor_drawer::DrawerConfig;
use scenario::Scenario;

/// NIBOR Terminal CLI
#[derive(Parser, Debug)]
#[command(name = "nibor-terminal")]
#[command(about = "NIBOR fixing reconciliation terminal")]
struct Args {
    /// Built-in scenario to run (matched, mismatch, missing-facit)
    #[arg(short, long, default_value = "matched", conflicts_with = "file")]
    scenario: String,

    /// Scenario JSON file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Tenor to open after all tenors are evaluated (e.g. 3m)
    #[arg(short, long)]
    tenor: Option<Tenor>,

    /// Request a re-run of the open tenor
    #[arg(long)]
    rerun: bool,

    /// Show the funding rate instead of NIBOR
    #[arg(long)]
    funding: bool,

    /// Random seed for reproducible re-run drift
    #[arg(long)]
    seed: Option<u64>,

    /// Largest re-run drift per implied rate, in units of 0.0001
    #[arg(long, default_value = "5")]
    max_drift: u32,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    info!("Starting NIBOR Terminal");

    let config = DrawerConfig::from_env();
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }

    let scenario = match &args.file {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::load(&args.scenario)?,
    };
    info!(scenario = %scenario.name, tenors = scenario.cases.len(), "Scenario loaded");

    let source =
        ScenarioSource::new(scenario, config.clone(), args.seed).with_max_drift(args.max_drift);
    let mut controller = TerminalController::new(config, source, args.funding)?;

    controller.show_all().await?;

    if let Some(tenor) = args.tenor {
        if controller.show_tenor(tenor).await?.is_none() {
            return Err(anyhow::anyhow!("Scenario has no data for tenor {}", tenor));
        }
    }

    if let Some(report) = controller.render() {
        println!("{}", report);
    }

    if args.rerun {
        if let Some(tenor) = controller.drawer().session().current_tenor() {
            controller.request_rerun(tenor);
            controller.service_signals().await?;

            if let Some(report) = controller.render() {
                println!("{}", report);
            }
        }
    }

    let board = controller.drawer().board();
    println!("Fixing board");
    for (tenor, status) in board.entries() {
        println!("  {:<3} {}", tenor.to_string(), status);
    }
    if controller.drawer().ready_to_confirm() {
        println!("Ready to confirm");
    } else {
        let outstanding: Vec<String> = board.outstanding().iter().map(Tenor::to_string).collect();
        println!("Not ready to confirm: {}", outstanding.join(", "));
    }

    controller.close();
    controller.service_signals().await?;

    let metrics = controller.metrics().await;
    info!("Run complete");
    info!("Views shown: {}", metrics.shows);
    info!(
        "Statuses: {} matched, {} warn, {} fail, {} pending",
        metrics.matched, metrics.warned, metrics.failed, metrics.pending
    );
    info!(
        "Re-runs: {} requested, {} completed, {} stale ({:.0}% completed)",
        metrics.reruns_requested,
        metrics.reruns_completed,
        metrics.stale_reruns,
        metrics.rerun_completion_rate() * 100.0
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["nibor-terminal"]).unwrap();
        assert_eq!(args.scenario, "matched");
        assert_eq!(args.max_drift, 5);
        assert!(args.tenor.is_none());
    }

    #[test]
    fn test_negative_drift_rejected() {
        assert!(Args::try_parse_from(["nibor-terminal", "--max-drift", "-9223372036854775808"]).is_err());
        assert!(Args::try_parse_from(["nibor-terminal", "--max-drift", "-1"]).is_err());
    }

    #[test]
    fn test_tenor_argument() {
        let args = Args::try_parse_from(["nibor-terminal", "--tenor", "3m", "--rerun"]).unwrap();
        assert_eq!(args.tenor, Some(Tenor::ThreeMonths));
        assert!(args.rerun);
    }
}
