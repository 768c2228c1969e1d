// wayfinder_sim/src/main.rs

use clap::Parser;
use std::error::Error;
use std::process::ExitCode;
use tracing::{error, info};
use wayfinder_sim::cli::Cli;
use wayfinder_sim::config::{ScenarioConfig, SimError};
use wayfinder_sim::driver::SimulationDriver;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfinder_sim=info,wayfinder_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            let mut source = err.source();
            while let Some(cause) = source {
                error!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let mut scenario = ScenarioConfig::load(&cli.scenario)?;
    scenario.apply_cli(cli);

    let mut driver = SimulationDriver::new(scenario)?;
    let summary = driver.run();

    info!(
        ticks = summary.ticks,
        replans = summary.replans,
        route_changes = summary.route_changes,
        estimation_failures = summary.estimation_failures,
        "run complete"
    );
    match summary.mean_position_error {
        Some(mean) => info!(
            "Position error | mean: {:.3} | max: {:.3}",
            mean, summary.max_position_error
        ),
        None => info!("No position fixes were produced"),
    }
    match summary.final_route_steps {
        Some(steps) => info!(steps, unreachable = ?summary.unreachable_targets, "final route"),
        None => info!("No route at end of run"),
    }
    Ok(())
}
