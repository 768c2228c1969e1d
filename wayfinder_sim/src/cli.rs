// wayfinder_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Wayfinder: headless indoor positioning and routing simulator.
///
/// Runs a scripted walkthrough of a facility against the navigation engine and
/// reports how well the estimated pose tracked the truth.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(
        short,
        long,
        default_value = "assets/scenarios/store_walkthrough.toml"
    )]
    pub scenario: PathBuf,

    /// Number of ticks to run, overriding the scenario file.
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Seed for the ranging noise, overriding the scenario file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sleep for the tick interval between ticks instead of running flat out.
    #[arg(long, default_value_t = false)]
    pub realtime: bool,
}
