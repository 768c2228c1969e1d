// wayfinder_sim/src/config.rs

//! Loading and validating scenario files.

use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;
use wayfinder_core::config::EngineConfig;
use wayfinder_core::error::EngineError;
use wayfinder_core::facility::FacilityModel;
use wayfinder_core::messages::{Direction, Target};

use crate::cli::Cli;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file not found: {0}")]
    MissingScenario(PathBuf),
    #[error("failed to parse scenario: {0}")]
    Config(#[from] figment::Error),
    #[error("engine rejected the scenario: {0}")]
    Engine(#[from] EngineError),
}

// =========================================================================
// == Top-Level Scenario ==
// =========================================================================

/// # ScenarioConfig
/// The root of a scenario TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: SimulationSettings,

    pub facility: FacilityModel,

    #[serde(default)]
    pub engine: EngineConfig,

    /// Targets present from the first tick.
    #[serde(default)]
    pub targets: Vec<Target>,

    #[serde(default)]
    pub script: Vec<ScriptEvent>,
}

impl ScenarioConfig {
    /// Loads a scenario from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, SimError> {
        if !path.is_file() {
            return Err(SimError::MissingScenario(path.to_path_buf()));
        }
        info!("Loading scenario from: {}", path.display());
        Ok(Figment::new().merge(Toml::file(path)).extract()?)
    }

    /// Parses a scenario from TOML text.
    pub fn from_toml_str(toml: &str) -> Result<Self, SimError> {
        Ok(Figment::new().merge(Toml::string(toml)).extract()?)
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ticks) = cli.ticks {
            self.simulation.ticks = ticks;
        }
        if let Some(seed) = cli.seed {
            self.simulation.seed = Some(seed);
        }
        if cli.realtime {
            self.simulation.realtime = true;
        }
    }

    /// The engine configuration with the run-level seed folded in.
    pub fn engine_config(&self) -> EngineConfig {
        let mut engine = self.engine.clone();
        if let Some(seed) = self.simulation.seed {
            engine.seed = Some(seed);
        }
        engine
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationSettings {
    /// Optional seed for the ranging noise. Takes precedence over `[engine] seed`.
    pub seed: Option<u64>,
    /// Simulated time between two ticks.
    pub tick_interval_ms: u64,
    /// Number of ticks to run.
    pub ticks: u64,
    /// Sleep between ticks so the run takes wall-clock time.
    pub realtime: bool,
}

impl SimulationSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            seed: None,
            tick_interval_ms: 50,
            ticks: 200,
            realtime: false,
        }
    }
}

/// A scripted input applied at the start of a given tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptEvent {
    pub tick: u64,
    pub action: ScriptAction,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    Move { direction: Direction },
    Rotate { clockwise: bool },
    AddTarget { target: Target },
    RemoveTarget { id: String },
    ClearTargets,
}
