// wayfinder_sim/src/driver.rs

use std::time::Duration;
use tracing::{debug, info, warn};
use wayfinder_core::engine::NavigationEngine;
use wayfinder_core::messages::{ControlEvent, PoseSource, TickReport};

use crate::config::{ScenarioConfig, ScriptAction, ScriptEvent, SimError};

/// Aggregate statistics of one driver run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub replans: u64,
    pub route_changes: u64,
    /// Ticks on which the estimator produced a fix.
    pub fixes: u64,
    pub estimation_failures: u64,
    pub mean_position_error: Option<f64>,
    pub max_position_error: f64,
    pub final_route_steps: Option<usize>,
    pub unreachable_targets: Vec<String>,
}

/// Drives a `NavigationEngine` through a scenario on a simulated clock.
pub struct SimulationDriver {
    engine: NavigationEngine,
    script: Vec<ScriptEvent>,
    next_event: usize,
    tick_interval: Duration,
    tick_interval_ms: u64,
    ticks: u64,
    realtime: bool,
}

impl SimulationDriver {
    pub fn new(scenario: ScenarioConfig) -> Result<Self, SimError> {
        let engine_config = scenario.engine_config();
        let settings = scenario.simulation;
        let mut engine = NavigationEngine::new(scenario.facility, engine_config)?;
        engine.set_targets(scenario.targets);

        let mut script = scenario.script;
        // Stable, so events sharing a tick keep their file order.
        script.sort_by_key(|event| event.tick);

        Ok(Self {
            engine,
            script,
            next_event: 0,
            tick_interval: settings.tick_interval(),
            tick_interval_ms: settings.tick_interval_ms,
            ticks: settings.ticks,
            realtime: settings.realtime,
        })
    }

    pub fn engine(&self) -> &NavigationEngine {
        &self.engine
    }

    /// Simulated time at the start of `tick`. Saturates instead of wrapping.
    pub fn clock_at(&self, tick: u64) -> Duration {
        Duration::from_millis(self.tick_interval_ms.saturating_mul(tick))
    }

    /// Runs every tick and returns the summary.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut error_sum = 0.0;

        for tick in 0..self.ticks {
            self.apply_script(tick);

            let now = self.clock_at(tick);
            let report = self.engine.on_tick(now);
            self.record(tick, &report, &mut summary, &mut error_sum);

            if self.realtime {
                std::thread::sleep(self.tick_interval);
            }
        }

        summary.ticks = self.ticks;
        if summary.fixes > 0 {
            summary.mean_position_error = Some(error_sum / summary.fixes as f64);
        }
        if let Some(route) = self.engine.route() {
            summary.final_route_steps = Some(route.steps());
            summary.unreachable_targets = route
                .unreachable_targets()
                .map(str::to_string)
                .collect();
        }
        summary
    }

    fn apply_script(&mut self, tick: u64) {
        while let Some(event) = self.script.get(self.next_event) {
            if event.tick > tick {
                break;
            }
            let action = event.action.clone();
            self.next_event += 1;

            debug!(tick, ?action, "script action");
            match action {
                ScriptAction::Move { direction } => self.engine.on_control_event(direction.into()),
                ScriptAction::Rotate { clockwise } => {
                    let event = if clockwise {
                        ControlEvent::RotateClockwise
                    } else {
                        ControlEvent::RotateCounterClockwise
                    };
                    self.engine.on_control_event(event);
                }
                ScriptAction::AddTarget { target } => self.engine.add_target(target),
                ScriptAction::RemoveTarget { id } => {
                    if !self.engine.remove_target(&id) {
                        warn!(tick, id = %id, "script removed a target that does not exist");
                    }
                }
                ScriptAction::ClearTargets => self.engine.clear_targets(),
            }
        }
    }

    fn record(&self, tick: u64, report: &TickReport, summary: &mut RunSummary, error_sum: &mut f64) {
        let truth = self.engine.true_pose();

        match (report.pose_source, self.engine.estimated_pose()) {
            (PoseSource::Estimated, Some(estimate)) => {
                let error = nalgebra::distance(&truth.position, &estimate.position);
                summary.fixes += 1;
                *error_sum += error;
                summary.max_position_error = summary.max_position_error.max(error);
                debug!(
                    tick,
                    error,
                    beacons = self.engine.readings().len(),
                    "position fix"
                );
            }
            _ => {
                summary.estimation_failures += 1;
                debug!(tick, source = ?report.pose_source, "no fix this tick");
            }
        }

        if report.replanned {
            summary.replans += 1;
        }
        if report.route_changed {
            summary.route_changes += 1;
            info!(
                tick,
                revision = self.engine.route_revision(),
                steps = ?self.engine.route().map(|r| r.steps()),
                "route changed"
            );
        }
    }
}
