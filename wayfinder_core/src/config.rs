// wayfinder_core/src/config.rs

use crate::error::ConfigError;
use crate::types::Point2D;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =========================================================================
// == Top-Level Engine Configuration ==
// =========================================================================

/// # EngineConfig
/// Everything tunable about a `NavigationEngine` session. Every section has a
/// default, so an empty `[engine]` table is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Optional seed for the ranging noise generator, for reproducible sessions.
    pub seed: Option<u64>,
    /// Starting position of the agent. Falls back to the first entrance.
    pub start: Option<Point2D>,
    pub ranging: RangingConfig,
    pub estimator: EstimatorConfig,
    pub control: ControlConfig,
    pub routing: RoutingConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let noise = self.ranging.noise_std_dev;
        if !noise.is_finite() || noise < 0.0 {
            return Err(ConfigError::InvalidNoise(noise));
        }
        let scale = self.ranging.range_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::InvalidRangeScale(scale));
        }
        let step = self.control.step;
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::InvalidStep(step));
        }
        if self.estimator.max_iterations == 0 {
            return Err(ConfigError::InvalidIterations);
        }
        let tolerance = self.estimator.convergence_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        let threshold = self.estimator.singular_threshold;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidSingularThreshold(threshold));
        }
        // Zero would let the Jacobian divide by a zero beacon distance.
        let min_distance = self.estimator.min_distance;
        if !min_distance.is_finite() || min_distance <= 0.0 {
            return Err(ConfigError::InvalidMinDistance(min_distance));
        }
        Ok(())
    }
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RangingConfig {
    /// Standard deviation of the additive Gaussian range noise, in facility units.
    pub noise_std_dev: f64,
    /// Maximum number of readings kept per tick (never fewer than 3).
    pub max_beacons: usize,
    /// Multiplier applied to every beacon's nominal range.
    pub range_scale: f64,
}

impl Default for RangingConfig {
    fn default() -> Self {
        Self {
            noise_std_dev: 0.25,
            max_beacons: 4,
            range_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EstimatorConfig {
    pub max_iterations: usize,
    /// Stop when `|dx| + |dy|` of an update falls below this.
    pub convergence_tolerance: f64,
    /// Normal-equation determinants below this are treated as singular.
    pub singular_threshold: f64,
    /// Floor applied to beacon distances before dividing by them.
    pub min_distance: f64,
    /// Seed each solve with the previous fix instead of the beacon centroid.
    pub warm_start: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            convergence_tolerance: 1e-4,
            singular_threshold: 1e-6,
            min_distance: 1e-9,
            warm_start: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// Distance moved by one directional event.
    pub step: f64,
    /// Rotation applied by one rotate event, in degrees.
    pub heading_increment_deg: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            heading_increment_deg: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Minimum time between two re-plans, in milliseconds.
    pub replan_interval_ms: u64,
}

impl RoutingConfig {
    pub fn replan_interval(&self) -> Duration {
        Duration::from_millis(self.replan_interval_ms)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            replan_interval_ms: 120,
        }
    }
}
