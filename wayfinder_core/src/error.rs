// wayfinder_core/src/error.rs

use thiserror::Error;

/// Load-time problems with the facility layout. These are the only fatal errors
/// the engine produces; everything at runtime is recovered locally.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FacilityError {
    #[error("facility bounds must be non-zero, got {width}x{height}")]
    InvalidBounds { width: u32, height: u32 },

    #[error("facility declares no beacons")]
    NoBeacons,

    #[error("beacon id '{0}' is declared more than once")]
    DuplicateBeacon(String),

    #[error("beacon '{id}' has an invalid max range {max_range}")]
    InvalidBeaconRange { id: String, max_range: f64 },

    #[error("obstacle {index} in section '{section}' has zero area")]
    DegenerateObstacle { section: String, index: usize },

    #[error("non-finite coordinate in {0}")]
    NonFiniteCoordinate(String),
}

/// Engine configuration values that cannot be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("noise standard deviation must be finite and >= 0, got {0}")]
    InvalidNoise(f64),

    #[error("range scale must be finite and > 0, got {0}")]
    InvalidRangeScale(f64),

    #[error("control step must be finite and > 0, got {0}")]
    InvalidStep(f64),

    #[error("estimator needs at least one iteration")]
    InvalidIterations,

    #[error("convergence tolerance must be finite and > 0, got {0}")]
    InvalidTolerance(f64),

    #[error("singular threshold must be finite and >= 0, got {0}")]
    InvalidSingularThreshold(f64),

    #[error("minimum beacon distance must be finite and > 0, got {0}")]
    InvalidMinDistance(f64),
}

/// Why the estimator could not produce a fix.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EstimationError {
    #[error("insufficient beacons: {available} readings, {required} required")]
    InsufficientBeacons { available: usize, required: usize },
}

/// Everything that can stop a `NavigationEngine` from being constructed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid facility: {0}")]
    Facility(#[from] FacilityError),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
}
