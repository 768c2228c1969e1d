// wayfinder_core/src/prelude.rs

// --- Core Abstractions ---
pub use crate::estimation::PositionEstimator;
pub use crate::messages::{ControlEvent, Direction, TickReport};

// --- Core Data Structures ---
pub use crate::config::EngineConfig;
pub use crate::facility::{Beacon, FacilityBounds, FacilityModel, ObstacleRegion, PointFeature};
pub use crate::messages::{NavigationPose, PoseSource, RangeReading, Target};
pub use crate::types::{GridCell, Point2D, Pose};

// --- Algorithms ---
pub use crate::estimation::{GaussNewtonTrilateration, PositionFix, SolveStatus};
pub use crate::mapping::OccupancyGrid;
pub use crate::models::ranging::RangeSimulator;
pub use crate::planning::{GridPathfinder, Route, RoutePlanner};

// --- Orchestration ---
pub use crate::engine::{EngineSnapshot, NavigationEngine};
pub use crate::error::{ConfigError, EngineError, EstimationError, FacilityError};
