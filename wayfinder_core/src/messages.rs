// wayfinder_core/src/messages.rs

use crate::types::{Point2D, Pose};
use serde::{Deserialize, Serialize};

// =========================================================================
// == Input Messages ==
// =========================================================================

/// A screen-space direction. `Up` is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit displacement for this direction.
    pub fn offset(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    /// Heading of travel in degrees, clockwise from `Up`.
    pub fn heading_deg(self) -> f64 {
        match self {
            Direction::Up => 0.0,
            Direction::Right => 90.0,
            Direction::Down => 180.0,
            Direction::Left => 270.0,
        }
    }
}

/// A discrete agent-control event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEvent {
    Move(Direction),
    RotateClockwise,
    RotateCounterClockwise,
}

impl From<Direction> for ControlEvent {
    fn from(direction: Direction) -> Self {
        ControlEvent::Move(direction)
    }
}

/// A waypoint the agent wants to reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
    pub id: String,
    pub position: Point2D,
    #[serde(default)]
    pub label: String,
}

impl Target {
    pub fn new(id: impl Into<String>, position: Point2D, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
        }
    }
}

// =========================================================================
// == Output Messages ==
// =========================================================================

/// One noisy distance sample from a beacon. Recomputed every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeReading {
    pub beacon_id: String,
    pub beacon_position: Point2D,
    pub measured_distance: f64,
}

/// Which fallback produced the pose used for routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseSource {
    /// Fresh trilateration fix from this tick.
    Estimated,
    /// Estimation failed this tick; the previous fix is reused.
    LastKnown,
    /// No fix has ever succeeded; ground truth stands in.
    GroundTruth,
}

/// A pose together with where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavigationPose {
    pub pose: Pose,
    pub source: PoseSource,
}

/// What a single `on_tick` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// The route chain ran this tick.
    pub replanned: bool,
    /// The route chain produced a polyline different from the previous one.
    pub route_changed: bool,
    /// A re-plan is still pending behind the throttle.
    pub replan_pending: bool,
    pub pose_source: PoseSource,
}
