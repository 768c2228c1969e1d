// wayfinder_core/src/types.rs

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
/// A real-valued position in facility units.
pub type Point2D = Point2<f64>;

// --- Core Identifier ---
/// An integer index into the occupancy grid. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub x: isize,
    pub y: isize,
}

impl GridCell {
    pub const fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }

    /// Sum of absolute coordinate differences.
    pub fn manhattan(&self, other: &GridCell) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Larger of the two absolute coordinate differences.
    pub fn chebyshev(&self, other: &GridCell) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// True when `other` is exactly one step away along a single axis.
    pub fn is_adjacent(&self, other: &GridCell) -> bool {
        self.manhattan(other) == 1
    }
}

/// Position plus heading. Heading is in degrees, clockwise from "up" (-y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point2D,
    pub heading_deg: f64,
}

impl Pose {
    pub fn new(position: Point2D, heading_deg: f64) -> Self {
        Self {
            position,
            heading_deg: wrap_degrees(heading_deg),
        }
    }

    /// Euclidean distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Point2D::origin(), 0.0)
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
