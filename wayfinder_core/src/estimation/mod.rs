// wayfinder_core/src/estimation/mod.rs

use crate::error::EstimationError;
use crate::messages::RangeReading;
use crate::types::Point2D;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// How a solve terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// The update step fell below the convergence tolerance.
    Converged,
    /// The iteration cap was reached first.
    IterationLimit,
    /// The normal equations became singular (collinear or coincident beacons).
    /// The position is the best estimate reached before the breakdown.
    DegenerateGeometry,
}

/// The full answer of a position solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub position: Point2D,
    pub iterations: usize,
    pub status: SolveStatus,
    /// Root-mean-square range residual at `position`.
    pub rms_residual: f64,
    pub beacons_used: usize,
}

/// The contract for any algorithm that turns range readings into a position.
pub trait PositionEstimator: DynClone + Debug + Send + Sync {
    /// Solves for the position that best explains `readings`.
    /// `initial_guess` seeds the iteration when the algorithm is iterative.
    fn estimate(
        &self,
        readings: &[RangeReading],
        initial_guess: Option<Point2D>,
    ) -> Result<PositionFix, EstimationError>;
}

// This macro automatically generates the implementation of `Clone` for `Box<dyn PositionEstimator>`.
dyn_clone::clone_trait_object!(PositionEstimator);

pub mod trilateration;

pub use trilateration::GaussNewtonTrilateration;
