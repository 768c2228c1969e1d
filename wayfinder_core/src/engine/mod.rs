// wayfinder_core/src/engine/mod.rs

//! The orchestrator. One `NavigationEngine` lives for one session and owns the
//! facility, the derived grid, and the current pose and route snapshots.
//!
//! Two update chains run off the host's calls:
//! - pose chain: true pose -> range simulation -> trilateration -> estimated pose
//! - route chain: targets / cursor cell changed -> throttled re-plan

pub mod throttle;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::estimation::{GaussNewtonTrilateration, PositionEstimator, PositionFix, SolveStatus};
use crate::facility::FacilityModel;
use crate::mapping::OccupancyGrid;
use crate::messages::{
    ControlEvent, NavigationPose, PoseSource, RangeReading, Target, TickReport,
};
use crate::models::ranging::RangeSimulator;
use crate::planning::{Route, RoutePlanner};
use crate::types::{GridCell, Point2D, Pose};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::Duration;
use throttle::Throttle;
use tracing::{debug, info, warn};

/// Everything the presentation layer needs after a tick.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub true_pose: Pose,
    pub estimated_pose: Option<Pose>,
    pub navigation_pose: NavigationPose,
    pub readings: Vec<RangeReading>,
    pub fix: Option<PositionFix>,
    pub route: Option<Route>,
    pub route_revision: u64,
}

pub struct NavigationEngine {
    facility: FacilityModel,
    grid: OccupancyGrid,
    config: EngineConfig,

    simulator: RangeSimulator,
    estimator: Box<dyn PositionEstimator>,
    rng: ChaCha8Rng,

    // --- Pose chain state ---
    true_pose: Pose,
    estimated_pose: Option<Pose>,
    last_known_pose: Option<Pose>,
    last_fix: Option<PositionFix>,
    readings: Vec<RangeReading>,

    // --- Route chain state ---
    targets: Vec<Target>,
    route: Option<Route>,
    route_revision: u64,
    route_dirty: bool,
    /// The cell the last plan started from, before snapping.
    planned_cursor: Option<GridCell>,
    throttle: Throttle,
}

impl NavigationEngine {
    /// Validates the inputs, builds the occupancy grid, places the agent and runs
    /// one pose-chain pass so the first snapshot already has readings.
    pub fn new(facility: FacilityModel, config: EngineConfig) -> Result<Self, EngineError> {
        facility.validate()?;
        config.validate()?;

        let grid = OccupancyGrid::from_facility(&facility);
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let start = config
            .start
            .or_else(|| facility.entrances.first().map(|e| e.position))
            .unwrap_or_else(|| facility.bounds.center());
        let true_pose = Pose::new(facility.bounds.clamp(start), 0.0);

        info!(
            facility = %facility.name,
            width = grid.width(),
            height = grid.height(),
            walkable = grid.walkable_count(),
            beacons = facility.beacons.len(),
            "navigation engine initialised"
        );

        let mut engine = Self {
            simulator: RangeSimulator::new(&config.ranging),
            estimator: Box::new(GaussNewtonTrilateration::new(&config.estimator)),
            throttle: Throttle::new(config.routing.replan_interval()),
            facility,
            grid,
            config,
            rng,
            true_pose,
            estimated_pose: None,
            last_known_pose: None,
            last_fix: None,
            readings: Vec::new(),
            targets: Vec::new(),
            route: None,
            route_revision: 0,
            route_dirty: false,
            planned_cursor: None,
        };
        engine.run_pose_chain();
        Ok(engine)
    }

    /// Replaces the position solver.
    pub fn with_estimator(mut self, estimator: Box<dyn PositionEstimator>) -> Self {
        self.estimator = estimator;
        self.run_pose_chain();
        self
    }

    // =========================================================================
    // == Inputs ==
    // =========================================================================

    /// Applies one control event to the true pose, then re-runs the pose chain.
    pub fn on_control_event(&mut self, event: ControlEvent) {
        let step = self.config.control.step;
        let increment = self.config.control.heading_increment_deg;
        let pose = self.true_pose;

        self.true_pose = match event {
            ControlEvent::Move(direction) => {
                let (dx, dy) = direction.offset();
                let moved = Point2D::new(pose.position.x + dx * step, pose.position.y + dy * step);
                Pose::new(self.facility.bounds.clamp(moved), direction.heading_deg())
            }
            ControlEvent::RotateClockwise => Pose::new(pose.position, pose.heading_deg + increment),
            ControlEvent::RotateCounterClockwise => {
                Pose::new(pose.position, pose.heading_deg - increment)
            }
        };
        debug!(?event, position = ?self.true_pose.position, heading = self.true_pose.heading_deg, "control event applied");

        self.run_pose_chain();
        self.refresh_cursor();
    }

    /// Advances both chains for the current host time.
    pub fn on_tick(&mut self, now: Duration) -> TickReport {
        self.run_pose_chain();
        self.refresh_cursor();

        let mut replanned = false;
        let mut route_changed = false;
        if self.route_dirty && self.throttle.try_fire(now) {
            route_changed = self.replan();
            replanned = true;
            self.route_dirty = false;
        }

        TickReport {
            replanned,
            route_changed,
            replan_pending: self.route_dirty,
            pose_source: self.navigation_pose().source,
        }
    }

    /// Replaces the whole target set.
    pub fn set_targets(&mut self, targets: Vec<Target>) {
        self.targets = targets
            .into_iter()
            .map(|target| self.clamp_target(target))
            .collect();
        self.route_dirty = true;
    }

    /// Adds a target, replacing any existing target with the same id.
    pub fn add_target(&mut self, target: Target) {
        let target = self.clamp_target(target);
        match self.targets.iter_mut().find(|t| t.id == target.id) {
            Some(existing) => *existing = target,
            None => self.targets.push(target),
        }
        self.route_dirty = true;
    }

    /// Removes a target by id. Returns false if it was not present.
    pub fn remove_target(&mut self, id: &str) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        let removed = self.targets.len() != before;
        if removed {
            self.route_dirty = true;
        }
        removed
    }

    pub fn clear_targets(&mut self) {
        if !self.targets.is_empty() {
            self.targets.clear();
            self.route_dirty = true;
        }
    }

    // =========================================================================
    // == Outputs ==
    // =========================================================================

    pub fn true_pose(&self) -> Pose {
        self.true_pose
    }

    /// The fix from this tick's readings, or `None` when estimation failed.
    pub fn estimated_pose(&self) -> Option<Pose> {
        self.estimated_pose
    }

    /// The best pose available: this tick's estimate, else the last estimate,
    /// else ground truth.
    pub fn navigation_pose(&self) -> NavigationPose {
        if let Some(pose) = self.estimated_pose {
            NavigationPose {
                pose,
                source: PoseSource::Estimated,
            }
        } else if let Some(pose) = self.last_known_pose {
            NavigationPose {
                pose,
                source: PoseSource::LastKnown,
            }
        } else {
            NavigationPose {
                pose: self.true_pose,
                source: PoseSource::GroundTruth,
            }
        }
    }

    pub fn readings(&self) -> &[RangeReading] {
        &self.readings
    }

    pub fn last_fix(&self) -> Option<&PositionFix> {
        self.last_fix.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Incremented every time the route polyline actually changes.
    pub fn route_revision(&self) -> u64 {
        self.route_revision
    }

    pub fn replan_pending(&self) -> bool {
        self.route_dirty
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn facility(&self) -> &FacilityModel {
        &self.facility
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            true_pose: self.true_pose,
            estimated_pose: self.estimated_pose,
            navigation_pose: self.navigation_pose(),
            readings: self.readings.clone(),
            fix: self.last_fix,
            route: self.route.clone(),
            route_revision: self.route_revision,
        }
    }

    // =========================================================================
    // == Internal Chains ==
    // =========================================================================

    /// Simulate ranges from the true pose and solve for a fresh estimate.
    fn run_pose_chain(&mut self) {
        self.readings = self.simulator.simulate(
            &self.true_pose.position,
            &self.facility.beacons,
            &mut self.rng,
        );

        let guess = if self.config.estimator.warm_start {
            self.last_known_pose.map(|p| p.position)
        } else {
            None
        };

        match self.estimator.estimate(&self.readings, guess) {
            Ok(fix) if !(fix.position.x.is_finite() && fix.position.y.is_finite()) => {
                warn!(position = ?fix.position, "estimator returned a non-finite position, falling back");
                self.estimated_pose = None;
                self.last_fix = None;
            }
            Ok(fix) => {
                if fix.status == SolveStatus::DegenerateGeometry {
                    debug!(position = ?fix.position, "degenerate beacon geometry, using partial estimate");
                }
                // Ranging carries no orientation, so heading comes from the agent.
                let pose = Pose::new(fix.position, self.true_pose.heading_deg);
                self.estimated_pose = Some(pose);
                self.last_known_pose = Some(pose);
                self.last_fix = Some(fix);
            }
            Err(err) => {
                debug!(%err, "estimation failed, falling back");
                self.estimated_pose = None;
                self.last_fix = None;
            }
        }
    }

    /// Marks the route dirty when the cell the agent occupies has changed since
    /// the last plan.
    fn refresh_cursor(&mut self) {
        if self.targets.is_empty() && self.route.is_none() {
            return;
        }
        let cursor = self.grid.cell_of(&self.navigation_pose().pose.position);
        if self.planned_cursor != Some(cursor) {
            self.route_dirty = true;
        }
    }

    /// Recomputes the route from the current inputs. Returns true if the
    /// polyline differs from the previous one.
    fn replan(&mut self) -> bool {
        let position = self.navigation_pose().pose.position;
        self.planned_cursor = Some(self.grid.cell_of(&position));

        let next = RoutePlanner::new(&self.grid).plan(&position, &self.targets);
        let changed = match (&self.route, &next) {
            (Some(previous), Some(route)) => !previous.same_path(route),
            (None, None) => false,
            _ => true,
        };

        if let Some(route) = &next {
            let unreachable: Vec<&str> = route.unreachable_targets().collect();
            if !unreachable.is_empty() {
                warn!(?unreachable, "some targets cannot be reached");
            }
        }

        if changed {
            self.route_revision += 1;
            debug!(
                revision = self.route_revision,
                steps = ?next.as_ref().map(|r| r.steps()),
                "route changed"
            );
        }
        // Leg metadata may differ even when the polyline does not.
        self.route = next;
        changed
    }

    fn clamp_target(&self, mut target: Target) -> Target {
        target.position = self.facility.bounds.clamp(target.position);
        target
    }
}
