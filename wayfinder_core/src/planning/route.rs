// wayfinder_core/src/planning/route.rs

use super::grid_planner::{path_steps, GridPathfinder};
use super::snap::snap_to_walkable;
use crate::mapping::OccupancyGrid;
use crate::messages::Target;
use crate::types::{GridCell, Point2D};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One greedy hop of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub target_id: String,
    /// The target's snapped cell.
    pub goal: GridCell,
    /// Number of cells this leg contributed to the polyline.
    pub cell_count: usize,
    pub reachable: bool,
}

/// A complete route covering every current target, in visit order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Route {
    pub polyline: Vec<GridCell>,
    pub legs: Vec<RouteLeg>,
}

impl Route {
    /// Pointwise comparison of the polylines. Leg metadata is ignored.
    pub fn same_path(&self, other: &Route) -> bool {
        self.polyline == other.polyline
    }

    /// Length of the polyline in grid steps.
    pub fn steps(&self) -> usize {
        path_steps(&self.polyline)
    }

    /// Target ids in the order the planner chose to visit them.
    pub fn visit_order(&self) -> impl Iterator<Item = &str> {
        self.legs.iter().map(|leg| leg.target_id.as_str())
    }

    pub fn unreachable_targets(&self) -> impl Iterator<Item = &str> {
        self.legs
            .iter()
            .filter(|leg| !leg.reachable)
            .map(|leg| leg.target_id.as_str())
    }

    /// The polyline as facility coordinates.
    pub fn world_points(&self, grid: &OccupancyGrid) -> Vec<Point2D> {
        self.polyline.iter().map(|&c| grid.cell_center(c)).collect()
    }
}

/// Greedy nearest-neighbor multi-waypoint planner.
#[derive(Debug, Clone, Copy)]
pub struct RoutePlanner<'a> {
    grid: &'a OccupancyGrid,
}

impl<'a> RoutePlanner<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self { grid }
    }

    /// Plans from a continuous agent position. Returns `None` when there are no
    /// targets or the agent cannot be placed on a walkable cell.
    pub fn plan(&self, agent: &Point2D, targets: &[Target]) -> Option<Route> {
        if targets.is_empty() {
            return None;
        }
        let Some(start) = snap_to_walkable(self.grid, agent) else {
            warn!(?agent, "agent position cannot be snapped to a walkable cell");
            return None;
        };
        self.plan_from_cell(start, targets)
    }

    /// Plans from an already snapped start cell.
    pub fn plan_from_cell(&self, start: GridCell, targets: &[Target]) -> Option<Route> {
        if targets.is_empty() {
            return None;
        }

        // Snap every target once, keeping input order for tie-breaking.
        let mut remaining: Vec<(&Target, GridCell)> = targets
            .iter()
            .filter_map(|target| match snap_to_walkable(self.grid, &target.position) {
                Some(cell) => Some((target, cell)),
                None => {
                    warn!(target_id = %target.id, "target cannot be snapped, skipping");
                    None
                }
            })
            .collect();

        let pathfinder = GridPathfinder::new(self.grid);
        let mut route = Route::default();
        let mut cursor = start;

        while !remaining.is_empty() {
            // min_by_key returns the first minimum, which is the input-order tie-break.
            let next = remaining
                .iter()
                .enumerate()
                .min_by_key(|(_, (_, cell))| cell.manhattan(&cursor))
                .map(|(i, _)| i)
                .unwrap_or(0);
            let (target, goal) = remaining.remove(next);

            let path = pathfinder.find_path(cursor, goal);
            let reachable = !path.is_empty();
            let before = route.polyline.len();

            if reachable {
                // Every leg after the first starts on the previous cursor cell.
                let skip = usize::from(!route.legs.is_empty());
                route.polyline.extend_from_slice(&path[skip..]);
            } else {
                debug!(target_id = %target.id, ?cursor, ?goal, "leg unreachable, skipping its geometry");
            }

            route.legs.push(RouteLeg {
                target_id: target.id.clone(),
                goal,
                cell_count: route.polyline.len() - before,
                reachable,
            });
            cursor = goal;
        }

        Some(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::grid_planner::is_contiguous;

    fn target(id: &str, x: f64, y: f64) -> Target {
        Target::new(id, Point2D::new(x, y), id.to_uppercase())
    }

    /// 20x20 grid with an unbroken ring around (15,15).
    fn ringed_grid() -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(20, 20);
        for x in 13..=17 {
            for y in 13..=17 {
                if x == 13 || x == 17 || y == 13 || y == 17 {
                    grid.set_walkable(GridCell::new(x, y), false);
                }
            }
        }
        grid
    }

    #[test]
    fn test_no_targets_gives_no_route() {
        let grid = OccupancyGrid::new(5, 5);
        assert!(RoutePlanner::new(&grid).plan(&Point2D::origin(), &[]).is_none());
    }

    #[test]
    fn test_greedy_order_and_joint_dedup() {
        let grid = OccupancyGrid::new(10, 10);
        let targets = vec![target("far", 9.0, 0.0), target("near", 3.0, 0.0)];
        let route = RoutePlanner::new(&grid)
            .plan(&Point2D::origin(), &targets)
            .unwrap();

        let order: Vec<&str> = route.visit_order().collect();
        assert_eq!(order, vec!["near", "far"]);
        // 0..=9 along the top row, with the joint at x = 3 appearing once.
        assert_eq!(route.polyline.len(), 10);
        assert_eq!(route.steps(), 9);
        assert!(is_contiguous(&route.polyline));
        assert_eq!(route.legs[0].cell_count, 4);
        assert_eq!(route.legs[1].cell_count, 6);
    }

    #[test]
    fn test_ties_follow_input_order() {
        let grid = OccupancyGrid::new(11, 11);
        let targets = vec![target("east", 8.0, 5.0), target("west", 2.0, 5.0)];
        let route = RoutePlanner::new(&grid)
            .plan(&Point2D::new(5.0, 5.0), &targets)
            .unwrap();
        assert_eq!(route.legs[0].target_id, "east");
    }

    #[test]
    fn test_unreachable_target_keeps_other_legs() {
        let grid = ringed_grid();
        let targets = vec![target("enclosed", 15.0, 15.0), target("open", 4.0, 0.0)];
        let route = RoutePlanner::new(&grid)
            .plan(&Point2D::origin(), &targets)
            .unwrap();

        assert_eq!(route.legs.len(), 2);
        assert_eq!(route.legs[0].target_id, "open");
        assert!(route.legs[0].reachable);
        assert_eq!(route.legs[0].cell_count, 5);

        assert_eq!(route.legs[1].target_id, "enclosed");
        assert!(!route.legs[1].reachable);
        assert_eq!(route.legs[1].cell_count, 0);
        assert_eq!(route.legs[1].goal, GridCell::new(15, 15));

        let unreachable: Vec<&str> = route.unreachable_targets().collect();
        assert_eq!(unreachable, vec!["enclosed"]);
        assert_eq!(route.polyline.last(), Some(&GridCell::new(4, 0)));
    }

    #[test]
    fn test_cursor_advances_past_unreachable_leg() {
        let grid = ringed_grid();
        // "a" is enclosed; "b" sits next to it inside the same enclosure and is
        // reached from the advanced cursor.
        let targets = vec![
            target("open", 2.0, 0.0),
            target("a", 15.0, 15.0),
            target("b", 16.0, 15.0),
        ];
        let route = RoutePlanner::new(&grid)
            .plan(&Point2D::origin(), &targets)
            .unwrap();

        let order: Vec<&str> = route.visit_order().collect();
        assert_eq!(order, vec!["open", "a", "b"]);
        assert!(!route.legs[1].reachable);
        assert_eq!(route.legs[1].cell_count, 0);
        assert!(route.legs[2].reachable);
        assert_eq!(route.legs[2].cell_count, 1);

        // The unreachable target's cell never enters the polyline.
        assert!(!route.polyline.contains(&GridCell::new(15, 15)));
        assert_eq!(
            route.polyline,
            vec![
                GridCell::new(0, 0),
                GridCell::new(1, 0),
                GridCell::new(2, 0),
                GridCell::new(16, 15)
            ]
        );
    }

    #[test]
    fn test_unreachable_first_leg_drops_next_leg_start() {
        let grid = ringed_grid();
        let route = RoutePlanner::new(&grid)
            .plan_from_cell(
                GridCell::new(0, 0),
                &[target("a", 15.0, 15.0), target("b", 16.0, 15.0)],
            )
            .unwrap();
        assert!(!route.legs[0].reachable);
        assert_eq!(route.polyline, vec![GridCell::new(16, 15)]);
    }

    #[test]
    fn test_blocked_target_is_snapped() {
        let mut grid = OccupancyGrid::new(10, 10);
        grid.set_walkable(GridCell::new(6, 0), false);
        let route = RoutePlanner::new(&grid)
            .plan(&Point2D::origin(), &[target("shelf", 6.0, 0.0)])
            .unwrap();
        // Edge neighbors (5,0) and (7,0) tie; (5,0) comes first in the row.
        assert_eq!(route.legs[0].goal, GridCell::new(5, 0));
        assert_eq!(route.polyline.last(), Some(&GridCell::new(5, 0)));
    }

    #[test]
    fn test_replanning_is_idempotent() {
        let grid = ringed_grid();
        let targets = vec![
            target("a", 18.0, 2.0),
            target("b", 3.0, 17.0),
            target("c", 10.0, 10.0),
        ];
        let planner = RoutePlanner::new(&grid);
        let first = planner.plan(&Point2D::new(1.0, 1.0), &targets).unwrap();
        let second = planner.plan(&Point2D::new(1.0, 1.0), &targets).unwrap();
        assert!(first.same_path(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_world_points_match_cells() {
        let grid = OccupancyGrid::new(5, 5);
        let route = RoutePlanner::new(&grid)
            .plan(&Point2D::origin(), &[target("t", 0.0, 2.0)])
            .unwrap();
        assert_eq!(
            route.world_points(&grid),
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(0.0, 1.0),
                Point2D::new(0.0, 2.0)
            ]
        );
    }
}
