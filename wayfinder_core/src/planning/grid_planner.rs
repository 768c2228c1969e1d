// wayfinder_core/src/planning/grid_planner.rs

use super::astar;
use crate::mapping::OccupancyGrid;
use crate::types::GridCell;
use tracing::trace;

/// Shortest paths on the occupancy grid: 4-connected, unit step cost,
/// Manhattan heuristic.
#[derive(Debug, Clone, Copy)]
pub struct GridPathfinder<'a> {
    grid: &'a OccupancyGrid,
}

impl<'a> GridPathfinder<'a> {
    pub fn new(grid: &'a OccupancyGrid) -> Self {
        Self { grid }
    }

    /// Generates neighbors for a grid cell, checking bounds and obstacles.
    fn get_grid_neighbors(&self, node: &GridCell) -> Vec<(GridCell, u32)> {
        self.grid
            .walkable_neighbors(*node)
            .map(|next| (next, 1))
            .collect()
    }

    /// Finds a path from `start` to `goal`, both inclusive.
    ///
    /// The inputs are used as given: a blocked or out-of-bounds endpoint, or a
    /// goal cut off by obstacles, yields an empty path.
    pub fn find_path(&self, start: GridCell, goal: GridCell) -> Vec<GridCell> {
        if !self.grid.is_walkable(start) || !self.grid.is_walkable(goal) {
            trace!(?start, ?goal, "endpoint not walkable");
            return Vec::new();
        }

        let mut neighbor_fn = |node: &GridCell| self.get_grid_neighbors(node);
        let heuristic = |node: &GridCell| node.manhattan(&goal) as u32;

        match astar::plan(&start, &goal, heuristic, &mut neighbor_fn) {
            Some(path) => path,
            None => {
                trace!(?start, ?goal, "goal unreachable");
                Vec::new()
            }
        }
    }
}

/// Number of steps in a cell path (cells minus one).
pub fn path_steps(path: &[GridCell]) -> usize {
    path.len().saturating_sub(1)
}

/// True when every consecutive pair differs by one cell along one axis.
pub fn is_contiguous(path: &[GridCell]) -> bool {
    path.windows(2).all(|w| w[0].is_adjacent(&w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled_grid() -> OccupancyGrid {
        // A vertical wall at x = 3 with a single gap at y = 6.
        let mut grid = OccupancyGrid::new(8, 8);
        for y in 0..8 {
            if y != 6 {
                grid.set_walkable(GridCell::new(3, y), false);
            }
        }
        grid
    }

    #[test]
    fn test_empty_grid_path_is_manhattan_and_contiguous() {
        let grid = OccupancyGrid::new(10, 10);
        let path = GridPathfinder::new(&grid).find_path(GridCell::new(0, 0), GridCell::new(5, 5));
        assert_eq!(path_steps(&path), 10);
        assert!(is_contiguous(&path));
        assert_eq!(path[0], GridCell::new(0, 0));
        assert_eq!(path[10], GridCell::new(5, 5));
    }

    #[test]
    fn test_path_threads_the_gap() {
        let grid = walled_grid();
        let path = GridPathfinder::new(&grid).find_path(GridCell::new(0, 0), GridCell::new(7, 0));
        assert!(is_contiguous(&path));
        assert!(path.contains(&GridCell::new(3, 6)));
        assert!(path.iter().all(|c| grid.is_walkable(*c)));
        // 7 across, 6 down and 6 back up
        assert_eq!(path_steps(&path), 19);
    }

    #[test]
    fn test_enclosed_goal_gives_empty_path() {
        let mut grid = OccupancyGrid::new(9, 9);
        for (x, y) in [
            (5, 5), (6, 5), (7, 5),
            (5, 6),         (7, 6),
            (5, 7), (6, 7), (7, 7),
        ] {
            grid.set_walkable(GridCell::new(x, y), false);
        }
        let path = GridPathfinder::new(&grid).find_path(GridCell::new(0, 0), GridCell::new(6, 6));
        assert!(path.is_empty());
    }

    #[test]
    fn test_blocked_endpoints_give_empty_path() {
        let grid = walled_grid();
        let finder = GridPathfinder::new(&grid);
        assert!(finder.find_path(GridCell::new(3, 0), GridCell::new(0, 0)).is_empty());
        assert!(finder.find_path(GridCell::new(0, 0), GridCell::new(3, 0)).is_empty());
        assert!(finder.find_path(GridCell::new(0, 0), GridCell::new(-1, 0)).is_empty());
    }

    #[test]
    fn test_start_equals_goal_is_single_cell() {
        let grid = OccupancyGrid::new(4, 4);
        let path = GridPathfinder::new(&grid).find_path(GridCell::new(2, 2), GridCell::new(2, 2));
        assert_eq!(path, vec![GridCell::new(2, 2)]);
    }
}
