// wayfinder_core/src/planning/snap.rs

//! Maps continuous points onto walkable grid cells.
//!
//! The point is clamped into the grid and rounded. If that cell is blocked,
//! Chebyshev rings of growing radius are searched around it. Within a ring the
//! walkable cell with the smallest Manhattan distance to the rounded cell wins,
//! and remaining ties go to the first cell in row-major order.

use crate::mapping::OccupancyGrid;
use crate::types::{GridCell, Point2D};

/// Snaps `point` to the nearest walkable cell, or `None` if the grid has none.
pub fn snap_to_walkable(grid: &OccupancyGrid, point: &Point2D) -> Option<GridCell> {
    let center = grid.cell_of(point);
    nearest_walkable(grid, center)
}

/// Ring search around `center`. Returns `center` itself when it is walkable.
pub fn nearest_walkable(grid: &OccupancyGrid, center: GridCell) -> Option<GridCell> {
    if grid.is_walkable(center) {
        return Some(center);
    }

    let max_radius = grid.width().max(grid.height()) as isize;
    for r in 1..=max_radius {
        let mut best: Option<(usize, GridCell)> = None;
        // Row-major scan so the first minimum is the row-then-column tie-break.
        for dy in -r..=r {
            // Top and bottom rows are walked in full, other rows only at their two ends.
            let dx_step = if dy.abs() == r { 1 } else { 2 * r as usize };
            for dx in (-r..=r).step_by(dx_step) {
                let cell = GridCell::new(center.x + dx, center.y + dy);
                if !grid.is_walkable(cell) {
                    continue;
                }
                let d = cell.manhattan(&center);
                if best.map_or(true, |(best_d, _)| d < best_d) {
                    best = Some((d, cell));
                }
            }
        }
        if let Some((_, cell)) = best {
            return Some(cell);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(grid: &mut OccupancyGrid, x0: isize, y0: isize, x1: isize, y1: isize) {
        for y in y0..y1 {
            for x in x0..x1 {
                grid.set_walkable(GridCell::new(x, y), false);
            }
        }
    }

    #[test]
    fn test_walkable_point_rounds_in_place() {
        let grid = OccupancyGrid::new(10, 10);
        assert_eq!(
            snap_to_walkable(&grid, &Point2D::new(3.4, 6.6)),
            Some(GridCell::new(3, 7))
        );
    }

    #[test]
    fn test_out_of_bounds_point_is_clamped_first() {
        let grid = OccupancyGrid::new(10, 10);
        assert_eq!(
            snap_to_walkable(&grid, &Point2D::new(-4.0, 15.0)),
            Some(GridCell::new(0, 9))
        );
    }

    #[test]
    fn test_blocked_point_prefers_edge_neighbor_over_corner() {
        let mut grid = OccupancyGrid::new(10, 10);
        // Block the center and every edge neighbor except the one below it.
        block(&mut grid, 4, 4, 7, 6);
        // Rows 4 and 5 are blocked across x = 4..7; (5,6) stays open.
        assert_eq!(
            nearest_walkable(&grid, GridCell::new(5, 5)),
            Some(GridCell::new(5, 6))
        );
    }

    #[test]
    fn test_ties_go_to_row_major_first() {
        let mut grid = OccupancyGrid::new(10, 10);
        grid.set_walkable(GridCell::new(5, 5), false);
        // All four edge neighbors are at distance 1; (5,4) comes first in row-major order.
        assert_eq!(
            nearest_walkable(&grid, GridCell::new(5, 5)),
            Some(GridCell::new(5, 4))
        );
    }

    #[test]
    fn test_search_reaches_outer_rings() {
        let mut grid = OccupancyGrid::new(12, 12);
        block(&mut grid, 2, 2, 10, 10);
        // Open cells start four rings out, at x = 10 and y = 10. (10,6) and (6,10)
        // tie on distance and (10,6) comes first in row-major order.
        assert_eq!(
            nearest_walkable(&grid, GridCell::new(6, 6)),
            Some(GridCell::new(10, 6))
        );
    }

    /// Nearest walkable cell by exhaustive scan: ring, then Manhattan distance,
    /// then row, then column.
    fn nearest_by_scan(grid: &OccupancyGrid, center: GridCell) -> Option<GridCell> {
        (0..grid.height() as isize)
            .flat_map(|y| (0..grid.width() as isize).map(move |x| GridCell::new(x, y)))
            .filter(|c| grid.is_walkable(*c))
            .min_by_key(|c| (c.chebyshev(&center), c.manhattan(&center), c.y, c.x))
    }

    #[test]
    fn test_ring_walk_matches_exhaustive_scan() {
        let mut grid = OccupancyGrid::new(15, 13);
        for y in 0..13 {
            for x in 0..15 {
                if (x * 7 + y * 13) % 5 != 0 {
                    grid.set_walkable(GridCell::new(x, y), false);
                }
            }
        }
        for y in 0..13 {
            for x in 0..15 {
                let center = GridCell::new(x, y);
                assert_eq!(
                    nearest_walkable(&grid, center),
                    nearest_by_scan(&grid, center),
                    "center {center:?}"
                );
            }
        }
    }

    #[test]
    fn test_single_open_corner_on_large_grid() {
        let mut grid = OccupancyGrid::new(200, 150);
        block(&mut grid, 0, 0, 200, 150);
        grid.set_walkable(GridCell::new(199, 0), true);
        assert_eq!(
            snap_to_walkable(&grid, &Point2D::new(0.0, 149.0)),
            Some(GridCell::new(199, 0))
        );
    }

    #[test]
    fn test_fully_blocked_grid_fails() {
        let mut grid = OccupancyGrid::new(4, 4);
        block(&mut grid, 0, 0, 4, 4);
        assert_eq!(snap_to_walkable(&grid, &Point2D::new(1.0, 1.0)), None);
    }
}
