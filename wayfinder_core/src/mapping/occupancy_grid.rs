// wayfinder_core/src/mapping/occupancy_grid.rs

use crate::facility::{FacilityBounds, FacilityModel, ObstacleRegion};
use crate::types::{GridCell, Point2D};
use serde::{Deserialize, Serialize};

/// Represents the walkability map for path planning.
/// `true` = walkable, `false` = blocked. Stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// An all-walkable grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![true; width * height],
        }
    }

    /// Rasterizes every obstacle of the facility onto a fresh grid.
    pub fn from_facility(facility: &FacilityModel) -> Self {
        Self::build(&facility.bounds, facility.obstacles())
    }

    /// Starts all-walkable and blocks the integer bounding box of each region:
    /// floor on the low edge, ceil on the (exclusive) high edge, clamped to the grid.
    pub fn build<'a>(
        bounds: &FacilityBounds,
        obstacles: impl IntoIterator<Item = &'a ObstacleRegion>,
    ) -> Self {
        let mut grid = Self::new(bounds.width as usize, bounds.height as usize);
        for region in obstacles {
            grid.block_region(region);
        }
        grid
    }

    fn block_region(&mut self, region: &ObstacleRegion) {
        let (min, max) = region.extent();
        let x0 = clamp_index(min.x.floor(), self.width);
        let x1 = clamp_index(max.x.ceil(), self.width);
        let y0 = clamp_index(min.y.floor(), self.height);
        let y1 = clamp_index(max.y.ceil(), self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                self.cells[y * self.width + x] = false;
            }
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks if grid coordinates are within the defined bounds.
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= 0 && cell.x < self.width as isize && cell.y >= 0 && cell.y < self.height as isize
    }

    /// Out of bounds is considered blocked.
    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.contains(cell) && self.cells[cell.y as usize * self.width + cell.x as usize]
    }

    pub fn set_walkable(&mut self, cell: GridCell, walkable: bool) {
        if self.contains(cell) {
            self.cells[cell.y as usize * self.width + cell.x as usize] = walkable;
        }
    }

    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// The cell a point falls into after clamping and rounding to the nearest index.
    pub fn cell_of(&self, point: &Point2D) -> GridCell {
        let max_x = self.width.saturating_sub(1) as f64;
        let max_y = self.height.saturating_sub(1) as f64;
        GridCell::new(
            point.x.round().clamp(0.0, max_x) as isize,
            point.y.round().clamp(0.0, max_y) as isize,
        )
    }

    /// Converts grid coordinates to the world position of the cell.
    /// Cell `(x, y)` sits at integer coordinates, matching `cell_of`.
    pub fn cell_center(&self, cell: GridCell) -> Point2D {
        Point2D::new(cell.x as f64, cell.y as f64)
    }

    /// In-bounds walkable neighbors in the fixed order +x, -x, +y, -y.
    pub fn walkable_neighbors(&self, cell: GridCell) -> impl Iterator<Item = GridCell> + '_ {
        const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        DIRECTIONS
            .into_iter()
            .map(move |(dx, dy)| GridCell::new(cell.x + dx, cell.y + dy))
            .filter(move |next| self.is_walkable(*next))
    }

    /// Renders the grid as text, `.` walkable and `#` blocked. Handy in test failures.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in self.cells.chunks(self.width.max(1)) {
            out.extend(row.iter().map(|&c| if c { '.' } else { '#' }));
            out.push('\n');
        }
        out
    }
}

fn clamp_index(value: f64, len: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        (value as usize).min(len)
    }
}
