// wayfinder_core/src/mapping/mod.rs

//! Turns the static facility layout into a representation the planner can search.

mod occupancy_grid;

pub use occupancy_grid::OccupancyGrid;
