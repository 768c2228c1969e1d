// wayfinder_core/src/planning/mod.rs

pub mod astar;
pub mod grid_planner;
pub mod route;
pub mod snap;

pub use grid_planner::GridPathfinder;
pub use route::{Route, RouteLeg, RoutePlanner};
pub use snap::snap_to_walkable;
