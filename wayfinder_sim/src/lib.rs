// wayfinder_sim/src/lib.rs

// Headless host for the navigation engine: scenario loading plus a scripted,
// clocked driver loop. `main.rs` only wires these together.
pub mod cli;
pub mod config;
pub mod driver;
