// wayfinder_core/src/models/mod.rs

// Sensor models that turn ground truth into measurements.
pub mod ranging;
