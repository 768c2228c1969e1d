// wayfinder_core/src/lib.rs

// Public modules of the positioning and routing library.
pub mod config;
pub mod engine;
pub mod error;
pub mod estimation;
pub mod facility;
pub mod mapping;
pub mod messages;
pub mod models;
pub mod planning;
pub mod prelude;
pub mod types;
