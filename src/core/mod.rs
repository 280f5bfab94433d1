// CoursePulse - core/mod.rs
//
// Core business logic layer: metrics, aggregation, ranking, outliers and
// model selection over already-loaded tables.
// Must NOT depend on: platform, app, or open files directly.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod models;
pub mod opportunity;
pub mod outliers;
pub mod summary;
