//! People Service Library
//!
//! Stores person records and enriches new ones with age, gender and
//! nationality inferred from the first name by external services.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `data`: Data access layer.
//! - `integrations`: External service integrations.
//! - `obs`: Observability and logging.
//! - `cancel`: Request-scoped cancellation and deadlines.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `db_storage`: Person storage and dynamic query building.
//! - `enrichment`: Person workflows (create with enrichment, list, update, delete).
//! - `errors`: Error handling types.
//! - `filter`: Query filters and pagination.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `services`: Enrichment service clients (age, gender, nationality).

pub mod api;
pub mod core;
pub mod data;
pub mod integrations;
pub mod obs;

// Re-export primary modules for shared use in tests and other binaries
pub mod cancel;
pub mod config;
pub mod db;
pub mod db_storage;
pub mod enrichment;
pub mod errors;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod services;
