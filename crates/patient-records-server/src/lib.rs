//! Patient Records HTTP server.
//!
//! A thin JSON layer over [`patient_records_core::PatientStore`]. Handlers
//! translate requests into store calls and store results into responses;
//! validation, identifier assignment and reporting all live in the core
//! crate.

pub mod api;
pub mod config;

pub use api::router::api_router;
pub use config::{Cli, ServerConfig};
