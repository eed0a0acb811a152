//! service-core: Shared infrastructure for the check-in services.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;
