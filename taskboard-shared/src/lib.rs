//! # Taskboard Shared Library
//!
//! This crate contains the domain types and persistence layer used by the
//! Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: Entity records, creation payloads and field descriptor tables
//! - `patch`: Partial patch validation
//! - `engine`: The generic partial update engine
//! - `store`: Document store port with PostgreSQL and in-memory adapters
//! - `db`: Connection pool and migrations

pub mod db;
pub mod engine;
pub mod models;
pub mod patch;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
