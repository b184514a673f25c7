/// Database layer for Taskboard
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool creation, health check and shutdown
/// - `migrations`: Embedded schema migrations
///
/// The document store itself lives in `store::postgres`.

pub mod migrations;
pub mod pool;
