/// Persistence layer for TaskFlow
///
/// # Modules
///
/// - `store`: the `Store` / `StoreTx` seam every service goes through
/// - `postgres`: PostgreSQL implementation of the seam
/// - `memory`: in-process implementation for tests and development
/// - `pool`: connection pool creation and health checks
/// - `migrations`: embedded schema migrations

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;
