// Waitroom Infrastructure - SQLite Adapter
// Implements: OrderedStore (sorted sets in one table)

mod connection;
mod migration;
mod ordered_store;

pub use connection::create_pool;
pub use migration::run_migrations;
pub use ordered_store::SqliteOrderedStore;

// Note: sqlx::Error conversion is handled by a helper function in ordered_store
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
