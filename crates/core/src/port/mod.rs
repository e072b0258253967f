// Port Layer - Interfaces for external dependencies

pub mod ordered_store;
pub mod time_provider;

// Re-exports
pub use ordered_store::OrderedStore;
pub use time_provider::TimeProvider;
