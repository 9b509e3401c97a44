//! Infrastructure layer: configuration loading and `User` persistence.

pub mod config;
pub mod store;

pub use config::{ApiContext, ConfigError, Configuration, DbContext, StorageKind};
pub use store::{InMemoryUserStore, PostgresUserStore, StoreError, StoreResult, UserStore};
