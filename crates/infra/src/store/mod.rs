//! `User` persistence boundary.
//!
//! The HTTP layer talks to a `UserStore`; the process picks the backend at
//! startup (Postgres in production, in-memory for tests/dev).

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;
pub use r#trait::{StoreError, StoreResult, UserStore};
