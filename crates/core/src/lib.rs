//! `user-service-core` — the `User` record and its rules.
//!
//! This crate contains **pure domain** code (no infrastructure concerns):
//! the record shape, create/update/filter payloads, validation, and the
//! service version used to build route prefixes.

pub mod entity;
pub mod error;
pub mod id;
pub mod user;
pub mod version;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::UserId;
pub use user::{NewUser, User, UserFilter, UserPatch, validate_email};
pub use version::{SERVICE_NAME, VERSION, v1_prefix, v2_prefix};
