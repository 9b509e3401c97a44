//! Route tables for both API versions.

pub mod common;
pub mod system;
pub mod v1;
pub mod v2;
