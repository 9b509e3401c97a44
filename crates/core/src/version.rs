//! Service identity and the URL prefixes derived from its version.

use crate::error::{DomainError, DomainResult};

pub const SERVICE_NAME: &str = "user-service";

/// Semantic version of the service; route prefixes are derived from it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn components(version: &str) -> DomainResult<[&str; 3]> {
    let parts: Vec<&str> = version.split('.').collect();
    match parts.as_slice() {
        [major, minor, patch, ..]
            if !major.is_empty() && !minor.is_empty() && !patch.is_empty() =>
        {
            Ok([*major, *minor, *patch])
        }
        _ => Err(DomainError::validation(format!(
            "version {version:?} must have major.minor.patch components"
        ))),
    }
}

/// Collection prefix of the v1 routes: all three components run together,
/// e.g. `0.0.1` becomes `/api/v001`.
pub fn v1_prefix(version: &str) -> DomainResult<String> {
    let [major, minor, patch] = components(version)?;
    Ok(format!("/api/v{major}{minor}{patch}"))
}

/// Prefix of the v2 routes: major and minor only, e.g. `0.0.1` becomes
/// `/api/v0.0`. The resource is mounted below it at `/users`.
pub fn v2_prefix(version: &str) -> DomainResult<String> {
    let [major, minor, _] = components(version)?;
    Ok(format!("/api/v{major}.{minor}"))
}
