//! Shared handler state: the store plus the route prefixes used in logs.

use std::sync::Arc;

use user_service_core::{DomainResult, VERSION, v1_prefix, v2_prefix};
use user_service_infra::UserStore;

/// Mount points of both route versions, derived from the service version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// v1 collection path, e.g. `/api/v001`.
    pub v1: String,
    /// v2 prefix, e.g. `/api/v0.0`; the resource lives below it at `/users`.
    pub v2: String,
}

impl Routes {
    pub fn for_version(version: &str) -> DomainResult<Self> {
        Ok(Self {
            v1: v1_prefix(version)?,
            v2: v2_prefix(version)?,
        })
    }

    pub fn current() -> DomainResult<Self> {
        Self::for_version(VERSION)
    }

    pub fn v2_users(&self) -> String {
        format!("{}/users", self.v2)
    }
}

pub struct AppServices {
    store: Arc<dyn UserStore>,
    routes: Routes,
}

impl AppServices {
    pub fn new(store: Arc<dyn UserStore>, routes: Routes) -> Self {
        Self { store, routes }
    }

    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }
}
