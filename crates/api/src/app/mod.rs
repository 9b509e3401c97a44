//! Router assembly.

use std::sync::Arc;

use axum::{Router, extract::Extension, routing::get};
use tower::ServiceBuilder;

use user_service_core::DomainResult;
use user_service_infra::UserStore;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AppServices, Routes};

/// Build the full router (health + v1 + v2) over `store`.
pub fn build_app(store: Arc<dyn UserStore>) -> DomainResult<Router> {
    Ok(build_app_with_routes(store, Routes::current()?))
}

pub fn build_app_with_routes(store: Arc<dyn UserStore>, mounts: Routes) -> Router {
    let api = Router::new()
        .route(&mounts.v1, routes::v1::router())
        .nest(&mounts.v2, routes::v2::router());

    let services = Arc::new(AppServices::new(store, mounts));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(crate::middleware::log_requests))
                .layer(Extension(services)),
        )
}
