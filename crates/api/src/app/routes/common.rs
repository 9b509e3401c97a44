//! Binding helpers and the store calls shared by both route versions.

use axum::{
    extract::{
        Json, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};

use user_service_core::{NewUser, User, UserFilter, UserId, UserPatch};
use user_service_infra::UserStore;

use crate::app::errors::ApiError;

/// Log the entry of a handler.
pub fn called(route: &str, handler: &'static str) {
    tracing::info!(route, handler, "{handler} has been called");
}

/// Log the outcome of a handler and turn it into a response.
pub fn respond<T: IntoResponse>(
    route: &str,
    handler: &'static str,
    result: Result<T, ApiError>,
) -> Response {
    match result {
        Ok(body) => {
            tracing::info!(route, handler, "OK");
            body.into_response()
        }
        Err(err) => {
            tracing::error!(route, handler, status = err.status().as_u16(), "{err}");
            err.into_response()
        }
    }
}

pub fn bind_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bind(rejection.body_text()))
}

pub fn bind_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::bind(rejection.body_text()))
}

pub fn bind_id(path: Result<Path<String>, PathRejection>) -> Result<UserId, ApiError> {
    let Path(raw) = path.map_err(|rejection| ApiError::bind(rejection.body_text()))?;
    Ok(raw.parse::<UserId>()?)
}

pub fn require_id(id: Option<UserId>) -> Result<UserId, ApiError> {
    id.ok_or_else(|| ApiError::bind("missing ID"))
}

pub async fn list_users(
    store: &dyn UserStore,
    filter: UserFilter,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(store.list(&filter).await?))
}

pub async fn create_user(store: &dyn UserStore, new: NewUser) -> Result<Json<User>, ApiError> {
    new.validate()?;
    Ok(Json(store.create(new).await?))
}

pub async fn get_user(store: &dyn UserStore, id: UserId) -> Result<Json<User>, ApiError> {
    Ok(Json(store.get(id).await?))
}

pub async fn update_user(
    store: &dyn UserStore,
    id: UserId,
    patch: UserPatch,
) -> Result<Json<User>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::Invalid("no fields to update".to_string()));
    }
    Ok(Json(store.update(id, &patch).await?))
}

pub async fn delete_user(store: &dyn UserStore, id: UserId) -> Result<(), ApiError> {
    store.delete(id).await?;
    Ok(())
}
