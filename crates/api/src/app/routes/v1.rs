//! v1: every verb on one collection path. `PUT` and `DELETE` find their
//! target through the `ID` carried in the request.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        Extension, Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
    routing::{MethodRouter, get},
};

use user_service_core::{NewUser, User, UserFilter, UserId};

use crate::app::dto::{UpdateUserRequest, UserIdRequest};
use crate::app::errors::ApiError;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> MethodRouter {
    get(get_users)
        .post(create_user)
        .put(update_user)
        .delete(delete_user)
}

pub async fn get_users(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<UserFilter>, QueryRejection>,
) -> Response {
    let route = services.routes().v1.as_str();
    common::called(route, "get_users");

    let result = async {
        let filter = common::bind_query(query)?;
        common::list_users(services.store(), filter).await
    };
    common::respond(route, "get_users", result.await)
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Response {
    let route = services.routes().v1.as_str();
    common::called(route, "create_user");

    let result = async {
        let new = common::bind_json(body)?;
        common::create_user(services.store(), new).await
    };
    common::respond(route, "create_user", result.await)
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Response {
    let route = services.routes().v1.as_str();
    common::called(route, "update_user");

    let result = update(&services, body).await;
    common::respond(route, "update_user", result)
}

async fn update(
    services: &AppServices,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let request = common::bind_json(body)?;
    let id = common::require_id(request.id)?;
    common::update_user(services.store(), id, request.patch).await
}

/// The target id comes from the JSON body when one is sent, otherwise from
/// the query string.
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<UserIdRequest>, QueryRejection>,
    body: Bytes,
) -> Response {
    let route = services.routes().v1.as_str();
    common::called(route, "delete_user");

    let result = async {
        let id = delete_target(query, &body)?;
        common::delete_user(services.store(), id).await?;
        Ok::<_, ApiError>(StatusCode::NO_CONTENT)
    };
    common::respond(route, "delete_user", result.await)
}

fn delete_target(
    query: Result<Query<UserIdRequest>, QueryRejection>,
    body: &[u8],
) -> Result<UserId, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        common::bind_query(query)?
    } else {
        serde_json::from_slice::<UserIdRequest>(body).map_err(|e| ApiError::bind(e.to_string()))?
    };
    common::require_id(request.id)
}
