//! v2: the same resource addressed by path, `/users` and `/users/:id`.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Extension, Json, Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
    routing::get,
};

use user_service_core::{NewUser, UserFilter, UserPatch};

use crate::app::errors::ApiError;
use crate::app::routes::common;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<UserFilter>, QueryRejection>,
) -> Response {
    let route = services.routes().v2_users();
    common::called(&route, "list_users");

    let result = async {
        let filter = common::bind_query(query)?;
        common::list_users(services.store(), filter).await
    };
    common::respond(&route, "list_users", result.await)
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> Response {
    let route = services.routes().v2_users();
    common::called(&route, "create_user");

    let result = async {
        let new = common::bind_json(body)?;
        let user = common::create_user(services.store(), new).await?;
        Ok::<_, ApiError>((StatusCode::CREATED, user))
    };
    common::respond(&route, "create_user", result.await)
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let route = services.routes().v2_users();
    common::called(&route, "get_user");

    let result = async {
        let id = common::bind_id(path)?;
        common::get_user(services.store(), id).await
    };
    common::respond(&route, "get_user", result.await)
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UserPatch>, JsonRejection>,
) -> Response {
    let route = services.routes().v2_users();
    common::called(&route, "update_user");

    let result = async {
        let id = common::bind_id(path)?;
        let patch = common::bind_json(body)?;
        common::update_user(services.store(), id, patch).await
    };
    common::respond(&route, "update_user", result.await)
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    let route = services.routes().v2_users();
    common::called(&route, "delete_user");

    let result = async {
        let id = common::bind_id(path)?;
        common::delete_user(services.store(), id).await?;
        Ok::<_, ApiError>(StatusCode::NO_CONTENT)
    };
    common::respond(&route, "delete_user", result.await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use user_service_infra::InMemoryUserStore;

    use crate::app::build_app;

    const USERS: &str = "/api/v0.0/users";

    fn app() -> Router {
        build_app(Arc::new(InMemoryUserStore::new())).unwrap()
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn alice() -> Value {
        json!({ "Name": "Alice", "Age": 30, "Email": "alice@example.com", "Address": "1 Main St" })
    }

    #[tokio::test]
    async fn create_answers_created() {
        let app = app();
        let (status, body) = send(&app, Method::POST, USERS, Some(alice())).await;
        assert_eq!(status, StatusCode::CREATED);
        let user: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(user["ID"], 1);
        assert_eq!(user["Address"], "1 Main St");
    }

    #[tokio::test]
    async fn client_supplied_id_is_ignored_on_create() {
        let app = app();
        let mut payload = alice();
        payload["ID"] = json!(77);
        let (status, body) = send(&app, Method::POST, USERS, Some(payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        let user: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(user["ID"], 1);
    }

    #[tokio::test]
    async fn get_by_id() {
        let app = app();
        send(&app, Method::POST, USERS, Some(alice())).await;

        let (status, body) = send(&app, Method::GET, &format!("{USERS}/1"), None).await;
        assert_eq!(status, StatusCode::OK);
        let user: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(user["Email"], "alice@example.com");

        let (status, body) = send(&app, Method::GET, &format!("{USERS}/2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.is_empty());

        let (status, _) = send(&app, Method::GET, &format!("{USERS}/abc"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::GET, &format!("{USERS}/0"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_by_path_id() {
        let app = app();
        send(&app, Method::POST, USERS, Some(alice())).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("{USERS}/1"),
            Some(json!({ "Name": "Alicia", "Email": "alicia@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let user: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(user["Name"], "Alicia");
        assert_eq!(user["Age"], 30);
        assert_eq!(user["Email"], "alicia@example.com");

        let (status, _) =
            send(&app, Method::PUT, &format!("{USERS}/5"), Some(json!({ "Age": 3 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            send(&app, Method::PUT, &format!("{USERS}/1"), Some(json!({ "Age": -3 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_by_path_id_is_soft_and_final() {
        let app = app();
        send(&app, Method::POST, USERS, Some(alice())).await;

        let (status, body) = send(&app, Method::DELETE, &format!("{USERS}/1"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let (status, _) = send(&app, Method::GET, &format!("{USERS}/1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &format!("{USERS}/1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn both_versions_share_one_store() {
        let app = app();
        send(&app, Method::POST, USERS, Some(alice())).await;

        let (status, body) = send(&app, Method::GET, "/api/v001?Name=Alice", None).await;
        assert_eq!(status, StatusCode::OK);
        let users: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn blank_age_filter_lists_everything() {
        let app = app();
        send(&app, Method::POST, USERS, Some(alice())).await;

        let (status, body) = send(&app, Method::GET, &format!("{USERS}?Age="), None).await;
        assert_eq!(status, StatusCode::OK);
        let users: Vec<Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let app = app();
        let (status, _) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
