//! Mapping of failures onto HTTP responses.
//!
//! Every error answers with a bare status code and an empty body; the cause
//! only goes to the logs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use user_service_core::DomainError;
use user_service_infra::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request could not be bound to the expected shape.
    #[error("can't parse query: {0}")]
    Bind(String),

    /// The request was well-formed but failed validation.
    #[error("query is not valid: {0}")]
    Invalid(String),

    #[error("user not found")]
    NotFound,

    #[error("store failure: {0}")]
    Store(String),
}

impl ApiError {
    pub fn bind(msg: impl Into<String>) -> Self {
        Self::Bind(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Bind(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Validation(msg) => ApiError::Invalid(msg),
            StoreError::Database(msg) => ApiError::Store(msg),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Invalid(msg),
            DomainError::InvalidId(msg) => ApiError::Bind(msg),
            DomainError::NotFound => ApiError::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::bind("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Invalid("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Store("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_errors_map_onto_api_errors() {
        assert_eq!(ApiError::from(StoreError::NotFound), ApiError::NotFound);
        assert_eq!(
            ApiError::from(StoreError::Validation("bad".into())),
            ApiError::Invalid("bad".into())
        );
        assert_eq!(
            ApiError::from(StoreError::Database("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_ids_are_bind_failures() {
        let err = ApiError::from(DomainError::invalid_id("UserId: nope"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Bind(_)));
    }

    #[tokio::test]
    async fn error_responses_have_empty_bodies() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert!(body.is_empty());
    }
}
