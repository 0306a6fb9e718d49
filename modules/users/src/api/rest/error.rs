use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::domain::error::DomainError;

/// Generic body for every failure the server does not classify.
pub const UNEXPECTED_MESSAGE: &str = "unexpected server error";

/// Error taxonomy as seen on the wire: each kind has a fixed status and a
/// `{"message": ...}` body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation on `name`.
    #[error("{0}")]
    Constraint(String),

    #[error("{0}")]
    NotFound(String),

    /// Internal detail is logged, never returned.
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Constraint(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message written to the response body.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::Constraint(m) | Self::NotFound(m) => m,
            Self::Unexpected(_) => UNEXPECTED_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Unexpected(detail) => {
                tracing::error!(error = %detail, "Unexpected error while handling request");
            }
            other => {
                tracing::debug!(status = status.as_u16(), error = %other, "Request failed");
            }
        }
        (status, Json(json!({ "message": self.public_message() }))).into_response()
    }
}

/// Map domain error to the wire taxonomy
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UserNotFound { .. } => Self::NotFound(e.to_string()),
            DomainError::NameAlreadyExists { .. } => Self::Constraint(e.to_string()),
            DomainError::Validation { message } => Self::Validation(message),
            DomainError::InvalidFilter { .. } => Self::Validation(e.to_string()),
            DomainError::Database { .. } => Self::Unexpected(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// JSON body extractor whose rejections go through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections go through [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::ObjectId;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn domain_errors_map_to_taxonomy() {
        let id = ObjectId::generate();
        assert_eq!(
            ApiError::from(DomainError::user_not_found(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(DomainError::name_already_exists("Alice".into())).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(DomainError::validation("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DomainError::invalid_filter("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(DomainError::database("disk I/O error")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn known_kinds_carry_their_message() {
        let (status, body) = body_of(ApiError::validation("Field \"name\" is required")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Field \"name\" is required" }));
    }

    #[tokio::test]
    async fn unexpected_errors_hide_detail() {
        let (status, body) =
            body_of(DomainError::database("connection refused at 10.0.0.1").into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": UNEXPECTED_MESSAGE }));
    }
}
