use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// The one message every login failure collapses into, so that "no such
/// user" and "wrong password" are indistinguishable to the client.
pub const GENERIC_AUTH_ERROR: &str = "Invalid username/email or password";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Registration failed")]
    Duplicate(FieldError),

    #[error("{GENERIC_AUTH_ERROR}")]
    AuthenticationFailed,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Internal server error")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Duplicate(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidToken => StatusCode::FORBIDDEN,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire shape for every failure: `{success:false, message, errors?}`.
#[derive(Debug, Serialize)]
struct FailureBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(source) = &self {
            // Logged server-side only; the client gets the opaque message.
            error!(error = %source, "internal error");
        }
        let errors = match &self {
            Self::Validation(errors) => Some(errors.clone()),
            Self::Duplicate(err) => Some(vec![err.clone()]),
            _ => None,
        };
        let body = FailureBody {
            success: false,
            message: self.to_string(),
            errors,
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn auth_failure_is_generic_401_without_field_errors() {
        let (status, body) = body_json(ApiError::AuthenticationFailed).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], GENERIC_AUTH_ERROR);
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn validation_failure_lists_field_errors() {
        let errors = vec![FieldError::new(
            "username",
            "Username must be 3-30 characters long",
        )];
        let (status, body) = body_json(ApiError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "username");
        assert_eq!(
            body["errors"][0]["message"],
            "Username must be 3-30 characters long"
        );
    }

    #[tokio::test]
    async fn duplicate_reports_single_field_error() {
        let err = ApiError::Duplicate(FieldError::new("email", "An account with this email already exists"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Registration failed");
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn token_errors_split_401_and_403() {
        let (status, body) = body_json(ApiError::MissingToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Access token required");

        let (status, body) = body_json(ApiError::InvalidToken).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let err = ApiError::internal(anyhow::anyhow!("connection refused to db at 10.0.0.3"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(!body.to_string().contains("10.0.0.3"));
    }
}
