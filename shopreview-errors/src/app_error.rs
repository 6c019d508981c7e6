use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Sign-in required")]
    Unauthenticated,

    #[error("Not allowed: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data store call failed: {0}")]
    Remote(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Missing session or missing capability. Both are recoverable by signing in
    /// with the right account.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Forbidden(_))
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
            Self::Unauthenticated => "Please sign in to continue.",
            Self::Forbidden(_) => "You are not allowed to do that.",
            Self::NotFound(_) => "That review or shop could not be found.",
            Self::Remote(_) => "The service is having trouble. Please try again.",
            Self::Internal(_) => "Something went wrong on our side. Please try again later.",
        }
    }
}

#[cfg(feature = "server")]
mod server_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        error: &'static str,
        message: String,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AppError::Forbidden(_) => StatusCode::FORBIDDEN,
                AppError::NotFound(_) => StatusCode::NOT_FOUND,
                AppError::Remote(_) => StatusCode::BAD_GATEWAY,
                AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }

        fn code(&self) -> &'static str {
            match self {
                AppError::Validation(_) => "VALIDATION_ERROR",
                AppError::Unauthenticated | AppError::Forbidden(_) => "AUTH_ERROR",
                AppError::NotFound(_) => "NOT_FOUND",
                AppError::Remote(_) => "REMOTE_ERROR",
                AppError::Internal(_) => "INTERNAL_ERROR",
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            if status.is_server_error() {
                tracing::error!(error = %self, "request failed");
            }
            let body = ErrorResponse {
                error: self.code(),
                message: self.user_message().to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}
