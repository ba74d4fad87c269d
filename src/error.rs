use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// ErrorResponse
///
/// The JSON body shape used for every non-2xx response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// ApiError
///
/// The application-wide failure taxonomy. Every handler returns
/// `Result<_, ApiError>`; the `IntoResponse` impl below is the single place
/// where failures are mapped to HTTP statuses and client-visible messages.
///
/// Authentication failures deliberately carry fixed, generic messages so a
/// caller cannot distinguish "unknown email" from "wrong password"
/// (enumeration resistance). Validation failures carry specific, actionable
/// messages. Infrastructure failures are logged server-side with their full
/// cause and surfaced to the client as a bare 500.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: bad field value, schema violation. -> 400
    #[error("{0}")]
    Validation(String),

    /// No token was presented on a protected endpoint. -> 401
    #[error("Authentication required")]
    Unauthenticated,

    /// A token was presented but failed signature or expiry checks. -> 401
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Login mismatch; identical for unknown email and wrong password. -> 401
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Role or ownership check failed. -> 403
    #[error("{0}")]
    Forbidden(&'static str),

    /// Target resource absent. -> 404
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Uniqueness violation (duplicate email). -> 409
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store failure. -> 500, cause logged server-side only.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// Password hashing/verification failure. -> 500
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),

    /// Token signing failure. -> 500
    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthenticated | ApiError::InvalidToken | ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, (*msg).to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Database(e) => {
                tracing::error!("database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Hash(e) => {
                tracing::error!("bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Token(e) => {
                tracing::error!("token signing error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
