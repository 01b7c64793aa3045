use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scrollstop_core::error::CoreError;
use scrollstop_core::normalizer::NormalizeError;
use scrollstop_db::HistoryError;
use scrollstop_openrouter::OpenRouterError;
use serde_json::json;

/// Message returned for every authentication failure.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

/// Message returned when history cannot be read.
pub const HISTORY_UNAVAILABLE_MESSAGE: &str = "Caption history unavailable";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds the collaborator and
/// HTTP-specific variants. Implements [`IntoResponse`] to produce consistent
/// JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `scrollstop_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The model reply could not be turned into captions.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The generation API call failed.
    #[error(transparent)]
    Upstream(#[from] OpenRouterError),

    /// History could not be read.
    #[error(transparent)]
    HistoryUnavailable(#[from] HistoryError),

    /// A required server secret is not configured. Holds the variable name,
    /// which is logged but never returned.
    #[error("Missing server configuration: {0}")]
    MissingServerConfig(&'static str),

    /// The request body is not the expected JSON.
    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    /// The query string could not be decoded.
    #[error(transparent)]
    Query(#[from] QueryRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// The single rejection used by the auth gate.
    pub fn unauthorized() -> Self {
        AppError::Core(CoreError::Unauthorized(INVALID_TOKEN_MESSAGE.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Core(CoreError::InvalidFields(fields)) = &self {
            let body = json!({
                "error": "Validation failed",
                "code": "VALIDATION_ERROR",
                "details": fields,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    msg.clone(),
                ),
                CoreError::InvalidFields(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    "Validation failed".to_string(),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Generation ---
            AppError::Normalize(err) => {
                let code = match err {
                    NormalizeError::EmptyUpstreamResponse => "EMPTY_UPSTREAM_RESPONSE",
                    NormalizeError::UnparsableUpstreamResponse => "UNPARSABLE_UPSTREAM_RESPONSE",
                    NormalizeError::NoCaptionsProduced => "NO_CAPTIONS_PRODUCED",
                };
                tracing::warn!(error = %err, "Model reply rejected");
                (StatusCode::BAD_REQUEST, code, err.to_string())
            }
            AppError::Upstream(err) => {
                tracing::warn!(error = %err, "Generation request failed");
                (
                    StatusCode::BAD_REQUEST,
                    "UPSTREAM_GENERATION_ERROR",
                    err.client_message().to_string(),
                )
            }
            AppError::MissingServerConfig(name) => {
                tracing::error!(setting = name, "Required server setting is missing");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MISSING_SERVER_CONFIG",
                    "Server is not configured for this operation".to_string(),
                )
            }

            // --- History ---
            AppError::HistoryUnavailable(err) => {
                tracing::warn!(error = %err, "Caption history read failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "HISTORY_UNAVAILABLE",
                    HISTORY_UNAVAILABLE_MESSAGE.to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::JsonBody(rejection) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", rejection.body_text())
            }
            AppError::Query(rejection) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", rejection.body_text())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
