//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use scrollstop_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer` header.
///
/// Every failure (missing header, wrong scheme, empty or rejected token)
/// yields the same 401 response.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The identity provider's subject for the token.
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        let Some(token) = bearer_token(header) else {
            tracing::debug!("Request without a usable bearer token");
            return Err(AppError::unauthorized());
        };

        let user_id = state.verifier.verify(token).await.map_err(|err| {
            tracing::debug!(error = %err, "Bearer token rejected");
            AppError::unauthorized()
        })?;

        Ok(AuthUser { user_id })
    }
}

/// Token of a `Bearer <token>` header value. The scheme is case-insensitive
/// and any whitespace may separate it from the token.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
