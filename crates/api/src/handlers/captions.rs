//! Handlers for caption generation and history.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use scrollstop_core::caption::GenerationRequest;
use scrollstop_core::history::resolve_limit;
use scrollstop_core::normalizer::normalize;
use scrollstop_core::prompt::CaptionPrompt;
use scrollstop_db::HistoryError;
use scrollstop_openrouter::CompletionRequest;
use serde::Deserialize;

use crate::background::history::spawn_history_write;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{CaptionsResponse, HistoryResponse};
use crate::state::AppState;

/// Query parameters for `GET /captions/recent`.
#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<u32>,
}

/// POST /captions
///
/// Validates the request, asks the model for captions, normalizes the reply
/// and returns up to three candidates. The history write is detached and
/// cannot change the response.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> AppResult<Json<CaptionsResponse>> {
    let Json(input) = payload?;
    input.validate_input()?;

    let client = state
        .completions
        .as_ref()
        .ok_or(AppError::MissingServerConfig("OPENROUTER_API_KEY"))?;

    let prompt = CaptionPrompt::for_request(&input);
    let reply = client
        .complete(&CompletionRequest::new(prompt.system, prompt.user))
        .await?;
    let captions = normalize(&reply)?;

    tracing::info!(
        user_id = %auth.user_id,
        count = captions.len(),
        "Captions generated"
    );

    let body = CaptionsResponse { captions };
    spawn_history_write(state.history.as_ref(), &auth.user_id, &input, &body.captions);

    Ok(Json(body))
}

/// GET /captions/recent?limit=N
///
/// Lists the caller's most recent generations, newest first.
pub async fn recent(
    auth: AuthUser,
    State(state): State<AppState>,
    params: Result<Query<RecentParams>, QueryRejection>,
) -> AppResult<Json<HistoryResponse>> {
    let Query(params) = params?;
    let limit = resolve_limit(params.limit)?;

    let store = state.history.as_ref().ok_or_else(|| {
        AppError::HistoryUnavailable(HistoryError::Config(
            "history store not configured".into(),
        ))
    })?;

    let items = store.recent(&auth.user_id, limit).await?;
    tracing::debug!(user_id = %auth.user_id, limit, count = items.len(), "Listed caption history");

    Ok(Json(HistoryResponse { items }))
}
