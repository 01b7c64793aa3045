use axum::routing::{get, post};
use axum::Router;

use crate::handlers::captions;
use crate::state::AppState;

/// Mount caption routes (nested under `/captions`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(captions::generate))
        .route("/recent", get(captions::recent))
}
