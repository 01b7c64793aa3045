pub mod captions;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /captions                generate captions (POST, requires auth)
/// /captions/recent         recent history (GET, requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/captions", captions::router())
}
