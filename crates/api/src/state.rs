use std::sync::Arc;

use scrollstop_db::HistoryStore;
use scrollstop_openrouter::CompletionClient;

use crate::auth::TokenVerifier;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Bearer-token verifier used by the auth extractor.
    pub verifier: Arc<dyn TokenVerifier>,
    /// Generation API client; `None` when no API key is configured.
    pub completions: Option<Arc<dyn CompletionClient>>,
    /// History store; `None` when no store credentials are configured.
    pub history: Option<Arc<dyn HistoryStore>>,
}
