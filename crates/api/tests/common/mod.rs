#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use scrollstop_api::auth::{AuthError, TokenVerifier};
use scrollstop_api::config::{FirebaseSettings, OpenRouterSettings, ServerConfig};
use scrollstop_api::router::build_app_router;
use scrollstop_api::state::AppState;
use scrollstop_core::caption::CaptionCandidate;
use scrollstop_core::history::{HistoryItem, HistoryRecord};
use scrollstop_core::types::UserId;
use scrollstop_db::{HistoryError, HistoryStore};
use scrollstop_openrouter::{CompletionClient, CompletionRequest, OpenRouterError};
use tower::ServiceExt;

/// Token accepted by [`StaticVerifier`] for [`TEST_USER`].
pub const TEST_TOKEN: &str = "valid-token";
pub const TEST_USER: &str = "user-1";

/// Second identity, for isolation checks.
pub const OTHER_TOKEN: &str = "other-token";
pub const OTHER_USER: &str = "user-2";

/// Build a test `ServerConfig` with safe defaults and no secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_url: "http://localhost:3000".to_string(),
        openrouter: OpenRouterSettings {
            api_key: None,
            model: "openai/gpt-4o-mini".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        },
        firebase: FirebaseSettings {
            project_id: Some("scrollstop-test".to_string()),
            credentials_b64: None,
            firestore_database: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Verifier with a fixed token table.
pub struct StaticVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self {
            tokens: HashMap::from([
                (TEST_TOKEN.to_string(), TEST_USER.to_string()),
                (OTHER_TOKEN.to_string(), OTHER_USER.to_string()),
            ]),
        }
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AuthError::UnknownKey("test".into()))
    }
}

/// Completion client returning a canned reply and counting calls.
pub struct ScriptedCompletions {
    reply: Result<String, (u16, String)>,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl ScriptedCompletions {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err((status, message.to_string())),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletions {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, OpenRouterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err((status, message)) => Err(OpenRouterError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// In-memory history store, newest first on read.
#[derive(Default)]
pub struct MemoryHistoryStore {
    records: Mutex<HashMap<String, Vec<HistoryRecord>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self, user_id: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .get(user_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn record(&self, user_id: &str, record: &HistoryRecord) -> Result<(), HistoryError> {
        self.records
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<HistoryItem>, HistoryError> {
        let records = self.records.lock().unwrap();
        let items = records
            .get(user_id)
            .map(|list| {
                list.iter()
                    .enumerate()
                    .rev()
                    .take(limit as usize)
                    .map(|(i, r)| item_from_record(format!("doc-{i}"), r))
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }
}

fn item_from_record(id: String, record: &HistoryRecord) -> HistoryItem {
    HistoryItem {
        id,
        text: record.preview_text.clone(),
        hashtags: record
            .captions
            .first()
            .map(|c| c.hashtags.clone())
            .unwrap_or_default(),
        captions: record.captions.clone(),
        product_name: record.product_name.clone(),
        platforms: record.platforms.clone(),
        tone: record.tone.clone(),
        caption_style: record.caption_style.clone(),
        language: record.language.clone(),
        created_at: record.created_at.to_rfc3339(),
    }
}

/// Store whose every call fails, counting attempted writes.
#[derive(Default)]
pub struct FailingHistoryStore {
    writes: AtomicUsize,
}

impl FailingHistoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryStore for FailingHistoryStore {
    async fn record(&self, _user_id: &str, _record: &HistoryRecord) -> Result<(), HistoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(HistoryError::Store {
            operation: "write",
            status: 503,
        })
    }

    async fn recent(&self, _user_id: &str, _limit: u32) -> Result<Vec<HistoryItem>, HistoryError> {
        Err(HistoryError::Store {
            operation: "read",
            status: 503,
        })
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build the full application router around the given collaborators, using
/// the same middleware stack production uses.
pub fn build_test_app(
    completions: Option<Arc<dyn CompletionClient>>,
    history: Option<Arc<dyn HistoryStore>>,
) -> Router {
    let config = test_config();
    let state = AppState {
        config: Arc::new(config.clone()),
        verifier: Arc::new(StaticVerifier::new()),
        completions,
        history,
    };
    build_app_router(state, &config)
}

/// A valid generation request body.
pub fn generation_body() -> serde_json::Value {
    serde_json::json!({
        "productName": "Desk Lamp",
        "productDescription": "Warm dimmable light",
        "platforms": ["instagram", "tiktok"],
        "tone": "playful"
    })
}

/// The two-caption model reply used across tests, wrapped in a code fence.
pub const FENCED_REPLY: &str = "```json\n{\"captions\":[{\"caption\":\"Light up\",\"hashtags\":\"#lamp\"},{\"caption\":\"Tired eyes?\",\"hashtags\":\"\"}]}\n```";

pub fn expected_candidates() -> Vec<CaptionCandidate> {
    vec![
        CaptionCandidate::new("Light up", "#lamp"),
        CaptionCandidate::new("Tired eyes?", ""),
    ]
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Let detached tasks run to completion.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
