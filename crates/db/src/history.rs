//! Per-user caption history.
//!
//! Documents live at `users/{uid}/caption_history/{auto-id}`. Writes encode a
//! [`HistoryRecord`] as typed field values; reads list the newest documents
//! and project them into [`HistoryItem`]s.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{StatusCode, Url};
use scrollstop_core::caption::{non_blank, CaptionCandidate};
use scrollstop_core::history::{HistoryItem, HistoryRecord};

use crate::credentials::{ServiceAccountCredentials, DATASTORE_SCOPE};
use crate::error::HistoryError;
use crate::value::{text_field, Document, Fields, ListDocumentsResponse, Value};

/// Timeout for every store request, token exchange included.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(15);

/// Sub-collection under each user document.
pub const HISTORY_COLLECTION: &str = "caption_history";

/// Default Firestore REST base URL.
pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Storage for generation history, scoped per user.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Persist one generation for `user_id`.
    async fn record(&self, user_id: &str, record: &HistoryRecord) -> Result<(), HistoryError>;

    /// Up to `limit` items for `user_id`, most recent first.
    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<HistoryItem>, HistoryError>;
}

/// Where the history documents live.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    pub base_url: String,
}

impl FirestoreConfig {
    /// Resolve the project from an explicit id or, failing that, the
    /// credentials. Blank values count as absent.
    pub fn resolve(
        project_id: Option<&str>,
        database_id: Option<&str>,
        credentials: &ServiceAccountCredentials,
    ) -> Result<Self, HistoryError> {
        let project_id = non_blank(project_id)
            .or_else(|| non_blank(credentials.project_id.as_deref()))
            .ok_or_else(|| HistoryError::Config("Firebase project_id missing".into()))?;

        Ok(Self {
            project_id: project_id.to_string(),
            database_id: non_blank(database_id).unwrap_or(DEFAULT_DATABASE).to_string(),
            base_url: DEFAULT_FIRESTORE_URL.to_string(),
        })
    }

    /// URL of a user's history collection; every segment is percent-encoded.
    pub fn collection_url(&self, user_id: &str) -> Result<Url, HistoryError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| HistoryError::Config(format!("invalid Firestore URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| HistoryError::Config("Firestore URL cannot be a base".into()))?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                self.database_id.as_str(),
                "documents",
                "users",
                user_id.trim(),
                HISTORY_COLLECTION,
            ]);
        Ok(url)
    }
}

/// [`HistoryStore`] backed by the Firestore REST API.
pub struct FirestoreHistoryStore {
    client: reqwest::Client,
    credentials: ServiceAccountCredentials,
    config: FirestoreConfig,
}

impl FirestoreHistoryStore {
    pub fn new(
        credentials: ServiceAccountCredentials,
        config: FirestoreConfig,
    ) -> Result<Self, HistoryError> {
        let client = reqwest::Client::builder().timeout(STORE_TIMEOUT).build()?;
        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    async fn access_token(&self) -> Result<String, HistoryError> {
        self.credentials
            .fetch_access_token(&self.client, DATASTORE_SCOPE)
            .await
    }
}

#[async_trait]
impl HistoryStore for FirestoreHistoryStore {
    async fn record(&self, user_id: &str, record: &HistoryRecord) -> Result<(), HistoryError> {
        ensure_user(user_id)?;
        let url = self.config.collection_url(user_id)?;
        let token = self.access_token().await?;

        let body = serde_json::json!({ "fields": encode_record(record) });
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Store {
                operation: "write",
                status: status.as_u16(),
            });
        }

        tracing::debug!(user_id, "Caption history written");
        Ok(())
    }

    async fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<HistoryItem>, HistoryError> {
        ensure_user(user_id)?;
        let url = self.config.collection_url(user_id)?;
        let token = self.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("pageSize", limit.to_string().as_str()),
                ("orderBy", "createdAt desc"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(HistoryError::Store {
                operation: "read",
                status: status.as_u16(),
            });
        }

        let listing: ListDocumentsResponse = response.json().await?;
        Ok(project_documents(&listing.documents))
    }
}

fn ensure_user(user_id: &str) -> Result<(), HistoryError> {
    if user_id.trim().is_empty() {
        return Err(HistoryError::MissingUser);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Typed document fields for a record.
pub fn encode_record(record: &HistoryRecord) -> Fields {
    let captions = record
        .captions
        .iter()
        .map(|c| {
            Value::map(Fields::from([
                ("caption".to_string(), Value::string(&c.caption)),
                ("hashtags".to_string(), Value::string(&c.hashtags)),
            ]))
        })
        .collect();

    Fields::from([
        ("productName".to_string(), Value::string(&record.product_name)),
        (
            "productDescription".to_string(),
            Value::string(&record.product_description),
        ),
        (
            "platforms".to_string(),
            Value::array(record.platforms.iter().map(Value::string).collect()),
        ),
        ("tone".to_string(), Value::string(&record.tone)),
        ("captionStyle".to_string(), Value::string(&record.caption_style)),
        ("language".to_string(), Value::string(&record.language)),
        ("captions".to_string(), Value::array(captions)),
        ("previewText".to_string(), Value::string(&record.preview_text)),
        (
            "createdAt".to_string(),
            Value::timestamp(record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ),
    ])
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project listed documents into items, in listing order, skipping those
/// with no preview text.
pub fn project_documents(documents: &[Document]) -> Vec<HistoryItem> {
    documents.iter().filter_map(project_document).collect()
}

fn project_document(doc: &Document) -> Option<HistoryItem> {
    let fields = &doc.fields;

    let captions: Vec<CaptionCandidate> = fields
        .get("captions")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_map)
        .filter_map(|entry| {
            let caption = text_field(entry, "caption");
            (!caption.is_empty())
                .then(|| CaptionCandidate::new(caption, text_field(entry, "hashtags")))
        })
        .collect();

    let mut text = text_field(fields, "previewText").to_string();
    if text.is_empty() {
        text = captions.first().map(|c| c.caption.clone()).unwrap_or_default();
    }
    if text.is_empty() {
        return None;
    }

    let platforms = fields
        .get("platforms")
        .and_then(Value::as_array)
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_text)
        .filter(|p| !p.trim().is_empty())
        .map(String::from)
        .collect();

    let created_at = match text_field(fields, "createdAt") {
        "" => doc.create_time.as_deref().unwrap_or_default().trim().to_string(),
        at => at.to_string(),
    };

    Some(HistoryItem {
        id: doc.id().to_string(),
        text,
        hashtags: captions
            .first()
            .map(|c| c.hashtags.clone())
            .unwrap_or_default(),
        captions,
        product_name: text_field(fields, "productName").to_string(),
        platforms,
        tone: text_field(fields, "tone").to_string(),
        caption_style: text_field(fields, "captionStyle").to_string(),
        language: text_field(fields, "language").to_string(),
        created_at,
    })
}
