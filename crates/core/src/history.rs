//! Caption history records and their read projection.
//!
//! A [`HistoryRecord`] is written once per successful generation and never
//! updated. Listing returns [`HistoryItem`]s, most recent first.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::caption::{CaptionCandidate, GenerationRequest};
use crate::error::CoreError;
use crate::types::Timestamp;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Largest page size a caller may ask for.
pub const MAX_HISTORY_LIMIT: u32 = 30;

/// Resolve the requested page size, applying the default.
pub fn resolve_limit(limit: Option<u32>) -> Result<u32, CoreError> {
    match limit {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(n) if (1..=MAX_HISTORY_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(CoreError::Validation(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT} (got {n})"
        ))),
    }
}

/// Snapshot of one successful generation, as persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub product_name: String,
    pub product_description: String,
    pub platforms: Vec<String>,
    pub tone: String,
    pub caption_style: String,
    pub language: String,
    pub captions: Vec<CaptionCandidate>,
    pub preview_text: String,
    pub created_at: Timestamp,
}

impl HistoryRecord {
    /// Build the record for a generation, stamped with the current time.
    ///
    /// Returns `None` when no candidate has caption text, in which case
    /// nothing should be written.
    pub fn from_generation(
        request: &GenerationRequest,
        captions: &[CaptionCandidate],
    ) -> Option<Self> {
        let captions: Vec<CaptionCandidate> = captions
            .iter()
            .filter_map(|c| {
                let caption = c.caption.trim();
                (!caption.is_empty()).then(|| CaptionCandidate::new(caption, c.hashtags.trim()))
            })
            .collect();

        let preview_text = captions.first()?.caption.clone();

        Some(Self {
            product_name: request.product_name.trim().to_string(),
            product_description: trimmed(request.product_description.as_deref()),
            platforms: request
                .platforms
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            tone: request.tone.trim().to_string(),
            caption_style: trimmed(request.caption_style.as_deref()),
            language: trimmed(request.language.as_deref()),
            captions,
            preview_text,
            created_at: Utc::now(),
        })
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.unwrap_or_default().trim().to_string()
}

/// One entry of the recent-history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    /// Store-assigned document id.
    pub id: String,
    /// Preview text: the first caption of the generation.
    pub text: String,
    /// Hashtags of the first caption.
    pub hashtags: String,
    pub captions: Vec<CaptionCandidate>,
    pub product_name: String,
    pub platforms: Vec<String>,
    pub tone: String,
    pub caption_style: String,
    pub language: String,
    /// RFC 3339 creation time as reported by the store.
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            product_name: "  Desk Lamp ".to_string(),
            product_description: Some(" Warm light ".to_string()),
            platforms: vec!["instagram".to_string(), "  ".to_string(), " x ".to_string()],
            tone: "calm".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_limit_defaults_and_bounds() {
        assert_eq!(resolve_limit(None).unwrap(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(resolve_limit(Some(1)).unwrap(), 1);
        assert_eq!(resolve_limit(Some(30)).unwrap(), 30);
        assert_matches!(resolve_limit(Some(0)), Err(CoreError::Validation(_)));
        assert_matches!(resolve_limit(Some(31)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn record_trims_fields_and_drops_blank_platforms() {
        let captions = vec![CaptionCandidate::new("First", "#one")];
        let record = HistoryRecord::from_generation(&request(), &captions).unwrap();

        assert_eq!(record.product_name, "Desk Lamp");
        assert_eq!(record.product_description, "Warm light");
        assert_eq!(record.platforms, vec!["instagram", "x"]);
        assert_eq!(record.caption_style, "");
        assert_eq!(record.language, "");
        assert_eq!(record.preview_text, "First");
    }

    #[test]
    fn record_skips_blank_captions() {
        let captions = vec![
            CaptionCandidate::new("  ", "#skip"),
            CaptionCandidate::new("Second", " #two "),
        ];
        let record = HistoryRecord::from_generation(&request(), &captions).unwrap();

        assert_eq!(record.captions, vec![CaptionCandidate::new("Second", "#two")]);
        assert_eq!(record.preview_text, "Second");
    }

    #[test]
    fn no_record_without_captions() {
        assert!(HistoryRecord::from_generation(&request(), &[]).is_none());
        let blank = vec![CaptionCandidate::new("", "#a")];
        assert!(HistoryRecord::from_generation(&request(), &blank).is_none());
    }

    #[test]
    fn item_serializes_camel_case() {
        let item = HistoryItem {
            id: "abc".into(),
            text: "Hi".into(),
            hashtags: "#h".into(),
            captions: vec![CaptionCandidate::new("Hi", "#h")],
            product_name: "Lamp".into(),
            platforms: vec!["x".into()],
            tone: "calm".into(),
            caption_style: String::new(),
            language: String::new(),
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productName"], "Lamp");
        assert_eq!(json["createdAt"], "2026-01-01T00:00:00Z");
        assert_eq!(json["captions"][0]["caption"], "Hi");
    }
}
