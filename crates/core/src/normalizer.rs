//! Normalization of free-form model output into caption candidates.
//!
//! The model is asked for `{"captions": [{"caption": .., "hashtags": ..}]}`
//! but replies vary: fenced code blocks, prose around the object, missing or
//! mistyped fields. [`normalize`] recovers what it can and fails with a
//! [`NormalizeError`] otherwise. It never echoes the raw text in its errors.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::caption::CaptionCandidate;

/// At most this many candidates are kept from a single reply.
pub const MAX_CAPTIONS: usize = 3;

/// A whole reply wrapped in a fenced block: opening fence with an optional
/// format tag (` ```json `), the body, and a closing fence at the very end.
static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[A-Za-z0-9_+.-]*[ \t]*\r?\n?(.*?)```\z").expect("valid regex")
});

/// Why a reply could not be turned into captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("AI response empty")]
    EmptyUpstreamResponse,

    #[error("AI response not valid JSON")]
    UnparsableUpstreamResponse,

    #[error("No captions returned")]
    NoCaptionsProduced,
}

/// Extract up to [`MAX_CAPTIONS`] caption candidates from a model reply.
///
/// Candidates keep the order in which they appear in the reply. Entries that
/// are not objects or whose trimmed caption is empty are skipped.
pub fn normalize(raw: &str) -> Result<Vec<CaptionCandidate>, NormalizeError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(NormalizeError::EmptyUpstreamResponse);
    }

    let text = strip_fenced_block(text);
    let payload = parse_payload(text)?;

    let captions = collect_captions(&payload);
    if captions.is_empty() {
        return Err(NormalizeError::NoCaptionsProduced);
    }
    Ok(captions)
}

/// Return the body of a fenced block, or the input unchanged when it is not
/// wrapped in one. The result is trimmed.
pub fn strip_fenced_block(text: &str) -> &str {
    match FENCED_BLOCK_RE.captures(text).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str().trim(),
        None => text,
    }
}

/// Parse the reply as a JSON object, falling back to the outermost `{...}`
/// span when the text carries prose around it.
fn parse_payload(text: &str) -> Result<Map<String, Value>, NormalizeError> {
    if let Some(object) = parse_object(text) {
        return Ok(object);
    }

    let (Some(first), Some(last)) = (text.find('{'), text.rfind('}')) else {
        return Err(NormalizeError::UnparsableUpstreamResponse);
    };
    if first >= last {
        return Err(NormalizeError::UnparsableUpstreamResponse);
    }

    parse_object(&text[first..=last]).ok_or(NormalizeError::UnparsableUpstreamResponse)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn collect_captions(payload: &Map<String, Value>) -> Vec<CaptionCandidate> {
    let entries: &[Value] = match payload.get("captions") {
        Some(Value::Array(entries)) => entries,
        _ => &[],
    };

    entries
        .iter()
        .filter_map(candidate_from_entry)
        .take(MAX_CAPTIONS)
        .collect()
}

fn candidate_from_entry(entry: &Value) -> Option<CaptionCandidate> {
    let Value::Object(fields) = entry else {
        return None;
    };

    let caption = text_field(fields, "caption");
    if caption.is_empty() {
        return None;
    }
    let hashtags = text_field(fields, "hashtags");

    Some(CaptionCandidate::new(caption, hashtags))
}

/// Trimmed string value of `key`; missing or non-string values read as empty.
fn text_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    match fields.get(key) {
        Some(Value::String(text)) => text.trim(),
        _ => "",
    }
}
