//! Caption generation request and result types.
//!
//! [`GenerationRequest`] is the inbound body of `POST /api/captions`. Its
//! bounds mirror what the frontend form allows; [`validator`] enforces them
//! and [`crate::error::CoreError`] carries the per-field detail back.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum characters in a single platform identifier.
pub const MAX_PLATFORM_LEN: usize = 50;

/// Maximum characters in a single `avoidClaims` entry.
pub const MAX_AVOID_CLAIM_LEN: usize = 40;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A request to generate ad captions for one product.
///
/// Absent fields deserialize to their defaults so that missing required
/// fields surface as validation errors rather than decode errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationRequest {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "not_blank")
    )]
    pub product_name: String,

    #[validate(length(max = 2000))]
    pub product_description: Option<String>,

    #[validate(length(min = 1), custom(function = "platform_entries"))]
    pub platforms: Vec<String>,

    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub tone: String,

    #[validate(length(max = 80))]
    pub caption_style: Option<String>,

    #[validate(length(max = 40))]
    pub language: Option<String>,

    #[validate(range(min = 0, max = 30))]
    pub hashtag_count: Option<u32>,

    #[validate(range(min = 50, max = 400))]
    pub max_caption_chars: Option<u32>,

    pub include_emojis: Option<bool>,

    #[validate(length(max = 120))]
    pub cta: Option<String>,

    #[validate(length(max = 120))]
    pub audience: Option<String>,

    #[validate(
        length(max = 20),
        custom(function = "avoid_claim_entries")
    )]
    pub avoid_claims: Option<Vec<String>>,
}

impl GenerationRequest {
    /// Run every field check, collapsing failures into [`CoreError::InvalidFields`].
    pub fn validate_input(&self) -> Result<(), CoreError> {
        self.validate().map_err(CoreError::from)
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn platform_entries(platforms: &[String]) -> Result<(), ValidationError> {
    each_within(platforms, MAX_PLATFORM_LEN, "platform")
}

fn avoid_claim_entries(claims: &[String]) -> Result<(), ValidationError> {
    each_within(claims, MAX_AVOID_CLAIM_LEN, "avoid_claim")
}

fn each_within(items: &[String], max: usize, code: &'static str) -> Result<(), ValidationError> {
    match items.iter().position(|item| item.chars().count() > max) {
        Some(index) => Err(ValidationError::new(code).with_message(
            format!("entry {index} exceeds {max} characters").into(),
        )),
        None => Ok(()),
    }
}

/// Trimmed view of an optional text field; `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// One caption option returned to the client.
///
/// Both fields are trimmed; `caption` is never empty once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionCandidate {
    pub caption: String,
    pub hashtags: String,
}

impl CaptionCandidate {
    pub fn new(caption: impl Into<String>, hashtags: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            hashtags: hashtags.into(),
        }
    }
}
