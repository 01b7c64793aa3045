//! Prompt assembly for caption generation.
//!
//! The system instruction is fixed; the user instruction is one line per
//! request attribute, with defaults filled in for anything the caller left
//! out.

use crate::caption::{non_blank, GenerationRequest};

/// Default output language.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Default caption style label.
pub const DEFAULT_CAPTION_STYLE: &str = "General ad caption";

/// Default caption length limit in characters.
pub const DEFAULT_MAX_CAPTION_CHARS: u32 = 140;

/// Default number of hashtags per caption.
pub const DEFAULT_HASHTAG_COUNT: u32 = 8;

const SYSTEM_PROMPT: &[&str] = &[
    "You are an expert social media direct-response ad copywriter.",
    "Task: generate short-form ad captions for social platforms.",
    "Important:",
    "- Do NOT invent product features or claims not provided by the user.",
    "- If product details are missing, keep claims generic (e.g., \"everyday protection\").",
    "- Keep language natural, conversion-oriented, and platform-appropriate.",
    "",
    "Output rules:",
    "- Return ONLY valid JSON (no markdown, no extra text).",
    "- Provide exactly 3 caption options.",
    "- Each option must be meaningfully different in angle:",
    "  1) Feature/benefit focused",
    "  2) Problem/solution or pain-point hook",
    "  3) Urgency/offer/CTA focused (even if generic)",
    "",
    "JSON schema:",
    "{ \"captions\": [ { \"caption\": \"string\", \"hashtags\": \"#tag1 #tag2 ...\" } ] }",
];

/// The two instructions sent to the completion API for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionPrompt {
    pub system: String,
    pub user: String,
}

impl CaptionPrompt {
    pub fn for_request(request: &GenerationRequest) -> Self {
        Self {
            system: system_prompt(),
            user: user_prompt(request),
        }
    }
}

pub fn system_prompt() -> String {
    SYSTEM_PROMPT.join("\n")
}

pub fn user_prompt(req: &GenerationRequest) -> String {
    let mut lines = vec![
        format!(
            "Language: {}",
            non_blank(req.language.as_deref()).unwrap_or(DEFAULT_LANGUAGE)
        ),
        format!("Target platforms: {}", req.platforms.join(", ")),
        format!("Tone: {}", req.tone),
        format!(
            "Caption style: {}",
            non_blank(req.caption_style.as_deref()).unwrap_or(DEFAULT_CAPTION_STYLE)
        ),
        format!(
            "Max caption length: {} characters",
            req.max_caption_chars.unwrap_or(DEFAULT_MAX_CAPTION_CHARS)
        ),
        format!(
            "Hashtag count: {}",
            req.hashtag_count.unwrap_or(DEFAULT_HASHTAG_COUNT)
        ),
        format!(
            "Emojis: {}",
            if req.include_emojis.unwrap_or(false) {
                "Allowed (keep minimal)"
            } else {
                "None"
            }
        ),
        format!(
            "CTA: {}",
            non_blank(req.cta.as_deref())
                .unwrap_or("Not provided (use a generic CTA like \"Shop now\")")
        ),
        format!(
            "Audience: {}",
            non_blank(req.audience.as_deref()).unwrap_or("Not provided")
        ),
    ];

    if let Some(claims) = avoid_claims_text(req) {
        lines.push(format!("Avoid claims/words: {claims}"));
    }

    lines.push(format!("Product name: {}", req.product_name.trim()));
    lines.push(format!(
        "Product description: {}",
        non_blank(req.product_description.as_deref()).unwrap_or("Not provided.")
    ));
    lines.push("Goal: drive clicks/conversions and improve in-platform discoverability.".into());
    lines.push(
        "Include one explicit search keyword phrase in each caption in the requested language."
            .into(),
    );

    lines.join("\n")
}

/// Comma-joined, trimmed claims to avoid; `None` when nothing is left.
fn avoid_claims_text(req: &GenerationRequest) -> Option<String> {
    let claims: Vec<&str> = req
        .avoid_claims
        .iter()
        .flatten()
        .map(|claim| claim.trim())
        .filter(|claim| !claim.is_empty())
        .collect();

    (!claims.is_empty()).then(|| claims.join(", "))
}
