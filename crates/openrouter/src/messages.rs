//! Wire types for `POST /chat/completions`.

use serde::{Deserialize, Serialize};

/// Sampling temperature used for caption generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.55;

/// Upper bound on generated tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 450;

/// What the caller wants generated.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatCompletionBody<'a> {
    pub fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        }
    }
}

/// Successful response envelope. Only the first choice is read.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ChoiceMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// Message content is either plain text or a list of content parts.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text(String),
    Typed { text: String },
    Other(serde_json::Value),
}

impl ContentPart {
    fn text(&self) -> &str {
        match self {
            ContentPart::Text(text) | ContentPart::Typed { text } => text,
            ContentPart::Other(_) => "",
        }
    }
}

impl ChatCompletionResponse {
    /// Reply text of the first choice; parts are joined with newlines.
    /// A missing choice or null content reads as empty text.
    pub fn reply_text(&self) -> String {
        let Some(content) = self
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
        else {
            return String::new();
        };

        match content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .map(ContentPart::text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Pull a human-readable message out of an error body: `error.message`,
/// then a top-level `message`.
pub fn upstream_error_message(body: &serde_json::Value) -> Option<String> {
    body.pointer("/error/message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| body.get("message").and_then(serde_json::Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> ChatCompletionResponse {
        serde_json::from_value(value).expect("envelope should deserialize")
    }

    #[test]
    fn request_body_carries_both_messages() {
        let request = CompletionRequest::new("sys", "usr");
        let body = serde_json::to_value(ChatCompletionBody::new("openai/gpt-4o-mini", &request))
            .unwrap();

        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert_eq!(body["max_tokens"], 450);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "sys");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "usr");
    }

    #[test]
    fn reply_text_reads_string_content() {
        let resp = parse(json!({
            "choices": [{ "message": { "role": "assistant", "content": "{\"captions\":[]}" } }]
        }));
        assert_eq!(resp.reply_text(), "{\"captions\":[]}");
    }

    #[test]
    fn reply_text_joins_content_parts() {
        let resp = parse(json!({
            "choices": [{ "message": { "content": [
                { "type": "text", "text": "first" },
                "second",
                { "type": "image_url", "image_url": {} },
                7
            ] } }]
        }));
        assert_eq!(resp.reply_text(), "first\nsecond\n\n");
    }

    #[test]
    fn reply_text_empty_without_choices_or_content() {
        assert_eq!(parse(json!({})).reply_text(), "");
        assert_eq!(parse(json!({ "choices": [] })).reply_text(), "");
        assert_eq!(
            parse(json!({ "choices": [{ "message": { "content": null } }] })).reply_text(),
            ""
        );
    }

    #[test]
    fn upstream_error_message_prefers_nested() {
        let body = json!({ "error": { "message": "Invalid model" }, "message": "outer" });
        assert_eq!(upstream_error_message(&body).as_deref(), Some("Invalid model"));

        let body = json!({ "message": "Rate limited" });
        assert_eq!(upstream_error_message(&body).as_deref(), Some("Rate limited"));

        assert_eq!(upstream_error_message(&json!({ "error": 3 })), None);
    }
}
