//! Type definitions for the [OpenAI Responses API](https://platform.openai.com/docs/api-reference/responses)
//! as exposed by OpenRouter.
//!
//! Every object keeps the fields it doesn't model in a flattened `extra` map so
//! a response survives a deserialize/serialize cycle without losing data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::Message;

// ---------------------------------------------------------------------------
// Request types (what we send TO the routing service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponsesRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub input: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

// ---------------------------------------------------------------------------
// Response types (what we receive FROM the routing service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    /// Precomputed concatenation of all output text, when the service sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ResponseUsage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<OutputContent>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputItem {
    /// An assistant `message` item carrying the given content.
    #[must_use]
    pub fn message(content: Vec<OutputContent>) -> Self {
        Self {
            item_type: "message".to_string(),
            role: Some("assistant".to_string()),
            content: Some(content),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn is_message(&self) -> bool {
        self.item_type == "message"
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputContent {
    pub fn output_text(text: impl Into<String>) -> Self {
        Self {
            content_type: "output_text".to_string(),
            text: Some(text.into()),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn is_output_text(&self) -> bool {
        self.content_type == "output_text"
    }
}

/// Token accounting. The Responses API reports `input_tokens` / `output_tokens`;
/// older consumers expect `prompt_tokens` / `completion_tokens`, which end up in
/// `extra` when a provider sends them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseUsage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseUsage {
    #[must_use]
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: Some(input_tokens.saturating_add(output_tokens)),
            extra: Map::new(),
        }
    }

    /// Prompt-side tokens under either naming convention.
    #[must_use]
    pub fn prompt_tokens(&self) -> u64 {
        self.extra
            .get("prompt_tokens")
            .and_then(Value::as_u64)
            .or(self.input_tokens)
            .unwrap_or(0)
    }

    /// Completion-side tokens under either naming convention.
    #[must_use]
    pub fn completion_tokens(&self) -> u64 {
        self.extra
            .get("completion_tokens")
            .and_then(Value::as_u64)
            .or(self.output_tokens)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_tokens
            .unwrap_or_else(|| self.prompt_tokens().saturating_add(self.completion_tokens()))
    }
}
