//! HTTP client for the routing service.
//!
//! [`OpenRouterClient::new`] builds a client from an explicit [`ClientConfig`],
//! which is the form to pass around as a dependency. [`shared`] is the
//! process-wide variant: it reads the environment once and hands out the same
//! instance for the life of the process.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Result, RouterError};
use crate::translate::chat_types::{ChatCompletionRequest, ChatCompletionResponse, ErrorResponse};
use crate::translate::responses_types::{Response, ResponsesRequest};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug)]
pub struct OpenRouterClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl OpenRouterClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(config: ClientConfig, timeout: Duration) -> Result<Self> {
        let headers = default_header_map(&config)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        info!(
            base_url = %config.base_url,
            headers = config.default_headers.as_ref().map_or(0, |h| h.len()),
            "Created OpenRouter client"
        );

        Ok(Self { config, http })
    }

    /// Build a client from `OPENROUTER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `POST /responses`
    pub async fn create_response(&self, req: &ResponsesRequest) -> Result<Response> {
        debug!(
            model = %req.model,
            input = req.input.len(),
            has_instructions = req.instructions.is_some(),
            "Creating response"
        );
        self.post_json("responses", req).await
    }

    /// `POST /chat/completions`
    pub async fn chat_completion(
        &self,
        req: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        debug!(model = %req.model, messages = req.messages.len(), "Creating chat completion");
        self.post_json("chat/completions", req).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        debug!(%url, status, body_len = text.len(), "Provider responded");

        if status >= 400 {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate(&text, 500).to_string());
            warn!(%url, status, %message, "Provider returned an error");
            return Err(RouterError::provider(status, message));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

fn default_header_map(config: &ClientConfig) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in config.default_headers.iter().flatten() {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RouterError::config(format!("Invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| RouterError::config(format!("Invalid value for header '{name}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

static SHARED: OnceLock<OpenRouterClient> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Process-wide client, created from the environment on first use.
///
/// Concurrent first callers serialize on one lock so exactly one client is
/// constructed. A failed attempt is not cached.
pub fn shared() -> Result<&'static OpenRouterClient> {
    if let Some(client) = SHARED.get() {
        return Ok(client);
    }

    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(client) = SHARED.get() {
        return Ok(client);
    }

    let client = OpenRouterClient::from_env()?;
    Ok(SHARED.get_or_init(|| client))
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(headers: Option<HashMap<String, String>>) -> ClientConfig {
        ClientConfig {
            api_key: "sk-or-test".to_string(),
            base_url: "http://127.0.0.1:1/api/v1".to_string(),
            default_headers: headers,
        }
    }

    #[test]
    fn test_header_map_empty_without_headers() {
        let map = default_header_map(&config(None)).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_header_map_carries_configured_headers() {
        let headers = HashMap::from([
            ("HTTP-Referer".to_string(), "https://example.org".to_string()),
            ("X-Title".to_string(), "Planner".to_string()),
        ]);
        let map = default_header_map(&config(Some(headers))).unwrap();

        assert_eq!(map.get("http-referer").unwrap(), "https://example.org");
        assert_eq!(map.get("x-title").unwrap(), "Planner");
    }

    #[test]
    fn test_invalid_header_value_is_config_error() {
        let headers = HashMap::from([("X-Title".to_string(), "bad\nvalue".to_string())]);
        let err = OpenRouterClient::new(config(Some(headers))).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("héllo", 2), "h");
    }
}
