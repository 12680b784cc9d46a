use crate::error::{Result, RouterError};
use crate::translate::resolve_model;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const BASE_URL_ENV: &str = "OPENROUTER_BASE_URL";
pub const REFERER_ENV: &str = "OPENROUTER_HTTP_REFERER";
/// Accepted names for the title header, in priority order.
pub const TITLE_ENVS: [&str; 2] = ["OPENROUTER_TITLE", "OPENROUTER_X_TITLE"];

pub const REFERER_HEADER: &str = "HTTP-Referer";
pub const TITLE_HEADER: &str = "X-Title";

/// Connection parameters for the routing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// `None` when no identifying header is configured at all.
    pub default_headers: Option<HashMap<String, String>>,
}

impl ClientConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let api_key = get(API_KEY_ENV).ok_or_else(|| {
            RouterError::config(format!(
                "{API_KEY_ENV} is not set. Configure your OpenRouter API key \
                 in the environment before creating the client."
            ))
        })?;

        let base_url = get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut headers = HashMap::new();
        if let Some(referer) = get(REFERER_ENV) {
            headers.insert(REFERER_HEADER.to_string(), referer);
        }
        if let Some(title) = TITLE_ENVS.iter().find_map(|name| get(*name)) {
            headers.insert(TITLE_HEADER.to_string(), title);
        }

        Ok(Self {
            api_key,
            base_url,
            default_headers: (!headers.is_empty()).then_some(headers),
        })
    }

    /// Base URL without a trailing slash, ready for path joining.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Settings for the command-line tool, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Short names mapped to routed model ids.
    #[serde(default)]
    pub models: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            timeout_secs: default_timeout_secs(),
            models: HashMap::new(),
            usage_log: None,
        }
    }
}

fn default_model() -> String {
    crate::planner::DEFAULT_TRANSLATOR_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RouterError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let settings: Self = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load an explicit file, or the first file found in the standard
    /// locations. Falls back to defaults when nothing is found.
    /// Priority: CLI arg > CWD > XDG config > home dir
    pub fn find_and_load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::load(path);
        }

        for candidate in &config_search_paths() {
            if candidate.exists() {
                tracing::info!(path = %candidate.display(), "Loading config");
                return Self::load(candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Model to route to: the requested one, else `default_model`, both
    /// mapped through the alias table.
    #[must_use]
    pub fn pick_model(&self, requested: Option<&str>) -> String {
        resolve_model(&self.models, requested.unwrap_or(&self.default_model))
    }
}

pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("openrouter-kit.toml")];

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join("openrouter-kit").join("config.toml"));
    }
    if let Some(home) = home_dir() {
        paths.push(home.join(".config").join("openrouter-kit").join("config.toml"));
        paths.push(home.join(".openrouter-kit.toml"));
    }

    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let err = ClientConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_empty_api_key_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[(API_KEY_ENV, "")])).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_defaults_without_headers() {
        let config = ClientConfig::from_lookup(lookup(&[(API_KEY_ENV, "sk-or-test")])).unwrap();
        assert_eq!(config.api_key, "sk-or-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.default_headers.is_none());
    }

    #[test]
    fn test_base_url_override_and_headers() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "k"),
            (BASE_URL_ENV, "http://localhost:9000/v1/"),
            (REFERER_ENV, "https://example.org"),
            ("OPENROUTER_X_TITLE", "Planner"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/v1/");
        assert_eq!(config.endpoint("/responses"), "http://localhost:9000/v1/responses");

        let headers = config.default_headers.unwrap();
        assert_eq!(headers.get(REFERER_HEADER).map(String::as_str), Some("https://example.org"));
        assert_eq!(headers.get(TITLE_HEADER).map(String::as_str), Some("Planner"));
    }

    #[test]
    fn test_first_title_variable_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            (API_KEY_ENV, "k"),
            ("OPENROUTER_TITLE", "New"),
            ("OPENROUTER_X_TITLE", "Old"),
        ]))
        .unwrap();

        let headers = config.default_headers.unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(TITLE_HEADER).map(String::as_str), Some("New"));
    }

    #[test]
    fn test_load_settings() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"
default_model = "anthropic/claude-3.5-sonnet"
timeout_secs = 60
usage_log = "/tmp/usage.jsonl"

[models]
fast = "openai/gpt-4o-mini"
"#
        )
        .unwrap();

        let settings = Settings::load(f.path()).unwrap();
        assert_eq!(settings.default_model, "anthropic/claude-3.5-sonnet");
        assert_eq!(settings.timeout_secs, 60);
        assert_eq!(
            settings.models.get("fast"),
            Some(&"openai/gpt-4o-mini".to_string())
        );
        assert_eq!(settings.usage_log, Some(PathBuf::from("/tmp/usage.jsonl")));
    }

    #[test]
    fn test_empty_settings_file_uses_defaults() {
        let f = NamedTempFile::new().unwrap();
        let settings = Settings::load(f.path()).unwrap();
        assert_eq!(settings.default_model, "openai/gpt-4o");
        assert_eq!(settings.timeout_secs, 300);
        assert!(settings.models.is_empty());
    }

    #[test]
    fn test_pick_model_falls_back_to_default() {
        let settings = Settings {
            default_model: "fast".to_string(),
            models: HashMap::from([("fast".to_string(), "openai/gpt-4o-mini".to_string())]),
            ..Settings::default()
        };

        assert_eq!(settings.pick_model(None), "openai/gpt-4o-mini");
        assert_eq!(settings.pick_model(Some("fast")), "openai/gpt-4o-mini");
        assert_eq!(settings.pick_model(Some("x-ai/grok-2")), "x-ai/grok-2");
        assert_eq!(Settings::default().pick_model(None), "openai/gpt-4o");
    }

    #[test]
    fn test_missing_explicit_settings_file_fails() {
        let err = Settings::find_and_load(Some(Path::new("/nonexistent/openrouter-kit.toml")))
            .unwrap_err();
        assert!(err.is_config());
    }
}
