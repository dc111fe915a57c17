//! LLM endpoint configuration and credential discovery. Nothing is read
//! from disk: the key comes from the environment, with a launch-time
//! override for emergencies.

use std::env;

/// OpenAI-compatible chat-completions endpoint of the default provider.
pub const DEFAULT_ENDPOINT: &str =
    "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "qwen-max";
pub const API_KEY_ENV: &str = "QWEN_API_KEY";

/// Resolved connection settings for the LLM client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Find the API key: a launch-time override wins, otherwise the
/// `QWEN_API_KEY` environment variable. Blank values count as absent.
pub fn discover_api_key(override_key: Option<&str>) -> Option<String> {
    override_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .or_else(|| {
            env::var(API_KEY_ENV)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_environment() {
        assert_eq!(
            discover_api_key(Some("sk-override")).as_deref(),
            Some("sk-override")
        );
    }

    #[test]
    fn blank_override_counts_as_absent() {
        // With no env var set either, a blank override yields nothing.
        if env::var(API_KEY_ENV).is_err() {
            assert!(discover_api_key(Some("   ")).is_none());
            assert!(discover_api_key(None).is_none());
        }
    }

    #[test]
    fn config_defaults_to_qwen_max() {
        let config = LlmConfig::new("sk-test");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.endpoint.contains("chat/completions"));
        let config = config.with_model("qwen-plus");
        assert_eq!(config.model, "qwen-plus");
    }
}
