//! Connection settings for the HTTP adapters.
//!
//! Built explicitly by the caller and handed to constructors. Nothing here
//! reads the process environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://google.serper.dev/search";

/// OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::MissingCredential("OPENAI_API_KEY"));
        }
        Ok(())
    }
}

/// Serper web search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub api_key: String,
    pub endpoint: String,
    pub num_results: u32,
    pub request_timeout: Duration,
}

impl SearchConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            num_results: 10,
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_num_results(mut self, num_results: u32) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::MissingCredential("SERPER_API_KEY"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_slash() {
        let config = LlmConfig::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_blank_keys_rejected() {
        assert!(matches!(
            LlmConfig::new("  ").validate(),
            Err(AgentError::MissingCredential("OPENAI_API_KEY"))
        ));
        assert!(matches!(
            SearchConfig::new("").validate(),
            Err(AgentError::MissingCredential("SERPER_API_KEY"))
        ));
        assert!(LlmConfig::new("sk-test").validate().is_ok());
    }
}
