//! OpenAI-compatible chat completions client.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::{AgentError, Result};

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

/// Thin chat completions client. Cheap to clone: the HTTP pool is shared.
#[derive(Clone)]
pub struct ChatClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl ChatClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("venue-scout/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// One system + user exchange. `json_mode` asks the API for a JSON
    /// object response.
    pub async fn complete(&self, system: &str, user: &str, json_mode: bool) -> Result<String> {
        let mut body = json!({
            "model": &self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": self.config.temperature
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        debug!(model = %self.config.model, json_mode = json_mode, "chat completion request");
        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(AgentError::EmptyResponse("chat completions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"score\":80}"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(response).unwrap(), r#"{"score":80}"#);
    }

    #[test]
    fn test_missing_or_null_content_is_empty() {
        for raw in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"  "}}]}"#,
        ] {
            let response: ChatResponse = serde_json::from_str(raw).unwrap();
            assert!(matches!(
                extract_content(response),
                Err(AgentError::EmptyResponse(_))
            ));
        }
    }

    #[test]
    fn test_new_requires_key() {
        assert!(matches!(
            ChatClient::new(LlmConfig::new("")),
            Err(AgentError::MissingCredential(_))
        ));
    }
}
