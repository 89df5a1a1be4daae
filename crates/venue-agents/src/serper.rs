//! Serper web search client, used to ground venue discovery.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SearchConfig;
use crate::error::{AgentError, Result};

/// One organic search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<WebResult>,
}

#[derive(Clone)]
pub struct SerperClient {
    config: SearchConfig,
    http: reqwest::Client,
}

impl SerperClient {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("venue-scout/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<WebResult>> {
        debug!(query = %query, "web search request");
        let response = self
            .http
            .post(&self.config.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .json(&SerperRequest {
                q: query,
                num: self.config.num_results,
            })
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

        let parsed: SerperResponse = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(e.to_string()))?;
        Ok(parsed.organic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tolerates_missing_fields() {
        let parsed: SerperResponse = serde_json::from_str(
            r#"{"organic":[{"title":"The Loft","link":"https://loft.example"}],"searchParameters":{}}"#,
        )
        .unwrap();
        assert_eq!(parsed.organic.len(), 1);
        assert_eq!(parsed.organic[0].snippet, "");
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(SerperRequest { q: "venues", num: 5 }).unwrap();
        assert_eq!(body, serde_json::json!({"q": "venues", "num": 5}));
    }
}
