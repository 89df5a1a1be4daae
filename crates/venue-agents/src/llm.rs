//! Model-backed capability implementations.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::capability::{
    DraftRequest, EmailDrafter, ScoreRequest, SearchRequest, VenueScorer, VenueSearcher,
};
use crate::error::{AgentError, Result};
use crate::openai::ChatClient;
use crate::prompts;
use crate::serper::SerperClient;

/// Venue discovery: optional web search for grounding, then the model
/// turns the hits (or its own knowledge) into venue records.
#[derive(Clone)]
pub struct LlmVenueSearcher {
    chat: ChatClient,
    web: Option<SerperClient>,
}

impl LlmVenueSearcher {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat, web: None }
    }

    pub fn with_web_search(mut self, web: SerperClient) -> Self {
        self.web = Some(web);
        self
    }
}

#[async_trait]
impl VenueSearcher for LlmVenueSearcher {
    async fn search(&self, request: &SearchRequest) -> Result<String> {
        let hits = match &self.web {
            Some(web) => match web.search(&prompts::search_query(request)).await {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(error = %e, "web search failed, continuing without grounding");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        debug!(web_hits = hits.len(), "venue search prompt built");
        self.chat
            .complete(prompts::SEARCH_SYSTEM, &prompts::search_prompt(request, &hits), true)
            .await
    }
}

#[derive(Clone)]
pub struct LlmVenueScorer {
    chat: ChatClient,
}

impl LlmVenueScorer {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl VenueScorer for LlmVenueScorer {
    async fn score(&self, request: &ScoreRequest) -> Result<String> {
        self.chat
            .complete(prompts::SCORE_SYSTEM, &prompts::score_prompt(request), true)
            .await
    }
}

#[derive(Clone)]
pub struct LlmEmailDrafter {
    chat: ChatClient,
}

impl LlmEmailDrafter {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl EmailDrafter for LlmEmailDrafter {
    async fn draft(&self, request: &DraftRequest) -> Result<String> {
        let body = self
            .chat
            .complete(prompts::DRAFT_SYSTEM, &prompts::draft_prompt(request), false)
            .await?;
        let body = venue_core::response::strip_code_fence(&body);
        if body.is_empty() {
            return Err(AgentError::EmptyResponse("email drafter"));
        }
        Ok(body.to_string())
    }
}
