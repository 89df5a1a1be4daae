//! Venue Scout Agents
//!
//! The three external capabilities the pipeline consumes (venue search,
//! venue scoring, email drafting), their HTTP-backed implementations and
//! scripted fakes for tests.

pub mod capability;
pub mod config;
pub mod error;
pub mod fakes;
pub mod llm;
pub mod openai;
pub mod prompts;
pub mod serper;
pub mod template_drafter;

pub use capability::{
    DraftRequest, EmailDrafter, ScoreRequest, SearchRequest, VenueScorer, VenueSearcher,
};
pub use config::{LlmConfig, SearchConfig};
pub use error::{AgentError, Result};
pub use llm::{LlmEmailDrafter, LlmVenueScorer, LlmVenueSearcher};
pub use openai::ChatClient;
pub use serper::{SerperClient, WebResult};
pub use template_drafter::TemplateDrafter;
