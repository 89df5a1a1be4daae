//! Venue Scout Flow
//!
//! Stage implementations and the orchestrator for the venue pipeline:
//! search, concurrent scoring, the human decision gate, concurrent email
//! drafting, and the artifacts each run leaves behind.

pub mod artifacts;
pub mod config;
pub mod drafting;
pub mod error;
pub mod fanout;
pub mod gate;
pub mod operator;
pub mod pipeline;
pub mod scoring;
pub mod search;

pub use artifacts::{RunLayout, SearchReport};
pub use config::PipelineConfig;
pub use error::{FlowError, GateError, Result};
pub use fanout::{gather_bounded, FanOutConfig, ItemFailure};
pub use gate::{parse_choice, render_ranking, Choice, Decision, DecisionCheckpoint};
pub use operator::{ConsoleOperator, Operator, ScriptedOperator};
pub use pipeline::{Capabilities, PipelineOutcome, VenuePipeline};
