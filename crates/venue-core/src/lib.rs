//! Venue Scout Core
//!
//! Domain records, the venue/score merger, response decoding and the
//! pipeline state shared by every stage.

pub mod domain;
pub mod merge;
pub mod naming;
pub mod obs;
pub mod response;
pub mod state;
pub mod telemetry;
pub mod template;

pub use domain::{
    InputData, Result, ScoredVenue, ValidationError, Venue, VenueError, VenueScore,
};
pub use merge::{combine_venues_with_scores, normalize_key, rank, JoinKey, MergeReport};
pub use naming::{email_file_name, sanitize_file_stem, venue_slug};
pub use obs::RunSpan;
pub use response::{ExternalPayload, MalformedResult};
pub use state::{PipelineState, PipelineStep};
pub use telemetry::init_tracing;
pub use template::{
    EmailTemplate, TemplateContext, DEFAULT_EMAIL_TEMPLATE, GENERAL_MESSAGE, PROCEED_MESSAGE,
};

/// Venue Scout version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
