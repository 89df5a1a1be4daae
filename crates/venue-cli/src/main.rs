//! Venue Scout CLI
//!
//! The `venue-scout` command searches for event venues near an address,
//! scores them, pauses for a human decision and drafts outreach emails.
//!
//! ## Commands
//!
//! - `run`: full pipeline, deciding interactively on the console
//! - `start`: search and score, then save a checkpoint at the decision gate
//! - `resume`: apply a decision to a saved checkpoint
//! - `merge`: join venue and score files offline and print the ranking

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::{info, warn, Level};

use venue_agents::{
    AgentError, ChatClient, DraftRequest, EmailDrafter, LlmConfig, LlmEmailDrafter,
    LlmVenueScorer, LlmVenueSearcher, ScoreRequest, SearchConfig, SearchRequest, SerperClient,
    VenueScorer, VenueSearcher,
};
use venue_core::{
    combine_venues_with_scores, obs, ExternalPayload, InputData, MergeReport, Venue, VenueScore,
};
use venue_flow::{
    render_ranking, Capabilities, Choice, ConsoleOperator, Decision, DecisionCheckpoint,
    PipelineConfig, PipelineOutcome, VenuePipeline,
};

#[derive(Parser)]
#[command(name = "venue-scout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find, score and contact event venues", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline, deciding at the gate on the console
    Run {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        llm: LlmArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Search and score, then stop at the decision gate
    Start {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        llm: LlmArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Apply a decision to a run paused at the gate
    Resume {
        /// Checkpoint written by `start` (or a previous `resume`)
        #[arg(long)]
        checkpoint: PathBuf,

        /// What to do next
        #[arg(long, value_enum)]
        choice: ChoiceArg,

        /// Feedback for the scoring agent (redo only)
        #[arg(long)]
        feedback: Option<String>,

        #[command(flatten)]
        llm: LlmArgs,
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Join a venue file with a score file and print the ranking
    Merge {
        /// JSON venues (array, single object or {"venues": [...]})
        #[arg(long)]
        venues: PathBuf,

        /// JSON scores (array, single object or {"scores": [...]})
        #[arg(long)]
        scores: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// JSON file with the full input; flags below are ignored when set
    #[arg(long)]
    input: Option<PathBuf>,

    /// Address to search around
    #[arg(long)]
    address: Option<String>,

    /// Search radius in kilometres
    #[arg(long, default_value_t = 0.5)]
    radius_km: f64,

    /// Event date, e.g. 2024-06-01
    #[arg(long)]
    event_date: Option<String>,

    /// Event time, e.g. "2:00 PM"
    #[arg(long)]
    event_time: Option<String>,

    #[arg(long)]
    sender_name: Option<String>,

    #[arg(long)]
    sender_email: Option<String>,

    #[arg(long)]
    linkedin_url: Option<String>,

    #[arg(long)]
    instagram_url: Option<String>,

    #[arg(long)]
    tiktok_url: Option<String>,

    /// File with a literal email template ({venue_name}, {name}, ...);
    /// without it the model writes each email
    #[arg(long)]
    template_file: Option<PathBuf>,
}

impl InputArgs {
    fn load(&self) -> Result<InputData> {
        if let Some(path) = &self.input {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("read input file {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("parse input file {}", path.display()));
        }

        let mut input = InputData::new(self.address.clone().unwrap_or_default(), self.radius_km);
        input.event_date = self.event_date.clone();
        input.event_time = self.event_time.clone();
        input.sender_name = self.sender_name.clone();
        input.sender_email = self.sender_email.clone();
        input.linkedin_url = self.linkedin_url.clone();
        input.instagram_url = self.instagram_url.clone();
        input.tiktok_url = self.tiktok_url.clone();
        if let Some(path) = &self.template_file {
            let template = std::fs::read_to_string(path)
                .with_context(|| format!("read template file {}", path.display()))?;
            input.email_template = Some(template);
        }
        Ok(input)
    }
}

#[derive(Args, Debug, Clone)]
struct LlmArgs {
    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Chat model
    #[arg(long, env = "OPENAI_MODEL", default_value = venue_agents::config::DEFAULT_MODEL)]
    model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = venue_agents::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Serper key; enables web search grounding for venue discovery
    #[arg(long, env = "SERPER_API_KEY", hide_env_values = true)]
    serper_api_key: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    /// Directory for run artifacts
    #[arg(long, env = "VENUE_SCOUT_OUTPUT_DIR", default_value = "outputs")]
    output_dir: PathBuf,

    /// Maximum concurrent model requests per stage
    #[arg(long, env = "VENUE_SCOUT_MAX_CONCURRENT", default_value_t = 4)]
    max_concurrent: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "VENUE_SCOUT_TIMEOUT_SECS", default_value_t = 120)]
    timeout_secs: u64,

    /// Only draft emails for the best K venues
    #[arg(long)]
    top_k: Option<usize>,

    /// How many top venues get the "top choice" wording
    #[arg(long, default_value_t = 3)]
    shortlist: usize,

    /// Do not write state and report when quitting at the gate
    #[arg(long)]
    no_partial_state: bool,
}

impl PipelineArgs {
    fn config(&self) -> PipelineConfig {
        PipelineConfig {
            output_root: self.output_dir.clone(),
            max_concurrent: self.max_concurrent,
            request_timeout: Duration::from_secs(self.timeout_secs),
            top_k: self.top_k,
            shortlist_size: self.shortlist,
            write_state_on_quit: !self.no_partial_state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChoiceArg {
    Quit,
    Redo,
    Proceed,
}

impl From<ChoiceArg> for Choice {
    fn from(arg: ChoiceArg) -> Self {
        match arg {
            ChoiceArg::Quit => Choice::Quit,
            ChoiceArg::Redo => Choice::Redo,
            ChoiceArg::Proceed => Choice::Proceed,
        }
    }
}

/// Stand-in capability for decisions that never reach a model.
struct NoModel;

#[async_trait]
impl VenueSearcher for NoModel {
    async fn search(&self, _request: &SearchRequest) -> Result<String, AgentError> {
        Err(AgentError::MissingCredential("OPENAI_API_KEY"))
    }
}

#[async_trait]
impl VenueScorer for NoModel {
    async fn score(&self, _request: &ScoreRequest) -> Result<String, AgentError> {
        Err(AgentError::MissingCredential("OPENAI_API_KEY"))
    }
}

#[async_trait]
impl EmailDrafter for NoModel {
    async fn draft(&self, _request: &DraftRequest) -> Result<String, AgentError> {
        Err(AgentError::MissingCredential("OPENAI_API_KEY"))
    }
}

fn model_capabilities(llm: &LlmArgs, timeout: Duration) -> Result<Capabilities> {
    let api_key = llm
        .openai_api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .context("an API key is required: pass --openai-api-key or set OPENAI_API_KEY")?;
    let chat = ChatClient::new(
        LlmConfig::new(api_key)
            .with_model(&llm.model)
            .with_base_url(&llm.base_url)
            .with_timeout(timeout),
    )
    .context("configure chat client")?;

    let mut searcher = LlmVenueSearcher::new(chat.clone());
    match llm.serper_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            let web = SerperClient::new(SearchConfig::new(key)).context("configure web search")?;
            searcher = searcher.with_web_search(web);
        }
        None => info!("no SERPER_API_KEY set, venue search runs without web grounding"),
    }

    Ok(Capabilities {
        searcher: Arc::new(searcher),
        scorer: Arc::new(LlmVenueScorer::new(chat.clone())),
        drafter: Arc::new(LlmEmailDrafter::new(chat)),
    })
}

fn offline_capabilities() -> Capabilities {
    let none = Arc::new(NoModel);
    Capabilities {
        searcher: none.clone(),
        scorer: none.clone(),
        drafter: none,
    }
}

fn build_pipeline(capabilities: Capabilities, pipeline: &PipelineArgs) -> Result<VenuePipeline> {
    VenuePipeline::new(pipeline.config(), capabilities).context("invalid pipeline configuration")
}

fn print_outcome(outcome: &PipelineOutcome) {
    let state = outcome.state();
    match outcome {
        PipelineOutcome::AwaitingDecision(checkpoint) => {
            println!("{}", render_ranking(checkpoint.ranking()));
            println!(
                "Awaiting decision. Resume with:\n  venue-scout resume --checkpoint {} --choice <quit|redo|proceed>",
                checkpoint.run_dir.join(venue_flow::artifacts::CHECKPOINT_FILE).display()
            );
        }
        PipelineOutcome::Completed(_) => {
            println!(
                "Completed: {} venues found, {} ranked, {} emails drafted.",
                state.venues.len(),
                state.hydrated_venues.len(),
                state.generated_emails.len()
            );
        }
        PipelineOutcome::Quit(_) => {
            println!(
                "Stopped at the decision gate with {} ranked venues.",
                state.hydrated_venues.len()
            );
        }
    }
    if state.dropped_scores > 0 {
        println!(
            "Warning: {} scores matched no venue and were dropped.",
            state.dropped_scores
        );
    }
}

async fn cmd_run(input: &InputArgs, llm: &LlmArgs, pipeline: &PipelineArgs) -> Result<()> {
    let input = input.load()?;
    let capabilities = model_capabilities(llm, Duration::from_secs(pipeline.timeout_secs))?;
    let pipeline = build_pipeline(capabilities, pipeline)?;

    let mut operator = ConsoleOperator::new();
    let outcome = pipeline
        .run_interactive(input, &mut operator)
        .await
        .context("pipeline run failed")?;
    print_outcome(&outcome);
    Ok(())
}

async fn cmd_start(input: &InputArgs, llm: &LlmArgs, pipeline: &PipelineArgs) -> Result<()> {
    let input = input.load()?;
    let capabilities = model_capabilities(llm, Duration::from_secs(pipeline.timeout_secs))?;
    let pipeline = build_pipeline(capabilities, pipeline)?;

    let outcome = pipeline.start(input).await.context("pipeline start failed")?;
    print_outcome(&outcome);
    Ok(())
}

async fn cmd_resume(
    checkpoint_path: &Path,
    choice: ChoiceArg,
    feedback: Option<String>,
    llm: &LlmArgs,
    pipeline: &PipelineArgs,
) -> Result<()> {
    let checkpoint = DecisionCheckpoint::load(checkpoint_path)
        .with_context(|| format!("load checkpoint {}", checkpoint_path.display()))?;
    let decision = Decision::from_choice(choice.into(), feedback);

    let needs_model = match &decision {
        Decision::Quit => false,
        Decision::Redo { .. } => true,
        Decision::Proceed => checkpoint.state.input_data.literal_template().is_none(),
    };
    let capabilities = if needs_model {
        model_capabilities(llm, Duration::from_secs(pipeline.timeout_secs))?
    } else {
        offline_capabilities()
    };
    let pipeline = build_pipeline(capabilities, pipeline)?;

    let outcome = pipeline
        .resume(checkpoint, decision)
        .await
        .context("resume failed")?;
    print_outcome(&outcome);
    Ok(())
}

/// Decode a JSON file of records, keeping those that validate.
fn load_records<T>(
    path: &Path,
    what: &str,
    parse: impl Fn(&Value) -> std::result::Result<T, venue_core::ValidationError>,
) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read {what} file {}", path.display()))?;
    let records = ExternalPayload::decode(&raw)
        .into_records()
        .with_context(|| format!("decode {what} file {}", path.display()))?;

    let mut out = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        match parse(record) {
            Ok(item) => out.push(item),
            Err(e) => warn!(index = index, reason = %e, "dropping invalid {what} record"),
        }
    }
    Ok(out)
}

fn merge_files(venues_path: &Path, scores_path: &Path) -> Result<MergeReport> {
    let venues = load_records(venues_path, "venue", Venue::from_value)?;
    let scores = load_records(scores_path, "score", VenueScore::from_value)?;
    let report = combine_venues_with_scores(&venues, &scores);
    obs::emit_merge_completed(&report);
    Ok(report)
}

fn cmd_merge(venues_path: &Path, scores_path: &Path) -> Result<()> {
    let _span = obs::RunSpan::enter("offline-merge");
    let report = merge_files(venues_path, scores_path)?;
    print!("{}", render_ranking(&report.scored));
    println!(
        "\n{} ranked, {} unscored venues, {} dropped scores, {} duplicate venues",
        report.scored.len(),
        report.unscored_venues,
        report.dropped_scores,
        report.duplicate_venues
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    venue_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            input,
            llm,
            pipeline,
        } => cmd_run(&input, &llm, &pipeline).await,
        Commands::Start {
            input,
            llm,
            pipeline,
        } => cmd_start(&input, &llm, &pipeline).await,
        Commands::Resume {
            checkpoint,
            choice,
            feedback,
            llm,
            pipeline,
        } => {
            if choice != ChoiceArg::Redo && feedback.is_some() {
                bail!("--feedback is only used with --choice redo");
            }
            cmd_resume(&checkpoint, choice, feedback, &llm, &pipeline).await
        }
        Commands::Merge { venues, scores } => cmd_merge(&venues, &scores),
    }
}
