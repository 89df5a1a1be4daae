//! Scripted in-memory capabilities (testing only)
//!
//! Deterministic stand-ins for the model-backed capabilities: canned
//! responses, injected failures and delays, call counters and captured
//! request data.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use venue_core::Venue;

use crate::capability::{
    DraftRequest, EmailDrafter, ScoreRequest, SearchRequest, VenueScorer, VenueSearcher,
};
use crate::error::{AgentError, Result};

/// Tracks concurrent calls; decrements on drop so cancelled calls count
/// as finished.
struct InFlight<'a> {
    current: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(current: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = current.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { current }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// ScriptedSearcher
// ---------------------------------------------------------------------------

/// Returns the same raw response (or failure) on every call.
#[derive(Debug)]
pub struct ScriptedSearcher {
    response: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl ScriptedSearcher {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            response: Ok(raw.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Responds with `venues` as a JSON array.
    pub fn from_venues(venues: &[Venue]) -> Self {
        Self::new(serde_json::to_string(venues).unwrap_or_default())
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            response: Err(reason.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VenueSearcher for ScriptedSearcher {
    async fn search(&self, _request: &SearchRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(AgentError::Scripted)
    }
}

// ---------------------------------------------------------------------------
// ScriptedScorer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone)]
struct VenueScript {
    score: Option<(f64, String)>,
    raw: Option<String>,
    fail_on_calls: HashSet<usize>,
    delay: Option<Duration>,
}

/// Scores venues by name. Unscripted venues get [`ScriptedScorer::DEFAULT_SCORE`].
#[derive(Debug, Default)]
pub struct ScriptedScorer {
    scripts: HashMap<String, VenueScript>,
    latency: Option<Duration>,
    calls: AtomicUsize,
    calls_per_venue: Mutex<HashMap<String, usize>>,
    feedback: Mutex<Vec<Option<String>>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl ScriptedScorer {
    pub const DEFAULT_SCORE: f64 = 50.0;

    pub fn new() -> Self {
        Self::default()
    }

    fn script(&mut self, venue_name: &str) -> &mut VenueScript {
        self.scripts.entry(venue_name.to_string()).or_default()
    }

    pub fn with_score(mut self, venue_name: &str, score: f64, reason: &str) -> Self {
        self.script(venue_name).score = Some((score, reason.to_string()));
        self
    }

    /// Respond with `raw` verbatim for this venue.
    pub fn with_raw(mut self, venue_name: &str, raw: &str) -> Self {
        self.script(venue_name).raw = Some(raw.to_string());
        self
    }

    /// Fail the `call`-th (1-based) request for this venue.
    pub fn failing_on_call(mut self, venue_name: &str, call: usize) -> Self {
        self.script(venue_name).fail_on_calls.insert(call);
        self
    }

    pub fn with_delay(mut self, venue_name: &str, delay: Duration) -> Self {
        self.script(venue_name).delay = Some(delay);
        self
    }

    /// Delay applied to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_for(&self, venue_name: &str) -> usize {
        let calls = self.calls_per_venue.lock().unwrap();
        calls.get(venue_name).copied().unwrap_or(0)
    }

    /// Feedback carried by every request, in call order.
    pub fn feedback_seen(&self) -> Vec<Option<String>> {
        self.feedback.lock().unwrap().clone()
    }

    /// Highest number of calls observed running at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VenueScorer for ScriptedScorer {
    async fn score(&self, request: &ScoreRequest) -> Result<String> {
        let venue = &request.venue;
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.feedback.lock().unwrap().push(request.feedback.clone());
        let call = {
            let mut calls = self.calls_per_venue.lock().unwrap();
            let n = calls.entry(venue.name.clone()).or_insert(0);
            *n += 1;
            *n
        };
        let script = self.scripts.get(&venue.name).cloned().unwrap_or_default();

        let _guard = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        if let Some(delay) = script.delay.or(self.latency) {
            tokio::time::sleep(delay).await;
        }

        if script.fail_on_calls.contains(&call) {
            return Err(AgentError::Scripted(format!(
                "scoring {} failed on call {call}",
                venue.name
            )));
        }
        if let Some(raw) = script.raw {
            return Ok(raw);
        }
        let (score, reason) = script
            .score
            .unwrap_or((Self::DEFAULT_SCORE, "scripted".to_string()));
        Ok(json!({
            "id": venue.id,
            "name": venue.name,
            "score": score,
            "reason": reason,
        })
        .to_string())
    }
}

// ---------------------------------------------------------------------------
// ScriptedDrafter
// ---------------------------------------------------------------------------

/// Drafts a canned body per venue name.
#[derive(Debug, Default)]
pub struct ScriptedDrafter {
    bodies: HashMap<String, String>,
    failing: HashSet<String>,
    calls: AtomicUsize,
    drafted: Mutex<Vec<String>>,
}

impl ScriptedDrafter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, venue_name: &str, body: &str) -> Self {
        self.bodies.insert(venue_name.to_string(), body.to_string());
        self
    }

    pub fn failing_for(mut self, venue_name: &str) -> Self {
        self.failing.insert(venue_name.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Names of venues drafted successfully, in completion order.
    pub fn drafted(&self) -> Vec<String> {
        self.drafted.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailDrafter for ScriptedDrafter {
    async fn draft(&self, request: &DraftRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = request.venue.name();
        if self.failing.contains(name) {
            return Err(AgentError::Scripted(format!("drafting {name} failed")));
        }
        let body = self.bodies.get(name).cloned().unwrap_or_else(|| {
            format!(
                "Dear {name} Team,\n\nScripted draft (score {:.0}).",
                request.venue.score
            )
        });
        self.drafted.lock().unwrap().push(name.to_string());
        Ok(body)
    }
}
