//! Venue search stage.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};
use venue_agents::{SearchRequest, VenueSearcher};
use venue_core::{obs, ExternalPayload, InputData, Venue};

/// Venues found by one search, plus what was thrown away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Valid venues in the order the capability emitted them.
    pub venues: Vec<Venue>,
    /// Items that failed venue validation.
    pub rejected: usize,
    /// Set when the call failed or the response was unreadable.
    pub failure: Option<String>,
}

/// Issue one search and validate every returned item.
///
/// Never fails: a capability error, a timeout or a malformed response
/// yields an empty outcome with `failure` set.
pub async fn run_search_stage(
    searcher: Arc<dyn VenueSearcher>,
    input: &InputData,
    timeout: Duration,
) -> SearchOutcome {
    let started = Instant::now();
    obs::emit_stage_started("search", 1);

    let request = SearchRequest {
        input: input.clone(),
    };
    let raw = match tokio::time::timeout(timeout, searcher.search(&request)).await {
        Ok(Ok(raw)) => raw,
        Ok(Err(e)) => return failed(started, format!("search request failed: {e}")),
        Err(_) => return failed(started, format!("search request timed out after {timeout:?}")),
    };

    let payload = ExternalPayload::decode(&raw);
    let kind = payload.kind();
    let records = match payload.into_records() {
        Ok(records) => records,
        Err(e) => {
            warn!(excerpt = %e.excerpt, "search response unreadable");
            return failed(started, e.to_string());
        }
    };

    let mut outcome = SearchOutcome::default();
    for (index, record) in records.iter().enumerate() {
        match Venue::from_value(record) {
            Ok(venue) => outcome.venues.push(venue),
            Err(e) => {
                warn!(index = index, reason = %e, "dropping invalid venue record");
                outcome.rejected += 1;
            }
        }
    }

    info!(
        payload = kind,
        venues = outcome.venues.len(),
        rejected = outcome.rejected,
        "search results parsed"
    );
    obs::emit_stage_finished(
        "search",
        outcome.venues.len(),
        outcome.rejected,
        started.elapsed().as_millis() as u64,
    );
    outcome
}

fn failed(started: Instant, reason: String) -> SearchOutcome {
    warn!(reason = %reason, "search stage produced no venues");
    obs::emit_stage_finished("search", 0, 1, started.elapsed().as_millis() as u64);
    SearchOutcome {
        failure: Some(reason),
        ..SearchOutcome::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venue_agents::fakes::ScriptedSearcher;

    fn input() -> InputData {
        InputData::new("1 Main St", 1.0)
    }

    #[tokio::test]
    async fn test_single_object_becomes_one_venue() {
        let searcher = Arc::new(ScriptedSearcher::new(
            r#"{"name":"Loft","type":"bar","address":"1 Main St","distance_km":0.3}"#,
        ));
        let outcome = run_search_stage(searcher, &input(), Duration::from_secs(5)).await;
        assert_eq!(outcome.venues.len(), 1);
        assert_eq!(outcome.venues[0].name, "Loft");
        assert!(outcome.failure.is_none());
    }

    #[tokio::test]
    async fn test_invalid_items_dropped_in_order() {
        let searcher = Arc::new(ScriptedSearcher::new(
            r#"[
                {"name":"A","type":"bar","address":"x","distance_km":0.1},
                {"name":"","type":"bar","address":"x","distance_km":0.1},
                "not a venue",
                {"name":"B","type":"hotel","address":"y","distance_km":"1.2 km"}
            ]"#,
        ));
        let outcome = run_search_stage(searcher, &input(), Duration::from_secs(5)).await;
        let names: Vec<_> = outcome.venues.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(outcome.rejected, 2);
    }

    #[tokio::test]
    async fn test_malformed_response_yields_empty() {
        let searcher = Arc::new(ScriptedSearcher::new("Sorry, I could not find anything."));
        let outcome = run_search_stage(searcher, &input(), Duration::from_secs(5)).await;
        assert!(outcome.venues.is_empty());
        assert!(outcome.failure.unwrap().contains("invalid JSON"));
    }

    #[tokio::test]
    async fn test_capability_error_yields_empty() {
        let searcher = Arc::new(ScriptedSearcher::failing("503"));
        let outcome = run_search_stage(searcher.clone(), &input(), Duration::from_secs(5)).await;
        assert!(outcome.venues.is_empty());
        assert!(outcome.failure.is_some());
        assert_eq!(searcher.calls(), 1);
    }
}
