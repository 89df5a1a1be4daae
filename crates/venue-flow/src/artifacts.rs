//! On-disk layout and writers for run artifacts.
//!
//! ```text
//! <output_root>/search_<YYYYmmdd_HHMMSS>/
//!     venue_search_results.json
//!     checkpoint.json
//!     emails/<sanitized name>_email.txt
//!     reports/search_report.json
//! ```
//!
//! Writes are plain overwrites; nothing here is transactional.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use venue_core::{email_file_name, obs, PipelineState};

use crate::error::{FlowError, Result};

pub const STATE_FILE: &str = "venue_search_results.json";
pub const CHECKPOINT_FILE: &str = "checkpoint.json";
pub const REPORT_FILE: &str = "search_report.json";
pub const EMAILS_DIR: &str = "emails";
pub const REPORTS_DIR: &str = "reports";

/// Directory of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    /// Create a fresh `search_<timestamp>` directory under `output_root`.
    /// A second run within the same second gets a numeric suffix.
    pub fn create(output_root: &Path, started_at: DateTime<Utc>) -> Result<Self> {
        let base = format!("search_{}", started_at.format("%Y%m%d_%H%M%S"));
        let mut root = output_root.join(&base);
        let mut n = 2;
        while root.exists() {
            root = output_root.join(format!("{base}_{n}"));
            n += 1;
        }
        Self::open(root)
    }

    /// Use an existing (or new) run directory, creating subdirectories.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = Self { root: root.into() };
        for dir in [layout.emails_dir(), layout.reports_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| FlowError::io(&dir, e))?;
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn emails_dir(&self) -> PathBuf {
        self.root.join(EMAILS_DIR)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.reports_dir().join(REPORT_FILE)
    }

    pub fn email_path(&self, venue_name: &str) -> PathBuf {
        self.emails_dir().join(email_file_name(venue_name))
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).map_err(|e| FlowError::io(path, e))
}

/// Write the pipeline state JSON artifact.
pub fn write_state(layout: &RunLayout, state: &PipelineState) -> Result<PathBuf> {
    let path = layout.state_path();
    write_json(&path, state)?;
    obs::emit_artifact_written("state", &path);
    Ok(path)
}

/// Write one drafted email. Names that sanitize alike share a file; the
/// later write replaces the earlier one.
pub fn write_email(layout: &RunLayout, venue_name: &str, body: &str) -> Result<PathBuf> {
    let path = layout.email_path(venue_name);
    std::fs::write(&path, body).map_err(|e| FlowError::io(&path, e))?;
    obs::emit_artifact_written("email", &path);
    Ok(path)
}

/// One ranked venue in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub score: f64,
    pub reason: String,
}

/// Run summary written to `reports/search_report.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
    pub outcome: String,
    pub venues_found: usize,
    pub venues_scored: usize,
    pub emails_generated: usize,
    /// Distinct email files; fewer than `emails_generated` when names
    /// collide.
    pub email_files: Vec<String>,
    pub dropped_scores: usize,
    pub scoring_passes: u32,
    pub recommendations: Vec<Recommendation>,
}

impl SearchReport {
    pub fn from_state(state: &PipelineState) -> Self {
        let email_files: BTreeSet<String> = state
            .generated_emails
            .keys()
            .map(|name| email_file_name(name))
            .collect();
        Self {
            generated_at: Utc::now(),
            run_id: state.run_id,
            outcome: state.current_step.name().to_string(),
            venues_found: state.venues.len(),
            venues_scored: state.hydrated_venues.len(),
            emails_generated: state.generated_emails.len(),
            email_files: email_files.into_iter().collect(),
            dropped_scores: state.dropped_scores,
            scoring_passes: state.scoring_passes,
            recommendations: state
                .hydrated_venues
                .iter()
                .map(|s| Recommendation {
                    name: s.name().to_string(),
                    score: s.score,
                    reason: s.reason.clone(),
                })
                .collect(),
        }
    }
}

pub fn write_report(layout: &RunLayout, report: &SearchReport) -> Result<PathBuf> {
    let path = layout.report_path();
    write_json(&path, report)?;
    obs::emit_artifact_written("report", &path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;
    use venue_core::{InputData, Venue, VenueScore};

    #[test]
    fn test_layout_names_and_suffix() {
        let tmp = TempDir::new().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 14, 30, 5).unwrap();

        let first = RunLayout::create(tmp.path(), at).unwrap();
        let second = RunLayout::create(tmp.path(), at).unwrap();

        assert!(first.root().ends_with("search_20240601_143005"));
        assert!(second.root().ends_with("search_20240601_143005_2"));
        assert!(first.emails_dir().is_dir());
        assert!(first.reports_dir().is_dir());
        assert_eq!(
            first.email_path("The Loft!"),
            first.root().join("emails").join("The Loft_email.txt")
        );
    }

    #[test]
    fn test_write_state_and_report() {
        let tmp = TempDir::new().unwrap();
        let layout = RunLayout::open(tmp.path().join("run")).unwrap();

        let mut state = PipelineState::new(InputData::new("1 Main St", 1.0)).unwrap();
        state.append_venues(vec![Venue::new("a", "Loft", "bar", "x", 0.1)]);
        state.replace_scores(vec![VenueScore::for_id("a", 80.0, "good")]);
        state.record_email("Loft", "Dear Loft Team");

        let state_path = write_state(&layout, &state).unwrap();
        let back: PipelineState =
            serde_json::from_str(&std::fs::read_to_string(state_path).unwrap()).unwrap();
        assert_eq!(back.generated_emails.len(), 1);

        let report = SearchReport::from_state(&state);
        write_report(&layout, &report).unwrap();
        let raw = std::fs::read_to_string(layout.report_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["venues_found"], 1);
        assert_eq!(value["email_files"][0], "Loft_email.txt");
        assert_eq!(value["recommendations"][0]["reason"], "good");
    }
}
