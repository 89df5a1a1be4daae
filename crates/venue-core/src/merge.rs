//! Record merger: joins venues with their scores.
//!
//! Pure and deterministic. The join policy is id-first with a
//! normalized-name fallback:
//!
//! - keys are trimmed and lowercased on both sides before comparing;
//! - when a venue and a score both carry an id, only the ids are compared;
//! - the name is used only when the id is missing on either side;
//! - a score with neither id nor name never enters the lookup tables;
//! - duplicate keys resolve last-write-wins, for scores and for venues.
//!
//! Unmatched scores are dropped. The count is reported so callers can
//! surface it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::{ScoredVenue, Venue, VenueScore};

/// Normalize a raw key: trim and lowercase. Empty keys are absent.
pub fn normalize_key(raw: &str) -> Option<String> {
    let key = raw.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

/// The key a venue is identified by within one merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Id(String),
    Name(String),
}

impl JoinKey {
    /// Id when present, otherwise normalized name.
    pub fn for_venue(venue: &Venue) -> Option<Self> {
        normalize_key(&venue.id)
            .map(JoinKey::Id)
            .or_else(|| normalize_key(&venue.name).map(JoinKey::Name))
    }
}

/// Output of one merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Hydrated venues, sorted by score descending.
    pub scored: Vec<ScoredVenue>,
    /// Scores that matched no venue (including keyless ones).
    pub dropped_scores: usize,
    /// Venues for which no score was found.
    pub unscored_venues: usize,
    /// Venues shadowed by a later venue with the same key.
    pub duplicate_venues: usize,
}

#[derive(Default)]
struct ScoreIndex {
    by_id: HashMap<String, usize>,
    /// Scores that carry no id, by name.
    by_name_without_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl ScoreIndex {
    fn build(scores: &[VenueScore]) -> Self {
        let mut index = Self::default();
        for (i, score) in scores.iter().enumerate() {
            let id = normalize_key(&score.id);
            let name = normalize_key(&score.name);
            if let Some(name) = name {
                if id.is_none() {
                    index.by_name_without_id.insert(name.clone(), i);
                }
                index.by_name.insert(name, i);
            }
            if let Some(id) = id {
                index.by_id.insert(id, i);
            }
        }
        index
    }

    fn lookup(&self, key: &JoinKey, venue: &Venue) -> Option<usize> {
        match key {
            JoinKey::Id(id) => self.by_id.get(id).copied().or_else(|| {
                normalize_key(&venue.name).and_then(|n| self.by_name_without_id.get(&n).copied())
            }),
            JoinKey::Name(name) => self.by_name.get(name).copied(),
        }
    }
}

/// Join `venues` with `scores`, producing one [`ScoredVenue`] per venue
/// whose key has a matching score. Inputs are not modified.
pub fn combine_venues_with_scores(venues: &[Venue], scores: &[VenueScore]) -> MergeReport {
    let index = ScoreIndex::build(scores);

    let mut last_holder: HashMap<JoinKey, usize> = HashMap::new();
    for (i, venue) in venues.iter().enumerate() {
        if let Some(key) = JoinKey::for_venue(venue) {
            last_holder.insert(key, i);
        }
    }

    let mut report = MergeReport::default();
    let mut used: HashSet<usize> = HashSet::new();

    for (i, venue) in venues.iter().enumerate() {
        let Some(key) = JoinKey::for_venue(venue) else {
            report.unscored_venues += 1;
            continue;
        };
        if last_holder.get(&key) != Some(&i) {
            report.duplicate_venues += 1;
            continue;
        }
        match index.lookup(&key, venue) {
            Some(si) => {
                used.insert(si);
                report.scored.push(ScoredVenue::new(venue.clone(), &scores[si]));
            }
            None => report.unscored_venues += 1,
        }
    }

    report.dropped_scores = scores.len() - used.len();
    rank(&mut report.scored);
    report
}

/// Sort by score descending. Stable: equal scores keep their input order.
pub fn rank(scored: &mut [ScoredVenue]) {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(id: &str, name: &str) -> Venue {
        Venue::new(id, name, "event_space", "1 Main St", 0.5)
    }

    #[test]
    fn test_joins_by_id_and_excludes_unscored() {
        let venues = vec![venue("a", "Loft"), venue("b", "Hall")];
        let scores = vec![VenueScore::for_id("a", 90.0, "central")];

        let report = combine_venues_with_scores(&venues, &scores);

        assert_eq!(report.scored.len(), 1);
        assert_eq!(report.scored[0].name(), "Loft");
        assert_eq!(report.scored[0].score, 90.0);
        assert_eq!(report.scored[0].reason, "central");
        assert_eq!(report.unscored_venues, 1);
        assert_eq!(report.dropped_scores, 0);
    }

    #[test]
    fn test_name_fallback_when_score_has_no_id() {
        let venues = vec![venue("a", " The Loft ")];
        let scores = vec![VenueScore::for_name("the loft", 80.0, "ok")];

        let report = combine_venues_with_scores(&venues, &scores);

        assert_eq!(report.scored.len(), 1);
        assert_eq!(report.scored[0].score, 80.0);
        assert_eq!(report.scored[0].venue.id, "a");
    }

    #[test]
    fn test_name_fallback_when_venue_has_no_id() {
        let venues = vec![venue("", "Grand Hall")];
        let scores = vec![VenueScore {
            id: "grand_hall".into(),
            name: "GRAND HALL".into(),
            score: 70.0,
            reason: String::new(),
        }];

        let report = combine_venues_with_scores(&venues, &scores);
        assert_eq!(report.scored.len(), 1);
    }

    #[test]
    fn test_ids_win_over_names_when_both_present() {
        let venues = vec![venue("a", "Loft")];
        let scores = vec![VenueScore {
            id: "b".into(),
            name: "Loft".into(),
            score: 50.0,
            reason: String::new(),
        }];

        let report = combine_venues_with_scores(&venues, &scores);
        assert!(report.scored.is_empty());
        assert_eq!(report.dropped_scores, 1);
    }

    #[test]
    fn test_ids_are_normalized() {
        let venues = vec![venue(" Loft-1 ", "Loft")];
        let scores = vec![VenueScore::for_id("loft-1", 60.0, "")];
        assert_eq!(combine_venues_with_scores(&venues, &scores).scored.len(), 1);
    }

    #[test]
    fn test_keyless_scores_are_dropped_not_fatal() {
        let venues = vec![venue("a", "Loft")];
        let scores = vec![
            VenueScore::for_id("", 99.0, "no key"),
            VenueScore::for_id("a", 10.0, ""),
        ];

        let report = combine_venues_with_scores(&venues, &scores);
        assert_eq!(report.scored.len(), 1);
        assert_eq!(report.scored[0].score, 10.0);
        assert_eq!(report.dropped_scores, 1);
    }

    #[test]
    fn test_empty_venues_yield_empty_output() {
        let scores = vec![VenueScore::for_id("a", 1.0, "")];
        let report = combine_venues_with_scores(&[], &scores);
        assert!(report.scored.is_empty());
        assert_eq!(report.dropped_scores, 1);
    }

    #[test]
    fn test_duplicate_scores_last_write_wins() {
        let venues = vec![venue("a", "Loft")];
        let scores = vec![
            VenueScore::for_id("a", 10.0, "first"),
            VenueScore::for_id("A", 20.0, "second"),
        ];

        let report = combine_venues_with_scores(&venues, &scores);
        assert_eq!(report.scored.len(), 1);
        assert_eq!(report.scored[0].reason, "second");
        assert_eq!(report.dropped_scores, 1);
    }

    #[test]
    fn test_duplicate_venues_later_one_wins() {
        let mut first = venue("a", "Loft");
        first.address = "old address".into();
        let mut second = venue(" A ", "Loft (renovated)");
        second.address = "new address".into();

        let report =
            combine_venues_with_scores(&[first, second], &[VenueScore::for_id("a", 75.0, "")]);

        assert_eq!(report.scored.len(), 1);
        assert_eq!(report.scored[0].venue.address, "new address");
        assert_eq!(report.duplicate_venues, 1);
    }

    #[test]
    fn test_output_sorted_descending_with_stable_ties() {
        let venues = vec![
            venue("a", "A"),
            venue("b", "B"),
            venue("c", "C"),
            venue("d", "D"),
        ];
        let scores = vec![
            VenueScore::for_id("d", 50.0, ""),
            VenueScore::for_id("a", 50.0, ""),
            VenueScore::for_id("b", 90.0, ""),
            VenueScore::for_id("c", 10.0, ""),
        ];

        let report = combine_venues_with_scores(&venues, &scores);
        let names: Vec<_> = report.scored.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["B", "A", "D", "C"]);
    }

    #[test]
    fn test_inputs_untouched_and_merge_idempotent() {
        let venues = vec![venue("a", "Loft"), venue("b", "Hall")];
        let scores = vec![
            VenueScore::for_id("b", 40.0, ""),
            VenueScore::for_id("a", 60.0, ""),
        ];
        let venues_before = venues.clone();

        let first = combine_venues_with_scores(&venues, &scores);
        let second = combine_venues_with_scores(&venues, &scores);

        assert_eq!(first, second);
        assert_eq!(venues, venues_before);
    }
}
