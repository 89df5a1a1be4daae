//! Record merger behaviour on decoded capability output.

use serde_json::json;
use venue_core::{
    combine_venues_with_scores, ExternalPayload, InputData, PipelineState, Venue, VenueScore,
};

fn venues_from(raw: &str) -> Vec<Venue> {
    ExternalPayload::decode(raw)
        .into_records()
        .unwrap()
        .iter()
        .filter_map(|v| Venue::from_value(v).ok())
        .collect()
}

#[test]
fn unscored_venue_is_excluded_from_ranking() {
    let venues = vec![
        Venue::new("a", "Loft", "event_space", "1 Main St", 0.2),
        Venue::new("b", "Hall", "event_space", "2 Main St", 0.3),
    ];
    let scores = vec![VenueScore::for_id("a", 90.0, "central")];

    let report = combine_venues_with_scores(&venues, &scores);

    assert_eq!(report.scored.len(), 1);
    assert_eq!(report.scored[0].name(), "Loft");
    assert_eq!(report.scored[0].score, 90.0);
    assert!(report.scored.iter().all(|s| s.name() != "Hall"));
}

#[test]
fn score_without_id_matches_by_normalized_name() {
    let venues = vec![Venue::new("a", " The Loft ", "bar", "1 Main St", 0.1)];
    let score = VenueScore::from_value(&json!({"id": "", "name": "the loft", "score": 80, "reason": "ok"}))
        .unwrap();

    let report = combine_venues_with_scores(&venues, &[score]);

    assert_eq!(report.scored.len(), 1);
    assert_eq!(report.scored[0].score, 80.0);
    assert_eq!(report.dropped_scores, 0);
}

#[test]
fn legacy_score_fields_join_generated_ids() {
    let raw = r#"```json
    {"venues": [
        {"name": "The Loft", "type": "bar", "address": "1 Main St", "distance_km": "0.2 km"},
        {"name": "Grand Hall", "category": "ballroom", "address": "3 Main St", "distance": 0.4},
        {"name": "Broken", "address": "nowhere"}
    ]}
    ```"#;

    let mut state = PipelineState::new(InputData::new("1 Main St", 1.0)).unwrap();
    let added = state.append_venues(venues_from(raw));
    assert_eq!(added, 2);

    let scores = vec![
        VenueScore::from_value(&json!({"venue_id": "grand_hall", "total_score": "72", "recommendations": "spacious"}))
            .unwrap(),
        VenueScore::from_value(&json!({"venue_id": "the_loft", "total_score": 88})).unwrap(),
        VenueScore::from_value(&json!({"venue_id": "elsewhere", "total_score": 99})).unwrap(),
    ];
    let report = state.replace_scores(scores);

    let names: Vec<_> = state.hydrated_venues.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["The Loft", "Grand Hall"]);
    assert_eq!(state.hydrated_venues[1].reason, "spacious");
    assert_eq!(report.dropped_scores, 1);
    assert_eq!(state.dropped_scores, 1);
}

#[test]
fn hydrated_list_serializes_flat() {
    let venues = vec![Venue::new("a", "Loft", "bar", "1 Main St", 0.1)];
    let report = combine_venues_with_scores(&venues, &[VenueScore::for_id("a", 75.0, "quiet")]);

    let value = serde_json::to_value(&report.scored[0]).unwrap();
    assert_eq!(value["name"], "Loft");
    assert_eq!(value["type"], "bar");
    assert_eq!(value["score"], 75.0);
    assert_eq!(value["reason"], "quiet");
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut out = Vec::new();
    for i in 0..items.len() {
        let mut rest = items.to_vec();
        let head = rest.remove(i);
        for mut tail in permutations(&rest) {
            tail.insert(0, head.clone());
            out.push(tail);
        }
    }
    out
}

#[test]
fn score_order_does_not_change_the_joined_set() {
    let venues = vec![
        Venue::new("a", "Loft", "bar", "1 Main St", 0.1),
        Venue::new("b", "Hall", "ballroom", "2 Main St", 0.2),
        Venue::new("", "Rooftop Deck", "rooftop", "3 Main St", 0.3),
        Venue::new("d", "Cellar", "bar", "4 Main St", 0.4),
    ];
    let scores = vec![
        VenueScore::for_id("a", 70.0, "central"),
        VenueScore::for_id("b", 70.0, "large"),
        VenueScore::for_name("rooftop deck", 85.0, "views"),
        VenueScore::for_id("zzz", 10.0, "no such venue"),
    ];

    let joined = |scores: &[VenueScore]| {
        let report = combine_venues_with_scores(&venues, scores);
        let mut rows: Vec<_> = report
            .scored
            .iter()
            .map(|s| (s.name().to_string(), s.score, s.reason.clone()))
            .collect();
        rows.sort_by(|x, y| x.0.cmp(&y.0));
        (rows, report.dropped_scores, report.unscored_venues)
    };

    let expected = joined(&scores);
    assert_eq!(expected.0.len(), 3);
    assert_eq!((expected.1, expected.2), (1, 1));

    let orders = permutations(&scores);
    assert_eq!(orders.len(), 24);
    for order in &orders {
        assert_eq!(joined(order), expected);
    }
}
