//! Prompt builders for the three model-backed tasks.

use std::fmt::Write;

use venue_core::template::format_event_date;

use crate::capability::{DraftRequest, ScoreRequest, SearchRequest};
use crate::serper::WebResult;

pub const SEARCH_SYSTEM: &str = "You are a location analyst who finds event venues. \
Answer with JSON only.";

pub const SCORE_SYSTEM: &str = "You are an event planner who scores venues for suitability. \
Answer with JSON only.";

pub const DRAFT_SYSTEM: &str = "You write short, friendly outreach emails to event venues. \
Answer with the email body only, no subject line and no commentary.";

/// Web search query for the input location.
pub fn search_query(request: &SearchRequest) -> String {
    format!(
        "event venues near {} within {} km",
        request.input.address.trim(),
        request.input.radius_km
    )
}

pub fn search_prompt(request: &SearchRequest, web: &[WebResult]) -> String {
    let input = &request.input;
    let mut prompt = format!(
        "Search for venues near {} within {} km radius.\n\
         Return details about each venue including name, address and contact info.\n\n",
        input.address.trim(),
        input.radius_km
    );

    if !web.is_empty() {
        prompt.push_str("Web search results:\n");
        for hit in web {
            let _ = writeln!(prompt, "- {} ({}): {}", hit.title, hit.link, hit.snippet);
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Respond with a JSON object {\"venues\": [...]} where every venue has:\n\
         name, type (hotel, event_space, restaurant, bar, ...), address, distance_km (number),\n\
         and when known: website, phone, email, capacity, amenities (list), accessibility,\n\
         parking, special_features, audio_visual, technology.",
    );
    prompt
}

pub fn score_prompt(request: &ScoreRequest) -> String {
    let venue_json = serde_json::to_string_pretty(&request.venue).unwrap_or_default();
    let mut prompt = format!(
        "Score this venue from 0 to 100 for hosting an event near {}.\n\
         Consider distance, capacity, amenities, accessibility and parking.\n\n\
         Venue:\n{}\n",
        request.input.address.trim(),
        venue_json
    );

    if let Some(date) = request.input.event_date.as_deref() {
        let _ = writeln!(prompt, "Event date: {}", format_event_date(date));
    }

    if let Some(feedback) = request.feedback.as_deref().filter(|f| !f.trim().is_empty()) {
        let _ = write!(
            prompt,
            "\nThe organiser reviewed an earlier ranking and asked you to take this into account:\n{}\n",
            feedback.trim()
        );
    }

    let _ = write!(
        prompt,
        "\nRespond with a JSON object {{\"id\": \"{}\", \"name\": \"{}\", \"score\": <number>, \"reason\": \"<one or two sentences>\"}}.",
        request.venue.id, request.venue.name
    );
    prompt
}

pub fn draft_prompt(request: &DraftRequest) -> String {
    let input = &request.input;
    let venue = &request.venue;
    let mut prompt = format!(
        "Write an outreach email to {} ({}, {}).\n\
         The venue scored {:.0}/100: {}\n",
        venue.name(),
        venue.venue.category,
        venue.venue.address,
        venue.score,
        venue.reason
    );

    let details = [
        ("Event date", input.event_date.as_deref().map(format_event_date)),
        ("Event time", input.event_time.clone()),
        ("Sender name", input.sender_name.clone()),
        ("Sender email", input.sender_email.clone()),
        ("LinkedIn", input.linkedin_url.clone()),
        ("Instagram", input.instagram_url.clone()),
        ("TikTok", input.tiktok_url.clone()),
    ];
    for (label, value) in details.iter() {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            let _ = writeln!(prompt, "{label}: {value}");
        }
    }

    if request.shortlisted {
        prompt.push_str("This venue is one of our top choices; say so.\n");
    }

    let _ = write!(
        prompt,
        "\nFollow the tone and structure of this template, filling in real values:\n\n{}",
        request.template.text()
    );
    prompt
}
