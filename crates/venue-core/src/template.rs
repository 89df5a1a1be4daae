//! Outreach email templates and placeholder substitution.

use chrono::NaiveDate;

use crate::domain::{InputData, ScoredVenue};

/// Built-in outreach template. Also handed to the drafting model as a
/// style guide when no literal template is supplied.
pub const DEFAULT_EMAIL_TEMPLATE: &str = "\
Dear {name},

I hope this email finds you well. I came across {venue_name} and I'm very interested in potentially hosting an event at your venue on {event_date} at {event_time}.

{proceed_message}

I would love to discuss this further and learn more about:
- Availability around our preferred date
- Pricing for different event packages
- Venue capacity and layout options
- Available amenities and services

Could we schedule a brief call or meeting to discuss these details?

Looking forward to hearing from you.

Best regards,
{sender_name}
{sender_email}
";

/// Wording for venues on the shortlist.
pub const PROCEED_MESSAGE: &str = "After carefully reviewing several venues in the area, {venue_name} stands out as one of our top choices due to its excellent location and amenities.";

/// Wording for every other venue.
pub const GENERAL_MESSAGE: &str =
    "I've been researching various venues in the area and your space caught my attention.";

/// Values substituted into a template for one venue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    pub venue_name: String,
    pub contact_name: String,
    pub proceed_message: String,
    pub event_date: String,
    pub event_time: String,
    pub sender_name: String,
    pub sender_email: String,
    pub linkedin_url: String,
    pub instagram_url: String,
    pub tiktok_url: String,
}

impl TemplateContext {
    /// Context for `venue`. `shortlisted` selects the proceed wording.
    pub fn for_venue(input: &InputData, venue: &ScoredVenue, shortlisted: bool) -> Self {
        let venue_name = venue.name().trim().to_string();
        let message = if shortlisted { PROCEED_MESSAGE } else { GENERAL_MESSAGE };
        let owned = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            contact_name: format!("{venue_name} Team"),
            proceed_message: message.replace("{venue_name}", &venue_name),
            event_date: input
                .event_date
                .as_deref()
                .map(format_event_date)
                .unwrap_or_default(),
            event_time: owned(&input.event_time),
            sender_name: owned(&input.sender_name),
            sender_email: owned(&input.sender_email),
            linkedin_url: owned(&input.linkedin_url),
            instagram_url: owned(&input.instagram_url),
            tiktok_url: owned(&input.tiktok_url),
            venue_name,
        }
    }
}

/// A template with `{placeholder}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    text: String,
}

impl EmailTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn builtin() -> Self {
        Self::new(DEFAULT_EMAIL_TEMPLATE)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute every known placeholder in one pass over the template.
    /// Inserted values are never scanned again. Unknown placeholders are
    /// left in place.
    pub fn render(&self, ctx: &TemplateContext) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let slot = &rest[open..];
            let Some(close) = slot[1..].find(|c: char| c == '{' || c == '}') else {
                out.push_str(slot);
                return out;
            };
            // `close` is relative to slot[1..].
            if slot.as_bytes()[close + 1] == b'{' {
                out.push('{');
                rest = &slot[1..];
                continue;
            }
            match ctx.value(&slot[1..close + 1]) {
                Some(value) => out.push_str(value),
                None => out.push_str(&slot[..close + 2]),
            }
            rest = &slot[close + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl TemplateContext {
    fn value(&self, slot: &str) -> Option<&str> {
        let value = match slot {
            "proceed_message" => &self.proceed_message,
            "venue_name" => &self.venue_name,
            "name" => &self.contact_name,
            "event_date" => &self.event_date,
            "event_time" => &self.event_time,
            "sender_name" => &self.sender_name,
            "sender_email" => &self.sender_email,
            "linkedin_url" => &self.linkedin_url,
            "instagram_url" => &self.instagram_url,
            "tiktok_url" => &self.tiktok_url,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// `2024-06-01` becomes `Saturday June 01, 2024`; anything else is kept.
pub fn format_event_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%A %B %d, %Y").to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Venue, VenueScore};

    fn scored(name: &str) -> ScoredVenue {
        ScoredVenue::new(
            Venue::new("a", name, "bar", "1 Main St", 0.1),
            &VenueScore::for_id("a", 80.0, ""),
        )
    }

    fn input() -> InputData {
        let mut input = InputData::new("1 Main St", 0.5);
        input.event_date = Some("2024-06-01".into());
        input.event_time = Some("2:00 PM".into());
        input.sender_name = Some("John Doe".into());
        input.sender_email = Some("john.doe@example.com".into());
        input
    }

    #[test]
    fn test_format_event_date() {
        assert_eq!(format_event_date("2024-06-01"), "Saturday June 01, 2024");
        assert_eq!(format_event_date("next spring"), "next spring");
    }

    #[test]
    fn test_render_builtin_for_shortlisted_venue() {
        let ctx = TemplateContext::for_venue(&input(), &scored("The Loft"), true);
        let body = EmailTemplate::builtin().render(&ctx);

        assert!(body.starts_with("Dear The Loft Team,"));
        assert!(body.contains("The Loft stands out as one of our top choices"));
        assert!(body.contains("on Saturday June 01, 2024 at 2:00 PM"));
        assert!(body.contains("John Doe\njohn.doe@example.com"));
        assert!(!body.contains("{venue_name}"));
    }

    #[test]
    fn test_render_general_message_when_not_shortlisted() {
        let ctx = TemplateContext::for_venue(&input(), &scored("Hall"), false);
        let body = EmailTemplate::new("{proceed_message}").render(&ctx);
        assert_eq!(body, GENERAL_MESSAGE);
    }

    #[test]
    fn test_unknown_placeholders_survive_and_missing_values_blank() {
        let ctx = TemplateContext::for_venue(&InputData::new("x", 1.0), &scored("Hall"), false);
        let body = EmailTemplate::new("{venue_name}|{tiktok_url}|{budget}").render(&ctx);
        assert_eq!(body, "Hall||{budget}");
    }

    #[test]
    fn test_inserted_values_are_not_expanded_again() {
        let mut input = input();
        input.sender_name = Some("{sender_email}".into());
        let ctx = TemplateContext::for_venue(&input, &scored("Bar {name}"), false);

        let body = EmailTemplate::new("{venue_name}|{sender_name}|{sender_email}").render(&ctx);
        assert_eq!(body, "Bar {name}|{sender_email}|john.doe@example.com");
    }

    #[test]
    fn test_stray_braces_are_kept() {
        let ctx = TemplateContext::for_venue(&input(), &scored("Hall"), false);
        let body = EmailTemplate::new("{ {venue_name} } {open").render(&ctx);
        assert_eq!(body, "{ Hall } {open");
    }
}
