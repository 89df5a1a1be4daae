//! Drafting by literal placeholder substitution. No network access.

use async_trait::async_trait;
use venue_core::TemplateContext;

use crate::capability::{DraftRequest, EmailDrafter};
use crate::error::Result;

/// Fills the request's template with the venue and sender details.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateDrafter;

#[async_trait]
impl EmailDrafter for TemplateDrafter {
    async fn draft(&self, request: &DraftRequest) -> Result<String> {
        let ctx = TemplateContext::for_venue(&request.input, &request.venue, request.shortlisted);
        Ok(request.template.render(&ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venue_core::{EmailTemplate, InputData, ScoredVenue, Venue, VenueScore};

    #[tokio::test]
    async fn test_literal_template_is_filled() {
        let mut input = InputData::new("1 Main St", 1.0);
        input.sender_name = Some("Ada".into());
        let request = DraftRequest {
            venue: ScoredVenue::new(
                Venue::new("hall", "Grand Hall", "ballroom", "2 Main St", 0.3),
                &VenueScore::for_id("hall", 70.0, ""),
            ),
            input,
            shortlisted: false,
            template: EmailTemplate::new("Hi {name}, {sender_name} here about {venue_name}."),
        };

        let body = TemplateDrafter.draft(&request).await.unwrap();
        assert_eq!(body, "Hi Grand Hall Team, Ada here about Grand Hall.");
    }
}
