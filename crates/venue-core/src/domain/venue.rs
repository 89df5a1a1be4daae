//! Venue records produced by the search stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ValidationError;
use super::lenient;

/// A candidate event venue.
///
/// Created from parsed search results and read-only afterwards; other
/// records refer to it by id or name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Stable identifier. Generated from the name when the search result
    /// carries none.
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Category such as `hotel`, `event_space` or `restaurant`.
    #[serde(rename = "type")]
    pub category: String,
    pub address: String,
    /// Distance from the search origin in kilometres.
    pub distance_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_features: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_visual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<String>,
}

impl Venue {
    /// Venue with the required fields set and every optional field empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        address: impl Into<String>,
        distance_km: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            address: address.into(),
            distance_km,
            website: None,
            phone: None,
            email: None,
            capacity: None,
            amenities: Vec::new(),
            accessibility: None,
            parking: None,
            special_features: None,
            audio_visual: None,
            technology: None,
            other: None,
        }
    }

    /// Validate one search result against the venue shape, field by field.
    ///
    /// `name`, `type` (or `category`), `address` and `distance_km` are
    /// required. Contact and feature fields are optional and tolerate the
    /// usual drift in model output (numeric strings, comma-separated lists).
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let obj = value.as_object().ok_or(ValidationError::NotAnObject)?;

        let distance_km = lenient::required_number(obj, "distance_km", &["distance_km", "distance"])?;
        if distance_km < 0.0 {
            return Err(ValidationError::InvalidField {
                field: "distance_km",
                reason: format!("must not be negative, got {distance_km}"),
            });
        }

        Ok(Self {
            id: lenient::opt_string(obj, &["id", "venue_id"]).unwrap_or_default(),
            name: lenient::required_string(obj, "name", &["name"])?,
            category: lenient::required_string(obj, "type", &["type", "category"])?,
            address: lenient::required_string(obj, "address", &["address"])?,
            distance_km,
            website: lenient::opt_string(obj, &["website", "url"]),
            phone: lenient::opt_string(obj, &["phone"]),
            email: lenient::opt_string(obj, &["email"]),
            capacity: lenient::opt_u32(obj, &["capacity"]),
            amenities: lenient::string_list(obj, &["amenities"]),
            accessibility: lenient::opt_string(obj, &["accessibility"]),
            parking: lenient::opt_string(obj, &["parking"]),
            special_features: lenient::opt_string(obj, &["special_features"]),
            audio_visual: lenient::opt_string(obj, &["audio_visual"]),
            technology: lenient::opt_string(obj, &["technology"]),
            other: lenient::opt_string(obj, &["other"]),
        })
    }

    /// Whether the record carries a usable identifier.
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_full_record() {
        let v = Venue::from_value(&json!({
            "id": "loft",
            "name": "The Loft",
            "type": "event_space",
            "address": "1 Main St",
            "distance_km": 0.4,
            "website": "https://loft.example",
            "phone": "",
            "capacity": "120 people",
            "amenities": "wifi, projector",
            "parking": "street"
        }))
        .unwrap();

        assert_eq!(v.id, "loft");
        assert_eq!(v.category, "event_space");
        assert_eq!(v.website.as_deref(), Some("https://loft.example"));
        assert!(v.phone.is_none());
        assert_eq!(v.capacity, Some(120));
        assert_eq!(v.amenities, vec!["wifi", "projector"]);
        assert_eq!(v.parking.as_deref(), Some("street"));
    }

    #[test]
    fn test_from_value_accepts_category_alias_and_missing_id() {
        let v = Venue::from_value(&json!({
            "name": "Hall",
            "category": "hotel",
            "address": "2 Main St",
            "distance_km": "1.2"
        }))
        .unwrap();
        assert_eq!(v.category, "hotel");
        assert_eq!(v.distance_km, 1.2);
        assert!(!v.has_id());
    }

    #[test]
    fn test_from_value_rejects_missing_name() {
        let err = Venue::from_value(&json!({
            "type": "hotel",
            "address": "2 Main St",
            "distance_km": 1.0
        }))
        .unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "name" });
    }

    #[test]
    fn test_from_value_rejects_negative_distance() {
        let err = Venue::from_value(&json!({
            "name": "Hall",
            "type": "hotel",
            "address": "2 Main St",
            "distance_km": -1
        }))
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "distance_km", .. }));
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert_eq!(
            Venue::from_value(&json!("The Loft")).unwrap_err(),
            ValidationError::NotAnObject
        );
    }

    #[test]
    fn test_serialized_form_uses_type_key() {
        let v = Venue::new("a", "Loft", "bar", "1 Main St", 0.1);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "bar");
        assert!(json.get("website").is_none());
    }
}
