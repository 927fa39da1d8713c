//! Wire model for candidate places.
//!
//! These structs mirror the upstream Places API response shape, restricted to
//! the fields the search requests ask for (`places.id`, `places.displayName`,
//! `places.location`, `places.formattedAddress`, `places.types`). Every field
//! is optional: upstream rows with missing ids or partial locations are
//! expected and handled downstream, not rejected at parse time.

use serde::{Deserialize, Serialize};

/// A venue returned by the nearby search, before ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Opaque stable identifier; entries without one are excluded by
    /// identity dedup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    /// Category tags, e.g. `cafe` or `gas_station`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl Place {
    /// The display name text, if any.
    pub fn name(&self) -> Option<&str> {
        self.display_name.as_ref().and_then(|n| n.text.as_deref())
    }
}

/// Localized display name as delivered by the upstream API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Latitude/longitude pair in upstream wire form. Either component may be
/// absent in malformed rows; consumers must check finiteness.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Body of the nearby-search endpoint response: candidates already
/// identity-deduplicated by the aggregator, in no particular order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacesResponse {
    #[serde(default)]
    pub places: Vec<Place>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_full_row() {
        let p: Place = serde_json::from_str(
            r#"{
                "id": "ChIJabc",
                "displayName": {"text": "Joe's Cafe", "languageCode": "en"},
                "location": {"latitude": 51.5, "longitude": -0.12},
                "formattedAddress": "1 High St",
                "types": ["cafe", "store"]
            }"#,
        )
        .unwrap();
        assert_eq!(p.id.as_deref(), Some("ChIJabc"));
        assert_eq!(p.name(), Some("Joe's Cafe"));
        assert_eq!(p.types, vec!["cafe", "store"]);
    }

    #[test]
    fn test_parses_partial_row() {
        // Upstream rows routinely omit fields outside the mask.
        let p: Place = serde_json::from_str(r#"{"location": {"latitude": 1.0}}"#).unwrap();
        assert!(p.id.is_none());
        assert!(p.name().is_none());
        let loc = p.location.unwrap();
        assert_eq!(loc.latitude, Some(1.0));
        assert_eq!(loc.longitude, None);
    }

    #[test]
    fn test_response_without_places_field() {
        // An empty search legitimately returns `{}`.
        let r: PlacesResponse = serde_json::from_str("{}").unwrap();
        assert!(r.places.is_empty());
    }
}
