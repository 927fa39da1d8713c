//! Candidate aggregation over the upstream places search.
//!
//! One nearby-search request per venue category, all issued concurrently and
//! joined with an all-complete barrier: end-to-end latency is bounded by the
//! slowest single category, not the sum. A category that fails with a
//! non-success status is logged and contributes zero results; it never
//! aborts the sibling requests or the overall search. Only a total inability
//! to reach the upstream service fails the operation.
//!
//! The merge step drops candidates without an id and deduplicates by id,
//! first occurrence wins (the same venue is routinely returned under several
//! categories). No ranking happens here; the caller's position is only the
//! search center.

use futures::future::join_all;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;

use crate::error::Error;
use crate::places::Place;
use crate::GpsPoint;

const SEARCH_URL: &str = "https://places.googleapis.com/v1/places:searchNearby";
const FIELD_MASK: &str =
    "places.id,places.displayName,places.location,places.formattedAddress,places.types";

/// Venue categories likely to have a usable restroom, queried in this order.
pub const SEARCH_CATEGORIES: [&str; 15] = [
    "gas_station",
    "fast_food_restaurant",
    "cafe",
    "supermarket",
    "convenience_store",
    "store",
    "pharmacy",
    "rest_stop",
    "public_bathroom",
    "library",
    "city_hall",
    "post_office",
    "community_center",
    "hotel",
    "bowling_alley",
];

/// Configuration for the nearby search fan-out.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Search radius around the user. Default: 3000.0 meters
    pub radius_meters: f64,

    /// Per-category result cap. Default: 19
    pub max_results_per_category: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            radius_meters: 3000.0,
            max_results_per_category: 19,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchNearbyRequest<'a> {
    location_restriction: LocationRestriction,
    max_result_count: u32,
    included_types: [&'a str; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Circle {
    center: WireLatLng,
    radius: f64,
}

#[derive(Serialize)]
struct WireLatLng {
    latitude: f64,
    longitude: f64,
}

/// How a single category request failed.
#[derive(Debug)]
pub enum CategoryError {
    /// Upstream replied with a non-success status. Absorbed.
    Status(u16),
    /// The request never completed (connect/send failure).
    Transport(String),
}

/// Result of one category's search.
#[derive(Debug)]
pub struct CategoryOutcome {
    pub category: &'static str,
    pub result: Result<Vec<Place>, CategoryError>,
}

/// Aggregates category-filtered nearby searches against the places service.
pub struct NearbyAggregator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    config: SearchConfig,
}

impl NearbyAggregator {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: SEARCH_URL.to_string(),
            config: SearchConfig::default(),
        }
    }

    /// Point the aggregator at a different endpoint (tests, local mocks).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Search every category around `center` and merge the results.
    ///
    /// Validates the coordinate before any upstream call. The output is
    /// identity-deduplicated and unordered.
    pub async fn search_nearby(&self, center: GpsPoint) -> Result<Vec<Place>, Error> {
        if !center.is_finite() {
            return Err(Error::BadRequest("Invalid lat/lng".to_string()));
        }

        let requests = SEARCH_CATEGORIES
            .iter()
            .map(|&category| self.search_category(center, category));
        let outcomes = join_all(requests).await;

        let succeeded = outcomes.iter().filter(|o| o.result.is_ok()).count();
        info!(
            "nearby search at ({:.5}, {:.5}): {}/{} categories succeeded",
            center.latitude,
            center.longitude,
            succeeded,
            outcomes.len()
        );

        merge_category_results(outcomes)
    }

    async fn search_category(&self, center: GpsPoint, category: &'static str) -> CategoryOutcome {
        let body = SearchNearbyRequest {
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: WireLatLng {
                        latitude: center.latitude,
                        longitude: center.longitude,
                    },
                    radius: self.config.radius_meters,
                },
            },
            max_result_count: self.config.max_results_per_category,
            included_types: [category],
        };

        let response = match self
            .client
            .post(&self.endpoint)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return CategoryOutcome {
                    category,
                    result: Err(CategoryError::Transport(e.to_string())),
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return CategoryOutcome {
                category,
                result: Err(CategoryError::Status(status.as_u16())),
            };
        }

        match response.json::<crate::places::PlacesResponse>().await {
            Ok(parsed) => CategoryOutcome {
                category,
                result: Ok(parsed.places),
            },
            Err(e) => CategoryOutcome {
                category,
                result: Err(CategoryError::Transport(e.to_string())),
            },
        }
    }
}

/// Merge per-category outcomes into one identity-deduplicated collection.
///
/// Failed categories are logged and skipped. If no category succeeded and at
/// least one failed at the transport level, the upstream service is treated
/// as unreachable and the whole search fails.
pub fn merge_category_results(outcomes: Vec<CategoryOutcome>) -> Result<Vec<Place>, Error> {
    let any_success = outcomes.iter().any(|o| o.result.is_ok());
    let transport_failures = outcomes
        .iter()
        .filter(|o| matches!(o.result, Err(CategoryError::Transport(_))))
        .count();
    if !any_success && transport_failures > 0 {
        return Err(Error::Upstream(format!(
            "all {} categories failed, {} at transport level",
            outcomes.len(),
            transport_failures
        )));
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for outcome in outcomes {
        let places = match outcome.result {
            Ok(places) => places,
            Err(CategoryError::Status(status)) => {
                warn!("nearby category failed: {} (HTTP {})", outcome.category, status);
                continue;
            }
            Err(CategoryError::Transport(reason)) => {
                warn!("nearby category failed: {} ({})", outcome.category, reason);
                continue;
            }
        };
        for place in places {
            let Some(id) = place.id.as_deref() else {
                continue;
            };
            if id.is_empty() || !seen.insert(id.to_string()) {
                continue;
            }
            merged.push(place);
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::LatLng;

    fn ok(category: &'static str, ids: &[&str]) -> CategoryOutcome {
        CategoryOutcome {
            category,
            result: Ok(ids
                .iter()
                .map(|id| Place {
                    id: Some(id.to_string()),
                    location: Some(LatLng {
                        latitude: Some(0.0),
                        longitude: Some(0.0),
                    }),
                    ..Default::default()
                })
                .collect()),
        }
    }

    fn failed(category: &'static str, error: CategoryError) -> CategoryOutcome {
        CategoryOutcome {
            category,
            result: Err(error),
        }
    }

    #[test]
    fn test_partial_failure_is_absorbed() {
        let merged = merge_category_results(vec![
            ok("cafe", &["a"]),
            failed("pharmacy", CategoryError::Status(403)),
        ])
        .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id.as_deref(), Some("a"));

        // A transport-level failure is also absorbed while a sibling
        // category succeeded.
        let merged = merge_category_results(vec![
            ok("cafe", &["a"]),
            failed(
                "pharmacy",
                CategoryError::Transport("connection reset".to_string()),
            ),
        ])
        .unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_across_categories_first_wins() {
        let merged = merge_category_results(vec![
            ok("gas_station", &["x", "y"]),
            ok("store", &["y", "z"]),
        ])
        .unwrap();
        let ids: Vec<&str> = merged.iter().filter_map(|p| p.id.as_deref()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_missing_ids_are_dropped() {
        let mut outcome = ok("cafe", &["a"]);
        if let Ok(places) = &mut outcome.result {
            places.push(Place::default());
        }
        let merged = merge_category_results(vec![outcome]).unwrap();
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_all_transport_failures_is_upstream_error() {
        let err = merge_category_results(vec![
            failed("cafe", CategoryError::Transport("connection refused".to_string())),
            failed("store", CategoryError::Transport("connection refused".to_string())),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[test]
    fn test_all_status_failures_yield_empty_list() {
        // Upstream was reachable; it just refused every category.
        let merged = merge_category_results(vec![
            failed("cafe", CategoryError::Status(403)),
            failed("store", CategoryError::Status(403)),
        ])
        .unwrap();
        assert!(merged.is_empty());
    }

    #[test]
    fn test_empty_outcomes_merge_to_empty() {
        assert!(merge_category_results(vec![]).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_finite_center_rejected_before_any_call() {
        let aggregator = NearbyAggregator::new(reqwest::Client::new(), "test-key")
            .with_endpoint("http://127.0.0.1:1/unreachable");
        let err = aggregator
            .search_nearby(GpsPoint::new(f64::NAN, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }
}
