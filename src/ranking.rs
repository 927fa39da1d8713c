//! Candidate ranking and deduplication.
//!
//! Turns the raw candidate collection from the nearby search into the ordered
//! top-N list shown to the user. The pipeline runs in a fixed order, and the
//! order matters: later steps assume earlier invariants.
//!
//! 1. Identity dedup: drop candidates without an id, keep the first
//!    occurrence of each id.
//! 2. Enrichment: compute great-circle distance from the user's position;
//!    candidates without a finite location are dropped silently (malformed
//!    upstream rows are expected, not an error).
//! 3. Near-duplicate dedup: same normalized name within 25 m means the same
//!    real-world venue listed twice under different ids; the first in input
//!    order wins, regardless of which is closer to the user.
//! 4. Sort ascending by distance.
//! 5. Truncate to the top 10.
//!
//! The result list is rebuilt from scratch on every search.

use std::collections::HashSet;

use crate::geo_utils::haversine_distance;
use crate::{GpsPoint, Place};

const METERS_PER_MILE: f64 = 1609.34;

/// Configuration for ranking and near-duplicate removal.
#[derive(Debug, Clone)]
pub struct RankConfig {
    /// Two candidates with equal normalized names at most this far apart
    /// are the same venue. Default: 25.0 meters
    pub near_duplicate_radius_meters: f64,

    /// Maximum number of entries in the ranked output. Default: 10
    pub max_results: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            near_duplicate_radius_meters: 25.0,
            max_results: 10,
        }
    }
}

/// A candidate enriched with its distance from the user.
///
/// Only built for candidates with finite coordinates; lives for a single
/// result-display cycle and is discarded on the next search.
#[derive(Debug, Clone)]
pub struct RankedPlace {
    pub place: Place,
    pub lat: f64,
    pub lng: f64,
    pub distance_meters: f64,
}

impl RankedPlace {
    /// Display name, or a placeholder for unnamed venues.
    pub fn name(&self) -> &str {
        self.place.name().unwrap_or("Unnamed place")
    }

    /// The venue position.
    pub fn position(&self) -> GpsPoint {
        GpsPoint::new(self.lat, self.lng)
    }

    /// Distance from the user in miles, as shown in the result list.
    pub fn distance_miles(&self) -> f64 {
        self.distance_meters / METERS_PER_MILE
    }
}

/// Remove candidates with duplicate identifiers.
///
/// Candidates without an id are dropped; among candidates sharing an id the
/// first encountered wins.
pub fn dedupe_by_id(places: Vec<Place>) -> Vec<Place> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(places.len());

    for place in places {
        let Some(id) = place.id.as_deref() else {
            continue;
        };
        if id.is_empty() || !seen.insert(id.to_string()) {
            continue;
        }
        out.push(place);
    }
    out
}

/// Normalize a display name for near-duplicate comparison.
///
/// Lowercases, truncates at the first `|` (upstream names sometimes encode
/// secondary info after a pipe), and trims surrounding whitespace.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .split('|')
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Produce the ordered top-N list for display.
///
/// See the module docs for the pipeline; `user` is the position candidates
/// are ranked against.
pub fn rank_places(places: Vec<Place>, user: GpsPoint, config: &RankConfig) -> Vec<RankedPlace> {
    let places = dedupe_by_id(places);

    let enriched = places.into_iter().filter_map(|place| {
        let loc = place.location?;
        let (lat, lng) = (loc.latitude?, loc.longitude?);
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        let distance_meters = haversine_distance(&user, &GpsPoint::new(lat, lng));
        Some(RankedPlace {
            place,
            lat,
            lng,
            distance_meters,
        })
    });

    let mut kept: Vec<RankedPlace> = Vec::new();
    for item in enriched {
        let name = normalize_name(item.place.name().unwrap_or(""));
        // An empty normalized name is never a duplicate of anything.
        let is_dupe = !name.is_empty()
            && kept.iter().any(|existing| {
                normalize_name(existing.place.name().unwrap_or("")) == name
                    && haversine_distance(&existing.position(), &item.position())
                        <= config.near_duplicate_radius_meters
            });
        if !is_dupe {
            kept.push(item);
        }
    }

    kept.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    kept.truncate(config.max_results);
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::{LatLng, LocalizedText};

    fn place(id: Option<&str>, name: Option<&str>, lat: f64, lng: f64) -> Place {
        Place {
            id: id.map(str::to_string),
            display_name: name.map(|n| LocalizedText {
                text: Some(n.to_string()),
                language_code: None,
            }),
            location: Some(LatLng {
                latitude: Some(lat),
                longitude: Some(lng),
            }),
            formatted_address: None,
            types: Vec::new(),
        }
    }

    #[test]
    fn test_dedupe_by_id_first_wins() {
        let input = vec![
            place(Some("a"), Some("First"), 0.0, 0.0),
            place(Some("b"), Some("Other"), 1.0, 1.0),
            place(Some("a"), Some("Second"), 2.0, 2.0),
        ];
        let out = dedupe_by_id(input);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name(), Some("First"));
        assert_eq!(out[1].name(), Some("Other"));
    }

    #[test]
    fn test_dedupe_by_id_drops_missing_ids() {
        let input = vec![
            place(None, Some("No id"), 0.0, 0.0),
            place(Some(""), Some("Empty id"), 0.0, 0.0),
            place(Some("a"), Some("Keeper"), 0.0, 0.0),
        ];
        let out = dedupe_by_id(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name(), Some("Keeper"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Joe's Cafe|branch2"), "joe's cafe");
        assert_eq!(normalize_name("  TESCO Express  "), "tesco express");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("|tail only"), "");
    }

    #[test]
    fn test_near_duplicate_same_name_within_radius_dropped() {
        // ~15.7m apart at the equator; normalized names match after the
        // pipe truncation, so the second entry is the same venue.
        let input = vec![
            place(Some("1"), Some("Joe's Cafe|branch2"), 0.0, 0.0),
            place(Some("2"), Some("joe's cafe"), 0.0001, 0.0001),
        ];
        let out = rank_places(input, GpsPoint::new(0.0, 0.0), &RankConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].place.id.as_deref(), Some("1"));
    }

    #[test]
    fn test_near_duplicate_first_wins_even_when_farther() {
        // The farther entry comes first in input order and survives.
        let user = GpsPoint::new(0.0, 0.0);
        let input = vec![
            place(Some("far"), Some("Kiosk"), 0.00010, 0.0),
            place(Some("near"), Some("Kiosk"), 0.00002, 0.0),
        ];
        let out = rank_places(input, user, &RankConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].place.id.as_deref(), Some("far"));
    }

    #[test]
    fn test_same_name_far_apart_both_kept() {
        let input = vec![
            place(Some("1"), Some("Shell"), 0.0, 0.0),
            place(Some("2"), Some("Shell"), 0.01, 0.01), // ~1.5km away
        ];
        let out = rank_places(input, GpsPoint::new(0.0, 0.0), &RankConfig::default());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_unnamed_candidates_never_deduped() {
        let input = vec![
            place(Some("1"), None, 0.0, 0.0),
            place(Some("2"), None, 0.0, 0.0),
            place(Some("3"), Some("|"), 0.0, 0.0),
        ];
        let out = rank_places(input, GpsPoint::new(0.0, 0.0), &RankConfig::default());
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_malformed_locations_dropped_silently() {
        let mut missing = place(Some("1"), Some("No location"), 0.0, 0.0);
        missing.location = None;
        let mut partial = place(Some("2"), Some("Half location"), 0.0, 0.0);
        partial.location = Some(LatLng {
            latitude: Some(1.0),
            longitude: None,
        });
        let nan = place(Some("3"), Some("NaN"), f64::NAN, 0.0);
        let ok = place(Some("4"), Some("Fine"), 0.001, 0.001);

        let out = rank_places(
            vec![missing, partial, nan, ok],
            GpsPoint::new(0.0, 0.0),
            &RankConfig::default(),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].place.id.as_deref(), Some("4"));
    }

    #[test]
    fn test_sorted_ascending_and_truncated() {
        let user = GpsPoint::new(0.0, 0.0);
        // 15 distinct venues at increasing distance, shuffled input order.
        let mut input: Vec<Place> = (0..15)
            .map(|i| {
                let id = format!("id-{i}");
                let name = format!("Venue {i}");
                place(Some(id.as_str()), Some(name.as_str()), 0.001 * (i + 1) as f64, 0.0)
            })
            .collect();
        input.reverse();

        let out = rank_places(input, user, &RankConfig::default());
        assert_eq!(out.len(), 10);
        for pair in out.windows(2) {
            assert!(pair[0].distance_meters <= pair[1].distance_meters);
        }
        assert_eq!(out[0].place.id.as_deref(), Some("id-0"));
    }

    #[test]
    fn test_distance_miles() {
        let ranked = RankedPlace {
            place: place(Some("1"), Some("X"), 0.0, 0.0),
            lat: 0.0,
            lng: 0.0,
            distance_meters: 1609.34,
        };
        assert!((ranked.distance_miles() - 1.0).abs() < 1e-9);
    }
}
