//! # Bathroom Finder
//!
//! Find the nearest restroom-friendly venue: aggregate nearby-place searches
//! across venue categories, rank candidates by distance from a live GPS
//! position, and draw a driving route to the selected venue.
//!
//! This library provides:
//! - Concurrent aggregation of category-filtered nearby searches with
//!   identity deduplication ([`aggregator`], `server` feature)
//! - Distance ranking with near-duplicate removal ([`ranking`])
//! - A map-follow state machine with pause-on-interaction and timed resume
//!   ([`follow`])
//! - Session state and route drawing over an abstract map surface
//!   ([`session`], [`routing`], [`polyline`])
//!
//! ## Features
//!
//! - **`server`** (default) - Backend proxy endpoints and the upstream
//!   Places/Routes client
//!
//! ## Quick Start
//!
//! ```rust
//! use bathroom_finder::{GpsPoint, Place, ranking::{rank_places, RankConfig}};
//!
//! let places: Vec<Place> = serde_json::from_str(
//!     r#"[
//!         {"id": "a", "displayName": {"text": "Corner Cafe"},
//!          "location": {"latitude": 51.5074, "longitude": -0.1278}},
//!         {"id": "b", "displayName": {"text": "Corner Cafe|Annex"},
//!          "location": {"latitude": 51.50741, "longitude": -0.12781}}
//!     ]"#,
//! ).unwrap();
//!
//! let user = GpsPoint::new(51.5080, -0.1290);
//! let ranked = rank_places(places, user, &RankConfig::default());
//!
//! // The annex is the same venue within 25m, so one entry survives.
//! assert_eq!(ranked.len(), 1);
//! println!("{} ({:.2} mi)", ranked[0].name(), ranked[0].distance_miles());
//! ```

use serde::{Deserialize, Serialize};

// Backend aggregation and proxy (requires an upstream API key at runtime)
#[cfg(feature = "server")]
pub mod aggregator;
#[cfg(feature = "server")]
pub mod server;

pub mod error;
pub mod follow;
pub mod geo_utils;
pub mod places;
pub mod polyline;
pub mod ranking;
pub mod routing;
pub mod session;

#[cfg(feature = "server")]
pub use aggregator::{NearbyAggregator, SearchConfig, SEARCH_CATEGORIES};

pub use error::Error;
pub use follow::{CameraAction, FollowState, FollowTracker, ResumeTimer, TimerId};
pub use geo_utils::Bounds;
pub use places::{LatLng, Place, PlacesResponse};
pub use ranking::{rank_places, RankConfig, RankedPlace};
pub use routing::{parse_duration_seconds, Route, RouteQuery, RouteSummary, RoutesResponse};
pub use session::{MapSurface, Session};

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use bathroom_finder::GpsPoint;
/// let point = GpsPoint::new(51.5074, -0.1278); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}
