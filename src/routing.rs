//! Route wire model and the upstream routes client.
//!
//! The route endpoint mirrors the upstream computeRoutes response shape:
//! `{ "routes": [{ "duration": "<n>s", "distanceMeters": n,
//! "polyline": { "encodedPolyline": "..." } }, ...] }`. Deserialization is
//! lenient: a missing or non-string `duration` becomes `None` and parses to
//! zero seconds rather than failing the whole response.

use serde::{Deserialize, Deserializer, Serialize};

use crate::GpsPoint;

/// Response body of the route endpoint, mirroring the upstream shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// One computed route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Travel time as `"<seconds>s"`. Tolerates any other JSON value, which
    /// parses to zero via [`Route::duration_seconds`].
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<RoutePolyline>,
}

impl Route {
    /// Travel time in seconds; malformed or missing durations are zero.
    pub fn duration_seconds(&self) -> u64 {
        self.duration
            .as_deref()
            .map(parse_duration_seconds)
            .unwrap_or(0)
    }

    /// The encoded path, if the upstream supplied one.
    pub fn encoded_polyline(&self) -> Option<&str> {
        self.polyline.as_ref().and_then(|p| p.encoded_polyline.as_deref())
    }
}

/// Wrapper for the encoded path field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolyline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_polyline: Option<String>,
}

/// Accept any JSON value for a string field; non-strings become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// Parse a duration of the form `"<digits>s"` into seconds.
///
/// Anything else (empty input, missing suffix, non-digits, overflow)
/// parses to 0. Never errors.
pub fn parse_duration_seconds(raw: &str) -> u64 {
    let Some(digits) = raw.strip_suffix('s') else {
        return 0;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    digits.parse().unwrap_or(0)
}

/// A route request snapshot, taken at issuance time.
///
/// The origin is the user position at the moment of selection; the position
/// may move again before the response arrives, so the rendered path always
/// comes from the response, never from this snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteQuery {
    pub origin: GpsPoint,
    pub destination: GpsPoint,
}

/// Summary of a successfully drawn route, for the info line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: u64,
}

impl RouteSummary {
    /// Route length in miles, as displayed to the user.
    pub fn distance_miles(&self) -> f64 {
        self.distance_meters / 1609.34
    }

    /// Travel time rounded to whole minutes.
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_seconds as f64 / 60.0).round() as u64
    }
}

#[cfg(feature = "server")]
mod client {
    use log::debug;
    use serde::Serialize;

    use super::{RouteQuery, RoutesResponse};
    use crate::error::Error;

    const ROUTES_URL: &str = "https://routes.googleapis.com/directions/v2:computeRoutes";
    const FIELD_MASK: &str = "routes.duration,routes.distanceMeters,routes.polyline.encodedPolyline";

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ComputeRoutesRequest {
        origin: Waypoint,
        destination: Waypoint,
        travel_mode: &'static str,
        routing_preference: &'static str,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Waypoint {
        location: WaypointLocation,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct WaypointLocation {
        lat_lng: WireLatLng,
    }

    #[derive(Serialize)]
    struct WireLatLng {
        latitude: f64,
        longitude: f64,
    }

    impl From<crate::GpsPoint> for Waypoint {
        fn from(p: crate::GpsPoint) -> Self {
            Waypoint {
                location: WaypointLocation {
                    lat_lng: WireLatLng {
                        latitude: p.latitude,
                        longitude: p.longitude,
                    },
                },
            }
        }
    }

    /// Client for the upstream route computation service.
    pub struct RoutesClient {
        client: reqwest::Client,
        api_key: String,
        endpoint: String,
    }

    impl RoutesClient {
        pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
            Self {
                client,
                api_key: api_key.into(),
                endpoint: ROUTES_URL.to_string(),
            }
        }

        /// Point the client at a different endpoint (tests, local mocks).
        pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
            self.endpoint = endpoint.into();
            self
        }

        /// Compute a driving route for the given query.
        ///
        /// Both coordinates must be finite (`Error::BadRequest` otherwise,
        /// before any upstream call). Upstream non-success statuses are
        /// mirrored through as `Error::UpstreamStatus`; transport failures
        /// become `Error::Upstream`.
        pub async fn compute_route(&self, query: RouteQuery) -> Result<RoutesResponse, Error> {
            if !query.origin.is_finite() || !query.destination.is_finite() {
                return Err(Error::BadRequest("Invalid origin/destination".to_string()));
            }

            let body = ComputeRoutesRequest {
                origin: query.origin.into(),
                destination: query.destination.into(),
                travel_mode: "DRIVE",
                routing_preference: "TRAFFIC_AWARE",
            };

            let response = self
                .client
                .post(&self.endpoint)
                .header("X-Goog-Api-Key", &self.api_key)
                .header("X-Goog-FieldMask", FIELD_MASK)
                .json(&body)
                .send()
                .await
                .map_err(|e| Error::Upstream(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::UpstreamStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            let routes: RoutesResponse = response
                .json()
                .await
                .map_err(|e| Error::Upstream(e.to_string()))?;
            debug!("route response with {} route(s)", routes.routes.len());
            Ok(routes)
        }
    }
}

#[cfg(feature = "server")]
pub use client::RoutesClient;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration_seconds("125s"), 125);
        assert_eq!(parse_duration_seconds("0s"), 0);
        assert_eq!(parse_duration_seconds("abc"), 0);
        assert_eq!(parse_duration_seconds("125"), 0);
        assert_eq!(parse_duration_seconds("s"), 0);
        assert_eq!(parse_duration_seconds(""), 0);
        assert_eq!(parse_duration_seconds("-5s"), 0);
        assert_eq!(parse_duration_seconds("1.5s"), 0);
    }

    #[test]
    fn test_route_deserializes_upstream_shape() {
        let resp: RoutesResponse = serde_json::from_str(
            r#"{"routes": [{"duration": "842s", "distanceMeters": 10713.0,
                "polyline": {"encodedPolyline": "_p~iF~ps|U"}}]}"#,
        )
        .unwrap();
        let route = &resp.routes[0];
        assert_eq!(route.duration_seconds(), 842);
        assert_eq!(route.distance_meters, Some(10713.0));
        assert_eq!(route.encoded_polyline(), Some("_p~iF~ps|U"));
    }

    #[test]
    fn test_non_string_duration_parses_to_zero() {
        let resp: RoutesResponse =
            serde_json::from_str(r#"{"routes": [{"duration": 42}]}"#).unwrap();
        assert_eq!(resp.routes[0].duration_seconds(), 0);
    }

    #[test]
    fn test_empty_routes() {
        let resp: RoutesResponse = serde_json::from_str(r#"{"routes": []}"#).unwrap();
        assert!(resp.routes.is_empty());
        let resp: RoutesResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.routes.is_empty());
    }

    #[test]
    fn test_summary_units() {
        let summary = RouteSummary {
            distance_meters: 3218.68,
            duration_seconds: 125,
        };
        assert!((summary.distance_miles() - 2.0).abs() < 1e-6);
        assert_eq!(summary.duration_minutes(), 2);
    }
}
