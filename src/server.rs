//! Backend proxy endpoints.
//!
//! A thin reshaping layer in front of the upstream places/routes service:
//! `/api/nearby` fans out the category searches and returns the merged,
//! identity-deduplicated candidates; `/api/route` forwards a route request
//! and mirrors the upstream response shape; `/api/maps-config` hands the
//! frontend its map bootstrap URL. Coordinates are validated before anything
//! leaves the process.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use crate::aggregator::NearbyAggregator;
use crate::error::Error;
use crate::places::PlacesResponse;
use crate::routing::{RouteQuery, RoutesClient, RoutesResponse};
use crate::GpsPoint;

/// Shared state: one pooled HTTP client behind both upstream clients.
pub struct AppState {
    pub places: NearbyAggregator,
    pub routes: RoutesClient,
    pub web_api_key: Option<String>,
}

impl AppState {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        web_api_key: Option<String>,
    ) -> Self {
        let api_key = api_key.into();
        Self {
            places: NearbyAggregator::new(client.clone(), api_key.clone()),
            routes: RoutesClient::new(client, api_key),
            web_api_key,
        }
    }
}

/// Build the router with CORS open to the browser frontend.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/nearby", get(nearby))
        .route("/api/route", get(route))
        .route("/api/maps-config", get(maps_config))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct NearbyParams {
    lat: f64,
    lng: f64,
}

async fn nearby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<PlacesResponse>, Error> {
    let center = GpsPoint::new(params.lat, params.lng);
    let places = state.places.search_nearby(center).await?;
    Ok(Json(PlacesResponse { places }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteParams {
    o_lat: f64,
    o_lng: f64,
    d_lat: f64,
    d_lng: f64,
}

async fn route(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RouteParams>,
) -> Result<Json<RoutesResponse>, Error> {
    let query = RouteQuery {
        origin: GpsPoint::new(params.o_lat, params.o_lng),
        destination: GpsPoint::new(params.d_lat, params.d_lng),
    };
    let routes = state.routes.compute_route(query).await?;
    Ok(Json(routes))
}

async fn maps_config(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let key = state.web_api_key.as_deref().unwrap_or_default();
    Json(json!({
        "mapsUrl": format!(
            "https://maps.googleapis.com/maps/api/js?key={key}&libraries=geometry&callback=initializeMap"
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> Arc<AppState> {
        // Unroutable endpoints: validation must fail before any connect.
        let client = reqwest::Client::new();
        let state = AppState {
            places: NearbyAggregator::new(client.clone(), "test-key")
                .with_endpoint("http://127.0.0.1:1/places"),
            routes: RoutesClient::new(client, "test-key")
                .with_endpoint("http://127.0.0.1:1/routes"),
            web_api_key: Some("web-key".to_string()),
        };
        Arc::new(state)
    }

    #[tokio::test]
    async fn test_nearby_rejects_non_finite_coordinates() {
        let result = nearby(
            State(test_state()),
            Query(NearbyParams {
                lat: f64::NAN,
                lng: 0.0,
            }),
        )
        .await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_route_rejects_non_finite_coordinates() {
        let result = route(
            State(test_state()),
            Query(RouteParams {
                o_lat: 0.0,
                o_lng: 0.0,
                d_lat: f64::INFINITY,
                d_lng: 0.0,
            }),
        )
        .await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_maps_config_embeds_web_key() {
        let Json(value) = maps_config(State(test_state())).await;
        let url = value["mapsUrl"].as_str().unwrap();
        assert!(url.contains("key=web-key"));
    }

    #[tokio::test]
    async fn test_router_builds() {
        let _router = build_router(test_state());
    }
}
