//! Session state and route drawing.
//!
//! [`Session`] is the explicit context object that owns everything the page
//! keeps alive between events: the latest user position (replaced in place,
//! never queued), the follow tracker, the current result list, the selected
//! destination and the rendered route. Rendering goes through the
//! [`MapSurface`] trait: the session sends camera commands and overlays and
//! never reads map state back.

use log::warn;

use crate::error::Error;
use crate::follow::{CameraAction, FollowTracker, ResumeTimer, TimerId, INITIAL_ZOOM};
use crate::geo_utils::{compute_bounds, Bounds};
use crate::polyline::decode_polyline;
use crate::ranking::{rank_places, RankConfig, RankedPlace};
use crate::routing::{RouteQuery, RouteSummary, RoutesResponse};
use crate::{GpsPoint, Place};

/// Rendering collaborator: camera commands and drawable overlays.
///
/// Passing `None` to a marker or path setter clears that overlay. Setting a
/// new value replaces the previous one; the surface never shows two user
/// markers, two destination markers, or two routes.
pub trait MapSurface {
    fn set_camera(&mut self, center: GpsPoint, zoom: f64);
    fn pan_to(&mut self, center: GpsPoint);
    fn fit_bounds(&mut self, bounds: Bounds);
    fn set_user_marker(&mut self, position: GpsPoint);
    fn set_destination_marker(&mut self, position: Option<GpsPoint>);
    fn set_route_path(&mut self, path: Option<Vec<GpsPoint>>);
}

/// Per-page session state. One per browser session; no state survives a
/// reload.
pub struct Session<M: MapSurface> {
    map: M,
    follow: FollowTracker,
    rank_config: RankConfig,
    user_location: Option<GpsPoint>,
    destination: Option<GpsPoint>,
    route_visible: bool,
    results: Vec<RankedPlace>,
}

impl<M: MapSurface> Session<M> {
    pub fn new(map: M) -> Self {
        Self::with_config(map, FollowTracker::default(), RankConfig::default())
    }

    pub fn with_config(map: M, follow: FollowTracker, rank_config: RankConfig) -> Self {
        Self {
            map,
            follow,
            rank_config,
            user_location: None,
            destination: None,
            route_visible: false,
            results: Vec::new(),
        }
    }

    /// The latest known user position.
    pub fn user_location(&self) -> Option<GpsPoint> {
        self.user_location
    }

    /// Whether the camera currently tracks the user.
    pub fn is_following(&self) -> bool {
        self.follow.is_following()
    }

    /// The current ranked result list.
    pub fn results(&self) -> &[RankedPlace] {
        &self.results
    }

    /// The currently selected destination, if any.
    pub fn destination(&self) -> Option<GpsPoint> {
        self.destination
    }

    /// Whether a route is currently rendered.
    pub fn has_route(&self) -> bool {
        self.route_visible
    }

    /// Borrow the map surface (mainly for tests and demos).
    pub fn map(&self) -> &M {
        &self.map
    }

    /// A new position fix arrived. The stored position is overwritten and
    /// the marker always moves; the camera moves per the follow state.
    pub fn position_update(&mut self, position: GpsPoint) {
        self.user_location = Some(position);
        self.map.set_user_marker(position);
        let action = self.follow.on_position(position);
        self.apply_camera(action);
    }

    /// The position stream reported an error or is unsupported. The feature
    /// is blocked; displayed state is left untouched.
    pub fn location_error(&self, reason: &str) -> Error {
        Error::LocationUnavailable(reason.to_string())
    }

    /// A manual map interaction (drag start, zoom change). Following pauses;
    /// the returned timer replaces any pending resume timer.
    pub fn map_interaction(&mut self) -> ResumeTimer {
        self.follow.on_interaction()
    }

    /// A resume timer fired. Stale timers are ignored; the live one resumes
    /// following and recenters on the latest known position.
    pub fn resume_timer_fired(&mut self, id: TimerId) {
        let action = self.follow.on_timer(id, self.user_location);
        self.apply_camera(action);
    }

    /// Rank a fresh candidate collection against the current position and
    /// make it the displayed result list.
    ///
    /// Fails with [`Error::LocationUnavailable`] before the first fix; a
    /// search cannot be ranked without a reference position.
    pub fn show_places(&mut self, places: Vec<Place>) -> Result<&[RankedPlace], Error> {
        let Some(user) = self.user_location else {
            return Err(Error::LocationUnavailable(
                "Location not ready yet".to_string(),
            ));
        };
        self.results = rank_places(places, user, &self.rank_config);
        Ok(&self.results)
    }

    /// Select a result as the destination. Replaces the destination marker
    /// immediately and returns the route query snapshot for the caller to
    /// issue; the rendered route is replaced only once a response arrives via
    /// [`apply_route`](Self::apply_route).
    pub fn select_result(&mut self, index: usize) -> Result<RouteQuery, Error> {
        let Some(origin) = self.user_location else {
            return Err(Error::LocationUnavailable(
                "Location not ready yet".to_string(),
            ));
        };
        let Some(result) = self.results.get(index) else {
            return Err(Error::BadRequest(format!("no result at index {index}")));
        };

        let destination = result.position();
        self.destination = Some(destination);
        self.map.set_destination_marker(Some(destination));
        Ok(RouteQuery {
            origin,
            destination,
        })
    }

    /// Apply the outcome of a route request.
    ///
    /// On success the first route's path is decoded and replaces any
    /// previously rendered route, and the camera fits the new path's bounds.
    /// The path always comes from the response itself, since the user may have
    /// moved since the request was issued. On any failure (transport error,
    /// empty route list, missing or undecodable polyline) previously
    /// displayed state is left untouched and the error is returned for the
    /// UI to surface.
    pub fn apply_route(
        &mut self,
        outcome: Result<RoutesResponse, Error>,
    ) -> Result<RouteSummary, Error> {
        let response = outcome?;
        let Some(route) = response.routes.first() else {
            return Err(Error::EmptyResult);
        };
        let Some(encoded) = route.encoded_polyline() else {
            return Err(Error::EmptyResult);
        };
        let path = match decode_polyline(encoded) {
            Ok(path) if !path.is_empty() => path,
            Ok(_) => return Err(Error::EmptyResult),
            Err(e) => {
                warn!("undecodable route polyline: {e}");
                return Err(Error::EmptyResult);
            }
        };

        let bounds = compute_bounds(&path);
        self.map.set_route_path(Some(path));
        if let Some(bounds) = bounds {
            self.map.fit_bounds(bounds);
        }
        self.route_visible = true;

        Ok(RouteSummary {
            distance_meters: route.distance_meters.unwrap_or(0.0),
            duration_seconds: route.duration_seconds(),
        })
    }

    fn apply_camera(&mut self, action: CameraAction) {
        match action {
            CameraAction::CenterAndZoom(center) => self.map.set_camera(center, INITIAL_ZOOM),
            CameraAction::Pan(center) => self.map.pan_to(center),
            CameraAction::None => {}
        }
    }
}
