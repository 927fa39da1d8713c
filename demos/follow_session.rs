//! Scripted walkthrough of the follow state machine and route drawing.
//!
//! Run with: cargo run --example follow_session

use bathroom_finder::polyline::encode_polyline;
use bathroom_finder::routing::{Route, RoutePolyline, RoutesResponse};
use bathroom_finder::session::{MapSurface, Session};
use bathroom_finder::{Bounds, GpsPoint, Place};

/// A map surface that prints every command it receives.
struct PrintlnMap;

impl MapSurface for PrintlnMap {
    fn set_camera(&mut self, center: GpsPoint, zoom: f64) {
        println!("   [map] center {:.4},{:.4} zoom {zoom}", center.latitude, center.longitude);
    }
    fn pan_to(&mut self, center: GpsPoint) {
        println!("   [map] pan {:.4},{:.4}", center.latitude, center.longitude);
    }
    fn fit_bounds(&mut self, bounds: Bounds) {
        println!(
            "   [map] fit bounds {:.4}..{:.4} / {:.4}..{:.4}",
            bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng
        );
    }
    fn set_user_marker(&mut self, position: GpsPoint) {
        println!("   [map] user marker {:.4},{:.4}", position.latitude, position.longitude);
    }
    fn set_destination_marker(&mut self, position: Option<GpsPoint>) {
        match position {
            Some(p) => println!("   [map] destination marker {:.4},{:.4}", p.latitude, p.longitude),
            None => println!("   [map] destination marker cleared"),
        }
    }
    fn set_route_path(&mut self, path: Option<Vec<GpsPoint>>) {
        match path {
            Some(p) => println!("   [map] route with {} points", p.len()),
            None => println!("   [map] route cleared"),
        }
    }
}

fn main() {
    let mut session = Session::new(PrintlnMap);

    println!("1. First fix centers and zooms, later fixes pan:");
    session.position_update(GpsPoint::new(51.5080, -0.1290));
    session.position_update(GpsPoint::new(51.5082, -0.1292));

    println!("\n2. A drag pauses following; updates move only the marker:");
    let timer = session.map_interaction();
    session.position_update(GpsPoint::new(51.5085, -0.1295));

    println!("\n3. The idle timer fires; following resumes on the latest fix:");
    session.resume_timer_fired(timer.id);

    println!("\n4. Search results, ranked by distance:");
    let places: Vec<Place> = serde_json::from_str(
        r#"[
            {"id": "cafe-1", "displayName": {"text": "Joe's Cafe"},
             "location": {"latitude": 51.5074, "longitude": -0.1278}},
            {"id": "gs-1", "displayName": {"text": "Shell"},
             "location": {"latitude": 51.5090, "longitude": -0.1330}}
        ]"#,
    )
    .expect("sample JSON is valid");
    let names: Vec<String> = session
        .show_places(places)
        .expect("position is known")
        .iter()
        .map(|r| format!("{} ({:.2}mi)", r.name(), r.distance_miles()))
        .collect();
    for name in names {
        println!("   {name}");
    }

    println!("\n5. Selecting the nearest result and drawing its route:");
    let query = session.select_result(0).expect("result exists");
    println!(
        "   route query {:.4},{:.4} -> {:.4},{:.4}",
        query.origin.latitude, query.origin.longitude,
        query.destination.latitude, query.destination.longitude
    );

    // Stand in for the backend: a short fabricated driving path.
    let path = vec![
        query.origin,
        GpsPoint::new(51.5078, -0.1284),
        query.destination,
    ];
    let response = RoutesResponse {
        routes: vec![Route {
            duration: Some("95s".to_string()),
            distance_meters: Some(640.0),
            polyline: Some(RoutePolyline {
                encoded_polyline: Some(encode_polyline(&path)),
            }),
        }],
    };
    let summary = session.apply_route(Ok(response)).expect("route is drawable");
    println!(
        "   {:.1} mi * ~{} min",
        summary.distance_miles(),
        summary.duration_minutes()
    );
}
