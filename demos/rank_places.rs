//! Basic example of ranking nearby candidates.
//!
//! Run with: cargo run --example rank_places

use bathroom_finder::ranking::{dedupe_by_id, normalize_name, rank_places, RankConfig};
use bathroom_finder::{GpsPoint, Place};

fn main() {
    // Raw candidates as the nearby search would deliver them, including a
    // duplicate id and the same cafe listed twice under different ids.
    let raw = r#"[
        {"id": "gs-1", "displayName": {"text": "Shell"},
         "location": {"latitude": 51.5090, "longitude": -0.1330},
         "types": ["gas_station"]},
        {"id": "cafe-1", "displayName": {"text": "Joe's Cafe|Westminster"},
         "location": {"latitude": 51.5074, "longitude": -0.1278},
         "types": ["cafe"]},
        {"id": "cafe-2", "displayName": {"text": "joe's cafe"},
         "location": {"latitude": 51.50742, "longitude": -0.12782},
         "types": ["store"]},
        {"id": "gs-1", "displayName": {"text": "Shell (duplicate row)"},
         "location": {"latitude": 51.5090, "longitude": -0.1330},
         "types": ["store"]},
        {"id": "lib-1", "displayName": {"text": "Central Library"},
         "location": {"latitude": 51.5050, "longitude": -0.1200},
         "types": ["library"]}
    ]"#;

    let places: Vec<Place> = serde_json::from_str(raw).expect("sample JSON is valid");
    let user = GpsPoint::new(51.5080, -0.1290);

    println!("Ranking Example\n");

    println!("1. Identity dedup:");
    let deduped = dedupe_by_id(places.clone());
    println!("   {} raw candidates -> {} unique ids\n", places.len(), deduped.len());

    println!("2. Name normalization:");
    println!(
        "   \"Joe's Cafe|Westminster\" -> \"{}\"\n",
        normalize_name("Joe's Cafe|Westminster")
    );

    println!("3. Ranked results (nearest first):");
    let ranked = rank_places(places, user, &RankConfig::default());
    for (i, entry) in ranked.iter().enumerate() {
        println!(
            "   {}. {} ({:.0}m / {:.2}mi)",
            i + 1,
            entry.name(),
            entry.distance_meters,
            entry.distance_miles()
        );
    }
}
