//! Backend proxy binary.
//!
//! Configuration comes from the environment:
//! - `MAPS_API_KEY` (required) - upstream Places/Routes API key
//! - `WEB_API_KEY` - browser-side key handed out by `/api/maps-config`
//! - `BIND_ADDR` - listen address, default `127.0.0.1:3001`

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;

use bathroom_finder::server::{build_router, AppState};

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let api_key = match env::var("MAPS_API_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("MAPS_API_KEY must be set");
            std::process::exit(2);
        }
    };
    let web_api_key = env::var("WEB_API_KEY").ok();
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
        .parse()
        .expect("invalid BIND_ADDR");

    let state = AppState::new(reqwest::Client::new(), api_key, web_api_key);
    let app = build_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind http listener");
    info!("server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("http server crashed");
}
