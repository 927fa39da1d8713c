//! Error taxonomy shared by the backend proxy and the client session.
//!
//! Partial upstream failures never appear here: a single category search that
//! fails is logged and absorbed inside the aggregator, and malformed
//! candidate data is dropped inside the ranker. Only errors that stop the
//! current operation reach the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, rejected before any upstream call is made.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The upstream service could not be reached at all.
    #[error("upstream service unreachable: {0}")]
    Upstream(String),

    /// The upstream service replied with a non-success status; the status
    /// and body are mirrored through to the caller.
    #[error("upstream returned status {status}")]
    UpstreamStatus { status: u16, body: String },

    /// A valid response with zero usable routes or places. Surfaced to the
    /// user as "no result", leaving previously displayed state intact.
    #[error("no usable result")]
    EmptyResult,

    /// No position fix is available; the feature is blocked until the
    /// position stream recovers.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),
}

#[cfg(feature = "server")]
mod http {
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use serde::Serialize;

    use super::Error;

    #[derive(Debug, Serialize)]
    pub struct ErrorResponse {
        pub error: String,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> Response {
            match self {
                Error::BadRequest(msg) => (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse { error: msg }),
                )
                    .into_response(),
                Error::UpstreamStatus { status, body } => {
                    let status = StatusCode::from_u16(status)
                        .unwrap_or(StatusCode::BAD_GATEWAY);
                    (status, body).into_response()
                }
                Error::Upstream(_) => (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse {
                        error: "Server error".to_string(),
                    }),
                )
                    .into_response(),
                Error::EmptyResult => (
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: "No result".to_string(),
                    }),
                )
                    .into_response(),
                Error::LocationUnavailable(msg) => (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse { error: msg }),
                )
                    .into_response(),
            }
        }
    }
}

#[cfg(feature = "server")]
pub use http::ErrorResponse;
