//! Relay error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every upstream failure collapses to the same 500 envelope. The detail is
//! logged here and never reaches the client.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// The only error body a client ever sees.
pub const UPSTREAM_FAILURE: &str = "TMDB request failed";

#[derive(Debug, Error)]
pub enum RelayError {
  #[error("upstream answered {0}")]
  Status(u16),

  #[error("upstream request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("upstream body is not JSON: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("bad upstream configuration: {0}")]
  Config(String),
}

impl IntoResponse for RelayError {
  fn into_response(self) -> Response {
    tracing::warn!(error = %self, "collapsing upstream failure to 500");
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(json!({ "error": UPSTREAM_FAILURE })),
    )
      .into_response()
  }
}
