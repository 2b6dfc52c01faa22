//! Route handlers.
//!
//! | Method | Path | Upstream |
//! |--------|------|----------|
//! | `GET`  | `/` | none; liveness text |
//! | `GET`  | `/api/movies/popular` | popular titles, page 1 |
//! | `GET`  | `/api/movies/search?q=` | title search, page 1 |
//! | `GET`  | `/api/movies/{id}/images` | image metadata |

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;

use crate::{error::RelayError, upstream::Catalog};

pub const LIVENESS: &str = "Movie API Backend is running!";

/// `GET /`
pub async fn liveness() -> &'static str { LIVENESS }

/// `GET /api/movies/popular`
pub async fn popular<C: Catalog>(
  State(catalog): State<Arc<C>>,
) -> Result<Response, RelayError> {
  Ok(json_body(catalog.popular().await?))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Forwarded as-is; absent means an empty query.
  #[serde(default)]
  pub q: String,
}

/// `GET /api/movies/search?q=<query>`
pub async fn search<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Query(params): Query<SearchParams>,
) -> Result<Response, RelayError> {
  Ok(json_body(catalog.search(params.q).await?))
}

/// `GET /api/movies/{id}/images`
pub async fn images<C: Catalog>(
  State(catalog): State<Arc<C>>,
  Path(id): Path<String>,
) -> Result<Response, RelayError> {
  Ok(json_body(catalog.images(id).await?))
}

fn json_body(body: Bytes) -> Response {
  ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}
