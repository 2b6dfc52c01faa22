//! Async HTTP client for the BingeBox relay.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use bingebox_core::{
  movie::{ImageSet, Movie, MovieId, MoviePage},
  view::CatalogQuery,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Async HTTP client for the relay's JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct RelayClient {
  client:   Client,
  base_url: String,
}

impl RelayClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    Self::with_timeout(base_url, Duration::from_secs(30))
  }

  pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      base_url: base_url.into(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api/movies{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .query(query)
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {path} → {}", resp.status()));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {path}"))
  }

  // ── Lists ─────────────────────────────────────────────────────────────────

  /// `GET /api/movies/popular`
  pub async fn popular(&self) -> Result<Vec<Movie>> {
    let page: MoviePage = self.get_json("/popular", &[]).await?;
    Ok(page.results)
  }

  /// `GET /api/movies/search?q=<query>`
  pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
    let page: MoviePage = self.get_json("/search", &[("q", query)]).await?;
    Ok(page.results)
  }

  pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<Movie>> {
    match query {
      CatalogQuery::Popular => self.popular().await,
      CatalogQuery::Search(q) => self.search(q).await,
    }
  }

  // ── Images ────────────────────────────────────────────────────────────────

  /// `GET /api/movies/{id}/images`
  pub async fn images(&self, movie_id: MovieId) -> Result<ImageSet> {
    self.get_json(&format!("/{movie_id}/images"), &[]).await
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    Json, Router,
    extract::{Path, Query},
    http::StatusCode,
    routing::get,
  };
  use serde::Deserialize;
  use serde_json::{Value, json};
  use tokio::net::TcpListener;

  use super::*;

  #[derive(Deserialize)]
  struct Q {
    q: String,
  }

  async fn fake_relay() -> RelayClient {
    let app = Router::new()
      .route(
        "/api/movies/popular",
        get(|| async {
          Json(json!({
            "page": 1,
            "results": [
              { "id": 1, "title": "One", "adult": false },
              { "id": 2, "title": "Two", "release_date": "" },
            ],
          }))
        }),
      )
      .route(
        "/api/movies/search",
        get(|Query(p): Query<Q>| async move {
          Json(json!({ "results": [{ "id": 438631, "title": p.q }] }))
        }),
      )
      .route(
        "/api/movies/{id}/images",
        get(|Path(id): Path<u64>| async move {
          if id == 404 {
            return Err((
              StatusCode::INTERNAL_SERVER_ERROR,
              Json(json!({ "error": "TMDB request failed" })),
            ));
          }
          Ok(Json::<Value>(json!({
            "id": id,
            "backdrops": [{ "file_path": "/b.jpg", "width": 1920 }],
            "posters": [],
          })))
        }),
      );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    // A trailing slash on the base URL is tolerated.
    RelayClient::new(format!("http://{addr}/")).unwrap()
  }

  #[tokio::test]
  async fn popular_parses_the_result_list() {
    let client = fake_relay().await;
    let movies = client.popular().await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].title, "One");
    assert_eq!(movies[1].year_label(), "N/A");
  }

  #[tokio::test]
  async fn search_sends_the_query() {
    let client = fake_relay().await;
    let movies = client
      .list(&CatalogQuery::Search("dune".into()))
      .await
      .unwrap();
    assert_eq!(movies[0].id, MovieId(438631));
    assert_eq!(movies[0].title, "dune");
  }

  #[tokio::test]
  async fn images_parse_and_error_status_fails() {
    let client = fake_relay().await;
    let set = client.images(MovieId(7)).await.unwrap();
    assert_eq!(set.backdrops[0].file_path, "/b.jpg");
    assert!(set.posters.is_empty());

    assert!(client.images(MovieId(404)).await.is_err());
  }

  #[tokio::test]
  async fn unreachable_relay_is_an_error() {
    let client = RelayClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    assert!(client.popular().await.is_err());
  }
}
