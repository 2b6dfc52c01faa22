//! The upstream catalog seam and its TMDB client.

use std::{future::Future, time::Duration};

use bytes::Bytes;
use reqwest::{Client, Url, header};
use serde::de::IgnoredAny;
use tracing::debug;

use crate::{RelayConfig, error::RelayError};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The three read-only queries the relay forwards.
///
/// Each resolves to the upstream JSON body, untouched, or an error. An
/// implementation must never yield a body that is not well-formed JSON.
pub trait Catalog: Send + Sync {
  /// Page 1 of the popular titles.
  fn popular(&self) -> impl Future<Output = Result<Bytes, RelayError>> + Send + '_;

  /// Page 1 of a title search for `query`, passed through as given.
  fn search(
    &self,
    query: String,
  ) -> impl Future<Output = Result<Bytes, RelayError>> + Send + '_;

  /// Image metadata for `movie_id`, an opaque path segment.
  fn images(
    &self,
    movie_id: String,
  ) -> impl Future<Output = Result<Bytes, RelayError>> + Send + '_;
}

// ─── TMDB ────────────────────────────────────────────────────────────────────

/// Async HTTP client for the TMDB v3 API, authenticated with a v4 read access
/// token sent as a bearer credential on every request.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TmdbClient {
  client:   Client,
  base_url: Url,
  token:    String,
}

impl TmdbClient {
  pub fn new(
    base_url: &str,
    token: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, RelayError> {
    let base_url = Url::parse(base_url)
      .map_err(|e| RelayError::Config(format!("tmdb_base_url {base_url:?}: {e}")))?;
    if base_url.cannot_be_a_base() {
      return Err(RelayError::Config(format!("{base_url} cannot be a base URL")));
    }
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url,
      token: token.into(),
    })
  }

  pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
    Self::new(
      &config.tmdb_base_url,
      config.tmdb_access_token.clone(),
      Duration::from_secs(config.upstream_timeout_secs),
    )
  }

  /// `base_url` with `segments` appended, each percent-encoded as a single
  /// path segment.
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn fetch(&self, url: Url, query: &[(&str, &str)]) -> Result<Bytes, RelayError> {
    debug!(path = url.path(), "upstream request");
    let resp = self
      .client
      .get(url)
      .bearer_auth(&self.token)
      .header(header::ACCEPT, "application/json")
      .query(query)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(RelayError::Status(status.as_u16()));
    }

    let body = resp.bytes().await?;
    serde_json::from_slice::<IgnoredAny>(&body)?;
    Ok(body)
  }
}

impl Catalog for TmdbClient {
  async fn popular(&self) -> Result<Bytes, RelayError> {
    self
      .fetch(self.endpoint(&["movie", "popular"]), &[("page", "1")])
      .await
  }

  async fn search(&self, query: String) -> Result<Bytes, RelayError> {
    self
      .fetch(self.endpoint(&["search", "movie"]), &[
        ("query", query.as_str()),
        ("page", "1"),
      ])
      .await
  }

  async fn images(&self, movie_id: String) -> Result<Bytes, RelayError> {
    self
      .fetch(self.endpoint(&["movie", movie_id.as_str(), "images"]), &[])
      .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base: &str) -> TmdbClient {
    TmdbClient::new(base, "t", Duration::from_secs(1)).unwrap()
  }

  #[test]
  fn endpoints_append_to_the_base_path() {
    let c = client("https://api.themoviedb.org/3");
    assert_eq!(
      c.endpoint(&["movie", "popular"]).as_str(),
      "https://api.themoviedb.org/3/movie/popular"
    );

    let c = client("https://api.themoviedb.org/3/");
    assert_eq!(
      c.endpoint(&["search", "movie"]).as_str(),
      "https://api.themoviedb.org/3/search/movie"
    );
  }

  #[test]
  fn movie_id_stays_one_segment() {
    let c = client("https://api.themoviedb.org/3");
    let url = c.endpoint(&["movie", "1/videos?x=y", "images"]);
    let segments: Vec<_> = url.path_segments().unwrap().collect();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments[3], "images");
    assert_eq!(url.query(), None);
  }

  #[test]
  fn rejects_unusable_base_urls() {
    assert!(matches!(
      TmdbClient::new("not a url", "t", Duration::from_secs(1)),
      Err(RelayError::Config(_))
    ));
    assert!(matches!(
      TmdbClient::new("mailto:someone@example.com", "t", Duration::from_secs(1)),
      Err(RelayError::Config(_))
    ));
  }
}
