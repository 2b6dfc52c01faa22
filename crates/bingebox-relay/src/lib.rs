//! Catalog relay for BingeBox.
//!
//! Exposes an axum [`Router`] that forwards three read-only queries to the
//! upstream movie catalog, injecting the bearer credential so it never
//! leaves the server. Bodies are relayed byte-for-byte; failures of any kind
//! become one fixed 500 envelope.

pub mod error;
pub mod handlers;
pub mod upstream;

pub use error::RelayError;
pub use upstream::{Catalog, TmdbClient};

use std::{path::Path, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime relay configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
  pub host:                  String,
  pub port:                  u16,
  pub tmdb_access_token:     String,
  pub tmdb_base_url:         String,
  pub upstream_timeout_secs: u64,
}

impl RelayConfig {
  /// Layer built-in defaults, the optional TOML file at `file`, `BINGEBOX_*`
  /// variables from `env`, and finally the conventional `PORT` and
  /// `TMDB_ACCESS_TOKEN` variables.
  pub fn load<I>(file: &Path, env: I) -> Result<Self, config::ConfigError>
  where
    I: IntoIterator<Item = (String, String)>,
  {
    let env: config::Map<String, String> = env.into_iter().collect();

    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 5000)?
      .set_default("tmdb_base_url", "https://api.themoviedb.org/3")?
      .set_default("upstream_timeout_secs", 30)?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("BINGEBOX").source(Some(env.clone())))
      .set_override_option("port", env.get("PORT").cloned())?
      .set_override_option("tmdb_access_token", env.get("TMDB_ACCESS_TOKEN").cloned())?
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the relay router over `catalog`. CORS is open to any origin.
pub fn router<C>(catalog: Arc<C>) -> Router
where
  C: Catalog + 'static,
{
  Router::new()
    .route("/", get(handlers::liveness))
    .route("/api/movies/popular", get(handlers::popular::<C>))
    .route("/api/movies/search", get(handlers::search::<C>))
    .route("/api/movies/{id}/images", get(handlers::images::<C>))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(catalog)
}


// ─── Router tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod router_tests {
  use std::sync::Mutex;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use bytes::Bytes;
  use tower::ServiceExt as _;

  use super::*;

  /// Records every call and answers with a canned body, or fails.
  #[derive(Default)]
  struct FakeCatalog {
    fail:  bool,
    calls: Mutex<Vec<String>>,
  }

  impl FakeCatalog {
    fn failing() -> Self {
      Self {
        fail: true,
        ..Self::default()
      }
    }

    fn answer(&self, call: String) -> Result<Bytes, RelayError> {
      self.calls.lock().unwrap().push(call.clone());
      if self.fail {
        Err(RelayError::Status(504))
      } else {
        Ok(Bytes::from(format!("{{ \"call\" : {call:?} }}")))
      }
    }
  }

  impl Catalog for FakeCatalog {
    async fn popular(&self) -> Result<Bytes, RelayError> { self.answer("popular".into()) }

    async fn search(&self, query: String) -> Result<Bytes, RelayError> {
      self.answer(format!("search:{query}"))
    }

    async fn images(&self, movie_id: String) -> Result<Bytes, RelayError> {
      self.answer(format!("images:{movie_id}"))
    }
  }

  async fn get(catalog: Arc<FakeCatalog>, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router(catalog).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn liveness_is_plain_text() {
    let (status, body) = get(Arc::new(FakeCatalog::default()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, handlers::LIVENESS);
  }

  #[tokio::test]
  async fn popular_echoes_the_body_verbatim() {
    let catalog = Arc::new(FakeCatalog::default());
    let req = Request::builder()
      .uri("/api/movies/popular")
      .body(Body::empty())
      .unwrap();
    let resp = router(catalog.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "application/json"
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], br#"{ "call" : "popular" }"#);
    assert_eq!(*catalog.calls.lock().unwrap(), vec!["popular".to_string()]);
  }

  #[tokio::test]
  async fn search_forwards_the_query() {
    let catalog = Arc::new(FakeCatalog::default());
    let (status, _) = get(catalog.clone(), "/api/movies/search?q=dune%20part%20two").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(catalog.clone(), "/api/movies/search").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(*catalog.calls.lock().unwrap(), vec![
      "search:dune part two".to_string(),
      "search:".to_string(),
    ]);
  }

  #[tokio::test]
  async fn images_forward_the_id_unvalidated() {
    let catalog = Arc::new(FakeCatalog::default());
    let (status, body) = get(catalog.clone(), "/api/movies/438631/images").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("images:438631"), "body: {body}");

    let (status, _) = get(catalog.clone(), "/api/movies/not-a-number/images").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(catalog.calls.lock().unwrap()[1], "images:not-a-number");
  }

  #[tokio::test]
  async fn every_failure_is_the_same_envelope() {
    for uri in [
      "/api/movies/popular",
      "/api/movies/search?q=dune",
      "/api/movies/1/images",
    ] {
      let (status, body) = get(Arc::new(FakeCatalog::failing()), uri).await;
      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
      let json: serde_json::Value = serde_json::from_str(&body).unwrap();
      assert_eq!(json, serde_json::json!({ "error": "TMDB request failed" }));
    }
  }

  #[tokio::test]
  async fn cors_is_open() {
    let req = Request::builder()
      .uri("/api/movies/popular")
      .header(header::ORIGIN, "http://localhost:5173")
      .body(Body::empty())
      .unwrap();
    let resp = router(Arc::new(FakeCatalog::default()))
      .oneshot(req)
      .await
      .unwrap();
    assert_eq!(
      resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
      "*"
    );
  }

  // ── Configuration ───────────────────────────────────────────────────────

  fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn config_defaults_and_conventional_variables() {
    let cfg = RelayConfig::load(
      Path::new("does-not-exist.toml"),
      env(&[("TMDB_ACCESS_TOKEN", "secret"), ("PORT", "8080")]),
    )
    .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.tmdb_access_token, "secret");
    assert_eq!(cfg.tmdb_base_url, "https://api.themoviedb.org/3");
    assert_eq!(cfg.upstream_timeout_secs, 30);
    assert_eq!(cfg.address(), "0.0.0.0:8080");
  }

  #[test]
  fn config_falls_back_to_default_port() {
    let cfg = RelayConfig::load(
      Path::new("does-not-exist.toml"),
      env(&[("BINGEBOX_TMDB_ACCESS_TOKEN", "secret")]),
    )
    .unwrap();
    assert_eq!(cfg.port, 5000);
    assert_eq!(cfg.tmdb_access_token, "secret");
  }

  #[test]
  fn config_requires_a_token() {
    assert!(RelayConfig::load(Path::new("does-not-exist.toml"), env(&[])).is_err());
  }
}
