//! Catalog types: movies and their image sets as the upstream catalog
//! returns them.
//!
//! These are read-only to BingeBox. A result list is replaced wholesale on
//! every query and an image set lives only as long as the detail view that
//! fetched it; neither is ever persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::image::{ImageSize, image_url};

// ─── Identity ────────────────────────────────────────────────────────────────

/// A catalog movie identifier. Stable per catalog; the key every annotation
/// hangs off.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl fmt::Display for MovieId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<u64> for MovieId {
  fn from(id: u64) -> Self { Self(id) }
}

// ─── Movie ───────────────────────────────────────────────────────────────────

/// A single title from a catalog result list. Unknown upstream fields are
/// ignored; missing optional ones default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
  pub id:            MovieId,
  #[serde(default)]
  pub title:         String,
  #[serde(default)]
  pub overview:      String,
  /// `YYYY-MM-DD`; the catalog sends an empty string for unreleased titles.
  #[serde(default)]
  pub release_date:  Option<String>,
  #[serde(default)]
  pub vote_average:  Option<f64>,
  #[serde(default)]
  pub poster_path:   Option<String>,
  #[serde(default)]
  pub backdrop_path: Option<String>,
}

impl Movie {
  /// A movie with only an id and a title; everything else empty.
  pub fn new(id: impl Into<MovieId>, title: impl Into<String>) -> Self {
    Self {
      id:            id.into(),
      title:         title.into(),
      overview:      String::new(),
      release_date:  None,
      vote_average:  None,
      poster_path:   None,
      backdrop_path: None,
    }
  }

  /// Release year parsed from `release_date`, if there is one.
  pub fn release_year(&self) -> Option<i32> {
    self
      .release_date
      .as_deref()
      .and_then(|d| d.split('-').next())
      .and_then(|y| y.parse().ok())
  }

  /// Release year for display, `N/A` when unknown.
  pub fn year_label(&self) -> String {
    self
      .release_year()
      .map(|y| y.to_string())
      .unwrap_or_else(|| "N/A".to_owned())
  }

  /// Average score to one decimal, `N/A` when absent or zero (the catalog
  /// reports zero for titles nobody has voted on).
  pub fn score_label(&self) -> String {
    match self.vote_average {
      Some(v) if v > 0.0 => format!("{v:.1}"),
      _ => "N/A".to_owned(),
    }
  }

  pub fn poster_url(&self, size: ImageSize) -> String {
    image_url(self.poster_path.as_deref(), size)
  }

  /// The large backdrop shown at the top of the detail view.
  pub fn hero_url(&self) -> String {
    image_url(self.backdrop_path.as_deref(), ImageSize::W1280)
  }
}

/// One page of a catalog list or search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoviePage {
  #[serde(default)]
  pub page:          u32,
  #[serde(default)]
  pub results:       Vec<Movie>,
  #[serde(default)]
  pub total_pages:   u32,
  #[serde(default)]
  pub total_results: u32,
}

// ─── Images ──────────────────────────────────────────────────────────────────

/// One entry of a movie's image metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieImage {
  pub file_path:    String,
  #[serde(default)]
  pub width:        Option<u32>,
  #[serde(default)]
  pub height:       Option<u32>,
  #[serde(default)]
  pub aspect_ratio: Option<f64>,
  #[serde(default)]
  pub vote_average: Option<f64>,
}

/// The image set fetched for the movie currently open in the detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSet {
  #[serde(default)]
  pub backdrops: Vec<MovieImage>,
  #[serde(default)]
  pub posters:   Vec<MovieImage>,
}

impl ImageSet {
  pub fn is_empty(&self) -> bool {
    self.backdrops.is_empty() && self.posters.is_empty()
  }
}
