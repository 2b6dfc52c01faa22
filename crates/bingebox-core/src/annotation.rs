//! Annotations: the user's own data about movies.
//!
//! Three independent collections keyed by [`MovieId`]: at most one rating per
//! movie, a favorite set, and any number of comments per movie. No
//! referential integrity against the catalog is kept; an annotation for a
//! movie outside the current result list just does not render until the movie
//! shows up again.
//!
//! Every mutation here is total: invalid input is ignored, never reported.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::movie::MovieId;

/// Author label attached to every locally written comment.
pub const LOCAL_AUTHOR: &str = "You";

// ─── Rating ──────────────────────────────────────────────────────────────────

/// A star rating in `1..=5`. Construction is the only validation point.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
  pub const MIN: u8 = 1;
  pub const MAX: u8 = 5;

  /// `None` unless `value` is within `1..=5`.
  pub fn new(value: u8) -> Option<Self> {
    (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
  }

  pub fn get(self) -> u8 { self.0 }
}

impl TryFrom<u8> for Stars {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    Self::new(value).ok_or_else(|| format!("rating {value} is outside 1..=5"))
  }
}

impl From<Stars> for u8 {
  fn from(s: Stars) -> Self { s.0 }
}

impl fmt::Display for Stars {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
  pub movie_id:  MovieId,
  pub rating:    Stars,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

// ─── Favorite ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
  pub movie_id:  MovieId,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
}

// ─── Comment ─────────────────────────────────────────────────────────────────

/// Locally generated comment identifier. New ids are UUID v4 strings; any
/// string loaded from storage is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }
}

impl fmt::Display for CommentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
  pub id:        CommentId,
  pub movie_id:  MovieId,
  pub text:      String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub timestamp: DateTime<Utc>,
  pub author:    String,
}

/// Timestamps are stored as epoch milliseconds; anything finer would not
/// survive a reload.
fn stored_precision(at: DateTime<Utc>) -> DateTime<Utc> { at.trunc_subsecs(3) }

// ─── Collections ─────────────────────────────────────────────────────────────

/// The three annotation collections, in their stored order.
///
/// Ratings and favorites keep insertion order; comments are kept newest
/// first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
  pub ratings:   Vec<Rating>,
  pub favorites: Vec<Favorite>,
  pub comments:  Vec<Comment>,
}

impl Annotations {
  // ── Mutations ─────────────────────────────────────────────────────────

  /// Replace the rating for `movie_id`, or append one. Returns `false` (and
  /// changes nothing) when `value` is outside `1..=5`.
  pub fn upsert_rating(
    &mut self,
    movie_id: MovieId,
    value: u8,
    at: DateTime<Utc>,
  ) -> bool {
    let Some(stars) = Stars::new(value) else {
      return false;
    };
    let rating = Rating {
      movie_id,
      rating: stars,
      timestamp: stored_precision(at),
    };
    match self.ratings.iter_mut().find(|r| r.movie_id == movie_id) {
      Some(existing) => *existing = rating,
      None => self.ratings.push(rating),
    }
    true
  }

  /// Flip favorite membership for `movie_id`. Returns the new membership.
  pub fn toggle_favorite(&mut self, movie_id: MovieId, at: DateTime<Utc>) -> bool {
    if self.is_favorite(movie_id) {
      self.favorites.retain(|f| f.movie_id != movie_id);
      false
    } else {
      self.favorites.push(Favorite {
        movie_id,
        timestamp: stored_precision(at),
      });
      true
    }
  }

  /// Prepend a comment with the trimmed `text`. Blank text is ignored and
  /// returns `None`.
  pub fn add_comment(
    &mut self,
    movie_id: MovieId,
    text: &str,
    at: DateTime<Utc>,
  ) -> Option<&Comment> {
    let text = text.trim();
    if text.is_empty() {
      return None;
    }
    self.comments.insert(0, Comment {
      id: CommentId::generate(),
      movie_id,
      text: text.to_owned(),
      timestamp: stored_precision(at),
      author: LOCAL_AUTHOR.to_owned(),
    });
    self.comments.first()
  }

  /// Remove the comment with `id`. Returns whether anything was removed.
  pub fn delete_comment(&mut self, id: &CommentId) -> bool {
    let before = self.comments.len();
    self.comments.retain(|c| &c.id != id);
    self.comments.len() != before
  }

  // ── Per-movie lookups ─────────────────────────────────────────────────

  pub fn rating_for(&self, movie_id: MovieId) -> Option<Stars> {
    self
      .ratings
      .iter()
      .find(|r| r.movie_id == movie_id)
      .map(|r| r.rating)
  }

  pub fn is_rated(&self, movie_id: MovieId) -> bool {
    self.ratings.iter().any(|r| r.movie_id == movie_id)
  }

  pub fn is_favorite(&self, movie_id: MovieId) -> bool {
    self.favorites.iter().any(|f| f.movie_id == movie_id)
  }

  /// Comments on `movie_id`, newest first.
  pub fn comments_for(&self, movie_id: MovieId) -> Vec<&Comment> {
    self
      .comments
      .iter()
      .filter(|c| c.movie_id == movie_id)
      .collect()
  }

  pub fn comment_count(&self, movie_id: MovieId) -> usize {
    self.comments.iter().filter(|c| c.movie_id == movie_id).count()
  }

  pub fn favorites_count(&self) -> usize { self.favorites.len() }

  pub fn rated_count(&self) -> usize { self.ratings.len() }
}
