//! The `AnnotationStore` trait and its in-memory implementation.
//!
//! A store is a dumb keyed blob store: three fixed keys, each holding one JSON
//! array. Typed (de)serialisation lives in [`crate::book`], so a backend
//! never needs to understand the records it holds.
//!
//! `bingebox-store-sqlite` provides the durable backend.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Mutex, PoisonError},
};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The fixed storage key of each annotation collection.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
pub enum StorageKey {
  #[strum(serialize = "movieRatings")]
  #[serde(rename = "movieRatings")]
  Ratings,
  #[strum(serialize = "movieFavorites")]
  #[serde(rename = "movieFavorites")]
  Favorites,
  #[strum(serialize = "movieComments")]
  #[serde(rename = "movieComments")]
  Comments,
}

impl StorageKey {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an annotation persistence backend.
///
/// `write` must replace the whole value for a key atomically: a reader never
/// observes a half-written collection. A completed `write` is visible to every
/// subsequent `read` in the same process.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait AnnotationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The stored JSON text for `key`, or `None` if nothing was ever written.
  fn read(
    &self,
    key: StorageKey,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Replace the stored JSON text for `key`.
  fn write(
    &self,
    key: StorageKey,
    json: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl AnnotationStore for MemoryStore {
  type Error = Infallible;

  async fn read(&self, key: StorageKey) -> Result<Option<String>, Infallible> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(&key).cloned())
  }

  async fn write(&self, key: StorageKey, json: String) -> Result<(), Infallible> {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key, json);
    Ok(())
  }
}
