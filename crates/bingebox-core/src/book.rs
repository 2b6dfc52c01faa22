//! [`AnnotationBook`]: the annotation collections bound to a store.
//!
//! Every operation mutates the in-memory [`Annotations`] and then rewrites
//! the touched collection to the store before returning, so a later read, in
//! this process or after a restart, observes it. Store failures are logged
//! and absorbed: the operations are total from the caller's point of view.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  annotation::{Annotations, CommentId, Stars},
  movie::MovieId,
  store::{AnnotationStore, StorageKey},
};

/// Annotation collections loaded from, and written through to, a store.
pub struct AnnotationBook<S> {
  store:       Arc<S>,
  annotations: Annotations,
  /// Stored entries that no longer parse, per key. Written back untouched
  /// after the readable records on every rewrite of that key.
  unreadable:  HashMap<StorageKey, Vec<Value>>,
}

impl<S: AnnotationStore> AnnotationBook<S> {
  /// Load all three collections from `store`.
  ///
  /// A missing key yields an empty collection. Records that no longer parse
  /// are logged and set aside; the readable ones load normally and the
  /// unreadable ones are kept in the store. A value that is not a JSON array
  /// at all is treated as empty. Only a failing store is an error.
  pub async fn open(store: Arc<S>) -> Result<Self> {
    let mut unreadable = HashMap::new();
    let annotations = Annotations {
      ratings:   load(&*store, StorageKey::Ratings, &mut unreadable).await?,
      favorites: load(&*store, StorageKey::Favorites, &mut unreadable).await?,
      comments:  load(&*store, StorageKey::Comments, &mut unreadable).await?,
    };
    debug!(
      ratings = annotations.ratings.len(),
      favorites = annotations.favorites.len(),
      comments = annotations.comments.len(),
      "annotations loaded"
    );
    Ok(Self {
      store,
      annotations,
      unreadable,
    })
  }

  pub fn annotations(&self) -> &Annotations { &self.annotations }

  // ── Operations ────────────────────────────────────────────────────────

  /// Set the rating for `movie_id`. Values outside `1..=5` are ignored.
  pub async fn upsert_rating(&mut self, movie_id: MovieId, value: u8) -> Option<Stars> {
    if !self.annotations.upsert_rating(movie_id, value, Utc::now()) {
      debug!(%movie_id, value, "ignoring out-of-range rating");
      return None;
    }
    self.persist(StorageKey::Ratings).await;
    self.annotations.rating_for(movie_id)
  }

  /// Flip favorite membership for `movie_id`. Returns the new membership.
  pub async fn toggle_favorite(&mut self, movie_id: MovieId) -> bool {
    let now_favorite = self.annotations.toggle_favorite(movie_id, Utc::now());
    self.persist(StorageKey::Favorites).await;
    now_favorite
  }

  /// Add a comment on `movie_id`. Blank text is ignored.
  pub async fn add_comment(&mut self, movie_id: MovieId, text: &str) -> Option<CommentId> {
    let id = self
      .annotations
      .add_comment(movie_id, text, Utc::now())
      .map(|c| c.id.clone())?;
    self.persist(StorageKey::Comments).await;
    Some(id)
  }

  /// Delete the comment with `id`, if there is one.
  pub async fn delete_comment(&mut self, id: &CommentId) -> bool {
    if !self.annotations.delete_comment(id) {
      return false;
    }
    self.persist(StorageKey::Comments).await;
    true
  }

  // ── Persistence ───────────────────────────────────────────────────────

  async fn persist(&self, key: StorageKey) {
    let kept = self.unreadable.get(&key).map_or(&[][..], Vec::as_slice);
    let encoded = match key {
      StorageKey::Ratings => encode(&self.annotations.ratings, kept),
      StorageKey::Favorites => encode(&self.annotations.favorites, kept),
      StorageKey::Comments => encode(&self.annotations.comments, kept),
    };
    let json = match encoded {
      Ok(json) => json,
      Err(e) => {
        warn!(%key, error = %e, "failed to encode annotations");
        return;
      }
    };
    if let Err(e) = self.store.write(key, json).await {
      warn!(%key, error = %e, "failed to persist annotations");
    }
  }
}

fn encode<T: Serialize>(records: &[T], kept: &[Value]) -> Result<String> {
  let mut entries = records
    .iter()
    .map(serde_json::to_value)
    .collect::<std::result::Result<Vec<_>, _>>()?;
  entries.extend_from_slice(kept);
  Ok(serde_json::to_string(&entries)?)
}

async fn load<S, T>(
  store: &S,
  key: StorageKey,
  unreadable: &mut HashMap<StorageKey, Vec<Value>>,
) -> Result<Vec<T>>
where
  S: AnnotationStore,
  T: DeserializeOwned,
{
  let raw = store
    .read(key)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  let Some(text) = raw else {
    return Ok(Vec::new());
  };
  let entries: Vec<Value> = match serde_json::from_str(&text) {
    Ok(entries) => entries,
    Err(e) => {
      warn!(%key, error = %e, "stored annotations are not a JSON array");
      return Ok(Vec::new());
    }
  };

  let mut records = Vec::with_capacity(entries.len());
  for entry in entries {
    match T::deserialize(&entry) {
      Ok(record) => records.push(record),
      Err(e) => {
        warn!(%key, error = %e, "setting aside unreadable annotation record");
        unreadable.entry(key).or_default().push(entry);
      }
    }
  }
  Ok(records)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::MemoryStore;

  const DUNE: MovieId = MovieId(438631);

  async fn book() -> (Arc<MemoryStore>, AnnotationBook<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let book = AnnotationBook::open(store.clone()).await.unwrap();
    (store, book)
  }

  #[tokio::test]
  async fn empty_store_opens_empty() {
    let (_, book) = book().await;
    assert_eq!(book.annotations(), &Annotations::default());
  }

  #[tokio::test]
  async fn every_operation_is_visible_after_reopen() {
    let (store, mut book) = book().await;
    book.upsert_rating(DUNE, 4).await;
    book.toggle_favorite(DUNE).await;
    let keep = book.add_comment(DUNE, "spice").await.unwrap();
    let gone = book.add_comment(DUNE, "delete me").await.unwrap();
    assert!(book.delete_comment(&gone).await);

    let reopened = AnnotationBook::open(store).await.unwrap();
    let a = reopened.annotations();
    assert_eq!(a.rating_for(DUNE).map(Stars::get), Some(4));
    assert!(a.is_favorite(DUNE));
    assert_eq!(a.comments.len(), 1);
    assert_eq!(a.comments[0].id, keep);
    assert_eq!(a, book.annotations());
  }

  #[tokio::test]
  async fn rejected_operations_do_not_write() {
    let (store, mut book) = book().await;
    assert_eq!(book.upsert_rating(DUNE, 0).await, None);
    assert_eq!(book.add_comment(DUNE, "   ").await, None);
    assert!(!book.delete_comment(&CommentId("missing".into())).await);

    for key in [StorageKey::Ratings, StorageKey::Comments] {
      assert_eq!(store.read(key).await.unwrap(), None);
    }
  }

  #[tokio::test]
  async fn stored_layout_is_a_json_array() {
    let (store, mut book) = book().await;
    book.toggle_favorite(DUNE).await;
    let raw = store.read(StorageKey::Favorites).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["movieId"], 438631);
    assert!(value[0]["timestamp"].is_i64());
  }

  #[tokio::test]
  async fn unreadable_record_does_not_cost_its_neighbours() {
    let store = Arc::new(MemoryStore::new());
    store
      .write(
        StorageKey::Ratings,
        r#"[{"movieId":1,"rating":4,"timestamp":0},{"movieId":2,"rating":4.5,"timestamp":0}]"#
          .into(),
      )
      .await
      .unwrap();

    let mut book = AnnotationBook::open(store.clone()).await.unwrap();
    assert_eq!(book.annotations().ratings.len(), 1);
    assert_eq!(book.annotations().rating_for(MovieId(1)).map(Stars::get), Some(4));

    book.upsert_rating(MovieId(3), 2).await;

    let raw = store.read(StorageKey::Ratings).await.unwrap().unwrap();
    let stored: Vec<Value> = serde_json::from_str(&raw).unwrap();
    let ids: Vec<_> = stored.iter().map(|r| r["movieId"].as_u64()).collect();
    assert_eq!(ids, vec![Some(1), Some(3), Some(2)]);
    assert_eq!(stored[2]["rating"], 4.5);

    let reopened = AnnotationBook::open(store).await.unwrap();
    assert_eq!(reopened.annotations().ratings.len(), 2);
    assert_eq!(reopened.annotations(), book.annotations());
  }

  #[tokio::test]
  async fn corrupt_collection_loads_empty_and_is_overwritten() {
    let store = Arc::new(MemoryStore::new());
    store.write(StorageKey::Ratings, "{not json".into()).await.unwrap();
    store
      .write(StorageKey::Favorites, r#"[{"movieId":7,"timestamp":0}]"#.into())
      .await
      .unwrap();

    let mut book = AnnotationBook::open(store.clone()).await.unwrap();
    assert!(book.annotations().ratings.is_empty());
    assert!(book.annotations().is_favorite(MovieId(7)));

    book.upsert_rating(DUNE, 2).await;
    let raw = store.read(StorageKey::Ratings).await.unwrap().unwrap();
    assert!(raw.starts_with('['));
  }
}
