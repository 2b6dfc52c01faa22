//! The annotation backend picked at startup.

use bingebox_core::store::{AnnotationStore, MemoryStore, StorageKey};
use bingebox_store_sqlite::SqliteStore;

/// Either the durable SQLite file or a throwaway in-memory map
/// (`--ephemeral`).
pub enum LocalStore {
  Sqlite(SqliteStore),
  Memory(MemoryStore),
}

impl AnnotationStore for LocalStore {
  type Error = bingebox_store_sqlite::Error;

  async fn read(&self, key: StorageKey) -> Result<Option<String>, Self::Error> {
    match self {
      Self::Sqlite(store) => store.read(key).await,
      Self::Memory(store) => store.read(key).await.map_err(|never| match never {}),
    }
  }

  async fn write(&self, key: StorageKey, json: String) -> Result<(), Self::Error> {
    match self {
      Self::Sqlite(store) => store.write(key, json).await,
      Self::Memory(store) => store.write(key, json).await.map_err(|never| match never {}),
    }
  }
}
