//! Booking persistence.
//!
//! The backing store is a single-slot key/value abstraction (the shape of a
//! browser local store): the whole booking collection lives as one JSON
//! array under one key. `append` is read-modify-write; a missing or corrupt
//! slot reads as the empty collection so one bad write never bricks the
//! form, while write failures surface to the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::types::BookingRecord;

/// Storage key holding the booking collection
pub const BOOKINGS_KEY: &str = "ggwp_bookings";

/// Errors surfaced by the persistence layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure in the backing store
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be encoded
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Single-slot key/value store
///
/// Implementations must be cheap to call repeatedly; the repository
/// re-reads the slot on every operation rather than keeping a mirror.
pub trait KvStore: Send + Sync {
    /// Reads the value under `key`, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and demos
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(slots.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store, one file per key under a directory
///
/// Durable across runs. Keys map directly to file names, so callers use
/// plain identifier-style keys.
#[derive(Debug)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Creates a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// The booking collection interface the reducer depends on
///
/// Injected as a trait object so a server-backed implementation is a
/// drop-in replacement without touching the state machine.
pub trait BookingRepository: Send + Sync {
    /// Appends one record to the collection
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the updated collection cannot be
    /// persisted.
    fn append(&self, record: &BookingRecord) -> Result<(), StorageError>;

    /// Loads the full collection, oldest first
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read at all; a
    /// missing or corrupt slot is NOT an error and reads as empty.
    fn load_all(&self) -> Result<Vec<BookingRecord>, StorageError>;
}

/// Repository storing the whole collection as one JSON array in one slot
#[derive(Debug)]
pub struct SlotRepository<K: KvStore> {
    store: K,
    key: String,
}

impl<K: KvStore> SlotRepository<K> {
    /// Creates a repository over `store` using the default key
    #[must_use]
    pub fn new(store: K) -> Self {
        Self::with_key(store, BOOKINGS_KEY)
    }

    /// Creates a repository over `store` using a custom key
    #[must_use]
    pub fn with_key(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Reads the slot leniently: absent, unreadable, or corrupt slots all
    /// yield the empty collection.
    fn read_slot(&self) -> Vec<BookingRecord> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!(%error, key = %self.key, "Booking slot unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(%error, key = %self.key, "Booking slot corrupt, treating as empty");
                Vec::new()
            }
        }
    }
}

impl<K: KvStore> BookingRepository for SlotRepository<K> {
    #[tracing::instrument(skip(self, record), fields(booking_id = %record.id))]
    fn append(&self, record: &BookingRecord) -> Result<(), StorageError> {
        let mut records = self.read_slot();
        records.push(record.clone());

        let encoded = serde_json::to_string(&records)?;
        self.store.put(&self.key, &encoded)?;

        tracing::debug!(total = records.len(), "Booking appended");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<BookingRecord>, StorageError> {
        Ok(self.read_slot())
    }
}
