//! Key-value persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the byte-blob storage contract consumed by locations/account.
//! - Provide an in-memory implementation for tests and embedding hosts.
//! - Isolate SQLite details behind the same contract.
//!
//! # Invariants
//! - Keys are opaque UTF-8 strings; value layout is owned by the caller.
//! - A `set` observed as `Ok` must be visible to the next `get` of the
//!   same key on the same store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

/// Storage-layer error for key-value reads and writes.
#[derive(Debug)]
pub enum KvError {
    Db(crate::db::DbError),
    /// Connection handed to the SQLite store has not been migrated.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is absent from the connected database.
    MissingRequiredTable(&'static str),
    /// Backend rejected the operation for a store-specific reason.
    Backend(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::Backend(message) => write!(f, "key-value backend error: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::Backend(_) => None,
        }
    }
}

impl From<crate::db::DbError> for KvError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(crate::db::DbError::Sqlite(value))
    }
}

/// Byte-blob storage contract consumed by the location store and the
/// account service.
///
/// Hosts with a platform store of their own (keychain, UserDefaults-like
/// facilities) implement this trait; the core never assumes a backend.
pub trait KeyValueStore {
    /// Returns the stored value for `key`, or `None` when absent.
    fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> KvResult<()>;
    /// Removes `key`; absent keys are not an error.
    fn remove(&self, key: &str) -> KvResult<()>;
}

/// In-memory key-value store.
///
/// Single-owner interior mutability matches the core's single control
/// flow; this type is deliberately not `Sync`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys. Test helper.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> KvResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore};

    #[test]
    fn memory_store_round_trips_and_overwrites() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("slot", b"first").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some(&b"first"[..]));

        store.set("slot", b"second").unwrap();
        assert_eq!(store.get("slot").unwrap().as_deref(), Some(&b"second"[..]));

        store.remove("slot").unwrap();
        store.remove("slot").unwrap();
        assert_eq!(store.get("slot").unwrap(), None);
        assert!(store.is_empty());
    }
}
