//! Record storage contracts and the file-backed engine.
//!
//! # Responsibility
//! - Own the in-memory registry of live records keyed by `Kind.id`.
//! - Serialize the whole registry to, and rebuild it from, one backing file.
//!
//! # Invariants
//! - Every registry key equals `record.key()` of its value.
//! - `save` always rewrites the full registry; there are no partial writes.
//! - Malformed backing content is treated as "no prior state".

use crate::model::record::{Record, RecordError};
use crate::model::registry::RegistryError;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file_storage;

pub use file_storage::{FileStorage, DEFAULT_STORAGE_PATH};

/// Live registry: composite key -> record, iterated in key order.
pub type Registry = BTreeMap<String, Record>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage engine error.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Registry could not be encoded as JSON.
    Serialize(serde_json::Error),
    /// A persisted key names a kind missing from the type registry.
    UnknownKind { key: String, source: RegistryError },
    /// A persisted entry does not describe a valid record.
    InvalidRecord { key: String, source: RecordError },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "storage file `{}`: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "failed to encode registry: {err}"),
            Self::UnknownKind { key, source } => write!(f, "persisted key `{key}`: {source}"),
            Self::InvalidRecord { key, source } => write!(f, "persisted key `{key}`: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            Self::UnknownKind { source, .. } => Some(source),
            Self::InvalidRecord { source, .. } => Some(source),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Storage engine interface consumed by the service layer.
pub trait RecordStore {
    /// Live view of the registry.
    fn all(&self) -> &Registry;
    fn get(&self, key: &str) -> Option<&Record>;
    fn get_mut(&mut self, key: &str) -> Option<&mut Record>;
    /// Inserts or overwrites the entry at `record.key()`.
    fn insert(&mut self, record: Record);
    fn remove(&mut self, key: &str) -> Option<Record>;
    /// Writes the whole registry to the backing file.
    fn save(&self) -> StoreResult<()>;
    /// Rebuilds the registry from the backing file when it holds valid content.
    fn reload(&mut self) -> StoreResult<()>;
}
