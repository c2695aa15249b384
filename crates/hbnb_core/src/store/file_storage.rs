//! JSON file-backed record storage.
//!
//! # Responsibility
//! - Hold the live registry for the process lifetime.
//! - Persist it as one JSON object `{ "Kind.id": {fields...} }`.
//!
//! # Invariants
//! - The backing file is opened, fully written or read, and closed within one call.
//! - `reload` replaces the registry only after every entry rebuilt successfully.

use super::{RecordStore, Registry, StoreError, StoreResult};
use crate::model::record::{Record, RecordError, CLASS_MARKER};
use crate::model::registry;
use log::{error, info, warn};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Backing file used when no explicit path is configured.
pub const DEFAULT_STORAGE_PATH: &str = "file.json";

/// File-backed implementation of `RecordStore`.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    objects: Registry,
}

impl FileStorage {
    /// Creates an empty store bound to `path`; nothing is read yet.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            objects: Registry::new(),
        }
    }

    /// Creates a store bound to `path` and reloads any persisted state.
    pub fn open_and_reload(path: impl AsRef<Path>) -> StoreResult<Self> {
        let mut storage = Self::open(path);
        storage.reload()?;
        Ok(storage)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordStore for FileStorage {
    fn all(&self) -> &Registry {
        &self.objects
    }

    fn get(&self, key: &str) -> Option<&Record> {
        self.objects.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.objects.get_mut(key)
    }

    fn insert(&mut self, record: Record) {
        self.objects.insert(record.key(), record);
    }

    fn remove(&mut self, key: &str) -> Option<Record> {
        self.objects.remove(key)
    }

    fn save(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        let document: Map<String, Value> = self
            .objects
            .iter()
            .map(|(key, record)| (key.clone(), Value::Object(record.to_document())))
            .collect();
        let encoded = serde_json::to_vec(&document)?;

        if let Err(err) = std::fs::write(&self.path, encoded) {
            error!(
                "event=store_save module=store status=error duration_ms={} error_code=write_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(self.io_error(err));
        }

        info!(
            "event=store_save module=store status=ok records={} duration_ms={}",
            self.objects.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn reload(&mut self) -> StoreResult<()> {
        let started_at = Instant::now();
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("event=store_reload module=store status=skipped reason=missing_file");
                return Ok(());
            }
            Err(err) => {
                error!(
                    "event=store_reload module=store status=error error_code=read_failed error={}",
                    err
                );
                return Err(self.io_error(err));
            }
        };

        let entries = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(entries)) => entries,
            Ok(Value::Null) => {
                info!("event=store_reload module=store status=skipped reason=null_document");
                return Ok(());
            }
            Ok(_) => {
                warn!("event=store_reload module=store status=skipped reason=not_an_object");
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "event=store_reload module=store status=skipped reason=malformed_json line={} column={}",
                    err.line(),
                    err.column()
                );
                return Ok(());
            }
        };

        let mut rebuilt = Registry::new();
        for (key, value) in entries {
            let record = rebuild_entry(&key, value)?;
            let canonical_key = record.key();
            if canonical_key != key {
                warn!("event=store_reload module=store status=rekeyed reason=key_id_mismatch");
            }
            rebuilt.insert(canonical_key, record);
        }

        self.objects = rebuilt;
        info!(
            "event=store_reload module=store status=ok records={} duration_ms={}",
            self.objects.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn rebuild_entry(key: &str, value: Value) -> StoreResult<Record> {
    let tag = key.split('.').next().unwrap_or(key);
    let entry = registry::resolve(tag).map_err(|source| StoreError::UnknownKind {
        key: key.to_string(),
        source,
    })?;

    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            return Err(StoreError::InvalidRecord {
                key: key.to_string(),
                source: RecordError::InvalidDocument(format!(
                    "expected an object, found `{other}`"
                )),
            });
        }
    };
    fields.remove(CLASS_MARKER);

    (entry.factory)(fields).map_err(|source| StoreError::InvalidRecord {
        key: key.to_string(),
        source,
    })
}
