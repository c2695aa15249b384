//! Record use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/count/update/destroy entry points over a store.
//! - Decide when a use-case flushes the registry to the backing file.
//!
//! # Invariants
//! - Every state-changing call ends with exactly one `save()`.
//! - Calls that change nothing never touch the backing file.
//! - Protected fields are never assigned.

use crate::model::kind::RecordKind;
use crate::model::record::{record_key, Record};
use crate::store::{RecordStore, StoreError};
use log::info;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordServiceResult<T> = Result<T, RecordServiceError>;

/// Service error for record use-cases.
#[derive(Debug)]
pub enum RecordServiceError {
    /// No record lives at the composite key.
    NotFound(String),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for RecordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "record not found: {key}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RecordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<StoreError> for RecordServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Record service facade over a storage engine.
pub struct RecordService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> RecordService<S> {
    /// Creates a service using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a fresh record, registers it and persists the registry.
    ///
    /// Returns the generated record id.
    pub fn create(&mut self, kind: RecordKind) -> RecordServiceResult<String> {
        let record = Record::new(kind);
        let id = record.id().to_string();
        self.store.insert(record);
        self.store.save()?;
        info!("event=record_create module=service status=ok kind={kind}");
        Ok(id)
    }

    pub fn get(&self, kind: RecordKind, id: &str) -> Option<&Record> {
        self.store.get(&record_key(kind, id))
    }

    /// Lists records in key order, optionally restricted to one kind.
    pub fn list(&self, kind: Option<RecordKind>) -> Vec<&Record> {
        self.store
            .all()
            .values()
            .filter(|record| kind.map_or(true, |kind| record.kind() == kind))
            .collect()
    }

    /// Counts registry entries whose key starts with `Kind.`.
    pub fn count(&self, kind: RecordKind) -> usize {
        let prefix = format!("{}.", kind.tag());
        self.store
            .all()
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .count()
    }

    /// Assigns one field and persists.
    ///
    /// Returns `false` when `name` is protected; nothing is saved in that case.
    pub fn update_field(
        &mut self,
        kind: RecordKind,
        id: &str,
        name: &str,
        value: Value,
    ) -> RecordServiceResult<bool> {
        let key = record_key(kind, id);
        let record = self
            .store
            .get_mut(&key)
            .ok_or_else(|| RecordServiceError::NotFound(key.clone()))?;

        if !record.set_field(name, value) {
            info!("event=record_update module=service status=skipped kind={kind} reason=protected_field");
            return Ok(false);
        }
        record.touch();
        self.store.save()?;
        info!("event=record_update module=service status=ok kind={kind} fields=1");
        Ok(true)
    }

    /// Assigns every entry of `fields` and persists once.
    ///
    /// Protected names are skipped. Returns the number of assigned fields.
    pub fn update_fields(
        &mut self,
        kind: RecordKind,
        id: &str,
        fields: Map<String, Value>,
    ) -> RecordServiceResult<usize> {
        let key = record_key(kind, id);
        let record = self
            .store
            .get_mut(&key)
            .ok_or_else(|| RecordServiceError::NotFound(key.clone()))?;

        let mut applied = 0;
        for (name, value) in fields {
            if record.set_field(name, value) {
                applied += 1;
            }
        }

        if applied == 0 {
            info!("event=record_update module=service status=skipped kind={kind} reason=no_assignable_fields");
            return Ok(0);
        }
        record.touch();
        self.store.save()?;
        info!("event=record_update module=service status=ok kind={kind} fields={applied}");
        Ok(applied)
    }

    /// Removes one record and persists. Referencing records are left untouched.
    pub fn destroy(&mut self, kind: RecordKind, id: &str) -> RecordServiceResult<Record> {
        let key = record_key(kind, id);
        let removed = self
            .store
            .remove(&key)
            .ok_or(RecordServiceError::NotFound(key))?;
        self.store.save()?;
        info!("event=record_destroy module=service status=ok kind={kind}");
        Ok(removed)
    }
}
