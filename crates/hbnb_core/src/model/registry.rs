//! Closed type registry: class tag -> rehydrating constructor.
//!
//! Extending the kind set means adding a `RecordKind` variant and one entry
//! to `KIND_TABLE`; there is no runtime registration.

use super::kind::RecordKind;
use super::record::{Record, RecordError};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rebuilds a record of a fixed kind from persisted fields.
pub type RecordFactory = fn(Map<String, Value>) -> Result<Record, RecordError>;

/// Registry entry binding a kind, its tag and its constructor.
#[derive(Clone, Copy)]
pub struct KindEntry {
    pub kind: RecordKind,
    pub tag: &'static str,
    pub factory: RecordFactory,
}

impl std::fmt::Debug for KindEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindEntry")
            .field("kind", &self.kind)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownKind(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(tag) => write!(f, "unknown record kind `{tag}`"),
        }
    }
}

impl Error for RegistryError {}

macro_rules! entry {
    ($kind:ident) => {{
        fn factory(fields: Map<String, Value>) -> Result<Record, RecordError> {
            Record::rehydrate(RecordKind::$kind, fields)
        }
        KindEntry {
            kind: RecordKind::$kind,
            tag: stringify!($kind),
            factory,
        }
    }};
}

const KIND_TABLE: &[KindEntry] = &[
    entry!(BaseModel),
    entry!(User),
    entry!(State),
    entry!(City),
    entry!(Amenity),
    entry!(Place),
    entry!(Review),
];

/// Resolves a class tag to its registry entry.
pub fn resolve(tag: &str) -> Result<&'static KindEntry, RegistryError> {
    KIND_TABLE
        .iter()
        .find(|entry| entry.tag == tag)
        .ok_or_else(|| RegistryError::UnknownKind(tag.to_string()))
}
