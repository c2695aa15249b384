//! Record domain model.
//!
//! # Responsibility
//! - Define the canonical record shared by every kind.
//! - Convert records to and from their persisted document shape.
//! - Render the human-readable `[Kind] (id) {...}` form.
//!
//! # Invariants
//! - `id` is generated once and never changes afterwards.
//! - `created_at` is set once; `updated_at` only moves forward through `touch()`.
//! - `fields` never contains a protected name.

use super::kind::RecordKind;
use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Reserved marker field carrying the class tag inside persisted documents.
pub const CLASS_MARKER: &str = "__class__";

/// Field names that can never be assigned through `set_field`.
pub const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "updated_at", CLASS_MARKER];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Open field mapping of one record.
pub type FieldMap = BTreeMap<String, Value>;

/// Returns whether `name` is reserved for identity, timestamps or the class marker.
pub fn is_protected_field(name: &str) -> bool {
    PROTECTED_FIELDS.contains(&name)
}

/// Validation error raised while rebuilding a record from persisted data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The document does not have the persisted record shape.
    InvalidDocument(String),
    /// A timestamp field is not ISO-8601 text.
    InvalidTimestamp { field: &'static str, value: String },
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDocument(message) => write!(f, "invalid record document: {message}"),
            Self::InvalidTimestamp { field, value } => {
                write!(f, "invalid `{field}` timestamp `{value}`")
            }
        }
    }
}

impl Error for RecordError {}

/// Persisted document shape; extra keys are flattened into `fields`.
#[derive(Debug, Serialize, Deserialize)]
struct Document {
    id: String,
    created_at: String,
    updated_at: String,
    #[serde(rename = "__class__", default, skip_serializing_if = "Option::is_none")]
    class: Option<String>,
    #[serde(flatten)]
    fields: FieldMap,
}

/// Canonical record: identity, two timestamps, and an open field mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: RecordKind,
    id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
    fields: FieldMap,
}

impl Record {
    /// Creates a fresh record with a generated id and current timestamps.
    pub fn new(kind: RecordKind) -> Self {
        let now = now();
        Self {
            kind,
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            fields: FieldMap::new(),
        }
    }

    /// Rebuilds a record from a persisted field mapping.
    ///
    /// The class marker, when still present, is consumed and never stored as a
    /// field. All other keys besides identity and timestamps are copied verbatim.
    pub fn rehydrate(kind: RecordKind, document: Map<String, Value>) -> Result<Self, RecordError> {
        let document: Document = serde_json::from_value(Value::Object(document))
            .map_err(|err| RecordError::InvalidDocument(err.to_string()))?;

        Ok(Self {
            kind,
            id: document.id,
            created_at: parse_timestamp("created_at", &document.created_at)?,
            updated_at: parse_timestamp("updated_at", &document.updated_at)?,
            fields: document.fields,
        })
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> NaiveDateTime {
        self.updated_at
    }

    /// Instance fields assigned after construction (schema defaults excluded).
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Composite registry key `Kind.id`.
    pub fn key(&self) -> String {
        record_key(self.kind, &self.id)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Assigns one field.
    ///
    /// Returns `false` without touching the record when `name` is protected.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> bool {
        let name = name.into();
        if is_protected_field(&name) {
            return false;
        }
        self.fields.insert(name, value);
        true
    }

    /// Refreshes `updated_at`; the timestamp strictly advances on every call.
    pub fn touch(&mut self) {
        let now = now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + TimeDelta::microseconds(1)
        };
    }

    /// Persisted document: fields plus identity, ISO timestamps and class marker.
    pub fn to_document(&self) -> Map<String, Value> {
        let document = Document {
            id: self.id.clone(),
            created_at: format_timestamp(self.created_at),
            updated_at: format_timestamp(self.updated_at),
            class: Some(self.kind.tag().to_string()),
            fields: self.fields.clone(),
        };
        match serde_json::to_value(document) {
            Ok(Value::Object(map)) => map,
            // A struct of strings and JSON values always serializes to an object.
            _ => Map::new(),
        }
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ({}) {{", self.kind.tag(), self.id)?;
        write!(
            f,
            "{}: {}, {}: {}, {}: {}",
            Value::from("id"),
            Value::from(self.id.as_str()),
            Value::from("created_at"),
            Value::from(format_timestamp(self.created_at)),
            Value::from("updated_at"),
            Value::from(format_timestamp(self.updated_at)),
        )?;
        for (name, value) in &self.fields {
            write!(f, ", {}: ", Value::from(name.as_str()))?;
            write_value(f, value)?;
        }
        f.write_str("}")
    }
}

/// Writes a field value with `": "` and `", "` separators at every depth.
fn write_value(f: &mut Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::Array(items) => {
            f.write_str("[")?;
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item)?;
            }
            f.write_str("]")
        }
        Value::Object(map) => {
            f.write_str("{")?;
            for (index, (name, item)) in map.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", Value::from(name.as_str()))?;
                write_value(f, item)?;
            }
            f.write_str("}")
        }
        scalar => write!(f, "{scalar}"),
    }
}

/// Builds the composite registry key for a kind and id.
pub fn record_key(kind: RecordKind, id: &str) -> String {
    format!("{}.{}", kind.tag(), id)
}

/// Renders a timestamp as ISO-8601 text with microsecond precision.
///
/// A zero fraction is omitted, so whole-second timestamps keep their short form.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    let format = if value.nanosecond() == 0 {
        WHOLE_SECOND_FORMAT
    } else {
        TIMESTAMP_FORMAT
    };
    value.format(format).to_string()
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, RecordError> {
    value
        .parse::<NaiveDateTime>()
        .map_err(|_| RecordError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}
