//! Record kinds and their default field schema.
//!
//! # Responsibility
//! - Define the closed set of record kinds addressable from the console.
//! - Map kinds to and from their textual class tags.
//! - Describe each kind's default field set as a const schema.
//!
//! # Invariants
//! - Class tags are unique and case-sensitive.
//! - Default fields never include protected names (`id`, timestamps, `__class__`).

use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Closed set of record kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// Catch-all base kind with no type-specific fields.
    BaseModel,
    User,
    State,
    City,
    Amenity,
    Place,
    Review,
}

/// Literal default value of one schema field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Text(&'static str),
    Integer(i64),
    Float(f64),
    EmptyList,
}

impl DefaultValue {
    /// Materializes the default as a field value.
    pub fn to_value(self) -> Value {
        match self {
            Self::Text(text) => Value::from(text),
            Self::Integer(number) => Value::from(number),
            Self::Float(number) => Value::from(number),
            Self::EmptyList => Value::Array(Vec::new()),
        }
    }
}

/// One entry of a kind's default schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDefault {
    pub name: &'static str,
    pub value: DefaultValue,
}

const fn text(name: &'static str) -> FieldDefault {
    FieldDefault {
        name,
        value: DefaultValue::Text(""),
    }
}

const fn integer(name: &'static str) -> FieldDefault {
    FieldDefault {
        name,
        value: DefaultValue::Integer(0),
    }
}

const fn float(name: &'static str) -> FieldDefault {
    FieldDefault {
        name,
        value: DefaultValue::Float(0.0),
    }
}

const USER_DEFAULTS: &[FieldDefault] = &[
    text("email"),
    text("password"),
    text("first_name"),
    text("last_name"),
];
const STATE_DEFAULTS: &[FieldDefault] = &[text("name")];
const CITY_DEFAULTS: &[FieldDefault] = &[text("state_id"), text("name")];
const AMENITY_DEFAULTS: &[FieldDefault] = &[text("name")];
const PLACE_DEFAULTS: &[FieldDefault] = &[
    text("city_id"),
    text("user_id"),
    text("name"),
    text("description"),
    integer("number_rooms"),
    integer("number_bathrooms"),
    integer("max_guest"),
    integer("price_by_night"),
    float("latitude"),
    float("longitude"),
    FieldDefault {
        name: "amenity_ids",
        value: DefaultValue::EmptyList,
    },
];
const REVIEW_DEFAULTS: &[FieldDefault] = &[text("place_id"), text("user_id"), text("text")];

impl RecordKind {
    /// Every kind in declaration order.
    pub const ALL: [RecordKind; 7] = [
        Self::BaseModel,
        Self::User,
        Self::State,
        Self::City,
        Self::Amenity,
        Self::Place,
        Self::Review,
    ];

    /// Class tag used in composite keys, persisted documents and commands.
    pub fn tag(self) -> &'static str {
        match self {
            Self::BaseModel => "BaseModel",
            Self::User => "User",
            Self::State => "State",
            Self::City => "City",
            Self::Amenity => "Amenity",
            Self::Place => "Place",
            Self::Review => "Review",
        }
    }

    /// Parses an exact class tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Snake-case suffix used by class-scoped command synonyms (`show_user`).
    pub fn command_suffix(self) -> &'static str {
        match self {
            Self::BaseModel => "base_model",
            Self::User => "user",
            Self::State => "state",
            Self::City => "city",
            Self::Amenity => "amenity",
            Self::Place => "place",
            Self::Review => "review",
        }
    }

    /// Parses a command synonym suffix.
    pub fn from_command_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.command_suffix() == suffix)
    }

    /// Default field schema for this kind.
    ///
    /// Schema metadata only: defaults are never stored on records, never
    /// rendered, and never consulted by console commands.
    pub fn defaults(self) -> &'static [FieldDefault] {
        match self {
            Self::BaseModel => &[],
            Self::User => USER_DEFAULTS,
            Self::State => STATE_DEFAULTS,
            Self::City => CITY_DEFAULTS,
            Self::Amenity => AMENITY_DEFAULTS,
            Self::Place => PLACE_DEFAULTS,
            Self::Review => REVIEW_DEFAULTS,
        }
    }

    /// Returns the schema default for `name`, if this kind declares one.
    pub fn default_for(self, name: &str) -> Option<Value> {
        self.defaults()
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.to_value())
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::RecordKind;
    use crate::model::record::is_protected_field;
    use serde_json::json;

    #[test]
    fn tags_roundtrip_for_every_kind() {
        for kind in RecordKind::ALL {
            assert_eq!(RecordKind::from_tag(kind.tag()), Some(kind));
            assert_eq!(
                RecordKind::from_command_suffix(kind.command_suffix()),
                Some(kind)
            );
        }
    }

    #[test]
    fn from_tag_is_case_sensitive() {
        assert_eq!(RecordKind::from_tag("user"), None);
        assert_eq!(RecordKind::from_tag("MyModel"), None);
    }

    #[test]
    fn defaults_never_shadow_protected_fields() {
        for kind in RecordKind::ALL {
            for field in kind.defaults() {
                assert!(!is_protected_field(field.name), "{kind}.{}", field.name);
            }
        }
    }

    #[test]
    fn place_defaults_carry_typed_values() {
        assert_eq!(RecordKind::Place.default_for("max_guest"), Some(json!(0)));
        assert_eq!(RecordKind::Place.default_for("latitude"), Some(json!(0.0)));
        assert_eq!(RecordKind::Place.default_for("amenity_ids"), Some(json!([])));
        assert_eq!(RecordKind::BaseModel.default_for("name"), None);
    }
}
