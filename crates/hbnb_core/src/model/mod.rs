//! Record domain model.
//!
//! # Responsibility
//! - Define the record shape shared by every kind.
//! - Keep the closed kind set and its rehydrating constructors in one place.
//!
//! # Invariants
//! - Every record is addressed by the composite key `Kind.id`.
//! - Kinds differ only in their default field schema.

pub mod kind;
pub mod record;
pub mod registry;
