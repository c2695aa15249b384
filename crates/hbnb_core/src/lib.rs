//! Core domain logic for the hbnb object store.
//! This crate is the single source of truth for record invariants.

pub mod config;
pub mod console;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::ConsoleConfig;
pub use console::{CommandError, Console, ConsoleError, ConsoleResult, Flow, PROMPT};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::kind::RecordKind;
pub use model::record::{record_key, FieldMap, Record, RecordError, CLASS_MARKER};
pub use model::registry::{resolve, KindEntry, RegistryError};
pub use service::record_service::{RecordService, RecordServiceError, RecordServiceResult};
pub use store::{FileStorage, RecordStore, Registry, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
