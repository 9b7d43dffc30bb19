//! Core of GhostNote: anonymous notes guarded by a possession-based
//! modification code instead of accounts.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{default_log_level, ConfigError, CoreConfig};
pub use logging::{init_from_config, init_logging, logging_status, LoggingError};
pub use model::modification_code::{CodeCheckError, ModificationCode};
pub use model::note::{
    parse_note_id, NewNote, Note, NoteField, NoteFields, NoteId, NoteValidationError,
    NoteValidationKind, USERNAME_MAX_CHARS,
};
pub use repo::note_store::{
    NoteStore, PublicOrder, PublicSlice, RepoError, RepoResult, SqliteNoteStore,
};
pub use service::note_manager::{NoteError, NoteManager, NoteResult, PublicPage};
pub use service::pagination::{PageInfo, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
