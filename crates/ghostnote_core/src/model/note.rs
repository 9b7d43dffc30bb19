//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record and its mutable field set.
//! - Own the non-empty/length validation shared by compose and update.
//!
//! # Invariants
//! - `id` and `modification_code` are generated independently and never
//!   supplied by callers.
//! - `content` and `username` are stored trimmed and never empty.
//! - The manager hands out `modification_code` only from compose.

use crate::model::modification_code::ModificationCode;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Public identifier of a note, used as the shareable link key.
pub type NoteId = Uuid;

/// Parses a link segment into a note id. Non-UUID text never resolves.
pub fn parse_note_id(value: &str) -> Option<NoteId> {
    Uuid::parse_str(value.trim()).ok()
}

/// Maximum display label length, in characters.
pub const USERNAME_MAX_CHARS: usize = 100;

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub username: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_public: bool,
    /// Present only on the value returned by compose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_code: Option<ModificationCode>,
}

impl Note {
    /// Returns a copy of this note without the modification code.
    pub fn redacted(&self) -> Self {
        Self {
            modification_code: None,
            ..self.clone()
        }
    }
}

/// Mutable field set shared by compose and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    pub content: String,
    pub username: String,
    pub is_public: bool,
}

impl NoteFields {
    pub fn new(content: impl Into<String>, username: impl Into<String>, is_public: bool) -> Self {
        Self {
            content: content.into(),
            username: username.into(),
            is_public,
        }
    }

    /// Field set for a note that stays out of public listings.
    pub fn private(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self::new(content, username, false)
    }

    /// Validates and normalizes the field set.
    ///
    /// Content is checked before username, so the first failing field wins.
    pub fn validated(self) -> Result<Self, NoteValidationError> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(NoteValidationError::empty(NoteField::Content));
        }

        let username = self.username.trim();
        if username.is_empty() {
            return Err(NoteValidationError::empty(NoteField::Username));
        }
        if username.chars().count() > USERNAME_MAX_CHARS {
            return Err(NoteValidationError {
                field: NoteField::Username,
                kind: NoteValidationKind::TooLong {
                    max_chars: USERNAME_MAX_CHARS,
                },
            });
        }

        Ok(Self {
            content: content.to_string(),
            username: username.to_string(),
            is_public: self.is_public,
        })
    }
}

/// Insert payload assembled by the manager. Every server-assigned value is
/// already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub id: NoteId,
    pub modification_code: ModificationCode,
    pub created_at: i64,
    pub fields: NoteFields,
}

impl NewNote {
    /// Assigns fresh identifiers to validated fields.
    pub fn generate(fields: NoteFields, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            modification_code: ModificationCode::generate(),
            created_at,
            fields,
        }
    }
}

/// User-editable note field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Content,
    Username,
}

impl NoteField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Username => "username",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationKind {
    Empty,
    TooLong { max_chars: usize },
}

/// Field-tagged validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteValidationError {
    pub field: NoteField,
    pub kind: NoteValidationKind,
}

impl NoteValidationError {
    fn empty(field: NoteField) -> Self {
        Self {
            field,
            kind: NoteValidationKind::Empty,
        }
    }
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NoteValidationKind::Empty => write!(f, "{} must not be empty", self.field.as_str()),
            NoteValidationKind::TooLong { max_chars } => write!(
                f,
                "{} must be at most {max_chars} characters",
                self.field.as_str()
            ),
        }
    }
}

impl Error for NoteValidationError {}
