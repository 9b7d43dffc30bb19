//! Note capability manager.
//!
//! # Responsibility
//! - Own the note lifecycle: compose, fetch, update, destroy.
//! - Gate mutation on possession of the note's modification code.
//! - Serve randomized public listings and random public picks.
//!
//! # Invariants
//! - Code verification runs after id resolution and before field
//!   validation; nothing is written when either fails.
//! - Only `compose` returns a note carrying its modification code.
//! - Listing and sampling read the store on every call.
//! - Log lines carry ids and outcome codes only, never content or codes.

use crate::model::modification_code::{CodeCheckError, ModificationCode};
use crate::model::note::{NewNote, Note, NoteFields, NoteId, NoteValidationError};
use crate::repo::note_store::{NoteStore, PublicOrder, RepoError};
use crate::service::pagination::{normalize_page_size, parse_page_number, PageInfo};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type NoteResult<T> = Result<T, NoteError>;

/// Outcome of a refused manager operation.
#[derive(Debug)]
pub enum NoteError {
    Validation(NoteValidationError),
    NotFound(NoteId),
    /// No modification code was supplied.
    CodeMissing,
    /// Supplied code is not in the capability-code format.
    CodeMalformed,
    /// Supplied code is well-formed but belongs to no such grant.
    CodeMismatch,
    Storage(RepoError),
    /// No public note exists to pick from.
    EmptyResult,
}

impl NoteError {
    /// Stable id for log lines and callers that switch on strings.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::CodeMissing => CodeCheckError::Missing.code(),
            Self::CodeMalformed => CodeCheckError::Malformed.code(),
            Self::CodeMismatch => CodeCheckError::Mismatch.code(),
            Self::Storage(_) => "storage",
            Self::EmptyResult => "empty_result",
        }
    }
}

impl Display for NoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::CodeMissing => write!(f, "{}", CodeCheckError::Missing),
            Self::CodeMalformed => write!(f, "{}", CodeCheckError::Malformed),
            Self::CodeMismatch => write!(f, "{}", CodeCheckError::Mismatch),
            Self::Storage(err) => write!(f, "note storage failed: {err}"),
            Self::EmptyResult => write!(f, "no public notes available"),
        }
    }
}

impl Error for NoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<NoteValidationError> for NoteError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodeCheckError> for NoteError {
    fn from(value: CodeCheckError) -> Self {
        match value {
            CodeCheckError::Missing => Self::CodeMissing,
            CodeCheckError::Malformed => Self::CodeMalformed,
            CodeCheckError::Mismatch => Self::CodeMismatch,
        }
    }
}

/// One served page of the public listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicPage {
    /// Randomly ordered, redacted public notes.
    pub items: Vec<Note>,
    pub page: PageInfo,
}

impl PublicPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Capability manager over any `NoteStore`.
pub struct NoteManager<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NoteManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a note and returns it with its modification code.
    ///
    /// This is the only call that ever returns the code.
    pub fn compose(&self, fields: NoteFields) -> NoteResult<Note> {
        let fields = fields.validated().map_err(|err| {
            debug!(
                "event=note_compose module=manager status=rejected error_code=validation field={}",
                err.field.as_str()
            );
            NoteError::from(err)
        })?;

        let draft = NewNote::generate(fields, now_epoch_ms());
        let note = self.store.insert(&draft).map_err(|err| {
            error!(
                "event=note_compose module=manager status=error error_code=storage error={}",
                err
            );
            NoteError::from(err)
        })?;

        info!(
            "event=note_compose module=manager status=ok note_id={} public={}",
            note.id, note.is_public
        );
        Ok(note)
    }

    /// Reads a note by id. Private notes are readable by anyone holding
    /// the id; the modification code is always redacted.
    pub fn fetch(&self, id: NoteId) -> NoteResult<Note> {
        self.store
            .get_by_id(id)?
            .map(|note| note.redacted())
            .ok_or(NoteError::NotFound(id))
    }

    /// Replaces content, username and visibility of a note.
    pub fn update(
        &self,
        id: NoteId,
        submitted_code: Option<&str>,
        changes: NoteFields,
    ) -> NoteResult<Note> {
        let stored_code = self.authorize("note_update", id, submitted_code)?;

        let changes = changes.validated().map_err(|err| {
            debug!(
                "event=note_update module=manager status=rejected note_id={} error_code=validation field={}",
                id,
                err.field.as_str()
            );
            NoteError::from(err)
        })?;

        let updated = self
            .store
            .conditional_update(id, &stored_code, &changes)
            .map_err(|err| {
                error!(
                    "event=note_update module=manager status=error note_id={} error_code=storage error={}",
                    id, err
                );
                NoteError::from(err)
            })?
            .ok_or(NoteError::NotFound(id))?;

        info!(
            "event=note_update module=manager status=ok note_id={} public={}",
            id, updated.is_public
        );
        Ok(updated.redacted())
    }

    /// Permanently deletes a note.
    pub fn destroy(&self, id: NoteId, submitted_code: Option<&str>) -> NoteResult<()> {
        let stored_code = self.authorize("note_destroy", id, submitted_code)?;

        let removed = self
            .store
            .conditional_delete(id, &stored_code)
            .map_err(|err| {
                error!(
                    "event=note_destroy module=manager status=error note_id={} error_code=storage error={}",
                    id, err
                );
                NoteError::from(err)
            })?;
        if !removed {
            return Err(NoteError::NotFound(id));
        }

        info!("event=note_destroy module=manager status=ok note_id={}", id);
        Ok(())
    }

    /// Serves one page of public notes in a fresh random order.
    ///
    /// `page_number` is raw caller text; see `pagination` for the clamping
    /// rules. An empty public set yields an empty page, not an error.
    pub fn list_public(&self, page_size: u32, page_number: Option<&str>) -> NoteResult<PublicPage> {
        let page_size = normalize_page_size(page_size);
        let requested = parse_page_number(page_number);

        let total = self.store.count_public()?;
        let page = PageInfo::resolve(requested, page_size, total);
        let mut slice = self
            .store
            .query_public(PublicOrder::Random, page.offset(), page_size)?;

        // The set may have changed since the count; serve the window that
        // matches the total the page query itself saw.
        let settled = PageInfo::resolve(requested, page_size, slice.total);
        if settled.offset() != page.offset() {
            debug!(
                "event=note_list_public module=manager status=retry page={} settled_page={} total={}",
                page.number, settled.number, slice.total
            );
            slice = self
                .store
                .query_public(PublicOrder::Random, settled.offset(), page_size)?;
        }
        let page = PageInfo::resolve(requested, page_size, slice.total);

        debug!(
            "event=note_list_public module=manager status=ok page={} page_size={} items={} total={}",
            page.number,
            page_size,
            slice.items.len(),
            slice.total
        );
        Ok(PublicPage {
            items: slice.items.iter().map(Note::redacted).collect(),
            page,
        })
    }

    /// Picks one public note id uniformly at random.
    pub fn pick_random_public(&self) -> NoteResult<NoteId> {
        self.store
            .random_public_id()?
            .ok_or(NoteError::EmptyResult)
    }

    /// Newest public notes first, at most `limit` (normalized like a page size).
    pub fn recent_public(&self, limit: u32) -> NoteResult<Vec<Note>> {
        let slice =
            self.store
                .query_public(PublicOrder::Newest, 0, normalize_page_size(limit))?;
        Ok(slice.items.iter().map(Note::redacted).collect())
    }

    pub fn count_public(&self) -> NoteResult<u64> {
        Ok(self.store.count_public()?)
    }

    /// Resolves `id` and checks `submitted_code` against its stored code.
    fn authorize(
        &self,
        event: &'static str,
        id: NoteId,
        submitted_code: Option<&str>,
    ) -> NoteResult<ModificationCode> {
        let stored = self.store.get_by_id(id)?.ok_or_else(|| {
            debug!(
                "event={} module=manager status=rejected note_id={} error_code=not_found",
                event, id
            );
            NoteError::NotFound(id)
        })?;
        let stored_code = stored.modification_code.ok_or_else(|| {
            NoteError::Storage(RepoError::InvalidData(format!(
                "note {id} was read without its modification code"
            )))
        })?;

        ModificationCode::verify(submitted_code, &stored_code).map_err(|err| {
            warn!(
                "event={} module=manager status=rejected note_id={} error_code={}",
                event,
                id,
                err.code()
            );
            NoteError::from(err)
        })?;
        Ok(stored_code)
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
