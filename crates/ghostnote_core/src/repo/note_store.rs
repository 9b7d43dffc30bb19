//! Note store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist, read and remove note rows.
//! - Provide public-subset queries with random or newest-first ordering.
//!
//! # Invariants
//! - Conditional writes match on both `id` and `modification_code`, in one
//!   statement, so a verified code cannot be raced by another writer.
//! - `created_at` of an inserted row is never below the newest stored row.
//! - Read paths reject invalid persisted data instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::modification_code::ModificationCode;
use crate::model::note::{NewNote, Note, NoteFields, NoteId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_COLUMNS: &str = "id, content, username, created_at, is_public, modification_code";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure surfaced to the manager as a storage error.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection schema is older than this build expects.
    SchemaNotReady { found: u32, expected: u32 },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "note schema version {found} is not migrated to {expected}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::SchemaNotReady { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering applied to public-subset queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicOrder {
    /// Fresh shuffle on every query.
    Random,
    /// `created_at DESC, id ASC`.
    Newest,
}

impl PublicOrder {
    fn order_by_sql(self) -> &'static str {
        match self {
            Self::Random => "ORDER BY RANDOM()",
            Self::Newest => "ORDER BY created_at DESC, id ASC",
        }
    }
}

/// One window of the public subset plus the subset size it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicSlice {
    pub items: Vec<Note>,
    pub total: u64,
}

/// Storage contract consumed by `NoteManager`.
///
/// Every returned `Note` carries its stored modification code; redaction is
/// the manager's job.
pub trait NoteStore {
    fn insert(&self, note: &NewNote) -> RepoResult<Note>;
    fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Overwrites the mutable fields if `id` still holds `expected_code`.
    fn conditional_update(
        &self,
        id: NoteId,
        expected_code: &ModificationCode,
        fields: &NoteFields,
    ) -> RepoResult<Option<Note>>;
    /// Deletes the row if `id` still holds `expected_code`.
    fn conditional_delete(&self, id: NoteId, expected_code: &ModificationCode)
        -> RepoResult<bool>;
    fn query_public(&self, order: PublicOrder, offset: u64, limit: u32)
        -> RepoResult<PublicSlice>;
    fn count_public(&self) -> RepoResult<u64>;
    /// Uniformly samples one public note id.
    fn random_public_id(&self) -> RepoResult<Option<NoteId>>;
}

/// SQLite-backed note store over a borrowed connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// Fails when the schema has not been migrated to the current version.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn insert(&self, note: &NewNote) -> RepoResult<Note> {
        let sql = format!(
            "INSERT INTO notes (id, content, username, created_at, is_public, modification_code)
             VALUES (
                ?1,
                ?2,
                ?3,
                MAX(?4, COALESCE((SELECT MAX(created_at) FROM notes), ?4)),
                ?5,
                ?6
             )
             RETURNING {NOTE_COLUMNS};"
        );
        let note = self.conn.query_row_and_then(
            &sql,
            params![
                note.id.to_string(),
                note.fields.content.as_str(),
                note.fields.username.as_str(),
                note.created_at,
                note.fields.is_public,
                note.modification_code.as_uuid().to_string(),
            ],
            parse_note_row,
        )?;
        Ok(note)
    }

    fn get_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn conditional_update(
        &self,
        id: NoteId,
        expected_code: &ModificationCode,
        fields: &NoteFields,
    ) -> RepoResult<Option<Note>> {
        let sql = format!(
            "UPDATE notes
             SET
                content = ?3,
                username = ?4,
                is_public = ?5
             WHERE id = ?1
               AND modification_code = ?2
             RETURNING {NOTE_COLUMNS};"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![
            id.to_string(),
            expected_code.as_uuid().to_string(),
            fields.content.as_str(),
            fields.username.as_str(),
            fields.is_public,
        ])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    fn conditional_delete(
        &self,
        id: NoteId,
        expected_code: &ModificationCode,
    ) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND modification_code = ?2;",
            params![id.to_string(), expected_code.as_uuid().to_string()],
        )?;
        Ok(changed > 0)
    }

    fn query_public(
        &self,
        order: PublicOrder,
        offset: u64,
        limit: u32,
    ) -> RepoResult<PublicSlice> {
        // Count and window read from the same snapshot.
        let tx = self.conn.unchecked_transaction()?;
        let total = count_public_rows(&tx)?;

        let sql = format!(
            "SELECT {NOTE_COLUMNS}
             FROM notes
             WHERE is_public = 1
             {}
             LIMIT ?1 OFFSET ?2;",
            order.order_by_sql()
        );
        let mut items = Vec::new();
        {
            let mut stmt = tx.prepare(&sql)?;
            let mut rows = stmt.query(params![
                i64::from(limit),
                i64::try_from(offset).unwrap_or(i64::MAX)
            ])?;
            while let Some(row) = rows.next()? {
                items.push(parse_note_row(row)?);
            }
        }
        tx.commit()?;

        Ok(PublicSlice { items, total })
    }

    fn count_public(&self) -> RepoResult<u64> {
        count_public_rows(self.conn)
    }

    fn random_public_id(&self) -> RepoResult<Option<NoteId>> {
        let id_text: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM notes WHERE is_public = 1 ORDER BY RANDOM() LIMIT 1;",
                [],
                |row| row.get(0),
            )
            .optional()?;
        id_text.as_deref().map(|text| parse_uuid(text, "id")).transpose()
    }
}

fn count_public_rows(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notes WHERE is_public = 1;",
        [],
        |row| row.get(0),
    )?;
    u64::try_from(count)
        .map_err(|_| RepoError::InvalidData(format!("negative public note count `{count}`")))
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let code_text: String = row.get("modification_code")?;

    let is_public = match row.get::<_, i64>("is_public")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_public value `{other}` in notes.is_public"
            )));
        }
    };

    Ok(Note {
        id: parse_uuid(&id_text, "id")?,
        content: row.get("content")?,
        username: row.get("username")?,
        created_at: row.get("created_at")?,
        is_public,
        modification_code: Some(ModificationCode::from_uuid(parse_uuid(
            &code_text,
            "modification_code",
        )?)),
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    // Value is not echoed: the column may hold a secret.
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid in notes.{column}")))
}
