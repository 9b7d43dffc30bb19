use ghostnote_core::db::migrations::latest_version;
use ghostnote_core::db::{open_db, open_db_in_memory, DbError};
use ghostnote_core::{NoteFields, NoteManager, SqliteNoteStore};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert!(column_names(&conn, "notes")
        .iter()
        .any(|column| column == "is_public"));
}

#[test]
fn notes_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("ghostnote.db");

    let created = {
        let conn = open_db(&path).unwrap();
        let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
        manager
            .compose(NoteFields::new("durable", "ghost", true))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    assert_eq!(manager.fetch(created.id).unwrap(), created.redacted());
}

#[test]
fn schema_rejects_duplicate_modification_codes() {
    let conn = open_db_in_memory().unwrap();
    let insert = "INSERT INTO notes (id, content, username, created_at, modification_code)
                  VALUES (?1, 'x', 'y', 0, '00000000-0000-4000-8000-0000000000aa');";

    conn.execute(insert, ["00000000-0000-4000-8000-000000000001"])
        .unwrap();
    assert!(conn
        .execute(insert, ["00000000-0000-4000-8000-000000000002"])
        .is_err());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn column_names(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table});"))
        .unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap();
    names.collect::<Result<Vec<_>, _>>().unwrap()
}
