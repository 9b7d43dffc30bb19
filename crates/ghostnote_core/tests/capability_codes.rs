use ghostnote_core::db::open_db_in_memory;
use ghostnote_core::{Note, NoteError, NoteFields, NoteManager, SqliteNoteStore};
use uuid::Uuid;

fn compose_one(manager: &NoteManager<SqliteNoteStore<'_>>) -> Note {
    manager
        .compose(NoteFields::new("guarded", "ghost", true))
        .unwrap()
}

#[test]
fn update_with_wrong_code_is_mismatch_and_leaves_note_intact() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);

    let wrong = Uuid::new_v4().to_string();
    let err = manager
        .update(
            created.id,
            Some(wrong.as_str()),
            NoteFields::new("hijacked", "mallory", false),
        )
        .unwrap_err();

    assert!(matches!(err, NoteError::CodeMismatch));
    assert_eq!(manager.fetch(created.id).unwrap(), created.redacted());
}

#[test]
fn update_with_malformed_code_is_malformed() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);

    let err = manager
        .update(
            created.id,
            Some("definitely-not-a-uuid"),
            NoteFields::new("x", "y", false),
        )
        .unwrap_err();
    assert!(matches!(err, NoteError::CodeMalformed));
}

#[test]
fn update_without_code_is_missing() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);

    for submitted in [None, Some(""), Some("   ")] {
        let err = manager
            .update(created.id, submitted, NoteFields::new("x", "y", false))
            .unwrap_err();
        assert!(matches!(err, NoteError::CodeMissing), "submitted={submitted:?}");
    }
}

#[test]
fn code_check_runs_before_field_validation() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);

    let err = manager
        .update(created.id, Some("bogus"), NoteFields::new("", "", false))
        .unwrap_err();
    assert!(matches!(err, NoteError::CodeMalformed));
}

#[test]
fn destroy_applies_same_code_taxonomy_before_deleting() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);
    let wrong = Uuid::new_v4().to_string();

    assert!(matches!(
        manager.destroy(created.id, None).unwrap_err(),
        NoteError::CodeMissing
    ));
    assert!(matches!(
        manager.destroy(created.id, Some("12345")).unwrap_err(),
        NoteError::CodeMalformed
    ));
    assert!(matches!(
        manager.destroy(created.id, Some(wrong.as_str())).unwrap_err(),
        NoteError::CodeMismatch
    ));
    assert_eq!(manager.fetch(created.id).unwrap(), created.redacted());
}

#[test]
fn note_id_is_not_a_valid_modification_code() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);

    let id_text = created.id.to_string();
    let err = manager
        .destroy(created.id, Some(id_text.as_str()))
        .unwrap_err();
    assert!(matches!(err, NoteError::CodeMismatch));
}

#[test]
fn code_is_accepted_in_uppercase_and_simple_form() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);
    let code = created.modification_code.unwrap();

    let upper = code.to_string().to_uppercase();
    manager
        .update(
            created.id,
            Some(upper.as_str()),
            NoteFields::new("edited", "ghost", true),
        )
        .unwrap();

    let simple = code.as_uuid().simple().to_string();
    manager.destroy(created.id, Some(simple.as_str())).unwrap();
}

#[test]
fn codes_belong_to_exactly_one_note() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let first = compose_one(&manager);
    let second = compose_one(&manager);

    let first_code = first.modification_code.unwrap().to_string();
    let err = manager
        .destroy(second.id, Some(first_code.as_str()))
        .unwrap_err();
    assert!(matches!(err, NoteError::CodeMismatch));
}

#[test]
fn fetched_note_serializes_without_code() {
    let conn = open_db_in_memory().unwrap();
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn).unwrap());
    let created = compose_one(&manager);

    let composed_json = serde_json::to_value(&created).unwrap();
    assert_eq!(
        composed_json["modification_code"],
        created.modification_code.unwrap().to_string()
    );

    let fetched_json = serde_json::to_value(manager.fetch(created.id).unwrap()).unwrap();
    assert!(fetched_json.get("modification_code").is_none());
    assert_eq!(fetched_json["id"], created.id.to_string());
    assert_eq!(fetched_json["is_public"], true);
}
