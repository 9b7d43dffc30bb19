//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `ghostnote_core` linkage and database bootstrap end to end.
//! - Print public listing statistics for the configured database.
//!
//! Configuration comes from `GHOSTNOTE_*` environment variables; with no
//! `GHOSTNOTE_DB_PATH` an empty in-memory database is used.

use ghostnote_core::db::{open_db, open_db_in_memory};
use ghostnote_core::{init_from_config, CoreConfig, NoteError, NoteManager, SqliteNoteStore};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("ghostnote_core ping={}", ghostnote_core::ping());
    println!("ghostnote_core version={}", ghostnote_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_from_config(&config)?;

    let conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let manager = NoteManager::new(SqliteNoteStore::try_new(&conn)?);

    let page = manager.list_public(config.page_size, None)?;
    println!("public_notes={}", page.page.total_items);
    println!(
        "public_pages={} page_size={}",
        page.page.total_pages, page.page.page_size
    );

    match manager.pick_random_public() {
        Ok(id) => println!("random_public_note={id}"),
        Err(NoteError::EmptyResult) => println!("random_public_note=none"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}
