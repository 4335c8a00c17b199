use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::StorageError;

pub const CURRENT_DB_VERSION: u32 = 1;

/// Bring the `songs` relation up to `CURRENT_DB_VERSION`.
///
/// Keyed on `PRAGMA user_version`; a database already at the current version
/// is left untouched.
pub fn ensure_schema(conn: &mut Connection) -> Result<(), StorageError> {
    let existing_version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(StorageError::Schema)?;

    if existing_version >= CURRENT_DB_VERSION {
        debug!(version = existing_version, "Database schema is current");
        return Ok(());
    }

    upgrade_database(conn, existing_version).map_err(StorageError::Schema)
}

fn upgrade_database(conn: &mut Connection, existing_version: u32) -> rusqlite::Result<()> {
    debug!(
        "Upgrading database from version {} to {}",
        existing_version, CURRENT_DB_VERSION
    );

    if existing_version == 0 {
        let tx = conn.transaction()?;

        tx.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS songs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                group_name TEXT NOT NULL,
                lyrics TEXT NOT NULL DEFAULT '',
                link TEXT NOT NULL DEFAULT '',
                release_date TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (title, group_name)
            );

            CREATE INDEX IF NOT EXISTS idx_songs_group_name ON songs(group_name);
            CREATE INDEX IF NOT EXISTS idx_songs_release_date ON songs(release_date);
        "#,
        )?;

        tx.pragma_update(None, "user_version", CURRENT_DB_VERSION)?;
        tx.commit()?;
    }

    info!("Database schema ready (version {})", CURRENT_DB_VERSION);
    Ok(())
}
