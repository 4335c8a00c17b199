//! SQLite song store
//!
//! Each operation is one statement run on a pooled connection inside
//! `spawn_blocking`. Dropping an operation's future, or exceeding the
//! configured operation timeout, interrupts the running statement as long as
//! the operation still holds its connection. Once the blocking side has
//! returned the connection to the pool, a late drop does nothing.

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, InterruptHandle, OptionalExtension, Row};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::pool::{ConnectionPool, PooledConnection};
use super::schema;
use super::{Insertion, SongStore};
use crate::config::Config;
use crate::core::lyrics::window_verses;
use crate::core::models::{contains_ignore_case, NewSong, Song, SongFilter, SongId, SongPatch, VerseWindow};
use crate::error::{Result, SongbookError, StorageError};

const CONTAINS_FN: &str = "contains_ci";

const INSERT_SONG: &str = r#"
    INSERT INTO songs (title, group_name, lyrics, link, release_date)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (title, group_name) DO NOTHING
"#;

const SELECT_SONGS: &str = r#"
    SELECT id, title, group_name, lyrics, link, release_date
    FROM songs
    WHERE (?1 IS NULL OR contains_ci(title, ?1))
      AND (?2 IS NULL OR contains_ci(group_name, ?2))
      AND (?3 IS NULL OR contains_ci(lyrics, ?3))
      AND (?4 IS NULL OR contains_ci(link, ?4))
      AND (?5 IS NULL OR release_date = ?5)
    ORDER BY id ASC
    LIMIT ?6 OFFSET ?7
"#;

const UPDATE_SONG: &str = r#"
    UPDATE songs SET
        lyrics = COALESCE(?1, lyrics),
        link = COALESCE(?2, link),
        release_date = COALESCE(?3, release_date)
    WHERE id = ?4
"#;

const DELETE_SONG: &str = "DELETE FROM songs WHERE id = ?1";

const SELECT_LYRICS: &str = "SELECT lyrics FROM songs WHERE id = ?1";

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub pool_size: usize,
    pub busy_timeout: Duration,
    pub operation_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            pool_size: 4,
            busy_timeout: Duration::from_millis(5000),
            operation_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            pool_size: config.pool_size,
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            operation_timeout: Duration::from_secs(config.operation_timeout_seconds),
        }
    }
}

pub struct SqliteStore {
    pool: Arc<ConnectionPool>,
    operation_timeout: Duration,
    path: Option<PathBuf>,
}

impl SqliteStore {
    pub async fn open(db_path: &Path, options: StoreOptions) -> Result<Self> {
        info!("Opening song database at: {}", db_path.display());

        let operation_timeout = options.operation_timeout;
        let path = db_path.to_path_buf();
        let connections =
            tokio::task::spawn_blocking(move || open_file_connections(&path, &options)).await??;

        Ok(Self {
            pool: ConnectionPool::new(connections),
            operation_timeout,
            path: Some(db_path.to_path_buf()),
        })
    }

    /// A private in-memory database. Always a single connection, since every
    /// SQLite in-memory connection is its own database.
    pub fn open_in_memory(options: StoreOptions) -> Result<Self> {
        let mut conn = open_connection(None, options.busy_timeout)?;
        schema::ensure_schema(&mut conn)?;

        Ok(Self {
            pool: ConnectionPool::new(vec![conn]),
            operation_timeout: options.operation_timeout,
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    pub fn close(&self) {
        debug!("Closing song database");
        self.pool.close();
    }

    async fn run<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.pool.acquire().await?;
        let interrupt = InterruptOnDrop::new(conn.get_interrupt_handle());
        let checkout = Checkout::new(conn, interrupt.armed());
        let task = tokio::task::spawn_blocking(move || work(&*checkout));

        match tokio::time::timeout(self.operation_timeout, task).await {
            Ok(joined) => joined?,
            Err(_) => {
                warn!(
                    operation,
                    timeout = ?self.operation_timeout,
                    "Operation timed out, interrupting statement"
                );
                Err(StorageError::Timeout {
                    operation,
                    after: self.operation_timeout,
                }
                .into())
            }
        }
    }
}

#[async_trait::async_trait]
impl SongStore for SqliteStore {
    async fn add_song(&self, song: &NewSong) -> Result<Insertion> {
        debug!(title = %song.title, group = %song.group, "Attempting to add song");

        let song = song.clone();
        self.run("add_song", move |conn| {
            let inserted = conn
                .prepare_cached(INSERT_SONG)
                .and_then(|mut stmt| {
                    stmt.execute(params![
                        song.title,
                        song.group,
                        song.lyrics,
                        song.link,
                        song.release_date,
                    ])
                })
                .map_err(|e| StorageError::query("add_song", e))?;

            if inserted == 0 {
                warn!(
                    title = %song.title,
                    group = %song.group,
                    "Song already exists in the catalog"
                );
                return Ok(Insertion::Duplicate);
            }

            let id = conn.last_insert_rowid();
            debug!(id, "Song successfully added");
            Ok(Insertion::Created(id))
        })
        .await
    }

    async fn find_all(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        let filter = filter.normalized();
        debug!(?filter, "Get songs");

        self.run("find_all", move |conn| {
            let mut stmt = conn
                .prepare_cached(SELECT_SONGS)
                .map_err(|e| StorageError::query("find_all", e))?;

            let songs = stmt
                .query_map(
                    params![
                        filter.title,
                        filter.group,
                        filter.lyrics,
                        filter.link,
                        filter.release_date,
                        i64::from(filter.page.limit),
                        i64::from(filter.page.offset),
                    ],
                    song_from_row,
                )
                .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Song>>>())
                .map_err(|e| StorageError::query("find_all", e))?;

            debug!(total = songs.len(), "List of songs received");
            Ok(songs)
        })
        .await
    }

    async fn update_song(&self, patch: &SongPatch) -> Result<()> {
        debug!(id = patch.id, "Updating song");

        let patch = patch.clone();
        self.run("update", move |conn| {
            let updated = conn
                .execute(
                    UPDATE_SONG,
                    params![patch.lyrics, patch.link, patch.release_date, patch.id],
                )
                .map_err(|e| StorageError::query("update", e))?;

            if updated == 0 {
                debug!(id = patch.id, "No song to update");
                return Err(SongbookError::not_found("update", patch.id));
            }

            debug!(id = patch.id, "Song successfully updated");
            Ok(())
        })
        .await
    }

    async fn delete_song(&self, id: SongId) -> Result<()> {
        debug!(id, "Attempting to delete song");

        self.run("delete", move |conn| {
            let deleted = conn
                .execute(DELETE_SONG, params![id])
                .map_err(|e| StorageError::query("delete", e))?;

            if deleted == 0 {
                debug!(id, "No song deleted");
                return Err(SongbookError::not_found("delete", id));
            }
            Ok(())
        })
        .await
    }

    async fn get_text(&self, id: SongId, window: VerseWindow) -> Result<String> {
        debug!(id, start = window.start, count = window.count, "Get song text");

        let lyrics = self
            .run("get_text", move |conn| {
                conn.query_row(SELECT_LYRICS, params![id], |row| row.get::<_, String>(0))
                    .optional()
                    .map_err(|e| StorageError::query("get_text", e).into())
            })
            .await?;

        match lyrics {
            Some(lyrics) => Ok(window_verses(&lyrics, window)),
            None => {
                debug!(id, "Song not found");
                Err(SongbookError::not_found("get_text", id))
            }
        }
    }
}

/// Create the parent directory, bootstrap the schema on the first connection
/// and open the rest of the pool.
fn open_file_connections(db_path: &Path, options: &StoreOptions) -> Result<Vec<Connection>> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
    }

    let pool_size = options.pool_size.max(1);
    let mut first = open_connection(Some(db_path), options.busy_timeout)?;
    schema::ensure_schema(&mut first)?;

    let mut connections = Vec::with_capacity(pool_size);
    connections.push(first);
    for _ in 1..pool_size {
        connections.push(open_connection(Some(db_path), options.busy_timeout)?);
    }
    Ok(connections)
}

fn open_connection(path: Option<&Path>, busy_timeout: Duration) -> Result<Connection> {
    let conn = match path {
        Some(path) => Connection::open(path),
        None => Connection::open_in_memory(),
    }
    .map_err(StorageError::Connection)?;

    conn.busy_timeout(busy_timeout)
        .map_err(StorageError::Connection)?;

    // WAL lets readers proceed while a writer holds the database
    if path.is_some() {
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(StorageError::Connection)?;
        debug!(%mode, "Journal mode set");
    }

    register_functions(&conn).map_err(StorageError::Connection)?;
    Ok(conn)
}

/// `contains_ci(haystack, needle)`: Unicode-aware case-insensitive substring
/// test. SQLite's own `LIKE` only folds ASCII and treats `%`/`_` as wildcards.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        CONTAINS_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<Option<String>>(1)?;
            Ok(match (haystack, needle) {
                (_, None) => true,
                (None, Some(needle)) => needle.is_empty(),
                (Some(haystack), Some(needle)) => contains_ignore_case(&haystack, &needle),
            })
        },
    )
}

fn song_from_row(row: &Row<'_>) -> rusqlite::Result<Song> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        group: row.get(2)?,
        lyrics: row.get(3)?,
        link: row.get(4)?,
        release_date: row.get(5)?,
    })
}

fn lock_armed(armed: &Mutex<bool>) -> MutexGuard<'_, bool> {
    armed.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Interrupts the connection's running statement if the operation still
/// owns the connection when the guard is dropped.
struct InterruptOnDrop {
    handle: InterruptHandle,
    armed: Arc<Mutex<bool>>,
}

impl InterruptOnDrop {
    fn new(handle: InterruptHandle) -> Self {
        Self {
            handle,
            armed: Arc::new(Mutex::new(true)),
        }
    }

    fn armed(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.armed)
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        // Held across the interrupt so the connection cannot change hands
        // in between.
        let armed = lock_armed(&self.armed);
        if *armed {
            debug!("Interrupting in-flight statement");
            self.handle.interrupt();
        }
    }
}

/// The blocking side of an operation. Disarms the interrupt and returns the
/// connection to the pool under the same lock, on success, error and panic
/// alike.
struct Checkout {
    conn: Option<PooledConnection>,
    armed: Arc<Mutex<bool>>,
}

impl Checkout {
    fn new(conn: PooledConnection, armed: Arc<Mutex<bool>>) -> Self {
        Self {
            conn: Some(conn),
            armed,
        }
    }
}

impl Deref for Checkout {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match &self.conn {
            Some(conn) => conn,
            None => unreachable!("checkout used after release"),
        }
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        let mut armed = lock_armed(&self.armed);
        *armed = false;
        drop(self.conn.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SPIN_FOREVER: &str = r#"
        WITH RECURSIVE counter(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM counter)
        SELECT COUNT(*) FROM counter
    "#;

    fn spin(conn: &Connection) -> Result<i64> {
        conn.query_row(SPIN_FOREVER, [], |row| row.get(0))
            .map_err(|e| StorageError::query("spin", e).into())
    }

    fn short_timeout() -> StoreOptions {
        StoreOptions {
            operation_timeout: Duration::from_millis(100),
            ..StoreOptions::default()
        }
    }

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("songbook.db");

        let store = SqliteStore::open(&path, StoreOptions::default()).await.unwrap();
        assert!(path.exists());
        assert_eq!(store.pool_size(), 4);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_reopen_keeps_songs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("songbook.db");

        let store = SqliteStore::open(&path, StoreOptions::default()).await.unwrap();
        store.add_song(&NewSong::new("Imagine", "John Lennon")).await.unwrap();
        store.close();
        drop(store);

        let store = SqliteStore::open(&path, StoreOptions::default()).await.unwrap();
        let songs = store.find_all(&SongFilter::new()).await.unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_interrupts_and_releases_connection() {
        let store = SqliteStore::open_in_memory(short_timeout()).unwrap();

        let err = store.run("spin", spin).await.unwrap_err();
        assert!(matches!(
            err,
            SongbookError::Storage(StorageError::Timeout { operation: "spin", .. })
        ));

        // The single pooled connection must come back once the interrupted
        // statement unwinds.
        let songs = tokio::time::timeout(
            Duration::from_secs(5),
            store.find_all(&SongFilter::new()),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(songs.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_operation_releases_connection() {
        let options = StoreOptions {
            operation_timeout: Duration::from_secs(60),
            ..StoreOptions::default()
        };
        let store = SqliteStore::open_in_memory(options).unwrap();

        let cancelled = tokio::time::timeout(Duration::from_millis(50), store.run("spin", spin)).await;
        assert!(cancelled.is_err());

        store.add_song(&NewSong::new("Imagine", "John Lennon")).await.unwrap();
        let songs = tokio::time::timeout(
            Duration::from_secs(5),
            store.find_all(&SongFilter::new()),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_store_reports_storage_error() {
        let store = SqliteStore::open_in_memory(StoreOptions::default()).unwrap();
        store.close();

        let err = store.find_all(&SongFilter::new()).await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_inserts_leave_one_row() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(
            SqliteStore::open(&dir.path().join("songbook.db"), StoreOptions::default())
                .await
                .unwrap(),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.add_song(&NewSong::new("Imagine", "John Lennon")).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if let Insertion::Created(_) = handle.await.unwrap().unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);

        let songs = store.find_all(&SongFilter::new().page(100, 0)).await.unwrap();
        assert_eq!(songs.len(), 1);
    }

    const COUNT_TWO_MILLION: &str = r#"
        WITH RECURSIVE counter(x) AS (
            SELECT 1 UNION ALL SELECT x + 1 FROM counter WHERE x < 2000000
        )
        SELECT COUNT(*) FROM counter
    "#;

    fn count_rows(conn: &Connection) -> Result<i64> {
        conn.query_row(COUNT_TWO_MILLION, [], |row| row.get(0))
            .map_err(|e| StorageError::query("count", e).into())
    }

    fn select_one(conn: &Connection) -> Result<i64> {
        conn.query_row("SELECT 1", [], |row| row.get(0))
            .map_err(|e| StorageError::query("select_one", e).into())
    }

    async fn wait_for_idle(store: &SqliteStore, idle: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while store.pool.idle_count() != idle {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_dropping_a_finished_operation_leaves_next_caller_alone() {
        let store = Arc::new(SqliteStore::open_in_memory(StoreOptions::default()).unwrap());

        // Start the first operation and let its blocking work finish without
        // polling the future to completion.
        let mut finished = Box::pin(store.run("select_one", select_one));
        let pending = tokio::time::timeout(Duration::from_millis(1), &mut finished).await;
        assert!(pending.is_err());
        wait_for_idle(&store, 1).await;

        // The released connection now belongs to a second caller.
        let next = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.run("count", count_rows).await })
        };
        wait_for_idle(&store, 0).await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(finished);

        let counted = next.await.unwrap();
        assert_eq!(counted.unwrap(), 2_000_000);
    }

    #[tokio::test]
    async fn test_panicking_operation_releases_connection() {
        let store = SqliteStore::open_in_memory(StoreOptions::default()).unwrap();

        let err = store
            .run("boom", |_conn: &Connection| -> Result<()> { panic!("boom") })
            .await
            .unwrap_err();
        assert!(matches!(err, SongbookError::Storage(StorageError::Task(_))));

        assert_eq!(store.pool.idle_count(), 1);
        assert_eq!(store.run("select_one", select_one).await.unwrap(), 1);
    }
}
