//! Data layer modules
//!
//! This module contains the song store abstraction and its implementations:
//! - `database`: SQLite-backed store over a connection pool
//! - `memory`: in-process store with the same semantics
//! - `pool`: connection checkout with guaranteed release
//! - `schema`: bootstrap of the `songs` relation

pub mod database;
pub mod memory;
pub mod pool;
pub mod schema;


pub use database::SqliteStore;
pub use memory::MemoryStore;

use crate::core::models::{NewSong, Song, SongFilter, SongId, SongPatch, VerseWindow};
use crate::error::Result;

/// Outcome of `add_song`. Both variants are successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Created(SongId),
    /// A song with the same title and group already exists; nothing changed.
    Duplicate,
}

impl Insertion {
    pub fn id(&self) -> Option<SongId> {
        match self {
            Insertion::Created(id) => Some(*id),
            Insertion::Duplicate => None,
        }
    }
}

/// Persistence and query operations over the song catalog.
///
/// Every method is a single atomic unit of work. Missing identifiers are
/// reported as `SongbookError::NotFound`, data-access faults as
/// `SongbookError::Storage`.
#[async_trait::async_trait]
pub trait SongStore: Send + Sync {
    /// Insert a song, treating an existing `(title, group)` pair as a no-op.
    async fn add_song(&self, song: &NewSong) -> Result<Insertion>;

    /// Songs matching every predicate of `filter`, ordered by ascending id,
    /// windowed by `filter.page`.
    async fn find_all(&self, filter: &SongFilter) -> Result<Vec<Song>>;

    /// Merge the present fields of `patch` into the stored song.
    async fn update_song(&self, patch: &SongPatch) -> Result<()>;

    async fn delete_song(&self, id: SongId) -> Result<()>;

    /// A window of verses from the song's lyrics.
    async fn get_text(&self, id: SongId, window: VerseWindow) -> Result<String>;

    async fn find_by_title_and_group(&self, title: &str, group: &str) -> Result<Option<Song>> {
        let filter = SongFilter::new().title(title).group(group).page(u32::MAX, 0);
        let songs = self.find_all(&filter).await?;
        Ok(songs
            .into_iter()
            .find(|song| song.title == title && song.group == group))
    }
}
