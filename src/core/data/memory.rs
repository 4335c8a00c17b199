use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use super::{Insertion, SongStore};
use crate::core::lyrics::window_verses;
use crate::core::models::{NewSong, Song, SongFilter, SongId, SongPatch, VerseWindow};
use crate::error::{Result, SongbookError};

/// In-process song store with the same semantics as `SqliteStore`.
///
/// Ids are assigned from a monotonically increasing counter and never reused,
/// matching `AUTOINCREMENT`.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: SongId,
    songs: BTreeMap<SongId, Song>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_songs(songs: Vec<NewSong>) -> Self {
        let store = Self::new();
        {
            let mut state = store.lock();
            for song in songs {
                state.insert(song);
            }
        }
        store
    }

    pub fn len(&self) -> usize {
        self.lock().songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MemoryState {
    fn insert(&mut self, song: NewSong) -> Insertion {
        let exists = self
            .songs
            .values()
            .any(|stored| stored.title == song.title && stored.group == song.group);
        if exists {
            return Insertion::Duplicate;
        }

        self.last_id += 1;
        let id = self.last_id;
        self.songs.insert(id, song.into_song(id));
        Insertion::Created(id)
    }
}

#[async_trait::async_trait]
impl SongStore for MemoryStore {
    async fn add_song(&self, song: &NewSong) -> Result<Insertion> {
        let insertion = self.lock().insert(song.clone());
        if insertion == Insertion::Duplicate {
            warn!(
                title = %song.title,
                group = %song.group,
                "Song already exists in the catalog"
            );
        }
        Ok(insertion)
    }

    async fn find_all(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        let filter = filter.normalized();
        let state = self.lock();

        let songs: Vec<Song> = state
            .songs
            .values()
            .filter(|song| filter.matches(song))
            .skip(filter.page.offset as usize)
            .take(filter.page.limit as usize)
            .cloned()
            .collect();

        debug!(total = songs.len(), "List of songs received");
        Ok(songs)
    }

    async fn update_song(&self, patch: &SongPatch) -> Result<()> {
        let mut state = self.lock();
        let song = state
            .songs
            .get_mut(&patch.id)
            .ok_or_else(|| SongbookError::not_found("update", patch.id))?;

        patch.apply_to(song);
        Ok(())
    }

    async fn delete_song(&self, id: SongId) -> Result<()> {
        match self.lock().songs.remove(&id) {
            Some(_) => Ok(()),
            None => Err(SongbookError::not_found("delete", id)),
        }
    }

    async fn get_text(&self, id: SongId, window: VerseWindow) -> Result<String> {
        let state = self.lock();
        let song = state
            .songs
            .get(&id)
            .ok_or_else(|| SongbookError::not_found("get_text", id))?;

        Ok(window_verses(&song.lyrics, window))
    }
}
