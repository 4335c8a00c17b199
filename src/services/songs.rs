use std::sync::Arc;

use crate::core::data::{Insertion, SongStore};
use crate::core::models::{NewSong, Song, SongFilter, SongId, SongPatch, VerseWindow};
use crate::error::Result;

/// Caller-facing boundary over a [`SongStore`].
///
/// Holds no policy of its own: every call is forwarded to the store it was
/// built with, so callers can be tested against `MemoryStore`.
#[derive(Clone)]
pub struct SongService {
    store: Arc<dyn SongStore>,
}

impl SongService {
    pub fn new(store: Arc<dyn SongStore>) -> Self {
        Self { store }
    }

    pub async fn add_song(&self, song: &NewSong) -> Result<Insertion> {
        self.store.add_song(song).await
    }

    pub async fn find_all(&self, filter: &SongFilter) -> Result<Vec<Song>> {
        self.store.find_all(filter).await
    }

    pub async fn update_song(&self, patch: &SongPatch) -> Result<()> {
        self.store.update_song(patch).await
    }

    pub async fn delete_song(&self, id: SongId) -> Result<()> {
        self.store.delete_song(id).await
    }

    pub async fn get_text(&self, id: SongId, window: VerseWindow) -> Result<String> {
        self.store.get_text(id, window).await
    }

    pub async fn find_by_title_and_group(&self, title: &str, group: &str) -> Result<Option<Song>> {
        self.store.find_by_title_and_group(title, group).await
    }
}
