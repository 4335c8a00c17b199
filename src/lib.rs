//! Song catalog with filtered, paginated queries and windowed lyric
//! retrieval over SQLite.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod utils;

pub use crate::core::{
    Insertion, MemoryStore, NewSong, Page, Song, SongFilter, SongId, SongPatch, SongStore,
    SqliteStore, VerseWindow,
};
pub use error::{Result, SongbookError};
