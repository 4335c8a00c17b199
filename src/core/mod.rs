//! Core functionality modules
//!
//! This module contains the catalog engine organized into logical layers:
//! - `models`: songs and the query descriptors used against them
//! - `data`: the song store abstraction and its implementations
//! - `lyrics`: verse windowing over stored lyrics

pub mod data;
pub mod lyrics;
pub mod models;

// Re-export commonly used types for convenience
pub use data::{Insertion, MemoryStore, SongStore, SqliteStore};
pub use models::{NewSong, Page, Song, SongFilter, SongId, SongPatch, VerseWindow};
